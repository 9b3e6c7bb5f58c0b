use serde::{Deserialize, Serialize};

/// One recorded sale line.
///
/// Entries are value objects: their only identity is their position within
/// the owning date's sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub quantity: u32,
    /// Unit price in minor currency units. Prices carry no fractional
    /// component in this system.
    pub price: i64,
}

impl Entry {
    pub fn new(name: impl Into<String>, quantity: u32, price: i64) -> Self {
        Self {
            name: name.into(),
            quantity,
            price,
        }
    }

    /// Amount this line contributes to its date's total.
    pub fn line_total(&self) -> i64 {
        i64::from(self.quantity) * self.price
    }
}
