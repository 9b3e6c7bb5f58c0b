use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entry::Entry;

const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Date-indexed collection of sale entries owned by one session.
///
/// Within a date, entries keep their insertion order; that order drives both
/// display and index addressing. A date never maps to an empty sequence:
/// removing the last entry removes the date itself, so "empty" and "absent"
/// are indistinguishable to every reader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    entries: BTreeMap<NaiveDate, Vec<Entry>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

impl Ledger {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            entries: BTreeMap::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    /// Appends an entry to `date`, creating the sequence when absent.
    pub fn push_entry(&mut self, date: NaiveDate, entry: Entry) {
        self.entries.entry(date).or_default().push(entry);
        self.touch();
    }

    /// Removes and returns the entry at `(date, index)`.
    ///
    /// Indices are positional, not stable identifiers: removal shifts every
    /// later index for that date down by one.
    pub fn remove_entry(&mut self, date: NaiveDate, index: usize) -> Option<Entry> {
        let entries = self.entries.get_mut(&date)?;
        if index >= entries.len() {
            return None;
        }
        let removed = entries.remove(index);
        if entries.is_empty() {
            self.entries.remove(&date);
        }
        self.touch();
        Some(removed)
    }

    /// Replaces the entry at `(date, index)` in place, returning the previous
    /// value. Other entries keep their positions.
    pub fn replace_entry(&mut self, date: NaiveDate, index: usize, entry: Entry) -> Option<Entry> {
        let slot = self.entries.get_mut(&date)?.get_mut(index)?;
        let previous = std::mem::replace(slot, entry);
        self.touch();
        Some(previous)
    }

    pub fn entry(&self, date: NaiveDate, index: usize) -> Option<&Entry> {
        self.entries.get(&date).and_then(|entries| entries.get(index))
    }

    /// Entries recorded for `date`, in insertion order.
    pub fn entries_for(&self, date: NaiveDate) -> &[Entry] {
        self.entries.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Dates carrying at least one entry, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.entries.keys().copied()
    }

    /// Iterates `(date, entries)` pairs in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &[Entry])> {
        self.entries
            .iter()
            .map(|(date, entries)| (*date, entries.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of `quantity * price` over the date's entries; `0` when absent.
    pub fn total_for_date(&self, date: NaiveDate) -> i64 {
        self.entries_for(date).iter().map(Entry::line_total).sum()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
