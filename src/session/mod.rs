//! Session-scoped view state: the owned ledger, the active date selection,
//! and the pending-edit position.

use chrono::NaiveDate;

use crate::errors::{LedgerError, Result};
use crate::ledger::{Entry, Ledger};

/// Pending-edit position within the session's ledger.
///
/// While `Editing`, `index` is a valid position in the ledger's sequence for
/// `date`; every transition that could invalidate it resets to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditState {
    #[default]
    Idle,
    Editing { date: NaiveDate, index: usize },
}

/// Owns a ledger for the duration of one session and mediates every mutation.
///
/// All operations run to completion synchronously and leave the ledger
/// untouched on any failure.
#[derive(Debug)]
pub struct SalesSession {
    ledger: Ledger,
    selected_date: Option<NaiveDate>,
    edit: EditState,
}

impl SalesSession {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger,
            selected_date: None,
            edit: EditState::Idle,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Swaps in a different ledger, resetting selection and edit state.
    pub fn replace_ledger(&mut self, ledger: Ledger) {
        self.ledger = ledger;
        self.selected_date = None;
        self.edit = EditState::Idle;
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    pub fn edit_state(&self) -> EditState {
        self.edit
    }

    /// Makes `candidate` the active date after the future-date policy check.
    ///
    /// Switching to a different date cancels any pending edit. The policy
    /// applies to selection only: dates already present in the ledger are not
    /// re-validated.
    pub fn select_date(&mut self, candidate: NaiveDate, today: NaiveDate) -> Result<()> {
        if candidate > today {
            return Err(LedgerError::FutureDate(candidate));
        }
        if self.selected_date != Some(candidate) {
            self.edit = EditState::Idle;
        }
        self.selected_date = Some(candidate);
        Ok(())
    }

    /// Validates and appends a new entry to `date`, preserving arrival order.
    pub fn add_entry(&mut self, date: NaiveDate, name: &str, quantity: u32, price: i64) -> Result<()> {
        let entry = validated_entry(name, quantity, price)?;
        self.ledger.push_entry(date, entry);
        tracing::debug!(%date, "entry added");
        Ok(())
    }

    /// Removes and returns the entry at `(date, index)`.
    ///
    /// A delete for the edited date clears the pending edit: positional
    /// indices for that date are no longer what the cursor captured.
    pub fn delete_entry(&mut self, date: NaiveDate, index: usize) -> Result<Entry> {
        let removed = self
            .ledger
            .remove_entry(date, index)
            .ok_or_else(|| not_found(date, index))?;
        if matches!(self.edit, EditState::Editing { date: edited, .. } if edited == date) {
            self.edit = EditState::Idle;
        }
        tracing::debug!(%date, index, "entry deleted");
        Ok(removed)
    }

    /// Returns a copy of the entry at `(date, index)` and stages it for
    /// update.
    pub fn begin_edit(&mut self, date: NaiveDate, index: usize) -> Result<Entry> {
        let entry = self
            .ledger
            .entry(date, index)
            .cloned()
            .ok_or_else(|| not_found(date, index))?;
        self.edit = EditState::Editing { date, index };
        Ok(entry)
    }

    /// Replaces the staged entry in place and clears the pending edit.
    ///
    /// Validation failures keep the edit staged so the caller can retry.
    pub fn commit_edit(&mut self, name: &str, quantity: u32, price: i64) -> Result<()> {
        let EditState::Editing { date, index } = self.edit else {
            return Err(LedgerError::NoActiveEdit);
        };
        let entry = validated_entry(name, quantity, price)?;
        self.ledger
            .replace_entry(date, index, entry)
            .ok_or_else(|| not_found(date, index))?;
        self.edit = EditState::Idle;
        tracing::debug!(%date, index, "entry updated");
        Ok(())
    }

    /// Total for the active date; `0` when nothing is selected or recorded.
    pub fn total_for_selected(&self) -> i64 {
        self.selected_date
            .map(|date| self.ledger.total_for_date(date))
            .unwrap_or(0)
    }
}

fn validated_entry(name: &str, quantity: u32, price: i64) -> Result<Entry> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::Validation("product name cannot be empty".into()));
    }
    if quantity == 0 {
        return Err(LedgerError::Validation(
            "quantity must be greater than zero".into(),
        ));
    }
    if price <= 0 {
        return Err(LedgerError::Validation(
            "price must be greater than zero".into(),
        ));
    }
    Ok(Entry::new(name, quantity, price))
}

fn not_found(date: NaiveDate, index: usize) -> LedgerError {
    LedgerError::NotFound(format!("no entry at {date} index {index}"))
}
