//! Canonical CSV rendering of a ledger.

use std::fmt::Write as _;
use std::path::Path;

use crate::errors::Result;
use crate::ledger::Ledger;
use crate::utils::write_atomic;

pub const CSV_HEADER: &str = "Date,Product Name,Product Quantity,Product Price";

/// File name the export sink uses when the caller does not pick one.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "products_list.csv";

/// Renders the full ledger as CSV text.
///
/// Dates appear in ascending order (lexicographic ISO order, which equals
/// chronological order) and entries keep their insertion order within each
/// date. Fields are emitted literally with no quoting: a product name
/// containing a comma shifts the remaining columns of its row.
///
/// Rendering an empty ledger yields the header alone; suppressing the export
/// in that case is the caller's decision.
pub fn export_csv(ledger: &Ledger) -> String {
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');
    for (date, entries) in ledger.iter() {
        for entry in entries {
            let _ = writeln!(csv, "{},{},{},{}", date, entry.name, entry.quantity, entry.price);
        }
    }
    csv
}

/// Writes the rendered CSV to `path` for the export sink.
pub fn write_csv_to_path(ledger: &Ledger, path: &Path) -> Result<()> {
    write_atomic(path, &export_csv(ledger))
}
