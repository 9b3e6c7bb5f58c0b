pub mod json_backend;

use crate::errors::Result;
use crate::ledger::Ledger;

/// Abstraction over persistence backends capable of storing ledgers.
///
/// Storage only snapshots and restores; the in-session ledger stays the
/// source of truth, and a failed call never replaces it.
pub trait StorageBackend: Send + Sync {
    fn save(&self, ledger: &Ledger, name: &str) -> Result<()>;
    fn load(&self, name: &str) -> Result<Ledger>;
    fn list(&self) -> Result<Vec<String>>;
}

pub use json_backend::JsonStorage;
