use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{LedgerError, Result};
use crate::ledger::Ledger;
use crate::utils::{ensure_dir, write_atomic, PathResolver};

use super::StorageBackend;

/// Stores each ledger as a pretty-printed JSON document on disk.
#[derive(Clone)]
pub struct JsonStorage {
    root: PathBuf,
    ledgers_dir: PathBuf,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let app_root = PathResolver::resolve_base(root);
        ensure_dir(&app_root)?;
        let ledgers_dir = PathResolver::ledger_dir_in(&app_root);
        ensure_dir(&ledgers_dir)?;
        Ok(Self {
            root: app_root,
            ledgers_dir,
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None)
    }

    pub fn ledger_path(&self, name: &str) -> PathBuf {
        self.ledgers_dir
            .join(format!("{}.json", canonical_name(name)))
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }
}

impl StorageBackend for JsonStorage {
    fn save(&self, ledger: &Ledger, name: &str) -> Result<()> {
        let path = self.ledger_path(name);
        let json = serde_json::to_string_pretty(ledger)?;
        write_atomic(&path, &json)?;
        tracing::debug!(name, path = %path.display(), "ledger saved");
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Ledger> {
        let path = self.ledger_path(name);
        if !path.exists() {
            return Err(LedgerError::NotFound(format!("ledger `{}` not found", name)));
        }
        let data = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn list(&self) -> Result<Vec<String>> {
        if !self.ledgers_dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.ledgers_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "ledger".into()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Entry;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn storage_with_temp_dir() -> (JsonStorage, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let storage = JsonStorage::new(Some(temp.path().to_path_buf())).expect("json storage");
        (storage, temp)
    }

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new("Sample");
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        ledger.push_entry(date, Entry::new("Pen", 3, 10));
        ledger.push_entry(date, Entry::new("Notebook", 2, 45));
        ledger
    }

    #[test]
    fn save_and_load_roundtrip_preserves_entries() {
        let (storage, _guard) = storage_with_temp_dir();
        let ledger = sample_ledger();
        storage.save(&ledger, "shop").expect("save ledger");

        let loaded = storage.load("shop").expect("load ledger");
        assert_eq!(loaded.name, "Sample");
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(loaded.entries_for(date), ledger.entries_for(date));
    }

    #[test]
    fn load_missing_ledger_is_not_found() {
        let (storage, _guard) = storage_with_temp_dir();
        let err = storage.load("absent").expect_err("nothing saved yet");
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[test]
    fn list_returns_sorted_canonical_names() {
        let (storage, _guard) = storage_with_temp_dir();
        storage.save(&sample_ledger(), "Main Street").expect("save");
        storage.save(&sample_ledger(), "annex").expect("save");

        let names = storage.list().expect("list ledgers");
        assert_eq!(names, ["annex", "main_street"]);
    }

    #[test]
    fn canonical_name_sanitizes_input() {
        assert_eq!(canonical_name("Main Street"), "main_street");
        assert_eq!(canonical_name("  !!  "), "ledger");
    }
}
