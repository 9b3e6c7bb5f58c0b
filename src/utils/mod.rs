use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Once;

use crate::errors::Result;

const APP_DIR_NAME: &str = ".sales_core";
const HOME_ENV_OVERRIDE: &str = "SALES_CORE_HOME";
const TMP_SUFFIX: &str = "tmp";

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("sales_core=info".parse().unwrap());

        fmt().with_env_filter(filter).init();
    });
}

/// Creates `path` and its parents when missing.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Resolves application directories under the user's home folder.
///
/// `SALES_CORE_HOME` overrides the base directory; tests point it at a
/// temporary folder.
pub struct PathResolver;

impl PathResolver {
    pub fn base_dir() -> PathBuf {
        if let Some(overridden) = std::env::var_os(HOME_ENV_OVERRIDE) {
            return PathBuf::from(overridden);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
    }

    pub fn resolve_base(root: Option<PathBuf>) -> PathBuf {
        root.unwrap_or_else(Self::base_dir)
    }

    pub fn ledger_dir_in(base: &Path) -> PathBuf {
        base.join("ledgers")
    }

    pub fn export_dir_in(base: &Path) -> PathBuf {
        base.join("exports")
    }

    pub fn config_dir_in(base: &Path) -> PathBuf {
        base.join("config")
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        Self::config_dir_in(base).join("config.json")
    }
}

/// Writes `data` through a sibling temp file and renames it into place, so a
/// crash mid-write never leaves a truncated target.
pub fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}
