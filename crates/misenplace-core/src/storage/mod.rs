mod config;
pub mod fields;
mod lock;
pub mod task_store;

pub use config::{AuthConfig, AuthMode, Config, DuplicatePolicy, StorageConfig, ValidationConfig};
pub use lock::{hold, locks_for};
pub use task_store::TaskStore;

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, StorageError};

/// Returns the data directory, creating it if needed.
///
/// `MISENPLACE_DATA_DIR` wins when set. Otherwise `~/.config/misenplace[-dev]/`
/// based on MISENPLACE_ENV (set MISENPLACE_ENV=dev for a development copy).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("MISENPLACE_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("MISENPLACE_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("misenplace-dev")
            } else {
                base_dir.join("misenplace")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Replace `path` with whatever `write` produces, atomically.
///
/// Content goes to a temporary file in the same directory, is synced, then
/// renamed over `path`. A crash before the rename leaves the old file intact.
pub(crate) fn write_atomic<F>(path: &Path, write: F) -> Result<(), StorageError>
where
    F: FnOnce(&mut File) -> Result<(), StorageError>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".misenplace-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| StorageError::io(path, e))?;

    write(tmp.as_file_mut())?;
    tmp.as_file_mut()
        .flush()
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| StorageError::io(path, e))?;

    tmp.persist(path).map_err(|e| StorageError::io(path, e.error))?;
    tracing::debug!(path = %path.display(), "atomic write completed");
    Ok(())
}
