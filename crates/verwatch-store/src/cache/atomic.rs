//! Atomic write primitives
//!
//! Uses temp→rename so readers never observe a partial document

use crate::errors::{io_error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Temp path next to the target: `<file name>.tmp`
fn temp_path(target_path: &Path) -> PathBuf {
    let mut name = target_path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".tmp");
    target_path.with_file_name(name)
}

/// Atomically write bytes to a file, creating parent directories
///
/// # Errors
///
/// - `Io`: directory creation, write or rename failed
pub async fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| io_error("create_cache_dir", e))?;
    }

    let temp = temp_path(target_path);
    fs::write(&temp, content)
        .await
        .map_err(|e| io_error("write_cache_temp", e))?;
    fs::rename(&temp, target_path)
        .await
        .map_err(|e| io_error("rename_cache_temp", e))?;

    Ok(())
}
