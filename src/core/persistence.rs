//! Load and save the user data file.
//!
//! The file holds two top-level objects, `users` (username to hash) and
//! `roles` (username to role). Decoding is typed: a value of the wrong shape
//! fails the whole load rather than being coerced.

use crate::constants;
use crate::core::file_lock::FileLock;
use crate::error::{CredError, Result};
use crate::models::user::UsersFile;
use crate::util::fs as keeper_fs;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Sidecar lock file guarding `path`.
pub fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("data"));
    name.push(".lock");
    path.with_file_name(name)
}

/// Read the data file. `Ok(None)` when it does not exist.
pub fn load(path: &Path) -> Result<Option<UsersFile>> {
    if !path.exists() {
        return Ok(None);
    }
    let _lock = FileLock::shared(&lock_path_for(path))
        .map_err(|e| CredError::persistence(path, format!("{:#}", e)))?;
    let content = fs::read_to_string(path).map_err(|e| CredError::persistence(path, e))?;
    let data: UsersFile = serde_json::from_str(&content)
        .map_err(|e| CredError::persistence(path, format!("malformed data file: {}", e)))?;
    Ok(Some(data))
}

/// Like [`load`], but a missing or unreadable file yields an empty snapshot
/// and a warning instead of an error. The load error is handed back so a
/// caller about to save can avoid silently replacing a file it never read.
pub fn load_or_empty(path: &Path) -> (UsersFile, Option<CredError>) {
    match load(path) {
        Ok(Some(data)) => (data, None),
        Ok(None) => {
            tracing::warn!(path = %path.display(), "data file not found, starting empty");
            (UsersFile::default(), None)
        }
        Err(e) => {
            tracing::warn!("{}; starting empty", e);
            (UsersFile::default(), Some(e))
        }
    }
}

/// Overwrite the data file atomically with a pretty-printed snapshot.
pub fn save(path: &Path, data: &UsersFile) -> Result<()> {
    let mut content = serde_json::to_string_pretty(data)
        .map_err(|e| CredError::persistence(path, format!("serialize: {}", e)))?;
    content.push('\n');

    keeper_fs::ensure_parent(path).map_err(|e| CredError::persistence(path, format!("{:#}", e)))?;
    let _lock = FileLock::exclusive(&lock_path_for(path))
        .map_err(|e| CredError::persistence(path, format!("{:#}", e)))?;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".users-")
        .suffix(".json.tmp")
        .tempfile_in(dir)
        .map_err(|e| CredError::persistence(path, format!("create temp file: {}", e)))?;
    tmp.write_all(content.as_bytes())
        .and_then(|_| tmp.flush())
        .map_err(|e| CredError::persistence(path, format!("write temp file: {}", e)))?;
    keeper_fs::set_permissions(tmp.path(), constants::DATA_FILE_MODE)
        .map_err(|e| CredError::persistence(path, format!("{:#}", e)))?;

    tmp.persist(path)
        .map_err(|e| CredError::persistence(path, format!("persist: {}", e.error)))?;
    tracing::debug!(
        path = %path.display(),
        users = data.users.len(),
        "data file saved"
    );
    Ok(())
}
