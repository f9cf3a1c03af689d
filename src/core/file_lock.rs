//! Advisory flock(2) locks held for the duration of a read or write.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// A held lock on a sidecar lock file. Released on drop.
pub struct FileLock {
    _file: File,
}

impl FileLock {
    /// Exclusive lock for writers, blocking until available.
    pub fn exclusive(path: &Path) -> Result<Self> {
        let file = open_lock_file(path)?;
        file.lock_exclusive()
            .with_context(|| format!("acquire exclusive lock {}", path.display()))?;
        Ok(Self { _file: file })
    }

    /// Shared lock for readers; blocks only while a writer holds the file.
    pub fn shared(path: &Path) -> Result<Self> {
        let file = open_lock_file(path)?;
        file.lock_shared()
            .with_context(|| format!("acquire shared lock {}", path.display()))?;
        Ok(Self { _file: file })
    }
}

fn open_lock_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
        .with_context(|| format!("open lock file {}", path.display()))
}
