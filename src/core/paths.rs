//! Data root resolution and file layout.

use crate::constants;
use crate::core::persistence;
use crate::models::config::StorageSection;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct KeeperPaths {
    pub root: PathBuf,
    pub config_file: PathBuf,
    pub data_file: PathBuf,
    pub audit_log: PathBuf,
    pub audit_lock: PathBuf,
}

impl KeeperPaths {
    /// Resolve the root from the CLI arg, then `CREDKEEPER_ROOT`, then the
    /// current directory.
    pub fn resolve(root_arg: Option<PathBuf>) -> Result<Self> {
        if let Some(root) = root_arg {
            return Ok(Self::from_root(root));
        }
        if let Ok(root) = env::var(constants::ROOT_ENV) {
            if !root.is_empty() {
                return Ok(Self::from_root(PathBuf::from(root)));
            }
        }
        let cwd = env::current_dir().context("resolve current directory")?;
        Ok(Self::from_root(cwd))
    }

    /// Default file names under `root`.
    pub fn from_root(root: PathBuf) -> Self {
        Self::with_storage(root, &StorageSection::default())
    }

    /// File names taken from the `[storage]` config section. Relative names
    /// are joined onto the root; absolute ones are used as-is.
    pub fn with_storage(root: PathBuf, storage: &StorageSection) -> Self {
        let config_file = root.join(constants::CONFIG_FILE);
        let data_file = root.join(&storage.data_file);
        let audit_log = root.join(&storage.audit_log);
        let audit_lock = persistence::lock_path_for(&audit_log);
        Self {
            root,
            config_file,
            data_file,
            audit_log,
            audit_lock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_root() {
        let paths = KeeperPaths::from_root(PathBuf::from("/test"));
        assert_eq!(paths.root, PathBuf::from("/test"));
        assert_eq!(paths.config_file, PathBuf::from("/test/credkeeper.toml"));
        assert_eq!(paths.data_file, PathBuf::from("/test/users.json"));
        assert_eq!(paths.audit_log, PathBuf::from("/test/credkeeper.log"));
        assert_eq!(paths.audit_lock, PathBuf::from("/test/credkeeper.log.lock"));
    }

    #[test]
    fn test_with_storage_absolute_override() {
        let storage = StorageSection {
            data_file: "/srv/accounts.json".into(),
            audit_log: "logs/audit.log".into(),
        };
        let paths = KeeperPaths::with_storage(PathBuf::from("/test"), &storage);
        assert_eq!(paths.data_file, PathBuf::from("/srv/accounts.json"));
        assert_eq!(paths.audit_log, PathBuf::from("/test/logs/audit.log"));
    }

    #[test]
    fn test_resolve_prefers_explicit_root() {
        let paths = KeeperPaths::resolve(Some(PathBuf::from("/explicit"))).unwrap();
        assert_eq!(paths.root, PathBuf::from("/explicit"));
    }
}
