//! Configuration file model (`credkeeper.toml`).

use crate::constants;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeeperConfig {
    #[serde(default)]
    pub policy: PolicySection,
    #[serde(default)]
    pub storage: StorageSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicySection {
    /// Minimum password length (never below the built-in floor of 8).
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,

    /// Consecutive failed logins before an account locks.
    #[serde(default = "default_max_failed_attempts")]
    pub max_failed_attempts: u32,
}

impl Default for PolicySection {
    fn default() -> Self {
        Self {
            min_password_length: default_min_password_length(),
            max_failed_attempts: default_max_failed_attempts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSection {
    /// Data file, relative to the root unless absolute.
    #[serde(default = "default_data_file")]
    pub data_file: String,

    /// Audit log, relative to the root unless absolute.
    #[serde(default = "default_audit_log")]
    pub audit_log: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            audit_log: default_audit_log(),
        }
    }
}

fn default_min_password_length() -> usize {
    constants::MIN_PASSWORD_LENGTH
}

fn default_max_failed_attempts() -> u32 {
    constants::DEFAULT_MAX_FAILED_ATTEMPTS
}

fn default_data_file() -> String {
    constants::DEFAULT_DATA_FILE.to_string()
}

fn default_audit_log() -> String {
    constants::DEFAULT_AUDIT_LOG.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg: KeeperConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.policy.min_password_length, 8);
        assert_eq!(cfg.policy.max_failed_attempts, 3);
        assert_eq!(cfg.storage.data_file, "users.json");
        assert_eq!(cfg.storage.audit_log, "credkeeper.log");
    }

    #[test]
    fn test_partial_sections() {
        let cfg: KeeperConfig = toml::from_str(
            "[policy]\nmax_failed_attempts = 5\n\n[storage]\ndata_file = \"accounts.json\"\n",
        )
        .unwrap();
        assert_eq!(cfg.policy.max_failed_attempts, 5);
        assert_eq!(cfg.policy.min_password_length, 8);
        assert_eq!(cfg.storage.data_file, "accounts.json");
        assert_eq!(cfg.storage.audit_log, "credkeeper.log");
    }
}
