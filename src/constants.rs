//! Centralized constants for defaults, permissions, and file names.

/// Environment variable overriding the data root directory.
pub const ROOT_ENV: &str = "CREDKEEPER_ROOT";

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV: &str = "CREDKEEPER_LOG";

/// Default file holding the `users` and `roles` mappings.
pub const DEFAULT_DATA_FILE: &str = "users.json";

/// Default append-only audit log.
pub const DEFAULT_AUDIT_LOG: &str = "credkeeper.log";

/// Optional configuration file, relative to the root.
pub const CONFIG_FILE: &str = "credkeeper.toml";

/// Minimum password length. Configuration may raise it, never lower it.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Consecutive failed logins after which an account is locked.
pub const DEFAULT_MAX_FAILED_ATTEMPTS: u32 = 3;

/// Permission mode for the data file (contains password hashes).
pub const DATA_FILE_MODE: u32 = 0o600;

/// Permission mode for the audit log.
pub const AUDIT_LOG_MODE: u32 = 0o640;
