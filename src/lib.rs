//! Interactive credential manager.
//!
//! Keeps a small set of accounts (password hash + role) in a local JSON file,
//! with password strength rules, Argon2 hashing, and lockout after repeated
//! failed logins.
//!
//! ## Modules
//! - `cli` — Command-line shell and subcommands
//! - `core` — Business logic (policy, hashing, store, persistence, audit)
//! - `models` — Data structures
//! - `util` — Filesystem and logging helpers

pub mod cli;
pub mod constants;
pub mod core;
pub mod error;
pub mod models;
pub mod util;

pub use crate::core::audit_log::{AuditAction, AuditSink, FileAuditSink, NoopAuditSink};
pub use crate::core::password_policy::{is_strong, PasswordPolicy, PolicyViolation, WeakPassword};
pub use crate::core::store::CredentialStore;
pub use crate::error::CredError;
