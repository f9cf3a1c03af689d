//! Error taxonomy for credential operations.
//!
//! Every variant is recoverable at the command boundary: the shell prints it
//! and waits for the next command.

use crate::core::password_policy::WeakPassword;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredError {
    #[error("user already exists: {0}")]
    DuplicateUser(String),

    #[error(transparent)]
    WeakPassword(#[from] WeakPassword),

    #[error("user not found: {0}")]
    NotFound(String),

    #[error("wrong password for {0}")]
    WrongPassword(String),

    #[error("account locked: {0} (contact an administrator)")]
    AccountLocked(String),

    #[error("password hashing failed: {0}")]
    HashingFailure(String),

    #[error("cannot access {}: {reason}", .path.display())]
    PersistenceFailure { path: PathBuf, reason: String },
}

impl CredError {
    pub(crate) fn persistence(path: &std::path::Path, reason: impl std::fmt::Display) -> Self {
        CredError::PersistenceFailure {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = CredError> = std::result::Result<T, E>;
