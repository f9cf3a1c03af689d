//! Append-only audit trail for account operations.
//!
//! Recording is best-effort: a failed write is logged and dropped, it never
//! fails the operation that produced the event.

use crate::constants;
use crate::core::file_lock::FileLock;
use crate::util::fs as keeper_fs;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    UserAdded,
    UserDeleted,
    LoginSucceeded,
    LoginFailed,
    PasswordRotated,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::UserAdded => "user_added",
            AuditAction::UserDeleted => "user_deleted",
            AuditAction::LoginSucceeded => "login_succeeded",
            AuditAction::LoginFailed => "login_failed",
            AuditAction::PasswordRotated => "password_rotated",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver of account events.
pub trait AuditSink {
    fn record(&self, action: AuditAction, username: &str);
}

impl<T: AuditSink + ?Sized> AuditSink for &T {
    fn record(&self, action: AuditAction, username: &str) {
        (**self).record(action, username)
    }
}

/// Discards every event. Used by read-only commands.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _action: AuditAction, _username: &str) {}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    pub username: String,
    pub actor: String,
}

/// Writes one JSON line per event to the audit log.
#[derive(Debug, Clone)]
pub struct FileAuditSink {
    log_path: PathBuf,
    lock_path: PathBuf,
}

impl FileAuditSink {
    pub fn new(log_path: PathBuf, lock_path: PathBuf) -> Self {
        Self {
            log_path,
            lock_path,
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    fn append(&self, action: AuditAction, username: &str) -> Result<()> {
        keeper_fs::ensure_parent(&self.lock_path)?;
        let _lock = FileLock::exclusive(&self.lock_path)?;
        let entry = AuditEntry {
            timestamp: Utc::now(),
            action,
            username: username.to_string(),
            actor: detect_actor(),
        };
        let line = serde_json::to_string(&entry).context("serialize audit entry")?;
        append_line(&self.log_path, &line)
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, action: AuditAction, username: &str) {
        if let Err(e) = self.append(action, username) {
            tracing::warn!(
                action = %action,
                log = %self.log_path.display(),
                "audit log write failed: {:#}",
                e
            );
        }
    }
}

fn detect_actor() -> String {
    if let Ok(user) = std::env::var("SUDO_USER") {
        if !user.is_empty() {
            return format!("{}(sudo)", user);
        }
    }
    std::env::var("USER").unwrap_or_else(|_| "unknown".to_string())
}

fn append_line(path: &Path, line: &str) -> Result<()> {
    keeper_fs::ensure_parent(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open audit log {}", path.display()))?;
    writeln!(file, "{}", line).context("write audit entry")?;
    keeper_fs::set_permissions(path, constants::AUDIT_LOG_MODE)
}

/// Read entries back, keeping only the last `limit` when given.
pub fn read_log(path: &Path, limit: Option<usize>) -> Result<Vec<AuditEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = fs::File::open(path)
        .with_context(|| format!("open audit log {}", path.display()))?;
    let mut entries = Vec::new();
    let mut malformed = 0usize;

    for line in BufReader::new(file).lines() {
        let line = line.context("read audit log line")?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<AuditEntry>(trimmed) {
            Ok(entry) => entries.push(entry),
            Err(_) => malformed += 1,
        }
    }

    if malformed > 0 {
        tracing::warn!("{} malformed audit entries skipped", malformed);
    }

    if let Some(limit) = limit {
        if entries.len() > limit {
            entries = entries.split_off(entries.len() - limit);
        }
    }

    Ok(entries)
}
