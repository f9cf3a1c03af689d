//! CLI routing and command dispatch.

use crate::core::audit_log::{AuditSink, FileAuditSink};
use crate::core::paths::KeeperPaths;
use crate::core::persistence;
use crate::core::store::CredentialStore;
use crate::error::CredError;
use crate::models::config::KeeperConfig;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

pub mod audit;
pub mod list;
pub mod shell;

/// Shared context passed to all command handlers.
pub struct CliContext {
    pub paths: KeeperPaths,
    pub config: KeeperConfig,
    pub config_load_warning: Option<String>,
}

impl CliContext {
    /// Resolve the root, read `credkeeper.toml` if present, and lay out paths
    /// from its `[storage]` section.
    pub fn load(root: Option<PathBuf>) -> Result<Self> {
        let base = KeeperPaths::resolve(root)?;
        let mut config_load_warning = None;
        let config = if base.config_file.exists() {
            match load_config(&base.config_file) {
                Ok(cfg) => cfg,
                Err(e) => {
                    config_load_warning = Some(format!("{:#}; using defaults", e));
                    KeeperConfig::default()
                }
            }
        } else {
            KeeperConfig::default()
        };
        if let Some(w) = &config_load_warning {
            tracing::warn!("{}", w);
        }
        let paths = KeeperPaths::with_storage(base.root, &config.storage);
        Ok(Self {
            paths,
            config,
            config_load_warning,
        })
    }

    pub fn audit_sink(&self) -> FileAuditSink {
        FileAuditSink::new(self.paths.audit_log.clone(), self.paths.audit_lock.clone())
    }

    /// Build a store from the data file. A missing or unreadable file leaves
    /// the store empty; the read error, if any, is returned alongside it.
    pub fn open_store<S: AuditSink>(&self, sink: S) -> (CredentialStore<S>, Option<CredError>) {
        let mut store = CredentialStore::with_policy(&self.config.policy, sink);
        let (snapshot, load_error) = persistence::load_or_empty(&self.paths.data_file);
        let report = store.restore(snapshot);
        tracing::debug!(
            path = %self.paths.data_file.display(),
            loaded = report.loaded,
            skipped = report.skipped.len(),
            "store loaded"
        );
        (store, load_error)
    }

    pub fn save_store<S: AuditSink>(&self, store: &CredentialStore<S>) -> Result<(), CredError> {
        persistence::save(&self.paths.data_file, &store.snapshot())
    }
}

fn load_config(path: &Path) -> Result<KeeperConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parse config {}", path.display()))
}

#[derive(Parser, Debug)]
#[command(name = "credkeeper", version, about = "Interactive user credential manager")]
pub struct Cli {
    /// Directory holding users.json, the audit log, and credkeeper.toml
    #[arg(long, global = true, value_name = "PATH", env = "CREDKEEPER_ROOT")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let ctx = CliContext::load(self.root)?;
        match self.command.unwrap_or(Commands::Shell) {
            Commands::Shell => shell::run(&ctx),
            Commands::List(args) => list::run(&ctx, args),
            Commands::Audit(args) => audit::run(&ctx, args),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive menu (default)
    Shell,
    /// List users and roles
    List(list::ListArgs),
    /// View the audit trail
    Audit(audit::AuditArgs),
}
