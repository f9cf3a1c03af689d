//! Diagnostic logging via `tracing`.
//!
//! Diagnostics go to stderr so they never interleave with menu output on
//! stdout. The audit trail is written separately by `core::audit_log`.

use crate::constants;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Filter comes from `CREDKEEPER_LOG`
/// (e.g. `credkeeper=debug`), defaulting to `warn`.
pub fn init() {
    let filter = EnvFilter::try_from_env(constants::LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed (tests); keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
