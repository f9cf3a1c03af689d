//! Filesystem helpers and logging setup.

pub mod fs;
pub mod logging;
