//! Core credential logic (policy, hashing, store, persistence, audit).

pub mod audit_log;
pub mod file_lock;
pub mod hashing;
pub mod password_policy;
pub mod paths;
pub mod persistence;
pub mod store;
