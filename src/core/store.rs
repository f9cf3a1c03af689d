//! In-memory credential store with failed-login lockout.
//!
//! The store owns every account for the lifetime of the process. Hash and
//! role live in one [`UserRecord`] per username, so an account can never have
//! one without the other; the split `users`/`roles` shape only exists in the
//! [`UsersFile`] snapshot exchanged with the persistence layer.
//!
//! All mutations take `&mut self`. Check-then-act sequences (duplicate check
//! then insert, lockout check then increment) are atomic as long as the store
//! has a single owner; concurrent callers must wrap it in a `Mutex`.

use crate::constants;
use crate::core::audit_log::{AuditAction, AuditSink};
use crate::core::hashing;
use crate::core::password_policy::PasswordPolicy;
use crate::error::{CredError, Result};
use crate::models::config::PolicySection;
use crate::models::user::{UserRecord, UserSummary, UsersFile};
use std::collections::HashMap;

/// Outcome of merging a snapshot into the store.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    pub loaded: usize,
    /// Usernames present in only one of the two mappings.
    pub skipped: Vec<String>,
}

pub struct CredentialStore<S: AuditSink> {
    users: HashMap<String, UserRecord>,
    policy: PasswordPolicy,
    max_failed_attempts: u32,
    sink: S,
}

impl<S: AuditSink> CredentialStore<S> {
    /// Empty store with the default password policy and lockout threshold.
    pub fn new(sink: S) -> Self {
        Self {
            users: HashMap::new(),
            policy: PasswordPolicy::default(),
            max_failed_attempts: constants::DEFAULT_MAX_FAILED_ATTEMPTS,
            sink,
        }
    }

    /// Empty store configured from the `[policy]` section.
    pub fn with_policy(policy: &PolicySection, sink: S) -> Self {
        Self {
            users: HashMap::new(),
            policy: PasswordPolicy::with_min_length(policy.min_password_length),
            max_failed_attempts: policy.max_failed_attempts.max(1),
            sink,
        }
    }

    pub fn max_failed_attempts(&self) -> u32 {
        self.max_failed_attempts
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    pub fn failed_attempts(&self, username: &str) -> Option<u32> {
        self.users.get(username).map(|r| r.failed_attempts)
    }

    pub fn is_locked(&self, username: &str) -> bool {
        self.failed_attempts(username)
            .is_some_and(|n| n >= self.max_failed_attempts)
    }

    pub fn add_user(&mut self, username: &str, password: &str, role: &str) -> Result<()> {
        if self.users.contains_key(username) {
            return Err(CredError::DuplicateUser(username.to_string()));
        }
        self.policy.check(password)?;
        let password_hash = hashing::hash_password(password)?;

        self.users.insert(
            username.to_string(),
            UserRecord {
                password_hash,
                role: role.to_string(),
                failed_attempts: 0,
            },
        );
        tracing::info!(username, role, "user added");
        self.sink.record(AuditAction::UserAdded, username);
        Ok(())
    }

    /// Every account with its role, in no particular order.
    pub fn list_users(&self) -> Vec<UserSummary> {
        self.users
            .iter()
            .map(|(username, record)| UserSummary {
                username: username.clone(),
                role: record.role.clone(),
            })
            .collect()
    }

    pub fn delete_user(&mut self, username: &str, password: &str) -> Result<()> {
        self.verify(username, password)?;
        self.users.remove(username);
        tracing::info!(username, "user deleted");
        self.sink.record(AuditAction::UserDeleted, username);
        Ok(())
    }

    /// Check a login. A locked account is rejected before the password is
    /// compared, even when the password is correct.
    pub fn authenticate(&mut self, username: &str, password: &str) -> Result<()> {
        if self.is_locked(username) {
            tracing::warn!(username, "login rejected: account locked");
            return Err(CredError::AccountLocked(username.to_string()));
        }
        let record = self
            .users
            .get_mut(username)
            .ok_or_else(|| CredError::NotFound(username.to_string()))?;

        if hashing::verify_password(password, &record.password_hash)? {
            record.failed_attempts = 0;
            tracing::info!(username, "login succeeded");
            self.sink.record(AuditAction::LoginSucceeded, username);
            Ok(())
        } else {
            record.failed_attempts += 1;
            tracing::warn!(username, attempts = record.failed_attempts, "login failed");
            self.sink.record(AuditAction::LoginFailed, username);
            Err(CredError::WrongPassword(username.to_string()))
        }
    }

    /// Replace a password. Leaves the failed-attempt counter as it is.
    pub fn rotate_password(
        &mut self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        self.verify(username, old_password)?;
        self.policy.check(new_password)?;
        let new_hash = hashing::hash_password(new_password)?;

        let record = self
            .users
            .get_mut(username)
            .ok_or_else(|| CredError::NotFound(username.to_string()))?;
        record.password_hash = new_hash;
        tracing::info!(username, "password rotated");
        self.sink.record(AuditAction::PasswordRotated, username);
        Ok(())
    }

    /// Check a password without touching counters or the audit trail.
    pub fn verify(&self, username: &str, password: &str) -> Result<()> {
        let record = self
            .users
            .get(username)
            .ok_or_else(|| CredError::NotFound(username.to_string()))?;
        if hashing::verify_password(password, &record.password_hash)? {
            Ok(())
        } else {
            Err(CredError::WrongPassword(username.to_string()))
        }
    }

    /// Merge a persisted snapshot, joining hashes and roles by username.
    /// Existing accounts with the same name are replaced.
    pub fn restore(&mut self, snapshot: UsersFile) -> RestoreReport {
        let UsersFile { users, mut roles } = snapshot;
        let mut report = RestoreReport::default();

        for (username, password_hash) in users {
            match roles.remove(&username) {
                Some(role) => {
                    self.users.insert(
                        username,
                        UserRecord {
                            password_hash,
                            role,
                            failed_attempts: 0,
                        },
                    );
                    report.loaded += 1;
                }
                None => report.skipped.push(username),
            }
        }
        report.skipped.extend(roles.into_keys());
        report.skipped.sort();

        for username in &report.skipped {
            tracing::warn!(username = %username, "skipping entry without both hash and role");
        }
        report
    }

    pub fn snapshot(&self) -> UsersFile {
        let mut data = UsersFile::default();
        for (username, record) in &self.users {
            data.users.insert(username.clone(), record.password_hash.clone());
            data.roles.insert(username.clone(), record.role.clone());
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audit_log::NoopAuditSink;
    use crate::core::password_policy::PolicyViolation;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingSink {
        events: RefCell<Vec<(AuditAction, String)>>,
    }

    impl AuditSink for RecordingSink {
        fn record(&self, action: AuditAction, username: &str) {
            self.events.borrow_mut().push((action, username.to_string()));
        }
    }

    impl RecordingSink {
        fn actions(&self) -> Vec<AuditAction> {
            self.events.borrow().iter().map(|(a, _)| *a).collect()
        }
    }

    const PW: &str = "Str0ng!Pw";
    const NEW_PW: &str = "N3w!Passw";

    fn store_with_alice() -> CredentialStore<NoopAuditSink> {
        let mut store = CredentialStore::new(NoopAuditSink);
        store.add_user("alice", PW, "admin").unwrap();
        store
    }

    #[test]
    fn test_scenario_add_duplicate_login() {
        let sink = RecordingSink::default();
        let mut store = CredentialStore::new(&sink);
        store.add_user("alice", PW, "admin").unwrap();

        let err = store.add_user("alice", "Other1!Pw", "user").unwrap_err();
        assert!(matches!(err, CredError::DuplicateUser(ref u) if u == "alice"));

        let err = store.authenticate("alice", "wrong").unwrap_err();
        assert!(matches!(err, CredError::WrongPassword(_)));
        assert_eq!(store.failed_attempts("alice"), Some(1));

        store.authenticate("alice", PW).unwrap();
        assert_eq!(store.failed_attempts("alice"), Some(0));

        assert_eq!(
            sink.actions(),
            vec![
                AuditAction::UserAdded,
                AuditAction::LoginFailed,
                AuditAction::LoginSucceeded
            ]
        );
    }

    #[test]
    fn test_duplicate_rejected_before_policy() {
        let mut store = store_with_alice();
        let err = store.add_user("alice", "weak", "user").unwrap_err();
        assert!(matches!(err, CredError::DuplicateUser(_)));
    }

    #[test]
    fn test_usernames_are_case_sensitive() {
        let mut store = store_with_alice();
        store.add_user("Alice", PW, "user").unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_weak_password_rejected() {
        let mut store = CredentialStore::new(NoopAuditSink);
        let err = store.add_user("bob", "password", "user").unwrap_err();
        match err {
            CredError::WeakPassword(w) => {
                assert!(w.violations.contains(&PolicyViolation::MissingUppercase));
                assert!(w.violations.contains(&PolicyViolation::MissingDigit));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_stored_hash_is_not_plaintext() {
        let store = store_with_alice();
        let snap = store.snapshot();
        let hash = &snap.users["alice"];
        assert_ne!(hash, PW);
        assert!(!hash.contains(PW));
    }

    #[test]
    fn test_list_users() {
        let mut store = store_with_alice();
        store.add_user("bob", PW, "user").unwrap();
        let mut listed = store.list_users();
        listed.sort_by(|a, b| a.username.cmp(&b.username));
        assert_eq!(
            listed,
            vec![
                UserSummary {
                    username: "alice".into(),
                    role: "admin".into(),
                },
                UserSummary {
                    username: "bob".into(),
                    role: "user".into(),
                },
            ]
        );
    }

    #[test]
    fn test_lockout_after_three_failures() {
        let mut store = store_with_alice();
        for _ in 0..3 {
            let err = store.authenticate("alice", "wrong").unwrap_err();
            assert!(matches!(err, CredError::WrongPassword(_)));
        }
        assert!(store.is_locked("alice"));
        let err = store.authenticate("alice", PW).unwrap_err();
        assert!(matches!(err, CredError::AccountLocked(_)));
        // rejected before comparison: counter unchanged
        assert_eq!(store.failed_attempts("alice"), Some(3));
    }

    #[test]
    fn test_success_resets_counter() {
        let mut store = store_with_alice();
        assert!(store.authenticate("alice", "wrong").is_err());
        assert!(store.authenticate("alice", "wrong").is_err());
        store.authenticate("alice", PW).unwrap();
        assert!(store.authenticate("alice", "wrong").is_err());
        assert!(store.authenticate("alice", "wrong").is_err());
        assert!(!store.is_locked("alice"));
        store.authenticate("alice", PW).unwrap();
    }

    #[test]
    fn test_authenticate_unknown_user() {
        let mut store = CredentialStore::new(NoopAuditSink);
        let err = store.authenticate("ghost", PW).unwrap_err();
        assert!(matches!(err, CredError::NotFound(_)));
        assert_eq!(store.failed_attempts("ghost"), None);
    }

    #[test]
    fn test_configured_lockout_threshold() {
        let policy = PolicySection {
            max_failed_attempts: 1,
            ..PolicySection::default()
        };
        let mut store = CredentialStore::with_policy(&policy, NoopAuditSink);
        store.add_user("alice", PW, "admin").unwrap();
        assert!(store.authenticate("alice", "wrong").is_err());
        assert!(matches!(
            store.authenticate("alice", PW),
            Err(CredError::AccountLocked(_))
        ));
    }

    #[test]
    fn test_zero_threshold_is_clamped() {
        let policy = PolicySection {
            max_failed_attempts: 0,
            ..PolicySection::default()
        };
        let store = CredentialStore::with_policy(&policy, NoopAuditSink);
        assert_eq!(store.max_failed_attempts(), 1);
    }

    #[test]
    fn test_delete_requires_password() {
        let sink = RecordingSink::default();
        let mut store = CredentialStore::new(&sink);
        store.add_user("alice", PW, "admin").unwrap();

        let err = store.delete_user("alice", "wrong").unwrap_err();
        assert!(matches!(err, CredError::WrongPassword(_)));
        assert!(store.contains("alice"));
        assert_eq!(store.failed_attempts("alice"), Some(0));

        store.delete_user("alice", PW).unwrap();
        assert!(!store.contains("alice"));
        assert!(store.snapshot().is_empty());
        assert_eq!(
            sink.actions(),
            vec![AuditAction::UserAdded, AuditAction::UserDeleted]
        );
    }

    #[test]
    fn test_delete_unknown_user() {
        let mut store = store_with_alice();
        assert!(matches!(
            store.delete_user("bob", PW),
            Err(CredError::NotFound(_))
        ));
    }

    #[test]
    fn test_readded_user_starts_unlocked() {
        let mut store = store_with_alice();
        for _ in 0..2 {
            assert!(store.authenticate("alice", "wrong").is_err());
        }
        store.delete_user("alice", PW).unwrap();
        store.add_user("alice", PW, "user").unwrap();
        assert_eq!(store.failed_attempts("alice"), Some(0));
    }

    #[test]
    fn test_rotate_password() {
        let sink = RecordingSink::default();
        let mut store = CredentialStore::new(&sink);
        store.add_user("alice", PW, "admin").unwrap();
        store.rotate_password("alice", PW, NEW_PW).unwrap();
        assert!(matches!(
            store.verify("alice", PW),
            Err(CredError::WrongPassword(_))
        ));
        store.verify("alice", NEW_PW).unwrap();
        assert_eq!(sink.actions().last(), Some(&AuditAction::PasswordRotated));
    }

    #[test]
    fn test_rotate_error_order_and_no_mutation() {
        let mut store = store_with_alice();
        let before = store.snapshot();

        assert!(matches!(
            store.rotate_password("bob", PW, NEW_PW),
            Err(CredError::NotFound(_))
        ));
        assert!(matches!(
            store.rotate_password("alice", "wrong", "weak"),
            Err(CredError::WrongPassword(_))
        ));
        assert!(matches!(
            store.rotate_password("alice", PW, "weak"),
            Err(CredError::WeakPassword(_))
        ));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_rotate_does_not_unlock() {
        let mut store = store_with_alice();
        for _ in 0..3 {
            assert!(store.authenticate("alice", "wrong").is_err());
        }
        store.rotate_password("alice", PW, NEW_PW).unwrap();
        assert!(store.is_locked("alice"));
        assert!(matches!(
            store.authenticate("alice", NEW_PW),
            Err(CredError::AccountLocked(_))
        ));
    }

    #[test]
    fn test_verify_leaves_counter_alone() {
        let store = store_with_alice();
        assert!(store.verify("alice", "wrong").is_err());
        assert_eq!(store.failed_attempts("alice"), Some(0));
    }

    #[test]
    fn test_corrupt_hash_is_hashing_failure() {
        let mut store = CredentialStore::new(NoopAuditSink);
        let mut snap = UsersFile::default();
        snap.users.insert("legacy".into(), "$2a$10$notaphcstring".into());
        snap.roles.insert("legacy".into(), "user".into());
        store.restore(snap);
        assert!(matches!(
            store.authenticate("legacy", PW),
            Err(CredError::HashingFailure(_))
        ));
        assert_eq!(store.failed_attempts("legacy"), Some(0));
    }

    #[test]
    fn test_snapshot_restore_roundtrip() {
        let mut store = store_with_alice();
        store.add_user("bob", PW, "user").unwrap();
        let snap = store.snapshot();

        let mut fresh = CredentialStore::new(NoopAuditSink);
        let report = fresh.restore(snap.clone());
        assert_eq!(report.loaded, 2);
        assert!(report.skipped.is_empty());
        assert_eq!(fresh.snapshot(), snap);
        fresh.authenticate("bob", PW).unwrap();
    }

    #[test]
    fn test_restore_skips_orphans() {
        let mut snap = UsersFile::default();
        snap.users.insert("alice".into(), "h1".into());
        snap.roles.insert("alice".into(), "admin".into());
        snap.users.insert("nohash-role".into(), "h2".into());
        snap.roles.insert("orphan-role".into(), "user".into());

        let mut store = CredentialStore::new(NoopAuditSink);
        let report = store.restore(snap);
        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped, vec!["nohash-role".to_string(), "orphan-role".to_string()]);
        assert_eq!(store.len(), 1);
        let out = store.snapshot();
        assert_eq!(out.users.len(), out.roles.len());
    }
}
