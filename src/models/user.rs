use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A stored account. The username is the key it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub password_hash: String,
    pub role: String,
    pub failed_attempts: u32,
}

/// Read-only view returned by listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub username: String,
    pub role: String,
}

/// On-disk shape of the data file: two mappings keyed by username.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsersFile {
    #[serde(default)]
    pub users: BTreeMap<String, String>,
    #[serde(default)]
    pub roles: BTreeMap<String, String>,
}

impl UsersFile {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.roles.is_empty()
    }
}
