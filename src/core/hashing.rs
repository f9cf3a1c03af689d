//! Argon2id password hashing in PHC string format.

use crate::error::{CredError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password with a fresh random salt and the default Argon2 cost.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CredError::HashingFailure(e.to_string()))?;
    Ok(hash.to_string())
}

/// Returns `Ok(false)` on mismatch; a stored hash that cannot be parsed is a
/// `HashingFailure`.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| CredError::HashingFailure(format!("unreadable stored hash: {}", e)))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CredError::HashingFailure(e.to_string())),
    }
}
