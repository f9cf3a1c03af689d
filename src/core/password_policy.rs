//! Password strength rules shared by account creation and rotation.
//!
//! Length is counted in characters (Unicode scalar values), not bytes: "é"
//! counts once even though it is two bytes of UTF-8, so a short non-ASCII
//! password cannot pass the length floor on byte count alone. Non-ASCII
//! characters add to the length but satisfy none of the character classes.

use crate::constants;
use std::fmt;
use thiserror::Error;

/// A single strength rule that a password failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error("must be at least {0} characters long")]
    TooShort(usize),
    #[error("must contain an uppercase letter")]
    MissingUppercase,
    #[error("must contain a lowercase letter")]
    MissingLowercase,
    #[error("must contain a digit")]
    MissingDigit,
    #[error("must contain a symbol")]
    MissingSymbol,
}

/// Rejection carrying every failed rule, in rule order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeakPassword {
    pub violations: Vec<PolicyViolation>,
}

impl fmt::Display for WeakPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "weak password: ")?;
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", v)?;
        }
        Ok(())
    }
}

impl std::error::Error for WeakPassword {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: constants::MIN_PASSWORD_LENGTH,
        }
    }
}

impl PasswordPolicy {
    /// Policy with a custom minimum length, clamped to the built-in floor.
    pub fn with_min_length(min_length: usize) -> Self {
        Self {
            min_length: min_length.max(constants::MIN_PASSWORD_LENGTH),
        }
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn check(&self, password: &str) -> Result<(), WeakPassword> {
        let mut violations = Vec::new();

        if password.chars().count() < self.min_length {
            violations.push(PolicyViolation::TooShort(self.min_length));
        }

        let (mut upper, mut lower, mut digit, mut symbol) = (false, false, false, false);
        for c in password.chars() {
            upper |= c.is_ascii_uppercase();
            lower |= c.is_ascii_lowercase();
            digit |= c.is_ascii_digit();
            symbol |= is_symbol(c);
        }

        if !upper {
            violations.push(PolicyViolation::MissingUppercase);
        }
        if !lower {
            violations.push(PolicyViolation::MissingLowercase);
        }
        if !digit {
            violations.push(PolicyViolation::MissingDigit);
        }
        if !symbol {
            violations.push(PolicyViolation::MissingSymbol);
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(WeakPassword { violations })
        }
    }

    pub fn is_strong(&self, password: &str) -> bool {
        self.check(password).is_ok()
    }
}

/// Check a password against the default policy.
pub fn is_strong(password: &str) -> bool {
    PasswordPolicy::default().is_strong(password)
}

/// ASCII symbol ranges `!`..=`/`, `:`..=`@`, `[`..=`` ` ``, `{`..=`~`.
fn is_symbol(c: char) -> bool {
    matches!(c, '!'..='/' | ':'..='@' | '['..='`' | '{'..='~')
}
