//! Password policy and argon2 hashing.

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;

use super::domain::IdentityError;
use super::errors::AuthError;

pub const PASSWORD_ALGORITHM: &str = "argon2";

/// Rules a new password must satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub required_length: usize,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_non_alphanumeric: bool,
    pub required_unique_chars: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        (&configs::PasswordConfig::default()).into()
    }
}

impl From<&configs::PasswordConfig> for PasswordPolicy {
    fn from(c: &configs::PasswordConfig) -> Self {
        Self {
            required_length: c.required_length,
            require_digit: c.require_digit,
            require_lowercase: c.require_lowercase,
            require_uppercase: c.require_uppercase,
            require_non_alphanumeric: c.require_non_alphanumeric,
            required_unique_chars: c.required_unique_chars,
        }
    }
}

impl PasswordPolicy {
    /// Every rule the password breaks, in a fixed order. Empty means accepted.
    pub fn validate(&self, password: &str) -> Vec<IdentityError> {
        let mut errors = Vec::new();
        if password.chars().count() < self.required_length {
            errors.push(IdentityError::new(
                "PasswordTooShort",
                format!("Passwords must be at least {} characters.", self.required_length),
            ));
        }
        if self.require_non_alphanumeric && password.chars().all(|c| c.is_ascii_alphanumeric()) {
            errors.push(IdentityError::new(
                "PasswordRequiresNonAlphanumeric",
                "Passwords must have at least one non alphanumeric character.",
            ));
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push(IdentityError::new(
                "PasswordRequiresDigit",
                "Passwords must have at least one digit ('0'-'9').",
            ));
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            errors.push(IdentityError::new(
                "PasswordRequiresLower",
                "Passwords must have at least one lowercase ('a'-'z').",
            ));
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            errors.push(IdentityError::new(
                "PasswordRequiresUpper",
                "Passwords must have at least one uppercase ('A'-'Z').",
            ));
        }
        if self.required_unique_chars > 1 {
            let mut seen: Vec<char> = password.chars().collect();
            seen.sort_unstable();
            seen.dedup();
            if seen.len() < self.required_unique_chars {
                errors.push(IdentityError::new(
                    "PasswordRequiresUniqueChars",
                    format!("Passwords must use at least {} different characters.", self.required_unique_chars),
                ));
            }
        }
        errors
    }
}

/// Hash with a fresh random salt; returns the PHC string.
pub fn hash(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::HashError(e.to_string()))
}

/// An unparseable stored hash never verifies.
pub fn verify(password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

static DECOY_HASH: Lazy<Option<String>> = Lazy::new(|| hash("decoy-password-never-matches").ok());

/// Run a full argon2 verification against a throwaway hash so a login for an
/// unknown account costs the same as one with a wrong password. Always false.
pub fn verify_decoy(password: &str) -> bool {
    if let Some(decoy) = DECOY_HASH.as_deref() {
        let _ = verify(password, decoy);
    }
    false
}
