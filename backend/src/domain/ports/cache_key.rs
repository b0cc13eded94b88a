//! Keys for the advisory user lookup cache.
use thiserror::Error;

use crate::domain::{Email, PasswordHash};

const USER_EXISTS_PREFIX: &str = "user:exists:";
const USER_LOGIN_PREFIX: &str = "user:login:";

/// Key under which a cache adapter stores one value.
///
/// Lookup keys are built from normalised emails, so two spellings of the same
/// address share an entry.
///
/// # Examples
/// ```
/// use crewplan_backend::domain::Email;
/// use crewplan_backend::domain::ports::CacheKey;
///
/// let email = Email::new("Bob@Example.com").unwrap();
/// assert_eq!(CacheKey::user_exists(&email).as_str(), "user:exists:bob@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Construct a free-form key after checking it is non-empty and trimmed.
    pub fn new(value: impl Into<String>) -> Result<Self, CacheKeyValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(CacheKeyValidationError::Empty);
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(CacheKeyValidationError::ContainsWhitespace);
        }
        Ok(Self(raw))
    }

    /// Key caching whether an account exists for `email`.
    pub fn user_exists(email: &Email) -> Self {
        Self(format!("{USER_EXISTS_PREFIX}{email}"))
    }

    /// Key caching the user id behind an email and password digest.
    ///
    /// The digest is part of the key, so a hit proves the caller presented
    /// matching credentials at some point within the TTL.
    pub fn user_login(email: &Email, password_hash: &PasswordHash) -> Self {
        Self(format!(
            "{USER_LOGIN_PREFIX}{email}:{}",
            password_hash.as_ref()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validation errors returned when constructing [`CacheKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheKeyValidationError {
    /// Key is empty after trimming whitespace.
    #[error("cache key must not be empty")]
    Empty,
    /// Key contains whitespace.
    #[error("cache key must not contain whitespace")]
    ContainsWhitespace,
}
