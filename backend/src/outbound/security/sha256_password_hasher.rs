//! Salted SHA-256 implementation of the `PasswordHasher` port.

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHashError, PasswordHasher};
use crate::domain::{Password, PasswordHash};

/// Hex digest of `salt || password`.
///
/// The digest is deterministic so it can be matched in a lookup query.
pub struct Sha256PasswordHasher {
    salt: Zeroizing<String>,
}

impl Sha256PasswordHasher {
    pub fn new(salt: impl Into<String>) -> Self {
        Self {
            salt: Zeroizing::new(salt.into()),
        }
    }
}

impl PasswordHasher for Sha256PasswordHasher {
    fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHashError> {
        if self.salt.is_empty() {
            return Err(PasswordHashError::misconfigured("password salt is not set"));
        }
        let mut hasher = Sha256::new();
        hasher.update(self.salt.as_bytes());
        hasher.update(password.expose().as_bytes());
        Ok(PasswordHash::new(hex::encode(hasher.finalize())))
    }
}
