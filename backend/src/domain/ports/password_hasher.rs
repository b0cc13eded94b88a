//! Port for one-way password digests.
use crate::domain::{Password, PasswordHash};

use super::define_port_error;

define_port_error! {
    /// Failures raised while hashing.
    pub enum PasswordHashError {
        /// Hasher is not configured, e.g. the salt is missing.
        Misconfigured { message: String } => "password hasher misconfigured: {message}",
    }
}

/// Deterministic digest: equal passwords hash equally so the digest can be
/// used as a lookup value.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHashError>;
}
