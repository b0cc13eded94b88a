//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{Email, NewUser, PasswordHash, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Email or username is already taken.
        Duplicate { message: String } => "user already exists: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Whether an account with this email exists.
    async fn user_exists(&self, email: &Email) -> Result<bool, UserPersistenceError>;

    /// Insert a new account and return its id.
    async fn create_user(&self, user: &NewUser) -> Result<UserId, UserPersistenceError>;

    /// Resolve the account matching both email and password digest.
    async fn find_user_id(
        &self,
        email: &Email,
        password_hash: &PasswordHash,
    ) -> Result<Option<UserId>, UserPersistenceError>;
}
