//! Port for issuing and verifying bearer tokens.
use crate::domain::{AccessToken, UserId};

use super::define_port_error;

define_port_error! {
    /// Token failures.
    pub enum TokenError {
        /// Token is malformed, expired, or signed with another key.
        Invalid { message: String } => "invalid token: {message}",
        /// Signing failed.
        Signing { message: String } => "token signing failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Issue a token identifying `user`.
    fn issue(&self, user: UserId) -> Result<AccessToken, TokenError>;

    /// Resolve the user a token identifies.
    fn verify(&self, token: &str) -> Result<UserId, TokenError>;
}
