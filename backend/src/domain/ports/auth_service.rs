//! Driving port for sign-up, sign-in and bearer token resolution.
//!
//! Inbound adapters call it without knowing how accounts are stored or how
//! tokens are signed, so handler tests can substitute a double.

use async_trait::async_trait;

use crate::domain::{AccessToken, Error, SignInCredentials, SignUpCredentials, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register an account and issue its first token.
    async fn sign_up(&self, credentials: &SignUpCredentials) -> Result<AccessToken, Error>;

    /// Exchange valid credentials for a token.
    async fn sign_in(&self, credentials: &SignInCredentials) -> Result<AccessToken, Error>;

    /// Resolve a bearer token to the user it identifies.
    fn authenticate(&self, token: &str) -> Result<UserId, Error>;
}
