//! Account service: sign-up, sign-in and token resolution.
//!
//! Wraps the user repository (normally the cached decorator), the password
//! hasher and the token issuer behind the [`AuthService`] driving port.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::ports::{
    AuthService, PasswordHasher, TokenService, UserPersistenceError, UserRepository,
};
use crate::domain::{
    AccessToken, Error, NewUser, Password, PasswordHash, SignInCredentials, SignUpCredentials,
    UserId,
};

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Duplicate { .. } => Error::conflict("user already exists"),
        UserPersistenceError::Connection { message } | UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

/// Account service implementing [`AuthService`].
pub struct AccountService<R: ?Sized> {
    users: Arc<R>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
}

impl<R: ?Sized> AccountService<R> {
    pub fn new(
        users: Arc<R>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    fn hash(&self, password: &Password) -> Result<PasswordHash, Error> {
        self.hasher
            .hash(password)
            .map_err(|err| Error::internal(err.to_string()))
    }

    fn issue(&self, user: UserId) -> Result<AccessToken, Error> {
        self.tokens
            .issue(user)
            .map_err(|err| Error::internal(err.to_string()))
    }
}

#[async_trait]
impl<R> AuthService for AccountService<R>
where
    R: UserRepository + ?Sized,
{
    async fn sign_up(&self, credentials: &SignUpCredentials) -> Result<AccessToken, Error> {
        let exists = self
            .users
            .user_exists(credentials.email())
            .await
            .map_err(map_user_error)?;
        if exists {
            return Err(Error::conflict("user already exists"));
        }

        let user = NewUser {
            email: credentials.email().clone(),
            username: credentials.username().clone(),
            password_hash: self.hash(credentials.password())?,
        };
        let id = self
            .users
            .create_user(&user)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %id, "account created");
        self.issue(id)
    }

    async fn sign_in(&self, credentials: &SignInCredentials) -> Result<AccessToken, Error> {
        let hash = self.hash(credentials.password())?;
        let id = self
            .users
            .find_user_id(credentials.email(), &hash)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("invalid email or password"))?;
        self.issue(id)
    }

    fn authenticate(&self, token: &str) -> Result<UserId, Error> {
        self.tokens.verify(token).map_err(|err| {
            debug!(error = %err, "bearer token rejected");
            Error::unauthorized("invalid or expired token")
        })
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
