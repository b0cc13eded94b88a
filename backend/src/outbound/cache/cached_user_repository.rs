//! Read-through cache in front of a [`UserRepository`].
//!
//! The cache is advisory: any cache failure is logged and treated as a miss,
//! and write-backs are best effort. The wrapped store stays authoritative.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::ports::{CacheKey, KeyValueCache, UserPersistenceError, UserRepository};
use crate::domain::{Email, NewUser, PasswordHash, UserId};

/// Lifetime of cached lookups unless configured otherwise.
pub const DEFAULT_USER_CACHE_TTL: Duration = Duration::from_secs(600);

const EXISTS: &str = "1";
const MISSING: &str = "0";

/// Decorator adding cached `user_exists` and `find_user_id` lookups.
pub struct CachedUserRepository<R: ?Sized> {
    inner: Arc<R>,
    cache: Arc<dyn KeyValueCache>,
    ttl: Duration,
}

impl<R: ?Sized> CachedUserRepository<R> {
    pub fn new(inner: Arc<R>, cache: Arc<dyn KeyValueCache>) -> Self {
        Self {
            inner,
            cache,
            ttl: DEFAULT_USER_CACHE_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    async fn lookup(&self, key: &CacheKey) -> Option<String> {
        match self.cache.get(key).await {
            Ok(hit) => hit,
            Err(error) => {
                warn!(%error, key = %key, "cache read failed; falling back to store");
                None
            }
        }
    }

    async fn remember(&self, key: &CacheKey, value: &str) {
        if let Err(error) = self.cache.set(key, value, self.ttl).await {
            warn!(%error, key = %key, "cache write failed");
        }
    }
}

#[async_trait]
impl<R> UserRepository for CachedUserRepository<R>
where
    R: UserRepository + ?Sized,
{
    async fn user_exists(&self, email: &Email) -> Result<bool, UserPersistenceError> {
        let key = CacheKey::user_exists(email);
        if let Some(cached) = self.lookup(&key).await {
            debug!(key = %key, "user existence served from cache");
            return Ok(cached == EXISTS);
        }

        let exists = self.inner.user_exists(email).await?;
        self.remember(&key, if exists { EXISTS } else { MISSING })
            .await;
        Ok(exists)
    }

    async fn create_user(&self, user: &NewUser) -> Result<UserId, UserPersistenceError> {
        let id = self.inner.create_user(user).await?;
        self.remember(&CacheKey::user_exists(&user.email), EXISTS)
            .await;
        self.remember(
            &CacheKey::user_login(&user.email, &user.password_hash),
            &id.to_string(),
        )
        .await;
        Ok(id)
    }

    async fn find_user_id(
        &self,
        email: &Email,
        password_hash: &PasswordHash,
    ) -> Result<Option<UserId>, UserPersistenceError> {
        let key = CacheKey::user_login(email, password_hash);
        if let Some(cached) = self.lookup(&key).await {
            match cached.parse::<i64>() {
                Ok(raw) => return Ok(Some(UserId::new(raw))),
                Err(error) => warn!(%error, key = %key, "ignoring unparsable cached user id"),
            }
        }

        let found = self.inner.find_user_id(email, password_hash).await?;
        if let Some(id) = found {
            self.remember(&key, &id.to_string()).await;
        }
        Ok(found)
    }
}
