//! Redis-backed cache using `bb8-redis` connection pooling.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, PooledConnection};
use bb8_redis::redis::AsyncCommands;

use crate::domain::ports::{CacheError, CacheKey, HealthError, HealthProbe, KeyValueCache};

const HEALTH_KEY: &str = "crewplan:health";

/// Redis adapter for the [`KeyValueCache`] port.
#[derive(Clone)]
pub struct RedisCache {
    pool: Pool<RedisConnectionManager>,
}

impl RedisCache {
    /// Build a pool for `url`, failing if Redis cannot be reached.
    pub async fn connect(url: &str, connection_timeout: Duration) -> Result<Self, CacheError> {
        let manager =
            RedisConnectionManager::new(url).map_err(|err| CacheError::backend(err.to_string()))?;
        let pool = Pool::builder()
            .connection_timeout(connection_timeout)
            .build(manager)
            .await
            .map_err(|err| CacheError::backend(err.to_string()))?;
        Ok(Self { pool })
    }

    async fn connection(
        &self,
    ) -> Result<PooledConnection<'_, RedisConnectionManager>, CacheError> {
        self.pool
            .get()
            .await
            .map_err(|err| CacheError::backend(err.to_string()))
    }

    /// Probe sharing this pool.
    pub fn health_probe(&self) -> RedisHealthProbe {
        RedisHealthProbe {
            cache: self.clone(),
        }
    }
}

/// TTLs below one second round up; Redis `SETEX` rejects zero.
fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl KeyValueCache for RedisCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        conn.get::<_, Option<String>>(key.as_str())
            .await
            .map_err(|err| CacheError::backend(err.to_string()))
    }

    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key.as_str(), value, ttl_seconds(ttl))
            .await
            .map_err(|err| CacheError::backend(err.to_string()))
    }
}

/// Readiness probe performing a Redis round trip.
#[derive(Clone)]
pub struct RedisHealthProbe {
    cache: RedisCache,
}

#[async_trait]
impl HealthProbe for RedisHealthProbe {
    async fn ping(&self) -> Result<(), HealthError> {
        let unreachable = |message: String| HealthError::unreachable("redis", message);
        let mut conn = self
            .cache
            .connection()
            .await
            .map_err(|err| unreachable(err.to_string()))?;
        conn.exists::<_, bool>(HEALTH_KEY)
            .await
            .map(|_| ())
            .map_err(|err| unreachable(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Duration::from_millis(10), 1)]
    #[case(Duration::from_secs(600), 600)]
    fn ttl_is_whole_seconds(#[case] ttl: Duration, #[case] expected: u64) {
        assert_eq!(ttl_seconds(ttl), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_url_is_a_backend_error() {
        let result = RedisCache::connect("not a url", Duration::from_millis(50)).await;
        assert!(matches!(result, Err(CacheError::Backend { .. })));
    }
}
