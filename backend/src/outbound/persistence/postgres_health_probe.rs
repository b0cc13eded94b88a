//! Readiness probe for the PostgreSQL pool.

use async_trait::async_trait;

use crate::domain::ports::{HealthError, HealthProbe};

use super::pool::DbPool;

/// Pings PostgreSQL with `SELECT 1`.
#[derive(Clone)]
pub struct PostgresHealthProbe {
    pool: DbPool,
}

impl PostgresHealthProbe {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthProbe for PostgresHealthProbe {
    async fn ping(&self) -> Result<(), HealthError> {
        self.pool
            .ping()
            .await
            .map_err(|err| HealthError::unreachable("postgres", err.to_string()))
    }
}
