//! Port for dependency health checks.
use std::sync::Arc;

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// A dependency failed to answer.
    pub enum HealthError {
        /// Named dependency is unreachable.
        Unreachable { dependency: String, message: String } => "{dependency} unreachable: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Round-trip to the dependency.
    async fn ping(&self) -> Result<(), HealthError>;
}

/// Probe that checks each dependency in order and stops at the first failure.
#[derive(Clone, Default)]
pub struct CompositeHealthProbe {
    probes: Vec<Arc<dyn HealthProbe>>,
}

impl CompositeHealthProbe {
    pub fn new(probes: Vec<Arc<dyn HealthProbe>>) -> Self {
        Self { probes }
    }
}

#[async_trait]
impl HealthProbe for CompositeHealthProbe {
    async fn ping(&self) -> Result<(), HealthError> {
        for probe in &self.probes {
            probe.ping().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn empty_composite_is_healthy() {
        assert_eq!(CompositeHealthProbe::default().ping().await, Ok(()));
    }

    #[rstest]
    #[tokio::test]
    async fn stops_at_first_failure() {
        let mut database = MockHealthProbe::new();
        database
            .expect_ping()
            .times(1)
            .return_once(|| Err(HealthError::unreachable("postgres", "refused")));
        let mut cache = MockHealthProbe::new();
        cache.expect_ping().times(0);

        let composite = CompositeHealthProbe::new(vec![Arc::new(database), Arc::new(cache)]);
        let err = composite.ping().await.expect_err("database is down");
        assert_eq!(err.to_string(), "postgres unreachable: refused");
    }
}
