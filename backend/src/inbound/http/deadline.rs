//! Per-request deadline for service calls.
//!
//! Expiry drops the service future, which rolls back any transaction it held
//! open, and reports `service_unavailable`.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::domain::Error;

/// Run `call` under `limit`.
pub async fn within<T, F>(limit: Duration, call: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            warn!(timeout_ms = limit.as_millis(), "request deadline exceeded");
            Err(Error::service_unavailable("request timed out"))
        }
    }
}
