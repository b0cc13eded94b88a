//! In-process TTL cache backed by `DashMap`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{CacheError, CacheKey, KeyValueCache};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Entry count that triggers the first sweep of expired entries.
pub const DEFAULT_SWEEP_THRESHOLD: usize = 10_000;

/// Single-process [`KeyValueCache`].
///
/// Expired entries are dropped when read, and swept in bulk once the map
/// reaches the sweep threshold. The threshold then moves to twice the live
/// entry count so a cache full of live keys is not rescanned on every write.
/// Time comes from the injected clock so expiry can be tested without
/// sleeping.
#[derive(Clone)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
    base_threshold: usize,
    next_sweep: Arc<AtomicUsize>,
}

impl MemoryCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            clock,
            base_threshold: DEFAULT_SWEEP_THRESHOLD,
            next_sweep: Arc::new(AtomicUsize::new(DEFAULT_SWEEP_THRESHOLD)),
        }
    }

    pub fn with_sweep_threshold(mut self, threshold: usize) -> Self {
        let threshold = threshold.max(1);
        self.base_threshold = threshold;
        self.next_sweep = Arc::new(AtomicUsize::new(threshold));
        self
    }

    /// Remove every expired entry.
    pub fn sweep_expired(&self) {
        let now = self.clock.utc();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        let live = self.entries.len();
        self.next_sweep.store(
            live.saturating_mul(2).max(self.base_threshold),
            Ordering::Relaxed,
        );
        debug!(evicted = before.saturating_sub(live), live, "swept expired cache entries");
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KeyValueCache for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        let now = self.clock.utc();
        let removed = self
            .entries
            .remove_if(key.as_str(), |_, entry| entry.expires_at <= now);
        if removed.is_some() {
            return Ok(None);
        }
        Ok(self.entries.get(key.as_str()).map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let ttl = TimeDelta::from_std(ttl)
            .map_err(|err| CacheError::backend(format!("ttl out of range: {err}")))?;
        if self.entries.len() >= self.next_sweep.load(Ordering::Relaxed) {
            self.sweep_expired();
        }
        self.entries.insert(
            key.as_str().to_owned(),
            Entry {
                value: value.to_owned(),
                expires_at: self.clock.utc() + ttl,
            },
        );
        Ok(())
    }
}
