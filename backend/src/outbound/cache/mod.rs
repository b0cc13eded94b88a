//! Key-value cache adapters and the cached user lookup decorator.
//!
//! Two [`KeyValueCache`](crate::domain::ports::KeyValueCache) backends are
//! provided: Redis via `bb8-redis` for shared deployments, and an in-process
//! `DashMap` for single-instance runs and tests. Both honour per-entry TTLs.

mod cached_user_repository;
mod memory_cache;
mod redis_cache;

pub use cached_user_repository::{CachedUserRepository, DEFAULT_USER_CACHE_TTL};
pub use memory_cache::MemoryCache;
pub use redis_cache::{RedisCache, RedisHealthProbe};
