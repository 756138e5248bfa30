//! Key-value cache holding rendered pages.

use async_trait::async_trait;
use std::time::Duration;

/// String cache with per-entry expiry, kept in memory or on Redis.
///
/// Reads never fail: an unreachable backend looks like an empty cache.
#[async_trait]
pub trait Cache: Send + Sync {
    /// The value under `key`, unless it is missing or expired.
    async fn get(&self, key: &str) -> Option<String>;

    /// Store `value`. With a `ttl` the entry stops being served once that much time has passed.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Whether `get` would return a value right now.
    async fn exists(&self, key: &str) -> bool;
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend unreachable: {0}")]
    Unavailable(String),

    #[error("cache command failed: {0}")]
    Command(String),
}
