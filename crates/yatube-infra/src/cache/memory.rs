//! In-memory cache implementation - used when Redis is not configured.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use yatube_core::ports::{Cache, CacheError, Clock};

use crate::clock::SystemClock;

struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

/// In-memory cache using a HashMap with async RwLock.
///
/// Expiry is evaluated against the injected [`Clock`], so a `ManualClock`
/// lets tests step over a TTL without sleeping.
/// Note: Data is lost on process restart.
pub struct InMemoryCache {
    store: RwLock<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Expired once the clock reaches `expires_at`.
    fn is_expired(&self, entry: &CacheEntry) -> bool {
        entry
            .expires_at
            .map(|exp| self.clock.now() >= exp)
            .unwrap_or(false)
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let store = self.store.read().await;
        let entry = store.get(key)?;

        if self.is_expired(entry) {
            drop(store);
            let mut store = self.store.write().await;
            // Re-check: a writer may have refreshed the entry in between.
            if store.get(key).is_some_and(|e| self.is_expired(e)) {
                store.remove(key);
                tracing::trace!(key, "Evicted expired cache entry");
            }
            return store
                .get(key)
                .filter(|e| !self.is_expired(e))
                .map(|e| e.value.clone());
        }

        Some(entry.value.clone())
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut store = self.store.write().await;

        let expires_at = ttl.map(|d| self.clock.now() + d);

        store.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at,
            },
        );

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut store = self.store.write().await;
        store.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }
}
