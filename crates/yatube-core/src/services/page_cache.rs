//! Time-boxed memoization of rendered pages.
//!
//! A body stays cached for the whole TTL no matter what is written in the
//! meantime; there is no invalidation on writes.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::ports::Cache;

/// Default lifetime of a cached page.
pub const DEFAULT_PAGE_TTL: Duration = Duration::from_secs(20);

#[derive(Clone)]
pub struct PageCache {
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl PageCache {
    pub fn new(cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached body under `key`, or render, store and return a fresh one.
    ///
    /// Render errors are returned as-is and nothing is stored. A failing
    /// backend only costs the memoization.
    pub async fn get_or_render<F, Fut, E>(&self, key: &str, render: F) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        if let Some(body) = self.cache.get(key).await {
            tracing::debug!(key, "Page cache hit");
            return Ok(body);
        }

        let body = render().await?;
        if let Err(e) = self.cache.set(key, &body, Some(self.ttl)).await {
            tracing::warn!(key, error = %e, "Failed to store rendered page");
        } else {
            tracing::debug!(key, ttl_secs = self.ttl.as_secs(), "Page cached");
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::Mutex;

    use super::*;
    use crate::ports::CacheError;

    #[derive(Default)]
    struct MapCache {
        entries: Mutex<HashMap<String, (String, Option<Duration>)>>,
    }

    #[async_trait::async_trait]
    impl Cache for MapCache {
        async fn get(&self, key: &str) -> Option<String> {
            self.entries.lock().await.get(key).map(|(v, _)| v.clone())
        }

        async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
            self.entries
                .lock()
                .await
                .insert(key.to_string(), (value.to_string(), ttl));
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<(), CacheError> {
            self.entries.lock().await.remove(key);
            Ok(())
        }

        async fn exists(&self, key: &str) -> bool {
            self.entries.lock().await.contains_key(key)
        }
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let backend = Arc::new(MapCache::default());
        let cache = PageCache::new(backend.clone(), DEFAULT_PAGE_TTL);
        let renders = AtomicUsize::new(0);
        let counter = &renders;

        for _ in 0..2 {
            let body: Result<String, ()> = cache
                .get_or_render("index", move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok("<html>feed</html>".to_string())
                })
                .await;
            assert_eq!(body.unwrap(), "<html>feed</html>");
        }

        assert_eq!(renders.load(Ordering::SeqCst), 1);
        let stored = backend.entries.lock().await.get("index").cloned();
        assert_eq!(
            stored,
            Some(("<html>feed</html>".to_string(), Some(Duration::from_secs(20))))
        );
    }

    #[tokio::test]
    async fn test_render_errors_are_not_cached() {
        let backend = Arc::new(MapCache::default());
        let cache = PageCache::new(backend.clone(), DEFAULT_PAGE_TTL);

        let failed: Result<String, &str> = cache.get_or_render("index", || async { Err("boom") }).await;
        assert_eq!(failed, Err("boom"));
        assert!(!backend.exists("index").await);
    }
}
