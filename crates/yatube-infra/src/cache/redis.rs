//! Redis-backed page cache, shared by every worker and process.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};

use yatube_core::ports::{Cache, CacheError};

const DEFAULT_PREFIX: &str = "yatube:";

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub connect_timeout: Duration,
    /// Prepended to every key so several sites can share one server.
    pub key_prefix: String,
}

impl RedisConfig {
    /// Settings for `url`; `REDIS_CONNECT_TIMEOUT_SECS` and `REDIS_KEY_PREFIX` tune the rest.
    pub fn from_env(url: String) -> Self {
        let timeout_secs = std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Self {
            url,
            connect_timeout: Duration::from_secs(timeout_secs),
            key_prefix: std::env::var("REDIS_KEY_PREFIX")
                .unwrap_or_else(|_| DEFAULT_PREFIX.to_string()),
        }
    }
}

fn command_error(e: RedisError) -> CacheError {
    CacheError::Command(e.to_string())
}

/// PSETEX rejects 0, so sub-millisecond TTLs round up to 1 ms.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

/// Cache on a Redis server. The connection manager reconnects on its own.
pub struct RedisCache {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisCache {
    /// Connect, giving up after `connect_timeout`.
    pub async fn new(config: RedisConfig) -> Result<Self, CacheError> {
        let unavailable = |e: RedisError| CacheError::Unavailable(e.to_string());

        let client = Client::open(config.url.as_str()).map_err(unavailable)?;
        let conn = match tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
        {
            Ok(connected) => connected.map_err(unavailable)?,
            Err(_) => {
                return Err(CacheError::Unavailable(format!(
                    "no answer from {} within {:?}",
                    config.url, config.connect_timeout
                )));
            }
        };

        tracing::info!(url = %config.url, prefix = %config.key_prefix, "Page cache on Redis");
        Ok(Self {
            conn,
            prefix: config.key_prefix,
        })
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(self.namespaced(key))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(key, error = %e, "Redis GET failed, treating as a miss");
                None
            })
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let key = self.namespaced(key);

        match ttl {
            Some(ttl) => conn.pset_ex::<_, _, ()>(key, value, ttl_millis(ttl)).await,
            None => conn.set::<_, _, ()>(key, value).await,
        }
        .map_err(command_error)
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.namespaced(key))
            .await
            .map_err(command_error)
    }

    async fn exists(&self, key: &str) -> bool {
        let mut conn = self.conn.clone();
        conn.exists::<_, bool>(self.namespaced(key))
            .await
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A live server, when `REDIS_URL` points at one.
    async fn live_cache() -> Option<RedisCache> {
        let url = std::env::var("REDIS_URL").ok()?;
        RedisCache::new(RedisConfig {
            url,
            connect_timeout: Duration::from_secs(1),
            key_prefix: "yatube-test:".to_string(),
        })
        .await
        .ok()
    }

    #[test]
    fn test_ttl_rounds_up_to_a_millisecond() {
        assert_eq!(ttl_millis(Duration::from_secs(20)), 20_000);
        assert_eq!(ttl_millis(Duration::from_micros(10)), 1);
    }

    #[tokio::test]
    async fn test_page_round_trip_and_expiry() {
        let Some(cache) = live_cache().await else {
            return;
        };

        cache.set("page:index", "<html>", None).await.unwrap();
        assert_eq!(cache.get("page:index").await.as_deref(), Some("<html>"));
        cache.delete("page:index").await.unwrap();
        assert!(!cache.exists("page:index").await);

        cache
            .set("page:ttl", "<html>", Some(Duration::from_millis(300)))
            .await
            .unwrap();
        assert!(cache.exists("page:ttl").await);
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(cache.get("page:ttl").await, None);
    }
}
