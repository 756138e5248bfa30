//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

#[cfg(feature = "postgres")]
use yatube_infra::database::DatabaseConfig;
use yatube_infra::JwtConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    pub redis_url: Option<String>,
    /// Lifetime of a cached global feed page.
    pub feed_cache_ttl: Duration,
    pub jwt: JwtConfig,
    /// Usernames that get the `admin` role at login.
    pub admin_usernames: Vec<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        #[cfg(feature = "postgres")]
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: env_or("DB_MAX_CONNECTIONS", 100),
            min_connections: env_or("DB_MIN_CONNECTIONS", 10),
        });

        #[cfg(not(feature = "postgres"))]
        if env::var("DATABASE_URL").is_ok() {
            tracing::warn!("DATABASE_URL is set but the postgres feature is disabled; ignoring it");
        }

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env_or("PORT", 8080),
            #[cfg(feature = "postgres")]
            database,
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            feed_cache_ttl: Duration::from_secs(env_or("FEED_CACHE_SECONDS", 20)),
            jwt: JwtConfig::from_env(),
            admin_usernames: parse_usernames(&env::var("ADMIN_USERNAMES").unwrap_or_default()),
        }
    }
}

/// Parse `key`, falling back to `default` when unset or malformed.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Comma-separated list, blanks dropped.
fn parse_usernames(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_usernames() {
        assert_eq!(parse_usernames(" admin, editor ,,"), vec!["admin", "editor"]);
        assert!(parse_usernames("").is_empty());
    }
}
