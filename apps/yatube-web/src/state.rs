//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use yatube_core::ports::{
    Cache, CommentRepository, FollowRepository, GroupRepository, PasswordService, PostRepository,
    TokenService, UserRepository,
};
use yatube_core::services::{
    AccountService, FeedService, FollowService, GroupService, PageCache, PostService,
};
use yatube_infra::{Argon2PasswordService, InMemoryCache, InMemoryStore, JwtTokenService};

#[cfg(feature = "postgres")]
use yatube_infra::database::{
    DatabaseConfig, DatabaseConnections, PostgresCommentRepository, PostgresFollowRepository,
    PostgresGroupRepository, PostgresPostRepository, PostgresUserRepository,
};
#[cfg(feature = "redis")]
use yatube_infra::{RedisCache, RedisConfig};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub feeds: FeedService,
    pub posts: PostService,
    pub follows: FollowService,
    pub groups: GroupService,
    pub accounts: AccountService,
    pub tokens: Arc<dyn TokenService>,
    pub page_cache: PageCache,
    pub admin_usernames: Arc<Vec<String>>,
    pub backends: Backends,
}

/// Which implementations are serving this process, for the health check.
#[derive(Debug, Clone, Copy)]
pub struct Backends {
    pub store: &'static str,
    pub cache: &'static str,
}

/// One handle per repository port.
struct Repositories {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    groups: Arc<dyn GroupRepository>,
    comments: Arc<dyn CommentRepository>,
    follows: Arc<dyn FollowRepository>,
}

impl Repositories {
    fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: store.clone(),
            posts: store.clone(),
            groups: store.clone(),
            comments: store.clone(),
            follows: store,
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(connections: &DatabaseConnections) -> Self {
        let db = &connections.main;
        Self {
            users: Arc::new(PostgresUserRepository::new(db.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            groups: Arc::new(PostgresGroupRepository::new(db.clone())),
            comments: Arc::new(PostgresCommentRepository::new(db.clone())),
            follows: Arc::new(PostgresFollowRepository::new(db.clone())),
        }
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        let (repos, store) = Self::connect_store(config.database.as_ref()).await;

        #[cfg(not(feature = "postgres"))]
        let (repos, store) = {
            tracing::info!("Running without postgres feature - using in-memory store");
            (Repositories::in_memory(), "memory")
        };

        let (cache, cache_kind) = Self::connect_cache(config.redis_url.as_deref()).await;

        let state = Self::assemble(
            repos,
            cache,
            Arc::new(JwtTokenService::new(config.jwt.clone())),
            Arc::new(Argon2PasswordService::new()),
            config.feed_cache_ttl,
            config.admin_usernames.clone(),
            Backends {
                store,
                cache: cache_kind,
            },
        );

        tracing::info!(
            store = state.backends.store,
            cache = state.backends.cache,
            feed_cache_secs = config.feed_cache_ttl.as_secs(),
            "Application state initialized"
        );
        state
    }

    #[cfg(feature = "postgres")]
    async fn connect_store(config: Option<&DatabaseConfig>) -> (Repositories, &'static str) {
        let Some(config) = config else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return (Repositories::in_memory(), "memory");
        };

        match DatabaseConnections::init(config).await {
            Ok(connections) => (Repositories::postgres(&connections), "postgres"),
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                (Repositories::in_memory(), "memory")
            }
        }
    }

    async fn connect_cache(redis_url: Option<&str>) -> (Arc<dyn Cache>, &'static str) {
        #[cfg(feature = "redis")]
        if let Some(url) = redis_url {
            match RedisCache::new(RedisConfig::from_env(url.to_string())).await {
                Ok(cache) => return (Arc::new(cache), "redis"),
                Err(e) => {
                    tracing::error!("Failed to connect to Redis: {}. Using in-memory cache.", e);
                }
            }
        }

        #[cfg(not(feature = "redis"))]
        if redis_url.is_some() {
            tracing::warn!("REDIS_URL is set but the redis feature is disabled; ignoring it");
        }

        (Arc::new(InMemoryCache::new()), "memory")
    }

    fn assemble(
        repos: Repositories,
        cache: Arc<dyn Cache>,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        feed_cache_ttl: Duration,
        admin_usernames: Vec<String>,
        backends: Backends,
    ) -> Self {
        Self {
            feeds: FeedService::new(repos.posts.clone(), repos.users.clone(), repos.groups.clone()),
            posts: PostService::new(
                repos.posts.clone(),
                repos.users.clone(),
                repos.groups.clone(),
                repos.comments,
            ),
            follows: FollowService::new(repos.follows, repos.users.clone()),
            groups: GroupService::new(repos.groups),
            accounts: AccountService::new(repos.users, passwords),
            tokens,
            page_cache: PageCache::new(cache, feed_cache_ttl),
            admin_usernames: Arc::new(admin_usernames),
            backends,
        }
    }

    /// Roles granted to `username` when a session is issued.
    pub fn roles_for(&self, username: &str) -> Vec<String> {
        let mut roles = vec!["user".to_string()];
        if self.admin_usernames.iter().any(|admin| admin == username) {
            roles.push("admin".to_string());
        }
        roles
    }

    /// In-memory state whose page cache follows `clock`, with cheap password hashing.
    #[cfg(test)]
    pub fn for_tests(clock: Arc<yatube_infra::ManualClock>, admin_usernames: &[&str]) -> Self {
        use yatube_infra::JwtConfig;

        Self::assemble(
            Repositories::in_memory(),
            Arc::new(InMemoryCache::with_clock(clock)),
            Arc::new(JwtTokenService::new(JwtConfig {
                secret: "test-secret".to_string(),
                ..JwtConfig::default()
            })),
            Arc::new(Argon2PasswordService::with_cost(8, 1, 1).expect("valid argon2 cost")),
            yatube_core::services::DEFAULT_PAGE_TTL,
            admin_usernames.iter().map(|name| name.to_string()).collect(),
            Backends {
                store: "memory",
                cache: "memory",
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yatube_infra::ManualClock;

    #[test]
    fn test_admin_role_only_for_listed_usernames() {
        let state = AppState::for_tests(Arc::new(ManualClock::new()), &["boss"]);
        assert_eq!(state.roles_for("boss"), vec!["user", "admin"]);
        assert_eq!(state.roles_for("leo"), vec!["user"]);
    }
}
