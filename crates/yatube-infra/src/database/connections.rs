use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DbConn, DbErr};

/// Pool settings for the blog database (`DATABASE_URL`, `DB_MAX_CONNECTIONS`, `DB_MIN_CONNECTIONS`).
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Connection pool shared by every repository.
///
/// ```ignore
/// let db = DatabaseConnections::init(&config).await?;
/// let posts = PostgresPostRepository::new(db.main.clone());
/// ```
pub struct DatabaseConnections {
    pub main: DbConn,
}

impl DatabaseConnections {
    /// Open the pool and make one round trip, so a wrong URL fails here and not on the first page view.
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let mut opts = ConnectOptions::new(config.url.clone());
        opts.max_connections(config.max_connections)
            .min_connections(config.min_connections.min(config.max_connections))
            .connect_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(false);

        let main = Database::connect(opts).await?;
        main.ping().await?;

        tracing::info!(
            max = config.max_connections,
            min = config.min_connections,
            "Database pool ready"
        );
        Ok(Self { main })
    }
}
