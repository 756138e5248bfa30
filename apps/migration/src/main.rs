//! `migration up|down|status|fresh` against `DATABASE_URL`.

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter("info,sea_orm_migration=info")
        .with_target(false)
        .init();

    tracing::info!("Running Yatube schema migrations");
    cli::run_cli(migration::Migrator).await;
}
