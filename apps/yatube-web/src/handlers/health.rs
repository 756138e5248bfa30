//! Liveness check.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::{AppState, Backends};

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
    timestamp: String,
    /// Where records and cached pages live: `postgres`/`redis` or `memory`.
    store: &'static str,
    cache: &'static str,
}

impl Health {
    fn ok(backends: Backends) -> Self {
        Self {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            timestamp: chrono::Utc::now().to_rfc3339(),
            store: backends.store,
            cache: backends.cache,
        }
    }
}

/// GET /health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(Health::ok(state.backends))
}
