//! # Yatube Infrastructure
//!
//! Concrete implementations of the ports defined in `yatube-core`.
//! This crate contains the record stores, caches, clocks and auth services.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL repositories via SeaORM
//! - `auth` - JWT sessions + Argon2 password hashing
//! - `redis` - Redis-backed page cache

pub mod cache;
pub mod clock;
pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use cache::InMemoryCache;
pub use clock::{ManualClock, SystemClock};
pub use database::InMemoryStore;

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

#[cfg(feature = "postgres")]
pub use database::{DatabaseConfig, DatabaseConnections};

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use cache::{RedisCache, RedisConfig};
