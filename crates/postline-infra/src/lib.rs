//! # Postline Infrastructure
//!
//! Concrete implementations of the ports defined in `postline-core`:
//! record stores, caches and the identity provider.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL record store via SeaORM
//! - `auth` - JWT identity provider
//! - `redis` - Redis timeline cache

pub mod cache;
pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use cache::InMemoryCache;
pub use database::InMemoryRecordStore;

#[cfg(feature = "postgres")]
pub use database::{DatabaseConfig, PostgresRecordStore};

#[cfg(feature = "auth")]
pub use auth::{JwtConfig, JwtIdentityProvider};

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use cache::{RedisCache, RedisConfig};
