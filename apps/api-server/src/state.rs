//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use postline_core::BlogService;
use postline_core::ports::{Cache, IdentityProvider, RecordStore};
use postline_infra::{InMemoryCache, InMemoryRecordStore, JwtIdentityProvider};

use crate::config::AppConfig;

/// How often the in-memory cache drops expired entries.
const CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub blog: BlogService,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let store = init_store(config).await;
        let cache = init_cache(config).await;
        let identity: Arc<dyn IdentityProvider> = Arc::new(JwtIdentityProvider::from_env());

        tracing::info!(
            cache_ttl = ?config.timeline.cache_ttl,
            call_timeout = ?config.timeline.call_timeout,
            "Application state initialized"
        );

        Self {
            blog: BlogService::new(store, cache, config.timeline.clone()),
            identity,
        }
    }
}

#[cfg(feature = "postgres")]
async fn init_store(config: &AppConfig) -> Arc<dyn RecordStore> {
    use postline_infra::PostgresRecordStore;
    use postline_infra::database::connect;

    let Some(db_config) = &config.database else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return Arc::new(InMemoryRecordStore::new());
    };

    match connect(db_config).await {
        Ok(conn) => Arc::new(PostgresRecordStore::new(conn)),
        Err(e) => {
            tracing::error!(
                "Failed to connect to database: {}. Using in-memory fallback.",
                e
            );
            Arc::new(InMemoryRecordStore::new())
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn init_store(_config: &AppConfig) -> Arc<dyn RecordStore> {
    tracing::info!("Running without postgres feature - using in-memory record store");
    Arc::new(InMemoryRecordStore::new())
}

#[cfg(feature = "redis")]
async fn init_cache(config: &AppConfig) -> Arc<dyn Cache> {
    use postline_infra::RedisCache;

    if let Some(redis_config) = &config.redis {
        match RedisCache::new(redis_config.clone()).await {
            Ok(cache) => return Arc::new(cache),
            Err(e) => {
                tracing::error!("Failed to connect to Redis: {}. Using in-memory cache.", e);
            }
        }
    }
    memory_cache()
}

#[cfg(not(feature = "redis"))]
async fn init_cache(_config: &AppConfig) -> Arc<dyn Cache> {
    memory_cache()
}

/// In-memory cache with a background task purging expired entries.
fn memory_cache() -> Arc<dyn Cache> {
    let cache = Arc::new(InMemoryCache::new());

    let purged = cache.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CACHE_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let removed = purged.purge_expired().await;
            if removed > 0 {
                tracing::debug!(removed, "Purged expired cache entries");
            }
        }
    });

    cache
}
