//! Redis backing for the timeline cache, shared by every api-server replica.
//!
//! Keys live under a per-deployment namespace so several Postline instances
//! can share one Redis without reading each other's global views.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use postline_core::ports::{Cache, CacheError};

const DEFAULT_URL: &str = "redis://localhost:6379";
const DEFAULT_NAMESPACE: &str = "postline";

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    /// Bound on the initial connect; the server falls back to the in-memory
    /// cache when it elapses.
    pub connect_timeout: Duration,
    pub namespace: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            connect_timeout: Duration::from_secs(5),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl RedisConfig {
    /// Reads `REDIS_URL`, `REDIS_CONNECT_TIMEOUT_SECS` and `REDIS_NAMESPACE`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("REDIS_URL").unwrap_or(defaults.url),
            connect_timeout: std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            namespace: std::env::var("REDIS_NAMESPACE").unwrap_or(defaults.namespace),
        }
    }
}

fn namespaced_key(namespace: &str, key: &str) -> String {
    format!("{namespace}:{key}")
}

/// Redis expiry in milliseconds. Sub-second TTLs survive and a zero TTL
/// still expires instead of living forever.
fn expiry_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

pub struct RedisCache {
    conn: ConnectionManager,
    namespace: String,
}

impl RedisCache {
    pub async fn new(config: RedisConfig) -> Result<Self, CacheError> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| CacheError::Connection(e.to_string()))?;

        let conn = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::Connection("connect timed out".to_string()))?
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        tracing::info!(url = %config.url, namespace = %config.namespace, "Timeline cache on Redis");

        Ok(Self {
            conn,
            namespace: config.namespace,
        })
    }

    pub async fn from_env() -> Result<Self, CacheError> {
        Self::new(RedisConfig::from_env()).await
    }

    fn key(&self, key: &str) -> String {
        namespaced_key(&self.namespace, key)
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(self.key(key))
            .await
            .unwrap_or_else(|e| {
                // a broken cache reads as a miss
                tracing::warn!(key = %key, error = %e, "Redis GET failed");
                None
            })
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let key = self.key(key);

        let written = match ttl {
            Some(ttl) => {
                conn.pset_ex::<_, _, ()>(key, value, expiry_millis(ttl))
                    .await
            }
            None => conn.set::<_, _, ()>(key, value).await,
        };
        written.map_err(|e| CacheError::Operation(e.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.key(key))
            .await
            .map_err(|e| CacheError::Operation(e.to_string()))
    }

    async fn exists(&self, key: &str) -> bool {
        let mut conn = self.conn.clone();
        conn.exists::<_, bool>(self.key(key)).await.unwrap_or(false)
    }
}
