//! In-memory cache implementation - used when Redis is unavailable.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use postline_core::ports::{Cache, CacheError};

struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }
}

/// In-memory cache using a HashMap behind an async RwLock.
///
/// Expiry is checked lazily on read. Data is lost on process restart and is
/// not shared between server instances.
pub struct InMemoryCache {
    store: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }

    /// Drop every expired entry. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|_, entry| !entry.is_expired(now));
        before - store.len()
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let store = self.store.read().await;
        let entry = store.get(key)?;

        if entry.is_expired(now) {
            drop(store);
            let mut store = self.store.write().await;
            // another writer may have refreshed it in between
            if store.get(key).is_some_and(|e| e.is_expired(now)) {
                store.remove(key);
            }
            return None;
        }

        Some(entry.value.clone())
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut store = self.store.write().await;
        store.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: ttl.map(|d| Instant::now() + d),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.write().await.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = InMemoryCache::new();
        cache.set("posts", "[]", None).await.unwrap();
        assert_eq!(cache.get("posts").await, Some("[]".to_string()));
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = InMemoryCache::new();
        cache.set("posts", "[]", None).await.unwrap();
        cache.delete("posts").await.unwrap();
        assert_eq!(cache.get("posts").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = InMemoryCache::new();
        cache
            .set("posts", "[1]", Some(Duration::from_secs(5)))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(cache.exists("posts").await);

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get("posts").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let cache = InMemoryCache::new();
        cache.set("a", "1", Some(Duration::from_secs(1))).await.unwrap();
        cache.set("b", "2", None).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(cache.purge_expired().await, 1);
        assert!(cache.exists("b").await);
    }
}
