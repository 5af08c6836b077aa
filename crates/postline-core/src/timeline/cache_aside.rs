use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::TimelineError;
use crate::ports::Cache;

/// Cache-aside reads of JSON-encoded sequences.
///
/// A hit is returned as stored. On a miss the fallback runs and, only if it
/// succeeds, its result is written back with the configured TTL. Cache
/// failures never fail a read: a broken or slow `get` is a miss and a failed
/// `set` is logged and dropped.
#[derive(Clone)]
pub struct CacheAside {
    cache: Arc<dyn Cache>,
    ttl: Duration,
    call_timeout: Option<Duration>,
}

impl CacheAside {
    pub fn new(cache: Arc<dyn Cache>, ttl: Duration, call_timeout: Option<Duration>) -> Self {
        Self {
            cache,
            ttl,
            call_timeout,
        }
    }

    pub async fn read<T, F, Fut>(&self, key: &str, fallback: F) -> Result<Vec<T>, TimelineError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, TimelineError>>,
    {
        if let Some(cached) = self.lookup(key).await {
            return Ok(cached);
        }

        tracing::debug!(key = %key, "Cache miss, querying store");
        let fresh = fallback().await?;
        self.populate(key, &fresh).await;
        Ok(fresh)
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<Vec<T>> {
        let raw = match self.call_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.cache.get(key)).await {
                Ok(raw) => raw,
                Err(_) => {
                    tracing::warn!(key = %key, "Cache GET timed out");
                    None
                }
            },
            None => self.cache.get(key).await,
        }?;

        match serde_json::from_str(&raw) {
            Ok(values) => {
                tracing::debug!(key = %key, "Cache hit");
                Some(values)
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    async fn populate<T: Serialize>(&self, key: &str, values: &[T]) {
        let encoded = match serde_json::to_string(values) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache value serialization failed");
                return;
            }
        };

        let set = self.cache.set(key, &encoded, Some(self.ttl));
        let outcome = match self.call_timeout {
            Some(limit) => match tokio::time::timeout(limit, set).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::warn!(key = %key, "Cache SET timed out");
                    return;
                }
            },
            None => set.await,
        };

        if let Err(e) = outcome {
            tracing::warn!(key = %key, error = %e, "Cache SET failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::RepoError;
    use crate::timeline::testing::RecordingCache;

    fn cache_aside(cache: Arc<RecordingCache>) -> CacheAside {
        CacheAside::new(cache, Duration::from_secs(5), Some(Duration::from_secs(1)))
    }

    #[tokio::test]
    async fn test_hit_skips_fallback() {
        let cache = Arc::new(RecordingCache::default());
        cache.preload("posts", "[1,2,3]");
        let calls = AtomicUsize::new(0);

        let values: Vec<u32> = cache_aside(cache.clone())
            .read("posts", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(vec![9])
            })
            .await
            .unwrap();

        assert_eq!(values, vec![1, 2, 3]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(cache.sets().is_empty());
    }

    #[tokio::test]
    async fn test_miss_runs_fallback_once_and_populates() {
        let cache = Arc::new(RecordingCache::default());
        let calls = AtomicUsize::new(0);

        let values: Vec<u32> = cache_aside(cache.clone())
            .read("posts", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(vec![4, 5])
            })
            .await
            .unwrap();

        assert_eq!(values, vec![4, 5]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            cache.sets(),
            vec![("posts".to_string(), "[4,5]".to_string(), Some(Duration::from_secs(5)))]
        );
    }

    #[tokio::test]
    async fn test_failed_fallback_does_not_populate() {
        let cache = Arc::new(RecordingCache::default());

        let result: Result<Vec<u32>, _> = cache_aside(cache.clone())
            .read("posts", || async {
                Err(TimelineError::Store(RepoError::Query("down".to_string())))
            })
            .await;

        assert!(matches!(result, Err(TimelineError::Store(_))));
        assert!(cache.sets().is_empty());
    }

    #[tokio::test]
    async fn test_set_failure_is_swallowed() {
        let cache = Arc::new(RecordingCache::failing_writes());

        let values: Vec<u32> = cache_aside(cache.clone())
            .read("posts", || async { Ok(vec![7]) })
            .await
            .unwrap();

        assert_eq!(values, vec![7]);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss() {
        let cache = Arc::new(RecordingCache::default());
        cache.preload("posts", "not json");

        let values: Vec<u32> = cache_aside(cache.clone())
            .read("posts", || async { Ok(vec![1]) })
            .await
            .unwrap();

        assert_eq!(values, vec![1]);
        assert_eq!(cache.sets().len(), 1);
    }
}
