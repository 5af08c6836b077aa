//! Timeline reads: the global and user-scoped views merged into one.
//!
//! Every read of posts or comments runs two fetches concurrently, a global
//! view (optionally served from cache) and the caller's own records read
//! fresh, then merges them by creation time. Posts then fan out one task per
//! post to attach comments.

mod cache_aside;
mod dual_source;
mod fanout;
mod merge;

#[cfg(test)]
pub(crate) mod testing;

use std::future::Future;
use std::time::Duration;

pub use cache_aside::CacheAside;
pub use dual_source::DualSourceFetcher;
pub use fanout::attach_children;
pub use merge::merge_sorted;

use crate::error::{RepoError, TimelineError};

/// Tuning for timeline reads.
#[derive(Debug, Clone)]
pub struct TimelineConfig {
    /// Cache key of the global post view.
    pub posts_cache_key: String,
    /// Expiration of cached global views.
    pub cache_ttl: Duration,
    /// Number of posts fetched when the caller does not ask for a count.
    pub default_limit: usize,
    /// Upper bound on any requested count, which also caps the comment fan-out.
    pub max_limit: usize,
    /// Deadline for each individual store or cache call.
    pub call_timeout: Option<Duration>,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            posts_cache_key: "posts".to_string(),
            cache_ttl: Duration::from_secs(5),
            default_limit: 10,
            max_limit: 50,
            call_timeout: Some(Duration::from_secs(10)),
        }
    }
}

/// Run a store call under an optional deadline.
pub(crate) async fn with_deadline<T, F>(timeout: Option<Duration>, call: F) -> Result<T, TimelineError>
where
    F: Future<Output = Result<T, RepoError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| TimelineError::Timeout(limit))?
            .map_err(TimelineError::from),
        None => call.await.map_err(TimelineError::from),
    }
}
