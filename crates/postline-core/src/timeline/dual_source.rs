use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{CacheAside, merge_sorted, with_deadline};
use crate::domain::Key;
use crate::error::TimelineError;
use crate::ports::{Query, Record, RecordStore, query_records};

/// Runs the global and user-scoped reads of a query side by side and merges them.
///
/// Both branches are polled concurrently; the first error aborts the other
/// branch and is returned as-is. Without a scope (anonymous caller) the
/// user-scoped branch yields nothing and issues no store call.
#[derive(Clone)]
pub struct DualSourceFetcher {
    store: Arc<dyn RecordStore>,
    cache: CacheAside,
    call_timeout: Option<Duration>,
}

impl DualSourceFetcher {
    pub fn new(store: Arc<dyn RecordStore>, cache: CacheAside, call_timeout: Option<Duration>) -> Self {
        Self {
            store,
            cache,
            call_timeout,
        }
    }

    /// Global view through the cache under `cache_key`, merged with the
    /// caller's fresh view. The caller's records take priority.
    pub async fn fetch_cached<T>(
        &self,
        query: Query,
        cache_key: &str,
        scope: Option<&Key>,
    ) -> Result<Vec<T>, TimelineError>
    where
        T: Record + Serialize + DeserializeOwned,
    {
        let global = self.cache.read(cache_key, || self.fresh(query.clone()));
        let mine = self.scoped(&query, scope);

        let (mine, global) = tokio::try_join!(mine, global)?;
        tracing::debug!(
            kind = %query.kind,
            mine = mine.len(),
            global = global.len(),
            "Merging cached timeline"
        );

        Ok(merge_sorted(mine, global, query.order, query.limit))
    }

    /// Both views read straight from the store. The global records take priority.
    pub async fn fetch_fresh<T: Record>(
        &self,
        query: Query,
        scope: Option<&Key>,
    ) -> Result<Vec<T>, TimelineError> {
        let global = self.fresh(query.clone());
        let mine = self.scoped(&query, scope);

        let (global, mine) = tokio::try_join!(global, mine)?;

        Ok(merge_sorted(global, mine, query.order, query.limit))
    }

    /// A single ancestor-scoped read with no cache and no merge.
    pub async fn fetch_scoped<T: Record>(&self, query: Query, scope: &Key) -> Result<Vec<T>, TimelineError> {
        self.fresh(query.ancestor(Some(scope.clone()))).await
    }

    async fn scoped<T: Record>(&self, query: &Query, scope: Option<&Key>) -> Result<Vec<T>, TimelineError> {
        match scope {
            Some(scope) => self.fetch_scoped(query.clone(), scope).await,
            None => Ok(Vec::new()),
        }
    }

    async fn fresh<T: Record>(&self, query: Query) -> Result<Vec<T>, TimelineError> {
        with_deadline(self.call_timeout, query_records(self.store.as_ref(), &query)).await
    }
}
