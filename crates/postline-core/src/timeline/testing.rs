//! Test doubles for the timeline ports.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::Key;
use crate::error::RepoError;
use crate::ports::{Cache, CacheError, Order, Query, RecordStore, StoredRecord};

type SetCall = (String, String, Option<Duration>);

#[derive(Default)]
pub struct RecordingCache {
    values: Mutex<HashMap<String, String>>,
    sets: Mutex<Vec<SetCall>>,
    fail_writes: bool,
}

impl RecordingCache {
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn preload(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn sets(&self) -> Vec<SetCall> {
        self.sets.lock().unwrap().clone()
    }
}

#[async_trait]
impl Cache for RecordingCache {
    async fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        if self.fail_writes {
            return Err(CacheError::Operation("read-only".to_string()));
        }
        self.sets
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string(), ttl));
        self.preload(key, value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> bool {
        self.values.lock().unwrap().contains_key(key)
    }
}

/// Vec-backed store that counts queries and can be told to fail, stall or
/// take a fixed time per query.
#[derive(Default)]
pub struct ScriptedStore {
    records: Mutex<Vec<StoredRecord>>,
    queries: Mutex<Vec<Query>>,
    next_id: AtomicUsize,
    fail_when: Option<fn(&Query) -> bool>,
    stall_when: Option<fn(&Query) -> bool>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedStore {
    pub fn failing_when(predicate: fn(&Query) -> bool) -> Self {
        Self {
            fail_when: Some(predicate),
            ..Self::default()
        }
    }

    pub fn stalling_when(predicate: fn(&Query) -> bool) -> Self {
        Self {
            stall_when: Some(predicate),
            ..Self::default()
        }
    }

    pub fn delaying(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Most queries observed running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn insert(&self, key: Key, creation: DateTime<Utc>, properties: serde_json::Value) {
        self.records.lock().unwrap().push(StoredRecord {
            key,
            creation,
            properties,
        });
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<Query> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for ScriptedStore {
    async fn query(&self, query: &Query) -> Result<Vec<StoredRecord>, RepoError> {
        self.queries.lock().unwrap().push(query.clone());

        if let Some(delay) = self.delay {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
        if self.stall_when.is_some_and(|p| p(query)) {
            std::future::pending::<()>().await;
        }
        if self.fail_when.is_some_and(|p| p(query)) {
            return Err(RepoError::Query("scripted failure".to_string()));
        }

        let mut found: Vec<StoredRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        found.sort_by_key(|r| r.creation);
        if query.order == Order::CreationDesc {
            found.reverse();
        }
        if let Some(limit) = query.limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn put(
        &self,
        key: Key,
        creation: DateTime<Utc>,
        properties: serde_json::Value,
    ) -> Result<Key, RepoError> {
        let key = if key.is_complete() {
            key
        } else {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            key.complete_with(format!("id-{id}"))
        };
        self.records.lock().unwrap().retain(|r| r.key != key);
        self.insert(key.clone(), creation, properties);
        Ok(key)
    }
}
