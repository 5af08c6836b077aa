//! In-memory record store - used when no database is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use postline_core::domain::Key;
use postline_core::error::RepoError;
use postline_core::ports::{Order, Query, RecordStore, StoredRecord};

/// Record store holding everything in a HashMap behind an async RwLock.
///
/// Queries scan every record. Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<Key, StoredRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn query(&self, query: &Query) -> Result<Vec<StoredRecord>, RepoError> {
        let records = self.records.read().await;
        let mut found: Vec<StoredRecord> = records
            .values()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        drop(records);

        // ties broken by key so repeated reads agree
        found.sort_by(|a, b| {
            a.creation
                .cmp(&b.creation)
                .then_with(|| a.key.to_string().cmp(&b.key.to_string()))
        });
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
            key.complete_with(Uuid::new_v4().to_string())
        };

        self.records.write().await.insert(
            key.clone(),
            StoredRecord {
                key: key.clone(),
                creation,
                properties,
            },
        );

        Ok(key)
    }
}
