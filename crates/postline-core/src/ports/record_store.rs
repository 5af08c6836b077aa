//! Ordered record store port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Key;
use crate::error::RepoError;

/// A record as the store sees it: key, creation time and opaque properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub key: Key,
    pub creation: DateTime<Utc>,
    pub properties: serde_json::Value,
}

/// Sort order of a query. Records are always ordered by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    CreationAsc,
    CreationDesc,
}

/// Equality filter on a single top-level property.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub property: String,
    pub value: serde_json::Value,
}

impl Filter {
    pub fn matches(&self, properties: &serde_json::Value) -> bool {
        properties.get(&self.property) == Some(&self.value)
    }
}

/// A kind-scoped query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub kind: String,
    pub filter: Option<Filter>,
    pub ancestor: Option<Key>,
    pub order: Order,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            filter: None,
            ancestor: None,
            order: Order::default(),
            limit: None,
        }
    }

    pub fn filter(mut self, property: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.filter = Some(Filter {
            property: property.into(),
            value: value.into(),
        });
        self
    }

    pub fn ancestor(mut self, ancestor: Option<Key>) -> Self {
        self.ancestor = ancestor;
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when `record` falls within this query's kind, filter and ancestor scope.
    pub fn matches(&self, record: &StoredRecord) -> bool {
        record.key.kind() == self.kind
            && self
                .filter
                .as_ref()
                .is_none_or(|f| f.matches(&record.properties))
            && self
                .ancestor
                .as_ref()
                .is_none_or(|a| record.key.is_descendant_of(a))
    }
}

/// Record store trait - abstraction over ordered, queryable backends.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Run a query and return matching records in the requested order.
    async fn query(&self, query: &Query) -> Result<Vec<StoredRecord>, RepoError>;

    /// Persist a record. Incomplete keys are completed by the store;
    /// complete keys overwrite whatever is stored under them.
    async fn put(
        &self,
        key: Key,
        creation: DateTime<Utc>,
        properties: serde_json::Value,
    ) -> Result<Key, RepoError>;
}

/// A domain type that round-trips through [`StoredRecord`].
pub trait Record: Sized + Send + 'static {
    const KIND: &'static str;

    fn key(&self) -> Option<&Key>;

    fn creation(&self) -> DateTime<Utc>;

    fn properties(&self) -> serde_json::Value;

    fn from_stored(record: StoredRecord) -> Result<Self, RepoError>;
}

/// Run `query` and decode every record into `T`.
pub async fn query_records<T: Record>(
    store: &dyn RecordStore,
    query: &Query,
) -> Result<Vec<T>, RepoError> {
    store
        .query(query)
        .await?
        .into_iter()
        .map(T::from_stored)
        .collect()
}
