//! PostgreSQL record store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, LikeExpr, OnConflict};
use sea_orm::{ColumnTrait, Condition, DbConn, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use postline_core::domain::Key;
use postline_core::error::RepoError;
use postline_core::ports::{Filter, Order, Query, RecordStore, StoredRecord};

use super::entity::record::{self, Entity as RecordEntity};

/// Record store backed by the `records` table.
pub struct PostgresRecordStore {
    db: DbConn,
}

impl PostgresRecordStore {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

/// Matches `ancestor` itself and every key nested beneath it.
fn ancestor_condition(ancestor: &Key) -> Result<Condition, RepoError> {
    let encoded = ancestor
        .encode()
        .map_err(|e| RepoError::Query(e.to_string()))?;
    // `_` is part of the base64url alphabet and a LIKE wildcard
    let pattern = format!("{}.%", encoded.replace('_', "\\_"));

    Ok(Condition::any()
        .add(record::Column::Id.eq(encoded))
        .add(record::Column::Id.like(LikeExpr::new(pattern).escape('\\'))))
}

fn property_condition(filter: &Filter) -> Condition {
    Condition::all().add(Expr::cust_with_values(
        "\"properties\" -> ? = ?::jsonb",
        [filter.property.clone(), filter.value.to_string()],
    ))
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn query(&self, query: &Query) -> Result<Vec<StoredRecord>, RepoError> {
        let mut select = RecordEntity::find().filter(record::Column::Kind.eq(query.kind.as_str()));

        if let Some(filter) = &query.filter {
            select = select.filter(property_condition(filter));
        }
        if let Some(ancestor) = &query.ancestor {
            select = select.filter(ancestor_condition(ancestor)?);
        }
        select = match query.order {
            Order::CreationAsc => select
                .order_by_asc(record::Column::CreatedAt)
                .order_by_asc(record::Column::Id),
            Order::CreationDesc => select
                .order_by_desc(record::Column::CreatedAt)
                .order_by_desc(record::Column::Id),
        };
        if let Some(limit) = query.limit {
            select = select.limit(limit as u64);
        }

        let rows = select
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;
        tracing::debug!(kind = %query.kind, rows = rows.len(), "Record query");

        rows.into_iter().map(StoredRecord::try_from).collect()
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

        let model = record::ActiveModel::try_from(StoredRecord {
            key: key.clone(),
            creation,
            properties,
        })?;

        RecordEntity::insert(model)
            .on_conflict(
                OnConflict::column(record::Column::Id)
                    .update_columns([record::Column::CreatedAt, record::Column::Properties])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| {
                let err_str = e.to_string();
                if err_str.contains("connection") {
                    RepoError::Connection(err_str)
                } else {
                    RepoError::Write(err_str)
                }
            })?;

        Ok(key)
    }
}
