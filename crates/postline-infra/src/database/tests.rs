use chrono::{TimeZone, Utc};
use postline_core::domain::Key;
use postline_core::error::RepoError;
use postline_core::ports::{Order, Query, RecordStore};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

use crate::database::entity::record;
use crate::database::postgres_store::PostgresRecordStore;

fn post_row(owner: &str, name: &str, secs: i64) -> record::Model {
    let key = Key::named("Post", name, Some(Key::named("User", owner, None)));
    record::Model {
        id: key.encode().unwrap(),
        kind: "Post".to_owned(),
        created_at: Utc.timestamp_opt(secs, 0).unwrap().into(),
        properties: serde_json::json!({ "title": name, "text": "", "author": owner }),
    }
}

#[tokio::test]
async fn test_query_decodes_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![
            post_row("ada@example.com", "p2", 20),
            post_row("bob@example.com", "p1", 10),
        ]])
        .into_connection();

    let store = PostgresRecordStore::new(db);
    let records = store
        .query(&Query::new("Post").order(Order::CreationDesc).limit(2))
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].key.name(), Some("p2"));
    assert_eq!(
        records[0].key.parent(),
        Some(&Key::named("User", "ada@example.com", None))
    );
    assert_eq!(records[1].creation, Utc.timestamp_opt(10, 0).unwrap());
}

#[tokio::test]
async fn test_query_rejects_undecodable_id() {
    let mut row = post_row("ada@example.com", "p1", 10);
    row.id = "not a key!".to_owned();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![row]])
        .into_connection();

    let store = PostgresRecordStore::new(db);
    let err = store.query(&Query::new("Post")).await.unwrap_err();

    assert!(matches!(err, RepoError::Decode(_)));
}

#[tokio::test]
async fn test_put_assigns_id_to_incomplete_key() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    let store = PostgresRecordStore::new(db);
    let owner = Key::named("User", "ada@example.com", None);
    let key = store
        .put(
            Key::incomplete("Post", Some(owner.clone())),
            Utc::now(),
            serde_json::json!({ "title": "t" }),
        )
        .await
        .unwrap();

    assert!(key.is_complete());
    assert!(key.is_descendant_of(&owner));
}
