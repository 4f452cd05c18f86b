//! Integration tests for the SQLite-backed config store.

use dr_database::models::Dialect;
use dr_database::{ConfigStore, WarehouseClient, WarehouseOptions};
use tempfile::TempDir;

fn app_database_url(dir: &TempDir) -> String {
    format!("sqlite://{}", dir.path().join("app.db").display())
}

/// Test that a fresh store holds no connection
#[tokio::test]
async fn test_fresh_store_is_empty() {
    let store = ConfigStore::open("sqlite::memory:").await.unwrap();
    assert!(store.current().await.unwrap().is_none());
}

/// Test that upsert overwrites the single row and keeps created_at
#[tokio::test]
async fn test_upsert_overwrites_single_row() {
    let store = ConfigStore::open("sqlite::memory:").await.unwrap();

    let first = store
        .upsert(Dialect::Postgres, "postgres://u:p@localhost:5432/dw")
        .await
        .unwrap();
    let second = store
        .upsert(
            Dialect::Mssql,
            "server=tcp:h,1433;database=dw;user id=sa;password=secret",
        )
        .await
        .unwrap();

    assert_eq!(second.dialect, Dialect::Mssql);
    assert_eq!(second.created_at, first.created_at);
    assert!(second.updated_at >= first.updated_at);

    let current = store.current().await.unwrap().unwrap();
    assert_eq!(current.dialect, Dialect::Mssql);
    assert!(current.connection_string.contains("password=secret"));
    assert_eq!(
        current.masked_connection_string(),
        "server=tcp:h,1433;database=dw;user id=sa;password=***"
    );
}

/// Test that the saved connection survives reopening the file
#[tokio::test]
async fn test_store_persists_on_disk() {
    let dir = TempDir::new().unwrap();
    let url = app_database_url(&dir);

    let store = ConfigStore::open(&url).await.unwrap();
    store
        .upsert(Dialect::Postgres, "postgres://u:p@localhost/dw")
        .await
        .unwrap();
    store.close().await;

    let reopened = ConfigStore::open(&url).await.unwrap();
    let current = reopened.current().await.unwrap().unwrap();
    assert_eq!(current.dialect, Dialect::Postgres);
    assert_eq!(current.connection_string, "postgres://u:p@localhost/dw");
}

/// Test that the warehouse client picks up the stored dialect
#[tokio::test]
async fn test_client_resolves_from_store() {
    let store = ConfigStore::open("sqlite::memory:").await.unwrap();

    let client = WarehouseClient::resolve(&store, WarehouseOptions::default())
        .await
        .unwrap();
    assert!(client.dialect().is_none());

    store
        .upsert(Dialect::Mssql, "server=tcp:h,1433;database=dw;user id=sa;password=x")
        .await
        .unwrap();
    let client = WarehouseClient::resolve(&store, WarehouseOptions::default())
        .await
        .unwrap();
    assert_eq!(client.dialect(), Some(Dialect::Mssql));
}

/// Test that a malformed app database URL is a persistence error
#[tokio::test]
async fn test_invalid_url_rejected() {
    let err = ConfigStore::open("sqlite::memory:?bogus=1").await.unwrap_err();
    assert!(matches!(
        err,
        dr_database::AssistantError::Persistence { .. }
    ));
}
