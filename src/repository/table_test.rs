//! Tests for TableRepository.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::backend::{
    BackendResponse, Columns, ErrorBody, Filter, MemoryBackend, TableBackend, TransportError,
    TransportResult,
};
use crate::repository::{CrudRepository, Operation, RepoError, TableRepository};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Item {
    id: i64,
    name: String,
    qty: i64,
}

fn item(id: i64, name: &str, qty: i64) -> Item {
    Item {
        id,
        name: name.to_string(),
        qty,
    }
}

fn setup_backend() -> MemoryBackend {
    let backend = MemoryBackend::new();
    backend.create_table("items");
    backend
}

/// Backend whose every call fails the same way.
enum Failure {
    Reported(ErrorBody),
    Transport(String),
}

struct FailingBackend {
    failure: Failure,
    calls: AtomicUsize,
}

impl FailingBackend {
    fn reported(message: &str) -> Self {
        Self {
            failure: Failure::Reported(ErrorBody::new(message)),
            calls: AtomicUsize::new(0),
        }
    }

    fn transport(message: &str) -> Self {
        Self {
            failure: Failure::Transport(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    fn outcome<D>(&self) -> TransportResult<BackendResponse<D>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Failure::Reported(body) => Ok(BackendResponse::failed(body.clone())),
            Failure::Transport(message) => Err(TransportError::Request {
                message: message.clone(),
            }),
        }
    }
}

impl TableBackend for FailingBackend {
    async fn select(
        &self,
        _table: &str,
        _columns: &Columns,
        _filter: Option<&Filter>,
    ) -> TransportResult<BackendResponse<Vec<Value>>> {
        self.outcome()
    }

    async fn count(&self, _table: &str) -> TransportResult<BackendResponse<()>> {
        self.outcome()
    }

    async fn insert(&self, _table: &str, _row: Value) -> TransportResult<BackendResponse<Vec<Value>>> {
        self.outcome()
    }

    async fn update(
        &self,
        _table: &str,
        _changes: Value,
        _filter: &Filter,
    ) -> TransportResult<BackendResponse<Vec<Value>>> {
        self.outcome()
    }

    async fn delete(&self, _table: &str, _filter: &Filter) -> TransportResult<BackendResponse<()>> {
        self.outcome()
    }
}

// =============================================================================
// Happy paths against MemoryBackend
// =============================================================================

#[tokio::test]
async fn new_repository_keeps_table_name() {
    let backend = setup_backend();
    let repo: TableRepository<'_, _> = TableRepository::new(&backend, "items");
    assert_eq!(repo.table(), "items");
}

#[tokio::test]
async fn empty_table_counts_zero_and_lists_nothing() {
    let backend = setup_backend();
    let repo: TableRepository<'_, _, Item> = TableRepository::new(&backend, "items");

    assert_eq!(repo.count().await.unwrap(), 0);
    assert!(repo.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn insert_then_get_by_id_returns_inserted_fields() {
    let backend = setup_backend();
    let repo: TableRepository<'_, _, Item> = TableRepository::new(&backend, "items");

    let apple = item(7, "apple", 3);
    repo.insert(&apple).await.expect("Insert should succeed");

    let fetched = repo.get_by_id(7).await.expect("Get should succeed");
    assert_eq!(fetched, Some(apple));
}

#[tokio::test]
async fn get_by_id_of_absent_row_is_none() {
    let backend = setup_backend();
    let repo: TableRepository<'_, _, Item> = TableRepository::new(&backend, "items");

    assert_eq!(repo.get_by_id(404).await.unwrap(), None);
}

#[tokio::test]
async fn get_by_ids_returns_only_present_rows() {
    let backend = setup_backend();
    let repo: TableRepository<'_, _, Item> = TableRepository::new(&backend, "items");
    for it in [item(1, "a", 1), item(2, "b", 2), item(3, "c", 3)] {
        repo.insert(&it).await.unwrap();
    }

    let found = repo.get_by_ids(&[1, 3, 99]).await.unwrap();
    assert_eq!(found, vec![item(1, "a", 1), item(3, "c", 3)]);
}

#[tokio::test]
async fn get_by_ids_with_empty_or_absent_ids_is_empty() {
    let backend = setup_backend();
    let repo: TableRepository<'_, _, Item> = TableRepository::new(&backend, "items");
    repo.insert(&item(1, "a", 1)).await.unwrap();

    assert!(repo.get_by_ids(&[]).await.unwrap().is_empty());
    assert!(repo.get_by_ids(&[42, 43]).await.unwrap().is_empty());
}

#[tokio::test]
async fn partial_update_keeps_unspecified_fields() {
    let backend = setup_backend();
    let repo: TableRepository<'_, _, Item> = TableRepository::new(&backend, "items");
    repo.insert(&item(5, "pear", 2)).await.unwrap();

    repo.update(5, &json!({"qty": 9}))
        .await
        .expect("Update should succeed");

    let fetched = repo.get_by_id(5).await.unwrap();
    assert_eq!(fetched, Some(item(5, "pear", 9)));
}

#[tokio::test]
async fn delete_then_get_by_id_is_none() {
    let backend = setup_backend();
    let repo: TableRepository<'_, _, Item> = TableRepository::new(&backend, "items");
    repo.insert(&item(8, "plum", 1)).await.unwrap();

    repo.delete(8).await.expect("Delete should succeed");

    assert_eq!(repo.get_by_id(8).await.unwrap(), None);
}

#[tokio::test]
async fn count_matches_get_all_length() {
    let backend = setup_backend();
    let repo: TableRepository<'_, _, Item> = TableRepository::new(&backend, "items");
    for id in 1..=4 {
        repo.insert(&item(id, "x", id)).await.unwrap();
    }

    let all = repo.get_all().await.unwrap();
    assert_eq!(repo.count().await.unwrap(), all.len() as u64);
    assert_eq!(all.len(), 4);
}

#[tokio::test]
async fn schema_less_records_round_trip_as_json() {
    let backend = setup_backend();
    let repo: TableRepository<'_, _> = TableRepository::new(&backend, "items");

    repo.insert(&json!({"id": 1, "tags": ["red", "round"]}))
        .await
        .unwrap();

    let fetched = repo.get_by_id(1).await.unwrap().unwrap();
    assert_eq!(fetched["tags"], json!(["red", "round"]));
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_operations_share_one_repository() {
    let backend = setup_backend();
    let repo: TableRepository<'_, _, Item> = TableRepository::new(&backend, "items");

    let (first, second, third) = (item(1, "a", 1), item(2, "b", 2), item(3, "c", 3));
    let (a, b, c) = tokio::join!(
        repo.insert(&first),
        repo.insert(&second),
        repo.insert(&third),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    let (count, rows) = tokio::join!(repo.count(), repo.get_all());
    assert_eq!(count.unwrap(), 3);
    assert_eq!(rows.unwrap().len(), 3);
}

// =============================================================================
// Failure paths
// =============================================================================

#[tokio::test]
async fn reported_select_error_is_wrapped_with_fetch_message() {
    let backend = FailingBackend::reported("relation not found");
    let repo: TableRepository<'_, _> = TableRepository::new(&backend, "items");

    let err = repo.get_all().await.unwrap_err();
    assert!(
        err.to_string()
            .contains("Error fetching data: relation not found")
    );
    assert_eq!(err.operation(), Some(Operation::Fetch));
}

#[tokio::test]
async fn reported_errors_are_tagged_with_failing_operation() {
    let backend = FailingBackend::reported("denied");
    let repo: TableRepository<'_, _> = TableRepository::new(&backend, "items");

    let insert = repo.insert(&json!({"id": 1})).await.unwrap_err();
    let update = repo.update(1, &json!({"a": 1})).await.unwrap_err();
    let delete = repo.delete(1).await.unwrap_err();
    let count = repo.count().await.unwrap_err();
    let by_ids = repo.get_by_ids(&[1]).await.unwrap_err();

    assert_eq!(insert.to_string(), "Error inserting data: denied");
    assert_eq!(update.to_string(), "Error updating data: denied");
    assert_eq!(delete.to_string(), "Error deleting data: denied");
    assert_eq!(count.to_string(), "Error counting rows: denied");
    assert_eq!(by_ids.to_string(), "Error fetching data: denied");
    assert_eq!(backend.calls.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn transport_error_on_delete_passes_through_unchanged() {
    let backend = FailingBackend::transport("network unreachable");
    let repo: TableRepository<'_, _> = TableRepository::new(&backend, "items");

    let err = repo.delete(1).await.unwrap_err();
    match err {
        RepoError::Transport(TransportError::Request { message }) => {
            assert_eq!(message, "network unreachable");
        }
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_table_is_reported_not_raised_by_backend() {
    let backend = MemoryBackend::new();
    let repo: TableRepository<'_, _> = TableRepository::new(&backend, "ghosts");

    let err = repo.count().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Error counting rows: relation \"ghosts\" does not exist"
    );
    assert_eq!(err.backend_code(), Some("42P01"));
}

#[tokio::test]
async fn mismatched_row_shape_is_codec_error() {
    let backend = MemoryBackend::new()
        .with_table("items", vec![json!({"id": 1, "label": "x"})])
        .expect("seed rows should be valid");
    let repo: TableRepository<'_, _, Item> = TableRepository::new(&backend, "items");

    let err = repo.get_by_id(1).await.unwrap_err();
    assert!(matches!(
        err,
        RepoError::Codec {
            operation: Operation::Fetch,
            ..
        }
    ));
}

#[tokio::test]
async fn each_operation_makes_exactly_one_call() {
    let backend = FailingBackend::reported("nope");
    let repo: TableRepository<'_, _> = TableRepository::new(&backend, "items");

    let _ = repo.get_by_id(1).await;
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    let _ = repo.get_all().await;
    assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
}
