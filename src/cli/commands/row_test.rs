use crate::backend::MemoryBackend;
use crate::cli::commands::row::*;
use crate::cli::error::CliError;
use crate::repository::RepoError;
use serde_json::{Value, json};

fn seeded_backend() -> MemoryBackend {
    MemoryBackend::new().with_table(
        "items",
        vec![
            json!({"id": 1, "name": "widget", "qty": 4}),
            json!({"id": 2, "name": "gadget", "qty": 0}),
        ],
    )
    .expect("seed rows should be valid")
}

#[tokio::test]
async fn test_list_rows_json() {
    let backend = seeded_backend();
    let output = list_rows(&backend, "items", "json").await.unwrap();

    let rows: Vec<Value> = serde_json::from_str(&output).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "widget");
}

#[tokio::test]
async fn test_list_rows_table() {
    let backend = seeded_backend();
    let output = list_rows(&backend, "items", "table").await.unwrap();

    assert!(output.contains("widget"));
    assert!(output.contains("gadget"));
}

#[tokio::test]
async fn test_get_row_table_and_missing() {
    let backend = seeded_backend();

    let output = get_row(&backend, "items", 1, "table").await.unwrap();
    assert!(output.contains("Field"));
    assert!(output.contains("widget"));

    let missing = get_row(&backend, "items", 9, "table").await.unwrap();
    assert_eq!(missing, "No row with id 9 in items.");

    let missing_json = get_row(&backend, "items", 9, "json").await.unwrap();
    assert_eq!(missing_json, "null");
}

#[tokio::test]
async fn test_get_rows_by_id_list() {
    let backend = seeded_backend();
    let output = get_rows(&backend, "items", "2,7", "json").await.unwrap();

    let rows: Vec<Value> = serde_json::from_str(&output).unwrap();
    assert_eq!(rows, vec![json!({"id": 2, "name": "gadget", "qty": 0})]);
}

#[tokio::test]
async fn test_get_rows_rejects_bad_id_list() {
    let backend = seeded_backend();
    let result = get_rows(&backend, "items", "1,x", "json").await;
    assert!(matches!(result, Err(CliError::InvalidIds { .. })));
}

#[tokio::test]
async fn test_insert_update_count() {
    let backend = seeded_backend();

    let inserted = insert_row(&backend, "items", r#"{"name": "gizmo", "qty": 2}"#)
        .await
        .unwrap();
    assert_eq!(inserted, "✓ Inserted row into items");
    assert_eq!(count_rows(&backend, "items").await.unwrap(), "3");

    let updated = update_row(&backend, "items", 3, r#"{"qty": 8}"#)
        .await
        .unwrap();
    assert_eq!(updated, "✓ Updated row 3 in items");

    let output = get_row(&backend, "items", 3, "json").await.unwrap();
    let row: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(row, json!({"id": 3, "name": "gizmo", "qty": 8}));
}

#[tokio::test]
async fn test_insert_rejects_non_object() {
    let backend = seeded_backend();
    let result = insert_row(&backend, "items", "42").await;
    assert!(matches!(result, Err(CliError::InvalidJson { .. })));
}

#[tokio::test]
async fn test_delete_requires_force() {
    let backend = seeded_backend();

    let result = delete_row(&backend, "items", 1, false).await;
    assert!(matches!(result, Err(CliError::ForceRequired)));
    assert_eq!(count_rows(&backend, "items").await.unwrap(), "2");

    let output = delete_row(&backend, "items", 1, true).await.unwrap();
    assert_eq!(output, "✓ Deleted row 1 from items");
    assert_eq!(count_rows(&backend, "items").await.unwrap(), "1");
}

#[tokio::test]
async fn test_unknown_table_surfaces_repository_error() {
    let backend = MemoryBackend::new();
    let result = count_rows(&backend, "ghosts").await;

    match result {
        Err(CliError::Repo(RepoError::Backend { message, .. })) => {
            assert_eq!(message, "relation \"ghosts\" does not exist");
        }
        other => panic!("expected backend error, got {:?}", other),
    }
}
