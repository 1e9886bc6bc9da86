use serde_json::Value;

use crate::backend::TableBackend;
use crate::cli::error::{CliError, CliResult};
use crate::cli::utils::{apply_table_style, format_cell, format_rows, parse_ids, parse_object};
use crate::repository::{CrudRepository, RecordId, TableRepository};

fn repo<'a, B: TableBackend>(backend: &'a B, table: &str) -> TableRepository<'a, B, Value> {
    TableRepository::new(backend, table)
}

/// List every row of a table
pub async fn list_rows<B: TableBackend>(backend: &B, table: &str, format: &str) -> CliResult<String> {
    let rows = repo(backend, table).get_all().await?;

    match format {
        "json" => Ok(serde_json::to_string_pretty(&rows)?),
        _ => Ok(format_rows(&rows)),
    }
}

/// Get a single row by ID
pub async fn get_row<B: TableBackend>(
    backend: &B,
    table: &str,
    id: RecordId,
    format: &str,
) -> CliResult<String> {
    let row = repo(backend, table).get_by_id(id).await?;

    match (format, row) {
        ("json", row) => Ok(serde_json::to_string_pretty(&row)?),
        (_, None) => Ok(format!("No row with id {} in {}.", id, table)),
        (_, Some(row)) => {
            use tabled::builder::Builder;

            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            if let Value::Object(fields) = &row {
                for (key, value) in fields {
                    builder.push_record([key.clone(), format_cell(value)]);
                }
            }

            let mut table = builder.build();
            apply_table_style(&mut table);
            Ok(table.to_string())
        }
    }
}

/// Get rows by a comma-separated id list
pub async fn get_rows<B: TableBackend>(
    backend: &B,
    table: &str,
    ids: &str,
    format: &str,
) -> CliResult<String> {
    let ids = parse_ids(ids)?;
    let rows = repo(backend, table).get_by_ids(&ids).await?;

    match format {
        "json" => Ok(serde_json::to_string_pretty(&rows)?),
        _ => Ok(format_rows(&rows)),
    }
}

/// Insert a row given as a JSON object
pub async fn insert_row<B: TableBackend>(backend: &B, table: &str, json: &str) -> CliResult<String> {
    let row = parse_object(json)?;
    repo(backend, table).insert(&row).await?;
    Ok(format!("✓ Inserted row into {}", table))
}

/// Update a row with the fields of a JSON object
pub async fn update_row<B: TableBackend>(
    backend: &B,
    table: &str,
    id: RecordId,
    json: &str,
) -> CliResult<String> {
    let changes = parse_object(json)?;
    repo(backend, table).update(id, &changes).await?;
    Ok(format!("✓ Updated row {} in {}", id, table))
}

/// Delete a row (requires --force flag for safety)
pub async fn delete_row<B: TableBackend>(
    backend: &B,
    table: &str,
    id: RecordId,
    force: bool,
) -> CliResult<String> {
    if !force {
        return Err(CliError::ForceRequired);
    }

    repo(backend, table).delete(id).await?;
    Ok(format!("✓ Deleted row {} from {}", id, table))
}

/// Exact row count of a table
pub async fn count_rows<B: TableBackend>(backend: &B, table: &str) -> CliResult<String> {
    let count = repo(backend, table).count().await?;
    Ok(count.to_string())
}
