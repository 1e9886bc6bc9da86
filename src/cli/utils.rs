//! Shared utilities for CLI commands

use serde_json::Value;
use tabled::builder::Builder;
use tabled::{Table, settings::Style};

use crate::cli::error::{CliError, CliResult};
use crate::repository::RecordId;

/// Widest cell rendered in table output.
const MAX_CELL: usize = 40;

/// Truncate a string with ellipsis if it exceeds max length
pub fn truncate_with_ellipsis(s: &str, max: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max - 3).collect();
        format!("{}...", truncated)
    }
}

/// Parse comma-separated ids, e.g. `1, 2,3`. Blank input yields no ids.
pub fn parse_ids(input: &str) -> CliResult<Vec<RecordId>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<RecordId>().map_err(|_| CliError::InvalidIds {
                input: input.to_string(),
            })
        })
        .collect()
}

/// Parse a JSON object argument.
pub fn parse_object(input: &str) -> CliResult<Value> {
    let value: Value = serde_json::from_str(input)?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(CliError::InvalidJson {
            message: "expected a JSON object".to_string(),
        })
    }
}

/// Render one cell of a row.
pub fn format_cell(value: &Value) -> String {
    let text = match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    truncate_with_ellipsis(&text, MAX_CELL)
}

/// Render schema-less rows as a table.
///
/// Columns are the union of row keys in order of first appearance; a row
/// missing a column shows `-`.
pub fn format_rows(rows: &[Value]) -> String {
    if rows.is_empty() {
        return "No rows found.".to_string();
    }

    let mut columns: Vec<&str> = Vec::new();
    for row in rows {
        if let Value::Object(fields) = row {
            for key in fields.keys() {
                if !columns.contains(&key.as_str()) {
                    columns.push(key);
                }
            }
        }
    }

    let mut builder = Builder::default();
    builder.push_record(columns.iter().copied());
    for row in rows {
        builder.push_record(
            columns
                .iter()
                .map(|c| row.get(*c).map(format_cell).unwrap_or_else(|| "-".to_string())),
        );
    }

    let mut table = builder.build();
    apply_table_style(&mut table);
    table.to_string()
}

/// Apply consistent table styling
pub fn apply_table_style(table: &mut Table) {
    table.with(Style::rounded());
}
