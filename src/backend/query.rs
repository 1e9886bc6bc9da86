//! Column selection and row filters understood by every backend.

use std::fmt;

use serde_json::Value;

/// Columns to return from a select.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Columns {
    #[default]
    All,
    List(Vec<String>),
}

impl Columns {
    /// Select-list expression, `*` for all columns.
    pub fn as_select(&self) -> String {
        match self {
            Columns::All => "*".to_string(),
            Columns::List(cols) if cols.is_empty() => "*".to_string(),
            Columns::List(cols) => cols.join(","),
        }
    }
}

impl fmt::Display for Columns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_select())
    }
}

/// Row filter. Only equality and set membership are supported.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq { column: String, value: Value },
    In { column: String, values: Vec<Value> },
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn is_in<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Filter::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn column(&self) -> &str {
        match self {
            Filter::Eq { column, .. } | Filter::In { column, .. } => column,
        }
    }

    /// Whether `row` satisfies this filter. Missing columns never match.
    pub fn matches(&self, row: &Value) -> bool {
        let Some(field) = row.get(self.column()) else {
            return false;
        };
        match self {
            Filter::Eq { value, .. } => field == value,
            Filter::In { values, .. } => values.iter().any(|v| v == field),
        }
    }
}
