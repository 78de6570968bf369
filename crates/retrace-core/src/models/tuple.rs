use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{RetraceResult, StorageError};

use super::window::ValidityWindow;

/// Identity of one logged fact: (node, collection, content hash, insertion
/// time). Content-addressed and immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TupleId {
    pub node: String,
    pub collection: String,
    pub hash: i64,
    pub time_inserted: i64,
}

impl TupleId {
    pub fn new(
        node: impl Into<String>,
        collection: impl Into<String>,
        hash: i64,
        time_inserted: i64,
    ) -> Self {
        Self {
            node: node.into(),
            collection: collection.into(),
            hash,
            time_inserted,
        }
    }
}

impl fmt::Display for TupleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}#{}@{}",
            self.node, self.collection, self.hash, self.time_inserted
        )
    }
}

/// One SQL-facing column value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Payload length in bytes for text/blob values.
    pub fn byte_len(&self) -> Option<usize> {
        match self {
            Value::Text(s) => Some(s.len()),
            Value::Blob(b) => Some(b.len()),
            _ => None,
        }
    }

    /// Short name of the variant, for error reporting.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Blob(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

/// A materialized row from a logged collection: identity, validity window,
/// physical timestamps, and the collection's declared column values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TupleRow {
    pub id: TupleId,
    pub time_deleted: Option<i64>,
    pub physical_time_inserted: DateTime<Utc>,
    pub physical_time_deleted: Option<DateTime<Utc>>,
    /// Declared column names, parallel to `values`.
    pub columns: Vec<String>,
    pub values: Vec<Value>,
}

impl TupleRow {
    pub fn window(&self) -> ValidityWindow {
        ValidityWindow::new(self.id.time_inserted, self.time_deleted)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    /// The value of a declared column, or a typed error naming it.
    pub fn require(&self, column: &str) -> RetraceResult<&Value> {
        self.get(column).ok_or_else(|| {
            StorageError::UnknownColumn {
                column: column.to_string(),
                collection: self.id.collection.clone(),
            }
            .into()
        })
    }

    pub fn integer(&self, column: &str) -> RetraceResult<i64> {
        let value = self.require(column)?;
        value.as_integer().ok_or_else(|| {
            StorageError::ColumnType {
                column: column.to_string(),
                collection: self.id.collection.clone(),
                expected: "integer",
                found: value.type_name(),
            }
            .into()
        })
    }

    pub fn text(&self, column: &str) -> RetraceResult<&str> {
        let value = self.require(column)?;
        value.as_text().ok_or_else(|| {
            StorageError::ColumnType {
                column: column.to_string(),
                collection: self.id.collection.clone(),
                expected: "text",
                found: value.type_name(),
            }
            .into()
        })
    }
}
