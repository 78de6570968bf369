//! Snapshot queries over the log, as free functions on a connection.

pub mod catalog;
pub mod edges;
pub mod point;
pub mod registered;
pub mod scan;

use chrono::{DateTime, Utc};
use rusqlite::types::ValueRef;
use rusqlite::Row;

use retrace_core::errors::{RetraceResult, StorageError};
use retrace_core::models::{CollectionSpec, TupleId, TupleRow, Value};

use crate::to_storage_err;

/// Bind a core [`Value`] as an owned SQL parameter.
pub(crate) fn sql_param(value: &Value) -> rusqlite::types::Value {
    match value {
        Value::Null => rusqlite::types::Value::Null,
        Value::Integer(i) => rusqlite::types::Value::Integer(*i),
        Value::Real(r) => rusqlite::types::Value::Real(*r),
        Value::Text(s) => rusqlite::types::Value::Text(s.clone()),
        Value::Blob(b) => rusqlite::types::Value::Blob(b.clone()),
    }
}

/// The fixed SELECT prefix shared by every history-table query
/// (5 columns, indices 0-4; declared columns follow).
pub(crate) const ROW_COLUMNS: &str =
    "hash, time_inserted, time_deleted, physical_time_inserted, physical_time_deleted";

/// Full SELECT column list for a collection's history table.
pub(crate) fn select_columns(spec: &CollectionSpec) -> String {
    let declared: Vec<&str> = spec.column_names().collect();
    if declared.is_empty() {
        ROW_COLUMNS.to_string()
    } else {
        format!("{ROW_COLUMNS}, {}", declared.join(", "))
    }
}

pub(crate) fn parse_physical_time(text: &str) -> RetraceResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| to_storage_err(format!("bad physical time {text:?}: {e}")))
}

/// Materialize one history row into a [`TupleRow`].
pub(crate) fn parse_tuple_row(row: &Row<'_>, spec: &CollectionSpec) -> RetraceResult<TupleRow> {
    let hash: i64 = row.get(0).map_err(|e| to_storage_err(e.to_string()))?;
    let time_inserted: i64 = row.get(1).map_err(|e| to_storage_err(e.to_string()))?;
    let time_deleted: Option<i64> = row.get(2).map_err(|e| to_storage_err(e.to_string()))?;
    let pti: String = row.get(3).map_err(|e| to_storage_err(e.to_string()))?;
    let ptd: Option<String> = row.get(4).map_err(|e| to_storage_err(e.to_string()))?;

    let mut values = Vec::with_capacity(spec.columns.len());
    for i in 0..spec.columns.len() {
        let value = match row
            .get_ref(5 + i)
            .map_err(|e| to_storage_err(e.to_string()))?
        {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(v) => Value::Integer(v),
            ValueRef::Real(v) => Value::Real(v),
            ValueRef::Text(v) => Value::Text(
                String::from_utf8(v.to_vec())
                    .map_err(|e| to_storage_err(format!("non-utf8 text column: {e}")))?,
            ),
            ValueRef::Blob(v) => Value::Blob(v.to_vec()),
        };
        values.push(value);
    }

    Ok(TupleRow {
        id: TupleId::new(spec.node.clone(), spec.name.clone(), hash, time_inserted),
        time_deleted,
        physical_time_inserted: parse_physical_time(&pti)?,
        physical_time_deleted: ptd.as_deref().map(parse_physical_time).transpose()?,
        columns: spec.column_names().map(str::to_string).collect(),
        values,
    })
}

/// Enforce exactly-one semantics on a point lookup result.
pub(crate) fn fetch_only(
    mut rows: Vec<TupleRow>,
    what: impl FnOnce() -> String,
) -> RetraceResult<TupleRow> {
    match rows.len() {
        1 => Ok(rows.remove(0)),
        0 => Err(StorageError::NotFound { what: what() }.into()),
        n => Err(StorageError::Ambiguous {
            what: what(),
            count: n,
        }
        .into()),
    }
}
