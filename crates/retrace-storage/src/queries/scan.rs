//! Time-bounded, filtered, ordered scans over a collection's history.

use rusqlite::Connection;

use retrace_core::errors::{RetraceResult, StorageError};
use retrace_core::models::{CollectionSpec, TupleRow};
use retrace_core::traits::{ScanOrder, ScanQuery, TimeBound};

use super::{parse_tuple_row, select_columns, sql_param};
use crate::{check_identifier, to_storage_err};

/// Run one scan. Identifiers are validated before splicing; every value is
/// bound as a parameter.
pub fn scan(
    conn: &Connection,
    spec: &CollectionSpec,
    query: &ScanQuery,
) -> RetraceResult<Vec<TupleRow>> {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<rusqlite::types::Value> = Vec::new();

    if let Some(bound) = query.bound {
        let (op, t) = match bound {
            TimeBound::Before(t) => ("<", t),
            TimeBound::AtOrBefore(t) => ("<=", t),
        };
        params.push(rusqlite::types::Value::Integer(t));
        clauses.push(format!("time_inserted {op} ?{}", params.len()));
    }

    if let Some(t) = query.live_at {
        params.push(rusqlite::types::Value::Integer(t));
        let n = params.len();
        // Validity window: inserted at or before t and not yet deleted at
        // t, or an instantaneous event at exactly t.
        clauses.push(format!(
            "((time_inserted <= ?{n} AND (time_deleted IS NULL OR time_deleted > ?{n})) \
             OR (time_inserted = ?{n} AND time_deleted = ?{n}))"
        ));
    }

    if let Some(hash) = query.hash {
        params.push(rusqlite::types::Value::Integer(hash));
        clauses.push(format!("hash = ?{}", params.len()));
    }

    for (column, value) in &query.filters {
        if !spec.has_column(column) {
            return Err(StorageError::UnknownColumn {
                column: column.clone(),
                collection: spec.name.clone(),
            }
            .into());
        }
        check_identifier(column)?;
        params.push(sql_param(value));
        clauses.push(format!("{column} = ?{}", params.len()));
    }

    let mut sql = format!("SELECT {} FROM {}", select_columns(spec), spec.table_name());
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(match query.order {
        ScanOrder::NewestFirst => " ORDER BY time_inserted DESC",
        ScanOrder::OldestFirst => " ORDER BY time_inserted ASC",
    });
    if let Some(limit) = query.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(params), |row| {
            Ok(parse_tuple_row(row, spec))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut results = Vec::new();
    for row in rows {
        let tuple = row.map_err(|e| to_storage_err(e.to_string()))??;
        results.push(tuple);
    }
    Ok(results)
}
