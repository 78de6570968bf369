//! Point lookups with exactly-one semantics.

use rusqlite::{params, Connection};

use retrace_core::errors::RetraceResult;
use retrace_core::models::{CollectionSpec, TupleRow, Value};
use retrace_core::traits::ScanQuery;

use super::{fetch_only, parse_tuple_row, scan::scan, select_columns};
use crate::to_storage_err;

/// Lookup by content hash and insertion time. Exactly one row, or a typed
/// not-found/ambiguous outcome. The (hash, time_inserted) pair is the
/// history table's primary key, so ambiguity here means the log broke.
pub fn tuple_at(
    conn: &Connection,
    spec: &CollectionSpec,
    hash: i64,
    time_inserted: i64,
) -> RetraceResult<TupleRow> {
    let sql = format!(
        "SELECT {} FROM {} WHERE hash = ?1 AND time_inserted = ?2",
        select_columns(spec),
        spec.table_name(),
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![hash, time_inserted], |row| {
            Ok(parse_tuple_row(row, spec))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row.map_err(|e| to_storage_err(e.to_string()))??);
    }
    fetch_only(results, || {
        format!(
            "{}/{} hash {} at {}",
            spec.node, spec.name, hash, time_inserted
        )
    })
}

/// Lookup by column equality. Exactly one row expected.
pub fn tuple_where(
    conn: &Connection,
    spec: &CollectionSpec,
    filters: &[(String, Value)],
) -> RetraceResult<TupleRow> {
    let mut query = ScanQuery::new();
    for (column, value) in filters {
        query = query.filter(column.clone(), value.clone());
    }
    let rows = scan(conn, spec, &query)?;
    fetch_only(rows, || {
        let described: Vec<String> = filters.iter().map(|(c, v)| format!("{c}={v}")).collect();
        format!("{}/{} where {}", spec.node, spec.name, described.join(", "))
    })
}
