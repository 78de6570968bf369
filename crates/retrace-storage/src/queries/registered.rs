//! Execution of registered declarative lineage lookups.
//!
//! A registered query is stored as SQL text parameterized by the dependent
//! tuple's id (`?1`) and returns predecessor identities directly:
//! (node, collection, hash, time_inserted) per row.

use rusqlite::{params, Connection};

use retrace_core::errors::{RetraceResult, StorageError};
use retrace_core::models::TupleId;

use super::catalog::get_lineage_query;
use crate::to_storage_err;

pub fn run_lineage_query(
    conn: &Connection,
    node: &str,
    collection: &str,
    id: i64,
) -> RetraceResult<Vec<TupleId>> {
    let sql = get_lineage_query(conn, node, collection)?.ok_or_else(|| {
        StorageError::NotFound {
            what: format!("registered lineage query for {node}/{collection}"),
        }
    })?;

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![id], |row| {
            Ok(TupleId {
                node: row.get(0)?,
                collection: row.get(1)?,
                hash: row.get(2)?,
                time_inserted: row.get(3)?,
            })
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut ids = Vec::new();
    for row in rows {
        ids.push(row.map_err(|e| to_storage_err(e.to_string()))?);
    }
    Ok(ids)
}
