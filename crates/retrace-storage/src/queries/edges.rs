//! The per-node lineage edge table: recording and reading explicit edges.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use retrace_core::errors::RetraceResult;
use retrace_core::models::LineageEdge;

use crate::{check_identifier, to_storage_err};

pub fn insert_edge(conn: &Connection, node: &str, edge: &LineageEdge) -> RetraceResult<()> {
    check_identifier(node)?;
    conn.execute(
        &format!(
            "INSERT INTO {node}_lineage
                 (dep_node, dep_collection, dep_hash, dep_time, rule_number,
                  inserted, physical_time, collection, hash, time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
        ),
        params![
            edge.dep_node,
            edge.dep_collection,
            edge.dep_hash,
            edge.dep_time,
            edge.rule_number,
            edge.inserted as i64,
            edge.physical_time.map(|t| t.to_rfc3339()),
            edge.collection,
            edge.hash,
            edge.time,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// All edges whose dependent is (collection, hash, time) within the node.
pub fn edges_for(
    conn: &Connection,
    node: &str,
    collection: &str,
    hash: i64,
    time: i64,
) -> RetraceResult<Vec<LineageEdge>> {
    check_identifier(node)?;
    let mut stmt = conn
        .prepare(&format!(
            "SELECT dep_node, dep_collection, dep_hash, dep_time, rule_number,
                    inserted, physical_time, collection, hash, time
             FROM {node}_lineage
             WHERE collection = ?1 AND hash = ?2 AND time = ?3
             ORDER BY rowid"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![collection, hash, time], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, Option<i64>>(3)?,
                row.get::<_, Option<i64>>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, Option<String>>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, i64>(8)?,
                row.get::<_, i64>(9)?,
            ))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut edges = Vec::new();
    for row in rows {
        let (dep_node, dep_collection, dep_hash, dep_time, rule_number, inserted, pt, coll, h, t) =
            row.map_err(|e| to_storage_err(e.to_string()))?;
        let physical_time: Option<DateTime<Utc>> = pt
            .as_deref()
            .map(super::parse_physical_time)
            .transpose()?;
        edges.push(LineageEdge {
            dep_node,
            dep_collection,
            dep_hash,
            dep_time,
            rule_number,
            inserted: inserted != 0,
            physical_time,
            collection: coll,
            hash: h,
            time: t,
        });
    }
    Ok(edges)
}
