//! Schema bootstrap: the catalog tables, per-collection history tables,
//! and per-node lineage edge tables.
//!
//! History tables follow the bitemporal shape: every row carries a content
//! hash, a logical validity window, and the physical wall-clock times the
//! window transitions were recorded at.

use rusqlite::Connection;

use retrace_core::errors::RetraceResult;
use retrace_core::models::CollectionSpec;

use crate::{check_identifier, to_storage_err};

/// Create the catalog tables if they do not exist yet.
pub fn bootstrap(conn: &Connection) -> RetraceResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS nodes (
            name    TEXT PRIMARY KEY,
            address TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS collections (
            node           TEXT NOT NULL,
            collection     TEXT NOT NULL,
            kind           TEXT NOT NULL,
            column_names   TEXT NOT NULL,
            column_types   TEXT NOT NULL,
            lineage_type   TEXT NOT NULL DEFAULT 'regular',
            lineage_target TEXT,
            PRIMARY KEY (node, collection)
        );

        CREATE TABLE IF NOT EXISTS lineage_queries (
            node       TEXT NOT NULL,
            collection TEXT NOT NULL,
            sql        TEXT NOT NULL,
            PRIMARY KEY (node, collection)
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Create the history table backing one collection.
pub fn create_collection_table(conn: &Connection, spec: &CollectionSpec) -> RetraceResult<()> {
    check_identifier(&spec.node)?;
    check_identifier(&spec.name)?;
    let mut columns = Vec::with_capacity(spec.columns.len());
    for col in &spec.columns {
        check_identifier(&col.name)?;
        columns.push(format!("{} {} NOT NULL", col.name, col.ty.sql()));
    }
    let sql = format!(
        "CREATE TABLE {} (
            hash                   INTEGER NOT NULL,
            time_inserted          INTEGER NOT NULL,
            time_deleted           INTEGER,
            physical_time_inserted TEXT NOT NULL,
            physical_time_deleted  TEXT,
            {},
            PRIMARY KEY (hash, time_inserted)
        )",
        spec.table_name(),
        columns.join(",\n            "),
    );
    conn.execute(&sql, [])
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Create the lineage edge table for one node.
pub fn create_lineage_table(conn: &Connection, node: &str) -> RetraceResult<()> {
    check_identifier(node)?;
    let sql = format!(
        "CREATE TABLE {node}_lineage (
            dep_node       TEXT NOT NULL,
            dep_collection TEXT NOT NULL,
            dep_hash       INTEGER NOT NULL,
            dep_time       INTEGER,
            rule_number    INTEGER,
            inserted       INTEGER NOT NULL,
            physical_time  TEXT,
            collection     TEXT NOT NULL,
            hash           INTEGER NOT NULL,
            time           INTEGER NOT NULL
        )"
    );
    conn.execute(&sql, [])
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
