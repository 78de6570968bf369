//! Catalog reads and writes: nodes, collection specs, registered queries.

use rusqlite::{params, Connection, OptionalExtension};

use retrace_core::errors::{RetraceResult, StorageError};
use retrace_core::models::{CollectionKind, CollectionSpec, ColumnSpec, LineageSpec, SqlType};

use crate::to_storage_err;

pub fn insert_node(conn: &Connection, name: &str, address: &str) -> RetraceResult<()> {
    conn.execute(
        "INSERT INTO nodes (name, address) VALUES (?1, ?2)",
        params![name, address],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn insert_collection(conn: &Connection, spec: &CollectionSpec) -> RetraceResult<()> {
    let names: Vec<&str> = spec.column_names().collect();
    let types: Vec<&str> = spec
        .columns
        .iter()
        .map(|c| match c.ty {
            SqlType::Integer => "integer",
            SqlType::Real => "real",
            SqlType::Text => "text",
            SqlType::Blob => "blob",
        })
        .collect();
    let (lineage_type, lineage_target) = spec.lineage.encode();
    conn.execute(
        "INSERT INTO collections
             (node, collection, kind, column_names, column_types, lineage_type, lineage_target)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            spec.node,
            spec.name,
            spec.kind.as_str(),
            serde_json::to_string(&names).map_err(|e| to_storage_err(e.to_string()))?,
            serde_json::to_string(&types).map_err(|e| to_storage_err(e.to_string()))?,
            lineage_type,
            lineage_target,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Switch a collection's backward-lineage strategy.
pub fn update_lineage_spec(
    conn: &Connection,
    node: &str,
    collection: &str,
    lineage: &LineageSpec,
) -> RetraceResult<()> {
    let (lineage_type, lineage_target) = lineage.encode();
    let changed = conn
        .execute(
            "UPDATE collections SET lineage_type = ?1, lineage_target = ?2
             WHERE node = ?3 AND collection = ?4",
            params![lineage_type, lineage_target, node, collection],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if changed == 0 {
        return Err(StorageError::UnknownCollection {
            node: node.to_string(),
            collection: collection.to_string(),
        }
        .into());
    }
    Ok(())
}

pub fn get_collection(
    conn: &Connection,
    node: &str,
    collection: &str,
) -> RetraceResult<CollectionSpec> {
    let row = conn
        .query_row(
            "SELECT kind, column_names, column_types, lineage_type, lineage_target
             FROM collections WHERE node = ?1 AND collection = ?2",
            params![node, collection],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            },
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    let (kind, names, types, lineage_type, lineage_target) =
        row.ok_or_else(|| StorageError::UnknownCollection {
            node: node.to_string(),
            collection: collection.to_string(),
        })?;
    parse_spec(
        node,
        collection,
        &kind,
        &names,
        &types,
        &lineage_type,
        lineage_target.as_deref(),
    )
}

pub fn list_collections(conn: &Connection, node: &str) -> RetraceResult<Vec<CollectionSpec>> {
    let mut stmt = conn
        .prepare(
            "SELECT collection, kind, column_names, column_types, lineage_type, lineage_target
             FROM collections WHERE node = ?1 ORDER BY collection",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![node], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut specs = Vec::new();
    for row in rows {
        let (collection, kind, names, types, lineage_type, lineage_target) =
            row.map_err(|e| to_storage_err(e.to_string()))?;
        specs.push(parse_spec(
            node,
            &collection,
            &kind,
            &names,
            &types,
            &lineage_type,
            lineage_target.as_deref(),
        )?);
    }
    Ok(specs)
}

fn parse_spec(
    node: &str,
    collection: &str,
    kind: &str,
    names: &str,
    types: &str,
    lineage_type: &str,
    lineage_target: Option<&str>,
) -> RetraceResult<CollectionSpec> {
    let kind = CollectionKind::parse(kind)
        .ok_or_else(|| to_storage_err(format!("bad collection kind {kind:?}")))?;
    let names: Vec<String> =
        serde_json::from_str(names).map_err(|e| to_storage_err(e.to_string()))?;
    let types: Vec<String> =
        serde_json::from_str(types).map_err(|e| to_storage_err(e.to_string()))?;
    if names.len() != types.len() {
        return Err(to_storage_err(format!(
            "catalog column arrays disagree for {node}/{collection}"
        )));
    }
    let mut columns = Vec::with_capacity(names.len());
    for (name, ty) in names.into_iter().zip(types) {
        let ty = SqlType::parse(&ty)
            .ok_or_else(|| to_storage_err(format!("bad column type {ty:?}")))?;
        columns.push(ColumnSpec { name, ty });
    }
    let lineage = LineageSpec::decode(lineage_type, lineage_target)
        .ok_or_else(|| to_storage_err(format!("bad lineage type {lineage_type:?}")))?;
    Ok(CollectionSpec {
        node: node.to_string(),
        name: collection.to_string(),
        kind,
        columns,
        lineage,
    })
}

pub fn insert_lineage_query(
    conn: &Connection,
    node: &str,
    collection: &str,
    sql: &str,
) -> RetraceResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO lineage_queries (node, collection, sql) VALUES (?1, ?2, ?3)",
        params![node, collection, sql],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn get_lineage_query(
    conn: &Connection,
    node: &str,
    collection: &str,
) -> RetraceResult<Option<String>> {
    conn.query_row(
        "SELECT sql FROM lineage_queries WHERE node = ?1 AND collection = ?2",
        params![node, collection],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}
