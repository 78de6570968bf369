//! The recorder: the thin append surface that writes the log the
//! resolvers later read. Registration creates catalog rows and history
//! tables; appends stamp both logical and physical time.

use chrono::Utc;

use retrace_core::constants::LINEAGE_TABLE_SUFFIX;
use retrace_core::errors::{RetraceResult, StorageError};
use retrace_core::models::{CollectionSpec, LineageEdge, LineageSpec, TupleId, Value};

use crate::pool::ConnectionPool;
use crate::queries::{catalog, edges, sql_param};
use crate::{schema, to_storage_err};

/// Content hash of a tuple: the first eight little-endian bytes of the
/// blake3 digest of the canonical JSON encoding of its values.
pub fn content_hash(values: &[Value]) -> RetraceResult<i64> {
    let encoded = serde_json::to_vec(values).map_err(|e| to_storage_err(e.to_string()))?;
    let digest = blake3::hash(&encoded);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest.as_bytes()[..8]);
    Ok(i64::from_le_bytes(bytes))
}

/// Write surface over the log. Borrowed from a [`crate::LogStore`]; all
/// writes go through the single write connection.
pub struct Recorder<'a> {
    pool: &'a ConnectionPool,
}

impl<'a> Recorder<'a> {
    pub(crate) fn new(pool: &'a ConnectionPool) -> Self {
        Self { pool }
    }

    /// Register a node and create its lineage edge table.
    pub fn register_node(&self, name: &str, address: &str) -> RetraceResult<()> {
        self.pool.writer.with_conn(|conn| {
            catalog::insert_node(conn, name, address)?;
            schema::create_lineage_table(conn, name)
        })?;
        tracing::debug!(node = name, address, "registered node");
        Ok(())
    }

    /// Register a collection and create its history table.
    pub fn register_collection(&self, spec: &CollectionSpec) -> RetraceResult<()> {
        if spec.name == LINEAGE_TABLE_SUFFIX {
            return Err(StorageError::InvalidIdentifier {
                name: spec.name.clone(),
                reason: "reserved collection name",
            }
            .into());
        }
        if spec.columns.is_empty() {
            return Err(StorageError::InvalidSpec {
                collection: spec.name.clone(),
                reason: "collections declare at least one column",
            }
            .into());
        }
        self.pool.writer.with_conn(|conn| {
            catalog::insert_collection(conn, spec)?;
            schema::create_collection_table(conn, spec)
        })
    }

    /// Append one tuple with an open validity window.
    pub fn append(
        &self,
        node: &str,
        collection: &str,
        time_inserted: i64,
        values: &[Value],
    ) -> RetraceResult<TupleId> {
        self.insert(node, collection, time_inserted, None, values)
    }

    /// Append one instantaneous event: inserted and deleted on the same
    /// tick, visible exactly there.
    pub fn append_event(
        &self,
        node: &str,
        collection: &str,
        time: i64,
        values: &[Value],
    ) -> RetraceResult<TupleId> {
        self.insert(node, collection, time, Some(time), values)
    }

    fn insert(
        &self,
        node: &str,
        collection: &str,
        time_inserted: i64,
        time_deleted: Option<i64>,
        values: &[Value],
    ) -> RetraceResult<TupleId> {
        self.pool.writer.with_conn(|conn| {
            let spec = catalog::get_collection(conn, node, collection)?;
            if values.len() != spec.columns.len() {
                return Err(StorageError::InvalidSpec {
                    collection: spec.name.clone(),
                    reason: "row arity does not match declared columns",
                }
                .into());
            }
            let hash = content_hash(values)?;
            let now = Utc::now().to_rfc3339();

            let placeholders: Vec<String> =
                (1..=5 + values.len()).map(|i| format!("?{i}")).collect();
            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({})",
                spec.table_name(),
                crate::queries::select_columns(&spec),
                placeholders.join(", "),
            );

            let mut params: Vec<rusqlite::types::Value> = Vec::with_capacity(5 + values.len());
            params.push(hash.into());
            params.push(time_inserted.into());
            params.push(match time_deleted {
                Some(t) => t.into(),
                None => rusqlite::types::Value::Null,
            });
            params.push(now.clone().into());
            params.push(match time_deleted {
                Some(_) => now.into(),
                None => rusqlite::types::Value::Null,
            });
            params.extend(values.iter().map(sql_param));

            conn.execute(&sql, rusqlite::params_from_iter(params))
                .map_err(|e| to_storage_err(e.to_string()))?;
            Ok(TupleId::new(node, collection, hash, time_inserted))
        })
    }

    /// Tombstone the open window of the tuple with this hash. The only
    /// window transition there is: none -> deleted, never reversed.
    pub fn retract(
        &self,
        node: &str,
        collection: &str,
        hash: i64,
        time_deleted: i64,
    ) -> RetraceResult<()> {
        self.pool.writer.with_conn(|conn| {
            let spec = catalog::get_collection(conn, node, collection)?;
            conn.execute(
                &format!(
                    "UPDATE {} SET time_deleted = ?1, physical_time_deleted = ?2
                     WHERE hash = ?3 AND time_deleted IS NULL",
                    spec.table_name(),
                ),
                rusqlite::params![time_deleted, Utc::now().to_rfc3339(), hash],
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
            Ok(())
        })
    }

    /// Record an edge whose dependency arrived over the network and
    /// therefore carries its own insertion time.
    pub fn add_networked_edge(
        &self,
        node: &str,
        dep: &TupleId,
        collection: &str,
        hash: i64,
        time: i64,
    ) -> RetraceResult<()> {
        let edge = LineageEdge {
            dep_node: dep.node.clone(),
            dep_collection: dep.collection.clone(),
            dep_hash: dep.hash,
            dep_time: Some(dep.time_inserted),
            rule_number: None,
            inserted: true,
            physical_time: Some(Utc::now()),
            collection: collection.to_string(),
            hash,
            time,
        };
        self.pool
            .writer
            .with_conn(|conn| edges::insert_edge(conn, node, &edge))
    }

    /// Record a locally derived edge. No explicit dependency time; readers
    /// recover it against the dependency's own history.
    #[allow(clippy::too_many_arguments)]
    pub fn add_derived_edge(
        &self,
        node: &str,
        dep_collection: &str,
        dep_hash: i64,
        rule_number: i64,
        inserted: bool,
        collection: &str,
        hash: i64,
        time: i64,
    ) -> RetraceResult<()> {
        let edge = LineageEdge {
            dep_node: node.to_string(),
            dep_collection: dep_collection.to_string(),
            dep_hash,
            dep_time: None,
            rule_number: Some(rule_number),
            inserted,
            physical_time: Some(Utc::now()),
            collection: collection.to_string(),
            hash,
            time,
        };
        self.pool
            .writer
            .with_conn(|conn| edges::insert_edge(conn, node, &edge))
    }

    /// Register a declarative lineage lookup and switch the collection to
    /// resolve through it.
    pub fn register_lineage_query(
        &self,
        node: &str,
        collection: &str,
        name: &str,
        sql: &str,
    ) -> RetraceResult<()> {
        self.pool.writer.with_conn(|conn| {
            catalog::update_lineage_spec(
                conn,
                node,
                collection,
                &LineageSpec::Query {
                    name: name.to_string(),
                },
            )?;
            catalog::insert_lineage_query(conn, node, collection, sql)
        })
    }

    /// Switch a collection to resolve through a named extension function.
    /// The function itself is bound in-process at the resolver.
    pub fn register_extension(
        &self,
        node: &str,
        collection: &str,
        name: &str,
    ) -> RetraceResult<()> {
        self.pool.writer.with_conn(|conn| {
            catalog::update_lineage_spec(
                conn,
                node,
                collection,
                &LineageSpec::Extension {
                    name: name.to_string(),
                },
            )
        })
    }
}
