//! LogStore — the explicit session handle over the durable log.
//!
//! Owns the connection pool, bootstraps the catalog, and implements the
//! read contract the resolvers are written against. Safe to share across
//! independent, read-only resolutions; callers pass it explicitly into
//! every resolver call rather than holding ambient global state.

use std::path::Path;

use retrace_core::errors::RetraceResult;
use retrace_core::models::{CollectionSpec, LineageEdge, TupleId, TupleRow, Value};
use retrace_core::traits::{ITupleStore, ScanQuery};

use crate::pool::{ConnectionPool, ReadPool};
use crate::queries::{catalog, edges, point, registered, scan};
use crate::recorder::Recorder;
use crate::schema;

pub struct LogStore {
    pool: ConnectionPool,
    /// When true, reads use the read pool (file-backed mode). When false,
    /// reads route through the writer (in-memory mode, where read-pool
    /// connections are isolated databases).
    use_read_pool: bool,
}

impl LogStore {
    /// Open a store backed by a database file.
    pub fn open(path: &Path) -> RetraceResult<Self> {
        let pool = ConnectionPool::open(path, ReadPool::default_size())?;
        let store = Self {
            pool,
            use_read_pool: true,
        };
        store.initialize()?;
        tracing::info!(path = %path.display(), "opened log store");
        Ok(store)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> RetraceResult<Self> {
        let pool = ConnectionPool::open_in_memory(1)?;
        let store = Self {
            pool,
            use_read_pool: false,
        };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> RetraceResult<()> {
        self.pool.writer.with_conn(schema::bootstrap)
    }

    /// The write surface.
    pub fn recorder(&self) -> Recorder<'_> {
        Recorder::new(&self.pool)
    }

    /// The underlying pool (for advanced operations).
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    fn with_reader<F, T>(&self, f: F) -> RetraceResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> RetraceResult<T>,
    {
        if self.use_read_pool {
            self.pool.readers.with_conn(f)
        } else {
            self.pool.writer.with_conn(f)
        }
    }
}

impl ITupleStore for LogStore {
    fn collection(&self, node: &str, collection: &str) -> RetraceResult<CollectionSpec> {
        self.with_reader(|conn| catalog::get_collection(conn, node, collection))
    }

    fn collections(&self, node: &str) -> RetraceResult<Vec<CollectionSpec>> {
        self.with_reader(|conn| catalog::list_collections(conn, node))
    }

    fn tuple_at(
        &self,
        node: &str,
        collection: &str,
        hash: i64,
        time_inserted: i64,
    ) -> RetraceResult<TupleRow> {
        self.with_reader(|conn| {
            let spec = catalog::get_collection(conn, node, collection)?;
            point::tuple_at(conn, &spec, hash, time_inserted)
        })
    }

    fn tuple_where(
        &self,
        node: &str,
        collection: &str,
        filters: &[(String, Value)],
    ) -> RetraceResult<TupleRow> {
        self.with_reader(|conn| {
            let spec = catalog::get_collection(conn, node, collection)?;
            point::tuple_where(conn, &spec, filters)
        })
    }

    fn scan(
        &self,
        node: &str,
        collection: &str,
        query: &ScanQuery,
    ) -> RetraceResult<Vec<TupleRow>> {
        self.with_reader(|conn| {
            let spec = catalog::get_collection(conn, node, collection)?;
            scan::scan(conn, &spec, query)
        })
    }

    fn edges_for(
        &self,
        node: &str,
        collection: &str,
        hash: i64,
        time: i64,
    ) -> RetraceResult<Vec<LineageEdge>> {
        self.with_reader(|conn| edges::edges_for(conn, node, collection, hash, time))
    }

    fn run_lineage_query(
        &self,
        node: &str,
        collection: &str,
        id: i64,
    ) -> RetraceResult<Vec<TupleId>> {
        self.with_reader(|conn| registered::run_lineage_query(conn, node, collection, id))
    }
}
