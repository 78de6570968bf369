use crate::errors::RetraceResult;
use crate::models::{CollectionSpec, LineageEdge, TupleId, TupleRow, Value};

/// Upper bound on `time_inserted` for a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBound {
    Before(i64),
    AtOrBefore(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// A time-bounded, filtered scan over one logged collection.
#[derive(Debug, Clone, Default)]
pub struct ScanQuery {
    pub bound: Option<TimeBound>,
    /// Restrict to tuples whose validity window covers this time.
    pub live_at: Option<i64>,
    /// Restrict to tuples with this content hash.
    pub hash: Option<i64>,
    /// Equality filters on declared columns.
    pub filters: Vec<(String, Value)>,
    pub order: ScanOrder,
    pub limit: Option<usize>,
}

impl ScanQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before(mut self, t: i64) -> Self {
        self.bound = Some(TimeBound::Before(t));
        self
    }

    pub fn at_or_before(mut self, t: i64) -> Self {
        self.bound = Some(TimeBound::AtOrBefore(t));
        self
    }

    pub fn live_at(mut self, t: i64) -> Self {
        self.live_at = Some(t);
        self
    }

    pub fn hash(mut self, hash: i64) -> Self {
        self.hash = Some(hash);
        self
    }

    pub fn filter(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn oldest_first(mut self) -> Self {
        self.order = ScanOrder::OldestFirst;
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }
}

/// Read-only access to the bitemporal log, per (node, collection).
///
/// This is the collaborator contract the resolvers are written against.
/// Implementations must be safe to share across independent, read-only
/// resolutions; the handle is passed explicitly into every resolver call.
pub trait ITupleStore: Send + Sync {
    /// Catalog lookup for one collection.
    fn collection(&self, node: &str, collection: &str) -> RetraceResult<CollectionSpec>;

    /// All collections registered for a node.
    fn collections(&self, node: &str) -> RetraceResult<Vec<CollectionSpec>>;

    /// Point lookup by content hash and insertion time. Exactly one row, or
    /// a typed not-found/ambiguous outcome.
    fn tuple_at(
        &self,
        node: &str,
        collection: &str,
        hash: i64,
        time_inserted: i64,
    ) -> RetraceResult<TupleRow>;

    /// Point lookup by column equality. Exactly one row, or a typed
    /// not-found/ambiguous outcome.
    fn tuple_where(
        &self,
        node: &str,
        collection: &str,
        filters: &[(String, Value)],
    ) -> RetraceResult<TupleRow>;

    /// Time-bounded, filtered, ordered scan.
    fn scan(&self, node: &str, collection: &str, query: &ScanQuery)
        -> RetraceResult<Vec<TupleRow>>;

    /// Explicit lineage edges whose dependent is (collection, hash, time)
    /// within the node.
    fn edges_for(
        &self,
        node: &str,
        collection: &str,
        hash: i64,
        time: i64,
    ) -> RetraceResult<Vec<LineageEdge>>;

    /// Run the registered declarative lineage lookup for a collection,
    /// keyed by the dependent tuple's id. Rows are predecessor identities.
    fn run_lineage_query(
        &self,
        node: &str,
        collection: &str,
        id: i64,
    ) -> RetraceResult<Vec<TupleId>>;
}
