//! The strategy seam: how one hop of backward lineage is computed.
//!
//! Three concrete strategies, selected per collection from its catalog
//! configuration. Each returns predecessor identities only; the
//! dispatcher materializes them.

mod edge_table;
mod extension;
mod query;

pub use edge_table::EdgeTableStrategy;
pub use extension::{ExtensionFn, ExtensionRegistry, ExtensionStrategy};
pub use query::QueryStrategy;

use retrace_core::errors::RetraceResult;
use retrace_core::models::{TupleId, TupleRow};
use retrace_core::traits::ITupleStore;

/// Computes the predecessor identities for one resolved tuple.
pub trait LineageStrategy {
    fn predecessors(
        &self,
        store: &dyn ITupleStore,
        target: &TupleRow,
    ) -> RetraceResult<Vec<TupleId>>;
}

/// The id column linking black-box requests and responses. Strategies
/// keyed by id require it to be declared on the collection.
pub(crate) fn target_id(target: &TupleRow) -> RetraceResult<i64> {
    target.integer(retrace_core::constants::ID_COLUMN)
}
