//! Backward lineage through a registered declarative lookup.

use retrace_core::errors::RetraceResult;
use retrace_core::models::{TupleId, TupleRow};
use retrace_core::traits::ITupleStore;

use super::{target_id, LineageStrategy};

/// Runs the lookup registered for the target's collection, keyed by the
/// target's id. The lookup returns predecessor identities directly.
pub struct QueryStrategy;

impl LineageStrategy for QueryStrategy {
    fn predecessors(
        &self,
        store: &dyn ITupleStore,
        target: &TupleRow,
    ) -> RetraceResult<Vec<TupleId>> {
        let id = target_id(target)?;
        store.run_lineage_query(&target.id.node, &target.id.collection, id)
    }
}
