//! Backward lineage through the node's explicit edge table.

use retrace_core::errors::RetraceResult;
use retrace_core::models::{TupleId, TupleRow};
use retrace_core::traits::{ITupleStore, ScanQuery};

use crate::consistency;

use super::LineageStrategy;

pub struct EdgeTableStrategy;

impl LineageStrategy for EdgeTableStrategy {
    fn predecessors(
        &self,
        store: &dyn ITupleStore,
        target: &TupleRow,
    ) -> RetraceResult<Vec<TupleId>> {
        let edges = store.edges_for(
            &target.id.node,
            &target.id.collection,
            target.id.hash,
            target.id.time_inserted,
        )?;

        let mut ids = Vec::new();
        for edge in edges.into_iter().filter(|e| e.inserted) {
            let dep_time = match edge.dep_time {
                Some(t) => t,
                // Locally derived edges carry no dependency time; recover
                // it as the dependency's most recent live insertion at or
                // before the dependent's own time.
                None => {
                    let query = ScanQuery::new()
                        .hash(edge.dep_hash)
                        .at_or_before(target.id.time_inserted)
                        .live_at(target.id.time_inserted)
                        .limit(1);
                    let rows = store.scan(&edge.dep_node, &edge.dep_collection, &query)?;
                    rows.into_iter()
                        .next()
                        .map(|row| row.id.time_inserted)
                        .ok_or_else(|| {
                            consistency(format!(
                                "edge dependency {}/{}#{} has no live insertion at or before {}",
                                edge.dep_node,
                                edge.dep_collection,
                                edge.dep_hash,
                                target.id.time_inserted,
                            ))
                        })?
                }
            };
            ids.push(TupleId::new(
                edge.dep_node,
                edge.dep_collection,
                edge.dep_hash,
                dep_time,
            ));
        }

        // Newest first, so downstream ranks count from the most recent;
        // each source referenced once.
        ids.sort_by(|a, b| {
            b.time_inserted
                .cmp(&a.time_inserted)
                .then_with(|| a.cmp(b))
        });
        ids.dedup();
        Ok(ids)
    }
}
