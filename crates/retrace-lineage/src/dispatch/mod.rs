//! Generic backward lineage: one hop of predecessors for any logged
//! collection, resolved through the collection's configured strategy and
//! materialized back into full rows.

pub mod strategies;

use retrace_core::errors::RetraceResult;
use retrace_core::models::{LineageSpec, TupleRow};
use retrace_core::traits::{ITupleStore, ScanQuery};

use crate::consistency;
use strategies::{
    EdgeTableStrategy, ExtensionRegistry, ExtensionStrategy, LineageStrategy, QueryStrategy,
};

/// A resolved one-hop backward lineage.
#[derive(Debug, Clone)]
pub struct BackwardLineage {
    /// The tuple whose lineage was requested.
    pub target: TupleRow,
    /// Immediate predecessors, materialized. The edge-table strategy
    /// yields newest-first order; query and extension strategies keep
    /// their own.
    pub predecessors: Vec<TupleRow>,
}

/// The dispatcher. Holds the in-process extension bindings; everything
/// else is read from the store passed into each call.
#[derive(Default)]
pub struct LineageResolver {
    extensions: ExtensionRegistry,
}

impl LineageResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extensions(extensions: ExtensionRegistry) -> Self {
        Self { extensions }
    }

    pub fn extensions_mut(&mut self) -> &mut ExtensionRegistry {
        &mut self.extensions
    }

    /// Resolve the direct predecessors of the identity `(hash)` within
    /// `(node, collection)` as of `as_of_time`.
    ///
    /// The target is the identity's insertion at exactly `as_of_time` if
    /// one exists, otherwise its most recent live insertion at or before
    /// it. A missing target is the typed not-found outcome; an ambiguous
    /// one is fatal.
    pub fn resolve(
        &self,
        store: &dyn ITupleStore,
        node: &str,
        collection: &str,
        hash: i64,
        as_of_time: i64,
    ) -> RetraceResult<BackwardLineage> {
        let spec = store.collection(node, collection)?;
        let target = self.resolve_target(store, node, collection, hash, as_of_time)?;

        let predecessor_ids = match &spec.lineage {
            LineageSpec::Regular => EdgeTableStrategy.predecessors(store, &target)?,
            LineageSpec::Query { .. } => QueryStrategy.predecessors(store, &target)?,
            LineageSpec::Extension { name } => ExtensionStrategy {
                name,
                registry: &self.extensions,
            }
            .predecessors(store, &target)?,
        };
        tracing::debug!(
            target = %target.id,
            predecessors = predecessor_ids.len(),
            "backward lineage resolved"
        );

        // Materialize every predecessor. The strategy asserted these
        // identities exist; absence or duplication here breaks the log's
        // own invariants.
        let mut predecessors = Vec::with_capacity(predecessor_ids.len());
        for id in predecessor_ids {
            let row = store
                .tuple_at(&id.node, &id.collection, id.hash, id.time_inserted)
                .map_err(|e| {
                    if e.is_not_found() || e.is_consistency_violation() {
                        consistency(format!("lineage names {id}, which failed to materialize"))
                    } else {
                        e
                    }
                })?;
            predecessors.push(row);
        }

        Ok(BackwardLineage {
            target,
            predecessors,
        })
    }

    fn resolve_target(
        &self,
        store: &dyn ITupleStore,
        node: &str,
        collection: &str,
        hash: i64,
        as_of_time: i64,
    ) -> RetraceResult<TupleRow> {
        match store.tuple_at(node, collection, hash, as_of_time) {
            Ok(row) => Ok(row),
            Err(e) if e.is_not_found() => {
                // Fall back to the most recent live insertion at or before
                // the requested time.
                let query = ScanQuery::new()
                    .hash(hash)
                    .at_or_before(as_of_time)
                    .live_at(as_of_time)
                    .limit(2);
                let rows = store.scan(node, collection, &query)?;
                if rows.len() == 2 && rows[0].id.time_inserted == rows[1].id.time_inserted {
                    return Err(consistency(format!(
                        "multiple live insertions of {node}/{collection}#{hash} at {}",
                        rows[0].id.time_inserted,
                    )));
                }
                rows.into_iter().next().ok_or(e)
            }
            Err(e) => Err(e),
        }
    }
}
