//! Backward lineage through a named, dynamically bound function.
//!
//! The escape hatch for lineage logic not expressible declaratively.
//! Extensions are plain functions bound in-process by name — a capability
//! interface, not loaded code.

use std::collections::HashMap;

use retrace_core::errors::RetraceResult;
use retrace_core::models::{TupleId, TupleRow};
use retrace_core::traits::ITupleStore;

use crate::consistency;

use super::{target_id, LineageStrategy};

/// Signature of a bound extension: `(store, id)` to an ordered sequence of
/// predecessor identities.
pub type ExtensionFn = dyn Fn(&dyn ITupleStore, i64) -> RetraceResult<Vec<TupleId>> + Send + Sync;

/// Named extension functions available to extension-backed collections.
#[derive(Default)]
pub struct ExtensionRegistry {
    by_name: HashMap<String, Box<ExtensionFn>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&dyn ITupleStore, i64) -> RetraceResult<Vec<TupleId>> + Send + Sync + 'static,
    {
        self.by_name.insert(name.into(), Box::new(f));
    }

    pub fn get(&self, name: &str) -> Option<&ExtensionFn> {
        self.by_name.get(name).map(Box::as_ref)
    }
}

pub struct ExtensionStrategy<'a> {
    pub name: &'a str,
    pub registry: &'a ExtensionRegistry,
}

impl LineageStrategy for ExtensionStrategy<'_> {
    fn predecessors(
        &self,
        store: &dyn ITupleStore,
        target: &TupleRow,
    ) -> RetraceResult<Vec<TupleId>> {
        let f = self.registry.get(self.name).ok_or_else(|| {
            consistency(format!(
                "collection {}/{} names unbound extension {:?}",
                target.id.node, target.id.collection, self.name,
            ))
        })?;
        f(store, target_id(target)?)
    }
}
