use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One explicit lineage edge: a derived tuple's reference to a
/// contributing source.
///
/// Edges recorded across the network carry the dependency's insertion time
/// (`dep_time`); locally derived edges record none, and the dependency's
/// time is recovered later against its own history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineageEdge {
    pub dep_node: String,
    pub dep_collection: String,
    pub dep_hash: i64,
    pub dep_time: Option<i64>,
    /// Rule that derived the dependent tuple, when locally derived.
    pub rule_number: Option<i64>,
    /// True when the edge explains an insertion, false a retraction.
    pub inserted: bool,
    pub physical_time: Option<DateTime<Utc>>,
    /// Dependent tuple, within the owning node.
    pub collection: String,
    pub hash: i64,
    pub time: i64,
}
