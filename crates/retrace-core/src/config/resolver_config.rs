use serde::{Deserialize, Serialize};

use crate::constants;

/// Resolution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Cap on copy-chain worklist depth before the log is declared broken.
    pub max_chain_depth: usize,
    /// Resolve listing sub-lineages on the rayon pool. Independent per-key
    /// resolutions share no mutable state, so this is always safe.
    pub parallel_listing: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_chain_depth: constants::MAX_COPY_CHAIN_DEPTH,
            parallel_listing: true,
        }
    }
}
