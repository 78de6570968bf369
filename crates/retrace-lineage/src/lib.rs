//! # retrace-lineage
//!
//! The resolution core: interval algebra over byte ranges, byte-range read
//! lineage, object copy-chain lineage, and the generic backward-lineage
//! dispatcher. Everything here is read-only against an already-durable
//! log; a store handle is threaded explicitly through every call.

pub mod dispatch;
pub mod file;
pub mod object;
pub mod ranges;

pub use dispatch::{BackwardLineage, LineageResolver};
pub use file::{read_lineage, window_lineage, FileLineage, FileServerLog};
pub use object::{file_lineage, ObjectStoreLog};
pub use ranges::{ByteRange, DisjointRanges};

use retrace_core::errors::{LineageError, RetraceError};

/// A broken store invariant, fatal for the current resolution only.
pub(crate) fn consistency(details: String) -> RetraceError {
    LineageError::ConsistencyViolation { details }.into()
}
