//! # retrace-core
//!
//! Foundation crate for the Retrace lineage system.
//! Defines all models, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::{EvalConfig, ResolverConfig};
pub use errors::{RetraceError, RetraceResult};
pub use models::{CollectionSpec, LineageSpec, TupleId, TupleRow, ValidityWindow, Value};
pub use traits::{ITupleStore, ScanOrder, ScanQuery, TimeBound};
