//! # retrace-storage
//!
//! SQLite-backed access to the durable bitemporal log: connection pool,
//! schema bootstrap, the recorder (append surface), and the snapshot
//! queries the resolvers read through.

pub mod pool;
pub mod queries;
pub mod recorder;
pub mod schema;
pub mod store;

pub use pool::ConnectionPool;
pub use recorder::Recorder;
pub use store::LogStore;

use retrace_core::errors::{RetraceError, StorageError};

/// Convert a stringly SQLite failure into the typed storage error.
pub fn to_storage_err(message: String) -> RetraceError {
    StorageError::Sqlite { message }.into()
}

/// Identifiers spliced into SQL (node, collection, column names) must be
/// plain lowercase identifiers; everything else is bound as a parameter.
pub fn check_identifier(name: &str) -> Result<(), RetraceError> {
    let mut chars = name.chars();
    let ok_head = chars
        .next()
        .map_or(false, |c| c.is_ascii_lowercase() || c == '_');
    let ok_tail = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if name.is_empty() || !ok_head || !ok_tail {
        return Err(StorageError::InvalidIdentifier {
            name: name.to_string(),
            reason: "expected [a-z_][a-z0-9_]*",
        }
        .into());
    }
    Ok(())
}
