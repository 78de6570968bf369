//! The single write connection used by the recorder and schema bootstrap.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use retrace_core::errors::RetraceResult;

use super::pragmas::apply_write_pragmas;
use crate::to_storage_err;

/// Mutex-guarded writer. The log is append-only and writes are rare
/// relative to resolution reads, so one serialized writer is enough.
pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    pub fn open(path: &Path) -> RetraceResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_write_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> RetraceResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_write_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Execute a closure with the write connection.
    pub fn with_conn<F, T>(&self, f: F) -> RetraceResult<T>
    where
        F: FnOnce(&Connection) -> RetraceResult<T>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|e| to_storage_err(format!("write connection lock poisoned: {e}")))?;
        f(&guard)
    }
}
