//! PRAGMA configuration applied to every SQLite connection.
//!
//! WAL mode so readers are never blocked by the recorder, NORMAL sync,
//! 64MB cache, 5s busy_timeout.

use rusqlite::Connection;

use retrace_core::errors::RetraceResult;

use crate::to_storage_err;

/// Apply pragmas to the write connection.
pub fn apply_write_pragmas(conn: &Connection) -> RetraceResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA cache_size = -64000;
        PRAGMA busy_timeout = 5000;
        PRAGMA foreign_keys = ON;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Apply pragmas to a read connection.
pub fn apply_read_pragmas(conn: &Connection) -> RetraceResult<()> {
    conn.execute_batch(
        "
        PRAGMA cache_size = -64000;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
