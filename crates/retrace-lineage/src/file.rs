//! Byte-range read lineage: explain a file read as the minimal set of
//! writes that produced the bytes it returned.

use retrace_core::errors::RetraceResult;
use retrace_core::models::{TupleId, TupleRow, Value};
use retrace_core::traits::{ITupleStore, ScanQuery};

use crate::ranges::{ByteRange, DisjointRanges};

/// Where one file server logs its traffic.
#[derive(Debug, Clone)]
pub struct FileServerLog {
    pub node: String,
    /// Read requests: id, start, stop (half-open).
    pub reads: String,
    /// Write requests: id, start, data.
    pub writes: String,
}

impl FileServerLog {
    pub fn new(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            reads: "read_request".to_string(),
            writes: "write_request".to_string(),
        }
    }

    pub fn with_collections(
        mut self,
        reads: impl Into<String>,
        writes: impl Into<String>,
    ) -> Self {
        self.reads = reads.into();
        self.writes = writes.into();
        self
    }
}

/// Lineage of one byte-range read.
#[derive(Debug, Clone, PartialEq)]
pub struct FileLineage {
    /// Contributing writes, newest first. Minimal: no write shadowed by
    /// more recent coverage appears, and no write appears twice.
    pub sources: Vec<TupleId>,
    /// The read window being explained, as a closed range. `None` for a
    /// zero-length read, which has nothing to explain.
    pub window: Option<ByteRange>,
    /// False when the scan exhausted history without covering the whole
    /// window — a legitimate read of never-written regions, not an error.
    pub complete: bool,
}

/// Resolve the lineage of a logged read request by its id.
pub fn read_lineage(
    store: &dyn ITupleStore,
    log: &FileServerLog,
    request_id: i64,
) -> RetraceResult<FileLineage> {
    let read = store.tuple_where(
        &log.node,
        &log.reads,
        &[("id".to_string(), Value::Integer(request_id))],
    )?;
    let start = read.integer("start")?;
    let stop = read.integer("stop")?;
    if stop <= start {
        return Ok(FileLineage {
            sources: Vec::new(),
            window: None,
            complete: true,
        });
    }
    let window = ByteRange::new(start, stop - 1);
    window_lineage(store, log, window, read.id.time_inserted)
}

/// Resolve which writes explain the bytes of `window` as observed at
/// `t_read`.
///
/// Scans writes older than the read, newest first (last writer wins).
/// Every overlapping write is clipped to the window and folded into the
/// coverage accumulator; writes whose clipped range is already covered are
/// shadowed and excluded. Stops as soon as the window is fully explained.
pub fn window_lineage(
    store: &dyn ITupleStore,
    log: &FileServerLog,
    window: ByteRange,
    t_read: i64,
) -> RetraceResult<FileLineage> {
    let query = ScanQuery::new().before(t_read);
    let writes = store.scan(&log.node, &log.writes, &query)?;

    let mut sources: Vec<TupleId> = Vec::new();
    let mut covered = DisjointRanges::new();
    for write in &writes {
        let Some(range) = write_range(write)? else {
            continue; // zero-length write covers nothing
        };
        if !range.overlaps(&window) {
            continue;
        }
        let clipped = range.intersect(&window)?;
        let shadowed = covered.union(clipped)?;
        if !shadowed {
            sources.push(write.id.clone());
        }
        if covered.covers_exactly(&window) {
            tracing::debug!(
                node = %log.node,
                sources = sources.len(),
                "read fully explained"
            );
            return Ok(FileLineage {
                sources,
                window: Some(window),
                complete: true,
            });
        }
    }

    tracing::debug!(
        node = %log.node,
        sources = sources.len(),
        covered = covered.covered_len(),
        expected = window.len(),
        "read partially explained"
    );
    Ok(FileLineage {
        sources,
        window: Some(window),
        complete: false,
    })
}

/// The closed range a write touched: `[start, start + len(data) - 1]`.
fn write_range(write: &TupleRow) -> RetraceResult<Option<ByteRange>> {
    let start = write.integer("start")?;
    let len = write.require("data")?.byte_len().unwrap_or(0) as i64;
    if len == 0 {
        return Ok(None);
    }
    Ok(Some(ByteRange::new(start, start + len - 1)))
}
