/// Retrace system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum worklist depth for copy-chain traversal. The temporal model
/// guarantees strictly decreasing bound times, so a chain this long means
/// the log itself is broken.
pub const MAX_COPY_CHAIN_DEPTH: usize = 64;

/// Collection name reserved for each node's lineage edge table.
pub const LINEAGE_TABLE_SUFFIX: &str = "lineage";

/// Reply-id sentinel marking a response with no recorded ground truth.
pub const NO_REPLY_SENTINEL: i64 = -1;

/// Default column holding a black-box tuple's request/response id.
pub const ID_COLUMN: &str = "id";

/// Default column linking a response to the write that caused its value.
pub const REPLY_ID_COLUMN: &str = "reply_id";
