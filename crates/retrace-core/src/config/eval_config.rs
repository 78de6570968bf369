use serde::{Deserialize, Serialize};

use crate::constants;

/// Accuracy-evaluation configuration: where requests, responses, and the
/// ground-truth writes live, and how they are linked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub request_collection: String,
    pub response_collection: String,
    /// Collection holding the writes responses are caused by.
    pub truth_collection: String,
    /// Column carrying a tuple's request/response id.
    pub id_column: String,
    /// Response column carrying the value served.
    pub value_column: String,
    /// Response column naming the id of the causing write.
    pub reply_id_column: String,
    /// Sentinel marking a response with no recorded ground truth.
    pub missing_reply_sentinel: i64,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            request_collection: "get_request".to_string(),
            response_collection: "get_response".to_string(),
            truth_collection: "set_request".to_string(),
            id_column: constants::ID_COLUMN.to_string(),
            value_column: "value".to_string(),
            reply_id_column: constants::REPLY_ID_COLUMN.to_string(),
            missing_reply_sentinel: constants::NO_REPLY_SENTINEL,
        }
    }
}
