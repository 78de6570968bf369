/// Accuracy-evaluation errors.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// The known true cause of a response is absent from the predicted
    /// lineage set. Hard failure; the evaluation stops immediately.
    #[error("ground truth {expected} absent from predicted lineage of {response}")]
    GroundTruthMiss { expected: i64, response: String },

    #[error("report write failed: {message}")]
    ReportIo { message: String },
}
