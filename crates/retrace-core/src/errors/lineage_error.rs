/// Resolution-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum LineageError {
    /// An assumed store invariant broke: a unique lookup returned zero or
    /// multiple rows, or two single-source mechanisms are live at the same
    /// instant. Never guessed around; the resolution aborts.
    #[error("consistency violation: {details}")]
    ConsistencyViolation { details: String },

    /// `union`/`intersect` invoked on strictly disjoint, non-adjacent
    /// ranges. Caller misuse, not a data problem.
    #[error("{op} is undefined for disjoint ranges {left} and {right}")]
    UndefinedIntervalOperation {
        op: &'static str,
        left: String,
        right: String,
    },

    /// The copy-chain worklist exceeded its depth cap. Bound times strictly
    /// decrease in a well-formed log, so this means the log is broken.
    #[error("copy-chain depth exceeded: max {max_depth}")]
    ChainDepthExceeded { max_depth: usize },
}
