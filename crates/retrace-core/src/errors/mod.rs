pub mod eval_error;
pub mod lineage_error;
pub mod storage_error;

pub use eval_error::EvalError;
pub use lineage_error::LineageError;
pub use storage_error::StorageError;

/// Top-level error type wrapping every subsystem's failures.
///
/// All fatal errors abort only the resolution that raised them; the core is
/// read-only, so there is no state to unwind and no retry loop.
#[derive(Debug, thiserror::Error)]
pub enum RetraceError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Lineage(#[from] LineageError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

pub type RetraceResult<T> = Result<T, RetraceError>;

impl RetraceError {
    /// True for the non-fatal "this identity does not exist at that time"
    /// outcome. Querying non-existent history is legitimate; callers decide
    /// whether absence is acceptable where they stand.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RetraceError::Storage(StorageError::NotFound { .. }))
    }

    /// True when an assumed store invariant broke (ambiguous or conflicting
    /// rows where exactly one was expected).
    pub fn is_consistency_violation(&self) -> bool {
        matches!(
            self,
            RetraceError::Lineage(LineageError::ConsistencyViolation { .. })
                | RetraceError::Storage(StorageError::Ambiguous { .. })
        )
    }
}
