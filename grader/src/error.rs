use std::time::Duration;

/// Everything that can go wrong while evaluating a submission.
///
/// Only [`GraderError::EvaluationTimeout`] is worth retrying; the other
/// variants describe inputs that will fail the same way next time.
#[derive(Debug, thiserror::Error)]
pub enum GraderError {
    /// The repository or the evaluation script could not be fetched.
    #[error("failed to fetch {0}")]
    FetchFailed(String),

    /// The evaluation script ran past its time limit.
    #[error("evaluation timed out after {0:?}")]
    EvaluationTimeout(Duration),

    /// The evaluation script crashed or produced output that is not a
    /// usable score report.
    #[error("evaluation failed: {0}")]
    EvaluationCrashed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GraderError {
    /// Whether a fresh run of the same evaluation could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, GraderError::EvaluationTimeout(_))
    }
}
