use thiserror::Error;

/// Failures of the quiz lifecycle operations.
#[derive(Debug, Error)]
pub(crate) enum QuizError {
    #[error("{0}")]
    NotFound(String),
    #[error("Quiz attempt already completed")]
    AlreadyCompleted,
    #[error("{0}")]
    InvalidArgument(String),
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl QuizError {
    pub(crate) fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{what} not found"))
    }
}
