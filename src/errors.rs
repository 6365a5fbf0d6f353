use chrono::NaiveDateTime;
use thiserror::Error;

/// Error type that captures projection and aggregation failures.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type ProjectionResult<T> = Result<T, ProjectionError>;
