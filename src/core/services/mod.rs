pub mod summary_service;

pub use summary_service::{CategoryRow, PeriodRow, PeriodSummary, SummaryService};

use crate::errors::ProjectionError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Projection(#[from] ProjectionError),
}
