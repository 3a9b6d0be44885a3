use salvo::http::StatusCode;
use thiserror::Error;

use cadence_service::error::{CommitError, ServiceError, StoreError};

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    CoreError(#[from] cadence_core::error::CoreError),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl AppError {
    /// ## Summary
    /// HTTP status reported for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidBody(_)
            | Self::ServiceError(
                ServiceError::ValidationError(_) | ServiceError::Commit(CommitError::Rejected(_)),
            ) => StatusCode::BAD_REQUEST,
            Self::ServiceError(ServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::ServiceError(ServiceError::Commit(
                CommitError::InFlight | CommitError::Storage(StoreError::Constraint(_)),
            )) => StatusCode::CONFLICT,
            Self::ServiceError(
                ServiceError::Store(_) | ServiceError::Commit(CommitError::Storage(_)),
            ) => StatusCode::SERVICE_UNAVAILABLE,
            Self::ServiceError(ServiceError::CoreError(_) | ServiceError::Commit(CommitError::Encoding(_)))
            | Self::CoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// ## Summary
    /// Message safe to show to API clients.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self.status_code() {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            StatusCode::SERVICE_UNAVAILABLE => "Storage unavailable, please retry".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::ServiceError(err.into())
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
