use thiserror::Error;

/// Pattern validation and expansion errors
#[derive(Error, Debug)]
pub enum RecurError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    CoreError(#[from] cadence_core::error::CoreError),
}

pub type RecurResult<T> = std::result::Result<T, RecurError>;
