use thiserror::Error;

use cadence_db::error::DbError;
use cadence_recur::error::RecurError;

/// Failures reported by a `SeriesStore` or `AvailabilitySource`.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A database constraint rejected the write.
    #[error("Constraint violated: {0}")]
    Constraint(String),

    /// The backing store could not be reached.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Database(DbError),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::PoolError(e) => Self::Unavailable(e.to_string()),
            e if e.is_constraint_violation() => Self::Constraint(e.to_string()),
            e => Self::Database(e),
        }
    }
}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        DbError::from(err).into()
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Why a series could not be committed. Nothing is persisted in any case.
#[derive(Error, Debug)]
pub enum CommitError {
    #[error("A commit for this series is already in progress")]
    InFlight,

    #[error("Commit rejected: {0}")]
    Rejected(String),

    #[error("Failed to encode commit request: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Commit failed: {0}")]
    Storage(#[from] StoreError),
}

/// Service layer errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Commit(#[from] CommitError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    CoreError(#[from] cadence_core::error::CoreError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<RecurError> for ServiceError {
    fn from(err: RecurError) -> Self {
        match err {
            RecurError::ValidationError(msg) => Self::ValidationError(msg),
            RecurError::CoreError(e) => Self::CoreError(e),
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
