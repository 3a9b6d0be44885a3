use thiserror::Error;

/// Database layer errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Pool error: {0}")]
    PoolError(#[from] diesel_async::pooled_connection::bb8::RunError),

    #[error("Stored pattern is unreadable: {0}")]
    PatternError(#[from] serde_json::Error),

    #[error(transparent)]
    CoreError(#[from] cadence_core::error::CoreError),
}

impl DbError {
    /// Whether the error came from a constraint the database enforced.
    #[must_use]
    pub const fn is_constraint_violation(&self) -> bool {
        use diesel::result::{DatabaseErrorKind, Error};

        matches!(
            self,
            Self::DatabaseError(Error::DatabaseError(
                DatabaseErrorKind::UniqueViolation
                    | DatabaseErrorKind::ForeignKeyViolation
                    | DatabaseErrorKind::CheckViolation
                    | DatabaseErrorKind::NotNullViolation,
                _
            ))
        )
    }

    /// Whether the error is a duplicate key on a unique index.
    #[must_use]
    pub const fn is_unique_violation(&self) -> bool {
        use diesel::result::{DatabaseErrorKind, Error};

        matches!(
            self,
            Self::DatabaseError(Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _))
        )
    }
}

pub type DbResult<T> = std::result::Result<T, DbError>;
