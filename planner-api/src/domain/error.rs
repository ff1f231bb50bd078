use thiserror::Error;

use super::models::{ProjectId, ScheduleId};

/// Errors surfaced by the outbound persistence ports.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("unique constraint violated: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Translate unique violations (SQLSTATE 23505) into [`RepositoryError::Conflict`].
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unique").to_string();
                return Self::Conflict(constraint);
            }
        }
        Self::Database(err)
    }
}

/// Errors that can occur during authentication and registration.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("malformed token")]
    MalformedToken,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    TokenExpired,
    #[error("user no longer exists")]
    UnknownUser,
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),
    #[error("registration is disabled")]
    RegistrationDisabled,
    #[error("{0}")]
    Validation(String),
    #[error("cryptographic operation failed: {0}")]
    Crypto(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Errors that can occur during project operations.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("project {0} not found")]
    NotFound(ProjectId),
    #[error("a project named '{0}' already exists")]
    NameTaken(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Errors that can occur during schedule operations.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("schedule {0} not found")]
    NotFound(ScheduleId),
    #[error("start time {start} must be before end time {end}")]
    InvalidTimeRange { start: String, end: String },
    #[error("invalid date range: 'from' must not be after 'to'")]
    InvalidDateRange,
    #[error("project {0} does not exist")]
    UnknownProject(ProjectId),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
