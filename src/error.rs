//! Error types for the delivery core

use thiserror::Error;

/// Application error codes reported to callers and in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    DbFailure = 3,
    HoldingNotAvailable = 7,
    BadValue = 18,
    NoSuchData = 20,
    HoldingHasReproductions = 21,
    InconsistentData = 22,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Consistency violation: {0}")]
    ConsistencyViolation(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),
}

impl AppError {
    /// Numeric code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::NotFound(_) => ErrorCode::NoSuchData,
            AppError::InvalidArgument(_) | AppError::Validation(_) => ErrorCode::BadValue,
            AppError::ConsistencyViolation(_) => ErrorCode::InconsistentData,
            AppError::Database(_) => ErrorCode::DbFailure,
            AppError::Conflict(_) => ErrorCode::HoldingNotAvailable,
            AppError::Internal(_) => ErrorCode::Failure,
            AppError::BusinessRule(_) => ErrorCode::HoldingHasReproductions,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
