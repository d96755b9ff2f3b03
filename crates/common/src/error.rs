//! Common error types and handling for Sharekit

use crate::db::StoreError;
use crate::state::StateError;

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for Sharekit domain services
///
/// Store failures are carried unchanged in [`Error::Store`] so callers can
/// inspect exactly what the backing store reported.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl Error {
    /// Get the error code for logs and API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Unexpected(_) => "UNEXPECTED_ERROR",
            Error::Store(_) => "STORE_ERROR",
            Error::Serialization(_) => "SERIALIZATION_ERROR",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Conflict(_) => "CONFLICT",
        }
    }

    /// Whether this error originated in the backing store
    pub fn is_store_error(&self) -> bool {
        matches!(self, Error::Store(_))
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingRecord { collection, id } => {
                Error::NotFound(format!("{}/{} does not exist", collection, id))
            }
            other => Error::Store(other),
        }
    }
}

impl From<StateError> for Error {
    fn from(err: StateError) -> Self {
        Error::Conflict(err.to_string())
    }
}
