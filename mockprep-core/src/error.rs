//! Error types for mockprep-core

use thiserror::Error;

/// Main error type for the mockprep-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed user or attempt identifier
    #[error("invalid {entity} identifier: {value:?}")]
    InvalidIdentifier { entity: &'static str, value: String },

    /// Requested entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Attempt belongs to a different user
    #[error("attempt {0} belongs to another user")]
    AccessDenied(String),

    /// Field outside its declared bounds
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
}

/// Coarse classification of an [`Error`], used by callers to pick a response
/// without looking at message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The record store failed or could not be reached
    StoreUnavailable,
    /// An identifier was rejected before touching the store
    InvalidIdentifier,
    /// The requested entity does not exist
    NotFound,
    /// The caller does not own the entity
    AccessDenied,
    /// Input failed boundary validation
    ValidationFailure,
    /// Configuration or catalog could not be loaded
    Configuration,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Database(_) | Error::Io(_) => ErrorKind::StoreUnavailable,
            Error::Json(_) | Error::Config(_) => ErrorKind::Configuration,
            Error::InvalidIdentifier { .. } => ErrorKind::InvalidIdentifier,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::AccessDenied(_) => ErrorKind::AccessDenied,
            Error::Validation { .. } => ErrorKind::ValidationFailure,
        }
    }

    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Result type alias for mockprep-core
pub type Result<T> = std::result::Result<T, Error>;
