//! Record error types

use thiserror::Error;

/// Errors raised while reading record collections
///
/// Individual malformed records are never errors; they are skipped where
/// they are consumed. These variants cover contract violations only.
#[derive(Error, Debug)]
pub enum RecordsError {
    /// The payload is not a record collection
    #[error("Invalid record collection: expected an array or an object with a `records` array, got {0}")]
    InvalidCollection(String),

    /// Time zone setting could not be understood
    #[error("Invalid time zone: {0} (use `local`, `utc` or an offset like `+02:00`)")]
    InvalidZone(String),

    /// JSON text could not be decoded at all
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for record operations
pub type RecordsResult<T> = Result<T, RecordsError>;
