//! Gateway error types

use thiserror::Error;

use crate::records::RecordsError;

/// Errors that can occur when talking to the backend
#[derive(Error, Debug)]
pub enum ClientError {
    /// Could not connect
    #[error("Backend unavailable at {0}")]
    Unavailable(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success status; `message` is what the backend said
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Success status carrying an `error` field
    #[error("{0}")]
    Backend(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Records(#[from] RecordsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for gateway operations
pub type ClientResult<T> = Result<T, ClientError>;
