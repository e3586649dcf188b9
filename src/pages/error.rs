//! Page error types

use thiserror::Error;

use crate::client::ClientError;
use crate::store::StoreError;

/// Errors shown to the user when a page cannot be produced
#[derive(Error, Debug)]
pub enum PageError {
    #[error("Upload Failed: {0}")]
    Upload(ClientError),

    #[error("Could not load heart health data. {0}")]
    HeartHealth(String),

    #[error("Could not load sleep data. {0}")]
    Sleep(ClientError),

    #[error("Could not load records. {0}")]
    Records(ClientError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for page controllers
pub type PageResult<T> = Result<T, PageError>;
