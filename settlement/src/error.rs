//! Error types for the settlement pipeline

use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or incomplete submission; nothing was persisted
    #[error("Validation error: {0}")]
    Validation(String),

    /// Illegal status transition attempt; no state was mutated
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Unknown identifier
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage layer failure during a multi-step write
    #[error("Store error: {0}")]
    Store(batch_store::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<batch_store::Error> for Error {
    fn from(err: batch_store::Error) -> Self {
        match err {
            batch_store::Error::BatchNotFound(id) => Error::NotFound(format!("batch {}", id)),
            batch_store::Error::RecordNotFound(id) => {
                Error::NotFound(format!("settlement record for batch {}", id))
            }
            e @ batch_store::Error::InvalidTransition { .. } => Error::InvalidState(e.to_string()),
            other => Error::Store(other),
        }
    }
}
