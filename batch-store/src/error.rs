//! Error types for the batch store

use crate::types::BatchStatus;
use thiserror::Error;
use uuid::Uuid;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Store errors
#[derive(Error, Debug)]
pub enum Error {
    /// Storage error (RocksDB)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Batch not found
    #[error("Batch not found: {0}")]
    BatchNotFound(Uuid),

    /// Settlement record not found
    #[error("Settlement record not found for batch: {0}")]
    RecordNotFound(Uuid),

    /// Status compare-and-set failed
    #[error("Invalid transition for batch {batch_id}: expected {expected}, found {actual}")]
    InvalidTransition {
        /// Batch the transition was attempted on
        batch_id: Uuid,
        /// Status the caller expected
        expected: BatchStatus,
        /// Status actually found
        actual: BatchStatus,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error::Storage(err.to_string())
    }
}
