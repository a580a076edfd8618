//! Error types for storage operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The data file is corrupted.
    #[error("storage corrupted at offset {offset}: {message}")]
    Corrupted {
        /// Byte offset of the bad record.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// The backend is closed.
    #[error("storage is closed")]
    Closed,

    /// The directory does not exist and creation was not requested.
    #[error("storage directory does not exist: {}", path.display())]
    NotFound {
        /// The missing directory.
        path: PathBuf,
    },

    /// Another handle holds the directory lock.
    #[error("storage locked: another handle has exclusive access to {}", path.display())]
    Locked {
        /// The locked directory.
        path: PathBuf,
    },
}

impl StorageError {
    /// Creates a corruption error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::Corrupted {
            offset,
            message: message.into(),
        }
    }
}
