//! Error types for NSKV core.

use nskv_codec::{CodecError, Prefix};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in NSKV core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Backend error.
    #[error("storage error: {0}")]
    Storage(#[from] nskv_storage::StorageError),

    /// A value could not be encoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The prefix is already claimed by a live namespace.
    #[error("duplicate prefix: {prefix} is already registered")]
    DuplicatePrefix {
        /// The rejected prefix.
        prefix: Prefix,
    },

    /// The store has not been initialized, or the namespace predates a wipe.
    #[error("store is not initialized")]
    NotInitialized,

    /// `initialize` was called on an initialized store.
    #[error("store is already initialized at {}", path.display())]
    AlreadyInitialized {
        /// Where the open store lives.
        path: PathBuf,
    },

    /// A required value was absent.
    #[error("element not found: {key}")]
    ElementNotFound {
        /// Rendered key that was looked up.
        key: String,
    },

    /// A stored blob could not be decoded as the requested type.
    #[error("cannot decode stored value as {type_name}: {source}")]
    Deserialization {
        /// The requested type.
        type_name: &'static str,
        /// The underlying codec failure.
        source: CodecError,
    },

    /// The empty string cannot be used as a key suffix.
    #[error("key suffix must not be empty")]
    EmptyKeySuffix,

    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },
}

impl CoreError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an element-not-found error.
    pub fn element_not_found(key: impl Into<String>) -> Self {
        Self::ElementNotFound { key: key.into() }
    }

    /// Returns `true` for errors a caller may expect during normal use.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. })
    }
}
