//! # NSKV Storage
//!
//! Ordered key-value backends for NSKV.
//!
//! This crate provides the lowest-level storage abstraction for NSKV.
//! Backends are **opaque ordered byte maps** - they do not interpret
//! the keys or values they store.
//!
//! ## Design Principles
//!
//! - Backends are simple byte maps (get, put, delete, ordered iteration)
//! - No knowledge of namespace prefixes or value encodings
//! - Must be `Send + Sync` for concurrent single-key access
//! - NSKV owns all key layout and value interpretation
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral storage
//! - [`FileBackend`] - For persistent storage in a directory
//!
//! ## Example
//!
//! ```rust
//! use nskv_storage::{KvBackend, InMemoryBackend};
//!
//! let backend = InMemoryBackend::new();
//! backend.put(b"hello", b"world").unwrap();
//! assert_eq!(backend.get(b"hello").unwrap(), Some(b"world".to_vec()));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::{BackendOptions, KvBackend};
pub use error::{StorageError, StorageResult};
pub use file::{FileBackend, DATA_FILE, LOCK_FILE};
pub use memory::InMemoryBackend;
