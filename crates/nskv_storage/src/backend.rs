//! Backend trait definition.

use crate::error::StorageResult;

/// A low-level ordered key-value backend for NSKV.
///
/// Backends are **opaque byte maps**. They provide point reads and writes
/// plus iteration in ascending key order. NSKV owns all key layout and
/// value interpretation - backends do not understand prefixes or types.
///
/// # Invariants
///
/// - `get` returns exactly the bytes of the last `put` for that key,
///   or `None` after a `delete`
/// - `iter` and `scan_prefix` yield entries in ascending bytewise key order
/// - Single-key operations are safe to call from many threads at once
/// - Every operation after `close` fails with [`crate::StorageError::Closed`]
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait KvBackend: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is closed.
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is closed or an I/O error occurs.
    fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()>;

    /// Removes `key` if present. Deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is closed or an I/O error occurs.
    fn delete(&self, key: &[u8]) -> StorageResult<()>;

    /// Returns every entry in ascending key order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is closed.
    fn iter(&self) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Returns every entry whose key starts with `prefix`, in key order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is closed.
    fn scan_prefix(&self, prefix: &[u8]) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Returns the number of live entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is closed.
    fn len(&self) -> StorageResult<usize>;

    /// Returns `true` if the backend holds no entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is closed.
    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Flushes pending writes to durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush operation fails.
    fn flush(&self) -> StorageResult<()>;

    /// Closes the backend, releasing files and locks.
    ///
    /// Closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the final flush fails.
    fn close(&self) -> StorageResult<()>;
}

/// Options used when opening a persistent backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendOptions {
    /// Create the backing directory and files if they don't exist.
    pub create_if_missing: bool,
    /// Sync the data file after every write (safer but slower).
    pub sync_on_write: bool,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            sync_on_write: false,
        }
    }
}

impl BackendOptions {
    /// Sets whether to create missing directories and files.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to sync after every write.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }
}
