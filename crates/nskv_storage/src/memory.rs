//! In-memory backend for testing.

use crate::backend::KvBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// An in-memory ordered backend.
///
/// This backend stores all entries in a `BTreeMap` and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral stores that don't need persistence
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use nskv_storage::{KvBackend, InMemoryBackend};
///
/// let backend = InMemoryBackend::new();
/// backend.put(b"b", b"2").unwrap();
/// backend.put(b"a", b"1").unwrap();
/// let keys: Vec<_> = backend.iter().unwrap().into_iter().map(|(k, _)| k).collect();
/// assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec()]);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    /// `None` once closed.
    entries: RwLock<Option<BTreeMap<Vec<u8>, Vec<u8>>>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Some(BTreeMap::new())),
        }
    }

    /// Creates a new in-memory backend with pre-existing entries.
    #[must_use]
    pub fn with_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Vec<u8>, Vec<u8>)>,
    {
        Self {
            entries: RwLock::new(Some(entries.into_iter().collect())),
        }
    }

    /// Returns `true` once [`KvBackend::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.entries.read().is_none()
    }
}

impl KvBackend for InMemoryBackend {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let guard = self.entries.read();
        let map = guard.as_ref().ok_or(StorageError::Closed)?;
        Ok(map.get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        let mut guard = self.entries.write();
        let map = guard.as_mut().ok_or(StorageError::Closed)?;
        map.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StorageResult<()> {
        let mut guard = self.entries.write();
        let map = guard.as_mut().ok_or(StorageError::Closed)?;
        map.remove(key);
        Ok(())
    }

    fn iter(&self) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let guard = self.entries.read();
        let map = guard.as_ref().ok_or(StorageError::Closed)?;
        Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let guard = self.entries.read();
        let map = guard.as_ref().ok_or(StorageError::Closed)?;
        Ok(map
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn len(&self) -> StorageResult<usize> {
        let guard = self.entries.read();
        guard.as_ref().map(BTreeMap::len).ok_or(StorageError::Closed)
    }

    fn flush(&self) -> StorageResult<()> {
        // Nothing is buffered
        if self.is_closed() {
            return Err(StorageError::Closed);
        }
        Ok(())
    }

    fn close(&self) -> StorageResult<()> {
        self.entries.write().take();
        Ok(())
    }
}
