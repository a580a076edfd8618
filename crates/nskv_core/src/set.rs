//! Sets of `i64` stored as a single array value.
//!
//! A set lives under one key as one `Vec<i64>` blob. Every mutation is a
//! read-decode-mutate-encode-write cycle over the whole array, so all
//! operations are O(n) and sets should stay small (a few thousand
//! elements at most).
//!
//! The backend has no compare-and-swap, so two unguarded mutators on one
//! key could both read the same snapshot and one update would be lost.
//! Mutations through this module are therefore serialized per key by
//! [`SetLocks`]. Plain `put`s of an array bypass those locks.

use crate::error::{CoreError, CoreResult};
use nskv_codec::{Decode, Encode};
use nskv_storage::KvBackend;
use parking_lot::{Mutex, MutexGuard};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Outcome of [`remove_from_set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetRemoval {
    /// The element was present and has been removed.
    Removed,
    /// The set or the element was absent; nothing was written.
    NotFound,
}

impl SetRemoval {
    /// Returns `true` for [`SetRemoval::Removed`].
    #[must_use]
    pub fn is_removed(self) -> bool {
        self == Self::Removed
    }
}

/// Striped locks serializing set mutations per key.
///
/// Keys hash onto a fixed number of stripes. Two keys may share a stripe,
/// which only costs contention, never correctness.
#[derive(Debug)]
pub struct SetLocks {
    stripes: Box<[Mutex<()>]>,
}

impl SetLocks {
    /// Creates a lock table with `stripes` stripes (at least one).
    #[must_use]
    pub fn new(stripes: usize) -> Self {
        Self {
            stripes: (0..stripes.max(1)).map(|_| Mutex::new(())).collect(),
        }
    }

    /// Number of stripes.
    #[must_use]
    pub fn stripes(&self) -> usize {
        self.stripes.len()
    }

    /// Locks the stripe owning `key`.
    pub fn lock(&self, key: &[u8]) -> MutexGuard<'_, ()> {
        self.stripes[self.stripe_of(key)].lock()
    }

    fn stripe_of(&self, key: &[u8]) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.stripes.len() as u64) as usize
    }
}

fn read_array(backend: &dyn KvBackend, key: &[u8]) -> CoreResult<Option<Vec<i64>>> {
    match backend.get(key)? {
        Some(bytes) => Vec::<i64>::decode(&bytes)
            .map(Some)
            .map_err(|source| CoreError::Deserialization {
                type_name: <Vec<i64> as Decode>::TYPE_NAME,
                source,
            }),
        None => Ok(None),
    }
}

fn write_array(backend: &dyn KvBackend, key: &[u8], values: &[i64]) -> CoreResult<()> {
    backend.put(key, &values.encode()?)?;
    Ok(())
}

/// Returns the set stored under `key` in insertion order, empty if absent.
pub fn get_set(backend: &dyn KvBackend, key: &[u8]) -> CoreResult<Vec<i64>> {
    Ok(read_array(backend, key)?.unwrap_or_default())
}

/// Appends `value` to the set under `key` unless already present.
///
/// Returns `true` if the value was added, `false` if it was already there
/// (in which case nothing is written). The caller must hold the key's
/// [`SetLocks`] stripe.
pub fn add_to_set(backend: &dyn KvBackend, key: &[u8], value: i64) -> CoreResult<bool> {
    let mut values = read_array(backend, key)?.unwrap_or_default();
    if values.contains(&value) {
        return Ok(false);
    }

    values.push(value);
    write_array(backend, key, &values)?;
    Ok(true)
}

/// Removes the first occurrence of `value` from the set under `key`.
///
/// The order of the remaining elements is preserved. Nothing is written
/// when the set or the element is absent. The caller must hold the key's
/// [`SetLocks`] stripe.
pub fn remove_from_set(backend: &dyn KvBackend, key: &[u8], value: i64) -> CoreResult<SetRemoval> {
    let Some(mut values) = read_array(backend, key)? else {
        return Ok(SetRemoval::NotFound);
    };
    let Some(pos) = values.iter().position(|v| *v == value) else {
        return Ok(SetRemoval::NotFound);
    };

    values.remove(pos);
    write_array(backend, key, &values)?;
    Ok(SetRemoval::Removed)
}

/// Returns `true` if the set under `key` contains `value`.
pub fn contains_element(backend: &dyn KvBackend, key: &[u8], value: i64) -> CoreResult<bool> {
    Ok(read_array(backend, key)?.is_some_and(|values| values.contains(&value)))
}
