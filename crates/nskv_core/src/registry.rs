//! Registry of claimed namespace prefixes.

use crate::error::{CoreError, CoreResult};
use nskv_codec::Prefix;
use parking_lot::Mutex;
use std::collections::HashSet;

/// The set of prefixes claimed by live namespaces of one store.
///
/// Registration is a single check-and-insert under one mutex, so two
/// threads racing for the same prefix can never both succeed.
#[derive(Debug, Default)]
pub struct PrefixRegistry {
    prefixes: Mutex<HashSet<Prefix>>,
}

impl PrefixRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DuplicatePrefix`] if it is already claimed.
    pub fn register(&self, prefix: Prefix) -> CoreResult<()> {
        if self.prefixes.lock().insert(prefix) {
            Ok(())
        } else {
            Err(CoreError::DuplicatePrefix { prefix })
        }
    }

    /// Returns `true` if `prefix` is claimed.
    #[must_use]
    pub fn contains(&self, prefix: &Prefix) -> bool {
        self.prefixes.lock().contains(prefix)
    }

    /// Returns the number of claimed prefixes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prefixes.lock().len()
    }

    /// Returns `true` if nothing is claimed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prefixes.lock().is_empty()
    }

    /// Returns the claimed prefixes in ascending order.
    #[must_use]
    pub fn prefixes(&self) -> Vec<Prefix> {
        let mut prefixes: Vec<Prefix> = self.prefixes.lock().iter().copied().collect();
        prefixes.sort();
        prefixes
    }

    /// Releases every prefix. Only the wipe path calls this.
    pub(crate) fn reset_all(&self) {
        self.prefixes.lock().clear();
    }
}
