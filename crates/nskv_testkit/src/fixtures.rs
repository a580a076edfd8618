//! Test fixtures and store helpers.
//!
//! Provides convenience functions for setting up test stores
//! and common test scenarios.

use nskv_core::{Config, Store};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A test store with automatic cleanup.
pub struct TestStore {
    /// The store instance.
    pub store: Store,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: Option<TempDir>,
}

impl TestStore {
    /// Creates a new in-memory test store.
    pub fn memory() -> Self {
        let store = Store::new();
        store
            .initialize_in_memory()
            .expect("Failed to initialize in-memory store");
        Self {
            store,
            temp_dir: None,
        }
    }

    /// Creates a new directory-backed test store.
    pub fn file() -> Self {
        Self::file_with_config(Config::default())
    }

    /// Creates a directory-backed test store with a custom configuration.
    ///
    /// The store directory is a fresh subdirectory of a temp dir, so the
    /// store creates it on initialize just as in production.
    pub fn file_with_config(config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("store");
        let store = Store::with_config(config).expect("Invalid test config");
        store
            .initialize(&path)
            .expect("Failed to initialize file store");

        Self {
            store,
            temp_dir: Some(temp_dir),
        }
    }

    /// Returns the store directory if file-based, None if in-memory.
    pub fn path(&self) -> Option<PathBuf> {
        self.temp_dir.as_ref().map(|d| d.path().join("store"))
    }

    /// Closes the store and initializes it again on the same directory.
    ///
    /// # Panics
    ///
    /// Panics for in-memory stores, which cannot be reopened.
    pub fn reopen(&self) {
        let path = self.path().expect("Only file stores can be reopened");
        self.store.close().expect("Failed to close store");
        self.store
            .initialize(&path)
            .expect("Failed to reinitialize store");
    }
}

impl std::ops::Deref for TestStore {
    type Target = Store;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Runs a test with a temporary in-memory store.
pub fn with_temp_store<F, R>(f: F) -> R
where
    F: FnOnce(&Store) -> R,
{
    let test_store = TestStore::memory();
    f(&test_store.store)
}

/// Runs a test with a temporary directory-backed store.
pub fn with_file_store<F, R>(f: F) -> R
where
    F: FnOnce(&Store, &Path) -> R,
{
    let test_store = TestStore::file();
    let path = test_store.path().expect("File store should have a path");
    f(&test_store.store, &path)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates a store with `namespaces` namespaces (ids `1..=namespaces`),
    /// each holding `entries` `i64` values keyed `0..entries`.
    pub fn populated_store(namespaces: i64, entries: i64) -> TestStore {
        let test_store = TestStore::memory();
        for id in 1..=namespaces {
            let ns = test_store
                .namespace(id)
                .expect("Failed to create namespace");
            for key in 0..entries {
                ns.put(key, &(id * 1_000 + key))
                    .expect("Failed to populate namespace");
            }
        }
        test_store
    }
}
