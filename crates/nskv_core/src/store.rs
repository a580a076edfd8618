//! The store context: one shared backend, many namespaces.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::namespace::Namespace;
use crate::registry::PrefixRegistry;
use crate::set::SetLocks;
use nskv_codec::Prefix;
use nskv_storage::{FileBackend, InMemoryBackend, KvBackend};
use parking_lot::RwLock;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The exact phrase [`Store::wipe`] requires before destroying data.
pub const WIPE_CONFIRMATION: &str = "Yes I am";

/// Backend plus lifecycle bookkeeping, guarded by one lock.
struct StoreState {
    backend: Option<Box<dyn KvBackend>>,
    /// Directory of a file-backed store; `None` in memory.
    path: Option<PathBuf>,
    /// Bumped by every wipe; namespaces from older generations are dead.
    generation: u64,
}

/// State shared by a [`Store`] and every [`Namespace`] it hands out.
pub(crate) struct StoreShared {
    config: Config,
    state: RwLock<StoreState>,
    registry: PrefixRegistry,
    set_locks: SetLocks,
}

impl StoreShared {
    /// Runs `f` against the open backend if `generation` is still current.
    pub(crate) fn with_backend<T>(
        &self,
        generation: u64,
        f: impl FnOnce(&dyn KvBackend) -> CoreResult<T>,
    ) -> CoreResult<T> {
        let state = self.state.read();
        match state.backend.as_deref() {
            Some(backend) if state.generation == generation => f(backend),
            _ => Err(CoreError::NotInitialized),
        }
    }

    pub(crate) fn set_locks(&self) -> &SetLocks {
        &self.set_locks
    }
}

impl Drop for StoreShared {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if let Some(backend) = state.backend.take() {
            if let Err(e) = backend.close() {
                warn!(error = %e, "failed to close store on shutdown");
            }
        }
    }
}

/// The context owning one shared backend and its namespace registry.
///
/// A store moves through `Uninitialized → Initialized → (wipe) →
/// Uninitialized`. Namespaces can only be created while it is initialized,
/// and every namespace gets a prefix no other live namespace holds.
///
/// Independent stores in one process have independent registries.
///
/// # Example
///
/// ```rust
/// use nskv_core::{Store, WIPE_CONFIRMATION};
///
/// let store = Store::new();
/// store.initialize_in_memory().unwrap();
///
/// let users = store.namespace(42).unwrap();
/// users.put(7i64, &99i64).unwrap();
/// assert_eq!(users.get::<i64, _>(7i64).unwrap(), Some(99));
///
/// assert!(store.wipe(WIPE_CONFIRMATION).unwrap());
/// assert!(users.get::<i64, _>(7i64).is_err());
/// ```
pub struct Store {
    shared: Arc<StoreShared>,
}

impl Store {
    /// Creates an uninitialized store with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::build(Config::default())
    }

    /// Creates an uninitialized store with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] if the configuration is invalid.
    pub fn with_config(config: Config) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Creates a store from `config` and initializes it at `config.path`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] if no path is configured, plus any
    /// error of [`Store::initialize`].
    pub fn open(config: Config) -> CoreResult<Self> {
        let path = config
            .path
            .clone()
            .ok_or_else(|| CoreError::config("no store path configured"))?;
        let store = Self::with_config(config)?;
        store.initialize(&path)?;
        Ok(store)
    }

    fn build(config: Config) -> Self {
        let set_locks = SetLocks::new(config.set_lock_stripes);
        Self {
            shared: Arc::new(StoreShared {
                config,
                state: RwLock::new(StoreState {
                    backend: None,
                    path: None,
                    generation: 0,
                }),
                registry: PrefixRegistry::new(),
                set_locks,
            }),
        }
    }

    /// Opens the file backend in `path`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// - [`CoreError::AlreadyInitialized`] if the store is already open
    /// - [`CoreError::Io`] if the directory cannot be created
    /// - [`CoreError::Storage`] if the backend cannot be opened
    ///
    /// On error the store stays uninitialized.
    pub fn initialize(&self, path: &Path) -> CoreResult<()> {
        let mut state = self.shared.state.write();
        Self::ensure_uninitialized(&state)?;

        if !path.exists() {
            if !self.shared.config.create_if_missing {
                return Err(CoreError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("store directory does not exist: {}", path.display()),
                )));
            }
            fs::create_dir_all(path)?;
        }

        let backend = FileBackend::open(path, self.shared.config.backend_options())?;
        state.backend = Some(Box::new(backend));
        state.path = Some(path.to_path_buf());
        info!(path = %path.display(), "store initialized");
        Ok(())
    }

    /// Initializes the store over a fresh in-memory backend.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AlreadyInitialized`] if the store is already open.
    pub fn initialize_in_memory(&self) -> CoreResult<()> {
        self.initialize_with_backend(InMemoryBackend::new())
    }

    /// Initializes the store over a caller-supplied backend.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AlreadyInitialized`] if the store is already open.
    pub fn initialize_with_backend(&self, backend: impl KvBackend + 'static) -> CoreResult<()> {
        let mut state = self.shared.state.write();
        Self::ensure_uninitialized(&state)?;
        state.backend = Some(Box::new(backend));
        state.path = None;
        info!("store initialized without a directory");
        Ok(())
    }

    fn ensure_uninitialized(state: &StoreState) -> CoreResult<()> {
        if state.backend.is_some() {
            return Err(CoreError::AlreadyInitialized {
                path: state.path.clone().unwrap_or_default(),
            });
        }
        Ok(())
    }

    /// Returns `true` while a backend is open.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.shared.state.read().backend.is_some()
    }

    /// Directory of the open store, if file-backed.
    #[must_use]
    pub fn path(&self) -> Option<PathBuf> {
        let state = self.shared.state.read();
        state.backend.as_ref().and(state.path.clone())
    }

    /// The configuration this store was built with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    /// The registry of claimed prefixes.
    #[must_use]
    pub fn registry(&self) -> &PrefixRegistry {
        &self.shared.registry
    }

    /// Creates a namespace whose prefix encodes the identifier `id`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotInitialized`] if the store is not open
    /// - [`CoreError::DuplicatePrefix`] if another namespace holds the prefix
    pub fn namespace(&self, id: i64) -> CoreResult<Namespace> {
        self.namespace_with_prefix(Prefix::new(id))
    }

    /// Creates a namespace whose prefix is derived from `name`.
    ///
    /// # Errors
    ///
    /// Same as [`Store::namespace`].
    pub fn namespace_named(&self, name: &str) -> CoreResult<Namespace> {
        self.namespace_with_prefix(Prefix::from_name(name))
    }

    /// Creates a namespace bound to `prefix`.
    ///
    /// # Errors
    ///
    /// Same as [`Store::namespace`].
    pub fn namespace_with_prefix(&self, prefix: Prefix) -> CoreResult<Namespace> {
        // Held across registration so a concurrent wipe cannot interleave.
        let state = self.shared.state.read();
        if state.backend.is_none() {
            return Err(CoreError::NotInitialized);
        }
        self.shared.registry.register(prefix)?;
        debug!(%prefix, "namespace registered");
        Ok(Namespace::new(
            prefix,
            state.generation,
            Arc::clone(&self.shared),
        ))
    }

    /// Returns every entry of the backend in key order, across all namespaces.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotInitialized`] if the store is not open.
    pub fn dump(&self) -> CoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let state = self.shared.state.read();
        let backend = state.backend.as_deref().ok_or(CoreError::NotInitialized)?;
        Ok(backend.iter()?)
    }

    /// Returns the number of entries across all namespaces.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotInitialized`] if the store is not open.
    pub fn len(&self) -> CoreResult<usize> {
        let state = self.shared.state.read();
        let backend = state.backend.as_deref().ok_or(CoreError::NotInitialized)?;
        Ok(backend.len()?)
    }

    /// Returns `true` if no namespace holds any entry.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotInitialized`] if the store is not open.
    pub fn is_empty(&self) -> CoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Flushes the backend to durable storage.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotInitialized`] if the store is not open.
    pub fn flush(&self) -> CoreResult<()> {
        let state = self.shared.state.read();
        let backend = state.backend.as_deref().ok_or(CoreError::NotInitialized)?;
        Ok(backend.flush()?)
    }

    /// Closes the backend, keeping its directory and the prefix registry.
    ///
    /// Existing namespaces fail with [`CoreError::NotInitialized`] until the
    /// store is initialized again. Closing a closed store is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the final flush fails.
    pub fn close(&self) -> CoreResult<()> {
        let mut state = self.shared.state.write();
        if let Some(backend) = state.backend.take() {
            backend.close()?;
            info!("store closed");
        }
        state.path = None;
        Ok(())
    }

    /// Destroys every namespace's data.
    ///
    /// Does nothing and returns `false` unless `confirmation` is exactly
    /// [`WIPE_CONFIRMATION`] and the store is initialized. Otherwise closes
    /// the backend, deletes its directory tree, releases every prefix,
    /// invalidates all existing namespaces and returns `true`. The store is
    /// left uninitialized.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Io`] if the directory cannot be deleted. The
    /// store is uninitialized even then.
    pub fn wipe(&self, confirmation: &str) -> CoreResult<bool> {
        if confirmation != WIPE_CONFIRMATION {
            return Ok(false);
        }

        let mut state = self.shared.state.write();
        let Some(backend) = state.backend.take() else {
            return Ok(false);
        };
        if let Err(e) = backend.close() {
            warn!(error = %e, "failed to close backend before wipe");
        }
        drop(backend);

        let path = state.path.take();
        state.generation += 1;
        self.shared.registry.reset_all();

        if let Some(path) = path {
            match fs::remove_dir_all(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
            info!(path = %path.display(), "store wiped");
        } else {
            info!("in-memory store wiped");
        }
        Ok(true)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.read();
        f.debug_struct("Store")
            .field("initialized", &state.backend.is_some())
            .field("path", &state.path)
            .field("generation", &state.generation)
            .field("namespaces", &self.shared.registry.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn new_store_is_uninitialized() {
        let store = Store::new();
        assert!(!store.is_initialized());
        assert!(matches!(store.namespace(1), Err(CoreError::NotInitialized)));
        assert!(matches!(store.dump(), Err(CoreError::NotInitialized)));
    }

    #[test]
    fn initialize_creates_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b");

        let store = Store::new();
        store.initialize(&path).unwrap();

        assert!(path.is_dir());
        assert!(store.is_initialized());
        assert_eq!(store.path(), Some(path));
    }

    #[test]
    fn initialize_twice_fails() {
        let dir = tempdir().unwrap();
        let store = Store::new();
        store.initialize(dir.path()).unwrap();

        let err = store.initialize(dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyInitialized { .. }));
        assert!(matches!(
            store.initialize_in_memory(),
            Err(CoreError::AlreadyInitialized { .. })
        ));
    }

    #[test]
    fn initialize_without_create_fails_cleanly() {
        let dir = tempdir().unwrap();
        let store = Store::with_config(Config::new().create_if_missing(false)).unwrap();

        let err = store.initialize(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
        assert!(!store.is_initialized());
    }

    #[test]
    fn initialize_under_regular_file_fails_cleanly() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"not a directory").unwrap();

        let store = Store::new();
        let err = store.initialize(&blocker.join("store")).unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
        assert!(!store.is_initialized());
        assert!(matches!(store.namespace(1), Err(CoreError::NotInitialized)));

        store.initialize(&dir.path().join("store")).unwrap();
        assert!(store.is_initialized());
    }

    #[test]
    fn second_store_on_same_directory_is_locked() {
        let dir = tempdir().unwrap();
        let first = Store::new();
        first.initialize(dir.path()).unwrap();

        let second = Store::new();
        let err = second.initialize(dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::Storage(_)));
        assert!(!second.is_initialized());
    }

    #[test]
    fn open_requires_path() {
        assert!(matches!(Store::open(Config::new()), Err(CoreError::Config { .. })));

        let dir = tempdir().unwrap();
        let store = Store::open(Config::new().path(dir.path())).unwrap();
        assert!(store.is_initialized());
    }

    #[test]
    fn with_config_rejects_zero_stripes() {
        let result = Store::with_config(Config::new().set_lock_stripes(0));
        assert!(matches!(result, Err(CoreError::Config { .. })));
    }

    #[test]
    fn duplicate_namespace_fails() {
        let store = Store::new();
        store.initialize_in_memory().unwrap();

        let _first = store.namespace(5).unwrap();
        assert!(matches!(
            store.namespace(5),
            Err(CoreError::DuplicatePrefix { .. })
        ));
        assert!(matches!(
            store.namespace_named("bands").and_then(|_| store.namespace_named("bands")),
            Err(CoreError::DuplicatePrefix { .. })
        ));
    }

    #[test]
    fn independent_stores_have_independent_registries() {
        let a = Store::new();
        let b = Store::new();
        a.initialize_in_memory().unwrap();
        b.initialize_in_memory().unwrap();

        assert!(a.namespace(1).is_ok());
        assert!(b.namespace(1).is_ok());
    }

    #[test]
    fn wrong_phrase_is_noop() {
        let store = Store::new();
        store.initialize_in_memory().unwrap();
        let ns = store.namespace(1).unwrap();
        ns.put("k", &true).unwrap();

        assert!(!store.wipe("yes i am").unwrap());
        assert!(!store.wipe("").unwrap());
        assert!(store.is_initialized());
        assert_eq!(ns.get::<bool, _>("k").unwrap(), Some(true));
    }

    #[test]
    fn wipe_uninitialized_is_noop() {
        let store = Store::new();
        assert!(!store.wipe(WIPE_CONFIRMATION).unwrap());
    }

    #[test]
    fn wipe_deletes_directory_and_releases_prefixes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store");
        let store = Store::new();
        store.initialize(&path).unwrap();
        let ns = store.namespace(1).unwrap();
        ns.put(1i32, &10i32).unwrap();

        assert!(store.wipe(WIPE_CONFIRMATION).unwrap());
        assert!(!path.exists());
        assert!(!store.is_initialized());
        assert!(store.registry().is_empty());
        assert!(matches!(ns.get::<i32, _>(1i32), Err(CoreError::NotInitialized)));

        store.initialize(&path).unwrap();
        let fresh = store.namespace(1).unwrap();
        assert_eq!(fresh.get::<i32, _>(1i32).unwrap(), None);
    }

    #[test]
    fn close_keeps_data_and_namespaces() {
        let dir = tempdir().unwrap();
        let store = Store::new();
        store.initialize(dir.path()).unwrap();
        let ns = store.namespace(3).unwrap();
        ns.put("name", "Opeth").unwrap();

        store.close().unwrap();
        store.close().unwrap();
        assert!(matches!(ns.contains("name"), Err(CoreError::NotInitialized)));

        store.initialize(dir.path()).unwrap();
        assert_eq!(ns.get::<String, _>("name").unwrap().as_deref(), Some("Opeth"));
        assert!(matches!(store.namespace(3), Err(CoreError::DuplicatePrefix { .. })));
    }

    #[test]
    fn dump_lists_all_namespaces_in_key_order() {
        let store = Store::new();
        store.initialize_in_memory().unwrap();
        let b = store.namespace(2).unwrap();
        let a = store.namespace(1).unwrap();
        b.put(1i16, &1i16).unwrap();
        a.put(1i16, &1i16).unwrap();

        let dump = store.dump().unwrap();
        assert_eq!(dump.len(), 2);
        assert!(dump[0].0.starts_with(Prefix::new(1).as_bytes()));
        assert_eq!(store.len().unwrap(), 2);
        assert!(!store.is_empty().unwrap());
    }

    #[test]
    fn drop_closes_backend_and_releases_lock() {
        let dir = tempdir().unwrap();
        {
            let store = Store::new();
            store.initialize(dir.path()).unwrap();
            store.namespace(1).unwrap().put(1i64, &1i64).unwrap();
        }

        let store = Store::new();
        store.initialize(dir.path()).unwrap();
        let ns = store.namespace(1).unwrap();
        assert_eq!(ns.get::<i64, _>(1i64).unwrap(), Some(1));
    }
}
