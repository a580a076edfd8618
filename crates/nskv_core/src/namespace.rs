//! Typed access to one namespace of a shared store.

use crate::error::{CoreError, CoreResult};
use crate::set::{self, SetRemoval};
use crate::store::StoreShared;
use nskv_codec::{describe_key, generate_key, AbsentSentinel, Decode, Encode, KeySuffix, Prefix};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// One logical table inside a [`crate::Store`].
///
/// Every key written through a namespace starts with its unique prefix, so
/// namespaces never see each other's entries. All accessors are generic
/// over the suffix type ([`KeySuffix`]: `i16`, `i32`, `i64`, strings) and
/// the value type ([`Encode`] / [`Decode`]).
///
/// Cloning a namespace yields another handle to the same prefix.
///
/// # Example
///
/// ```rust
/// use nskv_core::Store;
///
/// let store = Store::new();
/// store.initialize_in_memory().unwrap();
/// let bands = store.namespace_named("bands").unwrap();
///
/// bands.put("opeth", &1990i32).unwrap();
/// assert_eq!(bands.get::<i32, _>("opeth").unwrap(), Some(1990));
///
/// bands.add_to_set("tags", 1).unwrap();
/// bands.add_to_set("tags", 2).unwrap();
/// bands.add_to_set("tags", 1).unwrap();
/// assert_eq!(bands.get_set("tags").unwrap(), vec![1, 2]);
/// ```
#[derive(Clone)]
pub struct Namespace {
    prefix: Prefix,
    generation: u64,
    shared: Arc<StoreShared>,
}

impl Namespace {
    pub(crate) fn new(prefix: Prefix, generation: u64, shared: Arc<StoreShared>) -> Self {
        Self {
            prefix,
            generation,
            shared,
        }
    }

    /// The prefix owned by this namespace.
    #[must_use]
    pub fn prefix(&self) -> Prefix {
        self.prefix
    }

    /// Builds the backend key for `suffix`.
    ///
    /// Returns `None` for the empty string suffix.
    #[must_use]
    pub fn generate_key<K: KeySuffix>(&self, suffix: K) -> Option<Vec<u8>> {
        generate_key(&self.prefix, &suffix)
    }

    fn key<K: KeySuffix>(&self, suffix: K) -> CoreResult<Vec<u8>> {
        self.generate_key(suffix).ok_or(CoreError::EmptyKeySuffix)
    }

    fn decode<V: Decode>(bytes: &[u8]) -> CoreResult<V> {
        V::decode(bytes).map_err(|source| CoreError::Deserialization {
            type_name: V::TYPE_NAME,
            source,
        })
    }

    /// Stores `value` under `suffix`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Fails if the store is not initialized, the suffix is empty, or the
    /// backend write fails.
    pub fn put<K: KeySuffix, V: Encode + ?Sized>(&self, suffix: K, value: &V) -> CoreResult<()> {
        let key = self.key(suffix)?;
        let bytes = value.encode()?;
        trace!(key = %describe_key(&key), len = bytes.len(), "put");
        self.shared
            .with_backend(self.generation, |backend| Ok(backend.put(&key, &bytes)?))
    }

    /// Returns the value under `suffix`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Deserialization`] if a value is present but
    /// cannot be decoded as `V`. Absence is never an error.
    pub fn get<V: Decode, K: KeySuffix>(&self, suffix: K) -> CoreResult<Option<V>> {
        let key = self.key(suffix)?;
        let bytes = self
            .shared
            .with_backend(self.generation, |backend| Ok(backend.get(&key)?))?;
        bytes.map(|b| Self::decode(&b)).transpose()
    }

    /// Returns the value under `suffix`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ElementNotFound`] if absent, plus the errors of
    /// [`Namespace::get`].
    pub fn get_required<V: Decode, K: KeySuffix>(&self, suffix: K) -> CoreResult<V> {
        let key = self.key(suffix)?;
        let bytes = self
            .shared
            .with_backend(self.generation, |backend| Ok(backend.get(&key)?))?;
        match bytes {
            Some(b) => Self::decode(&b),
            None => Err(CoreError::element_not_found(describe_key(&key))),
        }
    }

    /// Returns the value under `suffix`, or the type's minimum value if absent.
    ///
    /// # Errors
    ///
    /// Same as [`Namespace::get`].
    pub fn get_or_sentinel<V: Decode + AbsentSentinel, K: KeySuffix>(
        &self,
        suffix: K,
    ) -> CoreResult<V> {
        Ok(self.get(suffix)?.unwrap_or(V::ABSENT))
    }

    /// Removes the entry under `suffix` if present.
    ///
    /// # Errors
    ///
    /// Fails if the store is not initialized or the backend write fails.
    pub fn remove<K: KeySuffix>(&self, suffix: K) -> CoreResult<()> {
        let key = self.key(suffix)?;
        self.shared
            .with_backend(self.generation, |backend| Ok(backend.delete(&key)?))
    }

    /// Returns `true` if an entry exists under `suffix`.
    ///
    /// Prefer [`Namespace::get`] when the value is needed anyway.
    ///
    /// # Errors
    ///
    /// Fails if the store is not initialized.
    pub fn contains<K: KeySuffix>(&self, suffix: K) -> CoreResult<bool> {
        let key = self.key(suffix)?;
        self.shared
            .with_backend(self.generation, |backend| Ok(backend.get(&key)?.is_some()))
    }

    /// Adds `value` to the set under `suffix` unless already present.
    ///
    /// Returns `true` if the value was added. Concurrent set mutations on
    /// the same key are serialized, so none is lost.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Deserialization`] if the stored value is not an
    /// `i64` array.
    pub fn add_to_set<K: KeySuffix>(&self, suffix: K, value: i64) -> CoreResult<bool> {
        let key = self.key(suffix)?;
        self.shared.with_backend(self.generation, |backend| {
            let _guard = self.shared.set_locks().lock(&key);
            let added = set::add_to_set(backend, &key, value)?;
            trace!(key = %describe_key(&key), value, added, "add_to_set");
            Ok(added)
        })
    }

    /// Removes `value` from the set under `suffix`.
    ///
    /// # Errors
    ///
    /// Same as [`Namespace::add_to_set`].
    pub fn remove_from_set<K: KeySuffix>(&self, suffix: K, value: i64) -> CoreResult<SetRemoval> {
        let key = self.key(suffix)?;
        self.shared.with_backend(self.generation, |backend| {
            let _guard = self.shared.set_locks().lock(&key);
            let outcome = set::remove_from_set(backend, &key, value)?;
            trace!(key = %describe_key(&key), value, ?outcome, "remove_from_set");
            Ok(outcome)
        })
    }

    /// Returns `true` if the set under `suffix` contains `value`.
    ///
    /// # Errors
    ///
    /// Same as [`Namespace::add_to_set`].
    pub fn contains_element<K: KeySuffix>(&self, suffix: K, value: i64) -> CoreResult<bool> {
        let key = self.key(suffix)?;
        self.shared
            .with_backend(self.generation, |backend| set::contains_element(backend, &key, value))
    }

    /// Returns the set under `suffix` in insertion order, empty if absent.
    ///
    /// # Errors
    ///
    /// Same as [`Namespace::add_to_set`].
    pub fn get_set<K: KeySuffix>(&self, suffix: K) -> CoreResult<Vec<i64>> {
        let key = self.key(suffix)?;
        self.shared
            .with_backend(self.generation, |backend| set::get_set(backend, &key))
    }

    /// Returns every `(suffix, value)` pair of this namespace in key order.
    ///
    /// # Errors
    ///
    /// Fails if the store is not initialized.
    pub fn entries(&self) -> CoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let prefix = self.prefix;
        self.shared.with_backend(self.generation, |backend| {
            let entries = backend.scan_prefix(prefix.as_bytes())?;
            Ok(entries
                .into_iter()
                .filter_map(|(key, value)| {
                    Prefix::split_key(&key).map(|(_, suffix)| (suffix.to_vec(), value))
                })
                .collect())
        })
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("prefix", &self.prefix)
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store;
    use nskv_codec::Object;
    use serde::{Deserialize, Serialize};

    fn store() -> Store {
        let store = Store::new();
        store.initialize_in_memory().unwrap();
        store
    }

    #[test]
    fn put_get_each_value_type() {
        let store = store();
        let ns = store.namespace(1).unwrap();

        ns.put(1i64, &i16::MIN).unwrap();
        ns.put(2i64, &i32::MAX).unwrap();
        ns.put(3i64, &-7i64).unwrap();
        ns.put(4i64, &true).unwrap();
        ns.put(5i64, "text").unwrap();
        ns.put(6i64, &vec![1i64, 2, 3]).unwrap();

        assert_eq!(ns.get::<i16, _>(1i64).unwrap(), Some(i16::MIN));
        assert_eq!(ns.get::<i32, _>(2i64).unwrap(), Some(i32::MAX));
        assert_eq!(ns.get::<i64, _>(3i64).unwrap(), Some(-7));
        assert_eq!(ns.get::<bool, _>(4i64).unwrap(), Some(true));
        assert_eq!(ns.get::<String, _>(5i64).unwrap().as_deref(), Some("text"));
        assert_eq!(ns.get::<Vec<i64>, _>(6i64).unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn object_values_roundtrip() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Band {
            name: String,
            members: Vec<String>,
        }

        let store = store();
        let ns = store.namespace(1).unwrap();
        let band = Object(Band {
            name: "Gojira".into(),
            members: vec!["Joe".into(), "Mario".into()],
        });

        ns.put("gojira", &band).unwrap();
        assert_eq!(ns.get::<Object<Band>, _>("gojira").unwrap(), Some(band));
    }

    #[test]
    fn suffix_types_are_distinct_keys() {
        let store = store();
        let ns = store.namespace(1).unwrap();

        ns.put(1i16, &16i32).unwrap();
        ns.put(1i32, &32i32).unwrap();
        ns.put(1i64, &64i32).unwrap();

        assert_eq!(ns.get::<i32, _>(1i16).unwrap(), Some(16));
        assert_eq!(ns.get::<i32, _>(1i32).unwrap(), Some(32));
        assert_eq!(ns.get::<i32, _>(1i64).unwrap(), Some(64));
    }

    #[test]
    fn i64_get_is_not_narrowed() {
        let store = store();
        let ns = store.namespace(1).unwrap();
        let wide = (1i64 << 40) + 0x1234;

        ns.put("wide", &wide).unwrap();
        assert_eq!(ns.get::<i64, _>("wide").unwrap(), Some(wide));
    }

    #[test]
    fn absent_values() {
        let store = store();
        let ns = store.namespace(1).unwrap();

        assert_eq!(ns.get::<String, _>("missing").unwrap(), None);
        assert_eq!(ns.get::<Vec<i64>, _>("missing").unwrap(), None);
        assert_eq!(ns.get_or_sentinel::<i16, _>("missing").unwrap(), i16::MIN);
        assert_eq!(ns.get_or_sentinel::<i32, _>("missing").unwrap(), i32::MIN);
        assert_eq!(ns.get_or_sentinel::<i64, _>("missing").unwrap(), i64::MIN);

        let err = ns.get_required::<i32, _>("missing").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "element not found: 1/missing");
    }

    #[test]
    fn wrong_type_is_deserialization_error() {
        let store = store();
        let ns = store.namespace(1).unwrap();
        ns.put("flag", &true).unwrap();

        let err = ns.get::<i64, _>("flag").unwrap_err();
        assert!(matches!(
            err,
            CoreError::Deserialization { type_name: "i64", .. }
        ));
    }

    #[test]
    fn scalar_blob_is_not_read_as_array_or_string() {
        let store = store();
        let ns = store.namespace(1).unwrap();
        ns.put("n", &i32::MIN).unwrap();
        ns.put("s", &0x6141_4243i32).unwrap();

        assert!(matches!(
            ns.get::<Vec<i64>, _>("n"),
            Err(CoreError::Deserialization { type_name: "Vec<i64>", .. })
        ));
        assert!(matches!(
            ns.get::<String, _>("s"),
            Err(CoreError::Deserialization { type_name: "String", .. })
        ));
    }

    #[test]
    fn add_to_set_over_scalar_keeps_the_scalar() {
        let store = store();
        let ns = store.namespace(1).unwrap();
        ns.put("n", &i32::MIN).unwrap();

        assert!(matches!(
            ns.add_to_set("n", 5),
            Err(CoreError::Deserialization { .. })
        ));
        assert!(matches!(
            ns.remove_from_set("n", 5),
            Err(CoreError::Deserialization { .. })
        ));
        assert_eq!(ns.get::<i32, _>("n").unwrap(), Some(i32::MIN));
    }

    #[test]
    fn empty_suffix_is_rejected() {
        let store = store();
        let ns = store.namespace(1).unwrap();

        assert_eq!(ns.generate_key(""), None);
        assert!(matches!(ns.put("", &1i32), Err(CoreError::EmptyKeySuffix)));
        assert!(matches!(ns.get::<i32, _>(""), Err(CoreError::EmptyKeySuffix)));
        assert!(matches!(ns.add_to_set("", 1), Err(CoreError::EmptyKeySuffix)));
    }

    #[test]
    fn remove_and_contains() {
        let store = store();
        let ns = store.namespace(1).unwrap();

        ns.put(9i64, &1i32).unwrap();
        assert!(ns.contains(9i64).unwrap());
        ns.remove(9i64).unwrap();
        assert!(!ns.contains(9i64).unwrap());
        ns.remove(9i64).unwrap();
    }

    #[test]
    fn namespaces_are_isolated() {
        let store = store();
        let a = store.namespace(1).unwrap();
        let b = store.namespace(2).unwrap();

        a.put("shared", "from a").unwrap();
        b.put("shared", "from b").unwrap();
        a.add_to_set("set", 1).unwrap();

        assert_eq!(a.get::<String, _>("shared").unwrap().as_deref(), Some("from a"));
        assert_eq!(b.get::<String, _>("shared").unwrap().as_deref(), Some("from b"));
        assert!(b.get_set("set").unwrap().is_empty());
    }

    #[test]
    fn set_operations() {
        let store = store();
        let ns = store.namespace(7).unwrap();

        assert!(ns.add_to_set("tags", 1).unwrap());
        assert!(ns.add_to_set("tags", 2).unwrap());
        assert!(!ns.add_to_set("tags", 1).unwrap());
        assert!(ns.contains_element("tags", 2).unwrap());

        assert_eq!(ns.remove_from_set("tags", 2).unwrap(), SetRemoval::Removed);
        assert_eq!(ns.remove_from_set("tags", 2).unwrap(), SetRemoval::NotFound);
        assert_eq!(ns.get_set("tags").unwrap(), vec![1]);
    }

    #[test]
    fn set_is_readable_as_array() {
        let store = store();
        let ns = store.namespace(7).unwrap();
        ns.add_to_set(5i64, 10).unwrap();

        assert_eq!(ns.get::<Vec<i64>, _>(5i64).unwrap(), Some(vec![10]));
    }

    #[test]
    fn entries_are_scoped_to_prefix() {
        let store = store();
        let a = store.namespace(1).unwrap();
        let b = store.namespace(2).unwrap();
        a.put("x", &1i16).unwrap();
        a.put("y", &2i16).unwrap();
        b.put("z", &3i16).unwrap();

        let entries = a.entries().unwrap();
        let suffixes: Vec<&[u8]> = entries.iter().map(|(k, _)| k.as_slice()).collect();
        assert_eq!(suffixes, vec![b"x".as_slice(), b"y".as_slice()]);
    }

    #[test]
    fn clones_share_prefix() {
        let store = store();
        let ns = store.namespace(3).unwrap();
        let other = ns.clone();

        ns.put(1i32, &5i32).unwrap();
        assert_eq!(other.get::<i32, _>(1i32).unwrap(), Some(5));
        assert_eq!(other.prefix(), Prefix::new(3));
    }

    #[test]
    fn concurrent_set_adds_are_not_lost() {
        let store = store();
        let ns = store.namespace(11).unwrap();

        std::thread::scope(|scope| {
            for t in 0..8i64 {
                let ns = ns.clone();
                scope.spawn(move || {
                    for i in 0..50 {
                        ns.add_to_set("members", t * 1000 + i).unwrap();
                    }
                });
            }
        });

        let mut members = ns.get_set("members").unwrap();
        assert_eq!(members.len(), 8 * 50);
        members.sort_unstable();
        members.dedup();
        assert_eq!(members.len(), 8 * 50);
    }
}
