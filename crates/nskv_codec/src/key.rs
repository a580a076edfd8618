//! Namespaced key layout.

use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::fmt;

/// Length of every namespace prefix in bytes.
pub const PREFIX_LEN: usize = 8;

/// The 8-byte identifier that separates one namespace's keys from all others.
///
/// A prefix is the big-endian encoding of a signed 64-bit identifier, so
/// prefixes sort the same way their identifiers do within each sign.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Prefix([u8; PREFIX_LEN]);

impl Prefix {
    /// Creates a prefix from a numeric identifier.
    #[inline]
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id.to_be_bytes())
    }

    /// Derives a prefix from a human-readable namespace name.
    ///
    /// Uses the first 8 bytes of the SHA-256 digest of the UTF-8 name, so the
    /// same name maps to the same prefix across processes and platforms.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let digest = Sha256::digest(name.as_bytes());
        let mut bytes = [0u8; PREFIX_LEN];
        bytes.copy_from_slice(&digest[..PREFIX_LEN]);
        Self(bytes)
    }

    /// Creates a prefix from raw bytes.
    #[inline]
    #[must_use]
    pub const fn from_bytes(bytes: [u8; PREFIX_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the numeric identifier.
    #[must_use]
    pub const fn id(&self) -> i64 {
        i64::from_be_bytes(self.0)
    }

    /// Returns the raw bytes.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; PREFIX_LEN] {
        &self.0
    }

    /// Splits a stored key into its prefix and suffix bytes.
    ///
    /// Returns `None` if the key is shorter than a prefix.
    #[must_use]
    pub fn split_key(key: &[u8]) -> Option<(Self, &[u8])> {
        if key.len() < PREFIX_LEN {
            return None;
        }
        let (head, suffix) = key.split_at(PREFIX_LEN);
        let mut bytes = [0u8; PREFIX_LEN];
        bytes.copy_from_slice(head);
        Some((Self(bytes), suffix))
    }
}

impl fmt::Debug for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Prefix({})", self.id())
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl From<i64> for Prefix {
    fn from(id: i64) -> Self {
        Self::new(id)
    }
}

impl From<Prefix> for [u8; PREFIX_LEN] {
    fn from(prefix: Prefix) -> Self {
        prefix.0
    }
}

/// A caller-supplied logical key within a namespace.
///
/// Integer suffixes encode as fixed-width big-endian two's complement.
/// String suffixes encode as their raw UTF-8 bytes; the empty string has
/// no encoding.
///
/// An older layout hashed string suffixes into a 64-bit integer and stored
/// that instead. Keys written that way are not readable through this
/// layout, and distinct strings could collide under it.
pub trait KeySuffix {
    /// Returns the suffix bytes, or `None` if this suffix cannot form a key.
    fn suffix_bytes(&self) -> Option<Cow<'_, [u8]>>;
}

macro_rules! int_suffix {
    ($($ty:ty),*) => {
        $(
            impl KeySuffix for $ty {
                fn suffix_bytes(&self) -> Option<Cow<'_, [u8]>> {
                    Some(Cow::Owned(self.to_be_bytes().to_vec()))
                }
            }
        )*
    };
}

int_suffix!(i16, i32, i64);

impl KeySuffix for str {
    fn suffix_bytes(&self) -> Option<Cow<'_, [u8]>> {
        if self.is_empty() {
            None
        } else {
            Some(Cow::Borrowed(self.as_bytes()))
        }
    }
}

impl KeySuffix for String {
    fn suffix_bytes(&self) -> Option<Cow<'_, [u8]>> {
        self.as_str().suffix_bytes()
    }
}

impl<T: KeySuffix + ?Sized> KeySuffix for &T {
    fn suffix_bytes(&self) -> Option<Cow<'_, [u8]>> {
        (**self).suffix_bytes()
    }
}

/// Renders a stored key as `prefix/suffix` for logs and tooling.
///
/// Printable UTF-8 suffixes are shown as text, anything else as hex.
#[must_use]
pub fn describe_key(key: &[u8]) -> String {
    let Some((prefix, suffix)) = Prefix::split_key(key) else {
        return format!("<short key {}>", hex(key));
    };
    match std::str::from_utf8(suffix) {
        Ok(text) if !text.is_empty() && !text.chars().any(char::is_control) => {
            format!("{prefix}/{text}")
        }
        _ => format!("{prefix}/0x{}", hex(suffix)),
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Builds the backend key for `suffix` within the namespace `prefix`.
///
/// Returns `None` for suffixes with no encoding (the empty string).
/// The result is a pure function of its inputs.
#[must_use]
pub fn generate_key<K: KeySuffix + ?Sized>(prefix: &Prefix, suffix: &K) -> Option<Vec<u8>> {
    let suffix = suffix.suffix_bytes()?;
    let mut key = Vec::with_capacity(PREFIX_LEN + suffix.len());
    key.extend_from_slice(prefix.as_bytes());
    key.extend_from_slice(&suffix);
    Some(key)
}
