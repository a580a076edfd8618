//! # NSKV Core
//!
//! Namespaced, typed key-value access over one shared ordered store.
//!
//! This crate provides:
//! - [`Store`], the context owning the backend and its lifecycle
//! - [`Namespace`], a typed view over one unique key prefix
//! - Integer sets stored as single array values, with per-key serialized
//!   mutation
//! - Guarded destruction of all data through [`Store::wipe`]
//!
//! ## Example
//!
//! ```rust
//! use nskv_core::{Store, WIPE_CONFIRMATION};
//!
//! let store = Store::new();
//! store.initialize_in_memory().unwrap();
//!
//! let followers = store.namespace_named("followers").unwrap();
//! followers.add_to_set(1i64, 2).unwrap();
//! followers.add_to_set(1i64, 3).unwrap();
//! assert!(followers.contains_element(1i64, 3).unwrap());
//!
//! assert!(store.wipe(WIPE_CONFIRMATION).unwrap());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod namespace;
mod registry;
mod set;
mod store;

pub use config::{Config, PATH_ENV};
pub use error::{CoreError, CoreResult};
pub use namespace::Namespace;
pub use registry::PrefixRegistry;
pub use set::{SetLocks, SetRemoval};
pub use store::{Store, WIPE_CONFIRMATION};

pub use nskv_codec::{describe_key, AbsentSentinel, Decode, Encode, KeySuffix, Object, Prefix};

/// Version of the NSKV crates.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
