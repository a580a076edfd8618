//! # NSKV Testkit
//!
//! Test utilities for NSKV.
//!
//! This crate provides:
//! - Test fixtures for in-memory and directory-backed stores
//! - Property-based test generators using proptest
//! - Stress testing utilities for concurrent set mutation
//!
//! ## Usage
//!
//! ```rust
//! use nskv_testkit::prelude::*;
//!
//! with_temp_store(|store| {
//!     let ns = store.namespace(1).unwrap();
//!     ns.put("k", &1i32).unwrap();
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
