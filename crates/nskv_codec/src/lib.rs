//! # NSKV Codec
//!
//! Key layout and value encoding for NSKV.
//!
//! This crate turns typed suffixes and values into the bytes handed to the
//! backend:
//! - [`generate_key`] builds `prefix ++ suffix` keys deterministically
//! - [`Encode`] / [`Decode`] convert typed values to and from byte blobs
//!
//! ## Key Layout
//!
//! ```text
//! [8 bytes prefix][2|4|8 bytes big-endian integer | UTF-8 string bytes]
//! ```
//!
//! ## Value Layout
//!
//! - `i16`, `i32`, `i64`: big-endian two's complement, fixed width
//! - `bool`: one byte, `0` or `1`
//! - `String`, `Vec<i64>`, [`Object<T>`]: CBOR via serde
//!
//! CBOR blobs carry no format version. A blob decodes only with the same
//! encoding that produced it.
//!
//! Values carry no type tag; the accessor's type decides how a blob is read.
//! A CBOR read must consume the whole blob as exactly one item, so most
//! mismatched reads fail. Short fixed-width integers can still happen to be
//! valid CBOR (two bytes `0x61 0x00` read as the one-character string
//! `"\0"`), and such reads succeed.
//!
//! ## Usage
//!
//! ```
//! use nskv_codec::{generate_key, Decode, Encode, Prefix};
//!
//! let prefix = Prefix::new(42);
//! let key = generate_key(&prefix, &7i64).unwrap();
//! assert_eq!(key.len(), 16);
//!
//! let bytes = 99i64.encode().unwrap();
//! assert_eq!(i64::decode(&bytes).unwrap(), 99);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod key;
mod value;

pub use error::{CodecError, CodecResult};
pub use key::{describe_key, generate_key, KeySuffix, Prefix, PREFIX_LEN};
pub use value::{AbsentSentinel, Decode, Encode, Object};
