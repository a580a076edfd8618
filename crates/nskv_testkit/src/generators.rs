//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random test data
//! that maintains required invariants.

use nskv_codec::Prefix;
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

/// Strategy for generating namespace prefixes.
pub fn prefix_strategy() -> impl Strategy<Value = Prefix> {
    any::<i64>().prop_map(Prefix::new)
}

/// Strategy for generating pairs of distinct prefixes.
pub fn distinct_prefixes_strategy() -> impl Strategy<Value = (Prefix, Prefix)> {
    (any::<i64>(), any::<i64>())
        .prop_filter("Prefixes must differ", |(a, b)| a != b)
        .prop_map(|(a, b)| (Prefix::new(a), Prefix::new(b)))
}

/// Strategy for generating valid string suffixes (never empty).
pub fn string_suffix_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9_:/.-]{1,32}").expect("Invalid regex")
}

/// Strategy for generating namespace names.
pub fn namespace_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,23}").expect("Invalid regex")
}

/// Strategy for generating a sequence of set additions with repeats.
pub fn set_additions_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(-20i64..20, 0..64)
}

/// Strategy for generating a set of distinct elements.
pub fn distinct_elements_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::hash_set(any::<i64>(), 0..32).prop_map(|set| set.into_iter().collect())
}

/// A structured record used to exercise object values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    /// Display name.
    pub name: String,
    /// Numeric score.
    pub score: i64,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Optional flag.
    pub active: Option<bool>,
}

/// Strategy for generating object values.
pub fn record_strategy() -> impl Strategy<Value = TestRecord> {
    (
        ".{0,24}",
        any::<i64>(),
        prop::collection::vec("[a-z]{1,8}", 0..6),
        any::<Option<bool>>(),
    )
        .prop_map(|(name, score, tags, active)| TestRecord {
            name,
            score,
            tags,
            active,
        })
}
