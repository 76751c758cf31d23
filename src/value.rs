//! Cache Value Model
//!
//! The closed set of value shapes the cache can store.

use chrono::{DateTime, Utc};

/// A value storable in the cache.
///
/// The variant set is closed: primitives, ordered containers, and string-keyed
/// records, recursively. Numbers keep IEEE-754 semantics verbatim; NaN and the
/// infinities are stored as-is, never coerced. `Set` and `Map` are
/// insertion-ordered sequences keyed by values from the same model. The cache
/// never hashes or deep-compares stored values on its own; equality is only
/// defined for callers comparing what they get back out.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    BigInt(i128),
    Date(DateTime<Utc>),
    List(Vec<CacheValue>),
    Set(Vec<CacheValue>),
    Map(Vec<(CacheValue, CacheValue)>),
    Record(Vec<(String, CacheValue)>),
}

impl PartialEq for CacheValue {
    fn eq(&self, other: &Self) -> bool {
        use CacheValue::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            // NaN compares equal to itself so a round-tripped NaN is still
            // "the same value" to callers
            (Number(a), Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (String(a), String(b)) => a == b,
            (BigInt(a), BigInt(b)) => a == b,
            (Date(a), Date(b)) => a == b,
            (List(a), List(b)) => a == b,
            (Set(a), Set(b)) => a == b,
            (Map(a), Map(b)) => a == b,
            (Record(a), Record(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for CacheValue {
    fn from(v: bool) -> Self {
        CacheValue::Bool(v)
    }
}

impl From<f64> for CacheValue {
    fn from(v: f64) -> Self {
        CacheValue::Number(v)
    }
}

impl From<i128> for CacheValue {
    fn from(v: i128) -> Self {
        CacheValue::BigInt(v)
    }
}

impl From<&str> for CacheValue {
    fn from(v: &str) -> Self {
        CacheValue::String(v.to_string())
    }
}

impl From<String> for CacheValue {
    fn from(v: String) -> Self {
        CacheValue::String(v)
    }
}

impl From<DateTime<Utc>> for CacheValue {
    fn from(v: DateTime<Utc>) -> Self {
        CacheValue::Date(v)
    }
}

impl From<Vec<CacheValue>> for CacheValue {
    fn from(v: Vec<CacheValue>) -> Self {
        CacheValue::List(v)
    }
}
