//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Missing keys, empty batches, and double disposal are deliberately not
/// errors; they are no-ops or absent results.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Inserting a brand-new key would exceed the configured key ceiling.
    /// Raised synchronously by `set`; no mutation occurs.
    #[error("max keys limit of {limit} exceeded")]
    CapacityExceeded { limit: usize },

    /// The codec rejected the shape of a blob during deserialization
    #[error("malformed cache blob: {0}")]
    MalformedBlob(String),

    /// JSON encode/decode failure in the default codec
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
