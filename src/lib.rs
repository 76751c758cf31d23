//! tinycache - A lightweight in-memory key-value cache
//!
//! Provides per-entry TTL expiration, lifecycle hooks, hit/miss statistics,
//! and serialize/restore through a pluggable codec.
//!
//! ```no_run
//! use tinycache::{Cache, CacheConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> tinycache::Result<()> {
//! let cache = Cache::new(CacheConfig::default().with_ttl(120).with_check_period(10));
//!
//! cache.set("session", "opaque token")?;
//! assert!(cache.has("session"));
//!
//! // TTL of zero makes an entry permanent
//! cache.set_with_ttl("pinned", "never swept", 0)?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod hooks;
pub mod store;
pub mod value;

mod tasks;

pub use cache::Cache;
pub use codec::{CacheSnapshot, Codec, JsonCodec};
pub use config::{CacheConfig, DEFAULT_CHECK_PERIOD};
pub use error::{CacheError, Result};
pub use hooks::{CacheEvent, ExpiredNotice, HookPayload};
pub use store::CacheStats;
pub use value::CacheValue;
