//! Cache Facade
//!
//! The public cache surface. Coordinates the entry store and the hook bus,
//! owns the expiry sweeper task, and bridges to the serialization codec.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::codec::{Codec, JsonCodec};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::hooks::{CacheEvent, HookBus, HookPayload};
use crate::store::{CacheStats, CacheStore};
use crate::tasks::spawn_sweeper;
use crate::value::CacheValue;

/// Store and hook bus behind one lock, so listeners observe exactly the
/// state the triggering operation mutates.
pub(crate) struct Shared {
    pub(crate) store: CacheStore,
    pub(crate) hooks: HookBus,
}

/// An in-memory key-value cache with per-entry TTL expiration, lifecycle
/// hooks, hit/miss statistics, and serialize/restore.
///
/// With a nonzero `check_period` the constructor spawns the expiry sweeper
/// and must therefore run inside a tokio runtime. A `check_period` of zero
/// skips the sweeper and all TTL bookkeeping: the cache degenerates to a
/// plain map with manual deletion only.
///
/// Each instance owns an independent store, metadata, timer, and listener
/// set. Dropping the cache stops its sweeper.
pub struct Cache {
    config: CacheConfig,
    shared: Arc<RwLock<Shared>>,
    codec: Box<dyn Codec>,
    sweeper: Option<JoinHandle<()>>,
}

impl Cache {
    /// Creates a cache with the default JSON codec.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_codec(config, Box::new(JsonCodec::new()))
    }

    /// Creates a cache around a custom serialization codec.
    pub fn with_codec(config: CacheConfig, codec: Box<dyn Codec>) -> Self {
        let shared = Arc::new(RwLock::new(Shared {
            store: CacheStore::new(config.max_keys, config.check_period > 0),
            hooks: HookBus::new(),
        }));

        let sweeper = (config.check_period > 0).then(|| {
            spawn_sweeper(
                Arc::clone(&shared),
                Duration::from_secs(config.check_period),
                config.delete_on_expire,
            )
        });

        Self {
            config,
            shared,
            codec,
            sweeper,
        }
    }

    /// The configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn read(&self) -> RwLockReadGuard<'_, Shared> {
        self.shared.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Shared> {
        self.shared.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts or overwrites `key` with the configured default TTL.
    pub fn set(&self, key: impl Into<String>, value: impl Into<CacheValue>) -> Result<()> {
        self.set_with_ttl(key, value, self.config.ttl)
    }

    /// Inserts or overwrites `key` with an explicit TTL in seconds.
    ///
    /// A TTL of zero makes the entry permanent. The TTL only takes effect
    /// when the key is new; overwriting leaves the existing countdown
    /// untouched.
    ///
    /// Fails with [`crate::CacheError::CapacityExceeded`] when a brand-new
    /// key would pass the key ceiling; nothing mutates and no hook fires in
    /// that case.
    pub fn set_with_ttl(
        &self,
        key: impl Into<String>,
        value: impl Into<CacheValue>,
        ttl_secs: u64,
    ) -> Result<()> {
        let key = key.into();
        let value = value.into();

        let mut shared = self.write();
        let Shared { store, hooks } = &mut *shared;

        // Capacity gate runs before any hook fires or state changes
        store.ensure_capacity_for(&key)?;

        hooks.emit(
            CacheEvent::BeforeSet,
            &HookPayload::Set {
                key: &key,
                value: &value,
            },
        );
        store.put(key.clone(), value, ttl_secs)?;
        if let Some(stored) = store.peek(&key) {
            hooks.emit(
                CacheEvent::AfterSet,
                &HookPayload::Set {
                    key: &key,
                    value: stored,
                },
            );
        }
        Ok(())
    }

    /// Returns the value for `key`, counting a hit or a miss.
    ///
    /// `None` is the normal, expected outcome for absent keys, and is
    /// distinguishable from a stored [`CacheValue::Null`].
    pub fn get(&self, key: &str) -> Option<CacheValue> {
        self.write().store.get(key)
    }

    /// Values for exactly the requested keys; absent keys map to `None`
    /// rather than being omitted.
    pub fn get_many<'a, I>(&self, keys: I) -> HashMap<String, Option<CacheValue>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.read().store.get_many(keys)
    }

    /// Every key mapped to its value.
    pub fn get_all(&self) -> HashMap<String, CacheValue> {
        self.read().store.get_all()
    }

    /// All keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.read().store.keys()
    }

    /// All values, in the insertion order of their keys.
    pub fn values(&self) -> Vec<CacheValue> {
        self.read().store.values()
    }

    /// Current number of entries.
    pub fn size(&self) -> usize {
        self.read().store.len()
    }

    /// Checks if the cache contains `key`. Does not touch statistics.
    pub fn has(&self, key: &str) -> bool {
        self.read().store.contains(key)
    }

    /// Deletes `key`, firing the delete hook pair around the removal.
    ///
    /// A no-op for absent keys; the hook pair still fires. Returns whether
    /// the key was present.
    pub fn delete(&self, key: &str) -> bool {
        let mut shared = self.write();
        let Shared { store, hooks } = &mut *shared;

        hooks.emit(CacheEvent::BeforeDelete, &HookPayload::Delete { key });
        let removed = store.remove(key);
        hooks.emit(CacheEvent::AfterDelete, &HookPayload::Delete { key });
        removed
    }

    /// Deletes each key in turn. The batch is sequential per key, never
    /// transactional: each key gets its own hook pair independently.
    /// Returns how many keys were actually removed.
    pub fn delete_many<'a, I>(&self, keys: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        keys.into_iter().filter(|key| self.delete(key)).count()
    }

    /// Empties the cache. Hit and miss counters survive.
    pub fn flush_all(&self) {
        self.write().store.clear();
    }

    /// Current hit/miss counters and size.
    pub fn stats(&self) -> CacheStats {
        self.read().store.stats()
    }

    /// Adds `listener` at the end of the listener list for `event`.
    pub fn on<F>(&self, event: CacheEvent, listener: F)
    where
        F: Fn(&HookPayload<'_>) + Send + Sync + 'static,
    {
        self.write().hooks.on(event, listener);
    }

    /// Encodes current entries and TTL metadata to a portable string.
    pub fn serialize(&self) -> Result<String> {
        let snapshot = self.read().store.snapshot();
        self.codec.encode(&snapshot)
    }

    /// Decodes `blob` and upserts every key it contains.
    ///
    /// Existing keys are overwritten in both value and TTL, and every
    /// restored key starts a fresh countdown at restore time rather than
    /// inheriting the snapshot's age.
    pub fn deserialize(&self, blob: &str) -> Result<()> {
        let snapshot = self.codec.decode(blob)?;
        let restored = self.write().store.restore(snapshot);
        debug!("restored {} entries from blob", restored);
        Ok(())
    }

    /// Stops the sweeper and detaches all listeners.
    ///
    /// Double disposal is a no-op. The instance keeps working as a plain
    /// map afterward, though continued use is not part of the contract.
    pub fn dispose(&mut self) {
        if let Some(handle) = self.sweeper.take() {
            handle.abort();
            debug!("expiry sweeper stopped");
        }
        self.write().hooks.clear();
    }
}

impl Drop for Cache {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn plain_map_config() -> CacheConfig {
        CacheConfig::default().with_check_period(0)
    }

    #[test]
    fn test_cache_set_get_has() {
        let cache = Cache::new(plain_map_config());

        cache.set("key1", "value1").unwrap();

        assert!(cache.has("key1"));
        assert_eq!(cache.get("key1"), Some("value1".into()));
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_cache_capacity_error_fires_no_hooks() {
        let cache = Cache::new(plain_map_config().with_max_keys(1));
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fired);
        cache.on(CacheEvent::BeforeSet, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        cache.set("key1", "v").unwrap();
        assert!(cache.set("key2", "v").is_err());

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_cache_delete_hooks_fire_for_absent_key() {
        let cache = Cache::new(plain_map_config());
        let fired = Arc::new(AtomicUsize::new(0));

        for event in [CacheEvent::BeforeDelete, CacheEvent::AfterDelete] {
            let counter = Arc::clone(&fired);
            cache.on(event, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert!(!cache.delete("missing"));
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cache_overwrite_ignores_new_ttl() {
        let cache = Cache::new(plain_map_config());

        cache.set_with_ttl("key1", "v1", 10).unwrap();
        cache.set_with_ttl("key1", "v2", 99).unwrap();

        assert_eq!(cache.get("key1"), Some("v2".into()));
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_cache_dispose_detaches_listeners() {
        let mut cache = Cache::new(plain_map_config());
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fired);
        cache.on(CacheEvent::AfterSet, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        cache.set("key1", "v").unwrap();
        cache.dispose();
        cache.dispose(); // double disposal is a no-op
        cache.set("key2", "v").unwrap();

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(cache.size(), 2);
    }
}
