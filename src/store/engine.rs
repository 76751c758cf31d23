//! Cache Store Engine
//!
//! The authoritative key-value mapping plus per-key expiry metadata,
//! insertion-order bookkeeping, and hit/miss statistics.

use std::collections::HashMap;

use crate::codec::CacheSnapshot;
use crate::error::{CacheError, Result};
use crate::store::{current_timestamp_ms, CacheEntry, CacheStats, Expiry, KeyOrder};
use crate::value::CacheValue;

// == Cache Store ==
/// Main cache storage with TTL metadata and a hard key ceiling.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage; value and expiry metadata live in one entry record
    entries: HashMap<String, CacheEntry>,
    /// Insertion order of keys
    order: KeyOrder,
    /// Performance statistics
    stats: CacheStats,
    /// Hard ceiling on distinct keys (0 = unbounded)
    max_keys: usize,
    /// When false the sweeper is disabled and expiry metadata is never
    /// written or consulted
    track_expiry: bool,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore.
    ///
    /// # Arguments
    /// * `max_keys` - Hard ceiling on distinct keys, 0 = unbounded
    /// * `track_expiry` - Whether to record expiry metadata on insert
    pub fn new(max_keys: usize, track_expiry: bool) -> Self {
        Self {
            entries: HashMap::new(),
            order: KeyOrder::new(),
            stats: CacheStats::new(),
            max_keys,
            track_expiry,
        }
    }

    // == Capacity ==
    /// Rejects a brand-new key when the store already sits at the ceiling.
    /// Overwrites of existing keys always pass.
    pub fn ensure_capacity_for(&self, key: &str) -> Result<()> {
        if self.max_keys > 0
            && !self.entries.contains_key(key)
            && self.entries.len() >= self.max_keys
        {
            return Err(CacheError::CapacityExceeded {
                limit: self.max_keys,
            });
        }
        Ok(())
    }

    // == Put ==
    /// Inserts or overwrites a key.
    ///
    /// A new key records its expiry exactly once: only when tracking is
    /// enabled and `ttl_secs` is nonzero. Overwriting an existing key
    /// replaces the value and leaves creation time and TTL untouched; the
    /// TTL argument is ignored in that case.
    pub fn put(&mut self, key: String, value: CacheValue, ttl_secs: u64) -> Result<()> {
        self.ensure_capacity_for(&key)?;

        match self.entries.get_mut(&key) {
            Some(entry) => {
                entry.value = value;
            }
            None => {
                let expiry =
                    (self.track_expiry && ttl_secs > 0).then(|| Expiry::starting_now(ttl_secs));
                self.order.push(&key);
                self.entries.insert(key, CacheEntry { value, expiry });
            }
        }

        self.stats.set_size(self.entries.len());
        Ok(())
    }

    // == Get ==
    /// Retrieves a value by key, recording a hit or a miss.
    ///
    /// Presence is an explicit check, never a sentinel comparison: a stored
    /// `Null` still counts as a hit.
    pub fn get(&mut self, key: &str) -> Option<CacheValue> {
        if let Some(entry) = self.entries.get(key) {
            self.stats.record_hit();
            Some(entry.value.clone())
        } else {
            self.stats.record_miss();
            None
        }
    }

    // == Get Many ==
    /// Values for exactly the requested keys; absent keys map to `None`
    /// rather than being omitted.
    ///
    /// Does not touch the hit/miss counters; only `get` counts.
    pub fn get_many<'a, I>(&self, keys: I) -> HashMap<String, Option<CacheValue>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        keys.into_iter()
            .map(|key| {
                (
                    key.to_string(),
                    self.entries.get(key).map(|entry| entry.value.clone()),
                )
            })
            .collect()
    }

    // == Peek ==
    /// Borrows a value without touching statistics.
    pub fn peek(&self, key: &str) -> Option<&CacheValue> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Checks if the store contains `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Remove ==
    /// Deletes a key's value and metadata as one record.
    ///
    /// Idempotent: removing an absent key is a no-op. Returns whether the
    /// key was present.
    pub fn remove(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.order.remove(key);
            self.stats.set_size(self.entries.len());
        }
        removed
    }

    // == Clear ==
    /// Removes all entries and metadata. Hit and miss counters survive.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.stats.set_size(0);
    }

    // == Keys / Values ==
    /// All keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.order.iter().cloned().collect()
    }

    /// All values, in the insertion order of their keys.
    pub fn values(&self) -> Vec<CacheValue> {
        self.order
            .iter()
            .filter_map(|key| self.entries.get(key))
            .map(|entry| entry.value.clone())
            .collect()
    }

    /// Every key mapped to its value.
    pub fn get_all(&self) -> HashMap<String, CacheValue> {
        self.entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect()
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Stats ==
    /// Returns current statistics with the size freshly derived.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_size(self.entries.len());
        stats
    }

    // == Lapsed ==
    /// Scans expiry metadata and returns lapsed `(key, ttl_secs)` pairs in
    /// insertion order.
    ///
    /// Permanent entries carry no metadata and are never reported.
    pub fn lapsed(&self) -> Vec<(String, u64)> {
        let now = current_timestamp_ms();
        self.order
            .iter()
            .filter_map(|key| {
                let expiry = self.entries.get(key)?.expiry?;
                expiry
                    .is_lapsed(now)
                    .then(|| (key.clone(), expiry.ttl_secs))
            })
            .collect()
    }

    // == Snapshot ==
    /// Captures entries and TTL metadata for serialization, in insertion
    /// order. Permanent entries get no TTL record.
    pub fn snapshot(&self) -> CacheSnapshot {
        let entries = self
            .order
            .iter()
            .filter_map(|key| {
                self.entries
                    .get(key)
                    .map(|entry| (key.clone(), entry.value.clone()))
            })
            .collect();
        let ttls = self
            .order
            .iter()
            .filter_map(|key| {
                let expiry = self.entries.get(key)?.expiry?;
                Some((key.clone(), expiry.ttl_secs))
            })
            .collect();
        CacheSnapshot { entries, ttls }
    }

    // == Restore ==
    /// Upserts a decoded snapshot into the store.
    ///
    /// Existing keys are overwritten in both value and TTL, and every
    /// restored key starts a fresh countdown now rather than inheriting the
    /// snapshot's age. Keys without a TTL record become permanent. The key
    /// ceiling is not enforced here. Returns the number of upserted keys.
    pub fn restore(&mut self, snapshot: CacheSnapshot) -> usize {
        let CacheSnapshot { entries, ttls } = snapshot;
        let ttls: HashMap<String, u64> = ttls.into_iter().collect();

        let restored = entries.len();
        for (key, value) in entries {
            let ttl_secs = ttls.get(&key).copied().unwrap_or(0);
            let expiry =
                (self.track_expiry && ttl_secs > 0).then(|| Expiry::starting_now(ttl_secs));
            match self.entries.get_mut(&key) {
                Some(entry) => {
                    entry.value = value;
                    entry.expiry = expiry;
                }
                None => {
                    self.order.push(&key);
                    self.entries.insert(key, CacheEntry { value, expiry });
                }
            }
        }

        self.stats.set_size(self.entries.len());
        restored
    }

    /// Shifts a key's creation time into the past. Test-only.
    #[cfg(test)]
    pub(crate) fn backdate(&mut self, key: &str, ms: u64) {
        if let Some(expiry) = self
            .entries
            .get_mut(key)
            .and_then(|entry| entry.expiry.as_mut())
        {
            expiry.created_at -= ms;
        }
    }
}
