//! Property-Based Tests for the Store
//!
//! Uses proptest to verify correctness properties of the engine and the
//! default codec.

use proptest::prelude::*;

use crate::codec::{CacheSnapshot, Codec, JsonCodec};
use crate::store::CacheStore;
use crate::value::CacheValue;

// == Strategies ==
/// Generates valid cache keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,32}"
}

/// Generates leaf cache values across the primitive variants
fn value_strategy() -> impl Strategy<Value = CacheValue> {
    prop_oneof![
        Just(CacheValue::Null),
        any::<bool>().prop_map(CacheValue::Bool),
        any::<f64>().prop_map(CacheValue::Number),
        "[a-zA-Z0-9 ]{0,32}".prop_map(CacheValue::String),
        any::<i128>().prop_map(CacheValue::BigInt),
    ]
}

/// A sequence of store operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: String, value: CacheValue },
    Get { key: String },
    Remove { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Put { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Remove { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any sequence of operations, the hit and miss counters reflect
    // exactly the get calls that found and did not find their key, and the
    // reported size always matches the entry count.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let mut store = CacheStore::new(0, true);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    store.put(key, value, 300).unwrap();
                }
                CacheOp::Get { key } => {
                    match store.get(&key) {
                        Some(_) => expected_hits += 1,
                        None => expected_misses += 1,
                    }
                }
                CacheOp::Remove { key } => {
                    store.remove(&key);
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.size, store.len(), "Size mismatch");
    }

    // For any key-value pair, storing then retrieving returns the exact
    // value that was stored.
    #[test]
    fn prop_roundtrip_storage(key in key_strategy(), value in value_strategy()) {
        let mut store = CacheStore::new(0, true);

        store.put(key.clone(), value.clone(), 300).unwrap();

        let retrieved = store.get(&key);
        prop_assert_eq!(retrieved, Some(value), "Round-trip value mismatch");
    }

    // For any key, storing V1 then V2 leaves exactly one entry holding V2.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        let mut store = CacheStore::new(0, true);

        store.put(key.clone(), value1, 300).unwrap();
        store.put(key.clone(), value2.clone(), 300).unwrap();

        prop_assert_eq!(store.get(&key), Some(value2));
        prop_assert_eq!(store.len(), 1, "Should have exactly one entry after overwrite");
    }

    // For any sequence of puts, the entry count never exceeds the ceiling,
    // and a rejected put means the store was already full.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec(
            (key_strategy(), value_strategy()),
            1..200
        )
    ) {
        let max_keys = 50;
        let mut store = CacheStore::new(max_keys, true);

        for (key, value) in entries {
            let result = store.put(key, value, 300);
            if result.is_err() {
                prop_assert_eq!(store.len(), max_keys, "Rejection before the ceiling");
            }
            prop_assert!(
                store.len() <= max_keys,
                "Store size {} exceeds ceiling {}",
                store.len(),
                max_keys
            );
        }
    }

    // For any existing key, removal makes subsequent gets absent.
    #[test]
    fn prop_remove_makes_absent(key in key_strategy(), value in value_strategy()) {
        let mut store = CacheStore::new(0, true);

        store.put(key.clone(), value, 300).unwrap();
        prop_assert!(store.get(&key).is_some(), "Key should exist before removal");

        prop_assert!(store.remove(&key));
        prop_assert!(store.get(&key).is_none(), "Key should be absent after removal");
    }

    // For any sequence of puts, keys() lists distinct keys in the order of
    // their first insertion.
    #[test]
    fn prop_keys_in_first_insertion_order(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..50)
    ) {
        let mut store = CacheStore::new(0, true);
        let mut expected: Vec<String> = Vec::new();

        for (key, value) in entries {
            if !expected.contains(&key) {
                expected.push(key.clone());
            }
            store.put(key, value, 300).unwrap();
        }

        prop_assert_eq!(store.keys(), expected);
    }

    // For any snapshot, encoding then decoding through the default codec is
    // the identity.
    #[test]
    fn prop_codec_roundtrip(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 0..20),
        ttls in prop::collection::vec((key_strategy(), 1u64..10_000), 0..20)
    ) {
        let codec = JsonCodec::new();
        let snapshot = CacheSnapshot { entries, ttls };

        let blob = codec.encode(&snapshot).unwrap();
        let decoded = codec.decode(&blob).unwrap();

        prop_assert_eq!(decoded, snapshot);
    }
}
