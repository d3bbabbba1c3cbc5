//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the local driver against a plain HashMap model.

use proptest::prelude::*;
use serde_json::Value;
use std::collections::HashMap;
use tempfile::TempDir;

use crate::cache::{LocalDriver, Serializer};
use crate::config::LocalConfig;
use crate::driver::CacheDriver;

// == Strategies ==
/// Generates valid cache keys (non-empty, no reserved characters)
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:.-]{1,48}"
}

/// Generates nested JSON values without floats
fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,32}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: Value },
    Get { key: String },
    Delete { key: String },
}

/// Draws keys from a small pool so operations collide
fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    let key = "k[0-4]";
    prop_oneof![
        (key, value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key.prop_map(|key| CacheOp::Get { key }),
        key.prop_map(|key| CacheOp::Delete { key }),
    ]
}

fn open(dir: &TempDir) -> LocalDriver {
    LocalDriver::open(LocalConfig::new(dir.path()).with_gc_probability(0, 1)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    // Storing then reading before expiry returns the stored value.
    #[test]
    fn prop_roundtrip_storage(key in valid_key_strategy(), value in value_strategy()) {
        let dir = TempDir::new().unwrap();
        let driver = open(&dir);

        prop_assert!(driver.set(&key, value.clone(), Some(0)).unwrap());
        prop_assert_eq!(driver.get(&key).unwrap(), Some(value));
    }

    // The disk copy alone reproduces the value for another instance.
    #[test]
    fn prop_disk_copy_matches_hot_copy(key in valid_key_strategy(), value in value_strategy()) {
        let dir = TempDir::new().unwrap();
        open(&dir).set(&key, value.clone(), None).unwrap();

        let cold = open(&dir);
        prop_assert_eq!(cold.get(&key).unwrap(), Some(value));
    }

    // After delete, get misses and has is false.
    #[test]
    fn prop_delete_removes_entry(key in valid_key_strategy(), value in value_strategy()) {
        let dir = TempDir::new().unwrap();
        let driver = open(&dir);

        driver.set(&key, value, None).unwrap();
        prop_assert!(driver.delete(&key).unwrap());
        prop_assert_eq!(driver.get(&key).unwrap(), None);
        prop_assert!(!driver.has(&key).unwrap());
        prop_assert!(!driver.path_for(&key).unwrap().exists());
    }

    // Garbage written over an entry file reads as a miss and the file is removed.
    #[test]
    fn prop_garbage_is_self_healed(
        key in valid_key_strategy(),
        garbage in prop::collection::vec(any::<u8>(), 0..256)
    ) {
        prop_assume!(Serializer::Json.decode(&garbage).is_err());
        let dir = TempDir::new().unwrap();
        let driver = open(&dir);
        let path = driver.path_for(&key).unwrap();

        std::fs::write(&path, &garbage).unwrap();
        prop_assert_eq!(driver.get(&key).unwrap(), None);
        prop_assert!(!path.exists());
    }

    // Any operation sequence leaves the driver agreeing with a HashMap model,
    // both through this instance and through a fresh one reading from disk.
    #[test]
    fn prop_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..40)) {
        let dir = TempDir::new().unwrap();
        let driver = open(&dir);
        let mut model: HashMap<String, Value> = HashMap::new();
        let mut expected_hits = 0u64;
        let mut expected_misses = 0u64;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    prop_assert!(driver.set(&key, value.clone(), None).unwrap());
                    model.insert(key, value);
                }
                CacheOp::Get { key } => {
                    let got = driver.get(&key).unwrap();
                    prop_assert_eq!(&got, &model.get(&key).cloned());
                    if got.is_some() { expected_hits += 1 } else { expected_misses += 1 }
                }
                CacheOp::Delete { key } => {
                    prop_assert!(driver.delete(&key).unwrap());
                    model.remove(&key);
                }
            }
        }

        let stats = driver.stats();
        prop_assert_eq!(stats.hits, expected_hits);
        prop_assert_eq!(stats.misses, expected_misses);
        prop_assert_eq!(stats.file_count as usize, model.len());

        let cold = open(&dir);
        for (key, value) in &model {
            let got = cold.get(key).unwrap();
            prop_assert_eq!(got.as_ref(), Some(value));
        }
    }

    // Counters: n increments from absent then one decrement by n lands on 0.
    #[test]
    fn prop_increment_then_decrement(n in 1i64..20) {
        let dir = TempDir::new().unwrap();
        let driver = open(&dir);

        for i in 1..=n {
            let next = driver.increment("counter", 1).unwrap();
            prop_assert_eq!(next.and_then(|v| v.as_i64()), Some(i));
        }
        let back = driver.decrement("counter", n).unwrap();
        prop_assert_eq!(back.and_then(|v| v.as_i64()), Some(0));
    }
}
