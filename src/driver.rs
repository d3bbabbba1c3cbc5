//! Driver Contract
//!
//! The operation set every storage backend exposes. The local file driver is
//! one implementation; remote stores (Redis, Memcached, ...) plug in by
//! implementing the same trait with identical miss/failure semantics.
//!
//! # Semantics
//! - Misses are `Ok(None)`, never errors.
//! - Write failures are `Ok(false)`, never errors.
//! - `Err` is reserved for invalid input (`InvalidKey`, `InvalidTtl`) and is
//!   returned before any side effect.
//! - Batch operations apply per key with no atomicity: a `false` result may
//!   leave some keys written or deleted and others not.

use std::collections::HashMap;

use serde_json::{Number, Value};

use crate::cache::{validate_key, DriverStats};
use crate::error::{CacheError, Result};

pub trait CacheDriver: Send + Sync {
    /// Driver identifier reported in stats.
    fn name(&self) -> &str;

    /// Returns the value for `key`, or `None` if absent, expired or unreadable.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Stores `value` under `key`. `ttl` of `None` uses the driver default,
    /// `Some(0)` never expires.
    fn set(&self, key: &str, value: Value, ttl: Option<i64>) -> Result<bool>;

    /// Removes `key`. True if nothing remains afterwards.
    fn delete(&self, key: &str) -> Result<bool>;

    /// Removes every entry. Keeps going after individual failures.
    fn clear(&self) -> bool;

    fn stats(&self) -> DriverStats;

    fn is_connected(&self) -> bool;

    fn has(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    fn get_multiple(&self, keys: &[&str]) -> Result<HashMap<String, Option<Value>>> {
        validate_keys(keys.iter().copied())?;
        let mut found = HashMap::with_capacity(keys.len());
        for key in keys {
            found.insert(key.to_string(), self.get(key)?);
        }
        Ok(found)
    }

    fn set_multiple(&self, values: HashMap<String, Value>, ttl: Option<i64>) -> Result<bool> {
        validate_keys(values.keys().map(String::as_str))?;
        validate_ttl(ttl)?;
        let mut all_ok = true;
        for (key, value) in values {
            all_ok &= self.set(&key, value, ttl)?;
        }
        Ok(all_ok)
    }

    fn delete_multiple(&self, keys: &[&str]) -> Result<bool> {
        validate_keys(keys.iter().copied())?;
        let mut all_ok = true;
        for key in keys {
            all_ok &= self.delete(key)?;
        }
        Ok(all_ok)
    }

    /// Adds `delta` to a numeric value, treating absent as 0.
    ///
    /// Returns `Ok(None)` if the current value is not a number, the result
    /// overflows, or the write fails. The rewritten entry gets the default TTL;
    /// any remaining TTL of the old entry is discarded.
    fn increment(&self, key: &str, delta: i64) -> Result<Option<Number>> {
        let current = self.get(key)?;
        let Some(next) = add_to_number(current.as_ref(), delta) else {
            return Ok(None);
        };
        if self.set(key, Value::Number(next.clone()), None)? {
            Ok(Some(next))
        } else {
            Ok(None)
        }
    }

    fn decrement(&self, key: &str, delta: i64) -> Result<Option<Number>> {
        match delta.checked_neg() {
            Some(negated) => self.increment(key, negated),
            None => {
                validate_key(key)?;
                Ok(None)
            }
        }
    }
}

/// Validates every key before a batch touches storage.
pub fn validate_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Result<()> {
    keys.into_iter().try_for_each(validate_key)
}

/// Rejects negative TTLs; `None` means "use default".
pub fn validate_ttl(ttl: Option<i64>) -> Result<()> {
    match ttl {
        Some(t) if t < 0 => Err(CacheError::InvalidTtl(t)),
        _ => Ok(()),
    }
}

/// `current + delta` for JSON numbers, `None` when not numeric or out of range.
pub fn add_to_number(current: Option<&Value>, delta: i64) -> Option<Number> {
    let n = match current {
        None => return Some(Number::from(delta)),
        Some(Value::Number(n)) => n,
        Some(_) => return None,
    };

    if let Some(i) = n.as_i64() {
        return i.checked_add(delta).map(Number::from);
    }
    if let Some(u) = n.as_u64() {
        let sum = u as i128 + delta as i128;
        return u64::try_from(sum).ok().map(Number::from);
    }
    n.as_f64()
        .and_then(|f| Number::from_f64(f + delta as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_to_absent() {
        assert_eq!(add_to_number(None, 1), Some(Number::from(1)));
        assert_eq!(add_to_number(None, -3), Some(Number::from(-3)));
    }

    #[test]
    fn test_add_to_integers() {
        assert_eq!(add_to_number(Some(&json!(41)), 1), Some(Number::from(42)));
        assert_eq!(add_to_number(Some(&json!(4)), -4), Some(Number::from(0)));
        assert_eq!(add_to_number(Some(&json!(i64::MAX)), 1), None);
        assert_eq!(
            add_to_number(Some(&json!(u64::MAX)), -1),
            Some(Number::from(u64::MAX - 1))
        );
    }

    #[test]
    fn test_add_to_float() {
        assert_eq!(
            add_to_number(Some(&json!(1.5)), 2),
            Number::from_f64(3.5)
        );
    }

    #[test]
    fn test_add_to_non_numeric() {
        assert_eq!(add_to_number(Some(&json!("12")), 1), None);
        assert_eq!(add_to_number(Some(&json!(null)), 1), None);
        assert_eq!(add_to_number(Some(&json!([1])), 1), None);
    }

    #[test]
    fn test_validate_ttl() {
        assert!(validate_ttl(None).is_ok());
        assert!(validate_ttl(Some(0)).is_ok());
        assert!(matches!(validate_ttl(Some(-1)), Err(CacheError::InvalidTtl(-1))));
    }
}
