//! Namespaced Cache
//!
//! A logical cache instance: a key prefix bound to a shared driver.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Number, Value};

use crate::cache::{validate_key, DriverStats};
use crate::driver::CacheDriver;
use crate::error::Result;

/// Separator between namespace and key.
pub const NAMESPACE_SEPARATOR: char = ':';

// == Cache ==
/// Prefixes every key with `"{namespace}:"` and forwards to the driver.
///
/// Cloning is cheap; clones share the driver.
#[derive(Clone)]
pub struct Cache {
    driver: Arc<dyn CacheDriver>,
    namespace: String,
}

impl Cache {
    /// Binds a namespace to a driver. An empty namespace disables prefixing.
    pub fn new(driver: Arc<dyn CacheDriver>, namespace: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        if !namespace.is_empty() {
            validate_key(&namespace)?;
        }
        Ok(Self { driver, namespace })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn driver(&self) -> &Arc<dyn CacheDriver> {
        &self.driver
    }

    /// Validates the caller's key on its own, then adds the namespace prefix.
    fn qualify(&self, key: &str) -> Result<String> {
        validate_key(key)?;
        if self.namespace.is_empty() {
            Ok(key.to_string())
        } else {
            Ok(format!("{}{}{}", self.namespace, NAMESPACE_SEPARATOR, key))
        }
    }

    fn qualify_all(&self, keys: &[&str]) -> Result<Vec<String>> {
        keys.iter().map(|k| self.qualify(k)).collect()
    }

    // == Reads ==
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        self.driver.get(&self.qualify(key)?)
    }

    /// Reads and deserializes a value.
    ///
    /// A stored value that does not fit `T` is a `Serialization` error, not a miss.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub fn has(&self, key: &str) -> Result<bool> {
        self.driver.has(&self.qualify(key)?)
    }

    // == Writes ==
    pub fn set(&self, key: &str, value: Value, ttl: Option<i64>) -> Result<bool> {
        self.driver.set(&self.qualify(key)?, value, ttl)
    }

    /// Serializes and stores any `Serialize` value.
    pub fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<i64>) -> Result<bool> {
        self.set(key, serde_json::to_value(value)?, ttl)
    }

    /// Stores a value that never expires.
    pub fn forever(&self, key: &str, value: Value) -> Result<bool> {
        self.set(key, value, Some(0))
    }

    pub fn delete(&self, key: &str) -> Result<bool> {
        self.driver.delete(&self.qualify(key)?)
    }

    /// Returns the value and removes it.
    pub fn pull(&self, key: &str) -> Result<Option<Value>> {
        let value = self.get(key)?;
        if value.is_some() {
            self.delete(key)?;
        }
        Ok(value)
    }

    /// Returns the cached value, or computes, stores and returns it.
    ///
    /// The computed value is returned even if storing it fails.
    pub fn remember<F>(&self, key: &str, ttl: Option<i64>, compute: F) -> Result<Value>
    where
        F: FnOnce() -> Value,
    {
        if let Some(value) = self.get(key)? {
            return Ok(value);
        }
        let value = compute();
        self.set(key, value.clone(), ttl)?;
        Ok(value)
    }

    pub fn increment(&self, key: &str, delta: i64) -> Result<Option<Number>> {
        self.driver.increment(&self.qualify(key)?, delta)
    }

    pub fn decrement(&self, key: &str, delta: i64) -> Result<Option<Number>> {
        self.driver.decrement(&self.qualify(key)?, delta)
    }

    // == Batch ==
    /// Results are keyed by the caller's unprefixed keys.
    pub fn get_multiple(&self, keys: &[&str]) -> Result<HashMap<String, Option<Value>>> {
        let qualified = self.qualify_all(keys)?;
        let refs: Vec<&str> = qualified.iter().map(String::as_str).collect();
        let found = self.driver.get_multiple(&refs)?;

        // Repeated keys must all see the value, so look up without removing
        Ok(keys
            .iter()
            .zip(qualified.iter())
            .map(|(key, q)| (key.to_string(), found.get(q).cloned().flatten()))
            .collect())
    }

    pub fn set_multiple(&self, values: HashMap<String, Value>, ttl: Option<i64>) -> Result<bool> {
        let qualified = values
            .into_iter()
            .map(|(k, v)| Ok((self.qualify(&k)?, v)))
            .collect::<Result<HashMap<String, Value>>>()?;
        self.driver.set_multiple(qualified, ttl)
    }

    pub fn delete_multiple(&self, keys: &[&str]) -> Result<bool> {
        let qualified = self.qualify_all(keys)?;
        let refs: Vec<&str> = qualified.iter().map(String::as_str).collect();
        self.driver.delete_multiple(&refs)
    }

    // == Driver-wide ==
    /// Clears the whole driver, not only this namespace: entry locations are
    /// hashed, so a namespace's files cannot be told apart on disk.
    pub fn clear(&self) -> bool {
        self.driver.clear()
    }

    pub fn stats(&self) -> DriverStats {
        self.driver.stats()
    }

    pub fn is_connected(&self) -> bool {
        self.driver.is_connected()
    }
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("driver", &self.driver.name())
            .field("namespace", &self.namespace)
            .finish()
    }
}
