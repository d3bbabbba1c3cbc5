//! Driver Registry
//!
//! Explicit mapping of store names to driver instances, owned by the
//! application's composition root and handed to whoever needs a cache.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::cache::LocalDriver;
use crate::config::LocalConfig;
use crate::driver::CacheDriver;
use crate::error::{CacheError, Result};
use crate::manager::Cache;

/// One store entry in a manager configuration dictionary.
///
/// Remote backends are not built from configuration; register them with
/// [`CacheManager::register`].
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "driver", rename_all = "lowercase")]
pub enum StoreConfig {
    Local(LocalConfig),
}

/// Manager configuration dictionary.
///
/// ```json
/// { "default": "files", "stores": { "files": { "driver": "local", "storage_path": "/var/cache/app" } } }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ManagerConfig {
    /// Name of the store used by [`CacheManager::cache`]
    pub default: String,
    /// Named store definitions
    #[serde(default)]
    pub stores: HashMap<String, StoreConfig>,
}

// == Cache Manager ==
#[derive(Default)]
pub struct CacheManager {
    drivers: HashMap<String, Arc<dyn CacheDriver>>,
    default: Option<String>,
}

impl CacheManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens every configured store and selects the default.
    ///
    /// Fails if any store cannot be opened or the default is not among them.
    pub fn from_config(config: ManagerConfig) -> Result<Self> {
        let mut manager = Self::new();
        for (name, store) in config.stores {
            let driver: Arc<dyn CacheDriver> = match store {
                StoreConfig::Local(local) => Arc::new(LocalDriver::open(local)?),
            };
            manager.register(name, driver);
        }
        manager.set_default(&config.default)?;
        Ok(manager)
    }

    /// Parses a JSON configuration dictionary and builds the manager.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ManagerConfig = serde_json::from_str(json)
            .map_err(|e| CacheError::InvalidConfig(e.to_string()))?;
        Self::from_config(config)
    }

    /// Adds or replaces a named driver. The first driver registered becomes the default.
    pub fn register(&mut self, name: impl Into<String>, driver: Arc<dyn CacheDriver>) {
        let name = name.into();
        info!("Registered cache store '{}' ({} driver)", name, driver.name());
        if self.default.is_none() {
            self.default = Some(name.clone());
        }
        self.drivers.insert(name, driver);
    }

    pub fn set_default(&mut self, name: &str) -> Result<()> {
        if !self.drivers.contains_key(name) {
            return Err(CacheError::InvalidConfig(format!(
                "unknown cache store '{}'",
                name
            )));
        }
        self.default = Some(name.to_string());
        Ok(())
    }

    pub fn driver(&self, name: &str) -> Option<Arc<dyn CacheDriver>> {
        self.drivers.get(name).cloned()
    }

    pub fn default_driver(&self) -> Option<Arc<dyn CacheDriver>> {
        self.default.as_deref().and_then(|name| self.driver(name))
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Registered store names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.drivers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// A namespace on the default store.
    pub fn cache(&self, namespace: &str) -> Result<Cache> {
        let driver = self
            .default_driver()
            .ok_or_else(|| CacheError::InvalidConfig("no cache store registered".to_string()))?;
        Cache::new(driver, namespace)
    }

    /// A namespace on a named store.
    pub fn cache_on(&self, store: &str, namespace: &str) -> Result<Cache> {
        let driver = self.driver(store).ok_or_else(|| {
            CacheError::InvalidConfig(format!("unknown cache store '{}'", store))
        })?;
        Cache::new(driver, namespace)
    }
}

impl fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheManager")
            .field("stores", &self.names())
            .field("default", &self.default)
            .finish()
    }
}
