//! Configuration Module
//!
//! Driver configuration for the local (file-based) cache, loadable from
//! environment variables or a serde configuration dictionary.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cache::Serializer;
use crate::error::{CacheError, Result};

/// Default file extension for cache entry files
pub const DEFAULT_FILE_EXTENSION: &str = "cache";

/// Default TTL in seconds applied when `set` is called without one
pub const DEFAULT_TTL: i64 = 3600;

/// Local driver configuration.
///
/// Set once at construction. The fluent setters are meant to be used before
/// the driver is opened; the driver takes its own copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Directory holding one file per cache key
    pub storage_path: PathBuf,
    /// Extension appended to every entry file (without leading dot)
    pub file_extension: String,
    /// Entry serialization scheme
    pub serializer: Serializer,
    /// GC runs when a draw in `[1, gc_divisor]` is `<= gc_probability`
    pub gc_probability: u32,
    /// Denominator of the GC trigger probability
    pub gc_divisor: u32,
    /// Default TTL in seconds, 0 = never expire
    pub default_ttl: i64,
}

impl LocalConfig {
    /// Creates a config rooted at the given storage directory with default options.
    pub fn new(storage_path: impl Into<PathBuf>) -> Self {
        Self {
            storage_path: storage_path.into(),
            ..Self::default()
        }
    }

    /// Creates a new LocalConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_STORAGE_PATH` - Storage directory (default: `$TMPDIR/local-cache`)
    /// - `CACHE_FILE_EXTENSION` - Entry file extension (default: cache)
    /// - `CACHE_SERIALIZER` - Serializer identifier (default: json)
    /// - `CACHE_GC_PROBABILITY` - GC probability numerator (default: 1)
    /// - `CACHE_GC_DIVISOR` - GC probability denominator (default: 100)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 3600)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup. Unparsable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            storage_path: lookup("CACHE_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),
            file_extension: lookup("CACHE_FILE_EXTENSION")
                .map(|v| normalize_extension(&v))
                .unwrap_or(defaults.file_extension),
            serializer: lookup("CACHE_SERIALIZER")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.serializer),
            gc_probability: lookup("CACHE_GC_PROBABILITY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.gc_probability),
            gc_divisor: lookup("CACHE_GC_DIVISOR")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.gc_divisor),
            default_ttl: lookup("CACHE_DEFAULT_TTL")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_ttl),
        }
    }

    // == Fluent Setters ==
    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = path.into();
        self
    }

    pub fn with_file_extension(mut self, extension: impl AsRef<str>) -> Self {
        self.file_extension = normalize_extension(extension.as_ref());
        self
    }

    pub fn with_serializer(mut self, serializer: Serializer) -> Self {
        self.serializer = serializer;
        self
    }

    pub fn with_gc_probability(mut self, probability: u32, divisor: u32) -> Self {
        self.gc_probability = probability;
        self.gc_divisor = divisor;
        self
    }

    pub fn with_default_ttl(mut self, seconds: i64) -> Self {
        self.default_ttl = seconds;
        self
    }

    // == Validate ==
    /// Checks option consistency. Called by the driver before touching the filesystem.
    pub fn validate(&self) -> Result<()> {
        let ext = normalize_extension(&self.file_extension);
        if ext.is_empty() {
            return Err(CacheError::InvalidConfig(
                "file extension must not be empty".to_string(),
            ));
        }
        if ext.contains(&['/', '\\'][..]) {
            return Err(CacheError::InvalidConfig(format!(
                "file extension '{}' contains a path separator",
                ext
            )));
        }
        if self.gc_divisor == 0 {
            return Err(CacheError::InvalidConfig(
                "gc_divisor must be positive".to_string(),
            ));
        }
        if self.gc_probability > self.gc_divisor {
            return Err(CacheError::InvalidConfig(format!(
                "gc_probability {} exceeds gc_divisor {}",
                self.gc_probability, self.gc_divisor
            )));
        }
        if self.default_ttl < 0 {
            return Err(CacheError::InvalidTtl(self.default_ttl));
        }
        Ok(())
    }

    /// Extension without leading dot, as used for file names.
    pub fn extension(&self) -> String {
        normalize_extension(&self.file_extension)
    }
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            storage_path: env::temp_dir().join("local-cache"),
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            serializer: Serializer::default(),
            gc_probability: 1,
            gc_divisor: 100,
            default_ttl: DEFAULT_TTL,
        }
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_default() {
        let config = LocalConfig::default();
        assert_eq!(config.file_extension, "cache");
        assert_eq!(config.serializer, Serializer::Json);
        assert_eq!(config.gc_probability, 1);
        assert_eq!(config.gc_divisor, 100);
        assert_eq!(config.default_ttl, 3600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("CACHE_STORAGE_PATH", "/var/cache/app"),
            ("CACHE_FILE_EXTENSION", ".dat"),
            ("CACHE_GC_PROBABILITY", "5"),
            ("CACHE_GC_DIVISOR", "10"),
            ("CACHE_DEFAULT_TTL", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let config = LocalConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.storage_path, PathBuf::from("/var/cache/app"));
        assert_eq!(config.file_extension, "dat");
        assert_eq!(config.gc_probability, 5);
        assert_eq!(config.gc_divisor, 10);
        // Falls back on parse failure
        assert_eq!(config.default_ttl, DEFAULT_TTL);
    }

    #[test]
    fn test_fluent_setters() {
        let config = LocalConfig::new("/tmp/x")
            .with_file_extension(".bin")
            .with_gc_probability(2, 3)
            .with_default_ttl(0);

        assert_eq!(config.storage_path, PathBuf::from("/tmp/x"));
        assert_eq!(config.extension(), "bin");
        assert_eq!((config.gc_probability, config.gc_divisor), (2, 3));
        assert_eq!(config.default_ttl, 0);
    }

    #[test]
    fn test_validate_rejects_bad_options() {
        let base = LocalConfig::new("/tmp/x");

        assert!(matches!(
            base.clone().with_gc_probability(1, 0).validate(),
            Err(CacheError::InvalidConfig(_))
        ));
        assert!(matches!(
            base.clone().with_gc_probability(5, 4).validate(),
            Err(CacheError::InvalidConfig(_))
        ));
        assert!(matches!(
            base.clone().with_file_extension("").validate(),
            Err(CacheError::InvalidConfig(_))
        ));
        assert!(matches!(
            base.clone().with_file_extension("a/b").validate(),
            Err(CacheError::InvalidConfig(_))
        ));
        assert!(matches!(
            base.with_default_ttl(-1).validate(),
            Err(CacheError::InvalidTtl(-1))
        ));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: LocalConfig =
            serde_json::from_str(r#"{"storage_path":"/srv/cache","default_ttl":60}"#).unwrap();
        assert_eq!(config.storage_path, PathBuf::from("/srv/cache"));
        assert_eq!(config.default_ttl, 60);
        assert_eq!(config.gc_divisor, 100);
    }
}
