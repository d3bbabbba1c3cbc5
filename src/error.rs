//! Error types for the cache library
//!
//! Provides unified error handling using thiserror.
//!
//! Only caller bugs and unusable storage surface as errors. Misses, corrupt
//! entries and failed writes are reported through `Option`/`bool` returns.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key is empty or contains reserved characters
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// TTL is negative
    #[error("Invalid TTL: {0} (must be >= 0)")]
    InvalidTtl(i64),

    /// Driver or manager configuration is inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Storage directory is missing, uncreatable or not writable
    #[error("Storage unavailable at {}: {source}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Value cannot be represented by the configured serializer
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    /// Returns true for errors caused by invalid caller input.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            CacheError::InvalidKey(_) | CacheError::InvalidTtl(_) | CacheError::Serialization(_)
        )
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
