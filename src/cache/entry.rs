//! Cache Entry Module
//!
//! Defines the unit of storage: a value plus expiry metadata.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Logical (namespaced) key, stored for integrity checking on read
    pub key: String,
    /// The stored value
    pub value: Value,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), 0 = no expiration
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current time.
    ///
    /// # Arguments
    /// * `key` - The logical key
    /// * `value` - The value to store
    /// * `ttl_seconds` - TTL in seconds, 0 = never expires
    pub fn new(key: impl Into<String>, value: Value, ttl_seconds: u64) -> Self {
        let now = current_timestamp_ms();
        let expires_at = if ttl_seconds == 0 {
            0
        } else {
            now.saturating_add(ttl_seconds.saturating_mul(1000))
        };

        Self {
            key: key.into(),
            value,
            created_at: now,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is dead once `expires_at` is set and strictly in the past.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Expiry check against an explicit clock reading.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        self.expires_at > 0 && self.expires_at < now_ms
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        if self.expires_at == 0 {
            return None;
        }
        Some(self.expires_at.saturating_sub(current_timestamp_ms()))
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}
