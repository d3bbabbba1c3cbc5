//! Entry Codec
//!
//! Serializes cache entries to and from the on-disk byte format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::CacheEntry;
use crate::error::CacheError;

/// Reasons a stored blob could not be turned back into an entry.
///
/// Never returned to callers; the engine treats it as a miss and removes the file.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed entry: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("entry key mismatch: expected '{expected}', found '{found}'")]
    KeyMismatch { expected: String, found: String },
}

// == Serializer ==
/// Entry serialization scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Serializer {
    /// Whole-entry JSON document
    #[default]
    Json,
}

impl Serializer {
    /// Encodes an entry. Deterministic for equal entries.
    pub fn encode(&self, entry: &CacheEntry) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            Serializer::Json => serde_json::to_vec(entry),
        }
    }

    /// Decodes a blob, failing closed on any structural problem.
    pub fn decode(&self, bytes: &[u8]) -> Result<CacheEntry, DecodeError> {
        match self {
            Serializer::Json => Ok(serde_json::from_slice(bytes)?),
        }
    }

    /// Decodes a blob and checks that it belongs to `key`.
    pub fn decode_for(&self, key: &str, bytes: &[u8]) -> Result<CacheEntry, DecodeError> {
        let entry = self.decode(bytes)?;
        if entry.key != key {
            return Err(DecodeError::KeyMismatch {
                expected: key.to_string(),
                found: entry.key,
            });
        }
        Ok(entry)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Serializer::Json => "json",
        }
    }
}

impl fmt::Display for Serializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Serializer {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Serializer::Json),
            other => Err(CacheError::InvalidConfig(format!(
                "unknown serializer '{}'",
                other
            ))),
        }
    }
}
