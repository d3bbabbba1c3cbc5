//! Key-to-Location Mapper
//!
//! Validates keys and maps them to entry file paths inside the storage directory.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{CacheError, Result};

/// Characters that may never appear in a key.
pub const RESERVED_KEY_CHARS: &[char] = &['/', '\\', '{', '}', '(', ')', '@'];

// == Key Validation ==
/// Rejects empty keys and keys containing reserved characters.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key must not be empty".to_string()));
    }
    if let Some(c) = key.chars().find(|c| RESERVED_KEY_CHARS.contains(c)) {
        return Err(CacheError::InvalidKey(format!(
            "key '{}' contains reserved character '{}'",
            key, c
        )));
    }
    Ok(())
}

/// Hex SHA-256 digest of a key.
pub fn digest(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

// == Locator ==
/// Maps logical keys to `<dir>/<sha256>.<ext>`. Performs no I/O.
#[derive(Debug, Clone)]
pub struct Locator {
    dir: PathBuf,
    extension: String,
}

impl Locator {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    /// Returns the entry file path for a validated key.
    pub fn locate(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self
            .dir
            .join(format!("{}.{}", digest(key), self.extension)))
    }

    /// True if the path names an entry file (matching extension, not a temp file).
    pub fn is_entry_file(&self, path: &Path) -> bool {
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with('.'))
            .unwrap_or(true);
        !hidden
            && path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e == self.extension)
                .unwrap_or(false)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
