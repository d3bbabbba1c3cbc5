//! Local Storage Engine
//!
//! File-backed cache driver: one file per key under the storage directory,
//! fronted by a private in-memory hot index, with lazy TTL expiry and
//! probabilistic garbage collection.
//!
//! # Concurrency
//! Several threads or processes may share one storage directory. Writes go to a
//! temporary file in that same directory and are renamed into place, so a reader
//! sees either the old or the new entry, never a partial one. Concurrent writers
//! to one key race and the last rename wins. No file locks are taken.
//!
//! The hot index belongs to a single `LocalDriver` and is not shared, so another
//! process's writes may not be visible through a warm hot entry.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{
    current_timestamp_ms, CacheEntry, DriverStats, GarbageCollector, HitCounters, Locator,
    SweepReport,
};
use crate::config::LocalConfig;
use crate::driver::{validate_ttl, CacheDriver};
use crate::error::{CacheError, Result};

/// Identifier reported by [`LocalDriver`] in its stats.
pub const DRIVER_NAME: &str = "local";

// == Local Driver ==
/// File-backed cache driver.
#[derive(Debug)]
pub struct LocalDriver {
    /// Immutable copy of the driver options
    config: LocalConfig,
    /// Key to file path mapping
    locator: Locator,
    /// Probabilistic sweep trigger
    gc: GarbageCollector,
    /// Entries most recently read or written by this instance
    hot: RwLock<HashMap<String, CacheEntry>>,
    /// Read outcome counters
    counters: HitCounters,
    /// Set once `close` has run its GC pass
    closed: AtomicBool,
}

impl LocalDriver {
    // == Constructor ==
    /// Opens a driver on the configured storage directory, creating it if needed.
    ///
    /// Fails with `StorageUnavailable` if the directory cannot be created or
    /// written to; the driver is unusable in that case.
    pub fn open(config: LocalConfig) -> Result<Self> {
        config.validate()?;

        let dir = config.storage_path.clone();
        fs::create_dir_all(&dir).map_err(|source| CacheError::StorageUnavailable {
            path: dir.clone(),
            source,
        })?;
        probe_writable(&dir).map_err(|source| CacheError::StorageUnavailable {
            path: dir.clone(),
            source,
        })?;

        info!(
            "Local cache driver opened at {} (ext={}, serializer={}, gc={}/{}, default_ttl={}s)",
            dir.display(),
            config.extension(),
            config.serializer,
            config.gc_probability,
            config.gc_divisor,
            config.default_ttl
        );

        Ok(Self {
            locator: Locator::new(dir, config.extension()),
            gc: GarbageCollector::new(config.gc_probability, config.gc_divisor),
            config,
            hot: RwLock::new(HashMap::new()),
            counters: HitCounters::new(),
            closed: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &LocalConfig {
        &self.config
    }

    pub fn storage_path(&self) -> &Path {
        self.locator.dir()
    }

    /// Returns the entry file path backing `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        self.locator.locate(key)
    }

    // == Garbage Collection ==
    /// Runs a sweep if the probability draw fires.
    pub fn collect_garbage(&self) -> Option<SweepReport> {
        if self.gc.should_run() {
            Some(self.sweep())
        } else {
            debug!("GC draw did not fire");
            None
        }
    }

    /// Unconditionally removes expired entry files and prunes expired hot entries.
    pub fn sweep(&self) -> SweepReport {
        let report = self.gc.sweep(&self.locator, self.config.serializer);

        let now = current_timestamp_ms();
        self.hot_write().retain(|_, entry| !entry.is_expired_at(now));

        info!(
            "GC sweep of {}: scanned={}, removed={}, skipped={}",
            self.locator.dir().display(),
            report.scanned,
            report.removed,
            report.skipped
        );
        report
    }

    // == Close ==
    /// Ends the driver's managed lifetime with one best-effort GC pass.
    ///
    /// Idempotent. Also invoked on drop. The driver stays usable afterwards.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("Closing local cache driver at {}", self.locator.dir().display());
        self.collect_garbage();
    }

    // == Internal Helpers ==
    fn hot_read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry>> {
        self.hot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn hot_write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
        self.hot.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads an entry from disk, purging it if corrupt or expired.
    fn load(&self, key: &str, path: &Path, now: u64) -> Option<CacheEntry> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("Cannot read cache entry {}: {}", path.display(), e);
                }
                // Only reached when the hot copy is absent or expired, so nothing live is dropped
                self.hot_write().remove(key);
                return None;
            }
        };

        let entry = match self.config.serializer.decode_for(key, &bytes) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Removing corrupt cache entry for '{}': {}", key, e);
                self.purge(key, path);
                return None;
            }
        };

        if entry.is_expired_at(now) {
            debug!("Lazy expiry of '{}'", key);
            self.purge(key, path);
            return None;
        }

        self.hot_write().insert(key.to_string(), entry.clone());
        Some(entry)
    }

    fn purge(&self, key: &str, path: &Path) {
        self.hot_write().remove(key);
        remove_entry_file(path);
    }

    /// Writes to a temporary file in the storage directory, then renames it over `path`.
    fn persist(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut tmp = tempfile::Builder::new()
            .prefix(".")
            .suffix(".tmp")
            .tempfile_in(self.locator.dir())?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn entry_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for item in fs::read_dir(self.locator.dir())? {
            let path = item?.path();
            if self.locator.is_entry_file(&path) {
                files.push(path);
            }
        }
        Ok(files)
    }
}

impl CacheDriver for LocalDriver {
    fn name(&self) -> &str {
        DRIVER_NAME
    }

    // == Get ==
    /// Hot index first, then disk. Expired or corrupt entries are removed on discovery.
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.locator.locate(key)?;
        let now = current_timestamp_ms();

        if let Some(entry) = self.hot_read().get(key) {
            if !entry.is_expired_at(now) {
                self.counters.record_hit();
                return Ok(Some(entry.value.clone()));
            }
        }

        match self.load(key, &path, now) {
            Some(entry) => {
                self.counters.record_hit();
                Ok(Some(entry.value))
            }
            None => {
                self.counters.record_miss();
                Ok(None)
            }
        }
    }

    // == Set ==
    /// Updates the hot index, then persists. On a failed persist the hot copy
    /// stays readable for the life of this driver and `false` is returned.
    fn set(&self, key: &str, value: Value, ttl: Option<i64>) -> Result<bool> {
        let path = self.locator.locate(key)?;
        validate_ttl(ttl)?;

        let ttl = ttl.unwrap_or(self.config.default_ttl).max(0) as u64;
        let entry = CacheEntry::new(key, value, ttl);
        let bytes = self.config.serializer.encode(&entry)?;

        self.hot_write().insert(key.to_string(), entry);

        match self.persist(&path, &bytes) {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!("Failed to persist cache entry '{}' to {}: {}", key, path.display(), e);
                Ok(false)
            }
        }
    }

    // == Delete ==
    fn delete(&self, key: &str) -> Result<bool> {
        let path = self.locator.locate(key)?;
        self.hot_write().remove(key);
        Ok(remove_entry_file(&path))
    }

    // == Clear ==
    fn clear(&self) -> bool {
        self.hot_write().clear();

        let files = match self.entry_files() {
            Ok(files) => files,
            Err(e) => {
                warn!("Cannot list {}: {}", self.locator.dir().display(), e);
                return false;
            }
        };

        let mut failed = 0usize;
        for path in &files {
            if !remove_entry_file(path) {
                failed += 1;
            }
        }

        info!(
            "Cleared {} cache files from {} ({} failed)",
            files.len() - failed,
            self.locator.dir().display(),
            failed
        );
        failed == 0
    }

    // == Stats ==
    /// Never fails; an unreadable directory reports zero files.
    fn stats(&self) -> DriverStats {
        let (hits, misses) = self.counters.snapshot();
        let mut stats = DriverStats {
            hot_index_size: self.hot_read().len(),
            storage_path: Some(self.locator.dir().to_path_buf()),
            hits,
            misses,
            ..DriverStats::new(DRIVER_NAME)
        };

        match self.entry_files() {
            Ok(files) => {
                for path in files {
                    if let Ok(meta) = fs::metadata(&path) {
                        stats.file_count += 1;
                        stats.total_bytes += meta.len();
                    }
                }
            }
            Err(e) => warn!("Stats unavailable for {}: {}", self.locator.dir().display(), e),
        }

        stats
    }

    // == Is Connected ==
    /// Re-checks that the storage directory exists, is listable and writable.
    fn is_connected(&self) -> bool {
        let dir = self.locator.dir();
        match fs::metadata(dir) {
            Ok(meta) if meta.is_dir() => fs::read_dir(dir).is_ok() && probe_writable(dir).is_ok(),
            _ => false,
        }
    }
}

impl Drop for LocalDriver {
    fn drop(&mut self) {
        self.close();
    }
}

/// Creates and discards an anonymous file in `dir`.
fn probe_writable(dir: &Path) -> io::Result<()> {
    tempfile::tempfile_in(dir).map(drop)
}

/// True if the file is gone afterwards.
fn remove_entry_file(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => true,
        Err(e) => {
            warn!("Failed to remove cache file {}: {}", path.display(), e);
            false
        }
    }
}
