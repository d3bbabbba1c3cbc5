//! Cache Statistics Module
//!
//! Driver statistics snapshots and per-instance hit/miss counters.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Driver Stats ==
/// Best-effort snapshot of a driver's state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DriverStats {
    /// Driver identifier (e.g. "local")
    pub driver: String,
    /// Number of entry files on disk
    pub file_count: u64,
    /// Sum of entry file sizes in bytes
    pub total_bytes: u64,
    /// Number of entries held in the in-memory hot index
    pub hot_index_size: usize,
    /// Storage directory, for drivers that have one
    pub storage_path: Option<PathBuf>,
    /// Number of reads that returned a value
    pub hits: u64,
    /// Number of reads that returned nothing
    pub misses: u64,
}

impl DriverStats {
    /// Creates zeroed stats for the named driver.
    pub fn new(driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            ..Self::default()
        }
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Hit Counters ==
/// Lock-free read outcome counters shared by all callers of one driver.
#[derive(Debug, Default)]
pub struct HitCounters {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl HitCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns (hits, misses).
    pub fn snapshot(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = DriverStats::new("local");
        assert_eq!(stats.driver, "local");
        assert_eq!(stats.file_count, 0);
        assert_eq!(stats.total_bytes, 0);
        assert_eq!(stats.hot_index_size, 0);
        assert!(stats.storage_path.is_none());
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(DriverStats::new("local").hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let stats = DriverStats {
            hits: 3,
            misses: 1,
            ..DriverStats::new("local")
        };
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_hit_counters() {
        let counters = HitCounters::new();
        counters.record_hit();
        counters.record_hit();
        counters.record_miss();
        assert_eq!(counters.snapshot(), (2, 1));
    }
}
