//! Garbage Collector
//!
//! Probabilistic sweep of expired entry files. Advisory only: lazy expiry on
//! read stays the authoritative cleanup path.

use std::fs;

use rand::Rng;
use tracing::{debug, warn};

use crate::cache::{current_timestamp_ms, Locator, Serializer};

/// Outcome of one sweep over the storage directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Entry files inspected
    pub scanned: usize,
    /// Expired entry files removed
    pub removed: usize,
    /// Files left alone because they were unreadable, corrupt, or could not be removed
    pub skipped: usize,
}

// == Garbage Collector ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GarbageCollector {
    probability: u32,
    divisor: u32,
}

impl GarbageCollector {
    /// Creates a collector that fires with chance `probability / divisor`.
    ///
    /// A zero divisor never fires.
    pub fn new(probability: u32, divisor: u32) -> Self {
        Self {
            probability,
            divisor,
        }
    }

    /// Draws a uniform integer in `[1, divisor]` and fires if it is `<= probability`.
    pub fn should_run(&self) -> bool {
        self.should_run_with(&mut rand::thread_rng())
    }

    pub fn should_run_with<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        if self.divisor == 0 || self.probability == 0 {
            return false;
        }
        rng.gen_range(1..=self.divisor) <= self.probability
    }

    // == Sweep ==
    /// Removes every entry file whose expiry is set and in the past.
    ///
    /// Corrupt files are skipped, not deleted. An unreadable directory yields an
    /// empty report.
    pub fn sweep(&self, locator: &Locator, serializer: Serializer) -> SweepReport {
        let mut report = SweepReport::default();
        let now = current_timestamp_ms();

        let dir = match fs::read_dir(locator.dir()) {
            Ok(dir) => dir,
            Err(e) => {
                warn!(
                    "GC sweep: cannot read {}: {}",
                    locator.dir().display(),
                    e
                );
                return report;
            }
        };

        for item in dir.flatten() {
            let path = item.path();
            if !locator.is_entry_file(&path) {
                continue;
            }
            report.scanned += 1;

            let entry = match fs::read(&path).map(|bytes| serializer.decode(&bytes)) {
                Ok(Ok(entry)) => entry,
                _ => {
                    report.skipped += 1;
                    continue;
                }
            };

            if !entry.is_expired_at(now) {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => report.removed += 1,
                // Another process got there first
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => report.removed += 1,
                Err(e) => {
                    debug!("GC sweep: cannot remove {}: {}", path.display(), e);
                    report.skipped += 1;
                }
            }
        }

        report
    }
}
