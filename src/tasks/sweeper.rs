//! Scheduled GC Sweep
//!
//! Background task that periodically sweeps expired entry files from a local
//! driver's storage directory.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::LocalDriver;

/// Spawns a background task that runs a full GC sweep every interval.
///
/// Sweeps do blocking filesystem I/O, so each one runs on the blocking pool.
///
/// # Arguments
/// * `driver` - Shared local driver to sweep
/// * `interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task; abort it to stop sweeping.
///
/// # Example
/// ```ignore
/// let driver = Arc::new(LocalDriver::open(LocalConfig::from_env())?);
/// let handle = spawn_gc_task(driver.clone(), 60);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_gc_task(driver: Arc<LocalDriver>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting GC sweep task for {} with interval of {} seconds",
            driver.storage_path().display(),
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let sweeping = driver.clone();
            match tokio::task::spawn_blocking(move || sweeping.sweep()).await {
                Ok(report) if report.removed > 0 => {
                    info!("GC sweep: removed {} expired entries", report.removed)
                }
                Ok(_) => debug!("GC sweep: no expired entries found"),
                Err(e) => warn!("GC sweep failed: {}", e),
            }
        }
    })
}
