//! Local Cache GC daemon
//!
//! Periodically sweeps expired entries from a storage directory shared by
//! other processes using the local cache driver.

use std::env;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use local_cache::{spawn_gc_task, CacheDriver, LocalConfig, LocalDriver};

/// Default interval between scheduled sweeps, in seconds.
const DEFAULT_GC_INTERVAL: u64 = 60;

/// Main entry point for the GC daemon.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load driver configuration from environment variables
/// 3. Open the local driver (fails if the storage directory is unusable)
/// 4. Start the scheduled GC sweep task
/// 5. Wait for SIGINT/SIGTERM, then stop the task and close the driver
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "local_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting local cache GC daemon");

    let config = LocalConfig::from_env();
    let interval = env::var("CACHE_GC_INTERVAL")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_GC_INTERVAL);

    let driver = Arc::new(
        LocalDriver::open(config)
            .context("failed to open local cache storage")?,
    );
    let stats = driver.stats();
    info!(
        "Storage ready at {}: {} files, {} bytes",
        driver.storage_path().display(),
        stats.file_count,
        stats.total_bytes
    );

    let gc_handle = spawn_gc_task(driver.clone(), interval);

    shutdown_signal().await;

    gc_handle.abort();
    warn!("GC sweep task aborted");

    driver.close();
    info!("GC daemon shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
