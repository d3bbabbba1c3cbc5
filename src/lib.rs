//! Local Cache - a uniform key/value cache contract with a file-backed driver
//!
//! Application code talks to the [`CacheDriver`] trait (`get`/`set`/`has`/`delete`
//! and friends). [`LocalDriver`] implements it on a directory of one-file-per-key
//! entries with an in-memory hot index, lazy TTL expiry and probabilistic GC.
//! [`CacheManager`] maps store names to drivers and hands out namespaced
//! [`Cache`] instances.

pub mod cache;
pub mod config;
pub mod driver;
pub mod error;
pub mod manager;
pub mod tasks;

pub use cache::{DriverStats, LocalDriver};
pub use config::LocalConfig;
pub use driver::CacheDriver;
pub use error::{CacheError, Result};
pub use manager::{Cache, CacheManager, ManagerConfig};
pub use tasks::spawn_gc_task;
