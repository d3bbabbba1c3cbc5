//! Cache Module
//!
//! The local file-backed storage engine and its building blocks: entry codec,
//! key-to-location mapper, garbage collector and statistics.

mod codec;
mod entry;
mod gc;
mod locator;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use codec::{DecodeError, Serializer};
pub use entry::{current_timestamp_ms, CacheEntry};
pub use gc::{GarbageCollector, SweepReport};
pub use locator::{digest, validate_key, Locator, RESERVED_KEY_CHARS};
pub use stats::{DriverStats, HitCounters};
pub use store::{LocalDriver, DRIVER_NAME};
