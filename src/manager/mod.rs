//! Manager Module
//!
//! Namespaced cache instances and the registry of named drivers.

mod namespace;
mod registry;

pub use namespace::{Cache, NAMESPACE_SEPARATOR};
pub use registry::{CacheManager, ManagerConfig, StoreConfig};
