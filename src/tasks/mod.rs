//! Background Tasks Module
//!
//! Tasks an embedding application may run alongside its caches.
//!
//! # Tasks
//! - GC Sweep: removes expired entry files at a fixed interval

mod sweeper;

pub use sweeper::spawn_gc_task;
