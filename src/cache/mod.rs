//! Cache Module
//!
//! Provides the expiring key/value map with periodic bulk flushing.

mod entry;
mod log;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use log::{StatsLogger, TracingStatsLogger, COMPONENT};
pub use stats::{Counters, Stats};
pub use store::{CachedMap, SharedLogger};

pub(crate) use store::Shared;

// == Public Constants ==
/// Capacity reserved for a freshly created entry table.
pub const INITIAL_CAPACITY: usize = 100;
