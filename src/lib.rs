//! CachedMap - A thread-safe expiring key/value cache
//!
//! Entries expire at an absolute remove time and the whole table is flushed
//! by a background thread once per flush cycle. Usage counters are exposed
//! as a serializable stats snapshot.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CachedMap, SharedLogger, Stats, StatsLogger, TracingStatsLogger};
pub use config::Config;
pub use error::{CacheError, Result};
