//! Cache Statistics Module
//!
//! Lock-free usage counters and the serializable stats snapshot built from them.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

// == Stats Snapshot ==
/// Point-in-time projection of the counters and configuration.
///
/// Fields are sampled independently; no cross-field atomicity is promised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Human-readable cache name
    pub name: String,
    /// Gets that returned a live entry
    pub hits: u64,
    /// Gets on absent or expired keys
    pub misses: u64,
    /// Calls to `set` and `set_until`
    pub writes: u64,
    /// Completed table flushes
    pub flushes: u64,
    /// Largest entry count ever observed
    pub max_length: usize,
    /// Entry count at sampling time
    pub length: usize,
    /// Default key TTL in whole seconds
    pub key_ttl: u64,
    /// Flush interval in whole seconds
    pub flush_cycle: u64,
}

impl Stats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Counter Block ==
/// Monotonic tallies shared between readers, writers and the flusher.
#[derive(Debug, Default)]
pub struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    flushes: AtomicU64,
    max_length: AtomicUsize,
}

impl Counters {
    // == Constructor ==
    /// Creates a counter block with every tally at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the hit counter.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the miss counter.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the write counter.
    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the flush counter.
    pub fn record_flush(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    // == Observe Length ==
    /// Raises the stored maximum to `length` if it is larger, returning the
    /// resulting maximum.
    pub fn observe_length(&self, length: usize) -> usize {
        self.max_length.fetch_max(length, Ordering::Relaxed).max(length)
    }

    /// Current hit count.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Current miss count.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Current write count.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Current flush count.
    pub fn flushes(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }

    /// Largest table length recorded so far.
    pub fn max_length(&self) -> usize {
        self.max_length.load(Ordering::Relaxed)
    }
}
