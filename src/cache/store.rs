//! Cache Store Module
//!
//! The expiring map itself: a single guarded entry table, lock-free counters
//! and a background flusher that periodically swaps the whole table out.

use std::collections::HashMap;
use std::fmt;
use std::mem;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::cache::entry::{remove_time_after, to_time_delta};
use crate::cache::{CacheEntry, Counters, Stats, StatsLogger, INITIAL_CAPACITY};
use crate::config::Config;
use crate::error::Result;
use crate::tasks::{spawn_flusher, FlusherHandle};

/// Optional, shareable stats sink.
pub type SharedLogger = Arc<dyn StatsLogger>;

// == Shared State ==
/// State reachable from both the public handle and the flusher thread.
pub(crate) struct Shared<V> {
    name: String,
    key_timeout: Duration,
    key_ttl: TimeDelta,
    flush_cycle: Duration,
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    /// Mirror of `entries.len()`, written under the exclusive guard
    length: AtomicUsize,
    counters: Counters,
    log: RwLock<Option<SharedLogger>>,
}

impl<V> Shared<V> {
    fn len(&self) -> usize {
        self.length.load(Ordering::Relaxed)
    }

    fn stats(&self) -> Stats {
        let length = self.len();
        let max_length = self.counters.observe_length(length);

        Stats {
            name: self.name.clone(),
            hits: self.counters.hits(),
            misses: self.counters.misses(),
            writes: self.counters.writes(),
            flushes: self.counters.flushes(),
            max_length,
            length,
            key_ttl: self.key_timeout.as_secs(),
            flush_cycle: self.flush_cycle.as_secs(),
        }
    }

    // == Flush ==
    /// Swaps the entry table for an empty one and reports the new stats.
    ///
    /// Returns the number of entries that were discarded.
    pub(crate) fn flush(&self) -> usize {
        let displaced = {
            let mut entries = self.entries.write();
            let capacity = INITIAL_CAPACITY.max(entries.len() + 10);
            let displaced = mem::replace(&mut *entries, HashMap::with_capacity(capacity));
            self.length.store(0, Ordering::Relaxed);
            displaced
        };

        let flushed = displaced.len();
        self.counters.observe_length(flushed);
        self.counters.record_flush();

        let log = self.log.read().clone();
        if let Some(log) = log {
            log.log_stats(&self.stats());
        }

        // Values are released here, outside the guard.
        drop(displaced);
        flushed
    }
}

// == Cached Map ==
/// Thread-safe expiring key/value cache with periodic bulk eviction.
///
/// Values are stored as [`Arc`] handles and never copied. Every entry carries
/// an absolute remove time; reads at or after that instant are misses. A
/// background thread empties the whole table once per flush cycle.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use cachedmap::CachedMap;
///
/// let cache = CachedMap::new("users", Duration::from_secs(60), Duration::from_secs(600), None)?;
/// cache.set("alice", 42);
/// assert_eq!(cache.get("alice").as_deref(), Some(&42));
/// # Ok::<(), cachedmap::CacheError>(())
/// ```
pub struct CachedMap<V> {
    shared: Arc<Shared<V>>,
    flusher: FlusherHandle,
}

impl<V> CachedMap<V>
where
    V: Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache and starts its flusher immediately.
    ///
    /// # Arguments
    /// * `name` - Identifier reported in stats
    /// * `key_timeout` - TTL applied by [`CachedMap::set`]
    /// * `flush_cycle` - Interval between full-table flushes
    /// * `log` - Optional sink for the stats emitted after each flush
    pub fn new(
        name: impl Into<String>,
        key_timeout: Duration,
        flush_cycle: Duration,
        log: Option<SharedLogger>,
    ) -> Result<Self> {
        let name = name.into();
        let shared = Arc::new(Shared {
            name: name.clone(),
            key_timeout,
            key_ttl: to_time_delta(key_timeout),
            flush_cycle,
            entries: RwLock::new(HashMap::with_capacity(INITIAL_CAPACITY)),
            length: AtomicUsize::new(0),
            counters: Counters::new(),
            log: RwLock::new(log),
        });

        let flusher = spawn_flusher(Arc::downgrade(&shared), flush_cycle)?;

        info!(
            name = %name,
            key_timeout = ?key_timeout,
            flush_cycle = ?flush_cycle,
            "Cached map created"
        );

        Ok(Self { shared, flusher })
    }

    /// Creates a cache from loaded configuration.
    pub fn from_config(config: &Config, log: Option<SharedLogger>) -> Result<Self> {
        Self::new(
            config.name.clone(),
            config.key_timeout(),
            config.flush_cycle(),
            log,
        )
    }
}

impl<V> CachedMap<V> {
    // == Set ==
    /// Stores `data` under `key`, expiring one key timeout from now.
    ///
    /// Returns the computed remove time so it can be reused in a
    /// coordinated [`CachedMap::set_until`] on another cache.
    pub fn set(&self, key: impl Into<String>, data: V) -> DateTime<Utc> {
        let remove_time = remove_time_after(Utc::now(), self.shared.key_ttl);
        self.set_until(key, data, remove_time);
        remove_time
    }

    // == Set Until ==
    /// Stores `data` under `key` with an explicit remove time.
    ///
    /// A remove time already in the past is accepted and counted as a
    /// write; the entry is simply never returned.
    pub fn set_until(&self, key: impl Into<String>, data: V, remove_time: DateTime<Utc>) {
        let entry = CacheEntry::new(Arc::new(data), remove_time);

        let replaced = {
            let mut entries = self.shared.entries.write();
            let replaced = entries.insert(key.into(), entry);
            self.shared.length.store(entries.len(), Ordering::Relaxed);
            self.shared.counters.record_write();
            replaced
        };
        drop(replaced);
    }

    // == Get ==
    /// Returns the value stored under `key` if it has not expired.
    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        // The shared guard is released at the end of this statement.
        let entry = self.shared.entries.read().get(key).cloned();

        match entry {
            Some(entry) if !entry.is_expired() => {
                self.shared.counters.record_hit();
                Some(entry.data)
            }
            _ => {
                self.shared.counters.record_miss();
                None
            }
        }
    }

    // == Length ==
    /// Returns the current number of entries, expired ones included.
    ///
    /// Read without the guard; use [`CachedMap::stats`] for a snapshot.
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    /// Returns true if the table currently holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Stats ==
    /// Returns a snapshot of the counters and configuration.
    pub fn stats(&self) -> Stats {
        self.shared.stats()
    }

    // == Set Log ==
    /// Replaces the sink that receives stats after each flush.
    ///
    /// `None` silences emission.
    pub fn set_log(&self, log: Option<SharedLogger>) {
        debug!(name = %self.shared.name, enabled = log.is_some(), "Replacing stats logger");
        *self.shared.log.write() = log;
    }

    /// Flushes the table immediately, as one flush cycle would.
    ///
    /// Returns the number of entries discarded.
    pub fn flush(&self) -> usize {
        self.shared.flush()
    }

    /// Stops the background flusher and waits for it to exit.
    ///
    /// The cache keeps serving reads and writes; entries are simply no
    /// longer flushed. Calling this more than once is a no-op.
    pub fn stop_flusher(&self) {
        self.flusher.stop();
    }

    /// Name reported in stats.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// TTL applied by [`CachedMap::set`].
    pub fn key_timeout(&self) -> Duration {
        self.shared.key_timeout
    }

    /// Interval between background flushes.
    pub fn flush_cycle(&self) -> Duration {
        self.shared.flush_cycle
    }
}

impl<V> fmt::Display for CachedMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counters = &self.shared.counters;
        write!(
            f,
            "<len={} maxlen={} hits={} misses={} writes={} flushes={} ttl={:?} fc={:?}>",
            self.len(),
            counters.max_length(),
            counters.hits(),
            counters.misses(),
            counters.writes(),
            counters.flushes(),
            self.shared.key_timeout,
            self.shared.flush_cycle,
        )
    }
}

impl<V> fmt::Debug for CachedMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedMap")
            .field("name", &self.shared.name)
            .field("len", &self.len())
            .field("key_timeout", &self.shared.key_timeout)
            .field("flush_cycle", &self.shared.flush_cycle)
            .finish_non_exhaustive()
    }
}
