//! Flusher Task
//!
//! Background thread that periodically swaps a cache's entry table for an
//! empty one.

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Weak;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::cache::Shared;

/// Name given to every flusher thread.
pub const FLUSHER_THREAD_NAME: &str = "cachedmap-flusher";

/// Shortest interval the flusher will sleep between flushes.
pub const MIN_FLUSH_CYCLE: Duration = Duration::from_millis(1);

// == Flusher Handle ==
/// Owner side of a running flusher.
///
/// Dropping the handle disconnects the stop channel, which also ends the
/// loop at its next wake-up.
#[derive(Debug)]
pub struct FlusherHandle {
    stop: Mutex<Option<Sender<()>>>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl FlusherHandle {
    /// Signals the flusher to exit and joins it.
    ///
    /// When called from the flusher thread itself (a stats logger stopping
    /// its own cache) the join is skipped; the loop ends once the current
    /// flush returns.
    ///
    /// Returns false if the flusher had already been stopped.
    pub fn stop(&self) -> bool {
        let Some(stop) = self.stop.lock().take() else {
            return false;
        };
        // A send error means the thread is already gone.
        let _ = stop.send(());

        let joinable = {
            let mut slot = self.thread.lock();
            let on_flusher = slot
                .as_ref()
                .is_some_and(|handle| handle.thread().id() == thread::current().id());
            if on_flusher {
                debug!("Flusher stopped from its own thread");
                return true;
            }
            slot.take()
        };

        if let Some(handle) = joinable {
            if handle.join().is_err() {
                warn!("Flusher thread panicked");
            }
        }
        true
    }

    /// Returns true once the flusher thread has exited.
    pub fn is_finished(&self) -> bool {
        self.thread
            .lock()
            .as_ref()
            .map_or(true, |thread| thread.is_finished())
    }
}

/// Spawns the thread that flushes `shared` every `flush_cycle`.
///
/// The thread holds only a weak reference, so it exits on its own once the
/// cache is dropped. It never holds the table guard while waiting.
///
/// # Arguments
/// * `shared` - Weak reference to the cache state to flush
/// * `flush_cycle` - Sleep between flushes, clamped to [`MIN_FLUSH_CYCLE`]
///
/// # Returns
/// A [`FlusherHandle`] that can stop the thread, or the I/O error raised
/// when the thread could not be spawned.
pub(crate) fn spawn_flusher<V>(
    shared: Weak<Shared<V>>,
    flush_cycle: Duration,
) -> io::Result<FlusherHandle>
where
    V: Send + Sync + 'static,
{
    let interval = flush_cycle.max(MIN_FLUSH_CYCLE);
    let (stop_tx, stop_rx) = mpsc::channel::<()>();

    let thread = thread::Builder::new()
        .name(FLUSHER_THREAD_NAME.to_string())
        .spawn(move || {
            debug!(interval = ?interval, "Starting cache flusher");

            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) => {
                        info!("Cache flusher stopped");
                        break;
                    }
                    Err(RecvTimeoutError::Disconnected) => {
                        debug!("Cache dropped, flusher exiting");
                        break;
                    }
                }

                let Some(shared) = shared.upgrade() else {
                    debug!("Cache dropped, flusher exiting");
                    break;
                };

                let flushed = shared.flush();
                debug!(flushed, "Cache table flushed");
            }
        })?;

    Ok(FlusherHandle {
        stop: Mutex::new(Some(stop_tx)),
        thread: Mutex::new(Some(thread)),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, OnceLock};
    use std::thread::sleep;

    use crate::cache::{CachedMap, Stats};

    use super::*;

    #[test]
    fn test_flusher_empties_table() {
        let cache = CachedMap::new("f", Duration::from_secs(60), Duration::from_millis(50), None)
            .unwrap();
        cache.set("a", 1);

        sleep(Duration::from_millis(150));

        let stats = cache.stats();
        assert_eq!(stats.length, 0);
        assert!(stats.flushes >= 1);
        assert!(stats.max_length >= 1);
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn test_flusher_can_be_stopped() {
        let cache: CachedMap<u8> =
            CachedMap::new("f", Duration::from_secs(60), Duration::from_millis(20), None).unwrap();

        cache.stop_flusher();
        let flushes = cache.stats().flushes;
        cache.set("kept", 1);

        sleep(Duration::from_millis(100));

        assert_eq!(cache.stats().flushes, flushes);
        assert!(cache.get("kept").is_some());
    }

    #[test]
    fn test_stop_twice_is_noop() {
        let handle = spawn_flusher::<u8>(Weak::new(), Duration::from_secs(60)).unwrap();

        assert!(!handle.is_finished());
        assert!(handle.stop());
        assert!(!handle.stop());
        assert!(handle.is_finished());
    }

    #[test]
    fn test_flusher_emits_stats_to_logger() {
        let seen = Arc::new(Mutex::new(Vec::<Stats>::new()));
        let sink = Arc::clone(&seen);
        let cache: CachedMap<u8> = CachedMap::new(
            "logged",
            Duration::from_secs(60),
            Duration::from_millis(30),
            Some(Arc::new(move |stats: &Stats| sink.lock().push(stats.clone()))),
        )
        .unwrap();

        sleep(Duration::from_millis(100));
        cache.stop_flusher();

        let seen = seen.lock();
        assert!(!seen.is_empty());
        assert!(seen.iter().all(|stats| stats.name == "logged"));
    }

    #[test]
    fn test_flusher_exits_once_cache_is_gone() {
        let handle = spawn_flusher::<u8>(Weak::new(), Duration::from_millis(10)).unwrap();

        sleep(Duration::from_millis(100));

        assert!(handle.is_finished());
        assert!(handle.stop());
    }

    #[test]
    fn test_logger_can_stop_its_own_flusher() {
        let slot: Arc<OnceLock<Weak<CachedMap<u8>>>> = Arc::new(OnceLock::new());
        let stopped = Arc::new(AtomicBool::new(false));

        let (logger_slot, logger_stopped) = (Arc::clone(&slot), Arc::clone(&stopped));
        let cache = Arc::new(
            CachedMap::new(
                "self-stop",
                Duration::from_secs(60),
                Duration::from_millis(20),
                Some(Arc::new(move |_: &Stats| {
                    if let Some(cache) = logger_slot.get().and_then(Weak::upgrade) {
                        cache.stop_flusher();
                        logger_stopped.store(true, Ordering::SeqCst);
                    }
                })),
            )
            .unwrap(),
        );
        slot.set(Arc::downgrade(&cache)).unwrap();

        sleep(Duration::from_millis(150));
        assert!(
            stopped.load(Ordering::SeqCst),
            "stop_flusher should return normally on the flusher thread"
        );

        let flushes = cache.stats().flushes;
        sleep(Duration::from_millis(100));
        assert_eq!(cache.stats().flushes, flushes);

        // Already stopped from inside the logger.
        cache.stop_flusher();
        cache.set("after", 1);
        assert!(cache.get("after").is_some());
    }
}
