//! Cache Entry Module
//!
//! Defines the record stored under each key: a shared value handle plus the
//! absolute instant at which readers stop seeing it.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

// == Cache Entry ==
/// A single cache entry: the stored value and its remove time.
#[derive(Debug)]
pub struct CacheEntry<V> {
    /// The stored value handle
    pub data: Arc<V>,
    /// Wall-clock instant at or after which the entry is expired
    pub remove_time: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry that expires at `remove_time`.
    pub fn new(data: Arc<V>, remove_time: DateTime<Utc>) -> Self {
        Self { data, remove_time }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at the given instant.
    ///
    /// Boundary condition: an entry whose remove time equals `now` is
    /// already expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.remove_time
    }

    /// Checks if the entry has expired against the current wall clock.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

// Derived Clone would demand `V: Clone`; only the handle is cloned.
impl<V> Clone for CacheEntry<V> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            remove_time: self.remove_time,
        }
    }
}

// == Utility Functions ==
/// Converts a std duration to a chrono delta, saturating on overflow.
pub fn to_time_delta(duration: std::time::Duration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX)
}

/// Returns `now + ttl`, clamped to the latest representable instant.
pub fn remove_time_after(now: DateTime<Utc>, ttl: TimeDelta) -> DateTime<Utc> {
    now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_entry_not_expired_before_remove_time() {
        let entry = CacheEntry::new(Arc::new(42), Utc::now() + TimeDelta::seconds(60));

        assert_eq!(*entry.data, 42);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expires_after_remove_time() {
        let entry = CacheEntry::new(Arc::new("v"), Utc::now() + TimeDelta::milliseconds(50));

        assert!(!entry.is_expired());
        sleep(Duration::from_millis(100));
        assert!(entry.is_expired());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Utc::now();
        let entry = CacheEntry::new(Arc::new(()), now);

        assert!(entry.is_expired_at(now), "Entry should be expired at boundary");
        assert!(!entry.is_expired_at(now - TimeDelta::milliseconds(1)));
    }

    #[test]
    fn test_clone_shares_handle() {
        let entry = CacheEntry::new(Arc::new(vec![1, 2, 3]), Utc::now());
        let copy = entry.clone();

        assert!(Arc::ptr_eq(&entry.data, &copy.data));
        assert_eq!(entry.remove_time, copy.remove_time);
    }

    #[test]
    fn test_remove_time_saturates() {
        let ttl = to_time_delta(Duration::from_secs(u64::MAX));
        assert_eq!(ttl, TimeDelta::MAX);
        assert_eq!(remove_time_after(Utc::now(), ttl), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_remove_time_adds_ttl() {
        let now = Utc::now();
        let removal = remove_time_after(now, to_time_delta(Duration::from_secs(10)));
        assert_eq!(removal - now, TimeDelta::seconds(10));
    }
}
