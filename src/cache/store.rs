//! Response Cache Store Module
//!
//! Process-wide key/value store of serialized responses with per-entry expiry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock};

// == Response Cache ==
/// Memoized handler output keyed by a request-derived string.
///
/// There is no capacity limit and no explicit invalidation: entries live
/// until they expire or are overwritten by a later miss.
#[derive(Debug)]
pub struct ResponseCache {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
    /// Time source for expiry checks
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    // == Constructor ==
    /// Creates an empty cache driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty cache driven by `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            clock,
        }
    }

    // == Set ==
    /// Stores a value, overwriting any previous entry and resetting its TTL.
    ///
    /// A `ttl_seconds` of 0 keeps the entry until it is overwritten or the
    /// process exits.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>, ttl_seconds: u64) {
        let entry = CacheEntry::new(value.into(), ttl_seconds, self.clock.now_ms());
        self.entries.insert(key.into(), entry);
    }

    // == Get ==
    /// Returns the value for `key` if present and unexpired.
    ///
    /// Expired entries are removed and counted as misses.
    pub fn get(&mut self, key: &str) -> Option<String> {
        let now = self.clock.now_ms();
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => {
                self.stats.record(true);
                Some(entry.value.clone())
            }
            Some(_) => {
                self.entries.remove(key);
                self.stats.record(false);
                None
            }
            None => {
                self.stats.record(false);
                None
            }
        }
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.with_entries(self.entries.len())
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use std::time::Duration;

    fn cache_with_clock() -> (ResponseCache, ManualClock) {
        let clock = ManualClock::new(1_000_000);
        (ResponseCache::with_clock(Arc::new(clock.clone())), clock)
    }

    #[test]
    fn test_cache_new() {
        let cache = ResponseCache::new();
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_set_and_get() {
        let mut cache = ResponseCache::new();

        cache.set("view//items", r#"{"items":[]}"#, 0);

        assert_eq!(cache.get("view//items").as_deref(), Some(r#"{"items":[]}"#));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_get_missing() {
        let mut cache = ResponseCache::new();
        assert!(cache.get("view//items").is_none());
    }

    #[test]
    fn test_cache_overwrite() {
        let mut cache = ResponseCache::new();

        cache.set("key", "first", 0);
        cache.set("key", "second", 0);

        assert_eq!(cache.get("key").as_deref(), Some("second"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_ttl_expiration() {
        let (mut cache, clock) = cache_with_clock();

        cache.set("key", "value", 5);
        clock.advance(Duration::from_millis(4_999));
        assert!(cache.get("key").is_some());

        clock.advance(Duration::from_millis(1));
        assert!(cache.get("key").is_none());
        assert!(cache.is_empty(), "Expired entry should be removed on read");
    }

    #[test]
    fn test_cache_zero_ttl_never_expires() {
        let (mut cache, clock) = cache_with_clock();

        cache.set("key", "value", 0);
        clock.advance(Duration::from_secs(365 * 24 * 60 * 60));

        assert_eq!(cache.get("key").as_deref(), Some("value"));
    }

    #[test]
    fn test_overwrite_resets_ttl() {
        let (mut cache, clock) = cache_with_clock();

        cache.set("key", "old", 10);
        clock.advance(Duration::from_secs(8));
        cache.set("key", "new", 10);
        clock.advance(Duration::from_secs(8));

        assert_eq!(cache.get("key").as_deref(), Some("new"));
    }

    #[test]
    fn test_cache_stats() {
        let mut cache = ResponseCache::new();

        cache.set("key1", "value1", 0);
        cache.get("key1"); // hit
        cache.get("nonexistent"); // miss

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_cache_cleanup_expired() {
        let (mut cache, clock) = cache_with_clock();

        cache.set("short", "value", 1);
        cache.set("long", "value", 10);
        cache.set("forever", "value", 0);
        clock.advance(Duration::from_secs(2));

        assert_eq!(cache.cleanup_expired(), 1);
        assert_eq!(cache.len(), 2);
        assert!(cache.get("long").is_some());
        assert_eq!(cache.stats().misses, 0);
    }
}
