//! Lookup counters behind `GET /cache/stats`.

/// Hit and miss counts of the response cache.
///
/// `total_entries` is only meaningful on the snapshot returned by
/// [`ResponseCache::stats`](crate::cache::ResponseCache::stats); the live
/// counters leave it at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    /// Absent keys and expired entries alike
    pub misses: u64,
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one lookup.
    pub fn record(&mut self, hit: bool) {
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }

    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Share of lookups served from the cache; 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }

    /// Copy of the counters tagged with the current entry count.
    pub fn with_entries(self, total_entries: usize) -> Self {
        Self {
            total_entries,
            ..self
        }
    }
}
