//! Cache Statistics Module
//!
//! Counters reported by `GET /api/cache/stats`.

use serde::Serialize;

/// Outcome of a single cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Hit,
    Miss,
    /// Entry was present but stale; it counts as a miss too.
    Expired,
}

// == Cache Stats ==
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups served from a valid entry
    pub hits: u64,
    /// Lookups that found nothing usable (absent or expired)
    pub misses: u64,
    /// Entries removed to make room for a new key
    pub evictions: u64,
    /// Entries removed because their TTL elapsed
    pub expirations: u64,
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of lookups that were hits, 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            lookups => self.hits as f64 / lookups as f64,
        }
    }

    pub fn record_lookup(&mut self, outcome: Lookup) {
        match outcome {
            Lookup::Hit => self.hits += 1,
            Lookup::Miss => self.misses += 1,
            Lookup::Expired => {
                self.misses += 1;
                self.expirations += 1;
            }
        }
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Expired entries dropped by a sweep rather than a lookup.
    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats() {
        let stats = CacheStats::new();
        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_expired_lookup_is_a_miss() {
        let mut stats = CacheStats::new();
        stats.record_lookup(Lookup::Hit);
        stats.record_lookup(Lookup::Hit);
        stats.record_lookup(Lookup::Hit);
        stats.record_lookup(Lookup::Expired);

        assert_eq!(stats.misses, 1);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_sweep_and_eviction_counters() {
        let mut stats = CacheStats::new();
        stats.record_lookup(Lookup::Miss);
        stats.record_eviction();
        stats.record_expirations(3);
        stats.set_total_entries(7);

        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.expirations, 3);
        assert_eq!(stats.total_entries, 7);
    }
}
