//! Response Cache Module
//!
//! Bounded key-value cache with per-entry TTL and FIFO eviction.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::{CacheEntry, CacheStats, InsertionOrder, Lookup};

// == Response Cache ==
/// Bounded cache fronting the upstream model.
///
/// Expired entries are treated as absent and purged lazily on lookup.
/// When a new key would exceed `max_entries`, the oldest inserted entry is
/// evicted. Lookups never change eviction order.
#[derive(Debug)]
pub struct ResponseCache<T> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<T>>,
    /// Insertion order used for eviction
    order: InsertionOrder,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// TTL for entries stored without an explicit one
    default_ttl: Duration,
}

impl<T: Clone> ResponseCache<T> {
    // == Constructor ==
    /// Creates a new cache with the given capacity and default TTL.
    ///
    /// A capacity of zero is raised to one so a fresh insert is always kept.
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            order: InsertionOrder::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
            default_ttl,
        }
    }

    // == Get ==
    /// Returns the value if present and unexpired.
    ///
    /// An expired entry is removed and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<T> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&mut self, key: &str, now: Instant) -> Option<T> {
        let valid = match self.entries.get(key) {
            Some(entry) => entry.is_valid_at(now),
            None => {
                self.stats.record_lookup(Lookup::Miss);
                return None;
            }
        };

        if !valid {
            self.remove_entry(key);
            self.stats.record_lookup(Lookup::Expired);
            return None;
        }

        self.stats.record_lookup(Lookup::Hit);
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Stores a value with the given TTL, or the default TTL if `None`.
    ///
    /// Overwriting an existing key keeps its insertion position and never
    /// evicts. A new key at capacity evicts the oldest inserted entry first.
    pub fn set(&mut self, key: impl Into<String>, value: T, ttl: Option<Duration>) {
        let key = key.into();
        let entry = CacheEntry::new(value, ttl.unwrap_or(self.default_ttl));

        if !self.entries.contains_key(&key) {
            if self.entries.len() >= self.max_entries {
                if let Some(evicted) = self.order.evict_oldest() {
                    self.entries.remove(&evicted);
                    self.stats.record_eviction();
                }
            }
            self.order.push(&key);
        }

        self.entries.insert(key, entry);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Clear ==
    /// Removes every entry unconditionally.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.stats.set_total_entries(0);
    }

    // == Purge Expired ==
    /// Removes all expired entries. Returns the number removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_valid_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove_entry(key);
        }

        self.stats.record_expirations(expired.len());
        expired.len()
    }

    fn remove_entry(&mut self, key: &str) {
        self.entries.remove(key);
        self.order.remove(key);
        self.stats.set_total_entries(self.entries.len());
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// True if the key is stored, expired or not. Does not touch stats.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}
