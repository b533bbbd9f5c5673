//! Cache Statistics Module
//!
//! Tracks how intercepted requests were served.

use serde::Serialize;

// == Cache Stats ==
/// Counters for cache and strategy outcomes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups that found a stored response
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Responses written into a generation
    pub writes: u64,
    /// Writes refused (non-GET, partial content, `Vary: *`)
    pub rejected_writes: u64,
    /// Background revalidations started
    pub revalidations: u64,
    /// Revalidations that failed on the network
    pub revalidation_failures: u64,
    /// Config requests answered from cache after a network failure
    pub network_fallbacks: u64,
    /// Stale generations deleted
    pub generations_purged: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_write(&mut self) {
        self.writes += 1;
    }

    pub fn record_rejected_write(&mut self) {
        self.rejected_writes += 1;
    }

    pub fn record_revalidation(&mut self) {
        self.revalidations += 1;
    }

    pub fn record_revalidation_failure(&mut self) {
        self.revalidation_failures += 1;
    }

    pub fn record_network_fallback(&mut self) {
        self.network_fallbacks += 1;
    }

    pub fn record_purge(&mut self) {
        self.generations_purged += 1;
    }
}
