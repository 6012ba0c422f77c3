//! Cache statistics and metrics tracking
//!
//! Counters are lock-free atomics updated alongside cache operations when
//! `track_metrics` is enabled. Structural figures (`size`,
//! `expired_entries`) are computed at snapshot time regardless.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time statistics for a cache
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries currently stored, including expired ones not yet removed
    pub size: usize,

    /// Stored entries whose deadline has passed but that were not swept yet
    pub expired_entries: usize,

    /// Lookups that returned a live value
    pub hits: u64,

    /// Lookups that found nothing or an expired entry
    pub misses: u64,

    /// Insert or replace operations
    pub inserts: u64,

    /// Entries removed through `delete`
    pub removals: u64,

    /// Expired entries removed lazily or by a sweep
    pub expirations: u64,

    /// Sweeps performed, manual or background
    pub sweeps: u64,
}

impl CacheStats {
    /// Share of lookups that returned a live value
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_accesses();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Share of lookups that found nothing live
    pub fn miss_rate(&self) -> f64 {
        1.0 - self.hit_rate()
    }

    /// Total number of lookups (hits + misses)
    pub fn total_accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// Entries that would still be returned by a read
    pub fn live_entries(&self) -> usize {
        self.size.saturating_sub(self.expired_entries)
    }
}

/// Thread-safe counters behind [`CacheStats`]
#[derive(Debug, Default)]
pub(crate) struct MetricsCollector {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    removals: AtomicU64,
    expirations: AtomicU64,
    sweeps: AtomicU64,
}

impl MetricsCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_removal(&self) {
        self.removals.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_expirations(&self, count: u64) {
        self.expirations.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_sweep(&self) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
    }

    /// Counters combined with the structural figures taken by the caller
    pub(crate) fn snapshot(&self, size: usize, expired_entries: usize) -> CacheStats {
        CacheStats {
            size,
            expired_entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero
    pub(crate) fn reset(&self) {
        for counter in [
            &self.hits,
            &self.misses,
            &self.inserts,
            &self.removals,
            &self.expirations,
            &self.sweeps,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
