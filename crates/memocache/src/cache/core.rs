//! Core TTL cache implementation
//!
//! Entries live in a `parking_lot::RwLock<HashMap>`. Hits only take the read
//! lock; inserts, deletes, lazy evictions and sweeps take the write lock, so
//! the background sweeper and foreground callers never interleave on the
//! map.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, info, trace, warn};

use super::config::CacheConfig;
use super::entry::{entry_from_millis, CacheEntry};
use super::stats::{CacheStats, MetricsCollector};
use super::sweeper::{SweepState, Sweeper};
use crate::clock::{Clock, SystemClock};
use crate::error::CacheResult;

/// State shared between a cache handle and its sweeper thread
struct Store<V, C> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    clock: C,
    metrics: MetricsCollector,
    track_metrics: bool,
}

impl<V, C: Clock> Store<V, C> {
    fn new(clock: C, track_metrics: bool) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
            metrics: MetricsCollector::new(),
            track_metrics,
        }
    }

    fn evict_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - entries.len();
        drop(entries);

        if self.track_metrics {
            self.metrics.record_sweep();
            self.metrics.record_expirations(removed as u64);
        }
        removed
    }

    fn record(&self, record: impl FnOnce(&MetricsCollector)) {
        if self.track_metrics {
            record(&self.metrics);
        }
    }
}

/// Thread-safe string-keyed cache with per-entry expiration
///
/// Expired entries are never returned: every read checks the deadline and
/// drops a stale entry on the spot. A background sweeper additionally
/// removes expired entries every `sweep_interval` until [`TtlCache::destroy`]
/// is called or the cache is dropped.
///
/// # Type Parameters
/// - `V`: Value type
/// - `C`: Clock used for expiry decisions (defaults to `SystemClock`)
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use memocache::cache::TtlCache;
///
/// let cache: TtlCache<Vec<u32>> = TtlCache::new();
/// cache.set_with_ttl("leads:list", vec![1, 2, 3], Duration::from_secs(30));
/// assert_eq!(cache.get("leads:list"), Some(vec![1, 2, 3]));
/// ```
pub struct TtlCache<V, C = SystemClock>
where
    C: Clock,
{
    store: Arc<Store<V, C>>,
    sweeper: Sweeper,
    config: CacheConfig,
}

impl<V> TtlCache<V, SystemClock>
where
    V: Send + Sync + 'static,
{
    /// Create a cache with the default configuration
    ///
    /// Sweeps every 60 seconds. If the sweeper thread cannot be started the
    /// failure is logged and the cache falls back to lazy expiry only.
    pub fn new() -> Self {
        let config = CacheConfig::default();
        let store = Arc::new(Store::new(SystemClock, config.track_metrics));
        let sweeper = start_sweeper(&store, &config).unwrap_or_else(|err| {
            warn!(error = %err, "Cache sweeper unavailable, relying on lazy expiry");
            Sweeper::disabled()
        });
        Self { store, sweeper, config }
    }

    /// Create a cache sweeping every `interval`
    ///
    /// # Errors
    /// Returns [`crate::CacheError::InvalidConfig`] for a zero interval, or
    /// [`crate::CacheError::SweeperSpawn`] if the sweeper cannot start.
    pub fn with_sweep_interval(interval: Duration) -> CacheResult<Self> {
        Self::with_config(CacheConfig::with_sweep_interval(interval))
    }

    /// Create a cache from an explicit configuration
    ///
    /// # Errors
    /// Same as [`TtlCache::with_clock`].
    pub fn with_config(config: CacheConfig) -> CacheResult<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<V> Default for TtlCache<V, SystemClock>
where
    V: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V, C> TtlCache<V, C>
where
    V: Send + Sync + 'static,
    C: Clock,
{
    /// Create a cache with a custom clock (useful for testing)
    ///
    /// # Errors
    /// Returns [`crate::CacheError::InvalidConfig`] if the configuration
    /// fails validation, or [`crate::CacheError::SweeperSpawn`] if the
    /// sweeper cannot start.
    pub fn with_clock(config: CacheConfig, clock: C) -> CacheResult<Self> {
        config.validate()?;
        let store = Arc::new(Store::new(clock, config.track_metrics));
        let sweeper = start_sweeper(&store, &config)?;
        Ok(Self { store, sweeper, config })
    }
}

fn start_sweeper<V, C>(store: &Arc<Store<V, C>>, config: &CacheConfig) -> CacheResult<Sweeper>
where
    V: Send + Sync + 'static,
    C: Clock,
{
    if !config.background_sweep {
        return Ok(Sweeper::disabled());
    }

    // The sweeper must not keep the store alive on its own.
    let store = Arc::downgrade(store);
    Sweeper::spawn(config.sweep_interval, move || {
        let Some(store) = store.upgrade() else {
            return ControlFlow::Break(());
        };
        let removed = store.evict_expired();
        if removed > 0 {
            debug!(removed, remaining = store.entries.read().len(), "Swept expired cache entries");
        }
        ControlFlow::Continue(())
    })
}

impl<V, C> TtlCache<V, C>
where
    C: Clock,
{
    /// Check whether a live entry exists for `key`
    ///
    /// Applies the same expiry check as [`TtlCache::get`] and drops an
    /// expired entry it runs into.
    pub fn has(&self, key: &str) -> bool {
        self.probe(key, |_| ()).is_some()
    }

    /// Store `value` under `key` without expiration
    ///
    /// Replaces any existing entry for the key.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.insert_entry(key.into(), CacheEntry::permanent(value));
    }

    /// Store `value` under `key`, expiring `ttl` from now
    ///
    /// A zero TTL stores an entry that is already expired on the next read.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let now = self.store.clock.now();
        self.insert_entry(key.into(), CacheEntry::expiring(value, now, ttl));
    }

    /// Store `value` under `key`, expiring `ttl_ms` milliseconds from now
    ///
    /// Zero or negative values are accepted and yield an entry that reads
    /// as absent.
    pub fn set_with_ttl_millis(&self, key: impl Into<String>, value: V, ttl_ms: i64) {
        let now = self.store.clock.now();
        self.insert_entry(key.into(), entry_from_millis(value, now, ttl_ms));
    }

    /// Remove the entry for `key`
    ///
    /// Returns whether an entry was present, expired or not.
    pub fn delete(&self, key: &str) -> bool {
        let removed = self.store.entries.write().remove(key).is_some();
        if removed {
            self.store.record(MetricsCollector::record_removal);
        }
        removed
    }

    /// Remove every entry regardless of expiration
    ///
    /// Also resets the hit/miss counters when metrics are tracked.
    pub fn clear(&self) {
        self.store.entries.write().clear();
        self.store.record(MetricsCollector::reset);
    }

    /// Number of stored entries
    ///
    /// This is a structural count: entries that are expired but have not
    /// been read or swept yet are included. Call
    /// [`TtlCache::evict_expired`] first for an exact live count.
    pub fn size(&self) -> usize {
        self.store.entries.read().len()
    }

    /// Alias of [`TtlCache::size`]
    pub fn len(&self) -> usize {
        self.size()
    }

    /// Whether no entries are stored, expired or not
    pub fn is_empty(&self) -> bool {
        self.store.entries.read().is_empty()
    }

    /// Remove every expired entry now
    ///
    /// Returns the number of entries removed. Safe to call at any time.
    pub fn evict_expired(&self) -> usize {
        self.store.evict_expired()
    }

    /// Stop the background sweep
    ///
    /// Idempotent. Stored entries are kept and reads keep enforcing expiry;
    /// there is no way to restart sweeping on this instance.
    pub fn destroy(&self) {
        if self.sweeper.stop() {
            info!(size = self.size(), "Cache sweeper destroyed");
        }
    }

    /// Current state of the background sweep
    pub fn sweep_state(&self) -> SweepState {
        self.sweeper.state()
    }

    /// Whether background sweeps are still scheduled
    pub fn is_sweeping(&self) -> bool {
        self.sweep_state() == SweepState::Running
    }

    /// Period between background sweeps
    pub fn sweep_interval(&self) -> Duration {
        self.config.sweep_interval
    }

    /// Configuration this cache was built with
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let now = self.store.clock.now();
        let entries = self.store.entries.read();
        let expired = entries.values().filter(|entry| entry.is_expired_at(now)).count();
        let size = entries.len();
        drop(entries);
        self.store.metrics.snapshot(size, expired)
    }

    fn insert_entry(&self, key: String, entry: CacheEntry<V>) {
        self.store.entries.write().insert(key, entry);
        self.store.record(MetricsCollector::record_insert);
    }

    /// Look up a live entry and project it through `read`
    fn probe<R>(&self, key: &str, read: impl FnOnce(&V) -> R) -> Option<R> {
        let now = self.store.clock.now();
        let stale = {
            let entries = self.store.entries.read();
            match entries.get(key) {
                Some(entry) if !entry.is_expired_at(now) => {
                    let value = read(&entry.value);
                    self.store.record(MetricsCollector::record_hit);
                    return Some(value);
                }
                Some(_) => true,
                None => false,
            }
        };

        if stale {
            let mut entries = self.store.entries.write();
            // A concurrent set may have replaced the stale entry in between.
            match entries.get(key) {
                Some(entry) if !entry.is_expired_at(now) => {
                    let value = read(&entry.value);
                    self.store.record(MetricsCollector::record_hit);
                    return Some(value);
                }
                Some(_) => {
                    entries.remove(key);
                    trace!(key, "Evicted expired cache entry on read");
                    self.store.record(|metrics| metrics.record_expirations(1));
                }
                None => {}
            }
        }

        self.store.record(MetricsCollector::record_miss);
        None
    }

    fn store_value(&self, key: &str, value: V, ttl: Option<Duration>) {
        match ttl {
            Some(ttl) => self.set_with_ttl(key, value, ttl),
            None => self.set(key, value),
        }
    }
}

impl<V, C> TtlCache<V, C>
where
    V: Clone,
    C: Clock,
{
    /// Get a clone of the live value stored under `key`
    ///
    /// Returns `None` for unknown keys and for entries whose deadline has
    /// passed; an expired entry is removed before returning, whether or not
    /// a sweep has run.
    pub fn get(&self, key: &str) -> Option<V> {
        self.probe(key, V::clone)
    }

    /// Get the cached value or compute and store it
    ///
    /// `produce` only runs on a miss. `ttl` of `None` stores the value
    /// without expiration.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    ///
    /// use memocache::cache::TtlCache;
    ///
    /// let cache: TtlCache<u64> = TtlCache::new();
    /// let total = cache.get_or_insert_with("invoices:total", Some(Duration::from_secs(60)), || 42);
    /// assert_eq!(total, 42);
    /// assert_eq!(cache.get_or_insert_with("invoices:total", None, || 0), 42);
    /// ```
    pub fn get_or_insert_with<F>(&self, key: &str, ttl: Option<Duration>, produce: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(key) {
            return value;
        }
        let value = produce();
        self.store_value(key, value.clone(), ttl);
        value
    }

    /// Fallible variant of [`TtlCache::get_or_insert_with`]
    ///
    /// # Errors
    /// Returns the error from `produce` unchanged; nothing is cached then.
    pub fn get_or_try_insert_with<F, E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        produce: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = produce()?;
        self.store_value(key, value.clone(), ttl);
        Ok(value)
    }

    /// Async variant of [`TtlCache::get_or_insert_with`]
    ///
    /// No lock is held while `produce` is awaited, so concurrent misses on
    /// the same key may each compute a value; the last one stored wins.
    pub async fn get_or_insert_with_async<F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        produce: F,
    ) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        if let Some(value) = self.get(key) {
            return value;
        }
        let value = produce().await;
        self.store_value(key, value.clone(), ttl);
        value
    }

    /// Async fallible variant of [`TtlCache::get_or_insert_with`]
    ///
    /// # Errors
    /// Returns the error from `produce` unchanged; nothing is cached then.
    pub async fn get_or_try_insert_with_async<F, Fut, E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        produce: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = produce().await?;
        self.store_value(key, value.clone(), ttl);
        Ok(value)
    }
}

impl<V, C> fmt::Debug for TtlCache<V, C>
where
    C: Clock,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("size", &self.size())
            .field("sweep_state", &self.sweep_state())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cache::core.
    use std::thread;

    use super::*;
    use crate::clock::MockClock;
    use crate::error::CacheError;

    fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        while std::time::Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        condition()
    }

    fn mock_cache<V: Send + Sync + 'static>() -> (TtlCache<V, MockClock>, MockClock) {
        let clock = MockClock::new();
        let config = CacheConfig::builder().background_sweep(false).track_metrics(true).build();
        let cache = TtlCache::with_clock(config, clock.clone()).unwrap();
        (cache, clock)
    }

    /// Validates `TtlCache::new` behavior for the cache new scenario.
    ///
    /// Assertions:
    /// - Confirms `cache.size()` equals `0`.
    /// - Ensures the background sweep is running with the default interval.
    #[test]
    fn test_cache_new() {
        let cache: TtlCache<i32> = TtlCache::new();
        assert_eq!(cache.size(), 0);
        assert!(cache.is_empty());
        assert!(cache.is_sweeping());
        assert_eq!(cache.sweep_interval(), Duration::from_millis(60_000));
    }

    /// Validates `TtlCache::set_with_ttl` behavior for the expiry honored on
    /// read scenario.
    ///
    /// Assertions:
    /// - Confirms the value is returned before the deadline.
    /// - Confirms `get` returns `None` once the TTL has elapsed without any
    ///   sweep.
    /// - Confirms the stale entry was removed by the read.
    #[test]
    fn test_expiry_honored_on_read() {
        let (cache, clock) = mock_cache();
        cache.set_with_ttl("session", 7, Duration::from_secs(10));

        clock.advance(Duration::from_secs(9));
        assert_eq!(cache.get("session"), Some(7));

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.size(), 1);
        assert_eq!(cache.get("session"), None);
        assert_eq!(cache.size(), 0);
    }

    /// Validates `TtlCache::set_with_ttl_millis` behavior for the list endpoint
    /// memo scenario.
    ///
    /// Assertions:
    /// - Confirms the list is served within its 30 second TTL.
    /// - Confirms it reads as absent one millisecond later.
    /// - Ensures the read removed the entry from `size()`.
    #[test]
    fn test_list_endpoint_memo_expires() {
        let (cache, clock) = mock_cache();
        cache.set_with_ttl_millis("leads:list", vec![1, 2, 3], 30_000);
        assert_eq!(cache.get("leads:list"), Some(vec![1, 2, 3]));

        clock.advance_millis(30_001);
        assert_eq!(cache.get("leads:list"), None);
        assert!(!cache.has("leads:list"));
        assert_eq!(cache.size(), 0);
    }

    /// Validates `TtlCache::set` behavior for the permanent entry scenario.
    ///
    /// Assertions:
    /// - Ensures an entry without TTL is still served after 30 days.
    #[test]
    fn test_permanent_entry_survives() {
        let (cache, clock) = mock_cache();
        cache.set("reference:countries", vec!["DE", "FR"]);
        clock.advance(Duration::from_secs(86_400 * 30));
        assert_eq!(cache.get("reference:countries"), Some(vec!["DE", "FR"]));
    }

    /// Validates `TtlCache::set` behavior for the overwrite scenario.
    ///
    /// Assertions:
    /// - Confirms the second value replaces the first.
    /// - Ensures the old TTL no longer applies.
    #[test]
    fn test_overwrite_replaces_value_and_ttl() {
        let (cache, clock) = mock_cache();
        cache.set_with_ttl("k", 1, Duration::from_secs(1));
        cache.set("k", 2);

        clock.advance(Duration::from_secs(5));
        assert_eq!(cache.get("k"), Some(2));
        assert_eq!(cache.size(), 1);
    }

    /// Validates `TtlCache::set_with_ttl_millis` behavior for the non-positive
    /// TTL scenario.
    ///
    /// Assertions:
    /// - Ensures zero and negative TTLs are stored but read as absent.
    /// - Ensures `Duration::ZERO` behaves the same way.
    #[test]
    fn test_non_positive_ttl_reads_absent() {
        let (cache, _clock) = mock_cache();
        cache.set_with_ttl_millis("zero", 1, 0);
        cache.set_with_ttl_millis("negative", 2, -100);
        cache.set_with_ttl("duration-zero", 3, Duration::ZERO);
        assert_eq!(cache.size(), 3);

        assert!(!cache.has("zero"));
        assert_eq!(cache.get("negative"), None);
        assert_eq!(cache.get("duration-zero"), None);
        assert_eq!(cache.size(), 0);
    }

    /// Validates `TtlCache::has` behavior for the lazy expiry scenario.
    ///
    /// Assertions:
    /// - Ensures `has` is true before the deadline and false at it.
    /// - Ensures `has` removes the expired entry.
    #[test]
    fn test_has_applies_lazy_expiry() {
        let (cache, clock) = mock_cache();
        cache.set_with_ttl("a", (), Duration::from_millis(10));
        assert!(cache.has("a"));

        clock.advance_millis(10);
        assert!(!cache.has("a"));
        assert_eq!(cache.size(), 0);
    }

    /// Validates `TtlCache::delete` behavior for the delete idempotence
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures the first delete returns true and the second false.
    /// - Ensures deleting an unknown key returns false.
    #[test]
    fn test_delete_idempotence() {
        let (cache, _clock) = mock_cache();
        cache.set("k", 1);

        assert!(cache.delete("k"));
        assert!(!cache.delete("k"));
        assert!(!cache.delete("never-set"));
        assert_eq!(cache.get("k"), None);
    }

    /// Validates `TtlCache::clear` behavior for the mixed entries scenario.
    ///
    /// Assertions:
    /// - Confirms `size()` is `0` afterwards.
    /// - Ensures permanent, live and expired keys all read as absent.
    #[test]
    fn test_clear_is_total() {
        let (cache, _clock) = mock_cache();
        cache.set("a", 1);
        cache.set_with_ttl("b", 2, Duration::from_secs(3600));
        cache.set_with_ttl_millis("c", 3, -1);

        cache.clear();
        assert_eq!(cache.size(), 0);
        for key in ["a", "b", "c"] {
            assert_eq!(cache.get(key), None);
        }
    }

    /// Validates `TtlCache::evict_expired` behavior for the sweep removes only
    /// expired scenario.
    ///
    /// Assertions:
    /// - Confirms exactly one entry is removed.
    /// - Ensures the TTL entry is gone and the permanent entry remains.
    /// - Ensures a second sweep removes nothing.
    #[test]
    fn test_evict_expired_removes_only_expired() {
        let (cache, clock) = mock_cache();
        cache.set_with_ttl("a", 1, Duration::from_millis(10));
        cache.set("b", 2);

        clock.advance_millis(20);
        assert_eq!(cache.size(), 2);
        assert_eq!(cache.evict_expired(), 1);
        assert_eq!(cache.size(), 1);
        assert!(!cache.has("a"));
        assert!(cache.has("b"));
        assert_eq!(cache.evict_expired(), 0);
    }

    /// Validates `TtlCache::size` behavior for the stale entries scenario.
    ///
    /// Assertions:
    /// - Confirms `size()` still counts expired but unread entries.
    /// - Confirms `stats()` reports them as expired and not live.
    #[test]
    fn test_size_counts_stale_entries() {
        let (cache, clock) = mock_cache();
        cache.set_with_ttl("a", 1, Duration::from_secs(1));
        cache.set_with_ttl("b", 2, Duration::from_secs(1));
        clock.advance(Duration::from_secs(2));

        assert_eq!(cache.size(), 2);
        let stats = cache.stats();
        assert_eq!(stats.expired_entries, 2);
        assert_eq!(stats.live_entries(), 0);
    }

    /// Validates `TtlCache::stats` behavior for the metrics tracking scenario.
    ///
    /// Assertions:
    /// - Confirms hits, misses, inserts, removals and expirations are counted.
    /// - Confirms `clear` resets the counters.
    #[test]
    fn test_stats_tracking() {
        let (cache, clock) = mock_cache();
        cache.set("a", 1);
        cache.set_with_ttl("b", 2, Duration::from_secs(1));

        let _ = cache.get("a"); // hit
        let _ = cache.get("missing"); // miss
        clock.advance(Duration::from_secs(1));
        let _ = cache.get("b"); // miss + expiration
        assert!(cache.delete("a"));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.inserts, 2);
        assert_eq!(stats.removals, 1);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.size, 0);

        cache.set("c", 3);
        let _ = cache.evict_expired();
        assert_eq!(cache.stats().sweeps, 1);

        cache.clear();
        assert_eq!(cache.stats(), CacheStats::default());
    }

    /// Validates `TtlCache::stats` behavior for the metrics disabled scenario.
    ///
    /// Assertions:
    /// - Confirms `size` is reported.
    /// - Ensures counters stay at zero.
    #[test]
    fn test_stats_untracked_by_default() {
        let cache: TtlCache<i32> = TtlCache::with_config(CacheConfig::lazy_only()).unwrap();
        cache.set("a", 1);
        let _ = cache.get("a");

        let stats = cache.stats();
        assert_eq!(stats.size, 1);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.inserts, 0);
    }

    /// Validates `TtlCache::destroy` behavior for the idempotent teardown
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures the sweep transitions from running to stopped once.
    /// - Ensures stored entries survive and stay readable.
    #[test]
    fn test_destroy_is_idempotent() {
        let cache: TtlCache<i32> = TtlCache::new();
        cache.set("k", 1);
        assert_eq!(cache.sweep_state(), SweepState::Running);

        cache.destroy();
        cache.destroy();

        assert_eq!(cache.sweep_state(), SweepState::Stopped);
        assert_eq!(cache.get("k"), Some(1));
        cache.set("j", 2);
        assert_eq!(cache.size(), 2);
    }

    /// Validates `Drop for TtlCache` behavior for the abandoned cache
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures the running sweeper holds exactly one weak handle to the
    ///   store.
    /// - Ensures dropping the cache ends the sweeper thread even while the
    ///   store is kept alive elsewhere.
    #[test]
    fn test_drop_stops_sweeper_thread() {
        let cache: TtlCache<i32> = TtlCache::with_sweep_interval(Duration::from_millis(5)).unwrap();
        let store = Arc::clone(&cache.store);
        assert_eq!(Arc::weak_count(&store), 1);

        drop(cache);
        assert!(wait_until(Duration::from_secs(2), || Arc::weak_count(&store) == 0));
    }

    /// Validates `TtlCache::destroy` behavior for the sweeper release
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures the sweeper thread lets go of the store after `destroy`.
    /// - Ensures the store is freed once the last cache handle is dropped.
    #[test]
    fn test_destroy_releases_store() {
        let cache: TtlCache<i32> = TtlCache::with_sweep_interval(Duration::from_millis(5)).unwrap();
        cache.set_with_ttl("k", 1, Duration::from_millis(1));

        cache.destroy();
        assert!(wait_until(Duration::from_secs(2), || Arc::weak_count(&cache.store) == 0));

        let store = Arc::downgrade(&cache.store);
        drop(cache);
        assert!(store.upgrade().is_none());
    }

    /// Validates `TtlCache::with_config` behavior for the lazy only scenario.
    ///
    /// Assertions:
    /// - Ensures no sweeper is started.
    /// - Ensures `destroy` leaves the state `Disabled`.
    #[test]
    fn test_lazy_only_is_disabled() {
        let cache: TtlCache<i32> = TtlCache::with_config(CacheConfig::lazy_only()).unwrap();
        assert_eq!(cache.sweep_state(), SweepState::Disabled);
        cache.destroy();
        assert_eq!(cache.sweep_state(), SweepState::Disabled);
    }

    /// Validates `TtlCache::with_sweep_interval` behavior for the zero interval
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures construction fails with `InvalidConfig`.
    #[test]
    fn test_zero_sweep_interval_rejected() {
        let result: CacheResult<TtlCache<i32>> = TtlCache::with_sweep_interval(Duration::ZERO);
        assert!(matches!(result, Err(CacheError::InvalidConfig { .. })));
    }

    /// Validates `TtlCache::get_or_insert_with` behavior for the memoization
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures the producer runs on a miss only.
    /// - Ensures the producer runs again once the TTL elapses.
    #[test]
    fn test_get_or_insert_with_memoizes() {
        let (cache, clock) = mock_cache();
        let mut calls = 0;

        let first = cache.get_or_insert_with("campaigns", Some(Duration::from_secs(5)), || {
            calls += 1;
            vec![1, 2]
        });
        let second = cache.get_or_insert_with("campaigns", Some(Duration::from_secs(5)), || {
            calls += 1;
            vec![9]
        });
        assert_eq!(first, vec![1, 2]);
        assert_eq!(second, vec![1, 2]);
        assert_eq!(calls, 1);

        clock.advance(Duration::from_secs(5));
        let third = cache.get_or_insert_with("campaigns", None, || {
            calls += 1;
            vec![3]
        });
        assert_eq!(third, vec![3]);
        assert_eq!(calls, 2);
    }

    /// Validates `TtlCache::get_or_try_insert_with` behavior for the failing
    /// producer scenario.
    ///
    /// Assertions:
    /// - Ensures the error is returned unchanged and nothing is cached.
    /// - Ensures a later successful producer stores its value.
    #[test]
    fn test_get_or_try_insert_with_error_caches_nothing() {
        let (cache, _clock) = mock_cache::<u32>();

        let failed: Result<u32, &str> =
            cache.get_or_try_insert_with("rates", None, || Err("upstream unavailable"));
        assert_eq!(failed, Err("upstream unavailable"));
        assert!(!cache.has("rates"));

        let ok: Result<u32, &str> = cache.get_or_try_insert_with("rates", None, || Ok(12));
        assert_eq!(ok, Ok(12));
        assert_eq!(cache.get("rates"), Some(12));
    }

    /// Validates `TtlCache::get_or_insert_with_async` behavior for the awaited
    /// producer scenario.
    ///
    /// Assertions:
    /// - Confirms the computed value is stored and reused.
    /// - Ensures a failing async producer caches nothing.
    #[tokio::test]
    async fn test_get_or_insert_with_async() {
        let (cache, _clock) = mock_cache::<String>();

        let value = cache
            .get_or_insert_with_async("profile", Some(Duration::from_secs(30)), || async {
                tokio::task::yield_now().await;
                "computed".to_string()
            })
            .await;
        assert_eq!(value, "computed");

        let cached = cache
            .get_or_insert_with_async("profile", None, || async { "other".to_string() })
            .await;
        assert_eq!(cached, "computed");

        let err: Result<String, String> = cache
            .get_or_try_insert_with_async("broken", None, || async { Err("boom".to_string()) })
            .await;
        assert!(err.is_err());
        assert!(!cache.has("broken"));
    }

    /// Validates `TtlCache::get_or_insert_with_async` behavior for the expired
    /// memo scenario.
    ///
    /// Assertions:
    /// - Ensures the producer runs again once the TTL elapses.
    /// - Confirms the recomputed value replaces the stale one.
    #[test]
    fn test_async_memo_respects_ttl() {
        let (cache, clock) = mock_cache::<u32>();

        let first = tokio_test::block_on(cache.get_or_insert_with_async(
            "quota",
            Some(Duration::from_secs(1)),
            || async { 1 },
        ));
        clock.advance(Duration::from_secs(1));
        let second = tokio_test::block_on(cache.get_or_insert_with_async(
            "quota",
            Some(Duration::from_secs(1)),
            || async { 2 },
        ));

        assert_eq!((first, second), (1, 2));
        assert_eq!(cache.get("quota"), Some(2));
    }

    /// Validates `Arc::new` behavior for the cache thread safety scenario.
    ///
    /// Assertions:
    /// - Confirms `cache.size()` equals `100` after concurrent inserts.
    /// - Confirms every value is readable afterwards.
    #[test]
    fn test_cache_thread_safety() {
        let cache: Arc<TtlCache<usize>> = Arc::new(TtlCache::new());
        let handles: Vec<_> = (0..10)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for j in 0..10 {
                        let key = format!("key-{i}-{j}");
                        cache.set_with_ttl(key.clone(), i * 10 + j, Duration::from_secs(60));
                        assert!(cache.has(&key));
                        let _ = cache.evict_expired();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.size(), 100);
        assert_eq!(cache.get("key-3-7"), Some(37));
    }

    /// Validates `TtlCache::fmt` behavior for the debug output scenario.
    ///
    /// Assertions:
    /// - Confirms the output shows the size and sweep state.
    #[test]
    fn test_debug_output() {
        let cache: TtlCache<i32> = TtlCache::with_config(CacheConfig::lazy_only()).unwrap();
        cache.set("a", 1);
        let debug = format!("{cache:?}");
        assert!(debug.contains("size: 1"));
        assert!(debug.contains("Disabled"));
    }
}
