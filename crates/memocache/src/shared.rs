//! Process-wide shared cache
//!
//! Request handlers in the same process reach one [`TtlCache`] through
//! [`shared_cache`]. The instance is built on first access with the default
//! configuration and lives for the rest of the process. Values are stored
//! type-erased as [`SharedValue`]; use [`TtlCache::set_as`] and
//! [`TtlCache::get_as`] for typed access.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use memocache::shared::{invalidate_shared_cache, shared_cache};
//!
//! let cache = shared_cache();
//! cache.set_as("leads:list", vec![1_u32, 2, 3], Some(Duration::from_secs(30)));
//! assert_eq!(cache.get_as::<Vec<u32>>("leads:list").as_deref(), Some(&vec![1, 2, 3]));
//!
//! // After a mutation, drop everything memoized so far.
//! invalidate_shared_cache();
//! assert!(!shared_cache().has("leads:list"));
//! ```

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::cache::TtlCache;
use crate::clock::Clock;

/// Type-erased value held by the shared cache
pub type SharedValue = Arc<dyn Any + Send + Sync>;

/// Lazily-initialized holder for one shared cache
///
/// The process-wide instance sits behind [`shared_cache`]; build a separate
/// holder where an isolated, resettable instance is needed.
#[derive(Debug)]
pub struct SharedCache {
    cell: OnceCell<TtlCache<SharedValue>>,
}

impl SharedCache {
    /// Empty holder; no cache is built until first access
    pub const fn new() -> Self {
        Self { cell: OnceCell::new() }
    }

    /// Get the cache, building it on first call
    ///
    /// Concurrent first calls build exactly one instance.
    pub fn get_or_init(&self) -> &TtlCache<SharedValue> {
        self.cell.get_or_init(|| {
            debug!("Initializing shared cache");
            TtlCache::new()
        })
    }

    /// Get the cache if it was already built
    pub fn get(&self) -> Option<&TtlCache<SharedValue>> {
        self.cell.get()
    }

    /// Whether the cache was built
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Clear the cache if it exists
    ///
    /// Never builds a cache. Returns whether one was cleared.
    pub fn invalidate(&self) -> bool {
        match self.cell.get() {
            Some(cache) => {
                let size = cache.size();
                cache.clear();
                debug!(size, "Invalidated shared cache");
                true
            }
            None => false,
        }
    }
}

impl Default for SharedCache {
    fn default() -> Self {
        Self::new()
    }
}

static SHARED: SharedCache = SharedCache::new();

/// Process-wide shared cache
///
/// The first call builds the instance; every later call returns the same
/// one.
pub fn shared_cache() -> &'static TtlCache<SharedValue> {
    SHARED.get_or_init()
}

/// Clear the process-wide shared cache
///
/// A no-op when nothing has touched the shared cache yet.
pub fn invalidate_shared_cache() {
    SHARED.invalidate();
}

/// The process-wide shared cache, if it was built already
pub fn shared_cache_if_initialized() -> Option<&'static TtlCache<SharedValue>> {
    SHARED.get()
}

impl<C> TtlCache<SharedValue, C>
where
    C: Clock,
{
    /// Store a typed value; `ttl` of `None` never expires
    pub fn set_as<T>(&self, key: impl Into<String>, value: T, ttl: Option<Duration>)
    where
        T: Any + Send + Sync,
    {
        let value: SharedValue = Arc::new(value);
        match ttl {
            Some(ttl) => self.set_with_ttl(key, value, ttl),
            None => self.set(key, value),
        }
    }

    /// Get a live value stored as `T`
    ///
    /// A value stored under another type reads as `None`.
    pub fn get_as<T>(&self, key: &str) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.get(key)?.downcast::<T>().ok()
    }
}
