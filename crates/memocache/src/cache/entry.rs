//! Stored entry and expiry arithmetic

use std::time::{Duration, Instant};

/// Value stored in the cache together with its deadline
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry<V> {
    pub(crate) value: V,
    /// `None` never expires
    pub(crate) expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    /// Entry that never expires
    pub(crate) fn permanent(value: V) -> Self {
        Self { value, expires_at: None }
    }

    /// Entry expiring `ttl` after `now`
    ///
    /// A deadline past the representable range of `Instant` is treated as
    /// never expiring.
    pub(crate) fn expiring(value: V, now: Instant, ttl: Duration) -> Self {
        Self { value, expires_at: now.checked_add(ttl) }
    }

    /// Entry that is already expired as of `now`
    pub(crate) fn expired(value: V, now: Instant) -> Self {
        Self { value, expires_at: Some(now) }
    }

    /// Expired once the deadline is at or before `now`
    #[inline]
    pub(crate) fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// Build an entry from a signed millisecond TTL
pub(crate) fn entry_from_millis<V>(value: V, now: Instant, ttl_ms: i64) -> CacheEntry<V> {
    match u64::try_from(ttl_ms) {
        Ok(millis) if millis > 0 => CacheEntry::expiring(value, now, Duration::from_millis(millis)),
        _ => CacheEntry::expired(value, now),
    }
}
