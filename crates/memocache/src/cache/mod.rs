//! String-keyed cache with per-entry expiration
//!
//! [`TtlCache`] stores values under string keys, each optionally carrying a
//! time-to-live. Expiry is enforced twice:
//!
//! - **On read**: `get` and `has` never return an entry whose deadline has
//!   passed and remove it on the spot
//! - **In the background**: a sweeper thread periodically removes expired
//!   entries nobody reads, until the cache is destroyed or dropped
//!
//! # Examples
//!
//! ## Default cache
//! ```
//! use std::time::Duration;
//!
//! use memocache::cache::TtlCache;
//!
//! let cache: TtlCache<String> = TtlCache::new();
//! cache.set_with_ttl("user:42", "Ada".to_string(), Duration::from_secs(300));
//! cache.set("feature-flags", "all".to_string());
//!
//! assert_eq!(cache.get("user:42").as_deref(), Some("Ada"));
//! assert!(cache.delete("feature-flags"));
//! cache.destroy();
//! ```
//!
//! ## Configured cache
//! ```
//! use std::time::Duration;
//!
//! use memocache::cache::{CacheConfig, TtlCache};
//!
//! let config = CacheConfig::builder()
//!     .sweep_interval(Duration::from_secs(10))
//!     .track_metrics(true)
//!     .build();
//! let cache: TtlCache<u32> = TtlCache::with_config(config).unwrap();
//!
//! cache.set("a", 1);
//! let _ = cache.get("a");
//! let _ = cache.get("b");
//! assert!((cache.stats().hit_rate() - 0.5).abs() < f64::EPSILON);
//! ```
//!
//! # Thread Safety
//!
//! All operations take `&self`. Share a cache across threads with `Arc`;
//! the cache itself is not `Clone`, and dropping the last handle stops its
//! sweeper.

mod config;
mod core;
mod entry;
mod stats;
mod sweeper;

// Re-export public API
pub use self::core::TtlCache;

pub use config::{
    CacheConfig, CacheConfigBuilder, DEFAULT_SWEEP_INTERVAL, ENV_BACKGROUND_SWEEP,
    ENV_SWEEP_INTERVAL_MS, ENV_TRACK_METRICS,
};
pub use stats::CacheStats;
pub use sweeper::SweepState;
