//! In-process memoization cache with per-entry time-to-live.
//!
//! # Modules
//!
//! - [`cache`]: the [`TtlCache`] store, its configuration and statistics
//! - [`shared`]: one lazily-built cache reachable from anywhere in the
//!   process
//! - [`clock`]: time sources used for expiry decisions
//! - [`error`]: errors raised while building a cache
//!
//! # Quick Start
//!
//! ```
//! use std::time::Duration;
//!
//! use memocache::{invalidate_shared_cache, shared_cache};
//!
//! fn list_invoices() -> Vec<String> {
//!     let cache = shared_cache();
//!     if let Some(hit) = cache.get_as::<Vec<String>>("invoices:list") {
//!         return hit.as_ref().clone();
//!     }
//!     let fresh = vec!["INV-001".to_string()];
//!     cache.set_as("invoices:list", fresh.clone(), Some(Duration::from_secs(30)));
//!     fresh
//! }
//!
//! assert_eq!(list_invoices(), list_invoices());
//! invalidate_shared_cache();
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod cache;
pub mod clock;
pub mod error;
pub mod shared;

// Re-export commonly used types and traits for convenience
pub use cache::{CacheConfig, CacheStats, SweepState, TtlCache};
pub use clock::{Clock, MockClock, SystemClock};
pub use error::{CacheError, CacheResult, ErrorClassification, ErrorSeverity};
pub use shared::{
    invalidate_shared_cache, shared_cache, shared_cache_if_initialized, SharedCache, SharedValue,
};
