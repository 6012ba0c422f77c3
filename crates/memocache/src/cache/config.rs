//! Cache configuration types and builder patterns
//!
//! A [`CacheConfig`] can be built in code, read from `MEMOCACHE_*`
//! environment variables, or parsed from a TOML table.
//!
//! ## Environment Variables
//! - `MEMOCACHE_SWEEP_INTERVAL_MS`: background sweep period in milliseconds
//! - `MEMOCACHE_BACKGROUND_SWEEP`: whether to run the sweeper (true/false)
//! - `MEMOCACHE_TRACK_METRICS`: whether to record hit/miss counters
//!   (true/false)
//!
//! ## TOML
//! ```toml
//! sweep_interval_ms = 30000
//! background_sweep = true
//! track_metrics = false
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, CacheResult};

/// Default period between background sweeps
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_millis(60_000);

/// Environment variable for [`CacheConfig::sweep_interval`]
pub const ENV_SWEEP_INTERVAL_MS: &str = "MEMOCACHE_SWEEP_INTERVAL_MS";
/// Environment variable for [`CacheConfig::background_sweep`]
pub const ENV_BACKGROUND_SWEEP: &str = "MEMOCACHE_BACKGROUND_SWEEP";
/// Environment variable for [`CacheConfig::track_metrics`]
pub const ENV_TRACK_METRICS: &str = "MEMOCACHE_TRACK_METRICS";

/// Configuration for cache behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Period between background sweeps of expired entries
    #[serde(rename = "sweep_interval_ms", with = "duration_millis")]
    pub sweep_interval: Duration,

    /// Whether a background sweeper is started with the cache
    pub background_sweep: bool,

    /// Whether to collect hit/miss/insert counters
    pub track_metrics: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { sweep_interval: DEFAULT_SWEEP_INTERVAL, background_sweep: true, track_metrics: false }
    }
}

impl CacheConfig {
    /// Create a new configuration builder
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Preset with a custom sweep period
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    ///
    /// use memocache::cache::CacheConfig;
    ///
    /// let config = CacheConfig::with_sweep_interval(Duration::from_secs(5));
    /// assert!(config.background_sweep);
    /// ```
    pub fn with_sweep_interval(interval: Duration) -> Self {
        Self { sweep_interval: interval, ..Self::default() }
    }

    /// Preset without a background sweeper
    ///
    /// Expired entries are then only dropped on read or by an explicit
    /// `evict_expired` call.
    pub fn lazy_only() -> Self {
        Self { background_sweep: false, ..Self::default() }
    }

    /// Check that the configuration can drive a cache
    ///
    /// # Errors
    /// Returns [`CacheError::InvalidConfig`] when the background sweep is
    /// enabled with a zero interval.
    pub fn validate(&self) -> CacheResult<()> {
        if self.background_sweep && self.sweep_interval.is_zero() {
            return Err(CacheError::invalid_config(
                "sweep_interval",
                "must be greater than zero when background_sweep is enabled",
            ));
        }
        Ok(())
    }

    /// Load configuration from `MEMOCACHE_*` environment variables
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    /// Returns [`CacheError::EnvVar`] if a variable is set but unparsable,
    /// or [`CacheError::InvalidConfig`] if the result fails validation.
    pub fn from_env() -> CacheResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    /// Same as [`CacheConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> CacheResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_SWEEP_INTERVAL_MS) {
            let millis = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| CacheError::env_var(ENV_SWEEP_INTERVAL_MS, e))?;
            config.sweep_interval = Duration::from_millis(millis);
        }
        if let Some(raw) = lookup(ENV_BACKGROUND_SWEEP) {
            config.background_sweep = parse_bool(ENV_BACKGROUND_SWEEP, &raw)?;
        }
        if let Some(raw) = lookup(ENV_TRACK_METRICS) {
            config.track_metrics = parse_bool(ENV_TRACK_METRICS, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML document
    ///
    /// # Errors
    /// Returns [`CacheError::Parse`] for malformed TOML and
    /// [`CacheError::InvalidConfig`] if the result fails validation.
    pub fn from_toml_str(source: &str) -> CacheResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }
}

fn parse_bool(name: &str, raw: &str) -> CacheResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(CacheError::env_var(name, format!("expected a boolean, got `{other}`"))),
    }
}

/// Builder for [`CacheConfig`] with fluent API
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the background sweep period
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.config.sweep_interval = interval;
        self
    }

    /// Enable or disable the background sweeper
    pub fn background_sweep(mut self, enabled: bool) -> Self {
        self.config.background_sweep = enabled;
        self
    }

    /// Enable or disable metrics tracking
    pub fn track_metrics(mut self, enabled: bool) -> Self {
        self.config.track_metrics = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CacheConfig {
        self.config
    }
}

/// Serde adapter storing a `Duration` as integer milliseconds
mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
