//! Error types for cache construction and configuration
//!
//! Cache operations themselves never fail: an unknown key is a normal miss
//! and a non-positive TTL simply produces an already-expired entry. Errors
//! only surface while building a cache, i.e. when a configuration is invalid
//! or the background sweeper cannot be started.
//!
//! # Severity
//!
//! | Level | Examples |
//! |-------|----------|
//! | **Info** | - |
//! | **Warning** | Sweeper could not start (cache still works with lazy expiry) |
//! | **Error** | Invalid configuration, unparsable environment or TOML |
//! | **Critical** | - |

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Standard result type using [`CacheError`]
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors raised while configuring or constructing a cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// A configuration value is out of range
    #[error("invalid cache configuration for `{field}`: {message}")]
    InvalidConfig {
        /// Name of the offending field
        field: &'static str,
        /// Human-readable reason
        message: String,
    },

    /// An environment variable is set but could not be parsed
    #[error("invalid value for environment variable `{name}`: {message}")]
    EnvVar {
        /// Variable name
        name: String,
        /// Parse failure detail
        message: String,
    },

    /// A TOML configuration document could not be parsed
    #[error("failed to parse cache configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The sweeper runtime or thread could not be created
    #[error("failed to start background sweeper: {0}")]
    SweeperSpawn(#[from] std::io::Error),
}

impl CacheError {
    /// Create an invalid configuration error
    pub fn invalid_config(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfig { field, message: message.into() }
    }

    /// Create an environment variable parse error
    pub fn env_var(name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::EnvVar { name: name.into(), message: message.to_string() }
    }
}

/// Standard interface for classifying errors by their characteristics
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient and may succeed if attempted again.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool;

    /// Get the suggested retry delay if applicable
    fn retry_after(&self) -> Option<Duration>;
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl ErrorClassification for CacheError {
    fn is_retryable(&self) -> bool {
        // Thread or runtime creation usually fails on transient resource limits.
        matches!(self, Self::SweeperSpawn(_))
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::SweeperSpawn(_) => ErrorSeverity::Warning,
            Self::InvalidConfig { .. } | Self::EnvVar { .. } | Self::Parse(_) => {
                ErrorSeverity::Error
            }
        }
    }

    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::SweeperSpawn(_) => Some(Duration::from_millis(100)),
            _ => None,
        }
    }
}
