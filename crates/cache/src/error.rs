//! Error types for cache operations
//!
//! [`CacheError`] is the single error type surfaced by the cache. It is
//! `Clone` because one creation outcome is delivered to every caller waiting
//! on the same key; factory errors are kept behind an `Arc` so each waiter
//! receives the original error object rather than a rendered message.
//!
//! All error types implement [`ErrorClassification`], which gives callers a
//! uniform way to decide whether to retry and how loudly to report.
//!
//! ```
//! use memento_cache::{Cache, CacheError, ErrorClassification};
//!
//! let cache: Cache<String, u32> = Cache::new();
//! let err = cache.get(&"missing".to_string()).unwrap_err();
//! assert!(matches!(err, CacheError::NotFound));
//! assert!(!err.is_retryable());
//! ```

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Boxed error accepted from value factories
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Shared handle to a factory's original error
pub type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

/// Standard result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors produced by cache operations
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// `get` found no live entry for the key (absent or expired)
    #[error("cache entry not found or expired")]
    NotFound,

    /// The value factory of a `get_or_add` call failed
    ///
    /// Every caller coalesced onto the same creation receives a clone of this
    /// error, sharing the original source.
    #[error("value factory failed: {source}")]
    FactoryFailure {
        /// Original error returned by the factory
        #[source]
        source: SharedError,
    },

    /// The caller's asynchronous wait was cancelled
    #[error("cache operation cancelled")]
    Cancelled,

    /// The creation owner unwound before producing a value
    #[error("value creation was abandoned before completing")]
    Abandoned,

    /// Invalid construction parameters
    #[error("invalid cache configuration for '{field}': {message}")]
    Config {
        /// Offending configuration field
        field: String,
        /// Human-readable reason
        message: String,
    },
}

impl CacheError {
    /// Wrap a factory error
    pub fn factory<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::FactoryFailure { source: Arc::from(err.into()) }
    }

    /// Create a configuration error for a specific field
    pub fn config<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Config { field: field.into(), message: message.into() }
    }

    /// Original factory error, if this is a factory failure
    pub fn factory_error(&self) -> Option<&SharedError> {
        match self {
            Self::FactoryFailure { source } => Some(source),
            _ => None,
        }
    }

    /// Downcast the original factory error to a concrete type
    ///
    /// ```
    /// use memento_cache::CacheError;
    ///
    /// let err = CacheError::factory(std::io::Error::other("backend down"));
    /// let io = err.downcast_factory_ref::<std::io::Error>().unwrap();
    /// assert_eq!(io.to_string(), "backend down");
    /// ```
    pub fn downcast_factory_ref<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        self.factory_error().and_then(|source| source.downcast_ref::<E>())
    }

    /// Whether this error came from a value factory
    pub fn is_factory_failure(&self) -> bool {
        matches!(self, Self::FactoryFailure { .. })
    }
}

/// Standard error classification interface
///
/// Implemented by every error type in the workspace so retry and reporting
/// logic can be written once.
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// A retry of a failed `get_or_add` invokes the factory again; the cache
    /// never stores failures.
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
        matches!(self, Self::FactoryFailure { .. } | Self::Abandoned)
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotFound => ErrorSeverity::Info,
            Self::Cancelled => ErrorSeverity::Info,
            Self::Abandoned => ErrorSeverity::Warning,
            Self::FactoryFailure { .. } => ErrorSeverity::Error,
            Self::Config { .. } => ErrorSeverity::Error,
        }
    }

    fn is_critical(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}
