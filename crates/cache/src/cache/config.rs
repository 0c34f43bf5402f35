//! Cache configuration types and builder patterns
//!
//! Expiry is per entry (the TTL passed to `set` / `get_or_add`), so the
//! configuration only covers instance-wide concerns: a diagnostic name and
//! the optional background sweep.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, CacheResult};
use crate::utils::option_duration_millis;

/// Name used in log fields when none is configured
pub const DEFAULT_CACHE_NAME: &str = "cache";

/// Configuration for a cache instance
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use memento_cache::CacheConfig;
///
/// let config: CacheConfig =
///     serde_json::from_str(r#"{"name":"sessions","sweep_interval":30000}"#).unwrap();
/// assert_eq!(config.sweep_interval, Some(Duration::from_secs(30)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Diagnostic name attached to log records
    pub name: String,

    /// Period of the background sweep (None = lazy eviction only)
    #[serde(with = "option_duration_millis")]
    pub sweep_interval: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { name: DEFAULT_CACHE_NAME.to_string(), sweep_interval: None }
    }
}

impl CacheConfig {
    /// Create a new configuration builder
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Quick preset for a swept cache
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    ///
    /// use memento_cache::CacheConfig;
    ///
    /// let config = CacheConfig::swept(Duration::from_secs(60));
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn swept(interval: Duration) -> Self {
        Self { sweep_interval: Some(interval), ..Self::default() }
    }

    /// Check the configuration for values the cache cannot run with
    pub fn validate(&self) -> CacheResult<()> {
        if self.name.trim().is_empty() {
            return Err(CacheError::config("name", "must not be empty"));
        }
        if self.sweep_interval == Some(Duration::ZERO) {
            return Err(CacheError::config("sweep_interval", "must be greater than zero"));
        }
        Ok(())
    }
}

/// Builder for CacheConfig with fluent API
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the diagnostic name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Enable the background sweep with the given period
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.config.sweep_interval = Some(interval);
        self
    }

    /// Build the configuration
    pub fn build(self) -> CacheConfig {
        self.config
    }
}
