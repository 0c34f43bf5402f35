//! Concurrent key/value cache with TTL expiry and single-flight creation
//!
//! # Features
//!
//! - **Sharded storage**: a `DashMap` of per-key slots; unrelated keys never
//!   contend on a global lock
//! - **Per-entry TTL**: lazy eviction on read plus an optional periodic sweep
//! - **Single-flight**: [`Cache::get_or_add`] runs a factory at most once per
//!   missing key, however many callers race for it
//! - **Sync and async views**: [`Cache`] and [`AsyncCache`] over one store
//! - **Cancellation**: async waits stop on drop or on a `CancellationToken`
//! - **Testable**: an injectable [`Clock`](crate::Clock) drives every expiry
//!   decision
//!
//! # Examples
//!
//! ## Basic usage
//! ```
//! use std::time::Duration;
//!
//! use memento_cache::Cache;
//!
//! let cache: Cache<String, i32> = Cache::new();
//! cache.set("a".to_string(), 42, None);
//! cache.set("session".to_string(), 7, Some(Duration::from_secs(3600)));
//!
//! assert_eq!(cache.try_get(&"a".to_string()), Some(42));
//! assert!(cache.remove(&"a".to_string()));
//! assert!(!cache.remove(&"a".to_string()));
//! ```
//!
//! ## Deterministic expiry
//! ```
//! use std::time::Duration;
//!
//! use memento_cache::{Cache, MockClock};
//!
//! let clock = MockClock::new();
//! let cache: Cache<String, i32, MockClock> = Cache::with_clock(clock.clone());
//!
//! cache.set("b".to_string(), 1, Some(Duration::from_millis(50)));
//! clock.advance_millis(100);
//! assert_eq!(cache.try_get(&"b".to_string()), None);
//! ```
//!
//! ## Configured cache with a background sweep
//! ```
//! use std::time::Duration;
//!
//! use memento_cache::{AsyncCache, CacheConfig, SystemClock};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = CacheConfig::builder()
//!         .name("sessions")
//!         .sweep_interval(Duration::from_secs(30))
//!         .build();
//!
//!     let cache: AsyncCache<String, String> =
//!         AsyncCache::with_config(config, SystemClock).expect("valid config");
//!     assert!(cache.sweeper().is_some_and(|sweeper| sweeper.is_running()));
//! }
//! ```
//!
//! ## Cache statistics
//! ```
//! use memento_cache::Cache;
//!
//! let cache: Cache<String, i32> = Cache::new();
//! cache.set("key1".to_string(), 1, None);
//! let _ = cache.try_get(&"key1".to_string());
//! let _ = cache.try_get(&"key2".to_string());
//!
//! let stats = cache.stats();
//! println!("Hit rate: {:.2}%", stats.hit_rate() * 100.0);
//! assert_eq!(stats.total_accesses(), 2);
//! ```

mod async_core;
mod config;
mod core;
mod entry;
mod slot;
mod stats;
mod store;
mod sweeper;

// Re-export public API
pub use self::core::Cache;

pub use async_core::AsyncCache;
pub use config::{CacheConfig, CacheConfigBuilder, DEFAULT_CACHE_NAME};
pub use stats::CacheStats;
pub use sweeper::Sweeper;
