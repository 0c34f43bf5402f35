//! In-process key/value cache for Memento services.
//!
//! Values are stored under unique keys with an optional time-to-live. The
//! cache is safe to share across threads and tasks, never serves an expired
//! entry, and guarantees that concurrent `get_or_add` calls for the same
//! missing key invoke the value factory only once.
//!
//! # Modules
//!
//! - [`cache`]: the sync [`Cache`] and async [`AsyncCache`] views, config,
//!   statistics and the background [`Sweeper`]
//! - [`clock`]: injectable time source ([`SystemClock`], [`MockClock`])
//! - [`error`]: [`CacheError`] and the shared error classification
//! - [`utils`]: serialization helpers

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod cache;
pub mod clock;
pub mod error;
pub mod utils;

// Re-export commonly used types and traits for convenience
pub use cache::{AsyncCache, Cache, CacheConfig, CacheConfigBuilder, CacheStats, Sweeper};
pub use clock::{Clock, MockClock, SystemClock};
pub use error::{BoxError, CacheError, CacheResult, ErrorClassification, ErrorSeverity, SharedError};
pub use tokio_util::sync::CancellationToken;
pub use utils::option_duration_millis;
