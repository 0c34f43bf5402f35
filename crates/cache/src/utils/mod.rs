//! Shared helpers
//!
//! - **[`serde`]**: serialization helpers for configuration types

pub mod serde;

pub use self::serde::option_duration_millis;
