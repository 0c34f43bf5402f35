//! Stored cache entries and their expiry arithmetic

use std::time::{Duration, Instant};

/// A value plus its absolute expiration instant
#[derive(Debug, Clone)]
pub(crate) struct Entry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    /// Build an entry inserted at `now`
    ///
    /// A TTL too large to represent as an `Instant` never expires.
    pub(crate) fn new(value: V, now: Instant, ttl: Option<Duration>) -> Self {
        Self { value, expires_at: ttl.and_then(|ttl| now.checked_add(ttl)) }
    }

    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    /// An entry is expired once its deadline is at or before `now`
    pub(crate) fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}
