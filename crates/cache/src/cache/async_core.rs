//! Asynchronous cache view
//!
//! [`AsyncCache`] shares storage with [`Cache`]. Plain reads and writes never
//! suspend. [`AsyncCache::get_or_add`] spawns the factory future on Tokio so
//! that the creation is owned by the key rather than by whichever caller
//! happened to start it:
//!
//! - a caller that stops waiting (its future is dropped, or its token fires)
//!   returns [`CacheError::Cancelled`] without disturbing other waiters;
//! - when the last interested caller stops waiting, the factory task is
//!   aborted and the key reverts to empty.

use std::convert::Infallible;
use std::fmt::{self, Debug};
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::config::CacheConfig;
use super::core::Cache;
use super::stats::CacheStats;
use super::store::Store;
use super::sweeper::Sweeper;
use crate::clock::{Clock, SystemClock};
use crate::error::{BoxError, CacheError, CacheResult};

/// Async cache with per-entry TTL and cancellable single-flight creation
///
/// # Examples
///
/// ```
/// use memento_cache::{AsyncCache, BoxError};
///
/// #[tokio::main]
/// async fn main() {
///     let cache: AsyncCache<String, i32> = AsyncCache::new();
///
///     let value = cache
///         .get_or_add("key".to_string(), |_| async { Ok::<_, BoxError>(42) }, None)
///         .await
///         .unwrap();
///     assert_eq!(value, 42);
///     assert_eq!(cache.try_get(&"key".to_string()).await, Some(42));
/// }
/// ```
pub struct AsyncCache<K, V, C = SystemClock>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Clock,
{
    store: Arc<Store<K, V, C>>,
    sweeper: Option<Arc<Sweeper>>,
}

impl<K, V> AsyncCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates an unswept async cache on the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<K, V> Default for AsyncCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> AsyncCache<K, V, C>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Clock,
{
    /// Creates an unswept async cache with the specified clock.
    pub fn with_clock(clock: C) -> Self {
        Cache::with_clock(clock).to_async()
    }

    /// Creates an async cache from a configuration.
    ///
    /// # Errors
    ///
    /// Same as [`Cache::with_config`].
    pub fn with_config(config: CacheConfig, clock: C) -> CacheResult<Self> {
        Cache::with_config(config, clock).map(|cache| cache.to_async())
    }

    pub(crate) fn from_parts(store: Arc<Store<K, V, C>>, sweeper: Option<Arc<Sweeper>>) -> Self {
        Self { store, sweeper }
    }

    /// Returns a live value, or `None` if absent, pending or expired.
    pub async fn try_get(&self, key: &K) -> Option<V> {
        self.store.try_get(key)
    }

    /// Returns a live value or [`CacheError::NotFound`].
    pub async fn get(&self, key: &K) -> CacheResult<V> {
        self.store.try_get(key).ok_or(CacheError::NotFound)
    }

    /// Inserts or overwrites a value.
    pub async fn set(&self, key: K, value: V, ttl: Option<Duration>) {
        self.store.set(key, value, ttl);
    }

    /// Removes a key; true if a slot existed.
    pub async fn remove(&self, key: &K) -> bool {
        self.store.remove(key)
    }

    /// Removes every entry.
    pub async fn clear(&self) {
        self.store.clear();
    }

    /// Returns a live value or creates it exactly once.
    ///
    /// `factory` is called at most once per creation, by the first caller;
    /// the future it returns runs as a Tokio task. Every concurrent caller
    /// for the key awaits that task's outcome.
    ///
    /// Dropping the returned future stops this caller's wait. If no other
    /// caller is waiting, the factory task is aborted and nothing is cached.
    ///
    /// # Panics
    ///
    /// Must be polled inside a Tokio runtime when it needs to start a
    /// creation.
    ///
    /// # Errors
    ///
    /// - [`CacheError::FactoryFailure`] wrapping the factory's error
    /// - [`CacheError::Abandoned`] if the factory task panicked
    pub async fn get_or_add<F, Fut, E>(
        &self,
        key: K,
        factory: F,
        ttl: Option<Duration>,
    ) -> CacheResult<V>
    where
        F: FnOnce(K) -> Fut + Send,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Into<BoxError>,
    {
        self.store.get_or_add_async(key, factory, ttl).await
    }

    /// [`AsyncCache::get_or_add`] that also stops waiting when `token` fires
    ///
    /// An already-cancelled token returns [`CacheError::Cancelled`] without
    /// touching the cache or calling the factory.
    ///
    /// # Example
    /// ```
    /// use memento_cache::{AsyncCache, BoxError, CacheError, CancellationToken};
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let cache: AsyncCache<u32, u32> = AsyncCache::new();
    ///     let token = CancellationToken::new();
    ///     token.cancel();
    ///
    ///     let result = cache
    ///         .get_or_add_with_cancellation(1, |_| async { Ok::<_, BoxError>(1) }, None, &token)
    ///         .await;
    ///     assert!(matches!(result, Err(CacheError::Cancelled)));
    ///     assert!(cache.is_empty());
    /// }
    /// ```
    pub async fn get_or_add_with_cancellation<F, Fut, E>(
        &self,
        key: K,
        factory: F,
        ttl: Option<Duration>,
        token: &CancellationToken,
    ) -> CacheResult<V>
    where
        F: FnOnce(K) -> Fut + Send,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Into<BoxError>,
    {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(CacheError::Cancelled),
            result = self.get_or_add(key, factory, ttl) => result,
        }
    }

    /// [`AsyncCache::get_or_add`] for a value future that cannot fail
    pub async fn get_or_insert_with<F, Fut>(
        &self,
        key: K,
        f: F,
        ttl: Option<Duration>,
    ) -> CacheResult<V>
    where
        F: FnOnce(K) -> Fut + Send,
        Fut: Future<Output = V> + Send + 'static,
    {
        self.get_or_add(
            key,
            |key| {
                let pending = f(key);
                async move { Ok::<_, Infallible>(pending.await) }
            },
            ttl,
        )
        .await
    }

    /// Whether a live value is stored under `key` (never evicts).
    pub fn contains_key(&self, key: &K) -> bool {
        self.store.contains_key(key)
    }

    /// Number of stored slots, pending and not-yet-evicted ones included.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns true if the cache holds no slots.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Removes expired entries, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        self.store.purge_expired()
    }

    /// Returns a statistics snapshot.
    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }

    /// Zeroes all counters.
    pub fn reset_stats(&self) {
        self.store.reset_stats();
    }

    /// Diagnostic name used in log records.
    pub fn name(&self) -> &str {
        self.store.name()
    }

    /// Background sweep handle, if one was configured.
    pub fn sweeper(&self) -> Option<&Sweeper> {
        self.sweeper.as_deref()
    }

    /// Blocking view over the same storage.
    pub fn to_sync(&self) -> Cache<K, V, C> {
        Cache::from_parts(Arc::clone(&self.store), self.sweeper.clone())
    }
}

impl<K, V, C> Clone for AsyncCache<K, V, C>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Clock,
{
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), sweeper: self.sweeper.clone() }
    }
}

impl<K, V, C> fmt::Debug for AsyncCache<K, V, C>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Clock,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncCache")
            .field("name", &self.name())
            .field("len", &self.len())
            .field("swept", &self.sweeper.is_some())
            .finish()
    }
}
