//! Synchronous cache view
//!
//! [`Cache`] is a cheap handle over shared storage. Reads and writes never
//! block on other keys; only [`Cache::get_or_add`] may park the calling
//! thread, and only while another caller is creating the same key.

use std::convert::Infallible;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use super::async_core::AsyncCache;
use super::config::CacheConfig;
use super::stats::CacheStats;
use super::store::Store;
use super::sweeper::Sweeper;
use crate::clock::{Clock, SystemClock};
use crate::error::{BoxError, CacheError, CacheResult};

/// Generic thread-safe cache with per-entry TTL and single-flight creation
///
/// # Type Parameters
/// - `K`: Key type
/// - `V`: Value type, handed out by clone (wrap large values in `Arc`)
/// - `C`: Clock type for expiry decisions (defaults to `SystemClock`)
///
/// Clones share the same storage.
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use memento_cache::Cache;
///
/// let cache: Cache<String, i32> = Cache::new();
/// cache.set("key".to_string(), 42, Some(Duration::from_secs(60)));
/// assert_eq!(cache.try_get(&"key".to_string()), Some(42));
/// ```
pub struct Cache<K, V, C = SystemClock>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Clock,
{
    store: Arc<Store<K, V, C>>,
    sweeper: Option<Arc<Sweeper>>,
}

impl<K, V> Cache<K, V, SystemClock>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create an unswept cache on the system clock
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<K, V> Default for Cache<K, V, SystemClock>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> Cache<K, V, C>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Clock,
{
    /// Create an unswept cache with a custom clock (useful for testing)
    pub fn with_clock(clock: C) -> Self {
        let name = CacheConfig::default().name;
        Self { store: Arc::new(Store::new(clock, name)), sweeper: None }
    }

    /// Create a cache from a configuration
    ///
    /// When `sweep_interval` is set the background sweep is spawned on the
    /// current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Config`] if the configuration is invalid or a
    /// sweep is requested outside a runtime.
    pub fn with_config(config: CacheConfig, clock: C) -> CacheResult<Self> {
        config.validate()?;
        let store = Arc::new(Store::new(clock, config.name.clone()));
        let sweeper = match config.sweep_interval {
            Some(interval) => {
                Some(Arc::new(Sweeper::spawn(Arc::downgrade(&store), config.name, interval)?))
            }
            None => None,
        };
        Ok(Self { store, sweeper })
    }

    pub(crate) fn from_parts(store: Arc<Store<K, V, C>>, sweeper: Option<Arc<Sweeper>>) -> Self {
        Self { store, sweeper }
    }

    /// Get a live value, or `None` if the key is absent, pending or expired
    ///
    /// Never blocks. An expired entry discovered here is removed.
    pub fn try_get(&self, key: &K) -> Option<V> {
        self.store.try_get(key)
    }

    /// Get a live value
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NotFound`] if the key is absent or expired.
    pub fn get(&self, key: &K) -> CacheResult<V> {
        self.try_get(key).ok_or(CacheError::NotFound)
    }

    /// Insert or overwrite a value
    ///
    /// Replaces a pending creation too; callers waiting on it still receive
    /// its result, but that result is not cached.
    pub fn set(&self, key: K, value: V, ttl: Option<Duration>) {
        self.store.set(key, value, ttl);
    }

    /// Remove a key; true if anything (pending, live or expired) was there
    pub fn remove(&self, key: &K) -> bool {
        self.store.remove(key)
    }

    /// Remove every entry
    ///
    /// Statistics are kept; use [`Cache::reset_stats`] to zero them.
    pub fn clear(&self) {
        self.store.clear();
    }

    /// Get a live value or create it exactly once
    ///
    /// Concurrent callers for the same missing key share a single factory
    /// invocation: the first runs `factory` on its own thread, the rest block
    /// until it finishes and receive the same value or the same error.
    /// Failures are never cached.
    ///
    /// Must not be called from inside an async task while an
    /// [`AsyncCache::get_or_add`] for the same key may be in flight on the
    /// same thread; use the async view there.
    ///
    /// # Errors
    ///
    /// - [`CacheError::FactoryFailure`] wrapping the factory's error
    /// - [`CacheError::Abandoned`] if the creating caller panicked
    ///
    /// # Example
    /// ```
    /// use memento_cache::{BoxError, Cache};
    ///
    /// let cache: Cache<u64, String> = Cache::new();
    /// let value = cache
    ///     .get_or_add(7, |id| Ok::<_, BoxError>(format!("user-{id}")), None)
    ///     .unwrap();
    /// assert_eq!(value, "user-7");
    /// ```
    pub fn get_or_add<F, E>(&self, key: K, factory: F, ttl: Option<Duration>) -> CacheResult<V>
    where
        F: FnOnce(&K) -> Result<V, E>,
        E: Into<BoxError>,
    {
        self.store.get_or_add_blocking(key, factory, ttl)
    }

    /// [`Cache::get_or_add`] for a factory that cannot fail
    ///
    /// # Errors
    ///
    /// Only when joining someone else's creation that failed or was
    /// abandoned.
    pub fn get_or_insert_with<F>(&self, key: K, f: F, ttl: Option<Duration>) -> CacheResult<V>
    where
        F: FnOnce(&K) -> V,
    {
        self.get_or_add(key, |key| Ok::<_, Infallible>(f(key)), ttl)
    }

    /// Whether a live value is stored under `key`
    ///
    /// Unlike reads this never evicts.
    pub fn contains_key(&self, key: &K) -> bool {
        self.store.contains_key(key)
    }

    /// Number of stored slots, including pending creations and expired
    /// entries not yet evicted
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if the cache holds no slots
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Remove expired entries
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        self.store.purge_expired()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }

    /// Zero all counters
    pub fn reset_stats(&self) {
        self.store.reset_stats();
    }

    /// Diagnostic name used in log records
    pub fn name(&self) -> &str {
        self.store.name()
    }

    /// Background sweep handle, if one was configured
    pub fn sweeper(&self) -> Option<&Sweeper> {
        self.sweeper.as_deref()
    }

    /// Async view over the same storage
    pub fn to_async(&self) -> AsyncCache<K, V, C> {
        AsyncCache::from_parts(Arc::clone(&self.store), self.sweeper.clone())
    }
}

impl<K, V, C> Clone for Cache<K, V, C>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Clock,
{
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), sweeper: self.sweeper.clone() }
    }
}

impl<K, V, C> fmt::Debug for Cache<K, V, C>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Clock,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("name", &self.name())
            .field("len", &self.len())
            .field("swept", &self.sweeper.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cache::core.
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    use super::*;
    use crate::clock::MockClock;

    fn cache() -> (Cache<String, i32, MockClock>, MockClock) {
        let clock = MockClock::new();
        (Cache::with_clock(clock.clone()), clock)
    }

    /// Validates `Cache::new` behavior for the cache new scenario.
    ///
    /// Assertions:
    /// - Confirms `cache.len()` equals `0`.
    /// - Ensures `cache.is_empty()` evaluates to true.
    /// - Ensures `cache.sweeper().is_none()` evaluates to true.
    #[test]
    fn test_cache_new() {
        let cache: Cache<String, i32> = Cache::new();
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert!(cache.sweeper().is_none());
        assert_eq!(cache.name(), "cache");
    }

    /// Validates `Cache::set` behavior for the cache set and get scenario.
    ///
    /// Assertions:
    /// - Confirms `cache.try_get(&"key".to_string())` equals `Some(42)`.
    /// - Confirms `cache.get(&"key".to_string())` is `Ok(42)`.
    #[test]
    fn test_cache_set_and_get() {
        let (cache, _clock) = cache();
        cache.set("key".to_string(), 42, None);

        assert_eq!(cache.try_get(&"key".to_string()), Some(42));
        assert_eq!(cache.get(&"key".to_string()).ok(), Some(42));
    }

    #[test]
    fn test_cache_stored_default_value_is_found() {
        let (cache, _clock) = cache();
        cache.set("zero".to_string(), 0, None);
        assert_eq!(cache.try_get(&"zero".to_string()), Some(0));
        assert_eq!(cache.try_get(&"missing".to_string()), None);
    }

    /// Validates `Cache::get` behavior for the missing key scenario.
    ///
    /// Assertions:
    /// - Ensures `CacheError::NotFound` is returned.
    #[test]
    fn test_cache_get_missing_is_not_found() {
        let (cache, _clock) = cache();
        assert!(matches!(cache.get(&"nope".to_string()), Err(CacheError::NotFound)));
    }

    #[test]
    fn test_cache_update_existing() {
        let (cache, _clock) = cache();
        cache.set("key".to_string(), 1, None);
        cache.set("key".to_string(), 2, None);

        assert_eq!(cache.try_get(&"key".to_string()), Some(2));
        assert_eq!(cache.len(), 1);
    }

    /// Validates `MockClock::advance` behavior for the cache ttl expiration
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms the value is readable just before the deadline.
    /// - Confirms `cache.try_get(..)` equals `None` once it passes.
    /// - Ensures `cache.get(..)` reports `NotFound`.
    #[test]
    fn test_cache_ttl_expiration() {
        let (cache, clock) = cache();
        cache.set("key".to_string(), 7, Some(Duration::from_millis(50)));

        clock.advance_millis(49);
        assert_eq!(cache.try_get(&"key".to_string()), Some(7));

        clock.advance_millis(51);
        assert_eq!(cache.try_get(&"key".to_string()), None);
        assert!(matches!(cache.get(&"key".to_string()), Err(CacheError::NotFound)));
    }

    #[test]
    fn test_cache_without_ttl_persists() {
        let (cache, clock) = cache();
        cache.set("key".to_string(), 3, None);
        clock.advance(Duration::from_secs(60 * 60 * 24 * 365));
        assert_eq!(cache.try_get(&"key".to_string()), Some(3));
    }

    /// Validates `Cache::remove` behavior for the cache remove scenario.
    ///
    /// Assertions:
    /// - Ensures the first `remove` returns true and the second false.
    /// - Ensures removing an expired entry still returns true.
    #[test]
    fn test_cache_remove() {
        let (cache, clock) = cache();
        cache.set("key".to_string(), 1, None);
        assert!(cache.remove(&"key".to_string()));
        assert!(!cache.remove(&"key".to_string()));

        cache.set("stale".to_string(), 1, Some(Duration::from_millis(1)));
        clock.advance_millis(5);
        assert!(cache.remove(&"stale".to_string()));
    }

    #[test]
    fn test_cache_clear_keeps_stats() {
        let (cache, _clock) = cache();
        cache.set("a".to_string(), 1, None);
        cache.set("b".to_string(), 2, None);
        let _ = cache.try_get(&"a".to_string());

        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.try_get(&"a".to_string()), None);
        let stats = cache.stats();
        assert_eq!(stats.inserts, 2);
        assert_eq!(stats.hits, 1);

        cache.reset_stats();
        assert_eq!(cache.stats(), CacheStats::default());
    }

    /// Validates `Cache::contains_key` behavior for the no eviction scenario.
    ///
    /// Assertions:
    /// - Ensures an expired key is reported absent but still counted.
    /// - Confirms `cache.purge_expired()` equals `1`.
    #[test]
    fn test_cache_contains_key_and_purge() {
        let (cache, clock) = cache();
        cache.set("short".to_string(), 1, Some(Duration::from_secs(1)));
        cache.set("long".to_string(), 2, Some(Duration::from_secs(100)));
        clock.advance(Duration::from_secs(2));

        assert!(!cache.contains_key(&"short".to_string()));
        assert!(cache.contains_key(&"long".to_string()));
        assert_eq!(cache.len(), 2);

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    /// Validates `Cache::get_or_add` behavior for the cached value scenario.
    ///
    /// Assertions:
    /// - Confirms the factory is not invoked for an existing key.
    /// - Confirms an expired key is recreated.
    #[test]
    fn test_cache_get_or_add_existing_and_expired() {
        let (cache, clock) = cache();
        cache.set("key".to_string(), 42, Some(Duration::from_secs(1)));

        let value = cache
            .get_or_add("key".to_string(), |_| Err::<i32, _>("must not run"), None)
            .expect("cached value");
        assert_eq!(value, 42);

        clock.advance(Duration::from_secs(1));
        let value = cache
            .get_or_add("key".to_string(), |_| Ok::<_, BoxError>(43), None)
            .expect("fresh value");
        assert_eq!(value, 43);
        assert_eq!(cache.stats().expirations, 1);
    }

    /// Validates `Cache::get_or_add` behavior for the commit-time TTL
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures the TTL counts from the moment the factory finished.
    #[test]
    fn test_cache_get_or_add_ttl_starts_at_commit() {
        let (cache, clock) = cache();
        let value = cache
            .get_or_add(
                "slow".to_string(),
                |_| {
                    clock.advance(Duration::from_secs(5));
                    Ok::<_, BoxError>(1)
                },
                Some(Duration::from_secs(3)),
            )
            .expect("created");
        assert_eq!(value, 1);

        clock.advance(Duration::from_secs(2));
        assert_eq!(cache.try_get(&"slow".to_string()), Some(1));
    }

    #[test]
    fn test_cache_get_or_add_passes_key_to_factory() {
        let (cache, _clock) = cache();
        let value = cache
            .get_or_add("abc".to_string(), |key| Ok::<_, BoxError>(key.len() as i32), None)
            .expect("created");
        assert_eq!(value, 3);
    }

    /// Validates `Cache::get_or_add` behavior for the factory failure
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures the original error can be downcast from the failure.
    /// - Ensures the next call retries and caches the value.
    #[test]
    fn test_cache_get_or_add_failure_not_cached() {
        let (cache, _clock) = cache();

        let err = cache
            .get_or_add("key".to_string(), |_| Err::<i32, _>(std::io::Error::other("down")), None)
            .expect_err("factory failed");
        let io = err.downcast_factory_ref::<std::io::Error>().expect("io error source");
        assert_eq!(io.to_string(), "down");
        assert!(!cache.contains_key(&"key".to_string()));

        let value =
            cache.get_or_add("key".to_string(), |_| Ok::<_, BoxError>(5), None).expect("retry");
        assert_eq!(value, 5);
        assert_eq!(cache.try_get(&"key".to_string()), Some(5));
    }

    /// Validates `Cache::get_or_add` behavior for the concurrent single-flight
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms the factory ran exactly once.
    /// - Confirms every thread observed `99`.
    /// - Confirms `stats.coalesced + stats.hits` accounts for the others.
    #[test]
    fn test_cache_get_or_add_single_flight_threads() {
        let cache: Cache<String, i32> = Cache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let calls = Arc::clone(&calls);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache.get_or_add(
                        "c".to_string(),
                        |_| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(50));
                            Ok::<_, BoxError>(99)
                        },
                        None,
                    )
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().expect("thread").ok(), Some(99));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats();
        assert_eq!(stats.factory_runs, 1);
        assert_eq!(stats.coalesced + stats.hits, 7);
    }

    /// Validates `Cache::get_or_add` behavior for the shared failure scenario.
    ///
    /// Assertions:
    /// - Ensures every concurrent caller receives a `FactoryFailure`.
    /// - Ensures all failures share the original error allocation.
    #[test]
    fn test_cache_get_or_add_failure_reaches_waiters() {
        let cache: Cache<String, i32> = Cache::new();
        let barrier = Arc::new(Barrier::new(4));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache.get_or_add(
                        "bad".to_string(),
                        |_| {
                            thread::sleep(Duration::from_millis(200));
                            Err::<i32, _>("backend unavailable")
                        },
                        None,
                    )
                })
            })
            .collect();

        let errors: Vec<CacheError> = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread").expect_err("factory failed"))
            .collect();

        let first = errors[0].factory_error().expect("factory failure");
        for err in &errors {
            assert!(Arc::ptr_eq(first, err.factory_error().expect("factory failure")));
        }
        assert!(cache.is_empty());
    }

    /// Validates `Cache::set` behavior for the set during pending creation
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms the creating caller still receives its own value.
    /// - Confirms the cache keeps the value written by `set`.
    #[test]
    fn test_cache_set_supersedes_pending_creation() {
        let cache: Cache<String, i32> = Cache::new();
        let started = Arc::new(Barrier::new(2));
        let proceed = Arc::new(Barrier::new(2));

        let creator = {
            let cache = cache.clone();
            let started = Arc::clone(&started);
            let proceed = Arc::clone(&proceed);
            thread::spawn(move || {
                cache.get_or_add(
                    "k".to_string(),
                    |_| {
                        started.wait();
                        proceed.wait();
                        Ok::<_, BoxError>(1)
                    },
                    None,
                )
            })
        };

        started.wait();
        cache.set("k".to_string(), 2, None);
        proceed.wait();

        assert_eq!(creator.join().expect("creator").ok(), Some(1));
        assert_eq!(cache.try_get(&"k".to_string()), Some(2));
    }

    /// Runs `interrupt` while a creation for `"k"` is blocked in its factory
    ///
    /// Returns what `interrupt` returned and what the creator received.
    fn interrupt_pending_creation<T>(
        cache: &Cache<String, i32>,
        interrupt: impl FnOnce(&Cache<String, i32>) -> T,
    ) -> (T, CacheResult<i32>) {
        let started = Arc::new(Barrier::new(2));
        let proceed = Arc::new(Barrier::new(2));

        let creator = {
            let cache = cache.clone();
            let started = Arc::clone(&started);
            let proceed = Arc::clone(&proceed);
            thread::spawn(move || {
                cache.get_or_add(
                    "k".to_string(),
                    |_| {
                        started.wait();
                        proceed.wait();
                        Ok::<_, BoxError>(1)
                    },
                    None,
                )
            })
        };

        started.wait();
        let interrupted = interrupt(cache);
        proceed.wait();

        (interrupted, creator.join().expect("creator"))
    }

    /// Validates `Cache::remove` behavior for the remove during pending
    /// creation scenario.
    ///
    /// Assertions:
    /// - Ensures `remove` reports the pending slot as present.
    /// - Confirms the creating caller still receives its own value.
    /// - Ensures the value is not cached afterwards.
    #[test]
    fn test_cache_remove_supersedes_pending_creation() {
        let cache: Cache<String, i32> = Cache::new();

        let (removed, created) =
            interrupt_pending_creation(&cache, |cache| cache.remove(&"k".to_string()));

        assert!(removed);
        assert_eq!(created.ok(), Some(1));
        assert_eq!(cache.try_get(&"k".to_string()), None);
        assert_eq!(cache.len(), 0);
    }

    /// Validates `Cache::clear` behavior for the clear during pending
    /// creation scenario.
    ///
    /// Assertions:
    /// - Confirms the pending slot was counted before `clear`.
    /// - Confirms the creating caller still receives its own value.
    /// - Ensures the value is not cached afterwards.
    #[test]
    fn test_cache_clear_supersedes_pending_creation() {
        let cache: Cache<String, i32> = Cache::new();

        let (len_before, created) = interrupt_pending_creation(&cache, |cache| {
            let len = cache.len();
            cache.clear();
            len
        });

        assert_eq!(len_before, 1);
        assert_eq!(created.ok(), Some(1));
        assert_eq!(cache.try_get(&"k".to_string()), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_cache_get_or_insert_with() {
        let (cache, _clock) = cache();
        assert_eq!(cache.get_or_insert_with("key".to_string(), |_| 42, None).ok(), Some(42));
        assert_eq!(cache.get_or_insert_with("key".to_string(), |_| 99, None).ok(), Some(42));
    }

    /// Validates `Cache::clone` behavior for the shared storage scenario.
    ///
    /// Assertions:
    /// - Confirms `cache2.try_get(..)` sees writes made through `cache1`.
    /// - Confirms the async view sees the same entries.
    #[test]
    fn test_cache_clone_shares_storage() {
        let cache1: Cache<String, i32> = Cache::new();
        cache1.set("key".to_string(), 42, None);

        let cache2 = cache1.clone();
        assert_eq!(cache2.try_get(&"key".to_string()), Some(42));

        cache2.set("key2".to_string(), 84, None);
        assert_eq!(cache1.try_get(&"key2".to_string()), Some(84));

        let view = cache1.to_async();
        assert_eq!(view.to_sync().len(), 2);
    }

    /// Validates `Cache::with_config` behavior for the invalid configuration
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures a zero interval is rejected.
    /// - Ensures a sweep without a runtime is rejected.
    /// - Ensures a named, unswept cache builds outside a runtime.
    #[test]
    fn test_cache_with_config_validation() {
        let zero = CacheConfig::swept(Duration::ZERO);
        assert!(matches!(
            Cache::<String, i32, _>::with_config(zero, MockClock::new()),
            Err(CacheError::Config { .. })
        ));

        let swept = CacheConfig::swept(Duration::from_secs(1));
        assert!(matches!(
            Cache::<String, i32, _>::with_config(swept, MockClock::new()),
            Err(CacheError::Config { .. })
        ));

        let named = CacheConfig::builder().name("users").build();
        let cache = Cache::<String, i32, _>::with_config(named, MockClock::new())
            .expect("valid config");
        assert_eq!(cache.name(), "users");
    }

    #[tokio::test]
    async fn test_cache_with_config_spawns_sweeper() {
        let config =
            CacheConfig::builder().name("swept").sweep_interval(Duration::from_secs(30)).build();
        let cache = Cache::<String, i32, _>::with_config(config, MockClock::new())
            .expect("valid config");

        let sweeper = cache.sweeper().expect("sweeper configured");
        assert!(sweeper.is_running());
        sweeper.shutdown().await;
        assert!(!sweeper.is_running());
    }
}
