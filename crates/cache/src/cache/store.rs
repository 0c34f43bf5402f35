//! Shared storage behind both cache views
//!
//! The store is a sharded concurrent map from key to [`Slot`]. Operations on
//! unrelated keys contend only when they hash to the same shard, and every
//! check-then-act on a key happens under that key's entry lock.

use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use tracing::{debug, info, warn};

use super::entry::Entry;
use super::slot::{Flight, Slot};
use super::stats::{CacheStats, MetricsCollector};
use crate::clock::Clock;
use crate::error::{BoxError, CacheError, CacheResult};

/// Result of claiming a key for `get_or_add`
enum Claim<V> {
    /// A live value was already present
    Hit(V),
    /// The caller installed a new flight and must run the factory
    Owner(Arc<Flight<V>>),
    /// The caller joined someone else's flight
    Waiter(Arc<Flight<V>>),
}

pub(crate) struct Store<K, V, C> {
    slots: DashMap<K, Slot<V>>,
    clock: C,
    metrics: MetricsCollector,
    name: String,
}

impl<K, V, C> fmt::Debug for Store<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store").field("name", &self.name).finish_non_exhaustive()
    }
}

impl<K, V, C> Store<K, V, C>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Clock,
{
    pub(crate) fn new(clock: C, name: String) -> Self {
        Self { slots: DashMap::new(), clock, metrics: MetricsCollector::new(), name }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Live value for `key`, without touching the counters
    ///
    /// An expired entry found here is evicted before returning.
    fn lookup(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let expired = match self.slots.get(key) {
            Some(slot) => match slot.value() {
                Slot::Present(entry) if !entry.is_expired_at(now) => {
                    return Some(entry.value().clone());
                }
                Slot::Present(_) => true,
                Slot::Pending(_) => false,
            },
            None => false,
        };
        if expired {
            self.evict_expired(key, now);
        }
        None
    }

    fn evict_expired(&self, key: &K, now: Instant) {
        let removed = self
            .slots
            .remove_if(key, |_, slot| matches!(slot, Slot::Present(entry) if entry.is_expired_at(now)));
        if removed.is_some() {
            self.metrics.record_expirations(1);
            debug!(cache = %self.name, key = ?key, "evicted expired entry");
        }
    }

    pub(crate) fn try_get(&self, key: &K) -> Option<V> {
        let value = self.lookup(key);
        if value.is_some() {
            self.metrics.record_hit();
        } else {
            self.metrics.record_miss();
        }
        value
    }

    pub(crate) fn set(&self, key: K, value: V, ttl: Option<Duration>) {
        let entry = Entry::new(value, self.clock.now(), ttl);
        if let Some(Slot::Pending(_)) = self.slots.insert(key.clone(), Slot::Present(entry)) {
            debug!(cache = %self.name, key = ?key, "set superseded a pending creation");
        }
        self.metrics.record_insert();
    }

    pub(crate) fn remove(&self, key: &K) -> bool {
        self.slots.remove(key).is_some()
    }

    pub(crate) fn clear(&self) {
        let dropped = self.slots.len();
        self.slots.clear();
        info!(cache = %self.name, dropped, "cache cleared");
    }

    /// Logical presence check; never evicts
    pub(crate) fn contains_key(&self, key: &K) -> bool {
        let now = self.clock.now();
        self.slots.get(key).is_some_and(
            |slot| matches!(slot.value(), Slot::Present(entry) if !entry.is_expired_at(now)),
        )
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Remove every expired entry; returns how many were removed
    pub(crate) fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0usize;
        self.slots.retain(|_, slot| {
            let expired = matches!(slot, Slot::Present(entry) if entry.is_expired_at(now));
            if expired {
                removed += 1;
            }
            !expired
        });
        self.metrics.record_expirations(removed as u64);
        removed
    }

    pub(crate) fn stats(&self) -> CacheStats {
        self.metrics.snapshot(self.slots.len())
    }

    pub(crate) fn reset_stats(&self) {
        self.metrics.reset();
    }

    /// Atomically find a live value, join a running creation, or start one
    fn claim(&self, key: &K) -> Claim<V> {
        let now = self.clock.now();
        let flight = Flight::new();
        match self.slots.entry(key.clone()) {
            MapEntry::Occupied(mut occupied) => {
                match occupied.get() {
                    Slot::Present(entry) if !entry.is_expired_at(now) => {
                        self.metrics.record_hit();
                        return Claim::Hit(entry.value().clone());
                    }
                    Slot::Present(_) => {
                        self.metrics.record_expirations(1);
                        debug!(cache = %self.name, key = ?key, "replacing expired entry");
                    }
                    Slot::Pending(running) => {
                        if running.join() {
                            self.metrics.record_miss();
                            self.metrics.record_coalesced();
                            return Claim::Waiter(Arc::clone(running));
                        }
                    }
                }
                occupied.insert(Slot::Pending(Arc::clone(&flight)));
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(Slot::Pending(Arc::clone(&flight)));
            }
        }
        self.metrics.record_miss();
        self.metrics.record_factory_run();
        Claim::Owner(flight)
    }

    /// Install a created value if `flight` still owns the slot
    fn commit(&self, key: &K, flight: &Arc<Flight<V>>, value: V, ttl: Option<Duration>) -> bool {
        if let Some(mut slot) = self.slots.get_mut(key) {
            if matches!(slot.value(), Slot::Pending(current) if Arc::ptr_eq(current, flight)) {
                *slot = Slot::Present(Entry::new(value, self.clock.now(), ttl));
                self.metrics.record_insert();
                return true;
            }
        }
        debug!(cache = %self.name, key = ?key, "creation superseded; result not cached");
        false
    }

    /// Remove the slot if it still belongs to `flight`
    fn discard_flight(&self, key: &K, flight: &Arc<Flight<V>>) {
        self.slots
            .remove_if(key, |_, slot| matches!(slot, Slot::Pending(current) if Arc::ptr_eq(current, flight)));
    }

    /// Single-flight get-or-create running the factory on the calling thread
    pub(crate) fn get_or_add_blocking<F, E>(
        self: &Arc<Self>,
        key: K,
        factory: F,
        ttl: Option<Duration>,
    ) -> CacheResult<V>
    where
        F: FnOnce(&K) -> Result<V, E>,
        E: Into<BoxError>,
    {
        if let Some(value) = self.lookup(&key) {
            self.metrics.record_hit();
            return Ok(value);
        }
        match self.claim(&key) {
            Claim::Hit(value) => Ok(value),
            Claim::Waiter(flight) => {
                let _interest = Interest::new(Arc::clone(self), key, Arc::clone(&flight));
                flight.wait_blocking()
            }
            Claim::Owner(flight) => {
                let _interest = Interest::new(Arc::clone(self), key.clone(), Arc::clone(&flight));
                let creation = Creation::new(Arc::clone(self), key, flight);
                let outcome = factory(&creation.key).map_err(CacheError::factory);
                creation.finish(outcome, ttl)
            }
        }
    }

    /// Single-flight get-or-create with the factory future spawned on Tokio
    ///
    /// The creation task outlives any single caller; it is aborted only when
    /// every interested caller has stopped waiting.
    pub(crate) async fn get_or_add_async<F, Fut, E>(
        self: &Arc<Self>,
        key: K,
        factory: F,
        ttl: Option<Duration>,
    ) -> CacheResult<V>
    where
        F: FnOnce(K) -> Fut + Send,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Into<BoxError>,
    {
        if let Some(value) = self.lookup(&key) {
            self.metrics.record_hit();
            return Ok(value);
        }
        let interest = match self.claim(&key) {
            Claim::Hit(value) => return Ok(value),
            Claim::Waiter(flight) => Interest::new(Arc::clone(self), key, flight),
            Claim::Owner(flight) => {
                let interest = Interest::new(Arc::clone(self), key.clone(), Arc::clone(&flight));
                let creation = Creation::new(Arc::clone(self), key.clone(), Arc::clone(&flight));
                let pending = factory(key);
                let task = tokio::spawn(async move {
                    let outcome = pending.await.map_err(CacheError::factory);
                    let _ = creation.finish(outcome, ttl);
                });
                flight.set_abort(task.abort_handle());
                interest
            }
        };
        interest.flight.wait().await
    }
}

/// One caller's interest in a flight's outcome
///
/// Dropping the last interest before the outcome exists cancels the flight
/// and clears its slot.
struct Interest<K, V, C>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Clock,
{
    store: Arc<Store<K, V, C>>,
    key: K,
    flight: Arc<Flight<V>>,
}

impl<K, V, C> Interest<K, V, C>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Clock,
{
    fn new(store: Arc<Store<K, V, C>>, key: K, flight: Arc<Flight<V>>) -> Self {
        Self { store, key, flight }
    }
}

impl<K, V, C> Drop for Interest<K, V, C>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Clock,
{
    fn drop(&mut self) {
        if self.flight.release() {
            self.store.discard_flight(&self.key, &self.flight);
            debug!(cache = %self.store.name, key = ?self.key, "creation cancelled by last waiter");
        }
    }
}

/// Ownership of a running creation
///
/// If dropped without [`Creation::finish`] (the factory panicked or its task
/// was aborted) the slot is cleared and waiters observe `Abandoned`.
struct Creation<K, V, C>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Clock,
{
    store: Arc<Store<K, V, C>>,
    key: K,
    flight: Arc<Flight<V>>,
    finished: bool,
}

impl<K, V, C> Creation<K, V, C>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Clock,
{
    fn new(store: Arc<Store<K, V, C>>, key: K, flight: Arc<Flight<V>>) -> Self {
        Self { store, key, flight, finished: false }
    }

    /// Commit a successful value, clear the slot on failure, then wake waiters
    fn finish(mut self, outcome: CacheResult<V>, ttl: Option<Duration>) -> CacheResult<V> {
        self.finished = true;
        match &outcome {
            Ok(value) => {
                self.store.commit(&self.key, &self.flight, value.clone(), ttl);
            }
            Err(err) => {
                self.store.metrics.record_factory_failure();
                self.store.discard_flight(&self.key, &self.flight);
                debug!(cache = %self.store.name, key = ?self.key, error = %err, "value factory failed");
            }
        }
        self.flight.resolve(outcome.clone());
        outcome
    }
}

impl<K, V, C> Drop for Creation<K, V, C>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Clock,
{
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        self.store.discard_flight(&self.key, &self.flight);
        if self.flight.resolve(Err(CacheError::Abandoned)) {
            warn!(cache = %self.store.name, key = ?self.key, "creation abandoned before completing");
        }
    }
}
