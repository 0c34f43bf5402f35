//! Per-key slot state machine
//!
//! A key with no map entry is *empty*. Otherwise its map value is a [`Slot`]:
//! either a committed [`Entry`] or a [`Flight`], the shared record of one
//! in-progress creation that late joiners wait on.
//!
//! Lock order is always shard lock, then flight lock. Nothing acquires a
//! shard lock while holding a flight lock.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tokio::sync::Notify;
use tokio::task::AbortHandle;

use super::entry::Entry;
use crate::error::{CacheError, CacheResult};

/// Map value for a key that is being created or is present
#[derive(Debug)]
pub(crate) enum Slot<V> {
    Pending(Arc<Flight<V>>),
    Present(Entry<V>),
}

#[derive(Debug)]
struct FlightState<V> {
    outcome: Option<CacheResult<V>>,
    /// Callers still waiting for the outcome, the owner included
    interest: usize,
    /// Set when the creation runs as a spawned task
    abort: Option<AbortHandle>,
}

/// One in-progress creation
///
/// Blocking waiters park on the condvar; async waiters on the `Notify`.
/// Both are woken once, when the outcome is set.
#[derive(Debug)]
pub(crate) struct Flight<V> {
    state: Mutex<FlightState<V>>,
    ready: Condvar,
    notify: Notify,
}

impl<V: Clone> Flight<V> {
    /// New unresolved flight; the creating caller holds the first interest
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FlightState { outcome: None, interest: 1, abort: None }),
            ready: Condvar::new(),
            notify: Notify::new(),
        })
    }

    /// Register another waiter
    ///
    /// Returns false if the flight already has an outcome; the caller must
    /// then start a fresh creation instead of joining this one.
    pub(crate) fn join(&self) -> bool {
        let mut state = self.state.lock();
        if state.outcome.is_some() {
            return false;
        }
        state.interest += 1;
        true
    }

    /// Drop one waiter's interest
    ///
    /// When the last interested caller leaves before an outcome exists, the
    /// flight resolves as cancelled and its spawned task (if any) is aborted.
    /// Returns true in that case so the caller can clear the slot.
    pub(crate) fn release(&self) -> bool {
        let abort = {
            let mut state = self.state.lock();
            state.interest = state.interest.saturating_sub(1);
            if state.interest > 0 || state.outcome.is_some() {
                return false;
            }
            state.outcome = Some(Err(CacheError::Cancelled));
            state.abort.take()
        };
        self.wake();
        if let Some(handle) = abort {
            handle.abort();
        }
        true
    }

    /// Attach the spawned creation task so it can be aborted
    pub(crate) fn set_abort(&self, handle: AbortHandle) {
        let mut state = self.state.lock();
        if state.outcome.is_none() {
            state.abort = Some(handle);
        }
    }

    /// Publish the outcome; only the first call wins
    pub(crate) fn resolve(&self, outcome: CacheResult<V>) -> bool {
        {
            let mut state = self.state.lock();
            if state.outcome.is_some() {
                return false;
            }
            state.outcome = Some(outcome);
            state.abort = None;
        }
        self.wake();
        true
    }

    pub(crate) fn outcome(&self) -> Option<CacheResult<V>> {
        self.state.lock().outcome.clone()
    }

    /// Block the current thread until the outcome is available
    pub(crate) fn wait_blocking(&self) -> CacheResult<V> {
        let mut state = self.state.lock();
        loop {
            if let Some(outcome) = &state.outcome {
                return outcome.clone();
            }
            self.ready.wait(&mut state);
        }
    }

    /// Wait asynchronously until the outcome is available
    pub(crate) async fn wait(&self) -> CacheResult<V> {
        loop {
            // Registered before the check so a concurrent resolve is not missed.
            let notified = self.notify.notified();
            if let Some(outcome) = self.outcome() {
                return outcome;
            }
            notified.await;
        }
    }

    fn wake(&self) {
        self.ready.notify_all();
        self.notify.notify_waiters();
    }
}
