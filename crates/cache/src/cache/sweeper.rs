//! Periodic removal of expired entries
//!
//! Lazy eviction only reclaims entries that are read again. A [`Sweeper`]
//! bounds memory for write-once keys by purging on a fixed interval.
//!
//! The sweep task holds only a weak reference to the store, so it never keeps
//! a cache alive. It exits when cancelled or once the store is gone.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Weak;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::store::Store;
use crate::clock::Clock;
use crate::error::{CacheError, CacheResult};

/// Maximum time [`Sweeper::shutdown`] waits for the task to exit
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to a running background sweep
///
/// Dropping the handle stops the sweep.
#[derive(Debug)]
pub struct Sweeper {
    name: String,
    interval: Duration,
    cancellation_token: CancellationToken,
    task_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Sweeper {
    /// Spawn the sweep loop on the current Tokio runtime
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Config`] when no runtime is available.
    #[instrument(skip(store, name), fields(cache = %name))]
    pub(crate) fn spawn<K, V, C>(
        store: Weak<Store<K, V, C>>,
        name: String,
        interval: Duration,
    ) -> CacheResult<Self>
    where
        K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
        C: Clock,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            warn!("sweep interval configured outside a Tokio runtime");
            CacheError::config("sweep_interval", "a background sweep requires a Tokio runtime")
        })?;

        let cancellation_token = CancellationToken::new();
        let cancel = cancellation_token.clone();
        let task_name = name.clone();
        let handle = runtime.spawn(async move {
            Self::sweep_loop(store, task_name, interval, cancel).await;
        });

        info!(interval_ms = interval.as_millis() as u64, "sweeper started");

        Ok(Self { name, interval, cancellation_token, task_handle: Mutex::new(Some(handle)) })
    }

    async fn sweep_loop<K, V, C>(
        store: Weak<Store<K, V, C>>,
        name: String,
        interval: Duration,
        cancel: CancellationToken,
    ) where
        K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
        C: Clock,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(cache = %name, "sweep loop cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    let Some(store) = store.upgrade() else {
                        debug!(cache = %name, "cache dropped; sweep loop exiting");
                        break;
                    };
                    let removed = store.purge_expired();
                    debug!(cache = %name, removed, remaining = store.len(), "sweep pass completed");
                }
            }
        }
    }

    /// Sweep period
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the sweep task is still alive
    pub fn is_running(&self) -> bool {
        !self.cancellation_token.is_cancelled()
            && self.task_handle.lock().as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Signal the sweep task to stop without waiting for it
    pub fn stop(&self) {
        self.cancellation_token.cancel();
    }

    /// Stop the sweep task and wait for it to exit
    #[instrument(skip(self), fields(cache = %self.name))]
    pub async fn shutdown(&self) {
        self.cancellation_token.cancel();

        let handle = self.task_handle.lock().take();
        if let Some(handle) = handle {
            match tokio::time::timeout(SHUTDOWN_TIMEOUT, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(error = %e, "sweep task failed"),
                Err(_) => warn!("sweep task did not complete within timeout"),
            }
        }

        info!("sweeper stopped");
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        if !self.cancellation_token.is_cancelled() {
            debug!(cache = %self.name, "sweeper dropped while running; cancelling");
            self.cancellation_token.cancel();
        }
    }
}
