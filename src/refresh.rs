// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic snapshot refresh.
//!
//! A [`RefreshScheduler`] task calls [`SnapshotProvider::fetch`] once per
//! interval and publishes the result into a [`SnapshotStore`]. The first
//! tick happens one interval after start. Fetch failures keep the previous
//! readings, raise an error alert and are retried on the next tick.
//!
//! Stopping is race-free: [`RefreshHandle::stop`] flips the stop flag while
//! holding the store lock, and a tick only publishes if it observes the
//! flag unset under that same lock. Once `stop` returns, no result, not even
//! one from a fetch that was already in flight, reaches the snapshot.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::hub::SnapshotStore;
use crate::provider::SnapshotProvider;

/// What happened to one refresh result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New readings were published.
    Applied,
    /// The fetch failed; an error alert was published instead.
    Failed,
    /// The scheduler was stopped first; nothing was published.
    Discarded,
}

#[derive(Debug, Default)]
struct RefreshControl {
    stopped: AtomicBool,
    ticks: AtomicU64,
    failures: AtomicU64,
}

impl RefreshControl {
    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Starts refresh loops.
#[derive(Debug, Clone, Copy)]
pub struct RefreshScheduler;

impl RefreshScheduler {
    /// Spawns a loop refreshing `store` from `provider` every `interval`.
    ///
    /// The loop runs on the store's runtime, so this may be called from
    /// any thread.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    #[must_use = "dropping the handle stops the scheduler"]
    pub fn start<P>(store: SnapshotStore, interval: Duration, provider: Arc<P>) -> RefreshHandle
    where
        P: SnapshotProvider + Send + Sync + 'static,
    {
        let control = Arc::new(RefreshControl::default());

        let task_store = store.clone();
        let task_control = Arc::clone(&control);
        let task = store.runtime().spawn(async move {
            Self::run(task_store, interval, provider, task_control).await;
        });

        tracing::info!(
            interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            "Refresh scheduler started"
        );

        RefreshHandle {
            control,
            task: Some(task),
            store,
            interval,
        }
    }

    async fn run<P>(
        store: SnapshotStore,
        interval: Duration,
        provider: Arc<P>,
        control: Arc<RefreshControl>,
    ) where
        P: SnapshotProvider + Send + Sync + 'static,
    {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if control.is_stopped() {
                break;
            }

            let tick = control.ticks.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::debug!(tick, "Refresh tick");

            let result = provider.fetch().await;
            match store.apply_refresh(result, || !control.is_stopped()) {
                RefreshOutcome::Applied => {}
                RefreshOutcome::Failed => {
                    control.failures.fetch_add(1, Ordering::Relaxed);
                }
                RefreshOutcome::Discarded => break,
            }
        }

        tracing::debug!("Refresh loop exited");
    }
}

/// Handle to a running refresh loop.
///
/// Dropping the handle stops the loop.
#[derive(Debug)]
pub struct RefreshHandle {
    control: Arc<RefreshControl>,
    task: Option<JoinHandle<()>>,
    store: SnapshotStore,
    interval: Duration,
}

impl RefreshHandle {
    /// Stops the loop. No publication happens after this returns.
    pub fn stop(mut self) {
        self.halt();
    }

    /// Returns `true` once the loop has been stopped.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.control.is_stopped()
    }

    /// Returns the number of ticks that called the provider.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.control.ticks.load(Ordering::Relaxed)
    }

    /// Returns the number of ticks whose fetch failed.
    #[must_use]
    pub fn failure_count(&self) -> u64 {
        self.control.failures.load(Ordering::Relaxed)
    }

    /// Returns the refresh interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn halt(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        let control = &self.control;
        self.store
            .fence(|| control.stopped.store(true, Ordering::SeqCst));
        task.abort();
        tracing::info!(ticks = self.tick_count(), "Refresh scheduler stopped");
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.halt();
    }
}
