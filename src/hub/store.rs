// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The single shared, published snapshot.
//!
//! Refresh ticks, latch expiries and commands all mutate the snapshot
//! through a [`Transaction`], which holds the store lock for the duration of
//! one local computation. The lock is never held across an `.await`, so the
//! three sources form one ordered stream of mutations. A committed
//! transaction publishes the new snapshot on the watch channel and its
//! events on the event bus while still holding the lock, so observers see
//! changes in the order they were applied.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};

use crate::alert::AlertChannel;
use crate::error::FetchError;
use crate::event::{EventBus, HubEvent};
use crate::latch::{ExpiryOutcome, LatchTimers, TimerId};
use crate::model::Snapshot;
use crate::refresh::RefreshOutcome;
use crate::state::{ChangeCause, SnapshotDelta};

use super::HubConfig;

/// State guarded by the store lock.
#[derive(Debug)]
struct Inner {
    snapshot: Snapshot,
    latches: LatchTimers,
}

#[derive(Debug)]
struct Shared {
    inner: Mutex<Inner>,
    published: watch::Sender<Arc<Snapshot>>,
    events: EventBus,
    config: HubConfig,
    runtime: Handle,
}

/// Handle to the published snapshot. Clones share the same state.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    shared: Arc<Shared>,
}

impl SnapshotStore {
    /// Creates a store publishing `initial`.
    ///
    /// Gates are given the configured latch options and any armed latch
    /// they report is dropped, since no countdown is running for it.
    /// Latch countdowns and the refresh loop run on `runtime`.
    #[must_use]
    pub fn new(mut initial: Snapshot, config: HubConfig, runtime: Handle) -> Self {
        config.apply_latch_options(&mut initial);
        initial.gates = initial
            .gates
            .into_iter()
            .map(|gate| gate.normalized().without_latch())
            .collect();

        let (published, _) = watch::channel(Arc::new(initial.clone()));
        let events = EventBus::with_capacity(config.event_capacity);

        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    snapshot: initial,
                    latches: LatchTimers::new(runtime.clone()),
                }),
                published,
                events,
                config,
                runtime,
            }),
        }
    }

    /// Returns the currently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.shared.published.borrow().clone()
    }

    /// Creates a watch receiver that always holds the latest snapshot.
    ///
    /// Publication happens under the store lock, so do not hold a
    /// [`watch::Receiver::borrow`] guard while issuing a command on the
    /// same thread; clone the `Arc` out of the guard instead.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.shared.published.subscribe()
    }

    /// Subscribes to hub events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<HubEvent> {
        self.shared.events.subscribe()
    }

    /// Returns the number of active event subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.shared.events.subscriber_count()
    }

    /// Returns the number of gates with a live latch countdown.
    #[must_use]
    pub fn armed_latch_count(&self) -> usize {
        self.shared.inner.lock().latches.live_count()
    }

    /// Returns `true` if `gate` has a live latch countdown.
    #[must_use]
    pub fn is_latch_armed(&self, gate: &str) -> bool {
        self.shared.inner.lock().latches.armed_id(gate).is_some()
    }

    /// Returns the runtime background tasks are spawned on.
    pub(crate) fn runtime(&self) -> &Handle {
        &self.shared.runtime
    }

    /// Reads the working snapshot under the lock.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&Snapshot) -> R) -> R {
        f(&self.shared.inner.lock().snapshot)
    }

    /// Runs `f` while holding the store lock.
    ///
    /// Used to order a flag change against in-flight publications.
    pub(crate) fn fence(&self, f: impl FnOnce()) {
        let _guard = self.shared.inner.lock();
        f();
    }

    /// Starts a transaction.
    pub(crate) fn begin(&self) -> Transaction<'_> {
        Transaction {
            store: self,
            inner: self.shared.inner.lock(),
            events: Vec::new(),
            dirty: false,
        }
    }

    /// Publishes the result of one refresh tick.
    ///
    /// `is_live` is evaluated under the lock; if it returns `false` the
    /// result is discarded. A successful fetch replaces music, rooms and
    /// alert and reconciles gates. A failed fetch leaves the readings alone
    /// and writes an error alert into the alert slot.
    pub(crate) fn apply_refresh(
        &self,
        result: Result<Snapshot, FetchError>,
        is_live: impl FnOnce() -> bool,
    ) -> RefreshOutcome {
        let mut tx = self.begin();
        if !is_live() {
            tracing::debug!("Discarding refresh result after stop");
            return RefreshOutcome::Discarded;
        }

        match result {
            Ok(mut incoming) => {
                self.shared.config.apply_latch_options(&mut incoming);
                let alert = incoming.alert.take();

                let Inner { snapshot, latches } = &mut *tx.inner;
                let removed = snapshot.merge_readings(incoming);
                for gate in &removed {
                    latches.cancel(gate);
                    tracing::info!(gate = %gate, "Gate no longer reported, dropped");
                }
                AlertChannel::new(&mut snapshot.alert).replace(alert);

                tx.record(SnapshotDelta::Refreshed, ChangeCause::Refresh);
                tx.commit();
                RefreshOutcome::Applied
            }
            Err(error) => {
                tracing::warn!(%error, "Snapshot refresh failed, keeping previous readings");
                let alert = AlertChannel::new(&mut tx.snapshot_mut().alert).raise_fetch_failure(&error);

                tx.record(
                    SnapshotDelta::alert(Some(alert)),
                    ChangeCause::RefreshFailure,
                );
                tx.push_event(HubEvent::refresh_failed(error.to_string()));
                tx.commit();
                RefreshOutcome::Failed
            }
        }
    }

    /// Closes `gate` because countdown `id` ran out.
    pub(crate) fn expire_latch(&self, gate: &str, id: TimerId) -> ExpiryOutcome {
        let mut tx = self.begin();
        if !tx.inner.latches.release(gate, id) {
            tracing::debug!(gate, %id, "Latch expiry lost race, ignoring");
            return ExpiryOutcome::TimerRaceNoop;
        }

        let delta = {
            let Some(entry) = tx.snapshot_mut().gate_mut(gate) else {
                return ExpiryOutcome::TimerRaceNoop;
            };
            if !entry.close() {
                tracing::debug!(gate, %id, "Latch expired on closed gate, ignoring");
                return ExpiryOutcome::TimerRaceNoop;
            }
            SnapshotDelta::Gate(entry.clone())
        };

        tracing::info!(gate, "Latch expired, gate closed");
        tx.record(delta, ChangeCause::LatchExpired);
        tx.commit();
        ExpiryOutcome::Closed
    }

    fn downgrade(&self) -> Weak<Shared> {
        Arc::downgrade(&self.shared)
    }
}

/// Exclusive access to the working snapshot.
///
/// Changes become visible to observers only on [`commit`](Self::commit).
/// Dropping a transaction without committing publishes nothing, so callers
/// validate before they mutate.
pub(crate) struct Transaction<'a> {
    store: &'a SnapshotStore,
    inner: MutexGuard<'a, Inner>,
    events: Vec<HubEvent>,
    dirty: bool,
}

impl Transaction<'_> {
    pub(crate) fn snapshot(&self) -> &Snapshot {
        &self.inner.snapshot
    }

    pub(crate) fn snapshot_mut(&mut self) -> &mut Snapshot {
        &mut self.inner.snapshot
    }

    /// Records a change to publish on commit.
    pub(crate) fn record(&mut self, delta: SnapshotDelta, cause: ChangeCause) {
        self.dirty = true;
        self.events.push(HubEvent::changed(delta, cause));
    }

    /// Queues an event that does not by itself change the snapshot.
    pub(crate) fn push_event(&mut self, event: HubEvent) {
        self.events.push(event);
    }

    /// Starts (or restarts) the latch countdown for `gate`.
    pub(crate) fn arm_latch(&mut self, gate: &str, delay: Duration) -> TimerId {
        let store = self.store.downgrade();
        let name = gate.to_string();
        self.inner.latches.arm(gate, delay, move |id| {
            // The hub may have been dropped while the countdown ran.
            if let Some(shared) = store.upgrade() {
                SnapshotStore { shared }.expire_latch(&name, id);
            }
        })
    }

    /// Cancels the latch countdown for `gate`, if any.
    pub(crate) fn cancel_latch(&mut self, gate: &str) -> bool {
        self.inner.latches.cancel(gate)
    }

    /// Publishes the recorded changes.
    pub(crate) fn commit(mut self) {
        if self.dirty {
            let snapshot = Arc::new(self.inner.snapshot.clone());
            self.store.shared.published.send_replace(snapshot);
        }
        for event in self.events.drain(..) {
            self.store.shared.events.publish(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Alert, Brightness, Gate, LatchOption, Light, LightState, MusicState, PlayState, Room,
        Severity, Track,
    };

    fn snapshot(title: &str) -> Snapshot {
        Snapshot::new(
            MusicState::new(PlayState::Paused, Track::new(title, "Artist", "Album", "art")),
            vec![Room::new(
                "Studio",
                vec![Light::new(
                    "l1",
                    "Desk",
                    LightState::new(true, false, Brightness::MAX),
                )],
            )],
            vec![Gate::new("Front", Vec::new())],
            None,
        )
    }

    #[tokio::test]
    async fn new_store_applies_latch_defaults() {
        let store = SnapshotStore::new(snapshot("A"), HubConfig::default(), Handle::current());
        let published = store.snapshot();

        assert_eq!(
            published.gate("Front").unwrap().available_latch_options(),
            LatchOption::defaults().as_slice()
        );
    }

    #[tokio::test]
    async fn uncommitted_transaction_publishes_nothing() {
        let store = SnapshotStore::new(snapshot("A"), HubConfig::default(), Handle::current());
        let mut rx = store.subscribe();

        {
            let mut tx = store.begin();
            tx.snapshot_mut().music.play_state = PlayState::Playing;
        }

        assert_eq!(store.snapshot().music.play_state, PlayState::Paused);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn refresh_replaces_readings_and_alert() {
        let store = SnapshotStore::new(snapshot("A"), HubConfig::default(), Handle::current());
        let mut incoming = snapshot("B");
        incoming.alert = Some(Alert::warning("Heads up", "Visitors at noon"));

        let outcome = store.apply_refresh(Ok(incoming), || true);

        assert_eq!(outcome, RefreshOutcome::Applied);
        let published = store.snapshot();
        assert_eq!(published.music.current_track.title, "B");
        assert_eq!(published.alert.as_ref().unwrap().severity, Severity::Warning);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_readings_and_raises_error() {
        let store = SnapshotStore::new(snapshot("A"), HubConfig::default(), Handle::current());
        let mut rx = store.subscribe();

        let outcome = store.apply_refresh(Err(FetchError::Unavailable("offline".into())), || true);

        assert_eq!(outcome, RefreshOutcome::Failed);
        let published = store.snapshot();
        assert_eq!(published.music.current_track.title, "A");
        assert_eq!(published.alert.as_ref().unwrap().severity, Severity::Error);

        assert_eq!(rx.try_recv().unwrap().cause(), Some(ChangeCause::RefreshFailure));
        assert!(rx.try_recv().unwrap().is_refresh_failure());
    }

    #[tokio::test]
    async fn discarded_refresh_changes_nothing() {
        let store = SnapshotStore::new(snapshot("A"), HubConfig::default(), Handle::current());

        let outcome = store.apply_refresh(Ok(snapshot("B")), || false);

        assert_eq!(outcome, RefreshOutcome::Discarded);
        assert_eq!(store.snapshot().music.current_track.title, "A");
    }

    #[tokio::test]
    async fn expiry_with_stale_id_is_noop() {
        let store = SnapshotStore::new(snapshot("A"), HubConfig::default(), Handle::current());
        let stale = {
            let mut tx = store.begin();
            tx.snapshot_mut().gate_mut("Front").unwrap().open(None);
            let stale = tx.arm_latch("Front", Duration::from_secs(600));
            tx.arm_latch("Front", Duration::from_secs(600));
            tx.commit();
            stale
        };

        assert_eq!(store.expire_latch("Front", stale), ExpiryOutcome::TimerRaceNoop);
        assert!(store.snapshot().gate("Front").unwrap().is_open());
        assert_eq!(store.armed_latch_count(), 1);
    }

    #[tokio::test]
    async fn expiry_closes_open_gate() {
        let store = SnapshotStore::new(snapshot("A"), HubConfig::default(), Handle::current());
        let id = {
            let mut tx = store.begin();
            let option = LatchOption::defaults()[0].clone();
            tx.snapshot_mut().gate_mut("Front").unwrap().open(Some(option));
            let id = tx.arm_latch("Front", Duration::from_secs(600));
            tx.commit();
            id
        };

        assert_eq!(store.expire_latch("Front", id), ExpiryOutcome::Closed);
        let gate = store.snapshot().gate("Front").cloned().unwrap();
        assert!(!gate.is_open());
        assert!(gate.armed_latch().is_none());
        assert_eq!(store.armed_latch_count(), 0);

        // A second expiry for the same id finds the slot empty
        assert_eq!(store.expire_latch("Front", id), ExpiryOutcome::TimerRaceNoop);
    }
}
