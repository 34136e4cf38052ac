// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The hub facade.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};

use crate::error::{Error, Result};
use crate::event::HubEvent;
use crate::model::Snapshot;
use crate::provider::{MusicSource, SnapshotProvider};
use crate::refresh::{RefreshHandle, RefreshOutcome, RefreshScheduler};

use super::{CommandDispatcher, HubConfig, SnapshotStore};

/// Owns the published snapshot, the refresh scheduler and the command
/// surface of one office.
///
/// Dropping the hub stops its refresh scheduler and cancels every latch
/// countdown.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use officehub_lib::hub::{HubConfig, OfficeHub};
/// use officehub_lib::provider::SyntheticProvider;
///
/// #[tokio::main]
/// async fn main() -> officehub_lib::Result<()> {
///     let devices = Arc::new(SyntheticProvider::new());
///     let hub = OfficeHub::connect(HubConfig::default(), devices.clone(), devices).await?;
///
///     let mut changes = hub.subscribe();
///     hub.commands().toggle_play()?;
///
///     let event = changes.recv().await.unwrap();
///     println!("{event:?}");
///     Ok(())
/// }
/// ```
pub struct OfficeHub<P, M> {
    store: SnapshotStore,
    provider: Arc<P>,
    commands: CommandDispatcher<M>,
    config: HubConfig,
    refresh: Mutex<Option<RefreshHandle>>,
}

impl<P, M> OfficeHub<P, M>
where
    P: SnapshotProvider + Send + Sync + 'static,
    M: MusicSource + Send + Sync + 'static,
{
    /// Fetches an initial snapshot and builds a hub around it.
    ///
    /// Starts the refresh scheduler when `config.auto_refresh` is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Value`] for an invalid configuration and
    /// [`Error::Fetch`] if the initial fetch fails.
    pub async fn connect(config: HubConfig, provider: Arc<P>, music: Arc<M>) -> Result<Self> {
        config.validate()?;
        let runtime = current_runtime()?;
        let initial = provider.fetch().await?;

        let hub = Self::build(config, initial, provider, music, runtime);
        if hub.config.auto_refresh {
            hub.start_refresh()?;
        }

        tracing::info!(
            rooms = hub.store.read(|s| s.rooms.len()),
            gates = hub.store.read(|s| s.gates.len()),
            "Office hub connected"
        );
        Ok(hub)
    }

    /// Builds a hub from a known snapshot without fetching.
    ///
    /// The refresh scheduler is not started; call
    /// [`start_refresh`](Self::start_refresh) when needed. Background work
    /// runs on the runtime this is called from; once built, the hub can be
    /// driven from any thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Value`] for an invalid configuration and
    /// [`Error::NoRuntime`] if called outside a Tokio runtime.
    pub fn with_snapshot(
        config: HubConfig,
        initial: Snapshot,
        provider: Arc<P>,
        music: Arc<M>,
    ) -> Result<Self> {
        config.validate()?;
        let runtime = current_runtime()?;
        Ok(Self::build(config, initial, provider, music, runtime))
    }

    fn build(
        config: HubConfig,
        initial: Snapshot,
        provider: Arc<P>,
        music: Arc<M>,
        runtime: Handle,
    ) -> Self {
        let store = SnapshotStore::new(initial, config.clone(), runtime);
        let commands = CommandDispatcher::new(store.clone(), music);
        Self {
            store,
            provider,
            commands,
            config,
            refresh: Mutex::new(None),
        }
    }

    /// Returns the command surface.
    #[must_use]
    pub fn commands(&self) -> &CommandDispatcher<M> {
        &self.commands
    }

    /// Returns the hub configuration.
    #[must_use]
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    // ========== Published state ==========

    /// Returns the currently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.store.snapshot()
    }

    /// Creates a receiver that always holds the latest snapshot.
    ///
    /// Commands publish while holding the store lock. Do not keep a
    /// [`watch::Receiver::borrow`] guard alive across a command on the same
    /// thread; clone the `Arc` out of it instead.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.store.watch()
    }

    /// Subscribes to change events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<HubEvent> {
        self.store.subscribe()
    }

    /// Returns the number of active event subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.store.subscriber_count()
    }

    /// Returns the number of gates with a live latch countdown.
    #[must_use]
    pub fn armed_latch_count(&self) -> usize {
        self.store.armed_latch_count()
    }

    /// Returns `true` if `gate` has a live latch countdown.
    #[must_use]
    pub fn is_latch_armed(&self, gate: &str) -> bool {
        self.store.is_latch_armed(gate)
    }

    // ========== Refresh ==========

    /// Starts the periodic refresh.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RefreshAlreadyRunning`] if a scheduler is running.
    pub fn start_refresh(&self) -> Result<()> {
        let mut slot = self.refresh.lock();
        if slot.as_ref().is_some_and(|handle| !handle.is_stopped()) {
            return Err(Error::RefreshAlreadyRunning);
        }

        *slot = Some(RefreshScheduler::start(
            self.store.clone(),
            self.config.refresh_interval,
            Arc::clone(&self.provider),
        ));
        Ok(())
    }

    /// Stops the periodic refresh.
    ///
    /// Returns `false` if no scheduler was running. Once this returns, no
    /// refresh result is published until the scheduler is started again.
    pub fn stop_refresh(&self) -> bool {
        let handle = self.refresh.lock().take();
        handle.map(RefreshHandle::stop).is_some()
    }

    /// Returns `true` while the periodic refresh is running.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.refresh
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_stopped())
    }

    /// Returns `(ticks, failures)` of the running scheduler.
    #[must_use]
    pub fn refresh_stats(&self) -> Option<(u64, u64)> {
        self.refresh
            .lock()
            .as_ref()
            .map(|handle| (handle.tick_count(), handle.failure_count()))
    }

    /// Runs one refresh cycle now, outside the schedule.
    ///
    /// Publication follows the same rules as a scheduled tick.
    pub async fn refresh_now(&self) -> RefreshOutcome {
        let result = self.provider.fetch().await;
        self.store.apply_refresh(result, || true)
    }
}

impl<P, M> std::fmt::Debug for OfficeHub<P, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfficeHub")
            .field("store", &self.store)
            .field("config", &self.config)
            .field("refresh", &self.refresh)
            .finish_non_exhaustive()
    }
}

fn current_runtime() -> Result<Handle> {
    Handle::try_current().map_err(|_| Error::NoRuntime)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::FetchError;
    use crate::provider::SyntheticProvider;

    #[tokio::test(start_paused = true)]
    async fn connect_fetches_and_starts_refresh() {
        let devices = Arc::new(SyntheticProvider::new());
        let hub = OfficeHub::connect(HubConfig::default(), devices.clone(), devices.clone())
            .await
            .unwrap();

        assert_eq!(*hub.snapshot(), {
            let mut expected = devices.snapshot_at(1);
            hub.config().apply_latch_options(&mut expected);
            expected
        });
        assert!(hub.is_refreshing());

        tokio::time::sleep(Duration::from_millis(5100)).await;
        assert_eq!(hub.refresh_stats(), Some((1, 0)));
    }

    #[tokio::test]
    async fn connect_fails_when_initial_fetch_fails() {
        let devices = Arc::new(SyntheticProvider::new());
        devices.set_online(false);

        let result = OfficeHub::connect(HubConfig::default(), devices.clone(), devices).await;

        assert!(matches!(
            result,
            Err(Error::Fetch(FetchError::Unavailable(_)))
        ));
    }

    #[tokio::test]
    async fn start_refresh_twice_is_refused() {
        let devices = Arc::new(SyntheticProvider::new());
        let hub = OfficeHub::with_snapshot(
            HubConfig::default(),
            devices.snapshot_at(0),
            devices.clone(),
            devices,
        )
        .unwrap();
        assert!(!hub.is_refreshing());

        hub.start_refresh().unwrap();
        assert!(matches!(
            hub.start_refresh(),
            Err(Error::RefreshAlreadyRunning)
        ));

        assert!(hub.stop_refresh());
        assert!(!hub.stop_refresh());
        hub.start_refresh().unwrap();
    }

    #[tokio::test]
    async fn refresh_now_publishes() {
        let devices = Arc::new(SyntheticProvider::new());
        let hub = OfficeHub::with_snapshot(
            HubConfig::default().without_auto_refresh(),
            devices.snapshot_at(0),
            devices.clone(),
            devices,
        )
        .unwrap();

        assert_eq!(hub.refresh_now().await, RefreshOutcome::Applied);
        assert_eq!(
            hub.snapshot().music.current_track,
            SyntheticProvider::new().snapshot_at(1).music.current_track
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let devices = Arc::new(SyntheticProvider::new());
        let result = OfficeHub::with_snapshot(
            HubConfig::default().with_refresh_interval(Duration::ZERO),
            devices.snapshot_at(0),
            devices.clone(),
            devices,
        );

        assert!(matches!(result, Err(Error::Value(_))));
    }

    #[test]
    fn with_snapshot_outside_runtime_is_refused() {
        let devices = Arc::new(SyntheticProvider::new());
        let result = OfficeHub::with_snapshot(
            HubConfig::default(),
            devices.snapshot_at(0),
            devices.clone(),
            devices,
        );

        assert!(matches!(result, Err(Error::NoRuntime)));
    }

    #[tokio::test(start_paused = true)]
    async fn start_refresh_from_plain_thread() {
        let devices = Arc::new(SyntheticProvider::new());
        let hub = OfficeHub::with_snapshot(
            HubConfig::default(),
            devices.snapshot_at(0),
            devices.clone(),
            devices,
        )
        .unwrap();

        std::thread::scope(|scope| scope.spawn(|| hub.start_refresh()).join().unwrap()).unwrap();
        assert!(hub.is_refreshing());

        tokio::time::sleep(Duration::from_millis(5100)).await;
        assert_eq!(hub.refresh_stats(), Some((1, 0)));
    }

    #[tokio::test]
    async fn watch_sees_commands_after_clone_out() {
        let devices = Arc::new(SyntheticProvider::new());
        let hub = OfficeHub::with_snapshot(
            HubConfig::default().without_auto_refresh(),
            devices.snapshot_at(0),
            devices.clone(),
            devices,
        )
        .unwrap();
        let mut rx = hub.watch();

        let held = Arc::clone(&rx.borrow_and_update());
        hub.commands().toggle_play().unwrap();

        assert!(rx.has_changed().unwrap());
        let latest = Arc::clone(&rx.borrow_and_update());
        assert_ne!(latest.music.play_state, held.music.play_state);
        assert_eq!(*latest, *hub.snapshot());
    }
}
