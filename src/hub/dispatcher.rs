// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! User commands against the shared snapshot.
//!
//! Every command validates its preconditions and applies its change inside
//! one store transaction. A failed precondition leaves the snapshot
//! untouched and is reported as a [`CommandRejected`].

use std::sync::Arc;

use crate::alert::AlertChannel;
use crate::error::{CommandRejected, RejectReason};
use crate::model::{LatchOption, PlayState};
use crate::provider::MusicSource;
use crate::state::{ChangeCause, SnapshotDelta};

use super::SnapshotStore;
use super::store::Transaction;

/// Result of a command: the changed entity, or why nothing changed.
pub type CommandResult = Result<SnapshotDelta, CommandRejected>;

#[derive(Debug, Clone, Copy)]
enum TrackStep {
    Next,
    Prev,
}

fn rejected(command: &'static str, reason: RejectReason) -> CommandRejected {
    tracing::warn!(command, %reason, "Command rejected");
    CommandRejected::new(reason)
}

/// Applies user intents to a [`SnapshotStore`].
///
/// Obtained from [`OfficeHub::commands`](super::OfficeHub::commands).
/// Clones share the same store.
pub struct CommandDispatcher<M> {
    store: SnapshotStore,
    music: Arc<M>,
}

impl<M> Clone for CommandDispatcher<M> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            music: Arc::clone(&self.music),
        }
    }
}

impl<M> std::fmt::Debug for CommandDispatcher<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl<M> CommandDispatcher<M>
where
    M: MusicSource + Send + Sync + 'static,
{
    /// Creates a dispatcher over `store` using `music` for track changes.
    #[must_use]
    pub fn new(store: SnapshotStore, music: Arc<M>) -> Self {
        Self { store, music }
    }

    // ========== Music ==========

    /// Flips the play state. Always succeeds.
    ///
    /// # Errors
    ///
    /// Never returns an error; the `Result` keeps the command surface
    /// uniform.
    pub fn toggle_play(&self) -> CommandResult {
        self.flip_play(None)
    }

    /// Flips the play state only if it is still `observed`.
    ///
    /// Retrying this after a lost response cannot flip twice.
    ///
    /// # Errors
    ///
    /// Returns [`RejectReason::StaleObservation`] if the play state is no
    /// longer `observed`.
    pub fn toggle_play_if(&self, observed: PlayState) -> CommandResult {
        self.flip_play(Some(observed))
    }

    fn flip_play(&self, observed: Option<PlayState>) -> CommandResult {
        let mut tx = self.store.begin();
        let music = &mut tx.snapshot_mut().music;
        if observed.is_some_and(|o| o != music.play_state) {
            return Err(rejected("toggle_play", RejectReason::StaleObservation));
        }

        music.play_state = music.play_state.toggled();
        let delta = SnapshotDelta::Music(music.clone());

        tx.record(delta.clone(), ChangeCause::Command);
        tx.commit();
        Ok(delta)
    }

    /// Skips to the next track.
    ///
    /// The music source is queried without holding the store lock, so other
    /// commands and refresh ticks proceed meanwhile. The play state is not
    /// changed.
    ///
    /// # Errors
    ///
    /// Returns [`RejectReason::SourceUnavailable`] if the music source
    /// fails.
    pub async fn next_track(&self) -> CommandResult {
        self.change_track(TrackStep::Next).await
    }

    /// Goes back to the previous track.
    ///
    /// # Errors
    ///
    /// Returns [`RejectReason::SourceUnavailable`] if the music source
    /// fails.
    pub async fn prev_track(&self) -> CommandResult {
        self.change_track(TrackStep::Prev).await
    }

    async fn change_track(&self, step: TrackStep) -> CommandResult {
        let current = self.store.read(|s| s.music.current_track.clone());

        let result = match step {
            TrackStep::Next => self.music.next_track(&current).await,
            TrackStep::Prev => self.music.prev_track(&current).await,
        };
        let track = result.map_err(|error| {
            tracing::debug!(%error, ?step, "Music source failed");
            rejected("change_track", RejectReason::SourceUnavailable)
        })?;

        let mut tx = self.store.begin();
        let music = &mut tx.snapshot_mut().music;
        music.current_track = track;
        let delta = SnapshotDelta::Music(music.clone());

        tx.record(delta.clone(), ChangeCause::Command);
        tx.commit();
        Ok(delta)
    }

    // ========== Lights ==========

    /// Flips a light on or off.
    ///
    /// # Errors
    ///
    /// Returns [`RejectReason::Unreachable`] if the light is unreachable,
    /// or `UnknownRoom`/`UnknownLight` if it does not exist.
    pub fn toggle_light(&self, room: &str, light: &str) -> CommandResult {
        self.flip_light(room, light, None)
    }

    /// Flips a light only if its `on` flag is still `observed_on`.
    ///
    /// # Errors
    ///
    /// As [`toggle_light`](Self::toggle_light), plus
    /// [`RejectReason::StaleObservation`] if the light changed.
    pub fn toggle_light_if(&self, room: &str, light: &str, observed_on: bool) -> CommandResult {
        self.flip_light(room, light, Some(observed_on))
    }

    fn flip_light(&self, room: &str, light: &str, observed_on: Option<bool>) -> CommandResult {
        let mut tx = self.store.begin();
        let Some(room_entry) = tx.snapshot_mut().room_mut(room) else {
            return Err(rejected("toggle_light", RejectReason::UnknownRoom));
        };
        let Some(target) = room_entry.light_mut(light) else {
            return Err(rejected("toggle_light", RejectReason::UnknownLight));
        };
        if !target.state.reachable {
            return Err(rejected("toggle_light", RejectReason::Unreachable));
        }
        if observed_on.is_some_and(|o| o != target.state.on) {
            return Err(rejected("toggle_light", RejectReason::StaleObservation));
        }

        target.state.on = !target.state.on;
        let delta = SnapshotDelta::light(room, target.clone());

        tx.record(delta.clone(), ChangeCause::Command);
        tx.commit();
        Ok(delta)
    }

    // ========== Gates ==========

    /// Opens a gate.
    ///
    /// With a latch the gate closes itself once the latch duration has
    /// elapsed; any earlier countdown is replaced. Without a latch any
    /// running countdown is cancelled and the gate stays open.
    ///
    /// # Errors
    ///
    /// Returns `UnknownGate` if the gate does not exist, or
    /// `UnknownLatchOption` if the gate does not offer `latch`.
    pub fn open_gate(&self, gate: &str, latch: Option<LatchOption>) -> CommandResult {
        let tx = self.store.begin();
        let Some(target) = tx.snapshot().gate(gate) else {
            return Err(rejected("open_gate", RejectReason::UnknownGate));
        };
        if latch.as_ref().is_some_and(|option| !target.offers(option)) {
            return Err(rejected("open_gate", RejectReason::UnknownLatchOption));
        }

        Self::apply_open(tx, gate, latch)
    }

    /// Closes a gate and cancels its latch countdown.
    ///
    /// Closing a closed gate succeeds and publishes nothing.
    ///
    /// # Errors
    ///
    /// Returns `UnknownGate` if the gate does not exist.
    pub fn close_gate(&self, gate: &str) -> CommandResult {
        let mut tx = self.store.begin();
        let Some(target) = tx.snapshot_mut().gate_mut(gate) else {
            return Err(rejected("close_gate", RejectReason::UnknownGate));
        };

        let was_open = target.close();
        let delta = SnapshotDelta::Gate(target.clone());
        tx.cancel_latch(gate);

        if was_open {
            tx.record(delta.clone(), ChangeCause::Command);
        }
        tx.commit();
        Ok(delta)
    }

    /// Re-arms the latch of an open gate with a new duration.
    ///
    /// The countdown restarts from the full new duration.
    ///
    /// # Errors
    ///
    /// Returns [`RejectReason::GateNotOpen`] if the gate is closed,
    /// `UnknownGate` or `UnknownLatchOption` otherwise.
    pub fn select_latch_option(&self, gate: &str, option: LatchOption) -> CommandResult {
        let tx = self.store.begin();
        let Some(target) = tx.snapshot().gate(gate) else {
            return Err(rejected("select_latch_option", RejectReason::UnknownGate));
        };
        if !target.is_open() {
            return Err(rejected("select_latch_option", RejectReason::GateNotOpen));
        }
        if !target.offers(&option) {
            return Err(rejected(
                "select_latch_option",
                RejectReason::UnknownLatchOption,
            ));
        }

        Self::apply_open(tx, gate, Some(option))
    }

    /// Opens an existing gate once its preconditions have been checked.
    ///
    /// The countdown is (re)armed or cancelled before the gate itself
    /// changes, so the working snapshot never shows a latch without a
    /// matching timer.
    fn apply_open(
        mut tx: Transaction<'_>,
        gate: &str,
        latch: Option<LatchOption>,
    ) -> CommandResult {
        match &latch {
            Some(option) => {
                tx.arm_latch(gate, option.duration());
            }
            None => {
                tx.cancel_latch(gate);
            }
        }

        let Some(target) = tx.snapshot_mut().gate_mut(gate) else {
            return Err(rejected("open_gate", RejectReason::UnknownGate));
        };
        target.open(latch);
        let delta = SnapshotDelta::Gate(target.clone());

        tx.record(delta.clone(), ChangeCause::Command);
        tx.commit();
        Ok(delta)
    }

    // ========== Alert ==========

    /// Dismisses the current alert.
    ///
    /// The next refresh fills the slot again as usual.
    ///
    /// # Errors
    ///
    /// Never returns an error.
    pub fn acknowledge_alert(&self) -> CommandResult {
        let mut tx = self.store.begin();
        let cleared = AlertChannel::new(&mut tx.snapshot_mut().alert).acknowledge();
        let delta = SnapshotDelta::alert(None);

        if cleared {
            tx.record(delta.clone(), ChangeCause::Command);
        }
        tx.commit();
        Ok(delta)
    }
}
