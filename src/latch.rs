// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-gate auto-close timers.
//!
//! Each gate has at most one timer slot. Arming a gate that already has a
//! countdown aborts the old task before spawning the new one, so two
//! countdowns are never live for the same gate.
//!
//! Cancellation and expiry are reconciled through [`TimerId`]s: the slot
//! table lives under the same lock as the snapshot, and an expiring task
//! only closes its gate if its id still occupies the slot. A task that was
//! cancelled after it woke up finds a different id (or none) and does
//! nothing; see [`ExpiryOutcome::TimerRaceNoop`].

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Identifier of one armed countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

impl TimerId {
    /// Returns the raw id value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Latch({})", self.0)
    }
}

/// Result of a countdown reaching zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryOutcome {
    /// The gate was open and has been closed by the latch.
    Closed,
    /// The timer lost a race with a cancel, re-arm or close and did nothing.
    TimerRaceNoop,
}

struct LatchSlot {
    id: TimerId,
    handle: JoinHandle<()>,
}

/// Timer slots, keyed by gate name.
///
/// Countdowns are spawned on the runtime captured at construction, so
/// arming works from any thread.
pub(crate) struct LatchTimers {
    runtime: Handle,
    slots: HashMap<String, LatchSlot>,
    next_id: u64,
}

impl LatchTimers {
    pub(crate) fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            slots: HashMap::new(),
            next_id: 0,
        }
    }

    /// Starts a countdown for `gate`, replacing any existing one.
    ///
    /// `on_expire` runs once when the delay elapses, unless the countdown is
    /// cancelled first.
    pub(crate) fn arm<F>(&mut self, gate: &str, delay: Duration, on_expire: F) -> TimerId
    where
        F: FnOnce(TimerId) + Send + 'static,
    {
        self.cancel(gate);

        self.next_id += 1;
        let id = TimerId(self.next_id);
        let handle = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            on_expire(id);
        });

        tracing::debug!(gate, %id, delay_secs = delay.as_secs(), "Latch armed");
        self.slots.insert(gate.to_string(), LatchSlot { id, handle });
        id
    }

    /// Cancels the countdown for `gate`. Returns `true` if one was live.
    pub(crate) fn cancel(&mut self, gate: &str) -> bool {
        match self.slots.remove(gate) {
            Some(slot) => {
                slot.handle.abort();
                tracing::debug!(gate, id = %slot.id, "Latch cancelled");
                true
            }
            None => false,
        }
    }

    /// Frees the slot of an expiring countdown.
    ///
    /// Returns `false` if `id` no longer owns the slot for `gate`.
    pub(crate) fn release(&mut self, gate: &str, id: TimerId) -> bool {
        if self.armed_id(gate) == Some(id) {
            self.slots.remove(gate);
            true
        } else {
            false
        }
    }

    /// Returns the id of the live countdown for `gate`.
    pub(crate) fn armed_id(&self, gate: &str) -> Option<TimerId> {
        self.slots.get(gate).map(|slot| slot.id)
    }

    /// Returns the number of live countdowns.
    pub(crate) fn live_count(&self) -> usize {
        self.slots.len()
    }
}

impl Drop for LatchTimers {
    fn drop(&mut self) {
        for slot in self.slots.values() {
            slot.handle.abort();
        }
    }
}

impl fmt::Debug for LatchTimers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let armed: HashMap<&str, TimerId> = self
            .slots
            .iter()
            .map(|(gate, slot)| (gate.as_str(), slot.id))
            .collect();
        f.debug_struct("LatchTimers").field("armed", &armed).finish()
    }
}
