// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The complete published device state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Alert, Gate, Light, MusicState, Room};

/// Complete device state at an instant; the unit of atomic publication.
///
/// # Examples
///
/// ```
/// use officehub_lib::model::{Gate, LatchOption, MusicState, PlayState, Snapshot, Track};
///
/// let snapshot = Snapshot::new(
///     MusicState::new(PlayState::Paused, Track::new("Intro", "The xx", "xx", "art/xx.jpg")),
///     Vec::new(),
///     vec![Gate::new("Front", LatchOption::defaults())],
///     None,
/// );
///
/// assert!(snapshot.gate("Front").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Music player state.
    pub music: MusicState,
    /// Rooms in display order.
    pub rooms: Vec<Room>,
    /// Gates in display order.
    #[serde(default)]
    pub gates: Vec<Gate>,
    /// The live alert, if any.
    #[serde(default)]
    pub alert: Option<Alert>,
}

impl Snapshot {
    /// Creates a snapshot.
    #[must_use]
    pub fn new(music: MusicState, rooms: Vec<Room>, gates: Vec<Gate>, alert: Option<Alert>) -> Self {
        Self {
            music,
            rooms,
            gates,
            alert,
        }
    }

    /// Looks up a room by name.
    #[must_use]
    pub fn room(&self, name: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.name == name)
    }

    /// Looks up a room by name for mutation.
    pub fn room_mut(&mut self, name: &str) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|r| r.name == name)
    }

    /// Looks up a light by room name and light id.
    #[must_use]
    pub fn light(&self, room: &str, light: &str) -> Option<&Light> {
        self.room(room).and_then(|r| r.light(light))
    }

    /// Looks up a gate by name.
    #[must_use]
    pub fn gate(&self, name: &str) -> Option<&Gate> {
        self.gates.iter().find(|g| g.name() == name)
    }

    /// Looks up a gate by name for mutation.
    pub fn gate_mut(&mut self, name: &str) -> Option<&mut Gate> {
        self.gates.iter_mut().find(|g| g.name() == name)
    }

    /// Merges fresh device readings from a refresh.
    ///
    /// Music and rooms are replaced wholesale. Gates are matched by name:
    /// a known gate keeps its open/armed state and takes the incoming latch
    /// options, a new gate is adopted as reported but without an armed
    /// latch. The alert slot is not touched here.
    ///
    /// Returns the names of gates that disappeared from the snapshot.
    pub fn merge_readings(&mut self, incoming: Snapshot) -> Vec<String> {
        self.music = incoming.music;
        self.rooms = incoming.rooms;

        let mut known: HashMap<String, Gate> = self
            .gates
            .drain(..)
            .map(|g| (g.name().to_string(), g))
            .collect();

        self.gates = incoming
            .gates
            .into_iter()
            .map(Gate::normalized)
            .map(|reported| match known.remove(reported.name()) {
                Some(mut gate) => {
                    gate.set_available_latch_options(reported.available_latch_options().to_vec());
                    gate
                }
                None => reported.without_latch(),
            })
            .collect();

        known.into_keys().collect()
    }
}
