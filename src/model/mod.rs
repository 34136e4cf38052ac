// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device snapshot model.
//!
//! Typed representation of everything the dashboard shows: the music
//! player, rooms with their lights, access gates with latch options, and the
//! single alert slot. Constrained values are validated at construction time.
//!
//! # Types
//!
//! - [`Track`], [`PlayState`], [`MusicState`] - Music player
//! - [`Brightness`], [`LightState`], [`Light`], [`Room`] - Lighting
//! - [`LatchOption`], [`Gate`] - Access gates
//! - [`Severity`], [`Alert`] - System alert
//! - [`Snapshot`] - Everything above, published atomically

mod alert;
mod gate;
mod light;
mod music;
mod snapshot;

pub use alert::{Alert, Severity};
pub use gate::{Gate, LatchOption};
pub use light::{Brightness, Light, LightState, Room};
pub use music::{MusicState, PlayState, Track};
pub use snapshot::Snapshot;
