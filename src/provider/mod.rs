// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! External collaborators the hub reads from.
//!
//! The hub only depends on two traits:
//!
//! - [`SnapshotProvider`]: produces a complete [`Snapshot`] per refresh tick
//! - [`MusicSource`]: picks the next or previous track
//!
//! Two implementations ship with the crate:
//!
//! - [`SyntheticProvider`]: deterministic generated data for demos and tests
//! - [`HttpProvider`]: polls a device gateway over HTTP (feature `http`)

#[cfg(feature = "http")]
mod http;
mod synthetic;

use std::future::Future;

#[cfg(feature = "http")]
pub use http::{HttpProvider, HttpProviderBuilder};
pub use synthetic::SyntheticProvider;

use crate::error::FetchError;
use crate::model::{Snapshot, Track};

/// Source of fresh snapshots, called once per refresh tick.
///
/// The gate open/closed state in the returned snapshot is only used for
/// gates the hub has not seen before; see
/// [`Snapshot::merge_readings`](crate::model::Snapshot::merge_readings).
pub trait SnapshotProvider {
    /// Fetches the current device readings.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the readings cannot be obtained.
    fn fetch(&self) -> impl Future<Output = Result<Snapshot, FetchError>> + Send;
}

/// Source of track changes for the music player.
pub trait MusicSource {
    /// Returns the track after `current`.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the music source cannot be reached.
    fn next_track(&self, current: &Track) -> impl Future<Output = Result<Track, FetchError>> + Send;

    /// Returns the track before `current`.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the music source cannot be reached.
    fn prev_track(&self, current: &Track) -> impl Future<Output = Result<Track, FetchError>> + Send;
}
