// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Generated device data for demos and tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::error::FetchError;
use crate::model::{
    Alert, Brightness, Gate, Light, LightState, MusicState, PlayState, Room, Snapshot, Track,
};

use super::{MusicSource, SnapshotProvider};

/// Deterministic stand-in for real devices.
///
/// Every fetch advances a tick counter and derives the whole snapshot from
/// it: the track rotates through the catalog, lights drift in and out of
/// reach with changing brightness, and alerts cycle (including ticks with
/// no alert). Gates are always reported closed without options; the hub
/// owns their state and fills in the configured latch options.
///
/// # Examples
///
/// ```
/// use officehub_lib::provider::{SnapshotProvider, SyntheticProvider};
///
/// # async fn example() {
/// let provider = SyntheticProvider::new();
/// let snapshot = provider.fetch().await.unwrap();
/// assert!(!snapshot.rooms.is_empty());
/// # }
/// ```
#[derive(Debug)]
pub struct SyntheticProvider {
    catalog: Vec<Track>,
    rooms: Vec<(String, Vec<String>)>,
    gates: Vec<String>,
    alerts: Vec<Option<Alert>>,
    tick: AtomicU64,
    online: AtomicBool,
    fail_every: Option<u64>,
}

impl SyntheticProvider {
    /// Creates a provider with the built-in office layout.
    #[must_use]
    pub fn new() -> Self {
        let catalog = vec![
            Track::new("Teardrop", "Massive Attack", "Mezzanine", "art/mezzanine.jpg"),
            Track::new("Glory Box", "Portishead", "Dummy", "art/dummy.jpg"),
            Track::new("Porcelain", "Moby", "Play", "art/play.jpg"),
            Track::new("Intro", "The xx", "xx", "art/xx.jpg"),
            Track::new("Midnight City", "M83", "Hurry Up, We're Dreaming", "art/hurry-up.jpg"),
        ];
        let rooms = [
            ("Studio", &["Desk lamp", "Ceiling"][..]),
            ("Kitchen", &["Pendant", "Counter"][..]),
            ("Meeting room", &["Spots", "Wall wash", "Screen backlight"][..]),
        ]
        .into_iter()
        .map(|(room, lights)| {
            (
                room.to_string(),
                lights.iter().map(ToString::to_string).collect(),
            )
        })
        .collect();
        let alerts = vec![
            None,
            Some(Alert::info(
                "Deliveries",
                "A parcel is waiting at reception",
            )),
            None,
            Some(
                Alert::warning("Printer", "Toner is running low")
                    .with_link("https://intranet.local/printer"),
            ),
            Some(Alert::error("Heating", "Boiler pressure is low")),
        ];

        Self {
            catalog,
            rooms,
            gates: vec!["Front".to_string(), "Car park".to_string()],
            alerts,
            tick: AtomicU64::new(0),
            online: AtomicBool::new(true),
            fail_every: None,
        }
    }

    /// Makes every `n`th fetch fail.
    #[must_use]
    pub fn with_failure_every(mut self, n: u64) -> Self {
        self.fail_every = (n > 0).then_some(n);
        self
    }

    /// Simulates the devices going offline or coming back.
    ///
    /// While offline, fetches and track changes fail.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Returns the track catalog.
    #[must_use]
    pub fn catalog(&self) -> &[Track] {
        &self.catalog
    }

    /// Builds the snapshot for `tick` without advancing the counter.
    #[must_use]
    pub fn snapshot_at(&self, tick: u64) -> Snapshot {
        let len = self.catalog.len() as u64;
        let track = self.catalog[usize::try_from(tick % len).unwrap_or(0)].clone();
        let play_state = if tick % 2 == 0 {
            PlayState::Playing
        } else {
            PlayState::Paused
        };

        let rooms = self
            .rooms
            .iter()
            .enumerate()
            .map(|(r, (name, lights))| {
                let lights = lights
                    .iter()
                    .enumerate()
                    .map(|(l, light)| {
                        let seed = tick
                            .wrapping_mul(31)
                            .wrapping_add(r as u64 * 7)
                            .wrapping_add(l as u64 * 13);
                        let brightness = u8::try_from(seed % 101).unwrap_or(100);
                        let state = LightState::new(
                            seed % 5 != 0,
                            seed % 2 == 0,
                            Brightness::clamped(brightness),
                        );
                        Light::new(format!("{}-{}", r + 1, l + 1), light.clone(), state)
                    })
                    .collect();
                Room::new(name.clone(), lights)
            })
            .collect();

        let gates = self
            .gates
            .iter()
            .map(|name| Gate::new(name.clone(), Vec::new()))
            .collect();

        let alert_len = self.alerts.len() as u64;
        let alert = self.alerts[usize::try_from(tick % alert_len).unwrap_or(0)].clone();

        Snapshot::new(MusicState::new(play_state, track), rooms, gates, alert)
    }

    fn ensure_online(&self) -> Result<(), FetchError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(FetchError::Unavailable("synthetic devices offline".into()))
        }
    }

    fn step(&self, current: &Track, forward: bool) -> Track {
        let len = self.catalog.len();
        let next = match self.catalog.iter().position(|t| t == current) {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None => 0,
        };
        self.catalog[next].clone()
    }
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotProvider for SyntheticProvider {
    async fn fetch(&self) -> Result<Snapshot, FetchError> {
        self.ensure_online()?;
        let tick = self.tick.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_every.is_some_and(|n| tick % n == 0) {
            return Err(FetchError::Unavailable(format!(
                "synthetic outage on tick {tick}"
            )));
        }
        Ok(self.snapshot_at(tick))
    }
}

impl MusicSource for SyntheticProvider {
    async fn next_track(&self, current: &Track) -> Result<Track, FetchError> {
        self.ensure_online()?;
        Ok(self.step(current, true))
    }

    async fn prev_track(&self, current: &Track) -> Result<Track, FetchError> {
        self.ensure_online()?;
        Ok(self.step(current, false))
    }
}
