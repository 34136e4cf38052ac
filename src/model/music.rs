// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Music player state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A track as reported by the music source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Track title.
    pub title: String,
    /// Performing artist.
    pub artist: String,
    /// Album the track belongs to.
    pub album: String,
    /// Reference to the album artwork (URL or asset key).
    pub album_art_ref: String,
}

impl Track {
    /// Creates a track.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
        album_art_ref: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
            album_art_ref: album_art_ref.into(),
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}

/// Whether the player is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayState {
    /// Playback is running.
    Playing,
    /// Playback is paused.
    #[default]
    Paused,
}

impl PlayState {
    /// Returns the opposite state.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Playing => Self::Paused,
            Self::Paused => Self::Playing,
        }
    }

    /// Returns `true` if playing.
    #[must_use]
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }
}

/// Player state: play/pause plus the current track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicState {
    /// Play/pause state.
    pub play_state: PlayState,
    /// Track currently loaded.
    pub current_track: Track,
}

impl MusicState {
    /// Creates a music state.
    #[must_use]
    pub fn new(play_state: PlayState, current_track: Track) -> Self {
        Self {
            play_state,
            current_track,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_state_toggles() {
        assert_eq!(PlayState::Playing.toggled(), PlayState::Paused);
        assert_eq!(PlayState::Paused.toggled(), PlayState::Playing);
        assert!(PlayState::Playing.is_playing());
    }

    #[test]
    fn music_state_json_uses_camel_case() {
        let music = MusicState::new(
            PlayState::Playing,
            Track::new("Teardrop", "Massive Attack", "Mezzanine", "art/mezzanine.jpg"),
        );
        let json = serde_json::to_value(&music).unwrap();

        assert_eq!(json["playState"], "playing");
        assert_eq!(json["currentTrack"]["albumArtRef"], "art/mezzanine.jpg");
    }
}
