// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Snapshot delta representation.
//!
//! A [`SnapshotDelta`] names the entity that changed and carries its new
//! value, so a presentation layer can re-render just that part.
//!
//! # Delta Types
//!
//! - [`SnapshotDelta::Music`] - Play state or current track changed
//! - [`SnapshotDelta::Light`] - A light reading changed
//! - [`SnapshotDelta::Gate`] - A gate opened, closed or was re-armed
//! - [`SnapshotDelta::Alert`] - The alert slot was replaced or cleared
//! - [`SnapshotDelta::Refreshed`] - A refresh replaced the device readings

use serde::Serialize;

use crate::model::{Alert, Gate, Light, MusicState};

/// Identifies which entity of the snapshot changed.
///
/// # Examples
///
/// ```
/// use officehub_lib::model::{Gate, LatchOption};
/// use officehub_lib::state::SnapshotDelta;
///
/// let delta = SnapshotDelta::Gate(Gate::new("Front", LatchOption::defaults()));
/// assert!(delta.is_gate());
/// assert_eq!(delta.gate_name(), Some("Front"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SnapshotDelta {
    /// Music state changed.
    Music(MusicState),

    /// A light changed.
    Light {
        /// Name of the containing room.
        room: String,
        /// The light after the change.
        light: Light,
    },

    /// A gate changed.
    Gate(Gate),

    /// The alert slot changed.
    Alert {
        /// The new alert, or `None` if the slot was cleared.
        alert: Option<Alert>,
    },

    /// A refresh replaced music, rooms and alert, and reconciled gates.
    Refreshed,
}

impl SnapshotDelta {
    /// Creates a light delta.
    #[must_use]
    pub fn light(room: impl Into<String>, light: Light) -> Self {
        Self::Light {
            room: room.into(),
            light,
        }
    }

    /// Creates an alert delta.
    #[must_use]
    pub fn alert(alert: Option<Alert>) -> Self {
        Self::Alert { alert }
    }

    /// Returns `true` if this is a music change.
    #[must_use]
    pub fn is_music(&self) -> bool {
        matches!(self, Self::Music(_))
    }

    /// Returns `true` if this is a light change.
    #[must_use]
    pub fn is_light(&self) -> bool {
        matches!(self, Self::Light { .. })
    }

    /// Returns `true` if this is a gate change.
    #[must_use]
    pub fn is_gate(&self) -> bool {
        matches!(self, Self::Gate(_))
    }

    /// Returns `true` if this is an alert change.
    #[must_use]
    pub fn is_alert(&self) -> bool {
        matches!(self, Self::Alert { .. })
    }

    /// Returns the gate name for gate changes.
    #[must_use]
    pub fn gate_name(&self) -> Option<&str> {
        match self {
            Self::Gate(gate) => Some(gate.name()),
            _ => None,
        }
    }
}

/// What produced a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeCause {
    /// A caller-issued command.
    Command,
    /// A successful refresh tick.
    Refresh,
    /// A failed refresh tick (the error alert it raised).
    RefreshFailure,
    /// A gate latch ran out.
    LatchExpired,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LightState, Severity};

    #[test]
    fn kind_predicates() {
        let light = SnapshotDelta::light("Studio", Light::new("l1", "Desk", LightState::default()));
        assert!(light.is_light());
        assert!(!light.is_gate());
        assert_eq!(light.gate_name(), None);

        let cleared = SnapshotDelta::alert(None);
        assert!(cleared.is_alert());
        assert!(!SnapshotDelta::Refreshed.is_music());
    }

    #[test]
    fn serializes_with_kind_tag() {
        let delta = SnapshotDelta::alert(Some(Alert::error("Refresh failed", "offline")));
        let json = serde_json::to_value(&delta).unwrap();

        assert_eq!(json["kind"], "alert");
        assert_eq!(json["alert"]["severity"], Severity::Error.as_str());
    }
}
