// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hub event types.

use crate::state::{ChangeCause, SnapshotDelta};

/// Events emitted by the hub.
///
/// # Examples
///
/// ```
/// use officehub_lib::event::HubEvent;
/// use officehub_lib::state::{ChangeCause, SnapshotDelta};
///
/// let event = HubEvent::changed(SnapshotDelta::Refreshed, ChangeCause::Refresh);
/// assert_eq!(event.cause(), Some(ChangeCause::Refresh));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubEvent {
    /// Part of the published snapshot changed.
    Changed {
        /// What changed.
        delta: SnapshotDelta,
        /// What caused the change.
        cause: ChangeCause,
    },

    /// A refresh tick failed; the previous readings stay published.
    RefreshFailed {
        /// Description of the failure.
        error: String,
    },
}

impl HubEvent {
    /// Creates a change event.
    #[must_use]
    pub fn changed(delta: SnapshotDelta, cause: ChangeCause) -> Self {
        Self::Changed { delta, cause }
    }

    /// Creates a refresh failure event.
    #[must_use]
    pub fn refresh_failed(error: impl Into<String>) -> Self {
        Self::RefreshFailed {
            error: error.into(),
        }
    }

    /// Returns the delta for change events.
    #[must_use]
    pub fn delta(&self) -> Option<&SnapshotDelta> {
        match self {
            Self::Changed { delta, .. } => Some(delta),
            Self::RefreshFailed { .. } => None,
        }
    }

    /// Returns the cause for change events.
    #[must_use]
    pub fn cause(&self) -> Option<ChangeCause> {
        match self {
            Self::Changed { cause, .. } => Some(*cause),
            Self::RefreshFailed { .. } => None,
        }
    }

    /// Returns `true` if this is a refresh failure.
    #[must_use]
    pub fn is_refresh_failure(&self) -> bool {
        matches!(self, Self::RefreshFailed { .. })
    }
}
