// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Single-slot alert channel.
//!
//! The snapshot holds at most one alert. Every refresh overwrites the slot
//! with whatever it carries, `None` included, regardless of severity or
//! acknowledgement. A failed refresh writes one error alert into the slot,
//! replacing the previous one. There is no queue and no deduplication.

use crate::error::FetchError;
use crate::model::Alert;

/// Title of the alert raised when a refresh fails.
pub const REFRESH_FAILED_TITLE: &str = "Device refresh failed";

/// Single-slot view over a snapshot's alert.
///
/// # Examples
///
/// ```
/// use officehub_lib::alert::AlertChannel;
/// use officehub_lib::model::Alert;
///
/// let mut slot = Some(Alert::info("Welcome", "Good morning"));
/// let mut channel = AlertChannel::new(&mut slot);
///
/// // A refresh without an alert clears the slot
/// channel.replace(None);
/// assert!(channel.current().is_none());
/// ```
#[derive(Debug)]
pub struct AlertChannel<'a> {
    slot: &'a mut Option<Alert>,
}

impl<'a> AlertChannel<'a> {
    /// Wraps an alert slot.
    pub fn new(slot: &'a mut Option<Alert>) -> Self {
        Self { slot }
    }

    /// Returns the live alert.
    #[must_use]
    pub fn current(&self) -> Option<&Alert> {
        self.slot.as_ref()
    }

    /// Overwrites the slot with a refresh's alert.
    ///
    /// Returns `true` if the slot content differs from before. An identical
    /// alert still republishes; the return value only reports the change.
    pub fn replace(&mut self, alert: Option<Alert>) -> bool {
        let changed = *self.slot != alert;
        *self.slot = alert;
        changed
    }

    /// Writes the error alert for a failed refresh and returns it.
    pub fn raise_fetch_failure(&mut self, error: &FetchError) -> Alert {
        let alert = fetch_failure_alert(error);
        *self.slot = Some(alert.clone());
        alert
    }

    /// Clears the slot. Returns `true` if an alert was live.
    pub fn acknowledge(&mut self) -> bool {
        self.slot.take().is_some()
    }
}

/// Builds the error alert describing a failed refresh.
#[must_use]
pub fn fetch_failure_alert(error: &FetchError) -> Alert {
    Alert::error(REFRESH_FAILED_TITLE, error.to_string())
}
