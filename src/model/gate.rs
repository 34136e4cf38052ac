// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Access gates and their auto-close latch options.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// A selectable auto-close duration for a gate.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use officehub_lib::model::LatchOption;
///
/// let option = LatchOption::from_minutes("10 mins", 10).unwrap();
/// assert_eq!(option.duration(), Duration::from_secs(600));
///
/// // Zero-length latches are rejected
/// assert!(LatchOption::new("now", 0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatchOption {
    label: String,
    duration_secs: u64,
}

impl LatchOption {
    /// Creates a latch option lasting `seconds`.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::ZeroDuration` if `seconds` is zero.
    pub fn new(label: impl Into<String>, seconds: u64) -> Result<Self, ValueError> {
        if seconds == 0 {
            return Err(ValueError::ZeroDuration("latch duration"));
        }
        Ok(Self {
            label: label.into(),
            duration_secs: seconds,
        })
    }

    /// Creates a latch option lasting `minutes`.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::ZeroDuration` if `minutes` is zero.
    pub fn from_minutes(label: impl Into<String>, minutes: u64) -> Result<Self, ValueError> {
        Self::new(label, minutes.saturating_mul(60))
    }

    /// The standard dashboard choices: 10 minutes, 20 minutes and 1 hour.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        [("10 mins", 600), ("20 mins", 1200), ("1 hour", 3600)]
            .into_iter()
            .map(|(label, secs)| Self {
                label: label.to_string(),
                duration_secs: secs,
            })
            .collect()
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the auto-close delay.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    /// Returns `true` if the duration is usable (deserialized values skip `new`).
    pub(crate) const fn is_valid(&self) -> bool {
        self.duration_secs > 0
    }
}

impl fmt::Display for LatchOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}s)", self.label, self.duration_secs)
    }
}

/// An access gate.
///
/// `armed_latch` is only ever set while the gate is open. Opening a gate
/// without a latch leaves it open until it is closed explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gate {
    name: String,
    #[serde(default)]
    is_open: bool,
    #[serde(default)]
    armed_latch: Option<LatchOption>,
    #[serde(default)]
    available_latch_options: Vec<LatchOption>,
}

impl Gate {
    /// Creates a closed gate offering the given latch options.
    #[must_use]
    pub fn new(name: impl Into<String>, available_latch_options: Vec<LatchOption>) -> Self {
        Self {
            name: name.into(),
            is_open: false,
            armed_latch: None,
            available_latch_options,
        }
    }

    /// Returns the gate name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if the gate is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    /// Returns the latch counting down on this gate, if any.
    #[must_use]
    pub const fn armed_latch(&self) -> Option<&LatchOption> {
        self.armed_latch.as_ref()
    }

    /// Returns the latch options offered for this gate.
    #[must_use]
    pub fn available_latch_options(&self) -> &[LatchOption] {
        &self.available_latch_options
    }

    /// Returns `true` if `option` is one of this gate's choices.
    #[must_use]
    pub fn offers(&self, option: &LatchOption) -> bool {
        self.available_latch_options.contains(option)
    }

    /// Opens the gate, recording `latch` as armed (or none).
    pub(crate) fn open(&mut self, latch: Option<LatchOption>) {
        self.is_open = true;
        self.armed_latch = latch;
    }

    /// Closes the gate and drops any armed latch.
    ///
    /// Returns `true` if the gate was open.
    pub(crate) fn close(&mut self) -> bool {
        let was_open = self.is_open;
        self.is_open = false;
        self.armed_latch = None;
        was_open
    }

    pub(crate) fn set_available_latch_options(&mut self, options: Vec<LatchOption>) {
        self.available_latch_options = options;
    }

    /// Re-establishes the open/armed invariant on a gate read from outside.
    pub(crate) fn normalized(mut self) -> Self {
        if !self.is_open {
            self.armed_latch = None;
        }
        self.available_latch_options.retain(LatchOption::is_valid);
        self
    }

    /// Adopts an externally reported gate without a running latch.
    pub(crate) fn without_latch(mut self) -> Self {
        self.armed_latch = None;
        self
    }

    /// Builder-style helper that marks the gate open without a latch.
    #[must_use]
    pub fn opened(mut self) -> Self {
        self.is_open = true;
        self
    }
}
