// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hub configuration.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, ValueError};
use crate::event::DEFAULT_CHANNEL_CAPACITY;
use crate::model::{LatchOption, Snapshot};

/// Default refresh interval (5 seconds).
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(5000);

/// Configuration for an [`OfficeHub`](super::OfficeHub).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use officehub_lib::hub::HubConfig;
/// use officehub_lib::model::LatchOption;
///
/// // Defaults: refresh every 5 s, latches of 10 mins / 20 mins / 1 hour
/// let config = HubConfig::default();
/// assert_eq!(config.refresh_interval, Duration::from_secs(5));
///
/// // Custom settings
/// let config = HubConfig::new()
///     .with_refresh_interval(Duration::from_secs(2))
///     .with_gate_latch_options("Car park", vec![LatchOption::from_minutes("2 hours", 120).unwrap()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    /// Time between refresh ticks.
    pub refresh_interval: Duration,
    /// Whether [`OfficeHub::connect`](super::OfficeHub::connect) starts the
    /// refresh scheduler.
    pub auto_refresh: bool,
    /// Latch options given to gates that report none.
    pub latch_options: Vec<LatchOption>,
    /// Latch options for specific gates, overriding what the gate reports.
    pub gate_latch_options: HashMap<String, Vec<LatchOption>>,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
}

impl HubConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a JSON configuration.
    ///
    /// Missing fields take their default values.
    ///
    /// ```
    /// use std::time::Duration;
    /// use officehub_lib::hub::HubConfig;
    ///
    /// let config = HubConfig::from_json(r#"{"refreshIntervalMs": 1000, "autoRefresh": false}"#).unwrap();
    /// assert_eq!(config.refresh_interval, Duration::from_secs(1));
    /// assert!(!config.auto_refresh);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) for malformed JSON and
    /// [`Error::Value`](crate::Error::Value) for values that fail validation.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawHubConfig = serde_json::from_str(json)?;
        let config = Self {
            refresh_interval: Duration::from_millis(raw.refresh_interval_ms),
            auto_refresh: raw.auto_refresh,
            latch_options: raw.latch_options,
            gate_latch_options: raw.gate_latch_options,
            event_capacity: raw.event_capacity,
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the refresh interval.
    #[must_use]
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Disables starting the refresh scheduler on connect.
    #[must_use]
    pub fn without_auto_refresh(mut self) -> Self {
        self.auto_refresh = false;
        self
    }

    /// Sets the fallback latch options.
    #[must_use]
    pub fn with_latch_options(mut self, options: Vec<LatchOption>) -> Self {
        self.latch_options = options;
        self
    }

    /// Sets the latch options of one gate.
    #[must_use]
    pub fn with_gate_latch_options(
        mut self,
        gate: impl Into<String>,
        options: Vec<LatchOption>,
    ) -> Self {
        self.gate_latch_options.insert(gate.into(), options);
        self
    }

    /// Sets the event channel capacity.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Checks the configuration for values the hub cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `ValueError` for a zero refresh interval, a zero event
    /// capacity or a zero-length latch option.
    pub fn validate(&self) -> std::result::Result<(), ValueError> {
        if self.refresh_interval.is_zero() {
            return Err(ValueError::ZeroDuration("refresh interval"));
        }
        if self.event_capacity == 0 {
            return Err(ValueError::ZeroCapacity("event capacity"));
        }
        let all_options = self
            .latch_options
            .iter()
            .chain(self.gate_latch_options.values().flatten());
        for option in all_options {
            if option.duration().is_zero() {
                return Err(ValueError::ZeroDuration("latch duration"));
            }
        }
        Ok(())
    }

    /// Fills in the configured latch options on every gate of `snapshot`.
    pub(crate) fn apply_latch_options(&self, snapshot: &mut Snapshot) {
        for gate in &mut snapshot.gates {
            if let Some(options) = self.gate_latch_options.get(gate.name()) {
                gate.set_available_latch_options(options.clone());
            } else if gate.available_latch_options().is_empty() {
                gate.set_available_latch_options(self.latch_options.clone());
            }
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            auto_refresh: true,
            latch_options: LatchOption::defaults(),
            gate_latch_options: HashMap::new(),
            event_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Wire form of [`HubConfig`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawHubConfig {
    refresh_interval_ms: u64,
    auto_refresh: bool,
    latch_options: Vec<LatchOption>,
    gate_latch_options: HashMap<String, Vec<LatchOption>>,
    event_capacity: usize,
}

impl Default for RawHubConfig {
    fn default() -> Self {
        let config = HubConfig::default();
        Self {
            refresh_interval_ms: u64::try_from(config.refresh_interval.as_millis())
                .unwrap_or(u64::MAX),
            auto_refresh: config.auto_refresh,
            latch_options: config.latch_options,
            gate_latch_options: config.gate_latch_options,
            event_capacity: config.event_capacity,
        }
    }
}
