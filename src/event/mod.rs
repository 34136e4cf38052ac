// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for snapshot changes.
//!
//! The [`EventBus`] uses tokio's broadcast channel so any number of
//! presentation layers can follow the hub's changes.
//!
//! # Examples
//!
//! ```
//! use officehub_lib::event::{EventBus, HubEvent};
//! use officehub_lib::state::{ChangeCause, SnapshotDelta};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(HubEvent::changed(SnapshotDelta::Refreshed, ChangeCause::Refresh));
//! ```

mod event_bus;
mod hub_event;

pub(crate) use event_bus::DEFAULT_CHANNEL_CAPACITY;
pub use event_bus::EventBus;
pub use hub_event::HubEvent;
