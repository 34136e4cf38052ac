// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Office hub coordinating the dashboard state.
//!
//! # Overview
//!
//! The [`OfficeHub`] is the central component for a dashboard. It provides:
//!
//! - **A single published snapshot**: music, rooms, gates and alert, read via
//!   [`OfficeHub::snapshot`] or followed via [`OfficeHub::watch`]
//! - **Periodic refresh**: readings are pulled from a
//!   [`SnapshotProvider`](crate::provider::SnapshotProvider) on a fixed interval
//! - **Commands**: one operation per user intent on the [`CommandDispatcher`]
//! - **Gate latches**: gates opened with a latch close themselves on expiry
//! - **Event system**: subscribe to [`HubEvent`](crate::event::HubEvent)s via
//!   broadcast channels
//!
//! Refresh ticks, latch expiries and commands are serialized through one
//! [`SnapshotStore`]; none of them holds the store across an `.await`.
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use officehub_lib::hub::{HubConfig, OfficeHub};
//! use officehub_lib::model::LatchOption;
//! use officehub_lib::provider::SyntheticProvider;
//!
//! #[tokio::main]
//! async fn main() -> officehub_lib::Result<()> {
//!     let devices = Arc::new(SyntheticProvider::new());
//!     let hub = OfficeHub::connect(HubConfig::default(), devices.clone(), devices).await?;
//!
//!     // Let a visitor in; the gate closes itself after 10 minutes
//!     let ten_minutes = LatchOption::from_minutes("10 mins", 10)?;
//!     hub.commands().open_gate("Front", Some(ten_minutes))?;
//!
//!     // Skip the current track
//!     hub.commands().next_track().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Event Subscription
//!
//! ```no_run
//! use std::sync::Arc;
//! use officehub_lib::event::HubEvent;
//! use officehub_lib::hub::{HubConfig, OfficeHub};
//! use officehub_lib::provider::SyntheticProvider;
//!
//! # async fn example() -> officehub_lib::Result<()> {
//! let devices = Arc::new(SyntheticProvider::new());
//! let hub = OfficeHub::connect(HubConfig::default(), devices.clone(), devices).await?;
//! let mut events = hub.subscribe();
//!
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         match event {
//!             HubEvent::Changed { delta, cause } => println!("{cause:?}: {delta:?}"),
//!             HubEvent::RefreshFailed { error } => eprintln!("refresh failed: {error}"),
//!         }
//!     }
//! });
//! # Ok(())
//! # }
//! ```

mod dispatcher;
mod hub_config;
mod office_hub;
mod store;

pub use dispatcher::{CommandDispatcher, CommandResult};
pub use hub_config::{DEFAULT_REFRESH_INTERVAL, HubConfig};
pub use office_hub::OfficeHub;
pub use store::SnapshotStore;
