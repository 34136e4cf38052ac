// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `OfficeHub` Lib - the state core of a smart-office dashboard.
//!
//! This library keeps one published snapshot of the office devices and
//! serializes everything that changes it: periodic refreshes from a device
//! source, user commands, and timed gate latches.
//!
//! # Supported Features
//!
//! - **Music**: play/pause, next/previous track via a pluggable music source
//! - **Lights**: per-room lights with reachability and brightness readings
//! - **Gates**: open/close with optional auto-close latches
//! - **Alerts**: a single alert slot refreshed with every reading
//! - **Change notification**: watch the snapshot or subscribe to deltas
//!
//! # Quick Start
//!
//! ## Synthetic Devices
//!
//! ```no_run
//! use std::sync::Arc;
//! use officehub_lib::{HubConfig, OfficeHub, SyntheticProvider};
//!
//! #[tokio::main]
//! async fn main() -> officehub_lib::Result<()> {
//!     let devices = Arc::new(SyntheticProvider::new());
//!     let hub = OfficeHub::connect(HubConfig::default(), devices.clone(), devices).await?;
//!
//!     hub.commands().toggle_play()?;
//!     hub.commands().toggle_light("Studio", "1-1")?;
//!
//!     println!("{:?}", hub.snapshot());
//!     Ok(())
//! }
//! ```
//!
//! ## HTTP Gateway
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use officehub_lib::{HttpProviderBuilder, HubConfig, OfficeHub};
//!
//! #[tokio::main]
//! async fn main() -> officehub_lib::Result<()> {
//!     let gateway = Arc::new(
//!         HttpProviderBuilder::new()
//!             .host("192.168.1.20:8080")
//!             .timeout(Duration::from_secs(3))
//!             .build()?,
//!     );
//!
//!     let config = HubConfig::default().with_refresh_interval(Duration::from_secs(10));
//!     let hub = OfficeHub::connect(config, gateway.clone(), gateway).await?;
//!
//!     if let Some(alert) = &hub.snapshot().alert {
//!         println!("{}: {}", alert.severity, alert.title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod alert;
pub mod error;
pub mod event;
pub mod hub;
pub mod latch;
pub mod model;
pub mod provider;
pub mod refresh;
pub mod state;

pub use error::{CommandRejected, Error, FetchError, RejectReason, Result, ValueError};
pub use event::{EventBus, HubEvent};
pub use hub::{CommandDispatcher, CommandResult, HubConfig, OfficeHub, SnapshotStore};
pub use latch::{ExpiryOutcome, TimerId};
pub use model::{
    Alert, Brightness, Gate, LatchOption, Light, LightState, MusicState, PlayState, Room,
    Severity, Snapshot, Track,
};
#[cfg(feature = "http")]
pub use provider::{HttpProvider, HttpProviderBuilder};
pub use provider::{MusicSource, SnapshotProvider, SyntheticProvider};
pub use refresh::{RefreshHandle, RefreshOutcome, RefreshScheduler};
pub use state::{ChangeCause, SnapshotDelta};
