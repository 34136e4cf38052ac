// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Change notification types.
//!
//! Every successful command, refresh and latch expiry yields a
//! [`SnapshotDelta`] tagged with the [`ChangeCause`] that produced it.
//!
//! # Examples
//!
//! ```
//! use officehub_lib::state::{ChangeCause, SnapshotDelta};
//!
//! let delta = SnapshotDelta::alert(None);
//! let cause = ChangeCause::Refresh;
//!
//! assert!(delta.is_alert());
//! assert_ne!(cause, ChangeCause::Command);
//! ```

mod snapshot_delta;

pub use snapshot_delta::{ChangeCause, SnapshotDelta};
