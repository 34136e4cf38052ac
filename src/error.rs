// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `OfficeHub` library.
//!
//! This module provides the error hierarchy for the hub: value validation,
//! snapshot/music collaborator failures, rejected commands, and
//! configuration problems. None of these conditions is fatal; the hub keeps
//! accepting commands and refresh ticks after any of them.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// A snapshot or music collaborator failed.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// A command precondition did not hold.
    #[error(transparent)]
    Rejected(#[from] CommandRejected),

    /// Configuration JSON could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A refresh scheduler is already running for this hub.
    #[error("refresh scheduler is already running")]
    RefreshAlreadyRunning,

    /// The hub was built outside a Tokio runtime.
    #[error("no Tokio runtime is available")]
    NoRuntime,
}

/// Errors related to value validation and constraints.
///
/// These errors occur when attempting to create constrained types
/// with invalid values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u64,
        /// Maximum allowed value.
        max: u64,
        /// The actual value that was provided.
        actual: u64,
    },

    /// A duration that must be positive was zero.
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    /// A capacity that must be positive was zero.
    #[error("{0} must be greater than zero")]
    ZeroCapacity(&'static str),
}

/// Failure reported by a [`SnapshotProvider`](crate::provider::SnapshotProvider)
/// or [`MusicSource`](crate::provider::MusicSource).
///
/// A failed refresh keeps the previous snapshot published and is surfaced as
/// an error-severity alert; the scheduler retries on the next tick.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The collaborator could not be reached or refused to answer.
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// The request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The collaborator answered with a non-success status code.
    #[error("unexpected status code {0}")]
    Status(u16),

    /// The collaborator answered with a payload that could not be decoded.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The collaborator address is missing or malformed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// HTTP transport failure.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Why a command was rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum RejectReason {
    /// The target light is not reachable.
    #[error("light is unreachable")]
    Unreachable,

    /// A latch was selected for a gate that is closed.
    #[error("gate is not open")]
    GateNotOpen,

    /// The music source could not supply a track.
    #[error("music source unavailable")]
    SourceUnavailable,

    /// No room with the given name exists.
    #[error("unknown room")]
    UnknownRoom,

    /// No light with the given id exists in the room.
    #[error("unknown light")]
    UnknownLight,

    /// No gate with the given name exists.
    #[error("unknown gate")]
    UnknownGate,

    /// The latch option is not offered by the gate.
    #[error("latch option not available for this gate")]
    UnknownLatchOption,

    /// A guarded flip saw a different value than the caller observed.
    #[error("state changed since it was observed")]
    StaleObservation,
}

/// Outcome of a command whose precondition failed.
///
/// Rejections are ordinary results, not faults: the snapshot is left
/// untouched and the caller decides how to surface the outcome.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("command rejected: {reason}")]
pub struct CommandRejected {
    /// The failed precondition.
    pub reason: RejectReason,
}

impl CommandRejected {
    /// Creates a rejection with the given reason.
    #[must_use]
    pub const fn new(reason: RejectReason) -> Self {
        Self { reason }
    }
}

impl From<RejectReason> for CommandRejected {
    fn from(reason: RejectReason) -> Self {
        Self::new(reason)
    }
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 0,
            max: 100,
            actual: 150,
        };
        assert_eq!(err.to_string(), "value 150 is out of range [0, 100]");
    }

    #[test]
    fn rejection_display_includes_reason() {
        let err = CommandRejected::new(RejectReason::Unreachable);
        assert_eq!(err.to_string(), "command rejected: light is unreachable");
    }

    #[test]
    fn error_from_rejection() {
        let err: Error = CommandRejected::from(RejectReason::GateNotOpen).into();
        assert!(matches!(
            err,
            Error::Rejected(CommandRejected {
                reason: RejectReason::GateNotOpen
            })
        ));
    }

    #[test]
    fn fetch_error_display() {
        let err = FetchError::Timeout(1500);
        assert_eq!(err.to_string(), "request timed out after 1500 ms");
    }

    #[test]
    fn error_from_fetch_error() {
        let err: Error = FetchError::Unavailable("offline".into()).into();
        assert_eq!(err.to_string(), "fetch error: source unavailable: offline");
    }
}
