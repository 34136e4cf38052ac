// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lights and the rooms that contain them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Brightness level as a percentage (0-100).
///
/// # Examples
///
/// ```
/// use officehub_lib::model::Brightness;
///
/// let level = Brightness::new(75).unwrap();
/// assert_eq!(level.value(), 75);
///
/// assert_eq!(Brightness::MIN.value(), 0);
/// assert_eq!(Brightness::MAX.value(), 100);
///
/// // Invalid values return error
/// assert!(Brightness::new(101).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Brightness(u8);

impl Brightness {
    /// Minimum brightness (0%).
    pub const MIN: Self = Self(0);

    /// Maximum brightness (100%).
    pub const MAX: Self = Self(100);

    /// Creates a new brightness value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value exceeds 100.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > 100 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: u64::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Creates a brightness value, clamping to the valid range.
    ///
    /// ```
    /// use officehub_lib::model::Brightness;
    ///
    /// assert_eq!(Brightness::clamped(150).value(), 100);
    /// ```
    #[must_use]
    pub const fn clamped(value: u8) -> Self {
        if value > 100 { Self(100) } else { Self(value) }
    }

    /// Returns the brightness percentage.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<u8> for Brightness {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Brightness> for u8 {
    fn from(value: Brightness) -> Self {
        value.0
    }
}

/// Reading of a single light.
///
/// `on` may only be flipped by a command while `reachable` is true.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightState {
    /// Whether the light currently answers on the network.
    pub reachable: bool,
    /// Whether the light is lit.
    pub on: bool,
    /// Brightness level.
    pub brightness: Brightness,
}

impl LightState {
    /// Creates a light reading.
    #[must_use]
    pub const fn new(reachable: bool, on: bool, brightness: Brightness) -> Self {
        Self {
            reachable,
            on,
            brightness,
        }
    }
}

/// An addressable light, identified by `id` within its room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Light {
    /// Identifier, unique within the containing room.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Current reading.
    pub state: LightState,
}

impl Light {
    /// Creates a light.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, state: LightState) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            state,
        }
    }
}

/// A room and its ordered lights. Room names are unique across a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Room name, used as its key.
    pub name: String,
    /// Lights in display order.
    pub lights: Vec<Light>,
}

impl Room {
    /// Creates a room.
    #[must_use]
    pub fn new(name: impl Into<String>, lights: Vec<Light>) -> Self {
        Self {
            name: name.into(),
            lights,
        }
    }

    /// Looks up a light by id.
    #[must_use]
    pub fn light(&self, id: &str) -> Option<&Light> {
        self.lights.iter().find(|l| l.id == id)
    }

    /// Looks up a light by id for mutation.
    pub fn light_mut(&mut self, id: &str) -> Option<&mut Light> {
        self.lights.iter_mut().find(|l| l.id == id)
    }
}
