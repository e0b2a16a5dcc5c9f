//! Branded identifiers.
//!
//! Vessel and zone identities are both plain integers on the wire; wrapping
//! them keeps the `(mmsi, zone)` key from being assembled in the wrong order.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maritime Mobile Service Identity, the vessel tracking key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mmsi(pub i64);

impl Mmsi {
    /// Raw numeric value.
    #[must_use]
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Mmsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Mmsi {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Stable zone identifier carried on every catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub u8);

impl ZoneId {
    /// Raw numeric value.
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for ZoneId {
    fn from(value: u8) -> Self {
        Self(value)
    }
}
