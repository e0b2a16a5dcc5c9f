//! Residency records.
//!
//! A residency is one continuous stay of a vessel inside a zone. It is open
//! while `ts_out` is `None` and closed once `ts_out` is set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{Mmsi, ZoneId};
use crate::position::PositionSample;

/// Identity of a residency track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidencyKey {
    /// Vessel.
    pub mmsi: Mmsi,
    /// Zone.
    pub zone_id: ZoneId,
}

impl ResidencyKey {
    /// Build a key.
    #[must_use]
    pub fn new(mmsi: Mmsi, zone_id: ZoneId) -> Self {
        Self { mmsi, zone_id }
    }
}

/// A persisted residency row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidencyRecord {
    /// Row identity assigned by the store.
    pub id: i64,
    /// Vessel.
    pub mmsi: Mmsi,
    /// Zone.
    pub zone_id: ZoneId,
    /// Time of the sample that opened the residency.
    pub ts_detected: DateTime<Utc>,
    /// Time of the most recent in-zone sample.
    pub ts_current: DateTime<Utc>,
    /// Exit time; `None` while open.
    pub ts_out: Option<DateTime<Utc>>,
    /// Longitude of the most recent in-zone sample.
    pub longitude: f64,
    /// Latitude of the most recent in-zone sample.
    pub latitude: f64,
    /// Nav status captured when the residency opened.
    pub nav_status: i32,
    /// Text form of `nav_status`.
    pub nav_status_desc: String,
}

impl ResidencyRecord {
    /// Whether the residency is still open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.ts_out.is_none()
    }

    /// The `(mmsi, zone)` key.
    #[must_use]
    pub fn key(&self) -> ResidencyKey {
        ResidencyKey::new(self.mmsi, self.zone_id)
    }

    /// Refresh the current position from an in-zone sample.
    ///
    /// Nav status keeps the value captured on entry.
    pub fn refresh(&mut self, sample: &PositionSample) {
        self.ts_current = sample.ts;
        self.longitude = sample.longitude;
        self.latitude = sample.latitude;
    }
}

/// A residency about to be inserted; the store assigns the id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResidency {
    /// Vessel.
    pub mmsi: Mmsi,
    /// Zone.
    pub zone_id: ZoneId,
    /// Time of the opening sample.
    pub ts_detected: DateTime<Utc>,
    /// Equal to `ts_detected` on insert.
    pub ts_current: DateTime<Utc>,
    /// Longitude of the opening sample.
    pub longitude: f64,
    /// Latitude of the opening sample.
    pub latitude: f64,
    /// Nav status of the opening sample.
    pub nav_status: i32,
    /// Text form of `nav_status`.
    pub nav_status_desc: String,
}

impl NewResidency {
    /// Open a residency from the sample that entered `zone_id`.
    #[must_use]
    pub fn from_sample(sample: &PositionSample, zone_id: ZoneId) -> Self {
        Self {
            mmsi: sample.mmsi,
            zone_id,
            ts_detected: sample.ts,
            ts_current: sample.ts,
            longitude: sample.longitude,
            latitude: sample.latitude,
            nav_status: sample.nav_status,
            nav_status_desc: sample.nav_status_desc.clone(),
        }
    }

    /// The `(mmsi, zone)` key.
    #[must_use]
    pub fn key(&self) -> ResidencyKey {
        ResidencyKey::new(self.mmsi, self.zone_id)
    }

    /// Attach a store-assigned id.
    #[must_use]
    pub fn with_id(self, id: i64) -> ResidencyRecord {
        ResidencyRecord {
            id,
            mmsi: self.mmsi,
            zone_id: self.zone_id,
            ts_detected: self.ts_detected,
            ts_current: self.ts_current,
            ts_out: None,
            longitude: self.longitude,
            latitude: self.latitude,
            nav_status: self.nav_status,
            nav_status_desc: self.nav_status_desc,
        }
    }
}
