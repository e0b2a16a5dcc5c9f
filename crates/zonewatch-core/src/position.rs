//! AIS position samples.

use chrono::{DateTime, Utc};
use geo::Point;
use serde::{Deserialize, Serialize};

use crate::ids::Mmsi;

/// One AIS position report, as read from the position feed.
///
/// Samples are processed strictly in `ts` order; ties keep source order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSample {
    /// Vessel identity.
    pub mmsi: Mmsi,
    /// Report time.
    pub ts: DateTime<Utc>,
    /// Degrees east.
    pub longitude: f64,
    /// Degrees north, in `[-90, 90]` for any sample the source yields.
    pub latitude: f64,
    /// AIS navigational status code.
    pub nav_status: i32,
    /// Text form of `nav_status`.
    pub nav_status_desc: String,
    /// Course over ground in degrees.
    pub cog: f64,
}

impl PositionSample {
    /// Planar point (x = longitude, y = latitude).
    #[must_use]
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}
