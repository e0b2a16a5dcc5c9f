//! Zone entities.
//!
//! A [`Zone`] pairs an explicit [`ZoneId`] with its planar geometry. The
//! zone's role (restricted area, sector, or TSS lane) is derived from the id,
//! never from its position in the catalog.

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

use crate::constants::{
    LAST_SECTOR_ZONE_ID, RESTRICTED_ZONE_ID, TSS_NORTHBOUND_ZONE_ID, TSS_SOUTHBOUND_ZONE_ID,
};
use crate::ids::ZoneId;

/// Travel direction of a traffic-separation-scheme lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneDirection {
    /// Zone 10.
    Northbound,
    /// Zone 11.
    Southbound,
}

/// Role of a zone, derived from its id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum ZoneKind {
    /// Zone 0.
    Restricted,
    /// Zones 1 through 9.
    Sector(u8),
    /// Zones 10 and 11.
    TssLane(LaneDirection),
}

impl ZoneKind {
    /// Classify a zone id. Returns `None` for ids outside the known set.
    #[must_use]
    pub fn from_id(id: ZoneId) -> Option<Self> {
        match id {
            RESTRICTED_ZONE_ID => Some(Self::Restricted),
            TSS_NORTHBOUND_ZONE_ID => Some(Self::TssLane(LaneDirection::Northbound)),
            TSS_SOUTHBOUND_ZONE_ID => Some(Self::TssLane(LaneDirection::Southbound)),
            ZoneId(n) if (1..=LAST_SECTOR_ZONE_ID.get()).contains(&n) => Some(Self::Sector(n)),
            ZoneId(_) => None,
        }
    }

    /// Whether open residencies in this zone are subject to the dwell timeout.
    #[must_use]
    pub fn is_tss_lane(self) -> bool {
        matches!(self, Self::TssLane(_))
    }

    /// Human-readable label used when the catalog gives no name.
    #[must_use]
    pub fn default_name(self) -> String {
        match self {
            Self::Restricted => "Restricted Area".to_string(),
            Self::Sector(n) => format!("Sector {n}"),
            Self::TssLane(LaneDirection::Northbound) => "TSS Northbound".to_string(),
            Self::TssLane(LaneDirection::Southbound) => "TSS Southbound".to_string(),
        }
    }
}

/// An immutable named zone polygon.
#[derive(Clone, Debug, PartialEq)]
pub struct Zone {
    /// Stable identifier.
    pub id: ZoneId,
    /// Role derived from `id`.
    pub kind: ZoneKind,
    /// Display name.
    pub name: String,
    /// Planar geometry in (longitude, latitude) order.
    pub polygon: MultiPolygon<f64>,
}

impl Zone {
    /// Whether this zone is one of the two TSS lanes.
    #[must_use]
    pub fn is_tss_lane(&self) -> bool {
        self.kind.is_tss_lane()
    }
}
