//! Shared constants.

use crate::ids::ZoneId;

/// Zone id of the general restricted area.
pub const RESTRICTED_ZONE_ID: ZoneId = ZoneId(0);

/// Highest numbered sector zone id (sectors are `1..=9`).
pub const LAST_SECTOR_ZONE_ID: ZoneId = ZoneId(9);

/// Northbound traffic-separation-scheme lane.
pub const TSS_NORTHBOUND_ZONE_ID: ZoneId = ZoneId(10);

/// Southbound traffic-separation-scheme lane.
pub const TSS_SOUTHBOUND_ZONE_ID: ZoneId = ZoneId(11);

/// Open TSS residencies older than this are force-closed (6 hours).
pub const DEFAULT_TSS_DWELL_LIMIT_SECS: u64 = 6 * 60 * 60;

/// Largest accepted TSS dwell limit (30 days).
pub const MAX_TSS_DWELL_LIMIT_SECS: u64 = 30 * 24 * 60 * 60;

/// Processed samples per transactional flush.
pub const DEFAULT_CHUNK_SIZE: usize = 300;

/// Rolling window of position reports fetched per cycle (5 days).
pub const DEFAULT_LOOKBACK_HOURS: u64 = 5 * 24;

/// Largest accepted lookback window (366 days).
pub const MAX_LOOKBACK_HOURS: u64 = 366 * 24;

/// Delay between successful cycles.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// Delay after a failed cycle.
pub const DEFAULT_ERROR_DELAY_MS: u64 = 1_000;

/// GeoJSON `properties.role` value marking the screening region feature.
pub const SCREENING_ROLE: &str = "screening";
