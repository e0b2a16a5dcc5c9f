//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]` so a partial
//! JSON file only needs the keys it overrides.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;
use zonewatch_core::LogFormat;
use zonewatch_core::constants::{
    DEFAULT_CHUNK_SIZE, DEFAULT_ERROR_DELAY_MS, DEFAULT_LOOKBACK_HOURS, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_TSS_DWELL_LIMIT_SECS, MAX_LOOKBACK_HOURS, MAX_TSS_DWELL_LIMIT_SECS,
};

/// Root settings type.
///
/// ```json
/// {
///   "poll": { "intervalMs": 5000 },
///   "store": { "dbPath": "/var/lib/zonewatch/ais.db" },
///   "catalog": { "path": "/etc/zonewatch/zones.geojson" }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZonewatchSettings {
    /// Poll loop pacing.
    pub poll: PollSettings,
    /// Transactional flush sizing.
    pub commit: CommitSettings,
    /// Residency rules.
    pub tracker: TrackerSettings,
    /// Position feed window.
    pub source: SourceSettings,
    /// Database location and pool.
    pub store: StoreSettings,
    /// Zone catalog location.
    pub catalog: CatalogSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

impl ZonewatchSettings {
    /// Clamp values that would stall or break the tracker, logging each fix.
    pub fn validate(&mut self) {
        if self.commit.chunk_size == 0 {
            warn!("commit.chunkSize must be at least 1, using 1");
            self.commit.chunk_size = 1;
        }
        if self.store.pool_size == 0 {
            warn!("store.poolSize must be at least 1, using 1");
            self.store.pool_size = 1;
        }
        if self.source.lookback_hours == 0 {
            warn!(
                default = DEFAULT_LOOKBACK_HOURS,
                "source.lookbackHours must be positive, using default"
            );
            self.source.lookback_hours = DEFAULT_LOOKBACK_HOURS;
        } else if self.source.lookback_hours > MAX_LOOKBACK_HOURS {
            warn!(
                value = self.source.lookback_hours,
                max = MAX_LOOKBACK_HOURS,
                "source.lookbackHours too large, clamping"
            );
            self.source.lookback_hours = MAX_LOOKBACK_HOURS;
        }
        if self.tracker.tss_dwell_limit_secs == 0 {
            warn!(
                default = DEFAULT_TSS_DWELL_LIMIT_SECS,
                "tracker.tssDwellLimitSecs must be positive, using default"
            );
            self.tracker.tss_dwell_limit_secs = DEFAULT_TSS_DWELL_LIMIT_SECS;
        } else if self.tracker.tss_dwell_limit_secs > MAX_TSS_DWELL_LIMIT_SECS {
            warn!(
                value = self.tracker.tss_dwell_limit_secs,
                max = MAX_TSS_DWELL_LIMIT_SECS,
                "tracker.tssDwellLimitSecs too large, clamping"
            );
            self.tracker.tss_dwell_limit_secs = MAX_TSS_DWELL_LIMIT_SECS;
        }
    }
}

/// Poll loop pacing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PollSettings {
    /// Sleep after a successful cycle.
    pub interval_ms: u64,
    /// Sleep after a failed cycle.
    pub error_delay_ms: u64,
    /// Stop after this many cycles. `None` runs until interrupted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cycles: Option<u64>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
            error_delay_ms: DEFAULT_ERROR_DELAY_MS,
            max_cycles: None,
        }
    }
}

/// Transactional flush sizing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommitSettings {
    /// Processed samples per flush.
    pub chunk_size: usize,
}

impl Default for CommitSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Residency rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerSettings {
    /// Open TSS lane residencies older than this are force-closed.
    pub tss_dwell_limit_secs: u64,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            tss_dwell_limit_secs: DEFAULT_TSS_DWELL_LIMIT_SECS,
        }
    }
}

/// Position feed window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceSettings {
    /// Rolling lookback window.
    pub lookback_hours: u64,
    /// Drop samples outside the catalog's screening region.
    pub screen_with_region: bool,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            lookback_hours: DEFAULT_LOOKBACK_HOURS,
            screen_with_region: true,
        }
    }
}

/// Database location and pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreSettings {
    /// `SQLite` file path.
    pub db_path: PathBuf,
    /// Maximum pooled connections.
    pub pool_size: u32,
    /// `busy_timeout` pragma.
    pub busy_timeout_ms: u64,
    /// Create a partial unique index on open `(mmsi, zone)` rows at startup.
    pub enforce_open_uniqueness: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            db_path: zonewatch_dir().join("zonewatch.db"),
            pool_size: 4,
            busy_timeout_ms: 5_000,
            enforce_open_uniqueness: false,
        }
    }
}

/// Zone catalog location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogSettings {
    /// GeoJSON file path.
    pub path: PathBuf,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            path: zonewatch_dir().join("zones.geojson"),
        }
    }
}

/// Log output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level, overridden by `RUST_LOG`.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

/// `~/.zonewatch`, falling back to `/tmp/.zonewatch` without `HOME`.
pub fn zonewatch_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".zonewatch")
}
