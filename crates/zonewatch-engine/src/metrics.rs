//! Metric names recorded through the `metrics` facade.
//!
//! Nothing is exported unless the host process installs a recorder.

/// Cycles run (counter, labels: outcome = ok | error).
pub const CYCLES_TOTAL: &str = "zonewatch_cycles_total";
/// Cycle wall time in seconds (histogram).
pub const CYCLE_DURATION_SECONDS: &str = "zonewatch_cycle_duration_seconds";
/// Flushes committed (counter).
pub const FLUSHES_TOTAL: &str = "zonewatch_flushes_total";
/// Position samples fetched (counter).
pub const SAMPLES_FETCHED_TOTAL: &str = "zonewatch_samples_fetched_total";
/// Samples dropped by the screening region (counter).
pub const SAMPLES_SCREENED_OUT_TOTAL: &str = "zonewatch_samples_screened_out_total";
/// Residencies opened (counter).
pub const RESIDENCIES_INSERTED_TOTAL: &str = "zonewatch_residencies_inserted_total";
/// Residency rows rewritten (counter).
pub const RESIDENCIES_UPDATED_TOTAL: &str = "zonewatch_residencies_updated_total";
/// Residencies closed by exit or dwell timeout (counter).
pub const RESIDENCIES_CLOSED_TOTAL: &str = "zonewatch_residencies_closed_total";
/// Open residencies at the start of the last cycle (gauge).
pub const OPEN_RESIDENCIES: &str = "zonewatch_open_residencies";
