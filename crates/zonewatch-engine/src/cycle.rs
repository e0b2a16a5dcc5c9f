//! One tracking cycle: fetch → screen → snapshot → track → commit.

use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, instrument};
use zonewatch_core::{ContainmentEvaluator, ZoneCatalog};

use crate::committer::{BatchCommitter, FlushReport};
use crate::errors::Result;
use crate::snapshot::OpenResidencySnapshot;
use crate::tracker::ResidencyTracker;
use crate::traits::{PositionSource, ResidencyPersistence};

/// Per-cycle tuning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleConfig {
    /// Processed samples per flush.
    pub chunk_size: usize,
    /// Open TSS residencies older than this are closed at `now`.
    pub tss_dwell_limit: Duration,
    /// Drop samples outside the catalog's screening region.
    pub screen_with_region: bool,
}

impl Default for CycleConfig {
    fn default() -> Self {
        use zonewatch_core::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_TSS_DWELL_LIMIT_SECS};
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            tss_dwell_limit: Duration::seconds(DEFAULT_TSS_DWELL_LIMIT_SECS as i64),
            screen_with_region: true,
        }
    }
}

/// What a completed cycle did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Samples returned by the source.
    pub fetched: usize,
    /// Samples dropped by the screening region.
    pub screened_out: usize,
    /// Open residencies in the snapshot.
    pub open_at_start: usize,
    /// One entry per flush, in order.
    pub flushes: Vec<FlushReport>,
    /// Residencies opened.
    pub inserted: usize,
    /// Residencies rewritten.
    pub updated: usize,
    /// Residencies closed by exit or dwell timeout.
    pub closed: usize,
    /// Wall time spent in the cycle.
    pub elapsed: std::time::Duration,
}

impl CycleReport {
    fn record_flush(&mut self, flush: FlushReport) {
        self.inserted += flush.inserted;
        self.updated += flush.updated;
        self.closed += flush.closed;
        self.flushes.push(flush);
    }
}

/// Run one cycle with `now` as the dwell-rule clock.
///
/// A failure anywhere aborts the cycle. Flushes that completed before the
/// failure stay committed.
#[instrument(skip_all, fields(now = %now))]
pub fn run_cycle<S, P, C>(
    source: &S,
    persistence: &P,
    catalog: &ZoneCatalog,
    evaluator: &C,
    config: &CycleConfig,
    now: DateTime<Utc>,
) -> Result<CycleReport>
where
    S: PositionSource + ?Sized,
    P: ResidencyPersistence + ?Sized,
    C: ContainmentEvaluator,
{
    let started = Instant::now();
    let mut report = CycleReport::default();

    let mut samples = source.fetch_positions(now)?;
    report.fetched = samples.len();
    if config.screen_with_region && catalog.screening_region().is_some() {
        samples.retain(|s| catalog.in_screening_region(s.point()));
        report.screened_out = report.fetched - samples.len();
    }

    let snapshot = OpenResidencySnapshot::from_records(persistence.load_open_residencies()?);
    report.open_at_start = snapshot.len();
    debug!(
        fetched = report.fetched,
        screened_out = report.screened_out,
        open = snapshot.len(),
        "cycle started"
    );

    let tracker = ResidencyTracker::new(catalog, evaluator, &snapshot, now, config.tss_dwell_limit);
    let mut committer = BatchCommitter::new(persistence, config.chunk_size);

    for sample in &samples {
        tracker.apply_all(sample, committer.pending_mut());
        if let Some(flush) = committer.sample_processed()? {
            report.record_flush(flush);
        }
    }
    if let Some(flush) = committer.finish()? {
        report.record_flush(flush);
    }

    report.elapsed = started.elapsed();
    Ok(report)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
