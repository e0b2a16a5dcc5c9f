//! The poll loop.
//!
//! Runs cycles back to back, sleeping `poll_interval` after a success and
//! `error_delay` after a failure. Cycle errors are logged and never end the
//! loop; only cancellation or the optional cycle bound does. Each cycle runs
//! on tokio's blocking pool so an interrupt is seen even mid-cycle.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use zonewatch_core::{ContainmentEvaluator, ZoneCatalog};
use zonewatch_core::constants::{DEFAULT_ERROR_DELAY_MS, DEFAULT_POLL_INTERVAL_MS};

use crate::cycle::{CycleConfig, CycleReport, run_cycle};
use crate::errors::Result;
use crate::metrics::{
    CYCLE_DURATION_SECONDS, CYCLES_TOTAL, FLUSHES_TOTAL, OPEN_RESIDENCIES,
    RESIDENCIES_CLOSED_TOTAL, RESIDENCIES_INSERTED_TOTAL, RESIDENCIES_UPDATED_TOTAL,
    SAMPLES_FETCHED_TOTAL, SAMPLES_SCREENED_OUT_TOTAL,
};
use crate::traits::{PositionSource, ResidencyPersistence};

/// Supplies the per-cycle `now`.
pub trait Clock {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<F: Fn() -> DateTime<Utc>> Clock for F {
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

/// Loop pacing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DriverConfig {
    /// Sleep after a successful cycle.
    pub poll_interval: Duration,
    /// Sleep after a failed cycle.
    pub error_delay: Duration,
    /// Stop after this many cycles, successful or not.
    pub max_cycles: Option<u64>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            error_delay: Duration::from_millis(DEFAULT_ERROR_DELAY_MS),
            max_cycles: None,
        }
    }
}

/// Totals for a finished loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriverSummary {
    /// Cycles that ran to completion or failed.
    pub cycles: u64,
    /// Cycles that returned an error or panicked.
    pub failed: u64,
    /// Cancellation arrived while a cycle was still running.
    pub interrupted: bool,
}

/// Owns the collaborators and drives cycles until told to stop.
pub struct PollDriver<S, P, C, K = SystemClock> {
    source: S,
    persistence: P,
    catalog: ZoneCatalog,
    evaluator: C,
    clock: K,
    cycle: CycleConfig,
    config: DriverConfig,
}

impl<S, P, C> PollDriver<S, P, C, SystemClock>
where
    S: PositionSource,
    P: ResidencyPersistence,
    C: ContainmentEvaluator,
{
    /// Driver using the wall clock.
    pub fn new(
        source: S,
        persistence: P,
        catalog: ZoneCatalog,
        evaluator: C,
        cycle: CycleConfig,
        config: DriverConfig,
    ) -> Self {
        Self {
            source,
            persistence,
            catalog,
            evaluator,
            clock: SystemClock,
            cycle,
            config,
        }
    }
}

impl<S, P, C, K> PollDriver<S, P, C, K>
where
    S: PositionSource,
    P: ResidencyPersistence,
    C: ContainmentEvaluator,
    K: Clock,
{
    /// Replace the clock.
    pub fn with_clock<K2: Clock>(self, clock: K2) -> PollDriver<S, P, C, K2> {
        PollDriver {
            source: self.source,
            persistence: self.persistence,
            catalog: self.catalog,
            evaluator: self.evaluator,
            clock,
            cycle: self.cycle,
            config: self.config,
        }
    }

    /// Run one cycle now.
    pub fn run_once(&self) -> Result<CycleReport> {
        run_cycle(
            &self.source,
            &self.persistence,
            &self.catalog,
            &self.evaluator,
            &self.cycle,
            self.clock.now(),
        )
    }

    /// Access the persistence backend.
    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Access the source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S, P, C, K> PollDriver<S, P, C, K>
where
    S: PositionSource + Send + Sync + 'static,
    P: ResidencyPersistence + Send + Sync + 'static,
    C: ContainmentEvaluator + Send + Sync + 'static,
    K: Clock + Send + Sync + 'static,
{
    /// Loop until `cancel` fires or `max_cycles` is reached.
    ///
    /// Cycles run on the blocking pool, so cancellation is observed even while
    /// a cycle is stalled on the store. An interrupted cycle is abandoned;
    /// flushes it already committed stay committed.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) -> DriverSummary {
        let mut summary = DriverSummary::default();
        info!(
            zones = self.catalog.len(),
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            chunk_size = self.cycle.chunk_size,
            "poll loop started"
        );

        while !cancel.is_cancelled() {
            let driver = Arc::clone(&self);
            let cycle = tokio::task::spawn_blocking(move || driver.run_once());
            let outcome = tokio::select! {
                () = cancel.cancelled() => {
                    summary.interrupted = true;
                    warn!(cycle = summary.cycles + 1, "interrupted mid-cycle, abandoning it");
                    break;
                }
                joined = cycle => joined,
            };

            let delay = match outcome {
                Ok(Ok(report)) => {
                    record_success(&report);
                    self.config.poll_interval
                }
                Ok(Err(e)) => {
                    summary.failed += 1;
                    ::metrics::counter!(CYCLES_TOTAL, "outcome" => "error").increment(1);
                    error!(error = %e, cycle = summary.cycles + 1, "cycle failed");
                    self.config.error_delay
                }
                Err(e) => {
                    summary.failed += 1;
                    ::metrics::counter!(CYCLES_TOTAL, "outcome" => "error").increment(1);
                    error!(error = %e, cycle = summary.cycles + 1, "cycle task panicked");
                    self.config.error_delay
                }
            };
            summary.cycles += 1;

            if self.config.max_cycles.is_some_and(|max| summary.cycles >= max) {
                break;
            }

            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(delay) => {}
            }
        }

        info!(
            cycles = summary.cycles,
            failed = summary.failed,
            interrupted = summary.interrupted,
            "poll loop stopped"
        );
        summary
    }
}

fn record_success(report: &CycleReport) {
    ::metrics::counter!(CYCLES_TOTAL, "outcome" => "ok").increment(1);
    ::metrics::histogram!(CYCLE_DURATION_SECONDS).record(report.elapsed.as_secs_f64());
    ::metrics::counter!(FLUSHES_TOTAL).increment(report.flushes.len() as u64);
    ::metrics::counter!(SAMPLES_FETCHED_TOTAL).increment(report.fetched as u64);
    ::metrics::counter!(SAMPLES_SCREENED_OUT_TOTAL).increment(report.screened_out as u64);
    ::metrics::counter!(RESIDENCIES_INSERTED_TOTAL).increment(report.inserted as u64);
    ::metrics::counter!(RESIDENCIES_UPDATED_TOTAL).increment(report.updated as u64);
    ::metrics::counter!(RESIDENCIES_CLOSED_TOTAL).increment(report.closed as u64);
    ::metrics::gauge!(OPEN_RESIDENCIES).set(report.open_at_start as f64);

    info!(
        fetched = report.fetched,
        screened_out = report.screened_out,
        flushes = report.flushes.len(),
        inserted = report.inserted,
        updated = report.updated,
        closed = report.closed,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "cycle complete"
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
