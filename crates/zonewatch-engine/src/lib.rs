//! # zonewatch-engine
//!
//! The residency tracking loop.
//!
//! Each cycle fetches a window of position samples, snapshots the open
//! residencies once, runs every sample against every zone through the
//! ABSENT/PRESENT state machine, and flushes the resulting inserts and
//! updates in fixed-size transactional chunks.
//!
//! - **[`snapshot`]**: read-only view of open residencies for one cycle
//! - **[`tracker`]**: per-sample, per-zone decisions
//! - **[`committer`]**: chunked transactional flushes
//! - **[`cycle`]**: one fetch → snapshot → track → commit pass
//! - **[`driver`]**: the async poll loop with cancellation
//! - **[`traits`]**: [`PositionSource`] and [`ResidencyPersistence`] seams
//! - **[`providers`]**: `SQLite` and in-memory implementations of the seams
//!
//! ## Crate Position
//!
//! Depends on `zonewatch-core` and `zonewatch-store`. Depended on by the agent.

#![deny(unsafe_code)]

pub mod committer;
pub mod cycle;
pub mod driver;
pub mod errors;
pub mod metrics;
pub mod providers;
pub mod snapshot;
pub mod tracker;
pub mod traits;

pub use committer::{BatchCommitter, FlushReport};
pub use cycle::{CycleConfig, CycleReport, run_cycle};
pub use driver::{Clock, DriverConfig, DriverSummary, PollDriver, SystemClock};
pub use errors::{EngineError, Result};
pub use providers::{InMemoryResidencies, ScriptedSource, SqlitePositionSource};
pub use snapshot::OpenResidencySnapshot;
pub use tracker::{Decision, PendingChanges, ResidencyTracker};
pub use traits::{PositionSource, ResidencyPersistence};
