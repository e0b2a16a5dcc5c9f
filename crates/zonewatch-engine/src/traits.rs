//! Collaborator seams.
//!
//! Both traits are synchronous: a cycle is a strictly sequential run of
//! blocking calls.

use chrono::{DateTime, Utc};
use zonewatch_core::{NewResidency, PositionSample, ResidencyRecord};

use crate::errors::Result;

/// Supplies the batch of position samples for a cycle.
pub trait PositionSource {
    /// Samples for the window ending at `now`, ordered by `ts` ascending.
    fn fetch_positions(&self, now: DateTime<Utc>) -> Result<Vec<PositionSample>>;
}

/// Reads open residencies and applies tracker output.
pub trait ResidencyPersistence {
    /// Every open residency.
    fn load_open_residencies(&self) -> Result<Vec<ResidencyRecord>>;

    /// Apply inserts and full-row updates atomically.
    fn commit(&self, inserts: &[NewResidency], updates: &[ResidencyRecord]) -> Result<()>;
}
