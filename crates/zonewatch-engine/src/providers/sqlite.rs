//! `SQLite`-backed collaborators.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use zonewatch_core::{NewResidency, PositionSample, ResidencyRecord};
use zonewatch_store::ResidencyStore;

use crate::errors::{EngineError, Result};
use crate::traits::{PositionSource, ResidencyPersistence};

/// Reads the rolling `ais_position` window.
#[derive(Clone)]
pub struct SqlitePositionSource {
    store: ResidencyStore,
    lookback: Duration,
}

impl SqlitePositionSource {
    /// Source over `store` returning samples newer than `now - lookback`.
    pub fn new(store: ResidencyStore, lookback: Duration) -> Self {
        Self { store, lookback }
    }
}

impl PositionSource for SqlitePositionSource {
    fn fetch_positions(&self, now: DateTime<Utc>) -> Result<Vec<PositionSample>> {
        let since = now.checked_sub_signed(self.lookback).ok_or_else(|| {
            EngineError::Source(format!(
                "lookback {} reaches before the earliest timestamp",
                self.lookback
            ))
        })?;
        let samples = self.store.positions_since(since)?;
        debug!(%since, count = samples.len(), "fetched positions");
        Ok(samples)
    }
}

impl ResidencyPersistence for ResidencyStore {
    fn load_open_residencies(&self) -> Result<Vec<ResidencyRecord>> {
        Ok(ResidencyStore::load_open_residencies(self)?)
    }

    fn commit(&self, inserts: &[NewResidency], updates: &[ResidencyRecord]) -> Result<()> {
        let _ = self.commit_changes(inserts, updates)?;
        Ok(())
    }
}
