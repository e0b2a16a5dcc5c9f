//! In-memory collaborators for tests and dry runs.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use zonewatch_core::{NewResidency, PositionSample, ResidencyRecord};
use zonewatch_store::StoreError;

use crate::errors::{EngineError, Result};
use crate::traits::{PositionSource, ResidencyPersistence};

#[derive(Default)]
struct ResidencyState {
    records: Vec<ResidencyRecord>,
    next_id: i64,
    commits: usize,
    fail_after: Option<usize>,
}

/// Residency table held in a `Vec`, with commit counting and fault injection.
#[derive(Default)]
pub struct InMemoryResidencies {
    state: Mutex<ResidencyState>,
}

impl InMemoryResidencies {
    /// Start with existing records. New ids continue after the largest one.
    pub fn with_records(records: Vec<ResidencyRecord>) -> Self {
        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0);
        Self {
            state: Mutex::new(ResidencyState {
                records,
                next_id,
                ..ResidencyState::default()
            }),
        }
    }

    /// Allow `n` more successful commits, then fail every later one.
    pub fn fail_commits_after(&self, n: usize) {
        let mut state = self.state.lock();
        state.fail_after = Some(state.commits + n);
    }

    /// Stop injecting commit failures.
    pub fn heal(&self) {
        self.state.lock().fail_after = None;
    }

    /// Successful commits so far.
    pub fn commit_count(&self) -> usize {
        self.state.lock().commits
    }

    /// Copy of every stored record, in insertion order.
    pub fn records(&self) -> Vec<ResidencyRecord> {
        self.state.lock().records.clone()
    }

    /// Copy of every open record.
    pub fn open_records(&self) -> Vec<ResidencyRecord> {
        self.state
            .lock()
            .records
            .iter()
            .filter(|r| r.is_open())
            .cloned()
            .collect()
    }
}

impl ResidencyPersistence for InMemoryResidencies {
    fn load_open_residencies(&self) -> Result<Vec<ResidencyRecord>> {
        Ok(self.open_records())
    }

    fn commit(&self, inserts: &[NewResidency], updates: &[ResidencyRecord]) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_after.is_some_and(|limit| state.commits >= limit) {
            return Err(EngineError::Persistence("injected commit failure".into()));
        }

        // Validate before mutating so a bad update leaves nothing behind.
        let mut positions = Vec::with_capacity(updates.len());
        for update in updates {
            let index = state
                .records
                .iter()
                .position(|r| r.id == update.id)
                .ok_or(StoreError::NotFound(update.id))?;
            positions.push(index);
        }

        for new in inserts {
            state.next_id += 1;
            let id = state.next_id;
            state.records.push(new.clone().with_id(id));
        }
        for (index, update) in positions.into_iter().zip(updates) {
            state.records[index] = update.clone();
        }
        state.commits += 1;
        Ok(())
    }
}

#[derive(Default)]
struct SourceState {
    batches: VecDeque<std::result::Result<Vec<PositionSample>, String>>,
    calls: Vec<DateTime<Utc>>,
}

/// Position source that replays queued batches, then returns empty ones.
#[derive(Default)]
pub struct ScriptedSource {
    state: Mutex<SourceState>,
}

impl ScriptedSource {
    /// Queue a batch for the next fetch.
    pub fn push_batch(&self, batch: Vec<PositionSample>) {
        self.state.lock().batches.push_back(Ok(batch));
    }

    /// Queue a failing fetch.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.state.lock().batches.push_back(Err(message.into()));
    }

    /// The `now` passed to each fetch so far.
    pub fn calls(&self) -> Vec<DateTime<Utc>> {
        self.state.lock().calls.clone()
    }
}

impl PositionSource for ScriptedSource {
    fn fetch_positions(&self, now: DateTime<Utc>) -> Result<Vec<PositionSample>> {
        let mut state = self.state.lock();
        state.calls.push(now);
        match state.batches.pop_front() {
            Some(Ok(batch)) => Ok(batch),
            Some(Err(message)) => Err(EngineError::Source(message)),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;
    use zonewatch_core::{Mmsi, ZoneId};

    fn new_residency() -> NewResidency {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        NewResidency {
            mmsi: Mmsi(1),
            zone_id: ZoneId(1),
            ts_detected: ts,
            ts_current: ts,
            longitude: 0.0,
            latitude: 0.0,
            nav_status: 0,
            nav_status_desc: String::new(),
        }
    }

    #[test]
    fn ids_continue_after_seed() {
        let store = InMemoryResidencies::with_records(vec![new_residency().with_id(41)]);
        store.commit(&[new_residency()], &[]).unwrap();
        let ids: Vec<i64> = store.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![41, 42]);
    }

    #[test]
    fn unknown_update_is_rejected_atomically() {
        let store = InMemoryResidencies::default();
        let err = store
            .commit(&[new_residency()], &[new_residency().with_id(9)])
            .unwrap_err();
        assert_matches!(err, EngineError::Store(StoreError::NotFound(9)));
        assert!(store.records().is_empty());
    }

    #[test]
    fn injected_failure_then_heal() {
        let store = InMemoryResidencies::default();
        store.fail_commits_after(1);
        store.commit(&[new_residency()], &[]).unwrap();
        assert!(store.commit(&[new_residency()], &[]).is_err());
        store.heal();
        store.commit(&[new_residency()], &[]).unwrap();
        assert_eq!(store.commit_count(), 2);
    }

    #[test]
    fn scripted_source_replays_then_empties() {
        let source = ScriptedSource::default();
        source.push_failure("feed offline");
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_matches!(source.fetch_positions(now), Err(EngineError::Source(_)));
        assert!(source.fetch_positions(now).unwrap().is_empty());
        assert_eq!(source.calls().len(), 2);
    }
}
