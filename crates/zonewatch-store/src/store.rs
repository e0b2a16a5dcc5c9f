//! High-level transactional residency store.
//!
//! Wraps the connection pool and the repositories. Each write method runs in
//! one `SQLite` transaction, so a failed flush leaves nothing behind.

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};
use zonewatch_core::{NewResidency, PositionSample, ResidencyKey, ResidencyRecord, ZoneId};

use crate::errors::{Result, StoreError};
use crate::sqlite::connection::{ConnectionPool, PooledConnection};
use crate::sqlite::migrations::run_migrations;
use crate::sqlite::repositories::{PositionRepo, ResidencyRepo};

/// Ids and counts produced by one [`ResidencyStore::commit_changes`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Ids assigned to the inserts, in input order.
    pub inserted_ids: Vec<i64>,
    /// Rows updated.
    pub updated: usize,
}

/// Residency persistence over a pooled `SQLite` database.
#[derive(Clone)]
pub struct ResidencyStore {
    pool: ConnectionPool,
}

impl ResidencyStore {
    /// Wrap a connection pool.
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<PooledConnection> {
        Ok(self.pool.get()?)
    }

    /// Access the underlying pool.
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Apply pending schema migrations.
    pub fn migrate(&self) -> Result<u32> {
        let conn = self.conn()?;
        run_migrations(&conn)
    }

    /// Every open residency, newest detection first.
    #[instrument(skip(self))]
    pub fn load_open_residencies(&self) -> Result<Vec<ResidencyRecord>> {
        let conn = self.conn()?;
        let rows = ResidencyRepo::list_open(&conn)?;
        debug!(open = rows.len(), "loaded open residencies");
        Ok(rows)
    }

    /// Apply inserts then updates in a single transaction.
    ///
    /// An update whose id matches no row aborts the whole transaction with
    /// [`StoreError::NotFound`].
    #[instrument(skip_all, fields(inserts = inserts.len(), updates = updates.len()))]
    pub fn commit_changes(
        &self,
        inserts: &[NewResidency],
        updates: &[ResidencyRecord],
    ) -> Result<CommitOutcome> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut inserted_ids = Vec::with_capacity(inserts.len());
        for new in inserts {
            inserted_ids.push(ResidencyRepo::insert(&tx, new)?);
        }
        for record in updates {
            if !ResidencyRepo::update_by_id(&tx, record)? {
                return Err(StoreError::NotFound(record.id));
            }
        }

        tx.commit()?;
        debug!(inserted = inserted_ids.len(), updated = updates.len(), "changes committed");
        Ok(CommitOutcome {
            inserted_ids,
            updated: updates.len(),
        })
    }

    /// Open residency count per zone, ordered by zone id.
    pub fn open_counts_by_zone(&self) -> Result<Vec<(ZoneId, i64)>> {
        let conn = self.conn()?;
        ResidencyRepo::count_open_by_zone(&conn)
    }

    /// Fetch one residency.
    pub fn get_residency(&self, id: i64) -> Result<Option<ResidencyRecord>> {
        let conn = self.conn()?;
        ResidencyRepo::get_by_id(&conn, id)
    }

    /// Full history for one `(mmsi, zone)`, oldest first.
    pub fn residency_history(&self, key: ResidencyKey) -> Result<Vec<ResidencyRecord>> {
        let conn = self.conn()?;
        ResidencyRepo::list_by_key(&conn, key)
    }

    /// Create the partial unique index on open `(mmsi, zone_id)` rows.
    ///
    /// Fails if the table already holds duplicate open rows. Once present,
    /// inserting a second open row for a key is rejected by `SQLite`.
    pub fn ensure_open_uniqueness_index(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_vessel_in_zone_open_unique
               ON vessel_in_zone (mmsi, zone_id) WHERE ts_out IS NULL;",
        )?;
        info!("open residency uniqueness index in place");
        Ok(())
    }

    /// Position reports with `ts >= since`, oldest first.
    pub fn positions_since(&self, since: DateTime<Utc>) -> Result<Vec<PositionSample>> {
        let conn = self.conn()?;
        PositionRepo::list_since(&conn, since)
    }

    /// Insert position reports in one transaction.
    pub fn insert_positions(&self, samples: &[PositionSample]) -> Result<usize> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        for sample in samples {
            let _ = PositionRepo::insert(&tx, sample)?;
        }
        tx.commit()?;
        Ok(samples.len())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
