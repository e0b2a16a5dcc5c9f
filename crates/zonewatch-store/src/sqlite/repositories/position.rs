//! Position repository for the `ais_position` table.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use zonewatch_core::{Mmsi, PositionSample};

use crate::errors::Result;

/// Position repository. Stateless; every method takes `&Connection`.
pub struct PositionRepo;

impl PositionRepo {
    /// Insert one position report and return its row id.
    pub fn insert(conn: &Connection, sample: &PositionSample) -> Result<i64> {
        let _ = conn.execute(
            "INSERT INTO ais_position
               (mmsi, ts, longitude, latitude, nav_status, nav_status_desc, cog)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                sample.mmsi.get(),
                sample.ts,
                sample.longitude,
                sample.latitude,
                sample.nav_status,
                sample.nav_status_desc,
                sample.cog,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Reports with `ts >= since` and a valid latitude, oldest first.
    ///
    /// Rows sharing a timestamp keep insertion order.
    pub fn list_since(conn: &Connection, since: DateTime<Utc>) -> Result<Vec<PositionSample>> {
        let mut stmt = conn.prepare(
            "SELECT mmsi, ts, longitude, latitude, nav_status, nav_status_desc, cog
             FROM ais_position
             WHERE ts >= ?1 AND latitude BETWEEN -90 AND 90
             ORDER BY ts ASC, id ASC",
        )?;
        let rows = stmt
            .query_map(params![since], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PositionSample> {
        Ok(PositionSample {
            mmsi: Mmsi(row.get(0)?),
            ts: row.get(1)?,
            longitude: row.get(2)?,
            latitude: row.get(3)?,
            nav_status: row.get(4)?,
            nav_status_desc: row.get(5)?,
            cog: row.get(6)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
