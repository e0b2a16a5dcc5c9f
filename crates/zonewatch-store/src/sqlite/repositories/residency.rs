//! Residency repository for the `vessel_in_zone` table.

use rusqlite::{Connection, OptionalExtension, params};
use zonewatch_core::{Mmsi, NewResidency, ResidencyKey, ResidencyRecord, ZoneId};

use crate::errors::Result;

const COLUMNS: &str = "id, mmsi, zone_id, ts_detected, ts_current, ts_out,
                       longitude, latitude, nav_status, nav_status_desc";

/// Residency repository. Stateless; every method takes `&Connection`.
pub struct ResidencyRepo;

impl ResidencyRepo {
    /// Insert an open residency and return its id.
    pub fn insert(conn: &Connection, new: &NewResidency) -> Result<i64> {
        let _ = conn.execute(
            "INSERT INTO vessel_in_zone
               (mmsi, zone_id, ts_detected, ts_current, ts_out,
                longitude, latitude, nav_status, nav_status_desc)
             VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?6, ?7, ?8)",
            params![
                new.mmsi.get(),
                new.zone_id.get(),
                new.ts_detected,
                new.ts_current,
                new.longitude,
                new.latitude,
                new.nav_status,
                new.nav_status_desc,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Overwrite the mutable columns of a row by id.
    ///
    /// `mmsi`, `zone_id`, and `ts_detected` are never rewritten. Returns
    /// whether a row matched.
    pub fn update_by_id(conn: &Connection, record: &ResidencyRecord) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE vessel_in_zone
             SET ts_current = ?1, ts_out = ?2, longitude = ?3, latitude = ?4,
                 nav_status = ?5, nav_status_desc = ?6
             WHERE id = ?7",
            params![
                record.ts_current,
                record.ts_out,
                record.longitude,
                record.latitude,
                record.nav_status,
                record.nav_status_desc,
                record.id,
            ],
        )?;
        Ok(changed > 0)
    }

    /// All open residencies, newest detection first.
    pub fn list_open(conn: &Connection) -> Result<Vec<ResidencyRecord>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM vessel_in_zone
             WHERE ts_out IS NULL
             ORDER BY ts_detected DESC, id DESC"
        ))?;
        let rows = stmt
            .query_map([], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Get a residency by id.
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<ResidencyRecord>> {
        let row = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM vessel_in_zone WHERE id = ?1"),
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Every residency for one `(mmsi, zone)`, oldest first.
    pub fn list_by_key(conn: &Connection, key: ResidencyKey) -> Result<Vec<ResidencyRecord>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM vessel_in_zone
             WHERE mmsi = ?1 AND zone_id = ?2
             ORDER BY ts_detected ASC, id ASC"
        ))?;
        let rows = stmt
            .query_map(params![key.mmsi.get(), key.zone_id.get()], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Number of open residencies per zone, ordered by zone id.
    ///
    /// Zones with no open residency are absent.
    pub fn count_open_by_zone(conn: &Connection) -> Result<Vec<(ZoneId, i64)>> {
        let mut stmt = conn.prepare(
            "SELECT zone_id, COUNT(*) FROM vessel_in_zone
             WHERE ts_out IS NULL
             GROUP BY zone_id
             ORDER BY zone_id",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((ZoneId(row.get(0)?), row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ResidencyRecord> {
        Ok(ResidencyRecord {
            id: row.get(0)?,
            mmsi: Mmsi(row.get(1)?),
            zone_id: ZoneId(row.get(2)?),
            ts_detected: row.get(3)?,
            ts_current: row.get(4)?,
            ts_out: row.get(5)?,
            longitude: row.get(6)?,
            latitude: row.get(7)?,
            nav_status: row.get(8)?,
            nav_status_desc: row.get(9)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::migrations::run_migrations;
    use chrono::{DateTime, TimeZone, Utc};

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        let _ = run_migrations(&conn).unwrap();
        conn
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, minute, 0).unwrap()
    }

    fn new_residency(mmsi: i64, zone: u8, ts: DateTime<Utc>) -> NewResidency {
        NewResidency {
            mmsi: Mmsi(mmsi),
            zone_id: ZoneId(zone),
            ts_detected: ts,
            ts_current: ts,
            longitude: 103.8,
            latitude: 1.2,
            nav_status: 0,
            nav_status_desc: "Under way using engine".into(),
        }
    }

    #[test]
    fn insert_and_get_round_trip() {
        let conn = setup();
        let new = new_residency(123_456_789, 1, at(10, 0));
        let id = ResidencyRepo::insert(&conn, &new).unwrap();
        let record = ResidencyRepo::get_by_id(&conn, id).unwrap().unwrap();
        assert_eq!(record, new.with_id(id));
    }

    #[test]
    fn get_missing_returns_none() {
        let conn = setup();
        assert!(ResidencyRepo::get_by_id(&conn, 99).unwrap().is_none());
    }

    #[test]
    fn update_writes_mutable_columns() {
        let conn = setup();
        let id = ResidencyRepo::insert(&conn, &new_residency(1, 2, at(10, 0))).unwrap();
        let mut record = ResidencyRepo::get_by_id(&conn, id).unwrap().unwrap();
        record.ts_current = at(11, 0);
        record.ts_out = Some(at(11, 30));
        record.longitude = 104.0;

        assert!(ResidencyRepo::update_by_id(&conn, &record).unwrap());
        let stored = ResidencyRepo::get_by_id(&conn, id).unwrap().unwrap();
        assert_eq!(stored.ts_current, at(11, 0));
        assert_eq!(stored.ts_out, Some(at(11, 30)));
        assert!((stored.longitude - 104.0).abs() < f64::EPSILON);
        assert_eq!(stored.ts_detected, at(10, 0));
    }

    #[test]
    fn update_missing_row_reports_false() {
        let conn = setup();
        let record = new_residency(1, 2, at(10, 0)).with_id(77);
        assert!(!ResidencyRepo::update_by_id(&conn, &record).unwrap());
    }

    #[test]
    fn list_open_excludes_closed_and_orders_newest_first() {
        let conn = setup();
        let a = ResidencyRepo::insert(&conn, &new_residency(1, 1, at(8, 0))).unwrap();
        let b = ResidencyRepo::insert(&conn, &new_residency(2, 1, at(9, 0))).unwrap();
        let c = ResidencyRepo::insert(&conn, &new_residency(3, 1, at(7, 0))).unwrap();

        let mut closed = ResidencyRepo::get_by_id(&conn, c).unwrap().unwrap();
        closed.ts_out = Some(at(9, 30));
        let _ = ResidencyRepo::update_by_id(&conn, &closed).unwrap();

        let ids: Vec<i64> = ResidencyRepo::list_open(&conn)
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![b, a]);
    }

    #[test]
    fn list_by_key_returns_history_oldest_first() {
        let conn = setup();
        let first = ResidencyRepo::insert(&conn, &new_residency(5, 10, at(1, 0))).unwrap();
        let _other_zone = ResidencyRepo::insert(&conn, &new_residency(5, 11, at(2, 0))).unwrap();
        let second = ResidencyRepo::insert(&conn, &new_residency(5, 10, at(3, 0))).unwrap();

        let history = ResidencyRepo::list_by_key(&conn, ResidencyKey::new(Mmsi(5), ZoneId(10)))
            .unwrap();
        let ids: Vec<i64> = history.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn count_open_by_zone_groups() {
        let conn = setup();
        let _ = ResidencyRepo::insert(&conn, &new_residency(1, 3, at(1, 0))).unwrap();
        let _ = ResidencyRepo::insert(&conn, &new_residency(2, 3, at(1, 0))).unwrap();
        let closed = ResidencyRepo::insert(&conn, &new_residency(3, 3, at(1, 0))).unwrap();
        let _ = ResidencyRepo::insert(&conn, &new_residency(1, 10, at(1, 0))).unwrap();

        let mut record = ResidencyRepo::get_by_id(&conn, closed).unwrap().unwrap();
        record.ts_out = Some(at(2, 0));
        let _ = ResidencyRepo::update_by_id(&conn, &record).unwrap();

        let counts = ResidencyRepo::count_open_by_zone(&conn).unwrap();
        assert_eq!(counts, vec![(ZoneId(3), 2), (ZoneId(10), 1)]);
        let total: i64 = conn
            .query_row("SELECT COUNT(*) FROM vessel_in_zone", [], |row| row.get(0))
            .unwrap();
        assert_eq!(total, 4);
    }
}
