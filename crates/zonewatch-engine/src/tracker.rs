//! Residency state machine.
//!
//! For each sample and each zone in catalog order:
//!
//! | State   | Sample  | Action                                         |
//! |---------|---------|------------------------------------------------|
//! | ABSENT  | inside  | insert, `ts_detected = ts_current = ts`        |
//! | ABSENT  | outside | nothing                                        |
//! | PRESENT | inside  | refresh `ts_current` and position; dwell check |
//! | PRESENT | outside | close with `ts_out = ts`                       |
//!
//! PRESENT means the cycle snapshot holds an open record for the key. The
//! tracker only appends to [`PendingChanges`]; it never touches storage.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use zonewatch_core::{
    ContainmentEvaluator, NewResidency, PositionSample, ResidencyKey, ResidencyRecord, Zone,
    ZoneCatalog,
};

use crate::snapshot::OpenResidencySnapshot;

/// Outcome of evaluating one sample against one zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// ABSENT and outside.
    Ignore,
    /// ABSENT and inside: a new residency.
    Enter,
    /// PRESENT and inside: position refreshed.
    Refresh,
    /// PRESENT and inside a TSS lane past the dwell limit: refreshed and closed at `now`.
    DwellTimeout,
    /// PRESENT and outside: closed at the sample time.
    Exit,
}

/// Inserts and updates waiting for the next flush.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PendingChanges {
    /// New open residencies.
    pub inserts: Vec<NewResidency>,
    /// Full-row rewrites of existing residencies.
    pub updates: Vec<ResidencyRecord>,
}

impl PendingChanges {
    /// Whether there is nothing to write.
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty()
    }

    /// Updates that close their residency.
    pub fn closed(&self) -> usize {
        self.updates.iter().filter(|r| !r.is_open()).count()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.inserts.clear();
        self.updates.clear();
    }
}

/// Applies the state machine for one cycle.
pub struct ResidencyTracker<'a, C> {
    catalog: &'a ZoneCatalog,
    evaluator: &'a C,
    snapshot: &'a OpenResidencySnapshot,
    now: DateTime<Utc>,
    dwell_limit: Duration,
}

impl<'a, C: ContainmentEvaluator> ResidencyTracker<'a, C> {
    /// Bind the tracker to one cycle's catalog, snapshot, and clock reading.
    pub fn new(
        catalog: &'a ZoneCatalog,
        evaluator: &'a C,
        snapshot: &'a OpenResidencySnapshot,
        now: DateTime<Utc>,
        dwell_limit: Duration,
    ) -> Self {
        Self {
            catalog,
            evaluator,
            snapshot,
            now,
            dwell_limit,
        }
    }

    /// Evaluate one sample against every zone, appending to `pending`.
    pub fn apply_all(&self, sample: &PositionSample, pending: &mut PendingChanges) {
        let point = sample.point();
        for zone in self.catalog {
            let inside = self.evaluator.contains(zone, point);
            let _ = self.apply(zone, sample, inside, pending);
        }
    }

    /// Like [`apply_all`](Self::apply_all), returning the decision per zone
    /// in catalog order.
    pub fn process(&self, sample: &PositionSample, pending: &mut PendingChanges) -> Vec<Decision> {
        let point = sample.point();
        self.catalog
            .iter()
            .map(|zone| {
                let inside = self.evaluator.contains(zone, point);
                self.apply(zone, sample, inside, pending)
            })
            .collect()
    }

    fn apply(
        &self,
        zone: &Zone,
        sample: &PositionSample,
        inside: bool,
        pending: &mut PendingChanges,
    ) -> Decision {
        let key = ResidencyKey::new(sample.mmsi, zone.id);
        let open = self.snapshot.get(&key);

        match (open, inside) {
            (None, false) => Decision::Ignore,
            (None, true) => {
                debug!(mmsi = %sample.mmsi, zone_id = %zone.id, ts = %sample.ts, "vessel entered zone");
                pending.inserts.push(NewResidency::from_sample(sample, zone.id));
                Decision::Enter
            }
            (Some(record), true) => {
                let mut updated = record.clone();
                updated.refresh(sample);
                let decision = if zone.is_tss_lane() && self.now - record.ts_detected > self.dwell_limit {
                    updated.ts_out = Some(self.now);
                    debug!(
                        mmsi = %sample.mmsi,
                        zone_id = %zone.id,
                        id = record.id,
                        detected = %record.ts_detected,
                        "tss dwell limit exceeded, closing residency"
                    );
                    Decision::DwellTimeout
                } else {
                    debug!(mmsi = %sample.mmsi, zone_id = %zone.id, id = record.id, "vessel still in zone");
                    Decision::Refresh
                };
                pending.updates.push(updated);
                decision
            }
            (Some(record), false) => {
                let mut updated = record.clone();
                updated.ts_out = Some(sample.ts);
                debug!(mmsi = %sample.mmsi, zone_id = %zone.id, id = record.id, ts = %sample.ts, "vessel left zone");
                pending.updates.push(updated);
                Decision::Exit
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use zonewatch_core::{Mmsi, PlanarContainment, ZoneId};

    // Zone 1 covers [103.5, 104.0] x [1.0, 1.4]; zone 10 covers [103.0, 105.0] x [1.0, 2.0].
    fn catalog() -> ZoneCatalog {
        let square = |a: f64, b: f64, c: f64, d: f64| {
            json!([[[a, b], [c, b], [c, d], [a, d], [a, b]]])
        };
        let text = json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": { "zoneId": 1 },
                  "geometry": { "type": "Polygon", "coordinates": square(103.5, 1.0, 104.0, 1.4) } },
                { "type": "Feature", "properties": { "zoneId": 10 },
                  "geometry": { "type": "Polygon", "coordinates": square(103.0, 1.0, 105.0, 2.0) } }
            ]
        })
        .to_string();
        ZoneCatalog::from_geojson_str(&text).unwrap()
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, hour, 0, 0).unwrap()
    }

    fn sample(hour: u32, lon: f64, lat: f64) -> PositionSample {
        PositionSample {
            mmsi: Mmsi(123_456_789),
            ts: at(hour),
            longitude: lon,
            latitude: lat,
            nav_status: 0,
            nav_status_desc: "Under way using engine".into(),
            cog: 10.0,
        }
    }

    fn open(id: i64, zone: u8, detected: u32) -> ResidencyRecord {
        NewResidency::from_sample(&sample(detected, 103.8, 1.2), ZoneId(zone)).with_id(id)
    }

    fn run(
        snapshot: &OpenResidencySnapshot,
        now: DateTime<Utc>,
        s: &PositionSample,
    ) -> (Vec<Decision>, PendingChanges) {
        let catalog = catalog();
        let tracker =
            ResidencyTracker::new(&catalog, &PlanarContainment, snapshot, now, Duration::hours(6));
        let mut pending = PendingChanges::default();
        let decisions = tracker.process(s, &mut pending);
        (decisions, pending)
    }

    #[test]
    fn absent_inside_inserts() {
        let snapshot = OpenResidencySnapshot::default();
        let (decisions, pending) = run(&snapshot, at(1), &sample(1, 103.8, 1.2));
        assert_eq!(decisions, vec![Decision::Enter, Decision::Enter]);
        assert_eq!(pending.inserts.len(), 2);
        let first = &pending.inserts[0];
        assert_eq!(first.zone_id, ZoneId(1));
        assert_eq!(first.ts_detected, at(1));
        assert_eq!(first.ts_current, at(1));
        assert!(pending.updates.is_empty());
    }

    #[test]
    fn absent_outside_is_noop() {
        let snapshot = OpenResidencySnapshot::default();
        let (decisions, pending) = run(&snapshot, at(1), &sample(1, 110.0, 1.2));
        assert_eq!(decisions, vec![Decision::Ignore, Decision::Ignore]);
        assert!(pending.is_empty());
    }

    #[test]
    fn present_inside_refreshes_without_closing() {
        let snapshot = OpenResidencySnapshot::from_records(vec![open(7, 1, 0)]);
        let (decisions, pending) = run(&snapshot, at(30), &sample(29, 103.9, 1.3));
        assert_eq!(decisions[0], Decision::Refresh);
        let update = &pending.updates[0];
        assert_eq!(update.id, 7);
        assert_eq!(update.ts_current, at(29));
        assert_eq!(update.ts_detected, at(0));
        assert!((update.longitude - 103.9).abs() < f64::EPSILON);
        assert!(update.is_open());
    }

    #[test]
    fn present_outside_closes_at_sample_time() {
        let snapshot = OpenResidencySnapshot::from_records(vec![open(7, 1, 0)]);
        let (decisions, pending) = run(&snapshot, at(3), &sample(2, 104.5, 1.5));
        assert_eq!(decisions[0], Decision::Exit);
        let update = &pending.updates[0];
        assert_eq!(update.ts_out, Some(at(2)));
        assert_eq!(update.ts_current, at(0));
        assert_eq!(pending.closed(), 1);
    }

    #[test]
    fn tss_lane_past_dwell_limit_closes_at_now() {
        let snapshot = OpenResidencySnapshot::from_records(vec![open(9, 10, 0)]);
        let now = at(7);
        let (decisions, pending) = run(&snapshot, now, &sample(6, 104.5, 1.5));
        assert_eq!(decisions[1], Decision::DwellTimeout);
        let update = &pending.updates[0];
        assert_eq!(update.ts_out, Some(now));
        assert_eq!(update.ts_current, at(6));
    }

    #[test]
    fn southbound_lane_past_dwell_limit_closes_at_now() {
        let text = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature", "properties": { "zoneId": 11 },
                "geometry": { "type": "Polygon", "coordinates":
                    [[[103.0, 1.0], [105.0, 1.0], [105.0, 2.0], [103.0, 2.0], [103.0, 1.0]]] }
            }]
        })
        .to_string();
        let catalog = ZoneCatalog::from_geojson_str(&text).unwrap();
        let snapshot = OpenResidencySnapshot::from_records(vec![open(12, 11, 0)]);
        let tracker =
            ResidencyTracker::new(&catalog, &PlanarContainment, &snapshot, at(8), Duration::hours(6));

        let mut pending = PendingChanges::default();
        let decisions = tracker.process(&sample(7, 104.5, 1.5), &mut pending);
        assert_eq!(decisions, vec![Decision::DwellTimeout]);
        assert_eq!(pending.updates[0].id, 12);
        assert_eq!(pending.updates[0].ts_out, Some(at(8)));
        assert_eq!(pending.updates[0].ts_current, at(7));

        let mut pending = PendingChanges::default();
        let tracker =
            ResidencyTracker::new(&catalog, &PlanarContainment, &snapshot, at(5), Duration::hours(6));
        assert_eq!(
            tracker.process(&sample(4, 104.5, 1.5), &mut pending),
            vec![Decision::Refresh]
        );
        assert!(pending.updates[0].is_open());
    }

    #[test]
    fn apply_all_matches_process() {
        let catalog = catalog();
        let snapshot = OpenResidencySnapshot::from_records(vec![open(3, 1, 0), open(9, 10, 0)]);
        let tracker =
            ResidencyTracker::new(&catalog, &PlanarContainment, &snapshot, at(7), Duration::hours(6));
        let s = sample(6, 104.5, 1.5);

        let mut collected = PendingChanges::default();
        let _ = tracker.process(&s, &mut collected);
        let mut applied = PendingChanges::default();
        tracker.apply_all(&s, &mut applied);

        assert_eq!(applied, collected);
        assert_eq!(applied.closed(), 2);
    }

    #[test]
    fn dwell_limit_is_strict() {
        let snapshot = OpenResidencySnapshot::from_records(vec![open(9, 10, 0)]);
        let (decisions, pending) = run(&snapshot, at(6), &sample(5, 104.5, 1.5));
        assert_eq!(decisions[1], Decision::Refresh);
        assert!(pending.updates[0].is_open());
    }

    #[test]
    fn sectors_never_time_out() {
        let snapshot = OpenResidencySnapshot::from_records(vec![open(3, 1, 0)]);
        let (decisions, _) = run(&snapshot, at(23), &sample(22, 103.8, 1.2));
        assert_eq!(decisions[0], Decision::Refresh);
    }

    #[test]
    fn zones_are_independent() {
        // Open in zone 1 only; the sample leaves zone 1 but stays in zone 10.
        let snapshot = OpenResidencySnapshot::from_records(vec![open(3, 1, 0)]);
        let (decisions, pending) = run(&snapshot, at(2), &sample(1, 104.5, 1.5));
        assert_eq!(decisions, vec![Decision::Exit, Decision::Enter]);
        assert_eq!(pending.updates.len(), 1);
        assert_eq!(pending.inserts.len(), 1);
        assert_eq!(pending.inserts[0].zone_id, ZoneId(10));
    }
}
