//! Per-cycle snapshot of open residencies.
//!
//! Built once at the start of a cycle and never refreshed inside it. Every
//! state lookup during the cycle reads from here, never from the store.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::warn;
use zonewatch_core::{ResidencyKey, ResidencyRecord};

/// Read-only map from `(mmsi, zone)` to its open residency.
#[derive(Clone, Debug, Default)]
pub struct OpenResidencySnapshot {
    records: HashMap<ResidencyKey, ResidencyRecord>,
    shadowed: usize,
}

impl OpenResidencySnapshot {
    /// Index open records by key.
    ///
    /// Closed records are ignored. When several open records share a key the
    /// one with the latest `ts_detected` wins (higher id breaks ties) and the
    /// rest are counted as shadowed.
    pub fn from_records(records: impl IntoIterator<Item = ResidencyRecord>) -> Self {
        let mut map: HashMap<ResidencyKey, ResidencyRecord> = HashMap::new();
        let mut shadowed_by_key: HashMap<ResidencyKey, usize> = HashMap::new();

        for record in records.into_iter().filter(ResidencyRecord::is_open) {
            match map.entry(record.key()) {
                Entry::Vacant(slot) => {
                    let _ = slot.insert(record);
                }
                Entry::Occupied(mut slot) => {
                    *shadowed_by_key.entry(record.key()).or_default() += 1;
                    let current = slot.get();
                    if (record.ts_detected, record.id) > (current.ts_detected, current.id) {
                        let _ = slot.insert(record);
                    }
                }
            }
        }

        for (key, count) in &shadowed_by_key {
            warn!(
                mmsi = %key.mmsi,
                zone_id = %key.zone_id,
                shadowed = count,
                "multiple open residencies for one key, using the latest"
            );
        }

        Self {
            records: map,
            shadowed: shadowed_by_key.values().sum(),
        }
    }

    /// The open residency for `key`, if any.
    pub fn get(&self, key: &ResidencyKey) -> Option<&ResidencyRecord> {
        self.records.get(key)
    }

    /// Whether `key` is PRESENT.
    pub fn contains(&self, key: &ResidencyKey) -> bool {
        self.records.contains_key(key)
    }

    /// Number of keys with an open residency.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing is open.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Open records hidden behind a newer one for the same key.
    pub fn shadowed(&self) -> usize {
        self.shadowed
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use zonewatch_core::{Mmsi, ZoneId};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, hour, 0, 0).unwrap()
    }

    fn record(id: i64, mmsi: i64, zone: u8, detected: u32, out: Option<u32>) -> ResidencyRecord {
        ResidencyRecord {
            id,
            mmsi: Mmsi(mmsi),
            zone_id: ZoneId(zone),
            ts_detected: at(detected),
            ts_current: at(detected),
            ts_out: out.map(at),
            longitude: 0.0,
            latitude: 0.0,
            nav_status: 0,
            nav_status_desc: String::new(),
        }
    }

    #[test]
    fn indexes_open_records_by_key() {
        let snapshot =
            OpenResidencySnapshot::from_records(vec![record(1, 10, 1, 0, None), record(2, 10, 2, 0, None)]);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot.get(&ResidencyKey::new(Mmsi(10), ZoneId(2))).unwrap().id,
            2
        );
        assert!(!snapshot.contains(&ResidencyKey::new(Mmsi(10), ZoneId(3))));
        assert_eq!(snapshot.shadowed(), 0);
    }

    #[test]
    fn ignores_closed_records() {
        let snapshot = OpenResidencySnapshot::from_records(vec![record(1, 10, 1, 0, Some(2))]);
        assert!(snapshot.is_empty());
    }

    #[test]
    fn duplicate_open_keeps_latest_detection() {
        let snapshot = OpenResidencySnapshot::from_records(vec![
            record(1, 10, 1, 5, None),
            record(2, 10, 1, 9, None),
            record(3, 10, 1, 7, None),
        ]);
        let key = ResidencyKey::new(Mmsi(10), ZoneId(1));
        assert_eq!(snapshot.get(&key).unwrap().id, 2);
        assert_eq!(snapshot.shadowed(), 2);
    }

    #[test]
    fn duplicate_with_equal_detection_prefers_higher_id() {
        let snapshot = OpenResidencySnapshot::from_records(vec![
            record(8, 10, 1, 5, None),
            record(4, 10, 1, 5, None),
        ]);
        let key = ResidencyKey::new(Mmsi(10), ZoneId(1));
        assert_eq!(snapshot.get(&key).unwrap().id, 8);
    }
}
