//! Immutable zone catalog loaded from GeoJSON.
//!
//! The catalog file is a GeoJSON `FeatureCollection`:
//!
//! ```json
//! {
//!   "type": "FeatureCollection",
//!   "features": [
//!     { "type": "Feature",
//!       "properties": { "zoneId": 1, "name": "Sector 1" },
//!       "geometry": { "type": "Polygon", "coordinates": [[[103.7, 1.1], ...]] } },
//!     { "type": "Feature",
//!       "properties": { "role": "screening" },
//!       "geometry": { "type": "Polygon", "coordinates": [...] } }
//!   ]
//! }
//! ```
//!
//! Features with a `zoneId` become zones, kept in file order. At most one
//! feature may carry `role: "screening"`; it bounds the area of interest and
//! is not itself a zone. Validation failures are fatal.

use std::collections::HashSet;
use std::path::Path;

use geo::{Coord, LineString, MultiPolygon, Point, Polygon};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::constants::SCREENING_ROLE;
use crate::containment::polygon_contains;
use crate::errors::{CatalogError, Result};
use crate::ids::ZoneId;
use crate::zone::{Zone, ZoneKind};

/// Ordered, read-only collection of zones.
#[derive(Clone, Debug)]
pub struct ZoneCatalog {
    zones: Vec<Zone>,
    screening_region: Option<MultiPolygon<f64>>,
}

impl ZoneCatalog {
    /// Build a catalog from already-constructed zones.
    ///
    /// Rejects duplicate ids and an empty zone list.
    pub fn new(zones: Vec<Zone>, screening_region: Option<MultiPolygon<f64>>) -> Result<Self> {
        if zones.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for zone in &zones {
            if !seen.insert(zone.id) {
                return Err(CatalogError::DuplicateZoneId(zone.id.get()));
            }
        }
        Ok(Self {
            zones,
            screening_region,
        })
    }

    /// Read and validate a catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_geojson_str(&content)?;
        info!(
            path = %path.display(),
            zones = catalog.len(),
            screening = catalog.screening_region.is_some(),
            "zone catalog loaded"
        );
        Ok(catalog)
    }

    /// Parse and validate a catalog from GeoJSON text.
    pub fn from_geojson_str(content: &str) -> Result<Self> {
        let collection: RawFeatureCollection = serde_json::from_str(content)?;
        if collection.kind != "FeatureCollection" {
            return Err(CatalogError::NotFeatureCollection(collection.kind));
        }

        let mut zones = Vec::new();
        let mut screening_region = None;

        for (index, feature) in collection.features.into_iter().enumerate() {
            let properties = feature.properties.unwrap_or_default();
            let polygon = parse_geometry(index, &feature.geometry)?;

            if is_screening(&properties) {
                if screening_region.is_some() {
                    return Err(CatalogError::DuplicateScreeningRegion);
                }
                screening_region = Some(polygon);
                continue;
            }

            let raw_id = properties
                .get("zoneId")
                .and_then(Value::as_i64)
                .ok_or(CatalogError::MissingZoneId { feature: index })?;
            let id = u8::try_from(raw_id)
                .ok()
                .map(ZoneId)
                .ok_or(CatalogError::UnknownZoneId {
                    feature: index,
                    zone_id: raw_id,
                })?;
            let kind = ZoneKind::from_id(id).ok_or(CatalogError::UnknownZoneId {
                feature: index,
                zone_id: raw_id,
            })?;
            let name = properties
                .get("name")
                .and_then(Value::as_str)
                .map_or_else(|| kind.default_name(), String::from);

            zones.push(Zone {
                id,
                kind,
                name,
                polygon,
            });
        }

        Self::new(zones, screening_region)
    }

    /// Zones in catalog order.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Iterate zones in catalog order.
    pub fn iter(&self) -> std::slice::Iter<'_, Zone> {
        self.zones.iter()
    }

    /// Number of zones.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether the catalog holds no zones. Always `false` for a loaded catalog.
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Look up a zone by id.
    pub fn get(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    /// The optional screening region.
    pub fn screening_region(&self) -> Option<&MultiPolygon<f64>> {
        self.screening_region.as_ref()
    }

    /// Whether a point falls inside the screening region.
    ///
    /// Without a screening region every point passes.
    pub fn in_screening_region(&self, point: Point<f64>) -> bool {
        self.screening_region
            .as_ref()
            .is_none_or(|region| polygon_contains(region, point))
    }
}

impl<'a> IntoIterator for &'a ZoneCatalog {
    type Item = &'a Zone;
    type IntoIter = std::slice::Iter<'a, Zone>;

    fn into_iter(self) -> Self::IntoIter {
        self.zones.iter()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GeoJSON parsing
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RawFeatureCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Deserialize)]
struct RawFeature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    geometry: RawGeometry,
}

#[derive(Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    geometry_type: String,
    coordinates: Value,
}

type RawRing = Vec<Vec<f64>>;

fn is_screening(properties: &Map<String, Value>) -> bool {
    properties.get("role").and_then(Value::as_str) == Some(SCREENING_ROLE)
}

fn parse_geometry(feature: usize, geometry: &RawGeometry) -> Result<MultiPolygon<f64>> {
    let invalid = |reason: String| CatalogError::InvalidGeometry { feature, reason };

    let polygons: Vec<Vec<RawRing>> = match geometry.geometry_type.as_str() {
        "Polygon" => {
            let rings: Vec<RawRing> = serde_json::from_value(geometry.coordinates.clone())
                .map_err(|e| invalid(format!("bad Polygon coordinates: {e}")))?;
            vec![rings]
        }
        "MultiPolygon" => serde_json::from_value(geometry.coordinates.clone())
            .map_err(|e| invalid(format!("bad MultiPolygon coordinates: {e}")))?,
        other => {
            return Err(CatalogError::UnsupportedGeometry {
                feature,
                geometry_type: other.to_string(),
            });
        }
    };

    if polygons.is_empty() {
        return Err(invalid("geometry has no polygons".into()));
    }

    let mut out = Vec::with_capacity(polygons.len());
    for rings in polygons {
        let mut rings = rings.into_iter();
        let exterior = rings
            .next()
            .ok_or_else(|| invalid("polygon has no exterior ring".into()))?;
        let exterior = parse_ring(&exterior).map_err(invalid)?;
        let interiors = rings
            .map(|ring| parse_ring(&ring).map_err(invalid))
            .collect::<Result<Vec<_>>>()?;
        out.push(Polygon::new(exterior, interiors));
    }
    Ok(MultiPolygon::new(out))
}

fn parse_ring(ring: &RawRing) -> std::result::Result<LineString<f64>, String> {
    if ring.len() < 4 {
        return Err(format!("ring has {} positions, need at least 4", ring.len()));
    }

    let mut coords = Vec::with_capacity(ring.len());
    for position in ring {
        let [lon, lat] = match position.as_slice() {
            [lon, lat, ..] => [*lon, *lat],
            _ => return Err("position has fewer than 2 values".into()),
        };
        if !lon.is_finite() || !lat.is_finite() {
            return Err("non-finite coordinate".into());
        }
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(format!("coordinate ({lon}, {lat}) out of range"));
        }
        coords.push(Coord { x: lon, y: lat });
    }

    if coords.first() != coords.last() {
        return Err("ring is not closed".into());
    }
    Ok(LineString::new(coords))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
