//! Catalog loading errors.
//!
//! Every [`CatalogError`] is fatal at startup: a catalog that fails to load
//! never reaches the poll loop.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or validating the zone catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read zone catalog {path}: {source}")]
    Io {
        /// File that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The catalog is not valid JSON or not a GeoJSON feature collection.
    #[error("malformed zone catalog: {0}")]
    Json(#[from] serde_json::Error),

    /// The top-level object is not a `FeatureCollection`.
    #[error("expected a GeoJSON FeatureCollection, found {0}")]
    NotFeatureCollection(String),

    /// A feature carries a geometry type other than Polygon or `MultiPolygon`.
    #[error("feature {feature}: unsupported geometry type {geometry_type}")]
    UnsupportedGeometry {
        /// Index of the offending feature.
        feature: usize,
        /// The geometry type found.
        geometry_type: String,
    },

    /// A ring, coordinate, or polygon failed validation.
    #[error("feature {feature}: invalid geometry: {reason}")]
    InvalidGeometry {
        /// Index of the offending feature.
        feature: usize,
        /// What was wrong.
        reason: String,
    },

    /// A feature is neither a zone nor the screening region.
    #[error("feature {feature}: missing zoneId property")]
    MissingZoneId {
        /// Index of the offending feature.
        feature: usize,
    },

    /// The zone id is outside the known set (0 through 11).
    #[error("feature {feature}: unknown zone id {zone_id}")]
    UnknownZoneId {
        /// Index of the offending feature.
        feature: usize,
        /// Id as found in the file.
        zone_id: i64,
    },

    /// Two features declare the same zone id.
    #[error("duplicate zone id {0}")]
    DuplicateZoneId(u8),

    /// More than one feature is marked as the screening region.
    #[error("more than one screening region")]
    DuplicateScreeningRegion,

    /// No zone features were found.
    #[error("zone catalog contains no zones")]
    Empty,
}

/// Convenience alias for catalog results.
pub type Result<T> = std::result::Result<T, CatalogError>;
