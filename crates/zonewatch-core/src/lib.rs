//! # zonewatch-core
//!
//! Foundation types for the zonewatch residency tracker.
//!
//! - **Identifiers**: [`ids::Mmsi`] and [`ids::ZoneId`] as newtypes
//! - **Zones**: [`zone::Zone`] with its [`zone::ZoneKind`] derived from the id
//! - **Catalog**: [`catalog::ZoneCatalog`], loaded once from GeoJSON and never mutated
//! - **Containment**: [`containment::ContainmentEvaluator`] and the planar default
//! - **Samples and records**: [`position::PositionSample`], [`residency::ResidencyRecord`]
//! - **Errors**: [`errors::CatalogError`]
//! - **Logging**: [`logging::init_subscriber`]
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other zonewatch crates.

#![deny(unsafe_code)]

pub mod catalog;
pub mod constants;
pub mod containment;
pub mod errors;
pub mod ids;
pub mod logging;
pub mod position;
pub mod residency;
pub mod zone;

pub use catalog::ZoneCatalog;
pub use containment::{ContainmentEvaluator, PlanarContainment};
pub use errors::CatalogError;
pub use ids::{Mmsi, ZoneId};
pub use logging::LogFormat;
pub use position::PositionSample;
pub use residency::{NewResidency, ResidencyKey, ResidencyRecord};
pub use zone::{LaneDirection, Zone, ZoneKind};
