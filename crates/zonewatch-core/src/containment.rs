//! Point-in-zone containment.
//!
//! Containment is planar: longitude is x, latitude is y. A point lying exactly
//! on a zone boundary is outside, matching `ST_Within` semantics. Holes
//! (interior rings) are excluded from the zone.

use geo::{Contains, MultiPolygon, Point};

use crate::zone::Zone;

/// Evaluates whether a point lies inside a zone.
///
/// Implementations must be pure: the same zone and point always yield the
/// same answer, and evaluating one zone never affects another.
pub trait ContainmentEvaluator {
    /// Whether `point` lies strictly inside `zone`.
    fn contains(&self, zone: &Zone, point: Point<f64>) -> bool;
}

/// Planar point-in-polygon evaluator backed by `geo`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlanarContainment;

impl ContainmentEvaluator for PlanarContainment {
    fn contains(&self, zone: &Zone, point: Point<f64>) -> bool {
        polygon_contains(&zone.polygon, point)
    }
}

/// Strict-interior test against a multipolygon.
#[must_use]
pub fn polygon_contains(polygon: &MultiPolygon<f64>, point: Point<f64>) -> bool {
    if !point.x().is_finite() || !point.y().is_finite() {
        return false;
    }
    polygon.contains(&point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, Polygon};
    use proptest::prelude::*;

    use crate::ids::ZoneId;
    use crate::zone::ZoneKind;

    fn square_zone(min: f64, max: f64) -> Zone {
        let ring = LineString::from(vec![
            (min, min),
            (max, min),
            (max, max),
            (min, max),
            (min, min),
        ]);
        Zone {
            id: ZoneId(1),
            kind: ZoneKind::Sector(1),
            name: "Sector 1".into(),
            polygon: MultiPolygon::new(vec![Polygon::new(ring, vec![])]),
        }
    }

    #[test]
    fn interior_point_is_inside() {
        let zone = square_zone(0.0, 10.0);
        assert!(PlanarContainment.contains(&zone, Point::new(5.0, 5.0)));
    }

    #[test]
    fn exterior_point_is_outside() {
        let zone = square_zone(0.0, 10.0);
        assert!(!PlanarContainment.contains(&zone, Point::new(11.0, 5.0)));
        assert!(!PlanarContainment.contains(&zone, Point::new(-0.5, -0.5)));
    }

    #[test]
    fn boundary_point_is_outside() {
        let zone = square_zone(0.0, 10.0);
        assert!(!PlanarContainment.contains(&zone, Point::new(0.0, 5.0)));
        assert!(!PlanarContainment.contains(&zone, Point::new(10.0, 10.0)));
    }

    #[test]
    fn hole_is_excluded() {
        let outer = LineString::from(vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ]);
        let hole = LineString::from(vec![
            (4.0, 4.0),
            (6.0, 4.0),
            (6.0, 6.0),
            (4.0, 6.0),
            (4.0, 4.0),
        ]);
        let polygon = MultiPolygon::new(vec![Polygon::new(outer, vec![hole])]);
        assert!(!polygon_contains(&polygon, Point::new(5.0, 5.0)));
        assert!(polygon_contains(&polygon, Point::new(2.0, 2.0)));
    }

    #[test]
    fn nan_point_is_outside() {
        let zone = square_zone(0.0, 10.0);
        assert!(!PlanarContainment.contains(&zone, Point::new(f64::NAN, 5.0)));
    }

    proptest! {
        #[test]
        fn strict_interior_of_square(x in 0.001f64..9.999, y in 0.001f64..9.999) {
            let zone = square_zone(0.0, 10.0);
            prop_assert!(PlanarContainment.contains(&zone, Point::new(x, y)));
        }

        #[test]
        fn far_points_never_inside(x in 20.0f64..180.0, y in -90.0f64..90.0) {
            let zone = square_zone(0.0, 10.0);
            prop_assert!(!PlanarContainment.contains(&zone, Point::new(x, y)));
        }
    }
}
