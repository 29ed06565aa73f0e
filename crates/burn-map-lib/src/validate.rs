//! Coordinate range and ring predicates
//!
//! Pure functions shared by the WKT decoder, the grouping engine and the feature
//! classifier. Bounds are inclusive; NaN never passes.

use crate::{Coordinate, Ring};

/// Minimum number of valid points for a ring to be drawn as a polygon
pub const MIN_RING_POINTS: usize = 3;

/// Latitude bounds in degrees (WGS84)
pub const MAX_LATITUDE: f64 = 90.0;

/// Longitude bounds in degrees (WGS84)
pub const MAX_LONGITUDE: f64 = 180.0;

/// Check that a latitude is within `[-90, 90]`
#[inline(always)]
pub fn is_valid_latitude(latitude: f64) -> bool {
    (-MAX_LATITUDE..=MAX_LATITUDE).contains(&latitude)
}

/// Check that a longitude is within `[-180, 180]`
#[inline(always)]
pub fn is_valid_longitude(longitude: f64) -> bool {
    (-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&longitude)
}

/// Check both axes of a coordinate
#[inline(always)]
pub fn is_valid_coordinate(coordinate: &Coordinate) -> bool {
    is_valid_latitude(coordinate.latitude) && is_valid_longitude(coordinate.longitude)
}

/// A ring renders only with at least [`MIN_RING_POINTS`] points, all of them valid
pub fn is_renderable_ring(ring: &Ring) -> bool {
    ring.len() >= MIN_RING_POINTS && ring.coordinates().iter().all(is_valid_coordinate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latitude_bounds_are_inclusive() {
        assert!(is_valid_latitude(90.0));
        assert!(is_valid_latitude(-90.0));
        assert!(is_valid_latitude(0.0));
        assert!(!is_valid_latitude(90.0001));
        assert!(!is_valid_latitude(-90.0001));
    }

    #[test]
    fn test_longitude_bounds_are_inclusive() {
        assert!(is_valid_longitude(180.0));
        assert!(is_valid_longitude(-180.0));
        assert!(!is_valid_longitude(180.0001));
        assert!(!is_valid_longitude(-180.0001));
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        assert!(!is_valid_latitude(f64::NAN));
        assert!(!is_valid_longitude(f64::INFINITY));
        assert!(!is_valid_coordinate(&Coordinate::new(f64::NAN, 0.0)));
    }

    #[test]
    fn test_renderable_ring() {
        let triangle = Ring::new(vec![
            Coordinate::new(42.6, 2.4),
            Coordinate::new(42.6, 2.5),
            Coordinate::new(42.7, 2.5),
        ]);
        assert!(is_renderable_ring(&triangle));

        let segment = Ring::new(vec![Coordinate::new(42.6, 2.4), Coordinate::new(42.6, 2.5)]);
        assert!(!is_renderable_ring(&segment));

        let with_invalid = Ring::new(vec![
            Coordinate::new(42.6, 2.4),
            Coordinate::new(95.0, 2.5),
            Coordinate::new(42.7, 2.5),
        ]);
        assert!(!is_renderable_ring(&with_invalid));
    }
}
