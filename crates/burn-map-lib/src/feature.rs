//! Burn record data model and feature classification
//!
//! A [`FeatureRecord`] is what the data layer hands over; a [`Feature`] is the same record
//! with its geometry decoded once. Features are never mutated: a new pipeline run builds
//! a new set.

use crate::validate::{is_renderable_ring, is_valid_coordinate};
use crate::wkt::{self, DecodeWarning, ParsedGeometry, Ring};
use std::fmt;

/// Identifier of a burn record
pub type FeatureId = i64;

/// Identifier of the owning entity (commune)
pub type EntityId = i64;

/// WGS84 coordinate in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    #[cfg_attr(feature = "serde", serde(rename = "lat"))]
    pub latitude: f64,
    #[cfg_attr(feature = "serde", serde(rename = "lon"))]
    pub longitude: f64,
}

impl Coordinate {
    #[inline]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<Coordinate> for geo::Coord<f64> {
    #[inline]
    fn from(coordinate: Coordinate) -> Self {
        geo::Coord {
            x: coordinate.longitude,
            y: coordinate.latitude,
        }
    }
}

impl From<geo::Coord<f64>> for Coordinate {
    #[inline]
    fn from(coord: geo::Coord<f64>) -> Self {
        Self::new(coord.y, coord.x)
    }
}

/// Burn status as sent by the API (`EN_COURS`, `TERMINE`, ...)
///
/// Unknown values are kept verbatim; they only affect palette lookup.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct StatusCode(String);

impl StatusCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StatusCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One burn record as supplied by the data layer
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct FeatureRecord {
    pub id: FeatureId,
    pub status: StatusCode,
    pub surface_area: f64,
    /// Commune identifier
    pub owner_key: EntityId,
    /// Representative coordinate of the commune, used when the parcel geometry is unusable
    pub owner_coordinate: Option<Coordinate>,
    /// Raw WKT, possibly SRID-prefixed
    pub geometry_wkt: Option<String>,
}

/// A burn record with decoded geometry
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    pub id: FeatureId,
    pub status: StatusCode,
    pub surface_area: f64,
    pub owner_key: EntityId,
    pub geometry: Option<ParsedGeometry>,
    /// SRID found in the geometry prefix, if any
    pub srid: Option<i32>,
    /// Owner coordinate exactly as received; range checks happen during grouping
    pub fallback_coordinate: Option<Coordinate>,
}

impl Feature {
    /// Decode a record, returning the feature and any token-level decode warnings
    pub fn from_record(record: &FeatureRecord) -> (Self, Vec<DecodeWarning>) {
        let (geometry, srid, warnings) = match record.geometry_wkt.as_deref() {
            Some(raw) => {
                let decoded = wkt::decode(raw);
                (Some(decoded.geometry), decoded.srid, decoded.warnings)
            }
            None => (None, None, Vec::new()),
        };

        let feature = Self {
            id: record.id,
            status: record.status.clone(),
            surface_area: record.surface_area,
            owner_key: record.owner_key,
            geometry,
            srid,
            fallback_coordinate: record.owner_coordinate,
        };
        (feature, warnings)
    }
}

/// How a feature will appear on the map
///
/// `shape` and `marker` are independent: a parcel with both a polygon and a commune
/// coordinate is drawn as a polygon and also counted in its commune's cluster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification<'a> {
    /// Ring to draw as a filled polygon
    pub shape: Option<&'a Ring>,
    /// Coordinate contributing to the owner's cluster
    pub marker: Option<Coordinate>,
}

impl Classification<'_> {
    #[inline]
    pub fn is_shape(&self) -> bool {
        self.shape.is_some()
    }

    #[inline]
    pub fn is_marker_candidate(&self) -> bool {
        self.marker.is_some()
    }

    /// Neither drawable nor placeable; excluded from the plan
    #[inline]
    pub fn is_unrenderable(&self) -> bool {
        self.shape.is_none() && self.marker.is_none()
    }
}

/// Classify a feature into shape and/or marker candidate
///
/// A decoded `POINT` stands in for a missing or out-of-range owner coordinate. An
/// out-of-range owner coordinate with no point to replace it is still returned so that
/// grouping can report it.
pub fn classify(feature: &Feature) -> Classification<'_> {
    let shape = match &feature.geometry {
        Some(ParsedGeometry::Polygon(polygon)) if is_renderable_ring(polygon.exterior()) => {
            Some(polygon.exterior())
        }
        Some(ParsedGeometry::Polygon(_) | ParsedGeometry::Point(_) | ParsedGeometry::Invalid(_))
        | None => None,
    };

    let point = match &feature.geometry {
        Some(ParsedGeometry::Point(point)) => Some(*point),
        Some(ParsedGeometry::Polygon(_) | ParsedGeometry::Invalid(_)) | None => None,
    };
    let marker = match (feature.fallback_coordinate, point) {
        (Some(coordinate), _) if is_valid_coordinate(&coordinate) => Some(coordinate),
        (_, Some(point)) => Some(point),
        (fallback, None) => fallback,
    };

    Classification { shape, marker }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = "SRID=4326;MULTIPOLYGON(((2.4 42.6, 2.5 42.6, 2.5 42.7, 2.4 42.6)))";

    fn record(wkt: Option<&str>, owner_coordinate: Option<Coordinate>) -> FeatureRecord {
        FeatureRecord {
            id: 1,
            status: StatusCode::from("EN_COURS"),
            surface_area: 1.5,
            owner_key: 7,
            owner_coordinate,
            geometry_wkt: wkt.map(str::to_string),
        }
    }

    #[test]
    fn test_from_record_decodes_geometry() {
        let (feature, warnings) = Feature::from_record(&record(Some(SQUARE), None));

        assert!(warnings.is_empty());
        assert_eq!(feature.id, 1);
        assert!(matches!(feature.geometry, Some(ParsedGeometry::Polygon(_))));
    }

    #[test]
    fn test_from_record_forwards_decode_warnings() {
        let (feature, warnings) =
            Feature::from_record(&record(Some("POLYGON((1 1, bad, 2 2, 3 3))"), None));

        assert_eq!(warnings.len(), 1);
        assert!(classify(&feature).is_shape());
    }

    #[test]
    fn test_classify_shape_only() {
        let (feature, _) = Feature::from_record(&record(Some(SQUARE), None));
        let classification = classify(&feature);

        assert!(classification.is_shape());
        assert!(!classification.is_marker_candidate());
        assert_eq!(classification.shape.map(Ring::len), Some(4));
    }

    #[test]
    fn test_classify_shape_and_marker() {
        let commune = Coordinate::new(42.65, 2.45);
        let (feature, _) = Feature::from_record(&record(Some(SQUARE), Some(commune)));
        let classification = classify(&feature);

        assert!(classification.is_shape());
        assert_eq!(classification.marker, Some(commune));
    }

    #[test]
    fn test_classify_invalid_geometry_falls_back_to_marker() {
        let commune = Coordinate::new(42.65, 2.45);
        let (feature, _) = Feature::from_record(&record(
            Some("MULTIPOLYGON(((2.4 42.6, abc 42.6)))"),
            Some(commune),
        ));
        let classification = classify(&feature);

        assert!(!classification.is_shape());
        assert_eq!(classification.marker, Some(commune));
    }

    #[test]
    fn test_classify_point_geometry_as_marker() {
        let (feature, _) = Feature::from_record(&record(Some("POINT(2.4 42.6)"), None));
        let classification = classify(&feature);

        assert!(!classification.is_shape());
        assert_eq!(classification.marker, Some(Coordinate::new(42.6, 2.4)));
    }

    #[test]
    fn test_classify_point_replaces_out_of_range_owner_coordinate() {
        let (feature, _) = Feature::from_record(&record(
            Some("POINT(2.4 42.6)"),
            Some(Coordinate::new(95.0, 2.4)),
        ));
        assert_eq!(classify(&feature).marker, Some(Coordinate::new(42.6, 2.4)));

        let (feature, _) = Feature::from_record(&record(None, Some(Coordinate::new(95.0, 2.4))));
        assert_eq!(classify(&feature).marker, Some(Coordinate::new(95.0, 2.4)));
    }

    #[test]
    fn test_from_record_keeps_srid() {
        let (feature, _) = Feature::from_record(&record(Some(SQUARE), None));
        assert_eq!(feature.srid, Some(4326));

        let (feature, _) = Feature::from_record(&record(Some("POINT(2.4 42.6)"), None));
        assert_eq!(feature.srid, None);
    }

    #[test]
    fn test_classify_unrenderable() {
        let (feature, _) = Feature::from_record(&record(None, None));
        assert!(classify(&feature).is_unrenderable());

        let (feature, _) = Feature::from_record(&record(Some("garbage"), None));
        assert!(classify(&feature).is_unrenderable());
    }

    #[test]
    fn test_geo_coord_conversion_swaps_axes() {
        let coord: geo::Coord<f64> = Coordinate::new(42.6, 2.4).into();
        assert_eq!(coord.x, 2.4);
        assert_eq!(coord.y, 42.6);
        assert_eq!(Coordinate::from(coord), Coordinate::new(42.6, 2.4));
    }
}
