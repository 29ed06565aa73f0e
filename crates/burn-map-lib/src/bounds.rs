//! Extent of everything that renders
//!
//! Padding and zoom selection are view concerns and live in the rendering adapter.

use crate::{Coordinate, Ring};
use geo::{BoundingRect, MultiPoint, Rect};

/// Axis-aligned bounds in WGS84 degrees
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Center point of the box
    #[inline]
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    /// Check whether a coordinate lies inside the box (edges included)
    #[inline]
    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&coordinate.latitude)
            && (self.min_lon..=self.max_lon).contains(&coordinate.longitude)
    }
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        Self {
            min_lat: rect.min().y,
            max_lat: rect.max().y,
            min_lon: rect.min().x,
            max_lon: rect.max().x,
        }
    }
}

/// Compute the bounds of all shape vertices and cluster coordinates
///
/// Every ring vertex counts individually; each marker contributes its single coordinate.
/// Returns `None` when there is nothing to frame, leaving the default viewport to the caller.
pub fn compute_bounds<'a>(
    rings: impl IntoIterator<Item = &'a Ring>,
    markers: impl IntoIterator<Item = Coordinate>,
) -> Option<BoundingBox> {
    #[cfg(feature = "profiling")]
    profiling::scope!("bounds::compute_bounds");

    let coords: Vec<geo::Coord<f64>> = rings
        .into_iter()
        .flat_map(|ring| ring.coordinates().iter().copied())
        .chain(markers)
        .map(geo::Coord::from)
        .collect();

    MultiPoint::from(coords)
        .bounding_rect()
        .map(BoundingBox::from)
}
