//! Tolerant WKT decoding
//!
//! Burn records carry parcel geometry as (possibly SRID-prefixed) WKT strings that are
//! frequently truncated or hand-edited upstream. The decoder never fails: a broken
//! coordinate token is skipped and reported as a [`DecodeWarning`], and a geometry that
//! cannot be salvaged decodes to [`ParsedGeometry::Invalid`] with a reason tag.
//!
//! Nesting is flattened: every parenthesis is stripped and all surviving
//! `"<lon> <lat>"` pairs form a single ring in encounter order.

use crate::Coordinate;
use crate::validate::{MIN_RING_POINTS, is_valid_latitude, is_valid_longitude};
use std::fmt;

/// Geometry keywords stripped from the front of the text
const KEYWORDS: &[&str] = &[
    "POINT",
    "MULTIPOINT",
    "LINESTRING",
    "MULTILINESTRING",
    "POLYGON",
    "MULTIPOLYGON",
];

/// Ordered sequence of coordinates describing a polygon boundary
///
/// The ring is stored as found: no closing point is added or removed.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct Ring(Vec<Coordinate>);

impl Ring {
    pub fn new(coordinates: Vec<Coordinate>) -> Self {
        Self(coordinates)
    }

    #[inline]
    pub fn coordinates(&self) -> &[Coordinate] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A polygon with a single exterior ring (the source data never carries holes)
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    exterior: Ring,
}

impl Polygon {
    pub fn new(exterior: Ring) -> Self {
        Self { exterior }
    }

    #[inline]
    pub fn exterior(&self) -> &Ring {
        &self.exterior
    }
}

/// Why a geometry string could not be turned into something drawable
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidReason {
    /// Nothing left once the SRID, keyword and parentheses are stripped
    Empty,
    /// Fewer than three coordinates survived validation
    InsufficientPoints { count: usize },
    /// A `POINT` or `MULTIPOINT` without a single usable coordinate
    InvalidPoint,
}

impl InvalidReason {
    /// Stable tag used in warnings
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::InsufficientPoints { .. } => "insufficient_points",
            Self::InvalidPoint => "invalid_point",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientPoints { count } => write!(f, "{} ({count})", self.tag()),
            _ => f.write_str(self.tag()),
        }
    }
}

/// Result of decoding one geometry string
#[derive(Clone, Debug, PartialEq)]
pub enum ParsedGeometry {
    Polygon(Polygon),
    Point(Coordinate),
    Invalid(InvalidReason),
}

impl ParsedGeometry {
    /// The polygon, if this geometry is one
    pub fn as_polygon(&self) -> Option<&Polygon> {
        match self {
            Self::Polygon(polygon) => Some(polygon),
            Self::Point(_) | Self::Invalid(_) => None,
        }
    }

    /// The failure reason, if decoding failed
    pub fn invalid_reason(&self) -> Option<InvalidReason> {
        match self {
            Self::Invalid(reason) => Some(*reason),
            Self::Polygon(_) | Self::Point(_) => None,
        }
    }
}

/// A non-fatal problem found while decoding
#[derive(Clone, Debug, PartialEq)]
pub enum DecodeWarning {
    /// Token with fewer than two parts, or parts that are not numbers
    MalformedToken { token: String },
    /// Numeric pair outside WGS84 ranges
    CoordinateOutOfRange { latitude: f64, longitude: f64 },
    /// `SRID=` prefix whose value is not an integer
    InvalidSrid { value: String },
}

/// Decoded geometry together with everything noticed along the way
#[derive(Clone, Debug, PartialEq)]
pub struct Decoded {
    pub geometry: ParsedGeometry,
    /// SRID from an `SRID=<int>;` prefix, if present and well formed
    pub srid: Option<i32>,
    pub warnings: Vec<DecodeWarning>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum GeometryKind {
    Point,
    Area,
}

/// Decode a raw WKT string
///
/// # Example
/// ```
/// use burn_map_lib::wkt::{decode, ParsedGeometry};
///
/// let decoded = decode("SRID=4326;MULTIPOLYGON(((2.4 42.6, 2.5 42.6, 2.5 42.7, 2.4 42.6)))");
/// assert_eq!(decoded.srid, Some(4326));
/// assert!(matches!(decoded.geometry, ParsedGeometry::Polygon(_)));
/// ```
pub fn decode(input: &str) -> Decoded {
    #[cfg(feature = "profiling")]
    profiling::scope!("wkt::decode");

    let mut warnings = Vec::new();
    let (srid, text) = split_srid(input.trim(), &mut warnings);
    let (kind, body) = split_keyword(text);

    let body: String = body.chars().filter(|c| !matches!(c, '(' | ')')).collect();
    let body = body.trim();
    if body.is_empty() || body.eq_ignore_ascii_case("EMPTY") {
        return Decoded {
            geometry: ParsedGeometry::Invalid(InvalidReason::Empty),
            srid,
            warnings,
        };
    }

    let coordinates = parse_coordinates(body, &mut warnings);

    let geometry = match kind {
        GeometryKind::Point => match coordinates.first() {
            Some(coordinate) => ParsedGeometry::Point(*coordinate),
            None => ParsedGeometry::Invalid(InvalidReason::InvalidPoint),
        },
        GeometryKind::Area if coordinates.len() >= MIN_RING_POINTS => {
            ParsedGeometry::Polygon(Polygon::new(Ring::new(coordinates)))
        }
        GeometryKind::Area => ParsedGeometry::Invalid(InvalidReason::InsufficientPoints {
            count: coordinates.len(),
        }),
    };

    Decoded {
        geometry,
        srid,
        warnings,
    }
}

/// Strip an optional `SRID=<int>;` prefix
fn split_srid<'a>(text: &'a str, warnings: &mut Vec<DecodeWarning>) -> (Option<i32>, &'a str) {
    let has_prefix = text
        .get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("SRID="));
    if !has_prefix {
        return (None, text);
    }

    let (value, rest) = match text[5..].split_once(';') {
        Some((value, rest)) => (value.trim(), rest.trim()),
        None => (text[5..].trim(), ""),
    };

    match value.parse::<i32>() {
        Ok(srid) => (Some(srid), rest),
        Err(_) => {
            tracing::warn!("Ignoring malformed SRID prefix: {:?}", value);
            warnings.push(DecodeWarning::InvalidSrid {
                value: value.to_string(),
            });
            (None, rest)
        }
    }
}

/// Dimension tags allowed between the keyword and the coordinates
const DIMENSIONS: &[&str] = &["Z", "M", "ZM"];

/// Strip a leading geometry keyword and its dimension tag
///
/// Only a recognised keyword is removed. Any other leading text stays in the body so
/// its tokens are parsed or reported.
fn split_keyword(text: &str) -> (GeometryKind, &str) {
    let (word, rest) = leading_word(text);
    let Some(keyword) = KEYWORDS.iter().find(|k| k.eq_ignore_ascii_case(word)) else {
        return (GeometryKind::Area, text);
    };

    let mut body = rest;
    let (tag, after_tag) = leading_word(body);
    if DIMENSIONS.iter().any(|d| d.eq_ignore_ascii_case(tag)) {
        body = after_tag;
    }

    let kind = match *keyword {
        "POINT" | "MULTIPOINT" => GeometryKind::Point,
        _ => GeometryKind::Area,
    };
    (kind, body)
}

/// Split off the leading run of ASCII letters, skipping leading whitespace
fn leading_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    let end = text
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(text.len());
    text.split_at(end)
}

/// Parse comma-separated `"<lon> <lat>"` tokens, keeping the valid ones in order
fn parse_coordinates(body: &str, warnings: &mut Vec<DecodeWarning>) -> Vec<Coordinate> {
    let mut coordinates = Vec::new();

    for token in body.split(',') {
        let mut parts = token.split_whitespace();
        let pair = match (parts.next(), parts.next()) {
            (Some(lon), Some(lat)) => lon.parse::<f64>().ok().zip(lat.parse::<f64>().ok()),
            _ => None,
        };

        let Some((longitude, latitude)) = pair else {
            tracing::warn!("Skipping malformed coordinate token: {:?}", token.trim());
            warnings.push(DecodeWarning::MalformedToken {
                token: token.trim().to_string(),
            });
            continue;
        };

        if !is_valid_latitude(latitude) || !is_valid_longitude(longitude) {
            tracing::warn!(
                "Skipping coordinate outside WGS84 bounds: ({}, {})",
                latitude,
                longitude
            );
            warnings.push(DecodeWarning::CoordinateOutOfRange {
                latitude,
                longitude,
            });
            continue;
        }

        coordinates.push(Coordinate::new(latitude, longitude));
    }

    coordinates
}
