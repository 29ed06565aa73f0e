//! Cluster styling and the burn status palette

use crate::{EntityGroup, MarkerSizing, StatusCode, classify};
use smallvec::SmallVec;
use std::fmt;

/// Palette for the statuses the dashboard knows about; anything else gets [`DEFAULT_COLOR`]
const PALETTE: &[(&str, ColorToken)] = &[
    ("PLANIFIE", ColorToken("#3b82f6")),
    ("EN_COURS", ColorToken("#f97316")),
    ("TERMINE", ColorToken("#22c55e")),
    ("ANNULE", ColorToken("#ef4444")),
    ("REPORTE", ColorToken("#a855f7")),
];

/// Color of unknown statuses
pub const DEFAULT_COLOR: ColorToken = ColorToken("#6b7280");

/// CSS color consumed verbatim by the rendering adapter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct ColorToken(&'static str);

impl ColorToken {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Marker outline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "lowercase")
)]
pub enum BorderStyle {
    /// Coordinate-only approximation
    Solid,
    /// Some member also has its own parcel polygon
    Dashed,
}

/// Visual attributes of a cluster marker, derived from its group
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterStyle {
    pub count: u32,
    pub majority_status: StatusCode,
    pub marker_size: u32,
    pub color: ColorToken,
    pub border_style: BorderStyle,
}

/// Look up the color for a status
pub fn palette_lookup(status: &StatusCode) -> ColorToken {
    PALETTE
        .iter()
        .find(|(code, _)| *code == status.as_str())
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_COLOR)
}

/// Most frequent status; ties go to the status encountered first
///
/// Tallies are kept in encounter order. Returns `None` for an empty input.
pub fn majority_status<'a>(
    statuses: impl IntoIterator<Item = &'a StatusCode>,
) -> Option<StatusCode> {
    let mut tally: SmallVec<[(&StatusCode, u32); 8]> = SmallVec::new();
    for status in statuses {
        match tally.iter_mut().find(|(seen, _)| *seen == status) {
            Some((_, count)) => *count += 1,
            None => tally.push((status, 1)),
        }
    }

    let mut best: Option<(&StatusCode, u32)> = None;
    for &(status, count) in &tally {
        // Strictly greater: an equal count never displaces an earlier status
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((status, count));
        }
    }
    best.map(|(status, _)| status.clone())
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl ClusterStyle {
    /// Derive the style of one group
    pub fn for_group(group: &EntityGroup, sizing: &MarkerSizing) -> Self {
        let count = u32::try_from(group.features.len()).unwrap_or(u32::MAX);
        let majority_status =
            majority_status(group.features.iter().map(|feature| &feature.status))
                .unwrap_or_default();
        let border_style = if group.features.iter().any(|feature| classify(feature).is_shape()) {
            BorderStyle::Dashed
        } else {
            BorderStyle::Solid
        };

        Self {
            count,
            marker_size: sizing.marker_size(count),
            color: palette_lookup(&majority_status),
            majority_status,
            border_style,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wkt;
    use crate::{Coordinate, Feature, FeatureId, ParsedGeometry};
    use std::sync::Arc;

    fn feature(id: FeatureId, status: &str, geometry: Option<ParsedGeometry>) -> Arc<Feature> {
        Arc::new(Feature {
            id,
            status: StatusCode::from(status),
            surface_area: 1.0,
            owner_key: 7,
            geometry,
            srid: None,
            fallback_coordinate: Some(Coordinate::new(42.6, 2.4)),
        })
    }

    fn group(features: Vec<Arc<Feature>>) -> EntityGroup {
        EntityGroup {
            owner_key: 7,
            coordinate: Coordinate::new(42.6, 2.4),
            features,
        }
    }

    fn statuses(codes: &[&str]) -> Vec<StatusCode> {
        codes.iter().map(|code| StatusCode::from(*code)).collect()
    }

    #[test]
    fn test_three_features_same_owner() {
        let group = group(vec![
            feature(1, "EN_COURS", None),
            feature(2, "EN_COURS", None),
            feature(3, "TERMINE", None),
        ]);

        let style = ClusterStyle::for_group(&group, &MarkerSizing::default());

        assert_eq!(style.count, 3);
        assert_eq!(style.majority_status, StatusCode::from("EN_COURS"));
        assert_eq!(style.marker_size, 21);
        assert_eq!(style.color, palette_lookup(&StatusCode::from("EN_COURS")));
        assert_eq!(style.border_style, BorderStyle::Solid);
    }

    #[test]
    fn test_tie_goes_to_first_encountered() {
        let codes = statuses(&["TERMINE", "EN_COURS", "EN_COURS", "TERMINE"]);
        assert_eq!(majority_status(&codes), Some(StatusCode::from("TERMINE")));

        let codes = statuses(&["EN_COURS", "TERMINE", "TERMINE", "EN_COURS"]);
        assert_eq!(majority_status(&codes), Some(StatusCode::from("EN_COURS")));

        let codes = statuses(&["C", "B", "A"]);
        assert_eq!(majority_status(&codes), Some(StatusCode::from("C")));
    }

    #[test]
    fn test_tie_break_is_reproducible_with_many_statuses() {
        let mut codes: Vec<String> = (0..20).map(|i| format!("S{i}")).collect();
        codes.extend((0..20).rev().map(|i| format!("S{i}")));
        let codes: Vec<StatusCode> = codes.into_iter().map(StatusCode::new).collect();

        for _ in 0..10 {
            assert_eq!(majority_status(&codes), Some(StatusCode::from("S0")));
        }
    }

    #[test]
    fn test_clear_majority_wins_regardless_of_position() {
        let codes = statuses(&["ANNULE", "TERMINE", "TERMINE"]);
        assert_eq!(majority_status(&codes), Some(StatusCode::from("TERMINE")));
    }

    #[test]
    fn test_majority_of_nothing() {
        assert_eq!(majority_status(&[]), None);
    }

    #[test]
    fn test_dashed_border_when_member_has_polygon() {
        let square = wkt::decode("POLYGON((2.4 42.6, 2.5 42.6, 2.5 42.7))").geometry;
        assert!(square.as_polygon().is_some());

        let group = group(vec![
            feature(1, "PLANIFIE", None),
            feature(2, "PLANIFIE", Some(square)),
        ]);

        let style = ClusterStyle::for_group(&group, &MarkerSizing::default());
        assert_eq!(style.border_style, BorderStyle::Dashed);
        assert_eq!(style.marker_size, 20);
    }

    #[test]
    fn test_palette() {
        assert_eq!(palette_lookup(&StatusCode::from("TERMINE")).as_str(), "#22c55e");
        assert_eq!(palette_lookup(&StatusCode::from("REPORTE")).as_str(), "#a855f7");
        assert_eq!(palette_lookup(&StatusCode::from("unknown")), DEFAULT_COLOR);
        assert_eq!(palette_lookup(&StatusCode::default()), DEFAULT_COLOR);
    }
}
