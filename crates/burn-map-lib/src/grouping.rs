//! Grouping of marker candidates by owning commune
//!
//! Every feature under one commune shares the commune's representative coordinate, so
//! grouping is keyed on the owner, never on coordinate values. Groups come out in order
//! of first appearance of their owner, and members keep input order.

use crate::validate::is_valid_coordinate;
use crate::{Coordinate, EntityId, Feature, FeatureId};
use indexmap::IndexMap;
use std::sync::Arc;

/// Features of one commune that are drawn as a single cluster marker
#[derive(Clone, Debug, PartialEq)]
pub struct EntityGroup {
    pub owner_key: EntityId,
    /// First in-range coordinate found among the members
    pub coordinate: Coordinate,
    pub features: Vec<Arc<Feature>>,
}

impl EntityGroup {
    /// Ids of the members, in input order
    pub fn feature_ids(&self) -> Vec<FeatureId> {
        self.features.iter().map(|feature| feature.id).collect()
    }

    /// Sum of member surface areas, ignoring non-finite values
    pub fn total_surface_area(&self) -> f64 {
        self.features
            .iter()
            .map(|feature| feature.surface_area)
            .filter(|area| area.is_finite())
            .sum()
    }
}

/// An owner whose members carried no usable coordinate
#[derive(Clone, Debug, PartialEq)]
pub struct DroppedGroup {
    pub owner_key: EntityId,
    pub feature_ids: Vec<FeatureId>,
}

/// Output of [`group_markers`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grouping {
    pub groups: Vec<EntityGroup>,
    pub dropped: Vec<DroppedGroup>,
}

#[derive(Default)]
struct Bucket {
    coordinate: Option<Coordinate>,
    features: Vec<Arc<Feature>>,
}

/// Group marker candidates by owner
///
/// Each candidate is a feature paired with the coordinate it would be placed at.
pub fn group_markers(candidates: &[(Arc<Feature>, Coordinate)]) -> Grouping {
    #[cfg(feature = "profiling")]
    profiling::scope!("grouping::group_markers");

    let mut buckets: IndexMap<EntityId, Bucket> = IndexMap::new();
    for (feature, coordinate) in candidates {
        let bucket = buckets.entry(feature.owner_key).or_default();
        if bucket.coordinate.is_none() && is_valid_coordinate(coordinate) {
            bucket.coordinate = Some(*coordinate);
        }
        bucket.features.push(Arc::clone(feature));
    }

    let mut grouping = Grouping::default();
    for (owner_key, bucket) in buckets {
        match bucket.coordinate {
            Some(coordinate) => grouping.groups.push(EntityGroup {
                owner_key,
                coordinate,
                features: bucket.features,
            }),
            None => {
                tracing::warn!(
                    "Dropping group for owner {} ({} features): no valid coordinate",
                    owner_key,
                    bucket.features.len()
                );
                grouping.dropped.push(DroppedGroup {
                    owner_key,
                    feature_ids: bucket.features.iter().map(|feature| feature.id).collect(),
                });
            }
        }
    }

    grouping
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StatusCode;

    fn candidate(
        id: FeatureId,
        owner_key: EntityId,
        coordinate: Coordinate,
    ) -> (Arc<Feature>, Coordinate) {
        let feature = Feature {
            id,
            status: StatusCode::from("EN_COURS"),
            surface_area: id as f64,
            owner_key,
            geometry: None,
            srid: None,
            fallback_coordinate: Some(coordinate),
        };
        (Arc::new(feature), coordinate)
    }

    #[test]
    fn test_groups_by_owner_in_first_encounter_order() {
        let a = Coordinate::new(42.6, 2.4);
        let b = Coordinate::new(43.0, 3.0);
        let candidates = vec![
            candidate(1, 9, b),
            candidate(2, 7, a),
            candidate(3, 9, b),
            candidate(4, 7, a),
        ];

        let grouping = group_markers(&candidates);

        assert!(grouping.dropped.is_empty());
        assert_eq!(grouping.groups.len(), 2);
        assert_eq!(grouping.groups[0].owner_key, 9);
        assert_eq!(grouping.groups[0].feature_ids(), vec![1, 3]);
        assert_eq!(grouping.groups[1].owner_key, 7);
        assert_eq!(grouping.groups[1].feature_ids(), vec![2, 4]);
        assert_eq!(grouping.groups[1].coordinate, a);
    }

    #[test]
    fn test_first_valid_coordinate_is_representative() {
        let invalid = Coordinate::new(120.0, 2.4);
        let valid = Coordinate::new(42.6, 2.4);
        let candidates = vec![candidate(1, 7, invalid), candidate(2, 7, valid)];

        let grouping = group_markers(&candidates);

        assert_eq!(grouping.groups.len(), 1);
        assert_eq!(grouping.groups[0].coordinate, valid);
        assert_eq!(grouping.groups[0].features.len(), 2);
    }

    #[test]
    fn test_group_without_valid_coordinate_is_dropped() {
        let invalid = Coordinate::new(42.6, 200.0);
        let candidates = vec![candidate(1, 7, invalid), candidate(2, 7, invalid)];

        let grouping = group_markers(&candidates);

        assert!(grouping.groups.is_empty());
        assert_eq!(
            grouping.dropped,
            vec![DroppedGroup {
                owner_key: 7,
                feature_ids: vec![1, 2]
            }]
        );
    }

    #[test]
    fn test_total_surface_area_skips_non_finite() {
        let coordinate = Coordinate::new(42.6, 2.4);
        let (mut broken, _) = candidate(3, 7, coordinate);
        Arc::make_mut(&mut broken).surface_area = f64::NAN;
        let candidates = vec![
            candidate(1, 7, coordinate),
            candidate(2, 7, coordinate),
            (broken, coordinate),
        ];

        let grouping = group_markers(&candidates);
        assert!((grouping.groups[0].total_surface_area() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(group_markers(&[]), Grouping::default());
    }
}
