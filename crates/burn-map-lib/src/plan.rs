//! RenderPipeline - Composes decoded features into an immutable render plan
//!
//! The pipeline is split in two stages so that a selection change does not re-decode
//! every geometry:
//!
//! 1. [`RenderPipeline::prepare`] decodes, classifies, groups, styles and frames the
//!    features. Its output does not depend on the selection.
//! 2. [`PreparedFeatures::compose`] applies the selection emphasis and yields the
//!    [`RenderPlan`].
//!
//! Both stages are pure: identical inputs always produce equal plans, which lets the
//! rendering adapter diff successive plans.

use crate::grouping::group_markers;
use crate::wkt::{DecodeWarning, InvalidReason, ParsedGeometry};
use crate::{
    BorderStyle, BoundingBox, ClusterStyle, ColorToken, Coordinate, EntityId, Feature,
    FeatureId, FeatureRecord, PipelineConfig, Result, Ring, Selection, SelectionEmphasis,
    StatusCode, classify, compute_bounds, palette_lookup,
};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::Serialize;

/// A parcel polygon ready to draw
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub struct StyledShape {
    pub feature_id: FeatureId,
    pub ring: Ring,
    pub status: StatusCode,
    pub color: ColorToken,
    pub is_selected: bool,
    pub weight: f32,
    pub fill_opacity: f32,
}

/// A commune cluster marker ready to draw
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub struct StyledCluster {
    pub owner_key: EntityId,
    pub coordinate: Coordinate,
    pub count: u32,
    pub majority_status: StatusCode,
    pub marker_size: u32,
    pub color: ColorToken,
    pub border_style: BorderStyle,
    /// Sum of member surface areas
    pub total_surface_area: f64,
    /// Member ids in input order
    pub feature_ids: Vec<FeatureId>,
    /// Whether the selected feature is one of the members
    pub contains_selected: bool,
}

/// Why a feature (or part of it) is missing from the plan
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize),
    serde(tag = "reason", rename_all = "snake_case", rename_all_fields = "camelCase")
)]
pub enum WarningReason {
    /// Coordinate token skipped during decoding
    MalformedToken { token: String },
    /// Coordinate pair outside WGS84 ranges, skipped
    CoordinateOutOfRange { latitude: f64, longitude: f64 },
    /// SRID prefix ignored
    InvalidSrid { value: String },
    /// Geometry string with nothing in it
    Empty,
    /// Too few valid points for a polygon
    InsufficientPoints { count: usize },
    /// POINT geometry without a usable coordinate
    InvalidPoint,
    /// Neither a drawable polygon nor a coordinate to place a marker
    MissingCoordinate,
    /// The owner's fallback coordinate is out of range for every member
    InvalidOwnerCoordinate { owner_key: EntityId },
}

impl From<DecodeWarning> for WarningReason {
    fn from(warning: DecodeWarning) -> Self {
        match warning {
            DecodeWarning::MalformedToken { token } => Self::MalformedToken { token },
            DecodeWarning::CoordinateOutOfRange {
                latitude,
                longitude,
            } => Self::CoordinateOutOfRange {
                latitude,
                longitude,
            },
            DecodeWarning::InvalidSrid { value } => Self::InvalidSrid { value },
        }
    }
}

impl From<InvalidReason> for WarningReason {
    fn from(reason: InvalidReason) -> Self {
        match reason {
            InvalidReason::Empty => Self::Empty,
            InvalidReason::InsufficientPoints { count } => Self::InsufficientPoints { count },
            InvalidReason::InvalidPoint => Self::InvalidPoint,
        }
    }
}

/// A non-fatal data-quality issue attached to one feature
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub struct PlanWarning {
    pub feature_id: FeatureId,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub reason: WarningReason,
}

impl PlanWarning {
    pub fn new(feature_id: FeatureId, reason: impl Into<WarningReason>) -> Self {
        Self {
            feature_id,
            reason: reason.into(),
        }
    }
}

/// Everything the rendering adapter needs to draw one frame of the map
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub struct RenderPlan {
    pub shapes: Vec<StyledShape>,
    pub clusters: Vec<StyledCluster>,
    /// `None` when nothing renders; the adapter falls back to its default viewport
    pub bounds: Option<BoundingBox>,
    pub warnings: Vec<PlanWarning>,
}

impl RenderPlan {
    /// Check whether the plan draws anything at all
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.clusters.is_empty()
    }
}

/// Selection-independent output of [`RenderPipeline::prepare`]
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedFeatures {
    /// Plan with every shape in its unselected style
    base: RenderPlan,
    emphasis: SelectionEmphasis,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl PreparedFeatures {
    /// Apply a selection and produce the render plan
    pub fn compose(&self, selection: &Selection) -> RenderPlan {
        let mut plan = self.base.clone();
        let Some(selected) = selection.selected() else {
            return plan;
        };

        for shape in plan.shapes.iter_mut().filter(|shape| shape.feature_id == selected) {
            shape.is_selected = true;
            shape.weight = self.emphasis.weight(true);
            shape.fill_opacity = self.emphasis.fill_opacity(true);
        }
        for cluster in &mut plan.clusters {
            cluster.contains_selected = cluster.feature_ids.contains(&selected);
        }

        plan
    }

    /// Bounds of the prepared features
    #[inline]
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.base.bounds
    }

    /// Warnings collected while preparing
    #[inline]
    pub fn warnings(&self) -> &[PlanWarning] {
        &self.base.warnings
    }
}

/// Entry point of the geospatial pipeline
#[derive(Debug, Clone)]
pub struct RenderPipeline {
    config: PipelineConfig,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl RenderPipeline {
    /// Create a pipeline, rejecting invalid configuration
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Decode, classify, group, style and frame a set of records
    ///
    /// Never fails: problems with individual records end up in the warnings.
    pub fn prepare(&self, records: &[FeatureRecord]) -> PreparedFeatures {
        // High-level scope covering the whole selection-independent stage
        #[cfg(feature = "profiling")]
        profiling::scope!("pipeline::prepare");

        let emphasis = self.config.emphasis;
        let mut warnings = Vec::new();
        let mut shapes = Vec::new();
        let mut candidates = Vec::new();

        for record in records {
            let (feature, decode_warnings) = Feature::from_record(record);
            let feature = Arc::new(feature);

            warnings.extend(
                decode_warnings
                    .into_iter()
                    .map(|warning| PlanWarning::new(feature.id, warning)),
            );
            if let Some(reason) = feature.geometry.as_ref().and_then(ParsedGeometry::invalid_reason)
            {
                warnings.push(PlanWarning::new(feature.id, reason));
            }

            let classification = classify(&feature);
            if let Some(ring) = classification.shape {
                shapes.push(StyledShape {
                    feature_id: feature.id,
                    ring: ring.clone(),
                    status: feature.status.clone(),
                    color: palette_lookup(&feature.status),
                    is_selected: false,
                    weight: emphasis.weight(false),
                    fill_opacity: emphasis.fill_opacity(false),
                });
            }
            if let Some(coordinate) = classification.marker {
                candidates.push((Arc::clone(&feature), coordinate));
            }
            if classification.is_unrenderable() {
                tracing::debug!("Feature {} has no location, excluded from plan", feature.id);
                warnings.push(PlanWarning::new(
                    feature.id,
                    WarningReason::MissingCoordinate,
                ));
            }
        }

        let grouping = group_markers(&candidates);
        for dropped in &grouping.dropped {
            warnings.extend(dropped.feature_ids.iter().map(|&id| {
                PlanWarning::new(
                    id,
                    WarningReason::InvalidOwnerCoordinate {
                        owner_key: dropped.owner_key,
                    },
                )
            }));
        }

        let clusters: Vec<StyledCluster> = grouping
            .groups
            .iter()
            .map(|group| {
                let style = ClusterStyle::for_group(group, &self.config.marker);
                StyledCluster {
                    owner_key: group.owner_key,
                    coordinate: group.coordinate,
                    count: style.count,
                    majority_status: style.majority_status,
                    marker_size: style.marker_size,
                    color: style.color,
                    border_style: style.border_style,
                    total_surface_area: group.total_surface_area(),
                    feature_ids: group.feature_ids(),
                    contains_selected: false,
                }
            })
            .collect();

        let bounds = compute_bounds(
            shapes.iter().map(|shape| &shape.ring),
            clusters.iter().map(|cluster| cluster.coordinate),
        );

        tracing::debug!(
            "Prepared {} records: {} shapes, {} clusters, {} warnings",
            records.len(),
            shapes.len(),
            clusters.len(),
            warnings.len()
        );

        PreparedFeatures {
            base: RenderPlan {
                shapes,
                clusters,
                bounds,
                warnings,
            },
            emphasis,
        }
    }

    /// Prepare and compose in one go
    pub fn run(&self, records: &[FeatureRecord], selection: &Selection) -> RenderPlan {
        self.prepare(records).compose(selection)
    }
}
