//! Burn Map Library - Geospatial Render Plan Pipeline for Controlled Burn Records
//!
//! This library turns raw burn records (WKT parcel geometry plus a commune-level fallback
//! coordinate) into an immutable render plan for an interactive map. Corrupt upstream data
//! never aborts a run: every data-quality problem becomes a [`PlanWarning`] and the rest of
//! the features are still rendered.
//!
//! # Architecture
//!
//! - **[`wkt`]**: Tolerant WKT decoder producing a [`ParsedGeometry`]
//! - **[`validate`]**: Coordinate range and ring predicates
//! - **[`Feature`]**: Immutable decoded record, classified into shape / marker candidates
//! - **[`EntityGroup`]**: Marker candidates grouped by owning commune
//! - **[`ClusterStyle`]**: Size, color and border derived from a group
//! - **[`BoundingBox`]**: Extent of everything that renders
//! - **[`Selection`]**: Single-feature highlight state
//! - **[`RenderPipeline`]**: Composes all of the above into a [`RenderPlan`]
//! - **[`RenderAdapter`]**: Diffs successive plans against a [`MapRenderer`]
//!
//! # Determinism
//!
//! Running the pipeline twice on the same input yields equal plans. Groups and clusters
//! follow first-encounter order of their owner in the input, and majority ties are resolved
//! by first-encountered status, never by hash iteration order.

mod bounds;
mod config;
mod feature;
mod grouping;
mod plan;
mod renderer;
mod selection;
mod style;
pub mod validate;
pub mod wkt;

// Public API exports
pub use bounds::{BoundingBox, compute_bounds};
pub use config::{MarkerSizing, PipelineConfig, SelectionEmphasis};
pub use feature::{
    Classification, Coordinate, EntityId, Feature, FeatureId, FeatureRecord, StatusCode, classify,
};
pub use grouping::{DroppedGroup, EntityGroup, Grouping, group_markers};
pub use plan::{
    PlanWarning, PreparedFeatures, RenderPipeline, RenderPlan, StyledCluster, StyledShape,
    WarningReason,
};
pub use renderer::{DiffStats, MapRenderer, RenderAdapter, Viewport};
pub use selection::Selection;
pub use style::{
    BorderStyle, ClusterStyle, ColorToken, DEFAULT_COLOR, majority_status, palette_lookup,
};
pub use wkt::{Decoded, DecodeWarning, InvalidReason, ParsedGeometry, Polygon, Ring};

/// Error types for caller contract violations
///
/// Malformed geometry, out-of-range coordinates and missing locations are data-quality
/// issues reported as [`PlanWarning`]s instead.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[cfg(feature = "serde")]
    #[error("Malformed feature collection: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, DataError>;

/// Parse a JSON array of input feature records
///
/// Anything that is not an array of well-typed records is a [`DataError::Json`]; missing
/// or null geometry fields are fine and handled by the pipeline.
#[cfg(feature = "serde")]
pub fn feature_records_from_json(json: &str) -> Result<Vec<FeatureRecord>> {
    Ok(serde_json::from_str(json)?)
}

/// Read a JSON array of input feature records from any reader
///
/// Read failures are [`DataError::Io`], kept apart from malformed content.
#[cfg(feature = "serde")]
pub fn feature_records_from_reader<R: std::io::Read>(
    mut reader: R,
) -> Result<Vec<FeatureRecord>> {
    let mut json = String::new();
    reader.read_to_string(&mut json)?;
    feature_records_from_json(&json)
}
