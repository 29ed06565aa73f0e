//! Pipeline configuration
//!
//! Defaults reproduce the dashboard's map styling; every knob can be overridden by the
//! caller (the CLI exposes them as flags).

use crate::{DataError, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the render pipeline
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PipelineConfig {
    /// Cluster marker sizing
    pub marker: MarkerSizing,
    /// Stroke and fill emphasis of selected vs. normal shapes
    pub emphasis: SelectionEmphasis,
}

/// Marker size formula: `clamp(base + count * per_feature, min_size, max_size)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MarkerSizing {
    pub base: u32,
    pub per_feature: u32,
    pub min_size: u32,
    pub max_size: u32,
}

impl Default for MarkerSizing {
    fn default() -> Self {
        Self {
            base: 15,
            per_feature: 2,
            min_size: 20,
            max_size: 40,
        }
    }
}

impl MarkerSizing {
    /// Marker diameter in pixels for a cluster of `count` features
    #[inline]
    pub fn marker_size(&self, count: u32) -> u32 {
        self.base
            .saturating_add(count.saturating_mul(self.per_feature))
            .max(self.min_size)
            .min(self.max_size)
    }
}

/// Shape stroke weight and fill opacity, normal and highlighted
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SelectionEmphasis {
    pub normal_weight: f32,
    pub normal_fill_opacity: f32,
    pub selected_weight: f32,
    pub selected_fill_opacity: f32,
}

impl Default for SelectionEmphasis {
    fn default() -> Self {
        Self {
            normal_weight: 2.0,
            normal_fill_opacity: 0.35,
            selected_weight: 4.0,
            selected_fill_opacity: 0.6,
        }
    }
}

impl SelectionEmphasis {
    #[inline]
    pub fn weight(&self, selected: bool) -> f32 {
        if selected {
            self.selected_weight
        } else {
            self.normal_weight
        }
    }

    #[inline]
    pub fn fill_opacity(&self, selected: bool) -> f32 {
        if selected {
            self.selected_fill_opacity
        } else {
            self.normal_fill_opacity
        }
    }
}

impl PipelineConfig {
    /// Reject configurations that cannot produce a sensible plan
    pub fn validate(&self) -> Result<()> {
        let marker = &self.marker;
        if marker.min_size > marker.max_size {
            return Err(DataError::InvalidConfig(format!(
                "marker min_size ({}) exceeds max_size ({})",
                marker.min_size, marker.max_size
            )));
        }

        let emphasis = &self.emphasis;
        for (name, weight) in [
            ("normal_weight", emphasis.normal_weight),
            ("selected_weight", emphasis.selected_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(DataError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {weight}"
                )));
            }
        }
        for (name, opacity) in [
            ("normal_fill_opacity", emphasis.normal_fill_opacity),
            ("selected_fill_opacity", emphasis.selected_fill_opacity),
        ] {
            if !(0.0..=1.0).contains(&opacity) {
                return Err(DataError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {opacity}"
                )));
            }
        }

        Ok(())
    }
}
