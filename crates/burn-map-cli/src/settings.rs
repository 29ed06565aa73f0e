use burn_map_lib::{MarkerSizing, PipelineConfig, Selection, SelectionEmphasis};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Burn Map - Turn controlled burn records into a map render plan
pub struct Settings {
    /// JSON file holding an array of burn records ("-" reads stdin)
    #[clap(value_name = "FILE")]
    pub input: PathBuf,

    /// Where to write the render plan (stdout if omitted)
    #[clap(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Feature id to highlight
    #[clap(short, long, value_name = "ID")]
    pub select: Option<i64>,

    /// Pretty-print the JSON output
    #[clap(long, default_value = "false")]
    pub pretty: bool,

    /// Base cluster marker size in pixels
    #[clap(long, default_value = "15")]
    pub marker_base: u32,

    /// Pixels added per feature in a cluster
    #[clap(long, default_value = "2")]
    pub marker_per_feature: u32,

    /// Smallest cluster marker in pixels
    #[clap(long, default_value = "20")]
    pub marker_min: u32,

    /// Largest cluster marker in pixels
    #[clap(long, default_value = "40")]
    pub marker_max: u32,

    /// Stroke weight of the selected shape
    #[clap(long, default_value = "4.0")]
    pub selected_weight: f32,
}

impl Settings {
    /// Build the pipeline configuration from the command line
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            marker: MarkerSizing {
                base: self.marker_base,
                per_feature: self.marker_per_feature,
                min_size: self.marker_min,
                max_size: self.marker_max,
            },
            emphasis: SelectionEmphasis {
                selected_weight: self.selected_weight,
                ..SelectionEmphasis::default()
            },
        }
    }

    #[inline]
    pub fn selection(&self) -> Selection {
        Selection::from(self.select)
    }

    /// Whether input should come from stdin
    #[inline]
    pub fn reads_stdin(&self) -> bool {
        self.input.as_os_str() == "-"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_library_defaults() {
        let settings = Settings::parse_from(["burn-map", "records.json"]);
        assert_eq!(settings.pipeline_config(), PipelineConfig::default());
        assert_eq!(settings.selection(), Selection::Unselected);
        assert!(!settings.reads_stdin());
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::parse_from([
            "burn-map",
            "-",
            "--select",
            "12",
            "--marker-max",
            "60",
            "--pretty",
        ]);

        assert!(settings.reads_stdin());
        assert!(settings.pretty);
        assert_eq!(settings.selection(), Selection::Selected(12));
        assert_eq!(settings.pipeline_config().marker.max_size, 60);
    }
}
