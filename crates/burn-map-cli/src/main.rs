//! Burn Map - command-line harness
//!
//! Reads a JSON array of burn records, runs the geospatial pipeline and writes the
//! render plan as JSON.

mod logging;
mod settings;

use burn_map_lib::{DataError, FeatureRecord, RenderPipeline, RenderPlan};
use clap::Parser;
use settings::Settings;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::process::ExitCode;

/// Error types for the command-line harness
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("Cannot open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot write render plan: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    logging::setup_logging();
    let settings = Settings::parse();

    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(settings: &Settings) -> Result<(), CliError> {
    let pipeline = RenderPipeline::new(settings.pipeline_config())?;
    let records = read_records(settings)?;
    tracing::info!("Loaded {} burn records", records.len());

    tracing::debug!("Marker sizing: {:?}", pipeline.config().marker);

    let prepared = pipeline.prepare(&records);
    for warning in prepared.warnings() {
        tracing::debug!("Feature {}: {:?}", warning.feature_id, warning.reason);
    }
    if prepared.bounds().is_none() {
        tracing::warn!("Nothing to frame, the map keeps its default viewport");
    }

    let plan = prepared.compose(&settings.selection());
    tracing::info!(
        "Render plan: {} shapes, {} clusters, {} warnings",
        plan.shapes.len(),
        plan.clusters.len(),
        plan.warnings.len()
    );

    write_plan(settings, &plan)
}

fn read_records(settings: &Settings) -> Result<Vec<FeatureRecord>, CliError> {
    if settings.reads_stdin() {
        return Ok(burn_map_lib::feature_records_from_reader(
            std::io::stdin().lock(),
        )?);
    }

    let file = File::open(&settings.input).map_err(|source| CliError::Open {
        path: settings.input.display().to_string(),
        source,
    })?;
    Ok(burn_map_lib::feature_records_from_reader(BufReader::new(
        file,
    ))?)
}

fn write_plan(settings: &Settings, plan: &RenderPlan) -> Result<(), CliError> {
    let writer: Box<dyn Write> = match &settings.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = BufWriter::new(writer);

    if settings.pretty {
        serde_json::to_writer_pretty(&mut writer, plan)?;
    } else {
        serde_json::to_writer(&mut writer, plan)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
