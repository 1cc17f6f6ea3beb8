use anyhow::Result;
use clap::Parser;
use gait_common::tracer::TracerEngine;
use std::path::PathBuf;
use trace_to_inflections::{
    PipelineParameters, find_inflections,
    loader::{load_label_data, load_pressure_data, save_inflections},
};
use tracing::{info, level_filters::LevelFilter};

// cargo run --bin trace-to-inflections -- --pressure-file pressure.json --labels-file labels.json --output-file inflections.json --upsample-factor 3

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// JSON object mapping each dataset name to its pressure samples
    #[clap(long, env = "GAIT_PRESSURE_FILE")]
    pressure_file: PathBuf,

    /// JSON object mapping each dataset name to its labelled sample indices
    #[clap(long, env = "GAIT_LABELS_FILE")]
    labels_file: PathBuf,

    /// Path of the JSON file the detected inflection points are written to
    #[clap(long, env = "GAIT_OUTPUT_FILE")]
    output_file: PathBuf,

    /// If set, intermediate signals of each dataset are written as csv files to this directory
    #[clap(long, env = "GAIT_SAVE_PATH")]
    save_path: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[clap(long, env = "GAIT_LOG_LEVEL", default_value = "info")]
    log_level: LevelFilter,

    #[clap(flatten)]
    parameters: PipelineParameters,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let _tracer = TracerEngine::new(args.log_level);

    let pressure = load_pressure_data(&args.pressure_file)?;
    let labels = load_label_data(&args.labels_file)?;

    if let Some(save_path) = &args.save_path {
        std::fs::create_dir_all(save_path)?;
    }

    let report = find_inflections(
        &pressure,
        &labels,
        &args.parameters,
        args.save_path.as_deref(),
    )?;

    save_inflections(&args.output_file, &report.inflections)?;
    info!(
        "Written {} datasets to {}, {} failed",
        report.inflections.len(),
        args.output_file.display(),
        report.failures.len()
    );
    Ok(())
}
