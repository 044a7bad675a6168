#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the incident normalization pipeline.

use std::{path::PathBuf, time::Instant};

use clap::Parser;
use crime_dash_cli_utils::IndicatifProgress;
use crime_dash_store::PipelineConfig;

#[derive(Parser)]
#[command(
    name = "crime_dash_ingest",
    about = "Normalize a raw crime incident CSV into the gold table"
)]
struct Cli {
    /// Pipeline config file (defaults to `$CRIME_DASH_CONFIG`, then
    /// `<data dir>/crime_dash.toml`)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Raw incident CSV (overrides `raw_csv` from the config)
    #[arg(long)]
    input: Option<PathBuf>,
    /// Gold table output path (overrides `gold_table` from the config)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Directory holding the reference `GeoJSON` files
    #[arg(long)]
    references_dir: Option<PathBuf>,
    /// Print the ingest report as JSON to stdout
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = crime_dash_cli_utils::init_logger();
    let cli = Cli::parse();

    let mut config = PipelineConfig::load(cli.config.as_deref())?;
    if let Some(input) = cli.input {
        config.raw_csv = input;
    }
    if let Some(output) = cli.output {
        config.gold_table = output;
    }
    if let Some(dir) = cli.references_dir {
        config = config.with_references_dir(&dir);
    }

    let start = Instant::now();
    let progress = IndicatifProgress::records_bar(&multi, "Reading incidents");
    let report = crime_dash_ingest::run(&config, progress.as_ref())?;

    log::info!(
        "Gold table written to {} in {:.1}s",
        config.gold_table.display(),
        start.elapsed().as_secs_f64()
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
