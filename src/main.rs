//! # COVID Media Locations
//!
//! Location extraction and normalization for a corpus of COVID-19 news
//! articles, plus the exports built on top of it.
//!
//! ## Features
//!
//! - Finds place mentions in headlines and article bodies with a pluggable
//!   entity recognizer and a small set of abbreviation rules
//! - Collapses abbreviations and spelling variants ("NY", "Calif.", "L.A.")
//!   to one canonical name per place, primary location first
//! - Exports the annotated corpus as JSON or CSV, checks exported CSV files
//! - Reports coordinate coverage, writes GeoJSON map markers and
//!   per-category word frequencies of the analysis tags
//!
//! ## Usage
//!
//! ```sh
//! covid_media_locations annotate -i results.jsonl -o results_with_locations.jsonl
//! ```
//!
//! ## Architecture
//!
//! 1. **Tables**: built-in aliases, coordinates and gazetteer, extended by an
//!    optional YAML config
//! 2. **Extraction**: recognizer hits and pattern hits, normalized and deduplicated
//! 3. **Annotation**: streamed record by record, malformed lines skipped
//! 4. **Outputs**: JSON, CSV, coverage, map markers, term frequencies

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod annotate;
mod cli;
mod config;
mod locations;
mod models;
mod outputs;
mod utils;

use cli::{Cli, Command};
use config::LocatorConfig;
use locations::LocationExtractor;
use outputs::map::MapOptions;

#[tokio::main(flavor = "current_thread")]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    // stdout may carry annotated records, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("covid_media_locations starting up");

    let args = Cli::parse();
    debug!(?args.command, config = ?args.config, "Parsed CLI arguments");

    let config = match LocatorConfig::load(args.config.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            error!(path = ?args.config, error = %e, "Failed to load configuration");
            return Err(e);
        }
    };
    let tables = config.build_tables();

    if let Err(e) = run(args.command, &tables).await {
        error!(error = %e, "Command failed");
        return Err(e);
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

async fn run(command: Command, tables: &config::LocationTables) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Annotate { input, output } => {
            let extractor = LocationExtractor::new(&tables.aliases, &tables.recognizer);
            annotate::annotate_file(&input, &output, &extractor).await?;
        }
        Command::ToJson { input, output } => {
            outputs::json::export_json(&input, &output).await?;
        }
        Command::ToCsv { input, output } => {
            outputs::csv::export_csv(&input, &output).await?;
        }
        Command::CheckCsv { input, sample_rows } => {
            let report = outputs::csv_check::check_csv(&input, sample_rows).await?;
            if report.is_clean() {
                let rows = outputs::csv::read_rows(&input).await?;
                let located = rows.iter().filter(|r| !r.locations().is_empty()).count();
                info!(rows = rows.len(), located, "CSV structure looks good");
            } else {
                info!(
                    ragged = report.ragged.len(),
                    findings = report.findings.len(),
                    "CSV has issues"
                );
            }
        }
        Command::Coverage { input, output } => {
            outputs::coverage::report(&input, output.as_deref(), &tables.coords).await?;
        }
        Command::Map {
            input,
            output,
            domestic_only,
            jitter,
            seed,
        } => {
            let options = MapOptions {
                domestic_only,
                jitter,
                seed,
            };
            outputs::map::write_map(&input, &output, &tables.coords, &options).await?;
        }
        Command::Terms {
            input,
            output,
            limit,
        } => {
            outputs::terms::write_terms(&input, &output, limit).await?;
        }
    }
    Ok(())
}
