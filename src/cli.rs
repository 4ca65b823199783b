//! Command-line interface definitions.
//!
//! Every subcommand reads one corpus file and writes one derived file. `-`
//! stands for stdin/stdout where a command streams (`annotate`).

use crate::outputs::map::MAX_JITTER;
use clap::{Parser, Subcommand};

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Attach locations to a scraped corpus
/// covid_media_locations annotate -i results.jsonl -o results_with_locations.jsonl
///
/// # Exports
/// covid_media_locations to-json -i results_with_locations.jsonl -o results.json
/// covid_media_locations to-csv -i results.json -o dh.csv
///
/// # Map markers for US locations only, reproducible placement
/// covid_media_locations map -i results_with_locations.jsonl -o map.geojson --domestic-only --seed 42
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML file with extra aliases, coordinates and place names
    #[arg(short, long, global = true, env = "COVID_LOCATIONS_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Add a `location` list to every record of a JSONL corpus
    Annotate {
        /// Input JSONL file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,
        /// Output JSONL file, or `-` for stdout
        #[arg(short, long, default_value = "-")]
        output: String,
    },

    /// Convert annotated JSONL into a pretty JSON array with the full schema
    ToJson {
        #[arg(short, long)]
        input: String,
        #[arg(short, long)]
        output: String,
    },

    /// Flatten records (JSON array or JSONL) into a CSV table
    ToCsv {
        #[arg(short, long)]
        input: String,
        #[arg(short, long)]
        output: String,
    },

    /// Report structural problems in an exported CSV file
    CheckCsv {
        #[arg(short, long)]
        input: String,
        /// Data rows inspected cell by cell
        #[arg(long, default_value_t = 5)]
        sample_rows: usize,
    },

    /// Show which extracted locations have coordinates
    Coverage {
        #[arg(short, long)]
        input: String,
        /// Also write the report as JSON
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Write GeoJSON markers grouped by primary location
    Map {
        #[arg(short, long)]
        input: String,
        #[arg(short, long)]
        output: String,
        /// Only plot locations flagged domestic
        #[arg(long)]
        domestic_only: bool,
        /// Maximum marker offset in degrees
        #[arg(long, default_value_t = 0.3, value_parser = parse_jitter)]
        jitter: f64,
        /// Seed for reproducible marker offsets
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Write per-category word frequencies of the analysis tags
    Terms {
        #[arg(short, long)]
        input: String,
        #[arg(short, long)]
        output: String,
        /// Words kept per category
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
}

/// Accept a finite jitter between 0 and [`MAX_JITTER`] degrees.
fn parse_jitter(s: &str) -> Result<f64, String> {
    let value: f64 = s.trim().parse().map_err(|e| format!("not a number: {e}"))?;
    if value.is_finite() && (0.0..=MAX_JITTER).contains(&value) {
        Ok(value)
    } else {
        Err(format!("must be between 0 and {MAX_JITTER} degrees"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotate_defaults_to_stdio() {
        let cli = Cli::parse_from(["covid_media_locations", "annotate"]);
        assert_eq!(
            cli.command,
            Command::Annotate {
                input: "-".into(),
                output: "-".into()
            }
        );
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::parse_from([
            "covid_media_locations",
            "to-csv",
            "-i",
            "in.json",
            "-o",
            "dh.csv",
            "--config",
            "extra.yaml",
        ]);
        assert_eq!(cli.config.as_deref(), Some("extra.yaml"));
        assert_eq!(
            cli.command,
            Command::ToCsv {
                input: "in.json".into(),
                output: "dh.csv".into()
            }
        );
    }

    #[test]
    fn test_map_flags() {
        let cli = Cli::parse_from([
            "covid_media_locations",
            "map",
            "--input",
            "a.jsonl",
            "--output",
            "m.geojson",
            "--domestic-only",
            "--seed",
            "9",
        ]);
        match cli.command {
            Command::Map {
                domestic_only,
                jitter,
                seed,
                ..
            } => {
                assert!(domestic_only);
                assert_eq!(jitter, 0.3);
                assert_eq!(seed, Some(9));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_map_rejects_unusable_jitter() {
        for bad in ["inf", "NaN", "-0.5", "1e308", "wide"] {
            let parsed = Cli::try_parse_from([
                "covid_media_locations",
                "map",
                "-i",
                "a.jsonl",
                "-o",
                "m.geojson",
                "--jitter",
                bad,
            ]);
            assert!(parsed.is_err(), "accepted --jitter {bad}");
        }
        let cli = Cli::parse_from([
            "covid_media_locations",
            "map",
            "-i",
            "a.jsonl",
            "-o",
            "m.geojson",
            "--jitter",
            "0",
        ]);
        assert!(matches!(cli.command, Command::Map { jitter, .. } if jitter == 0.0));
    }

    #[test]
    fn test_check_csv_sample_rows_default() {
        let cli = Cli::parse_from(["covid_media_locations", "check-csv", "-i", "dh.csv"]);
        assert_eq!(
            cli.command,
            Command::CheckCsv {
                input: "dh.csv".into(),
                sample_rows: 5
            }
        );
    }

    #[test]
    fn test_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["covid_media_locations"]).is_err());
    }
}
