//! Exports and presentation data derived from annotated records.
//!
//! # Submodules
//!
//! - [`json`]: JSONL → pretty JSON array in the full export schema
//! - [`csv`]: flattened CSV table (body text omitted) and read-back
//! - [`csv_check`]: structural checks of an exported CSV file
//! - [`coverage`]: which extracted locations can be plotted
//! - [`map`]: GeoJSON markers grouped by primary location
//! - [`terms`]: per-category word counts of the analysis tags
//!
//! Inputs may be either a JSON array or JSONL; see [`load_records`].

pub mod coverage;
pub mod csv;
pub mod csv_check;
pub mod json;
pub mod map;
pub mod terms;

use crate::models::ArticleRecord;
use crate::utils::{describe_json_error, ensure_parent_dir, truncate_for_log};
use serde::Serialize;
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Parse records from a JSON array document or from JSONL.
///
/// JSONL lines that fail to parse are logged and skipped; a malformed JSON
/// array is an error.
pub fn parse_records(content: &str) -> Result<Vec<ArticleRecord>, Box<dyn Error>> {
    if content.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(content)?);
    }

    let mut records = Vec::new();
    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<ArticleRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => warn!(
                line = i + 1,
                kind = describe_json_error(&e),
                error = %e,
                preview = %truncate_for_log(line, 120),
                "Error decoding JSON line; skipping"
            ),
        }
    }
    Ok(records)
}

/// Read and parse the records of `path`.
///
/// # Arguments
///
/// * `path` - A JSON array file or a JSONL file
///
/// # Returns
///
/// The parsed records in file order, or an error if the file cannot be read
/// or holds a malformed JSON array. See [`parse_records`].
#[instrument(level = "info", skip_all, fields(%path))]
pub async fn load_records(path: &str) -> Result<Vec<ArticleRecord>, Box<dyn Error>> {
    let content = fs::read_to_string(path).await?;
    let records = parse_records(&content)?;
    info!(count = records.len(), "Loaded records");
    Ok(records)
}

/// Serialize `value` as pretty JSON into `path`, creating parent directories.
#[instrument(level = "info", skip_all, fields(%path))]
pub async fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(value)?;
    ensure_parent_dir(path).await?;
    fs::write(path, json).await?;
    info!("Wrote JSON file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_array() {
        let records = parse_records(r#"  [{"headline":"a"},{"headline":"b","location":["Ohio"]}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].location, vec!["Ohio"]);
    }

    #[test]
    fn test_parse_jsonl_skips_bad_lines() {
        let records = parse_records("{\"headline\":\"a\"}\n\nnope\n{\"headline\":\"b\"}\n").unwrap();
        let headlines: Vec<&str> = records.iter().map(|r| r.headline.as_str()).collect();
        assert_eq!(headlines, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_broken_array_is_error() {
        assert!(parse_records("[{\"headline\":\"a\"}").is_err());
    }

    #[tokio::test]
    async fn test_write_json_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x/y.json");
        write_json(path.to_str().unwrap(), &vec![1, 2]).await.unwrap();
        let back: Vec<i32> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, vec![1, 2]);
    }
}
