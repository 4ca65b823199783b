//! Flattened CSV export.
//!
//! One row per article, body text omitted, list values joined with `"; "`.
//! [`read_rows`] reads an exported file back; [`CsvRow::locations`] splits the
//! joined location column again.

use crate::models::ArticleRecord;
use crate::outputs::load_records;
use crate::utils::ensure_parent_dir;
use serde::{Deserialize, Serialize};
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

/// Separator for list values inside one cell.
pub const LIST_SEPARATOR: &str = "; ";

/// Column order of the export.
pub const HEADERS: [&str; 14] = [
    "publish_date",
    "source",
    "headline",
    "url",
    "location",
    "tone",
    "framing",
    "group_mentions",
    "metaphors",
    "euphemisms",
    "absences",
    "grief_handling",
    "blame_or_agency",
    "commodification_of_death",
];

/// One exported row. Field order matches [`HEADERS`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CsvRow {
    pub publish_date: String,
    pub source: String,
    pub headline: String,
    pub url: String,
    pub location: String,
    pub tone: String,
    pub framing: String,
    pub group_mentions: String,
    pub metaphors: String,
    pub euphemisms: String,
    pub absences: String,
    pub grief_handling: String,
    pub blame_or_agency: String,
    pub commodification_of_death: String,
}

impl CsvRow {
    pub fn from_record(record: &ArticleRecord) -> Self {
        let analysis = record.analysis();
        Self {
            publish_date: record.publish_date.clone(),
            source: record.source.clone(),
            headline: record.headline.clone(),
            url: record.url.clone(),
            location: record.location.join(LIST_SEPARATOR),
            tone: analysis.tone,
            framing: analysis.framing,
            group_mentions: analysis.group_mentions.join(LIST_SEPARATOR),
            metaphors: analysis.metaphors.join(LIST_SEPARATOR),
            euphemisms: analysis.euphemisms.join(LIST_SEPARATOR),
            absences: analysis.absences.join(LIST_SEPARATOR),
            grief_handling: analysis.grief_handling,
            blame_or_agency: analysis.blame_or_agency,
            commodification_of_death: analysis.commodification_of_death,
        }
    }

    /// The location cell split back into names.
    pub fn locations(&self) -> Vec<String> {
        split_list(&self.location)
    }
}

/// Split a joined list cell back into its items.
///
/// Splits on `;` so that cells edited by hand without the trailing space
/// still split; items are trimmed and empty ones dropped.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(split_list("New York; New Jersey"), vec!["New York", "New Jersey"]);
/// assert!(split_list("").is_empty());
/// ```
pub fn split_list(cell: &str) -> Vec<String> {
    cell.split(LIST_SEPARATOR.trim())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Render records as CSV bytes, header included.
///
/// # Returns
///
/// UTF-8 CSV with the [`HEADERS`] row first, even for an empty slice.
pub fn to_csv(records: &[ArticleRecord]) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());
    if records.is_empty() {
        writer.write_record(HEADERS)?;
    }
    for record in records {
        writer.serialize(CsvRow::from_record(record))?;
    }
    Ok(writer.into_inner().map_err(|e| e.into_error())?)
}

/// Parse CSV text produced by [`to_csv`].
pub fn parse_rows(content: &str) -> Result<Vec<CsvRow>, Box<dyn Error>> {
    let mut reader = ::csv::Reader::from_reader(content.as_bytes());
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

#[instrument(level = "info", skip_all, fields(%path))]
pub async fn read_rows(path: &str) -> Result<Vec<CsvRow>, Box<dyn Error>> {
    let content = fs::read_to_string(path).await?;
    parse_rows(&content)
}

/// Convert `input` (JSON array or JSONL) into a CSV file at `output`.
#[instrument(level = "info", skip_all, fields(%input, %output))]
pub async fn export_csv(input: &str, output: &str) -> Result<usize, Box<dyn Error>> {
    let records = load_records(input).await?;
    let bytes = to_csv(&records)?;
    ensure_parent_dir(output).await?;
    fs::write(output, bytes).await?;
    info!(rows = records.len(), "Conversion completed");
    Ok(records.len())
}
