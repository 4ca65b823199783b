//! Structural checks for an exported CSV file.
//!
//! Reports the header, every row whose width differs from the header, and
//! cell-level issues (empty cells, stray quotes, embedded newlines, control
//! characters) for the first few data rows.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument, warn};

static CONTROL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F]").expect("static regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellIssue {
    Empty,
    UnescapedQuote,
    Newline,
    ControlCharacter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaggedRow {
    /// 1-based record number, the header being record 1.
    pub row: usize,
    pub columns: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellFinding {
    pub row: usize,
    pub column: String,
    pub issue: CellIssue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CsvReport {
    pub header: Vec<String>,
    pub rows: usize,
    pub ragged: Vec<RaggedRow>,
    pub findings: Vec<CellFinding>,
}

impl CsvReport {
    pub fn is_clean(&self) -> bool {
        self.ragged.is_empty() && self.findings.is_empty()
    }
}

fn cell_issues(value: &str) -> Vec<CellIssue> {
    let mut issues = Vec::new();
    if value.trim().is_empty() {
        issues.push(CellIssue::Empty);
    }
    if value.contains('"') && !value.starts_with('"') && !value.ends_with('"') {
        issues.push(CellIssue::UnescapedQuote);
    }
    if value.contains('\n') {
        issues.push(CellIssue::Newline);
    }
    if CONTROL_CHARS.is_match(value) {
        issues.push(CellIssue::ControlCharacter);
    }
    issues
}

/// Check CSV text; cell issues are collected for the first `sample_rows` data rows.
pub fn check_csv_str(content: &str, sample_rows: usize) -> Result<CsvReport, Box<dyn Error>> {
    let mut reader = ::csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let header: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    let mut report = CsvReport {
        header,
        ..Default::default()
    };

    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 2;
        report.rows += 1;

        if record.len() != report.header.len() {
            report.ragged.push(RaggedRow {
                row,
                columns: record.len(),
            });
        }

        if i < sample_rows {
            for (column, value) in report.header.iter().zip(record.iter()) {
                for issue in cell_issues(value) {
                    report.findings.push(CellFinding {
                        row,
                        column: column.clone(),
                        issue,
                    });
                }
            }
        }
    }

    Ok(report)
}

#[instrument(level = "info", skip_all, fields(%path))]
pub async fn check_csv(path: &str, sample_rows: usize) -> Result<CsvReport, Box<dyn Error>> {
    let content = fs::read_to_string(path).await?;
    let report = check_csv_str(&content, sample_rows)?;

    info!(columns = report.header.len(), header = ?report.header, rows = report.rows, "Checked CSV header");
    for ragged in &report.ragged {
        warn!(row = ragged.row, columns = ragged.columns, expected = report.header.len(), "Row width differs from header");
    }
    for finding in &report.findings {
        info!(row = finding.row, column = %finding.column, issue = ?finding.issue, "Cell issue");
    }
    Ok(report)
}
