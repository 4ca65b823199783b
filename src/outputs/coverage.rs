//! Which extracted locations can be plotted.
//!
//! Splits every location seen in a corpus into those the coordinate table
//! knows and those it does not, and counts articles per plottable primary
//! location. Used to decide which table entries are worth adding.

use crate::locations::CoordinateTable;
use crate::models::ArticleRecord;
use crate::outputs::{load_records, write_json};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::error::Error;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationCount {
    pub location: String,
    pub articles: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    pub articles: usize,
    pub unique_locations: usize,
    /// Sorted.
    pub matched: Vec<String>,
    /// Sorted.
    pub unmatched: Vec<String>,
    /// Articles per plottable primary location, most first.
    pub primary_counts: Vec<LocationCount>,
}

/// Compare the locations of `records` against `coords`.
///
/// # Arguments
///
/// * `records` - Annotated records
/// * `coords` - Table deciding what can be plotted
///
/// # Returns
///
/// A [`CoverageReport`]. Locations are trimmed; blank ones are ignored.
/// Only primary locations with a coordinate are counted in
/// `primary_counts`, ties ordered by name.
pub fn coverage(records: &[ArticleRecord], coords: &CoordinateTable) -> CoverageReport {
    let mut matched = BTreeSet::new();
    let mut unmatched = BTreeSet::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for record in records {
        for location in &record.location {
            let location = location.trim();
            if location.is_empty() {
                continue;
            }
            if coords.contains(location) {
                matched.insert(location.to_string());
            } else {
                unmatched.insert(location.to_string());
            }
        }
        if let Some(primary) = record.primary_location() {
            if coords.contains(primary) {
                *counts.entry(primary).or_default() += 1;
            }
        }
    }

    let mut primary_counts: Vec<LocationCount> = counts
        .into_iter()
        .map(|(location, articles)| LocationCount {
            location: location.to_string(),
            articles,
        })
        .collect();
    primary_counts.sort_by(|a, b| b.articles.cmp(&a.articles).then_with(|| a.location.cmp(&b.location)));

    CoverageReport {
        articles: records.len(),
        unique_locations: matched.len() + unmatched.len(),
        matched: matched.into_iter().collect(),
        unmatched: unmatched.into_iter().collect(),
        primary_counts,
    }
}

/// Compute the coverage report of `input`, optionally writing it as JSON.
#[instrument(level = "info", skip_all, fields(%input))]
pub async fn report(
    input: &str,
    output: Option<&str>,
    coords: &CoordinateTable,
) -> Result<CoverageReport, Box<dyn Error>> {
    let records = load_records(input).await?;
    let report = coverage(&records, coords);

    info!(
        articles = report.articles,
        unique = report.unique_locations,
        matched = report.matched.len(),
        unmatched = report.unmatched.len(),
        "Location coverage"
    );
    for missing in &report.unmatched {
        debug!(location = %missing, "No coordinate");
    }
    for entry in report.primary_counts.iter().take(10) {
        info!(location = %entry.location, articles = entry.articles, "Primary location");
    }

    if let Some(path) = output {
        write_json(path, &report).await?;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(locations: &[&str]) -> ArticleRecord {
        ArticleRecord {
            location: locations.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_matched_and_unmatched() {
        let records = vec![
            article(&["Italy", "Lombardy", "Cremona"]),
            article(&["Some Village", "Italy"]),
            article(&[]),
        ];
        let report = coverage(&records, &CoordinateTable::builtin());
        assert_eq!(report.articles, 3);
        assert_eq!(report.matched, vec!["Italy", "Lombardy"]);
        assert_eq!(report.unmatched, vec!["Cremona", "Some Village"]);
        assert_eq!(report.unique_locations, 4);
    }

    #[test]
    fn test_primary_counts_sorted_descending() {
        let records = vec![
            article(&["Texas"]),
            article(&["Italy", "Texas"]),
            article(&["Italy"]),
            article(&["Italy"]),
            article(&["Nowhere", "Italy"]),
        ];
        let report = coverage(&records, &CoordinateTable::builtin());
        assert_eq!(
            report.primary_counts,
            vec![
                LocationCount { location: "Italy".into(), articles: 3 },
                LocationCount { location: "Texas".into(), articles: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn test_report_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.jsonl");
        let output = dir.path().join("coverage.json");
        std::fs::write(&input, "{\"location\":[\"Wuhan\"]}\n{\"location\":[\"Atlantis\"]}\n").unwrap();

        let report = report(
            input.to_str().unwrap(),
            Some(output.to_str().unwrap()),
            &CoordinateTable::builtin(),
        )
        .await
        .unwrap();
        assert_eq!(report.unmatched, vec!["Atlantis"]);

        let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["primary_counts"][0]["location"], "Wuhan");
    }
}
