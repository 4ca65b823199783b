//! Map markers for a coverage map, written as GeoJSON.
//!
//! Articles are grouped by their primary location. Groups whose location has
//! no coordinate are left out. Each marker carries the article count, a
//! coverage tier for styling, and short summaries of the first articles.
//! Marker points are jittered slightly so nearby places do not stack.

use crate::locations::{Coordinate, CoordinateTable};
use crate::models::ArticleRecord;
use crate::outputs::{load_records, write_json};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng, rng};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::error::Error;
use tracing::{debug, info, instrument};

/// Summaries attached to one marker.
pub const SUMMARIES_PER_MARKER: usize = 3;
/// Largest accepted jitter, in degrees.
pub const MAX_JITTER: f64 = 10.0;
const GROUPS_PER_SUMMARY: usize = 3;
const METAPHORS_PER_SUMMARY: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapOptions {
    /// Keep only locations flagged domestic in the coordinate table.
    pub domestic_only: bool,
    /// Maximum offset in degrees applied to each axis. Values that are not
    /// finite or not positive disable jitter; larger values are capped at
    /// [`MAX_JITTER`].
    pub jitter: f64,
    /// Fixed seed for reproducible jitter.
    pub seed: Option<u64>,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            domestic_only: false,
            jitter: 0.3,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageTier {
    Major,
    Significant,
    Moderate,
    Mentioned,
}

impl CoverageTier {
    pub fn for_count(count: usize) -> Self {
        match count {
            10.. => CoverageTier::Major,
            5..=9 => CoverageTier::Significant,
            2..=4 => CoverageTier::Moderate,
            _ => CoverageTier::Mentioned,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleSummary {
    pub headline: String,
    pub source: String,
    pub tone: String,
    pub framing: String,
    pub groups: Vec<String>,
    pub metaphors: Vec<String>,
}

impl ArticleSummary {
    pub fn from_record(record: &ArticleRecord) -> Self {
        let analysis = record.analysis();
        let or = |s: &str, fallback: &str| {
            if s.trim().is_empty() {
                fallback.to_string()
            } else {
                s.trim().to_string()
            }
        };
        Self {
            headline: or(&record.headline, "No headline"),
            source: record
                .source_label()
                .unwrap_or_else(|| "Unknown source".to_string()),
            tone: or(&analysis.tone, "Unknown"),
            framing: or(&analysis.framing, "Unknown"),
            groups: analysis.group_mentions.into_iter().take(GROUPS_PER_SUMMARY).collect(),
            metaphors: analysis.metaphors.into_iter().take(METAPHORS_PER_SUMMARY).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub location: String,
    pub count: usize,
    pub tier: CoverageTier,
    /// Table coordinate of the location.
    pub anchor: Coordinate,
    /// Jittered point the marker is drawn at.
    pub point: Coordinate,
    pub domestic: bool,
    pub articles: Vec<ArticleSummary>,
    /// Articles beyond the attached summaries.
    pub more: usize,
}

impl Marker {
    fn to_feature(&self) -> Value {
        json!({
            "type": "Feature",
            "geometry": {
                "type": "Point",
                "coordinates": [self.point.lon, self.point.lat],
            },
            "properties": {
                "location": self.location,
                "count": self.count,
                "tier": self.tier,
                "anchor": [self.anchor.lon, self.anchor.lat],
                "domestic": self.domestic,
                "articles": self.articles,
                "more": self.more,
            },
        })
    }
}

/// Group `records` by plottable primary location, largest group first.
///
/// # Arguments
///
/// * `records` - Annotated records; those without a primary location are skipped
/// * `coords` - Coordinates and domestic flags
/// * `options` - Domestic filter and jitter settings
///
/// # Returns
///
/// One [`Marker`] per location, ordered by article count and then by name.
/// With a `seed` the jittered points are identical across runs.
pub fn build_markers(
    records: &[ArticleRecord],
    coords: &CoordinateTable,
    options: &MapOptions,
) -> Vec<Marker> {
    let mut groups: HashMap<&str, Vec<&ArticleRecord>> = HashMap::new();
    for record in records {
        let Some(primary) = record.primary_location() else {
            continue;
        };
        if !coords.contains(primary) {
            continue;
        }
        if options.domestic_only && !coords.is_domestic(primary) {
            continue;
        }
        groups.entry(primary).or_default().push(record);
    }

    let mut grouped: Vec<(&str, Vec<&ArticleRecord>)> = groups.into_iter().collect();
    grouped.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));

    let mut jitter_rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rng()),
    };

    grouped
        .into_iter()
        .filter_map(|(location, articles)| {
            let anchor = coords.lookup(location)?;
            let point = if options.jitter.is_finite() && options.jitter > 0.0 {
                let max = options.jitter.min(MAX_JITTER);
                anchor.offset(
                    jitter_rng.random_range(-max..=max),
                    jitter_rng.random_range(-max..=max),
                )
            } else {
                anchor
            };
            let count = articles.len();
            debug!(%location, count, "Built marker");
            Some(Marker {
                location: location.to_string(),
                count,
                tier: CoverageTier::for_count(count),
                anchor,
                point,
                domestic: coords.is_domestic(location),
                articles: articles
                    .iter()
                    .take(SUMMARIES_PER_MARKER)
                    .map(|r| ArticleSummary::from_record(r))
                    .collect(),
                more: count.saturating_sub(SUMMARIES_PER_MARKER),
            })
        })
        .collect()
}

/// Markers as a GeoJSON `FeatureCollection`.
pub fn to_geojson(markers: &[Marker], total_articles: usize) -> Value {
    json!({
        "type": "FeatureCollection",
        "generated_at": Utc::now().to_rfc3339(),
        "total_articles": total_articles,
        "features": markers.iter().map(Marker::to_feature).collect::<Vec<_>>(),
    })
}

/// Build markers for `input` and write them to `output` as GeoJSON.
///
/// Returns the number of markers written.
#[instrument(level = "info", skip_all, fields(%input, %output, domestic_only = options.domestic_only))]
pub async fn write_map(
    input: &str,
    output: &str,
    coords: &CoordinateTable,
    options: &MapOptions,
) -> Result<usize, Box<dyn Error>> {
    let records = load_records(input).await?;
    let markers = build_markers(&records, coords, options);
    let plotted: usize = markers.iter().map(|m| m.count).sum();
    write_json(output, &to_geojson(&markers, records.len())).await?;
    info!(
        markers = markers.len(),
        plotted,
        articles = records.len(),
        "Map created"
    );
    Ok(markers.len())
}
