//! JSON export of an annotated corpus.
//!
//! Reads annotated JSONL and writes a single pretty-printed JSON array in
//! which every record carries the full schema: all base fields, `location`,
//! and a `gpt_analysis` object with every category (empty when unknown).
//! Keys outside the schema are dropped.

use crate::models::ArticleRecord;
use crate::outputs::{load_records, write_json};
use std::error::Error;
use tracing::{info, instrument};

/// Records reduced to the export schema, input order kept.
pub fn to_export_records(records: &[ArticleRecord]) -> Vec<ArticleRecord> {
    records.iter().map(ArticleRecord::to_export_schema).collect()
}

/// Convert `input` (JSONL or JSON array) into a JSON array file at `output`.
#[instrument(level = "info", skip_all, fields(%input, %output))]
pub async fn export_json(input: &str, output: &str) -> Result<usize, Box<dyn Error>> {
    let records = load_records(input).await?;
    let exported = to_export_records(&records);
    write_json(output, &exported).await?;
    info!(count = exported.len(), "Conversion complete");
    Ok(exported.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[tokio::test]
    async fn test_export_json_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.jsonl");
        let output = dir.path().join("out.json");
        std::fs::write(
            &input,
            concat!(
                "{\"headline\":\"A\",\"location\":[\"Texas\"],\"junk\":true}\n",
                "garbage\n",
                "{\"url\":\"u\",\"gpt_analysis\":{\"tone\":\"grim\",\"metaphors\":[\"war\"]}}\n",
            ),
        )
        .unwrap();

        let count = export_json(input.to_str().unwrap(), output.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(count, 2);

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        let items = written.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].get("junk").is_none());
        assert_eq!(items[0]["location"][0], "Texas");
        assert_eq!(items[0]["gpt_analysis"]["tone"], "");
        assert_eq!(items[1]["publish_date"], "");
        assert_eq!(items[1]["gpt_analysis"]["metaphors"][0], "war");
        assert_eq!(items[1]["gpt_analysis"]["absences"], serde_json::json!([]));
    }
}
