//! Data models for article records and their analysis annotations.
//!
//! - [`ArticleRecord`]: one collected article, as read from and written to JSONL
//! - [`GptAnalysis`]: typed, lenient view over the opaque `gpt_analysis` object
//!
//! Every field of [`ArticleRecord`] has a documented default, so a record
//! missing a field (or carrying `null`) still parses. Keys the schema does not
//! name are kept in [`ArticleRecord::extra`] and written back unchanged.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A collected news article.
///
/// # Defaults
///
/// | field          | when missing or `null` |
/// |----------------|------------------------|
/// | `publish_date` | `""`                   |
/// | `source`       | `""`                   |
/// | `headline`     | `""`                   |
/// | `url`          | `""`                   |
/// | `article_text` | `""`                   |
/// | `location`     | `[]`                   |
/// | `gpt_analysis` | absent                 |
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ArticleRecord {
    /// Publication date as reported by the search engine; not validated.
    #[serde(default, deserialize_with = "null_as_default")]
    pub publish_date: String,
    /// Outlet name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headline: String,
    /// Unique key within a corpus.
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    /// Scraped body text; empty when scraping failed.
    #[serde(default, deserialize_with = "null_as_default")]
    pub article_text: String,
    /// Canonical locations, primary first.
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: Vec<String>,
    /// Qualitative analysis produced upstream; passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpt_analysis: Option<Value>,
    /// Any other keys of the input record.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ArticleRecord {
    /// The first location, by convention the one the article is "about".
    pub fn primary_location(&self) -> Option<&str> {
        self.location
            .first()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
    }

    /// Typed view of the analysis object, empty when absent.
    pub fn analysis(&self) -> GptAnalysis {
        self.gpt_analysis
            .as_ref()
            .map(GptAnalysis::from_value)
            .unwrap_or_default()
    }

    /// Outlet label: the `source` field, or the registrable name of the URL host.
    ///
    /// `"https://www.nytimes.com/2020/03/..."` → `"nytimes"`.
    pub fn source_label(&self) -> Option<String> {
        let source = self.source.trim();
        if !source.is_empty() {
            return Some(source.to_string());
        }
        let parsed = url::Url::parse(&self.url).ok()?;
        let host = parsed.host_str()?;
        let parts: Vec<&str> = host.split('.').collect();
        if parts.len() >= 2 {
            Some(parts[parts.len() - 2].to_string())
        } else {
            None
        }
    }

    /// The record reduced to the exported schema: unknown keys dropped and
    /// the analysis object filled with every category.
    pub fn to_export_schema(&self) -> ArticleRecord {
        let analysis = serde_json::to_value(self.analysis()).unwrap_or(Value::Null);
        ArticleRecord {
            gpt_analysis: Some(analysis),
            extra: Map::new(),
            ..self.clone()
        }
    }
}

/// Qualitative tags attached to an article by the upstream LLM stage.
///
/// Built with [`GptAnalysis::from_value`], which tolerates missing fields,
/// `null`s and a bare string where a list is expected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct GptAnalysis {
    pub tone: String,
    pub framing: String,
    pub group_mentions: Vec<String>,
    pub metaphors: Vec<String>,
    pub euphemisms: Vec<String>,
    pub absences: Vec<String>,
    pub grief_handling: String,
    pub blame_or_agency: String,
    pub commodification_of_death: String,
}

/// Analysis categories in export order.
pub const ANALYSIS_CATEGORIES: [&str; 9] = [
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

impl GptAnalysis {
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| scalar_text(value.get(key));
        let list = |key: &str| list_text(value.get(key));
        Self {
            tone: text("tone"),
            framing: text("framing"),
            group_mentions: list("group_mentions"),
            metaphors: list("metaphors"),
            euphemisms: list("euphemisms"),
            absences: list("absences"),
            grief_handling: text("grief_handling"),
            blame_or_agency: text("blame_or_agency"),
            commodification_of_death: text("commodification_of_death"),
        }
    }

    /// All text of one category, list entries as separate items.
    pub fn category(&self, name: &str) -> Vec<&str> {
        match name {
            "tone" => vec![self.tone.as_str()],
            "framing" => vec![self.framing.as_str()],
            "group_mentions" => self.group_mentions.iter().map(String::as_str).collect(),
            "metaphors" => self.metaphors.iter().map(String::as_str).collect(),
            "euphemisms" => self.euphemisms.iter().map(String::as_str).collect(),
            "absences" => self.absences.iter().map(String::as_str).collect(),
            "grief_handling" => vec![self.grief_handling.as_str()],
            "blame_or_agency" => vec![self.blame_or_agency.as_str()],
            "commodification_of_death" => vec![self.commodification_of_death.as_str()],
            _ => Vec::new(),
        }
    }
}

fn scalar_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| scalar_text(Some(v)))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
    }
}

fn list_text(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| scalar_text(Some(v)))
            .filter(|s| !s.is_empty())
            .collect(),
        other => {
            let single = scalar_text(other);
            if single.is_empty() {
                Vec::new()
            } else {
                vec![single]
            }
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_defaults_for_missing_and_null_fields() {
        let record: ArticleRecord =
            serde_json::from_str(r#"{"headline": null, "url": "https://x.test/a"}"#).unwrap();
        assert_eq!(record.headline, "");
        assert_eq!(record.article_text, "");
        assert_eq!(record.url, "https://x.test/a");
        assert!(record.location.is_empty());
        assert!(record.gpt_analysis.is_none());
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let line = r#"{"headline":"H","rank":3,"meta":{"k":"v"}}"#;
        let record: ArticleRecord = serde_json::from_str(line).unwrap();
        assert_eq!(record.extra.get("rank"), Some(&json!(3)));

        let out: Value = serde_json::to_value(&record).unwrap();
        assert_eq!(out["meta"], json!({"k": "v"}));
        assert_eq!(out["location"], json!([]));
        assert!(out.get("gpt_analysis").is_none());
    }

    #[test]
    fn test_analysis_object_is_preserved_verbatim() {
        let line = r#"{"headline":"H","gpt_analysis":{"tone":"somber","extra_key":[1,2]}}"#;
        let record: ArticleRecord = serde_json::from_str(line).unwrap();
        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["gpt_analysis"], json!({"tone": "somber", "extra_key": [1, 2]}));
    }

    #[test]
    fn test_non_object_line_is_rejected() {
        assert!(serde_json::from_str::<ArticleRecord>("[1,2,3]").is_err());
        assert!(serde_json::from_str::<ArticleRecord>(r#"{"headline": 5}"#).is_err());
    }

    #[test]
    fn test_primary_location() {
        let mut record = ArticleRecord::default();
        assert_eq!(record.primary_location(), None);
        record.location = vec![" Texas ".into(), "Ohio".into()];
        assert_eq!(record.primary_location(), Some("Texas"));
        record.location = vec!["  ".into()];
        assert_eq!(record.primary_location(), None);
    }

    #[test]
    fn test_analysis_is_lenient() {
        let value = json!({
            "tone": "clinical",
            "group_mentions": "elderly",
            "metaphors": ["war", null, "wave"],
            "absences": null,
            "grief_handling": ["muted", "brief"],
        });
        let analysis = GptAnalysis::from_value(&value);
        assert_eq!(analysis.tone, "clinical");
        assert_eq!(analysis.group_mentions, vec!["elderly"]);
        assert_eq!(analysis.metaphors, vec!["war", "wave"]);
        assert!(analysis.absences.is_empty());
        assert_eq!(analysis.grief_handling, "muted; brief");
        assert_eq!(analysis.framing, "");
    }

    #[test]
    fn test_category_lookup() {
        let analysis = GptAnalysis {
            tone: "grim".into(),
            metaphors: vec!["battle".into(), "storm".into()],
            ..Default::default()
        };
        assert_eq!(analysis.category("tone"), vec!["grim"]);
        assert_eq!(analysis.category("metaphors"), vec!["battle", "storm"]);
        assert!(analysis.category("unknown").is_empty());
        assert_eq!(ANALYSIS_CATEGORIES.len(), 9);
    }

    #[test]
    fn test_source_label_prefers_source_field() {
        let mut record = ArticleRecord {
            url: "https://www.nytimes.com/2020/03/12/nyregion/coronavirus.html".into(),
            ..Default::default()
        };
        assert_eq!(record.source_label(), Some("nytimes".to_string()));
        record.source = "The New York Times".into();
        assert_eq!(record.source_label(), Some("The New York Times".to_string()));
        record.source.clear();
        record.url = "not a url".into();
        assert_eq!(record.source_label(), None);
    }

    #[test]
    fn test_export_schema_fills_analysis_and_drops_extras() {
        let line = r#"{"headline":"H","rank":1,"gpt_analysis":{"tone":"calm"}}"#;
        let record: ArticleRecord = serde_json::from_str(line).unwrap();
        let exported = serde_json::to_value(record.to_export_schema()).unwrap();
        assert!(exported.get("rank").is_none());
        assert_eq!(exported["gpt_analysis"]["tone"], "calm");
        assert_eq!(exported["gpt_analysis"]["metaphors"], json!([]));
        assert_eq!(exported["article_text"], "");
        assert_eq!(exported["location"], json!([]));
    }
}
