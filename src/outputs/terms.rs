//! Word frequencies per analysis category.
//!
//! For each category all tag text across the corpus is tokenized,
//! lowercased and stripped of common English stopwords; the most frequent
//! words are kept. This is the data a word cloud is drawn from.

use crate::models::{ANALYSIS_CATEGORIES, ArticleRecord};
use crate::outputs::{load_records, write_json};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use tracing::{debug, info, instrument};

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z'\-]+").expect("static regex"));

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
        "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
        "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "else",
        "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
        "him", "his", "how", "however", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
        "me", "more", "most", "my", "no", "nor", "not", "of", "off", "on", "once", "only", "or",
        "other", "otherwise", "our", "ours", "out", "over", "own", "same", "she", "should", "so",
        "some", "such", "than", "that", "the", "their", "theirs", "them", "then", "there", "these",
        "they", "this", "those", "through", "to", "too", "under", "until", "up", "very", "was", "we",
        "were", "what", "when", "where", "which", "while", "who", "whom", "why", "with", "would",
        "you", "your", "yours",
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermCount {
    pub term: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTerms {
    pub category: String,
    /// Words counted after stopword removal.
    pub words: usize,
    pub terms: Vec<TermCount>,
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    WORD.find_iter(text).filter_map(|m| {
        let word = m.as_str().trim_matches(|c: char| c == '\'' || c == '-').to_lowercase();
        let word = word.strip_suffix("'s").map(String::from).unwrap_or(word);
        if word.len() < 2 || STOPWORDS.contains(word.as_str()) {
            None
        } else {
            Some(word)
        }
    })
}

/// Top `limit` words of every analysis category, categories in export order.
pub fn category_terms(records: &[ArticleRecord], limit: usize) -> Vec<CategoryTerms> {
    let analyses: Vec<_> = records.iter().map(ArticleRecord::analysis).collect();

    ANALYSIS_CATEGORIES
        .iter()
        .map(|&category| {
            let mut counts: HashMap<String, usize> = HashMap::new();
            for analysis in &analyses {
                for text in analysis.category(category) {
                    for word in tokens(text) {
                        *counts.entry(word).or_default() += 1;
                    }
                }
            }
            let words: usize = counts.values().sum();
            let mut terms: Vec<TermCount> = counts
                .into_iter()
                .map(|(term, count)| TermCount { term, count })
                .collect();
            terms.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
            terms.truncate(limit);
            debug!(category, words, distinct = terms.len(), "Counted terms");
            CategoryTerms {
                category: category.to_string(),
                words,
                terms,
            }
        })
        .collect()
}

#[instrument(level = "info", skip_all, fields(%input, %output, limit))]
pub async fn write_terms(input: &str, output: &str, limit: usize) -> Result<(), Box<dyn Error>> {
    let records = load_records(input).await?;
    let terms = category_terms(&records, limit);
    write_json(output, &terms).await?;
    info!(categories = terms.len(), articles = records.len(), "Term frequencies written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn article(analysis: serde_json::Value) -> ArticleRecord {
        ArticleRecord {
            gpt_analysis: Some(analysis),
            ..Default::default()
        }
    }

    #[test]
    fn test_tokens_drop_stopwords_and_possessives() {
        let words: Vec<String> = tokens("The virus's spread, and the front-line workers' fear").collect();
        assert_eq!(words, vec!["virus", "spread", "front-line", "workers", "fear"]);
    }

    #[test]
    fn test_counts_per_category() {
        let records = vec![
            article(json!({"tone": "Alarmed and urgent", "metaphors": ["war on the virus", "front lines"]})),
            article(json!({"tone": "urgent", "metaphors": "war"})),
            article(json!({})),
        ];
        let terms = category_terms(&records, 10);
        assert_eq!(terms.len(), ANALYSIS_CATEGORIES.len());

        let tone = &terms[0];
        assert_eq!(tone.category, "tone");
        assert_eq!(tone.words, 3);
        assert_eq!(tone.terms[0], TermCount { term: "urgent".into(), count: 2 });
        assert_eq!(tone.terms[1], TermCount { term: "alarmed".into(), count: 1 });

        let metaphors = terms.iter().find(|t| t.category == "metaphors").unwrap();
        assert_eq!(metaphors.terms[0], TermCount { term: "war".into(), count: 2 });

        let absences = terms.iter().find(|t| t.category == "absences").unwrap();
        assert_eq!(absences.words, 0);
        assert!(absences.terms.is_empty());
    }

    #[test]
    fn test_limit_applies() {
        let records = vec![article(json!({"framing": "alpha beta gamma delta"}))];
        let terms = category_terms(&records, 2);
        let framing = terms.iter().find(|t| t.category == "framing").unwrap();
        assert_eq!(framing.words, 4);
        let kept: Vec<&str> = framing.terms.iter().map(|t| t.term.as_str()).collect();
        assert_eq!(kept, vec!["alpha", "beta"]);
    }
}
