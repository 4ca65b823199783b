//! Utility functions for string casing, log truncation, JSON error
//! classification and output path preparation.

use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Title-case a string word by word.
///
/// A letter is uppercased when the preceding character is not a cased letter
/// and lowercased otherwise, so `"new york city's"` becomes
/// `"New York City'S"` and `"12th street"` becomes `"12Th Street"`. Applying
/// it twice gives the same result as applying it once.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_cased = false;
    for c in s.chars() {
        if prev_cased {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_cased = c.is_lowercase() || c.is_uppercase();
    }
    out
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a character boundary) with
/// an ellipsis and the number of dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Short label for why a line failed to parse as a record.
pub fn describe_json_error(e: &serde_json::Error) -> &'static str {
    use serde_json::error::Category;
    match e.classify() {
        Category::Eof => "truncated",
        Category::Syntax => "syntax",
        Category::Data => "schema",
        Category::Io => "io",
    }
}

/// `-` stands for stdin or stdout.
pub fn is_stdio(path: &str) -> bool {
    path == "-"
}

/// Ensure the directory that will hold `path` exists.
///
/// Paths without a parent component (or stdout) need nothing.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_parent_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if is_stdio(path) {
        return Ok(());
    }
    match Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).await?;
            info!(dir = %parent.display(), "Output directory ready");
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case_matches_word_capitalization() {
        assert_eq!(title_case("new york"), "New York");
        assert_eq!(title_case("NYC"), "Nyc");
        assert_eq!(title_case("calif."), "Calif.");
        assert_eq!(title_case("washington, d.c."), "Washington, D.C.");
        assert_eq!(title_case("new york city's"), "New York City'S");
        assert_eq!(title_case("12th street"), "12Th Street");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_title_case_is_idempotent() {
        for s in ["o'hare", "SÃO PAULO", "new-york", "  spaced  out "] {
            let once = title_case(s);
            assert_eq!(title_case(&once), once);
        }
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        let s = "é".repeat(10); // 2 bytes each
        let result = truncate_for_log(&s, 5);
        assert!(result.starts_with("éé…"));
        assert!(result.contains("(+16 bytes)"));
    }

    #[test]
    fn test_describe_json_error() {
        let eof = serde_json::from_str::<serde_json::Value>(r#"{"field": "value"#).unwrap_err();
        assert_eq!(describe_json_error(&eof), "truncated");
        let syntax = serde_json::from_str::<serde_json::Value>("{oops}").unwrap_err();
        assert_eq!(describe_json_error(&syntax), "syntax");
        let data = serde_json::from_str::<Vec<String>>("[1]").unwrap_err();
        assert_eq!(describe_json_error(&data), "schema");
    }

    #[test]
    fn test_is_stdio() {
        assert!(is_stdio("-"));
        assert!(!is_stdio("out.jsonl"));
    }

    #[tokio::test]
    async fn test_ensure_parent_dir_creates_missing_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("a/b/out.csv");
        ensure_parent_dir(target.to_str().unwrap()).await.unwrap();
        assert!(tmp.path().join("a/b").is_dir());
        ensure_parent_dir("out.csv").await.unwrap();
        ensure_parent_dir("-").await.unwrap();
    }
}
