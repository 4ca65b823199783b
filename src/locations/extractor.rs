//! Location extraction: entity recognition unioned with deterministic
//! abbreviation rules.
//!
//! The recognizer finds multiword names ("San Francisco Bay Area") that the
//! rules cannot; the rules find bare abbreviations ("NY", "TX") that
//! recognizers tend to miss. Results come back ordered: recognizer hits in
//! text order, then rule hits in text order, first occurrence kept. Index 0
//! is therefore a reproducible primary location.

use crate::locations::aliases::AliasTable;
use crate::locations::recognizer::EntityRecognizer;
use crate::utils::truncate_for_log;
use itertools::Itertools;
use tracing::{debug, warn};

const LEADING_PUNCT: &[char] = &['"', '\'', '(', '[', '“', '‘', '«'];
const TRAILING_PUNCT: &[char] = &['"', '\'', ')', ']', ',', ';', ':', '!', '?', '”', '’', '»'];

/// Extracts canonical location names from free text.
///
/// Borrows its alias table and recognizer; both are built once by the caller.
pub struct LocationExtractor<'a> {
    aliases: &'a AliasTable,
    recognizer: &'a dyn EntityRecognizer,
}

impl<'a> LocationExtractor<'a> {
    pub fn new(aliases: &'a AliasTable, recognizer: &'a dyn EntityRecognizer) -> Self {
        Self {
            aliases,
            recognizer,
        }
    }

    /// Canonical locations mentioned in `text`, deduplicated, primary first.
    ///
    /// A recognizer failure is logged and the text falls back to the pattern
    /// rules alone.
    ///
    /// # Arguments
    ///
    /// * `text` - A headline or article body
    ///
    /// # Returns
    ///
    /// Canonical names in order: recognizer hits by position, then
    /// abbreviation and `in <token>` hits by position. Empty for blank text.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let found = extractor.extract("Cases rise in NY");
    /// assert_eq!(found.first().map(String::as_str), Some("New York"));
    /// ```
    pub fn extract(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let recognized = self.from_entities(text);
        let patterned = self.from_patterns(text);
        debug!(
            recognized = recognized.len(),
            patterned = patterned.len(),
            "Extracted location candidates"
        );

        recognized
            .into_iter()
            .chain(patterned)
            .filter(|name| !name.is_empty())
            .unique()
            .collect()
    }

    fn from_entities(&self, text: &str) -> Vec<String> {
        match self.recognizer.recognize(text) {
            Ok(mut entities) => {
                entities.sort_by_key(|e| e.start);
                entities
                    .into_iter()
                    .filter(|e| e.is_place())
                    .map(|e| self.aliases.normalize(&e.text))
                    .collect()
            }
            Err(e) => {
                warn!(
                    recognizer = self.recognizer.name(),
                    error = %e,
                    text_preview = %truncate_for_log(text, 80),
                    "Entity recognizer failed; using pattern rules only"
                );
                Vec::new()
            }
        }
    }

    fn from_patterns(&self, text: &str) -> Vec<String> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let mut found = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            if let Some(canonical) = self.bare_abbreviation(token) {
                found.push(canonical.to_string());
            }
            if token.eq_ignore_ascii_case("in") {
                if let Some(canonical) = tokens.get(i + 1).and_then(|next| self.any_alias(next)) {
                    found.push(canonical.to_string());
                }
            }
        }

        found
    }

    /// A token written like an abbreviation: capitalized and either without
    /// lowercase letters ("NY", "U.S.") or matching a dotted key ("Calif.").
    fn bare_abbreviation(&self, token: &str) -> Option<&'a str> {
        let core = token_core(token);
        if !core.chars().next().is_some_and(char::is_uppercase) {
            return None;
        }
        let all_caps = !core.chars().any(char::is_lowercase);
        let aliases = self.aliases;
        token_candidates(core)
            .find_map(|candidate| {
                aliases
                    .resolve(candidate)
                    .filter(|_| all_caps || candidate.contains('.'))
            })
    }

    /// Any spelling of an alias key, used after "in".
    fn any_alias(&self, token: &str) -> Option<&'a str> {
        let aliases = self.aliases;
        token_candidates(token_core(token)).find_map(|candidate| aliases.resolve(candidate))
    }
}

/// Strip surrounding punctuation (keeping a final period) and a possessive.
fn token_core(token: &str) -> &str {
    let trimmed = token
        .trim_start_matches(LEADING_PUNCT)
        .trim_end_matches(TRAILING_PUNCT);
    trimmed
        .strip_suffix("'s")
        .or_else(|| trimmed.strip_suffix("’s"))
        .unwrap_or(trimmed)
}

/// The core itself, then the core without a sentence-final period.
fn token_candidates(core: &str) -> impl Iterator<Item = &str> {
    let without_period = core.strip_suffix('.').filter(|s| !s.is_empty());
    std::iter::once(core)
        .chain(without_period)
        .filter(|c| c.chars().any(char::is_alphabetic))
}
