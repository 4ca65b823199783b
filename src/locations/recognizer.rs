//! Named-entity recognition seam.
//!
//! The extractor only needs "spans of text tagged place / not a place". Any
//! tagger can sit behind [`EntityRecognizer`]; the crate ships
//! [`GazetteerRecognizer`], a dictionary-driven tagger that finds full place
//! names in capitalized word runs.

use crate::locations::aliases::AliasTable;
use crate::locations::coords::CoordinateTable;
use std::collections::HashSet;
use std::error::Error;

pub type RecognizerError = Box<dyn Error + Send + Sync>;

/// Coarse entity category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Geopolitical entity or generic location.
    Place,
    Other,
}

/// A tagged span. `start..end` are byte offsets into the recognized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedEntity {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub kind: EntityKind,
}

impl RecognizedEntity {
    pub fn is_place(&self) -> bool {
        self.kind == EntityKind::Place
    }
}

/// Trait for pluggable entity taggers.
///
/// Constructed once at startup and lent to the extractor; implementations
/// must not keep per-call state.
pub trait EntityRecognizer {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Tag entities in `text`. An error means the tagger could not process
    /// this text at all.
    fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>, RecognizerError>;
}

/// Place names known to the gazetteer besides the coordinate and alias tables.
const BUILTIN_PLACES: &[&str] = &[
    "Argentina", "Australia", "Austria", "Bangladesh", "Belgium", "Brazil", "Chile",
    "Colombia", "Denmark", "Egypt", "Ethiopia", "Finland", "Greece", "India",
    "Indonesia", "Ireland", "Israel", "Kenya", "Mexico", "Netherlands", "New Zealand",
    "Nigeria", "North Korea", "Norway", "Pakistan", "Peru", "Philippines", "Poland",
    "Portugal", "Russia", "Saudi Arabia", "Singapore", "South Africa", "Sweden",
    "Switzerland", "Taiwan", "Thailand", "Turkey", "Ukraine", "Vietnam", "England",
    "Scotland", "Wales", "London", "Paris", "Madrid", "Rome", "Berlin", "Moscow",
    "Seoul", "Daegu", "Shanghai", "Hubei", "Tehran", "Qom", "Geneva", "Brussels",
    "Toronto", "Vancouver", "Montreal", "Mexico City", "Sao Paulo", "Johannesburg",
    "Lagos", "Cairo", "Delhi", "New Delhi", "Mumbai", "Sydney", "Melbourne",
    "Seattle", "Chicago", "Boston", "Houston", "Dallas", "Atlanta", "Miami",
    "Detroit", "Philadelphia", "Baltimore", "Phoenix", "Denver", "Portland",
    "Sacramento", "San Diego", "San Jose", "Oakland", "Brooklyn", "Queens",
    "Bronx", "Staten Island", "Long Island", "Westchester", "New Rochelle",
    "Santa Clara", "Marin County", "King County", "Cook County", "Silicon Valley",
    "Puerto Rico", "Guam", "Diamond Princess", "Middle East", "Latin America",
    "South America", "North America", "Southeast Asia", "Scandinavia",
];

/// Lowercase connectors allowed inside a multiword place name.
const CONNECTORS: &[&str] = &["of", "the", "and"];

const LEADING_PUNCT: &[char] = &['"', '\'', '(', '[', '“', '‘', '«'];
const TRAILING_PUNCT: &[char] = &['"', '\'', ')', ']', ',', ';', ':', '!', '?', '.', '”', '’', '»'];

/// Dictionary-driven recognizer: longest match of known place names over
/// runs of capitalized words.
#[derive(Debug, Clone)]
pub struct GazetteerRecognizer {
    places: HashSet<String>,
    max_words: usize,
}

impl Default for GazetteerRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl GazetteerRecognizer {
    /// A gazetteer holding only the built-in place list.
    pub fn new() -> Self {
        let mut recognizer = Self {
            places: HashSet::new(),
            max_words: 1,
        };
        for place in BUILTIN_PLACES {
            recognizer.add(place);
        }
        recognizer
    }

    /// Built-in places plus every name the alias and coordinate tables know.
    pub fn from_tables(aliases: &AliasTable, coords: &CoordinateTable) -> Self {
        let mut recognizer = Self::new();
        for name in coords.names() {
            recognizer.add(name);
        }
        for name in aliases.canonical_names() {
            recognizer.add(name);
        }
        for key in aliases.multiword_keys() {
            recognizer.add(key);
        }
        recognizer
    }

    pub fn add(&mut self, place: &str) {
        let place = place.trim();
        if place.is_empty() {
            return;
        }
        let words = place.split_whitespace().count();
        self.max_words = self.max_words.max(words);
        self.places.insert(place.to_lowercase());
    }

    pub fn contains(&self, place: &str) -> bool {
        self.places.contains(&place.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    fn matches(&self, words: &[Word<'_>]) -> bool {
        let phrase = words.iter().map(|w| w.core).collect::<Vec<_>>().join(" ");
        let lowered = phrase.to_lowercase();
        self.places.contains(&lowered)
            || lowered
                .strip_suffix('.')
                .is_some_and(|trimmed| self.places.contains(trimmed))
    }

    fn window_ok(words: &[Word<'_>]) -> bool {
        let (Some(first), Some(last)) = (words.first(), words.last()) else {
            return false;
        };
        if !first.capitalized || !last.capitalized {
            return false;
        }
        let inner = words.len().saturating_sub(2);
        words[..words.len() - 1].iter().all(|w| !w.breaks_after)
            && words
                .iter()
                .skip(1)
                .take(inner)
                .all(|w| w.capitalized || CONNECTORS.contains(&w.core))
    }
}

impl EntityRecognizer for GazetteerRecognizer {
    fn name(&self) -> &str {
        "gazetteer"
    }

    fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>, RecognizerError> {
        let words = split_words(text);
        let mut entities = Vec::new();
        let mut i = 0;

        while i < words.len() {
            if !words[i].capitalized {
                i += 1;
                continue;
            }
            let longest = self.max_words.min(words.len() - i);
            let hit = (1..=longest).rev().find(|&n| {
                let window = &words[i..i + n];
                Self::window_ok(window) && self.matches(window)
            });
            match hit {
                Some(n) => {
                    let start = words[i].start;
                    let end = words[i + n - 1].end;
                    entities.push(RecognizedEntity {
                        text: text[start..end].to_string(),
                        start,
                        end,
                        kind: EntityKind::Place,
                    });
                    i += n;
                }
                None => i += 1,
            }
        }

        Ok(entities)
    }
}

/// A whitespace token with surrounding punctuation and possessive removed.
#[derive(Debug, Clone, Copy)]
struct Word<'a> {
    core: &'a str,
    start: usize,
    end: usize,
    capitalized: bool,
    breaks_after: bool,
}

fn split_words(text: &str) -> Vec<Word<'_>> {
    let mut words = Vec::new();
    for raw in text.split_whitespace() {
        // split_whitespace yields subslices of `text`
        let raw_start = raw.as_ptr() as usize - text.as_ptr() as usize;

        let lead = raw.len() - raw.trim_start_matches(LEADING_PUNCT).len();
        let body = &raw[lead..];
        let mut core = strip_possessive(body.trim_end_matches(TRAILING_PUNCT));
        // keep the final period of dotted abbreviations such as "D.C."
        if core.contains('.') && body[core.len()..].starts_with('.') {
            core = &body[..core.len() + 1];
        }
        if core.is_empty() {
            continue;
        }
        let breaks_after = body.len() > core.len()
            && body[core.len()..].contains([',', ';', ':', '!', '?', '.', ')', ']']);
        words.push(Word {
            core,
            start: raw_start + lead,
            end: raw_start + lead + core.len(),
            capitalized: core.chars().next().is_some_and(char::is_uppercase),
            breaks_after,
        });
    }
    words
}

fn strip_possessive(s: &str) -> &str {
    s.strip_suffix("'s")
        .or_else(|| s.strip_suffix("’s"))
        .unwrap_or(s)
}
