//! Alias table mapping raw location tokens to canonical place names.
//!
//! Keys are stored uppercase so lookups are case-insensitive. The built-in
//! table covers US state postal codes, common country and city abbreviations,
//! dotted newspaper-style abbreviations (`Calif.`, `Conn.`) and long-form
//! variants produced by entity recognizers (`The United States`).

use crate::utils::title_case;
use std::collections::HashMap;

/// Built-in alias registrations, in registration order.
///
/// `LA` is the Louisiana postal code here; Los Angeles is reached through
/// `L.A.` and the full name.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("NYC", "New York City"),
    ("N.Y.C.", "New York City"),
    ("NY", "New York"),
    ("N.Y.", "New York"),
    ("U.S.", "United States"),
    ("US", "United States"),
    ("USA", "United States"),
    ("U.S.A.", "United States"),
    ("THE UNITED STATES", "United States"),
    ("THE UNITED STATES OF AMERICA", "United States"),
    ("UNITED STATES OF AMERICA", "United States"),
    ("THE U.S.", "United States"),
    ("UK", "United Kingdom"),
    ("U.K.", "United Kingdom"),
    ("THE UNITED KINGDOM", "United Kingdom"),
    ("DC", "Washington DC"),
    ("D.C.", "Washington DC"),
    ("WASHINGTON, D.C.", "Washington DC"),
    ("WASHINGTON D.C.", "Washington DC"),
    ("SF", "San Francisco"),
    ("L.A.", "Los Angeles"),
    ("THE BAY AREA", "San Francisco Bay Area"),
    ("BAY AREA", "San Francisco Bay Area"),
    ("THE SAN FRANCISCO BAY AREA", "San Francisco Bay Area"),
    ("NEW YORK CITY'S", "New York City"),
    ("NEW YORK CITY REGION", "New York City"),
    ("CALIF.", "California"),
    ("CONN.", "Connecticut"),
    ("WASH.", "Washington"),
    ("MASS.", "Massachusetts"),
    ("ILL.", "Illinois"),
    ("MICH.", "Michigan"),
    ("FLA.", "Florida"),
    ("ARK.", "Arkansas"),
    ("KY.", "Kentucky"),
    ("VA.", "Virginia"),
    ("N.J.", "New Jersey"),
    ("CA", "California"),
    ("TX", "Texas"),
    ("FL", "Florida"),
    ("IL", "Illinois"),
    ("MI", "Michigan"),
    ("PA", "Pennsylvania"),
    ("WA", "Washington"),
    ("OR", "Oregon"),
    ("GA", "Georgia"),
    ("MA", "Massachusetts"),
    ("NJ", "New Jersey"),
    ("CT", "Connecticut"),
    ("MD", "Maryland"),
    ("VA", "Virginia"),
    ("NC", "North Carolina"),
    ("SC", "South Carolina"),
    ("TN", "Tennessee"),
    ("KY", "Kentucky"),
    ("OH", "Ohio"),
    ("IN", "Indiana"),
    ("WI", "Wisconsin"),
    ("MN", "Minnesota"),
    ("IA", "Iowa"),
    ("MO", "Missouri"),
    ("AR", "Arkansas"),
    ("LA", "Louisiana"),
    ("MS", "Mississippi"),
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("HI", "Hawaii"),
    ("AZ", "Arizona"),
    ("NM", "New Mexico"),
    ("NV", "Nevada"),
    ("UT", "Utah"),
    ("CO", "Colorado"),
    ("WY", "Wyoming"),
    ("MT", "Montana"),
    ("ID", "Idaho"),
    ("ND", "North Dakota"),
    ("SD", "South Dakota"),
    ("NE", "Nebraska"),
    ("KS", "Kansas"),
    ("OK", "Oklahoma"),
    ("ME", "Maine"),
    ("NH", "New Hampshire"),
    ("VT", "Vermont"),
    ("RI", "Rhode Island"),
    ("DE", "Delaware"),
];

/// Case-insensitive mapping from raw location tokens to canonical names.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: HashMap<String, String>,
}

impl AliasTable {
    /// An empty table. `normalize` degrades to plain title-casing.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table, with every canonical name also resolvable by itself.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for (raw, canonical) in BUILTIN_ALIASES {
            table.register(raw, canonical);
        }
        table.register_canonical_names();
        table
    }

    /// Register `raw` as an alias of `canonical`. A later registration of the
    /// same key replaces the earlier one.
    pub fn register(&mut self, raw: &str, canonical: &str) {
        let key = raw.trim().to_uppercase();
        if key.is_empty() {
            return;
        }
        if let Some(previous) = self.entries.insert(key.clone(), canonical.to_string()) {
            if previous != canonical {
                tracing::debug!(%key, %previous, %canonical, "Alias re-registered");
            }
        }
    }

    /// Make each canonical name resolve to itself unless its key is taken.
    ///
    /// Keeps `normalize` idempotent for canonical names whose title-cased form
    /// differs from their canonical spelling (`Washington DC`).
    pub fn register_canonical_names(&mut self) {
        let canonicals: Vec<String> = self.entries.values().cloned().collect();
        for canonical in canonicals {
            self.entries
                .entry(canonical.to_uppercase())
                .or_insert(canonical);
        }
    }

    /// Exact case-insensitive key lookup.
    pub fn resolve(&self, token: &str) -> Option<&str> {
        self.entries
            .get(&token.to_uppercase())
            .map(String::as_str)
    }

    /// Canonicalize a raw location token.
    ///
    /// The token is title-cased first; if an alias exists for it the mapped
    /// canonical name is returned, otherwise the title-cased token is.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let table = AliasTable::builtin();
    /// assert_eq!(table.normalize("calif."), "California");
    /// assert_eq!(table.normalize("lombardy"), "Lombardy");
    /// ```
    pub fn normalize(&self, token: &str) -> String {
        let titled = title_case(token.trim());
        match self.resolve(&titled) {
            Some(canonical) => canonical.to_string(),
            None => titled,
        }
    }

    /// Canonical names reachable through the table, deduplicated and sorted.
    pub fn canonical_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.values().map(String::as_str).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Raw keys (uppercase) that contain whitespace, i.e. long-form variants.
    pub fn multiword_keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .keys()
            .map(String::as_str)
            .filter(|k| k.contains(char::is_whitespace))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
