//! Optional YAML configuration extending the built-in lookup tables.
//!
//! ```yaml
//! aliases:
//!   "L.A.": "Los Angeles"
//!   "Big Apple": "New York City"
//! coordinates:
//!   Seattle: [47.6062, -122.3321]
//! domestic:
//!   - Seattle
//! gazetteer:
//!   - Life Care Center
//! ```
//!
//! Entries are applied over the built-in tables, so a configured alias or
//! coordinate replaces the built-in one with the same key.

use crate::locations::{AliasTable, Coordinate, CoordinateTable, GazetteerRecognizer};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::error::Error;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocatorConfig {
    /// Raw token → canonical name.
    pub aliases: BTreeMap<String, String>,
    /// Canonical name → `[lat, lon]`.
    pub coordinates: BTreeMap<String, [f64; 2]>,
    /// Names to flag as domestic for regional filtering.
    pub domestic: Vec<String>,
    /// Extra full place names for the gazetteer recognizer.
    pub gazetteer: Vec<String>,
}

/// The lookup tables a run works with, built once at startup.
#[derive(Debug, Clone)]
pub struct LocationTables {
    pub aliases: AliasTable,
    pub coords: CoordinateTable,
    pub recognizer: GazetteerRecognizer,
}

impl LocatorConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, Box<dyn Error>> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read a config file. A missing `path` yields the empty config.
    #[instrument(level = "info", skip_all, fields(path = ?path))]
    pub async fn load(path: Option<&str>) -> Result<Self, Box<dyn Error>> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let yaml = fs::read_to_string(path).await?;
        let config = Self::from_yaml(&yaml)?;
        info!(
            aliases = config.aliases.len(),
            coordinates = config.coordinates.len(),
            domestic = config.domestic.len(),
            gazetteer = config.gazetteer.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Built-in tables with this config applied on top.
    pub fn build_tables(&self) -> LocationTables {
        let mut aliases = AliasTable::builtin();
        for (raw, canonical) in &self.aliases {
            aliases.register(raw, canonical);
        }
        aliases.register_canonical_names();

        let mut coords = CoordinateTable::builtin();
        for (name, [lat, lon]) in &self.coordinates {
            if coords.set_point(name, Coordinate::new(*lat, *lon)) {
                debug!(%name, "Coordinate overrides built-in entry");
            }
        }
        for name in &self.domestic {
            if !coords.mark_domestic(name) {
                warn!(%name, "Domestic name has no coordinate; ignoring");
            }
        }

        let mut recognizer = GazetteerRecognizer::from_tables(&aliases, &coords);
        for place in &self.gazetteer {
            recognizer.add(place);
        }

        info!(
            aliases = aliases.len(),
            coordinates = coords.len(),
            gazetteer = recognizer.len(),
            "Location tables ready"
        );
        LocationTables {
            aliases,
            coords,
            recognizer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
aliases:
  "Big Apple": "New York City"
  LA: "Los Angeles"
coordinates:
  Seattle: [47.6062, -122.3321]
  Italy: [42.0, 12.0]
domestic:
  - Seattle
gazetteer:
  - Life Care Center
"#;

    #[test]
    fn test_parse_sample() {
        let config = LocatorConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.aliases.get("LA").map(String::as_str), Some("Los Angeles"));
        assert_eq!(config.coordinates["Seattle"], [47.6062, -122.3321]);
        assert_eq!(config.domestic, vec!["Seattle"]);
        assert_eq!(config.gazetteer, vec!["Life Care Center"]);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(LocatorConfig::from_yaml("alias: {}\n").is_err());
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = LocatorConfig::from_yaml("{}").unwrap();
        assert!(config.aliases.is_empty());
        assert!(config.coordinates.is_empty());
    }

    #[test]
    fn test_config_overrides_builtin_tables() {
        let tables = LocatorConfig::from_yaml(SAMPLE).unwrap().build_tables();
        assert_eq!(tables.aliases.normalize("LA"), "Los Angeles");
        assert_eq!(tables.aliases.normalize("big apple"), "New York City");
        assert_eq!(tables.coords.lookup("Italy"), Some(Coordinate::new(42.0, 12.0)));
        assert!(tables.coords.is_domestic("Seattle"));
        assert!(tables.recognizer.contains("life care center"));
        assert!(tables.recognizer.contains("seattle"));
    }

    #[test]
    fn test_coordinate_override_keeps_domestic_flag() {
        let yaml = "coordinates:\n  Texas: [31.0, -99.0]\n  italy: [1.0, 2.0]\n";
        let tables = LocatorConfig::from_yaml(yaml).unwrap().build_tables();
        assert!(tables.coords.is_domestic("Texas"));
        assert_eq!(tables.coords.lookup("Texas"), Some(Coordinate::new(31.0, -99.0)));
        assert_eq!(tables.coords.lookup("Italy"), Some(Coordinate::new(1.0, 2.0)));
        assert!(!tables.coords.is_domestic("Italy"));
        assert_eq!(tables.coords.len(), CoordinateTable::builtin().len());
    }

    #[test]
    fn test_default_config_builds_builtin_tables() {
        let tables = LocatorConfig::default().build_tables();
        assert_eq!(tables.aliases.normalize("LA"), "Louisiana");
        assert!(tables.coords.is_domestic("Texas"));
    }

    #[tokio::test]
    async fn test_load_without_path_is_default() {
        let config = LocatorConfig::load(None).await.unwrap();
        assert!(config.gazetteer.is_empty());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locations.yaml");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = LocatorConfig::load(path.to_str()).await.unwrap();
        assert_eq!(config.coordinates.len(), 2);
    }
}
