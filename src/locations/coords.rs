//! Curated canonical-name → coordinate table used for plotting.
//!
//! Most names produced by free-text extraction have no entry here; callers
//! treat a missing coordinate as "cannot be plotted".

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A point in signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Shift the point by the given deltas, clamped to valid degree ranges.
    pub fn offset(self, dlat: f64, dlon: f64) -> Self {
        Self {
            lat: (self.lat + dlat).clamp(-90.0, 90.0),
            lon: (self.lon + dlon).clamp(-180.0, 180.0),
        }
    }
}

/// (name, lat, lon, domestic)
const BUILTIN_COORDINATES: &[(&str, f64, f64, bool)] = &[
    ("United States", 37.0902, -95.7129, true),
    ("America", 37.0902, -95.7129, true),
    ("New York", 40.7128, -74.0060, true),
    ("New York City", 40.7128, -74.0060, true),
    ("Manhattan", 40.7831, -73.9712, true),
    ("California", 36.7783, -119.4179, true),
    ("Northern California", 37.7749, -122.4194, true),
    ("San Francisco", 37.7749, -122.4194, true),
    ("San Francisco Bay Area", 37.7749, -122.4194, true),
    ("Los Angeles", 34.0522, -118.2437, true),
    ("Davis", 38.5449, -121.7405, true),
    ("Oregon", 44.0582, -121.3153, true),
    ("Indiana", 39.7684, -86.1581, true),
    ("Illinois", 40.6331, -89.3985, true),
    ("Texas", 31.9686, -99.9018, true),
    ("Washington", 47.6062, -122.3321, true),
    ("Kirkland", 47.6815, -122.2087, true),
    ("Washington DC", 38.9072, -77.0369, true),
    ("Connecticut", 41.6032, -73.0877, true),
    ("New Haven", 41.3083, -72.9279, true),
    ("Michigan", 44.3148, -85.6024, true),
    ("Maine", 44.6939, -69.3819, true),
    ("Delaware", 39.3185, -75.5071, true),
    ("Kentucky", 37.6681, -84.6701, true),
    ("Massachusetts", 42.2304, -71.5301, true),
    ("Arkansas", 35.2010, -91.8318, true),
    ("Jonesboro", 35.8423, -90.7043, true),
    ("Virginia", 37.4316, -78.6569, true),
    ("Hawaii", 19.8968, -155.5828, true),
    ("Louisiana", 30.9843, -91.9623, true),
    ("New Orleans", 29.9511, -90.0715, true),
    ("Florida", 27.6648, -81.5158, true),
    ("Georgia", 32.1656, -82.9001, true),
    ("New Jersey", 40.0583, -74.4057, true),
    ("Pennsylvania", 41.2033, -77.1945, true),
    ("Italy", 41.8719, 12.5674, false),
    ("Milan", 45.4642, 9.1900, false),
    ("Bergamo", 45.6983, 9.6773, false),
    ("Lombardy", 45.6983, 9.6773, false),
    ("China", 35.8617, 104.1954, false),
    ("Wuhan", 30.5928, 114.3055, false),
    ("Beijing", 39.9042, 116.4074, false),
    ("Hong Kong", 22.3193, 114.1694, false),
    ("France", 46.6034, 1.8883, false),
    ("Spain", 40.4637, -3.7492, false),
    ("Valencia", 39.4699, -0.3763, false),
    ("Germany", 51.1657, 10.4515, false),
    ("Japan", 36.2048, 138.2529, false),
    ("Tokyo", 35.6762, 139.6503, false),
    ("Yokohama", 35.4437, 139.6380, false),
    ("South Korea", 35.9078, 127.7669, false),
    ("Iran", 32.4279, 53.6880, false),
    ("Iraq", 33.2232, 43.6793, false),
    ("Lebanon", 33.8547, 35.8623, false),
    ("Afghanistan", 33.9391, 67.7100, false),
    ("Canada", 56.1304, -106.3468, false),
    ("United Kingdom", 55.3781, -3.4360, false),
    ("Europe", 54.5260, 15.2551, false),
    ("Africa", 8.7832, 34.5085, false),
    ("West Africa", 8.7832, -11.2090, false),
    ("Nairobi", -1.2921, 36.8219, false),
    ("Asia", 34.0479, 100.6197, false),
];

/// Canonical name → coordinate, with a domestic subset for regional filtering.
#[derive(Debug, Clone, Default)]
pub struct CoordinateTable {
    points: BTreeMap<String, Coordinate>,
    domestic: BTreeSet<String>,
}

impl CoordinateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut table = Self::new();
        for &(name, lat, lon, domestic) in BUILTIN_COORDINATES {
            table.insert(name, Coordinate::new(lat, lon), domestic);
        }
        table
    }

    /// Add or replace a coordinate. Replacing also replaces the domestic flag.
    pub fn insert(&mut self, name: &str, coordinate: Coordinate, domestic: bool) {
        self.points.insert(name.to_string(), coordinate);
        if domestic {
            self.domestic.insert(name.to_string());
        } else {
            self.domestic.remove(name);
        }
    }

    /// Set the coordinate of `name`, reusing an existing key regardless of
    /// case. The domestic flag of an existing entry is kept; a new entry
    /// starts non-domestic. Returns `true` when an entry was replaced.
    pub fn set_point(&mut self, name: &str, coordinate: Coordinate) -> bool {
        match self.key_for(name).map(String::from) {
            Some(key) => {
                self.points.insert(key, coordinate);
                true
            }
            None => {
                self.points.insert(name.trim().to_string(), coordinate);
                false
            }
        }
    }

    /// Flag an existing name as domestic. Returns `false` for unknown names.
    pub fn mark_domestic(&mut self, name: &str) -> bool {
        match self.key_for(name) {
            Some(key) => {
                let key = key.to_string();
                self.domestic.insert(key);
                true
            }
            None => false,
        }
    }

    /// Coordinate for a canonical name: exact match first, then case-insensitive.
    pub fn lookup(&self, name: &str) -> Option<Coordinate> {
        self.key_for(name).and_then(|k| self.points.get(k)).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.key_for(name).is_some()
    }

    pub fn is_domestic(&self, name: &str) -> bool {
        self.key_for(name)
            .map(|k| self.domestic.contains(k))
            .unwrap_or(false)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.points.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn key_for(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        if let Some((k, _)) = self.points.get_key_value(name) {
            return Some(k.as_str());
        }
        self.points
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_exact_and_case_insensitive() {
        let table = CoordinateTable::builtin();
        let ny = table.lookup("New York").unwrap();
        assert_eq!(ny, Coordinate::new(40.7128, -74.0060));
        assert_eq!(table.lookup("new york"), Some(ny));
        assert_eq!(table.lookup("  Wuhan "), Some(Coordinate::new(30.5928, 114.3055)));
    }

    #[test]
    fn test_lookup_absent_is_none() {
        let table = CoordinateTable::builtin();
        assert_eq!(table.lookup("Atlantis"), None);
        assert!(!table.contains(""));
    }

    #[test]
    fn test_domestic_partition() {
        let table = CoordinateTable::builtin();
        assert!(table.is_domestic("Texas"));
        assert!(table.is_domestic("washington dc"));
        assert!(!table.is_domestic("Italy"));
        assert!(!table.is_domestic("Atlantis"));
    }

    #[test]
    fn test_insert_replaces_flag() {
        let mut table = CoordinateTable::new();
        table.insert("Seattle", Coordinate::new(47.6062, -122.3321), true);
        assert!(table.is_domestic("Seattle"));
        table.insert("Seattle", Coordinate::new(47.6, -122.3), false);
        assert!(!table.is_domestic("Seattle"));
        assert_eq!(table.len(), 1);
        assert!(table.mark_domestic("seattle"));
        assert!(table.is_domestic("Seattle"));
        assert!(!table.mark_domestic("Portland"));
    }

    #[test]
    fn test_set_point_reuses_key_and_keeps_flag() {
        let mut table = CoordinateTable::builtin();
        let before = table.len();
        assert!(table.set_point("texas", Coordinate::new(31.0, -99.0)));
        assert!(table.is_domestic("Texas"));
        assert_eq!(table.lookup("Texas"), Some(Coordinate::new(31.0, -99.0)));
        assert_eq!(table.len(), before);

        assert!(!table.set_point(" Seattle ", Coordinate::new(47.6, -122.3)));
        assert!(!table.is_domestic("Seattle"));
        assert_eq!(table.names().filter(|n| *n == "Seattle").count(), 1);
    }

    #[test]
    fn test_offset_clamps() {
        let c = Coordinate::new(89.9, 179.9).offset(0.5, 0.5);
        assert_eq!(c, Coordinate::new(90.0, 180.0));
    }

    #[test]
    fn test_builtin_names_are_unique() {
        let table = CoordinateTable::builtin();
        assert_eq!(table.len(), BUILTIN_COORDINATES.len());
        assert!(!table.is_empty());
    }
}
