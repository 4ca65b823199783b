//! Location extraction and normalization.
//!
//! # Submodules
//!
//! - [`aliases`]: raw token → canonical name ([`AliasTable`])
//! - [`coords`]: canonical name → coordinate, with a domestic subset ([`CoordinateTable`])
//! - [`recognizer`]: the entity-recognition seam and the gazetteer default
//! - [`extractor`]: union of recognizer hits and abbreviation rules ([`LocationExtractor`])

pub mod aliases;
pub mod coords;
pub mod extractor;
pub mod recognizer;

pub use aliases::AliasTable;
pub use coords::{Coordinate, CoordinateTable};
pub use extractor::LocationExtractor;
pub use recognizer::{EntityRecognizer, GazetteerRecognizer};
