//! Maps free-text parking area descriptions to coarse area labels.
//!
//! RDW descriptions look like `"P+R Olympisch Stadion (Amsterdam)"` or
//! `"Parkeergarage Markenhoven"`. The keyword table in `areas.toml` is
//! embedded at compile time; descriptions that match none of its keywords
//! stay unclassified.

use serde::Deserialize;

/// Maps a human-readable description to a coarse area label.
pub trait AreaClassifier: Send + Sync {
    /// Returns the area label for `text`, or `None` when it cannot be
    /// classified.
    fn classify(&self, text: &str) -> Option<String>;
}

/// Keyword table embedded at compile time.
const AREAS_TOML: &str = include_str!("../areas.toml");

/// One coarse area and the keywords that identify it.
#[derive(Debug, Clone, Deserialize)]
pub struct AreaDefinition {
    /// Label reported for matching descriptions.
    pub name: String,
    /// Lowercase substrings that identify this area.
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AreaTable {
    area: Vec<AreaDefinition>,
}

/// Case-insensitive keyword classifier. The first area (in table order)
/// with a matching keyword wins.
#[derive(Debug, Clone)]
pub struct KeywordAreaClassifier {
    areas: Vec<AreaDefinition>,
}

impl KeywordAreaClassifier {
    /// Builds a classifier from explicit area definitions. Keywords are
    /// lowercased so callers may pass them in any case.
    #[must_use]
    pub fn new(areas: Vec<AreaDefinition>) -> Self {
        let areas = areas
            .into_iter()
            .map(|area| AreaDefinition {
                name: area.name,
                keywords: area.keywords.iter().map(|k| k.to_lowercase()).collect(),
            })
            .collect();
        Self { areas }
    }

    /// Parses a TOML area table (`[[area]]` entries with `name` and
    /// `keywords`).
    ///
    /// # Errors
    ///
    /// Returns the TOML error message if the table is malformed.
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        let table: AreaTable = toml::de::from_str(toml_str).map_err(|e| e.to_string())?;
        Ok(Self::new(table.area))
    }

    /// Builds the classifier from the embedded `areas.toml`.
    ///
    /// # Panics
    ///
    /// Panics if the embedded table is malformed.
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_toml(AREAS_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded areas.toml: {e}"))
    }

    /// The area definitions in matching order.
    #[must_use]
    pub fn areas(&self) -> &[AreaDefinition] {
        &self.areas
    }
}

impl Default for KeywordAreaClassifier {
    fn default() -> Self {
        Self::embedded()
    }
}

impl AreaClassifier for KeywordAreaClassifier {
    fn classify(&self, text: &str) -> Option<String> {
        let lower = text.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }

        self.areas
            .iter()
            .find(|area| contains_any(&lower, &area.keywords))
            .map(|area| area.name.clone())
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle.as_str()))
}
