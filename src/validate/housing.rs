//! Housing-type vocabulary.
//!
//! The accepted housing types come from a plain-text reference list with one
//! entry per line. Matching ignores case and every non-alphanumeric
//! character, so `"TO-220"`, `"to220"` and `"To 220"` are the same entry.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Result, TdbError};

/// Reference list bundled with the crate.
const BUNDLED_HOUSING_TYPES: &str = include_str!("../../data/housing_types.txt");

/// A loaded housing-type reference list.
#[derive(Debug, Clone, Default)]
pub struct HousingTypes {
    entries: Vec<String>,
    index: HashMap<String, usize>,
}

impl HousingTypes {
    /// The reference list shipped in `data/housing_types.txt`.
    pub fn bundled() -> Self {
        Self::from_lines(BUNDLED_HOUSING_TYPES)
    }

    /// Load a reference list from a file.
    ///
    /// A missing or unreadable file is a configuration error, not a data error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TdbError::HousingTypesUnavailable {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Self::from_lines(&content))
    }

    /// Build a reference list from text, one entry per line.
    ///
    /// Blank lines and lines starting with `#` are skipped. When two lines
    /// normalize to the same key the first one wins.
    pub fn from_lines(text: &str) -> Self {
        let mut types = Self::default();
        for line in text.lines() {
            let entry = line.trim();
            if entry.is_empty() || entry.starts_with('#') {
                continue;
            }
            let key = Self::normalize(entry);
            if key.is_empty() || types.index.contains_key(&key) {
                continue;
            }
            types.index.insert(key, types.entries.len());
            types.entries.push(entry.to_string());
        }
        types
    }

    /// Strip non-alphanumeric characters and lowercase.
    pub fn normalize(name: &str) -> String {
        name.chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect()
    }

    /// Look up a housing type and return the reference-list spelling.
    pub fn resolve(&self, housing_type: &str) -> Result<&str> {
        self.index
            .get(&Self::normalize(housing_type))
            .map(|&idx| self.entries[idx].as_str())
            .ok_or_else(|| TdbError::DomainValue {
                kind: "Device".to_string(),
                key: "housing_type".to_string(),
                value: housing_type.to_string(),
                allowed: self.entries.clone(),
            })
    }

    /// Check whether a housing type is in the list.
    pub fn contains(&self, housing_type: &str) -> bool {
        self.index.contains_key(&Self::normalize(housing_type))
    }

    /// Number of accepted housing types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate the accepted housing types in file order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let types = HousingTypes::from_lines("# housings\nTO-220\nTO-247\n\nD2PAK\n");
        assert_eq!(types.len(), 3);
        assert_eq!(types.resolve("TO-220").unwrap(), "TO-220");
        assert_eq!(types.resolve("to220").unwrap(), "TO-220");
        assert_eq!(types.resolve(" To 220 ").unwrap(), "TO-220");
        assert!(types.contains("d2-pak"));
    }

    #[test]
    fn test_unlisted_type_is_domain_error() {
        let types = HousingTypes::from_lines("TO-220\n");
        let err = types.resolve("TO-264").unwrap_err();
        assert!(matches!(err, TdbError::DomainValue { ref value, .. } if value == "TO-264"));
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let err = HousingTypes::from_file("/nonexistent/housing_types.txt").unwrap_err();
        assert!(matches!(err, TdbError::HousingTypesUnavailable { .. }));
    }

    #[test]
    fn test_bundled_list() {
        let types = HousingTypes::bundled();
        assert!(!types.is_empty());
        assert!(types.contains("to220"));
        assert!(types.contains("TO247-4"));
    }
}
