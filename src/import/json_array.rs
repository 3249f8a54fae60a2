//! JSON array importer
//!
//! The league listing is a single JSON array of objects. Each element is
//! deserialized on its own, so one malformed element is reported and
//! skipped without losing the rest of the listing.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{ImportError, ImportResult, read_source};
use crate::models::Team;

/// Importer for a top-level JSON array of records
#[derive(Debug, Clone, Default)]
pub struct JsonArrayImporter;

impl JsonArrayImporter {
    pub fn new() -> Self {
        Self
    }

    /// Deserialize every element of a JSON array
    ///
    /// Content that is not valid JSON, or whose top level is not an array,
    /// fails the whole import. Element numbers in errors are 1-based.
    pub fn parse<T: DeserializeOwned>(&self, content: &str) -> Result<ImportResult<T>, ImportError> {
        let data: Value = serde_json::from_str(content)
            .map_err(|e| ImportError::ParseError(format!("Failed to parse JSON: {}", e)))?;
        let Value::Array(elements) = data else {
            return Err(ImportError::ParseError(
                "Expected a top-level JSON array".to_string(),
            ));
        };

        let mut result = ImportResult::new();
        for (index, element) in elements.into_iter().enumerate() {
            match serde_json::from_value::<T>(element) {
                Ok(record) => result.records.push(record),
                Err(e) => result.skip(ImportError::InvalidRecord {
                    record: index + 1,
                    message: e.to_string(),
                }),
            }
        }
        Ok(result)
    }

    /// Parse the team listing
    pub fn parse_teams(&self, content: &str) -> Result<ImportResult<Team>, ImportError> {
        self.parse(content)
    }

    pub fn parse_teams_file(&self, path: &Path) -> Result<ImportResult<Team>, ImportError> {
        self.parse_teams(&read_source(path)?)
    }
}
