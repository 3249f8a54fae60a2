//! Line-list importer
//!
//! One value per line. Used for the program (major) list and the building list.

use std::path::Path;

use super::{ImportError, ImportResult, read_source};

/// Line-list importer
#[derive(Debug, Default, Clone)]
pub struct LineListImporter;

impl LineListImporter {
    pub fn new() -> Self {
        Self
    }

    /// Parse a line list; values are trimmed and blank lines dropped
    pub fn parse(&self, content: &str) -> ImportResult<String> {
        let mut result = ImportResult::new();
        result.records = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        result
    }

    pub fn parse_file(&self, path: &Path) -> Result<ImportResult<String>, ImportError> {
        Ok(self.parse(&read_source(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_order() {
        let result = LineListImporter::new().parse("Biology\nComputer Science\nMusic\n");
        assert!(result.is_clean());
        assert_eq!(result.records, vec!["Biology", "Computer Science", "Music"]);
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let result = LineListImporter::new().parse("\nBiology\n   \r\nChemistry  \n\n");
        assert_eq!(result.records, vec!["Biology", "Chemistry"]);
    }

    #[test]
    fn test_parse_empty() {
        assert!(LineListImporter::new().parse("").records.is_empty());
    }
}
