//! Import functionality
//!
//! Parsers that turn loosely structured source text into typed records:
//! - Line lists (one value per line)
//! - Delimited records (comma or tab separated, fixed arity)
//! - Paragraph blocks (department directory)
//! - Extracted page text (faculty directory PDF)
//! - HTML tables (published course schedule)
//! - JSON arrays (league team listing)
//!
//! Every parser returns an [`ImportResult`]: the records it could build plus
//! the row-scoped errors for anything it skipped.

pub mod delimited;
pub mod html_table;
pub mod json_array;
pub mod layout;
pub mod lines;
pub mod paragraph;
pub mod pdf;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub use delimited::DelimitedImporter;
pub use html_table::{CellState, CourseTableImporter, CourseTableWalker};
pub use json_array::JsonArrayImporter;
pub use layout::{LayoutImporter, LayoutRule};
pub use lines::LineListImporter;
pub use paragraph::ParagraphImporter;
pub use pdf::PdfTextSource;

/// Result of an import operation
#[derive(Debug)]
pub struct ImportResult<T> {
    /// Records extracted from the source, in source order
    pub records: Vec<T>,
    /// Rows that were skipped, with the reason
    pub errors: Vec<ImportError>,
}

impl<T> Default for ImportResult<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<T> ImportResult<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a skipped row
    pub fn skip(&mut self, error: ImportError) {
        tracing::warn!("Skipping row: {}", error);
        self.errors.push(error);
    }

    /// Whether every row parsed
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Convert the records, keeping the errors
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ImportResult<U> {
        ImportResult {
            records: self.records.into_iter().map(f).collect(),
            errors: self.errors,
        }
    }
}

/// Error during import
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("IO error reading {path}: {message}")]
    Io { path: PathBuf, message: String },
    #[error("Line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Line {line}: {message}")]
    InvalidField { line: usize, message: String },
    /// A record in a source that is not line-oriented (table cells, JSON elements)
    #[error("Record {record}: {message}")]
    InvalidRecord { record: usize, message: String },
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },
    #[error("Text extraction error: {0}")]
    Extraction(String),
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl ImportError {
    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            ImportError::Io { path, message } => format!(
                "Cannot read {}: {message}\n\nHint: Check the source paths in your configuration.",
                path.display()
            ),
            ImportError::Fetch { url, message } => format!(
                "Cannot fetch {url}: {message}\n\nHint: Check network connectivity or point the source at a saved copy."
            ),
            ImportError::Extraction(message) => format!(
                "Text extraction failed: {message}\n\nHint: Image-only PDFs carry no extractable text."
            ),
            _ => self.to_string(),
        }
    }
}

/// Where a source document lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    /// Local filesystem path
    Local(PathBuf),
    /// HTTP(S) URL
    Remote(String),
}

impl SourceLocation {
    /// Parse a source string: `http://` and `https://` prefixes are remote
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            SourceLocation::Remote(source.to_string())
        } else {
            SourceLocation::Local(PathBuf::from(source))
        }
    }

    /// Resolve a local path against a base directory; remote sources are unchanged
    pub fn relative_to(self, base: &Path) -> Self {
        match self {
            SourceLocation::Local(path) if path.is_relative() => {
                SourceLocation::Local(base.join(path))
            }
            other => other,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::Local(path) => write!(f, "{}", path.display()),
            SourceLocation::Remote(url) => write!(f, "{}", url),
        }
    }
}

/// Read a text source into memory
pub fn read_source(path: &Path) -> Result<String, ImportError> {
    tracing::debug!("Reading source {}", path.display());
    fs::read_to_string(path).map_err(|e| ImportError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Collapse runs of whitespace (including non-breaking spaces) to single spaces
pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location_parse() {
        assert_eq!(
            SourceLocation::parse("https://example.edu/enrollments.htm"),
            SourceLocation::Remote("https://example.edu/enrollments.htm".to_string())
        );
        assert_eq!(
            SourceLocation::parse("data/enrollments.htm"),
            SourceLocation::Local(PathBuf::from("data/enrollments.htm"))
        );
    }

    #[test]
    fn test_source_location_relative_to() {
        let base = Path::new("/srv/data");
        let local = SourceLocation::parse("programs.txt").relative_to(base);
        assert_eq!(
            local,
            SourceLocation::Local(PathBuf::from("/srv/data/programs.txt"))
        );

        let absolute = SourceLocation::parse("/tmp/programs.txt").relative_to(base);
        assert_eq!(
            absolute,
            SourceLocation::Local(PathBuf::from("/tmp/programs.txt"))
        );

        let remote = SourceLocation::parse("http://x.edu/a.htm").relative_to(base);
        assert!(matches!(remote, SourceLocation::Remote(_)));
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  MWF\u{a0}\u{a0} 10:30 "), "MWF 10:30");
        assert_eq!(normalize_whitespace("\u{a0}"), "");
    }

    #[test]
    fn test_read_missing_source() {
        let err = read_source(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, ImportError::Io { .. }));
    }
}
