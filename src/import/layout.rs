//! Extracted-text layout importer for the faculty directory
//!
//! The faculty directory is a PDF whose extracted text has one person per
//! line, but the column layout shifts depending on how many words the name
//! and office take. Each line is cleaned, tokenized and handed to an ordered
//! list of [`LayoutRule`]s; the first rule whose predicate matches builds the
//! [`Faculty`] record.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{ImportError, ImportResult, read_source};
use crate::models::Faculty;

/// Minimum number of tokens in a faculty row
pub const MIN_TOKENS: usize = 6;

/// Fragments removed from each cleaned line, in this order
pub const NOISE: &[&str] = &[
    "X ",
    "head ",
    "acting ",
    "headspring ",
    "headfall ",
    "program ",
    "cohead ",
    "Maltaspring ",
    "fall ",
    "co ",
    "Mnsterspring ",
    "director ",
];

/// Leading tokens that mark a line as a heading or note rather than a person
pub const REJECTED_LEADS: &[&str] = &["Fall", "new", "parttime"];

/// Numeric markers that precede some names
const MARKERS: &[&str] = &["1", "2"];

/// Surnames printed as two words, with the first word leading the line
const SPLIT_SURNAMES: &[&str] = &["Alonso"];

static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^a-zA-Z0-9 ]").expect("Invalid regex")
});

/// A layout heuristic: when `matches` accepts the tokens, `extract` builds the record
#[derive(Debug, Clone, Copy)]
pub struct LayoutRule {
    pub name: &'static str,
    pub matches: fn(&[&str]) -> bool,
    pub extract: fn(&[&str]) -> Faculty,
}

impl LayoutRule {
    /// Apply the rule, returning `None` when the predicate rejects the tokens
    pub fn apply(&self, tokens: &[&str]) -> Option<Faculty> {
        if (self.matches)(tokens) {
            Some((self.extract)(tokens))
        } else {
            None
        }
    }
}

fn join(tokens: &[&str], indices: &[usize]) -> String {
    indices
        .iter()
        .map(|&i| tokens[i])
        .collect::<Vec<_>>()
        .join(" ")
}

/// The faculty directory rules, most specific first
pub fn default_rules() -> Vec<LayoutRule> {
    vec![
        LayoutRule {
            name: "surname-first",
            matches: |t| t.len() == 6,
            extract: |t| Faculty::new(join(t, &[1, 0]), join(t, &[2, 3]), t[4], t[5]),
        },
        LayoutRule {
            name: "numbered",
            matches: |t| t.len() == 7 && MARKERS.contains(&t[0]),
            extract: |t| Faculty::new(join(t, &[2, 1]), join(t, &[3, 4]), t[5], t[6]),
        },
        LayoutRule {
            name: "split-surname",
            matches: |t| t.len() == 7 && SPLIT_SURNAMES.contains(&t[0]),
            extract: |t| Faculty::new(join(t, &[2, 0, 1]), join(t, &[3, 4]), t[5], t[6]),
        },
        LayoutRule {
            name: "three-word-office",
            matches: |t| t.len() == 7,
            extract: |t| Faculty::new(join(t, &[1, 0]), join(t, &[2, 3, 4]), t[5], t[6]),
        },
    ]
}

/// Faculty directory importer
#[derive(Debug, Clone)]
pub struct LayoutImporter {
    rules: Vec<LayoutRule>,
}

impl Default for LayoutImporter {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

impl LayoutImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom rule list
    pub fn with_rules(rules: Vec<LayoutRule>) -> Self {
        Self { rules }
    }

    /// Strip punctuation and noise fragments from one line of extracted text
    pub fn clean_line(line: &str) -> String {
        let mut cleaned = NON_ALPHANUMERIC.replace_all(line, "").into_owned();
        for noise in NOISE {
            cleaned = cleaned.replace(noise, "");
        }
        cleaned.trim().to_string()
    }

    /// Parse one line; `None` when the line is not a faculty row
    pub fn parse_line(&self, line: &str) -> Option<Faculty> {
        let cleaned = Self::clean_line(line);
        let tokens: Vec<&str> = cleaned.split_whitespace().collect();

        if tokens.len() < MIN_TOKENS || REJECTED_LEADS.contains(&tokens[0]) {
            return None;
        }

        let faculty = self.rules.iter().find_map(|rule| {
            let faculty = rule.apply(&tokens)?;
            tracing::trace!("Layout rule '{}' matched: {}", rule.name, faculty.name);
            Some(faculty)
        });
        if faculty.is_none() {
            tracing::trace!("No layout rule for {} tokens: {}", tokens.len(), cleaned);
        }
        faculty
    }

    /// Parse extracted page text
    ///
    /// Lines that match no rule are headings or wrapped text and are dropped
    /// silently; they are not import errors.
    pub fn parse(&self, text: &str) -> ImportResult<Faculty> {
        let mut result = ImportResult::new();
        result.records = text.lines().filter_map(|line| self.parse_line(line)).collect();
        tracing::debug!("Layout parse produced {} faculty rows", result.records.len());
        result
    }

    /// Parse a plain-text dump of the directory
    pub fn parse_file(&self, path: &Path) -> Result<ImportResult<Faculty>, ImportError> {
        Ok(self.parse(&read_source(path)?))
    }

    /// Extract the directory PDF and parse its text
    pub fn parse_pdf(&self, path: &Path) -> Result<ImportResult<Faculty>, ImportError> {
        let text = super::PdfTextSource::extract_file(path)?;
        Ok(self.parse(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_line_strips_punctuation_and_noise() {
        assert_eq!(
            LayoutImporter::clean_line("Doe, Jane (head) Valders 358 X 1234 doeja01"),
            "Doe Jane Valders 358 1234 doeja01"
        );
        assert_eq!(
            LayoutImporter::clean_line("  Roe, John director Olin 102 4455 roejo01 "),
            "Roe John Olin 102 4455 roejo01"
        );
    }

    #[test]
    fn test_six_token_row() {
        let faculty = LayoutImporter::new()
            .parse_line("Doe, Jane Valders 358 1234 doeja01")
            .unwrap();
        assert_eq!(faculty, Faculty::new("Jane Doe", "Valders 358", "1234", "doeja01"));
    }

    #[test]
    fn test_repeated_spaces_yield_no_empty_tokens() {
        let faculty = LayoutImporter::new()
            .parse_line("Doe,  Jane   Valders 358  1234 doeja01")
            .unwrap();
        assert_eq!(faculty, Faculty::new("Jane Doe", "Valders 358", "1234", "doeja01"));
    }

    #[test]
    fn test_numbered_row() {
        let faculty = LayoutImporter::new()
            .parse_line("1 Smith Ann Olin 204 5566 smitan01")
            .unwrap();
        assert_eq!(faculty, Faculty::new("Ann Smith", "Olin 204", "5566", "smitan01"));
    }

    #[test]
    fn test_split_surname_row() {
        let faculty = LayoutImporter::new()
            .parse_line("Alonso Garcia Maria Main 110 7788 alonma01")
            .unwrap();
        assert_eq!(
            faculty,
            Faculty::new("Maria Alonso Garcia", "Main 110", "7788", "alonma01")
        );
    }

    #[test]
    fn test_three_word_office_row() {
        let faculty = LayoutImporter::new()
            .parse_line("Berg Lee Center for Faith 9900 bergle01")
            .unwrap();
        assert_eq!(
            faculty,
            Faculty::new("Lee Berg", "Center for Faith", "9900", "bergle01")
        );
    }

    #[test]
    fn test_rejected_and_short_rows() {
        let importer = LayoutImporter::new();
        assert!(importer.parse_line("Fall semester 2024 leave list only").is_none());
        assert!(importer.parse_line("new faculty Valders 1 2 3").is_none());
        assert!(importer.parse_line("parttime Ann Olin 1 2 3").is_none());
        assert!(importer.parse_line("Faculty Directory").is_none());
        assert!(importer.parse_line("").is_none());
    }

    #[test]
    fn test_long_rows_match_no_rule() {
        let importer = LayoutImporter::new();
        assert!(importer.parse_line("a b c d e f g h").is_none());
    }

    #[test]
    fn test_parse_keeps_document_order() {
        let text = "Faculty Directory\n\
                    Doe, Jane Valders 358 1234 doeja01\n\
                    Fall 2024\n\
                    1 Smith Ann Olin 204 5566 smitan01\n";
        let result = LayoutImporter::new().parse(text);

        assert!(result.is_clean());
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].username, "doeja01");
        assert_eq!(result.records[1].username, "smitan01");
    }

    #[test]
    fn test_custom_rules() {
        let rules = vec![LayoutRule {
            name: "any",
            matches: |t| t.len() >= 6,
            extract: |t| Faculty::new(t[0], t[1], t[2], t[3]),
        }];
        let importer = LayoutImporter::with_rules(rules);
        let faculty = importer.parse_line("a b c d e f g h").unwrap();
        assert_eq!(faculty.name, "a");
    }
}
