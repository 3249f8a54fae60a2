//! Paragraph-block importer for the department directory
//!
//! Each department is a block of up to five non-blank lines:
//!
//! ```text
//! Biology
//! Jane Doe, Professor of Biology
//! doeja01@luther.edu
//! Valders 358
//! 563-387-1234
//! ```
//!
//! Blocks are separated by one or more blank lines. A block that stops early
//! leaves its trailing fields unset.

use std::path::Path;

use super::{ImportError, ImportResult, read_source};
use crate::models::Department;

/// Maximum number of lines that make up one department block
pub const BLOCK_FIELDS: usize = 5;

/// Paragraph-block importer
#[derive(Debug, Clone)]
pub struct ParagraphImporter {
    header_lines: usize,
}

impl Default for ParagraphImporter {
    fn default() -> Self {
        Self { header_lines: 2 }
    }
}

impl ParagraphImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of leading lines (title, blank) to discard before the first block
    pub fn with_header_lines(mut self, header_lines: usize) -> Self {
        self.header_lines = header_lines;
        self
    }

    pub fn parse(&self, content: &str) -> ImportResult<Department> {
        let mut result = ImportResult::new();
        let mut block: Vec<String> = Vec::with_capacity(BLOCK_FIELDS);

        for line in content.lines().skip(self.header_lines) {
            let line = line.trim();
            if line.is_empty() {
                if let Some(department) = finish_block(&mut block) {
                    result.records.push(department);
                }
            } else if block.len() < BLOCK_FIELDS {
                block.push(line.to_string());
            }
        }

        if let Some(department) = finish_block(&mut block) {
            result.records.push(department);
        }

        result
    }

    pub fn parse_file(&self, path: &Path) -> Result<ImportResult<Department>, ImportError> {
        Ok(self.parse(&read_source(path)?))
    }
}

fn finish_block(block: &mut Vec<String>) -> Option<Department> {
    if block.is_empty() {
        return None;
    }
    let mut fields = block.drain(..);
    let mut department = Department::new(fields.next()?);
    // Head lines carry a title after the comma: "Jane Doe, Professor of Biology"
    department.head = fields
        .next()
        .map(|head| head.split(',').next().unwrap_or_default().trim().to_string());
    department.head_email = fields.next();
    department.head_office = fields.next();
    department.head_phone = fields.next();
    Some(department)
}
