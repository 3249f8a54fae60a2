//! Delimited-record importer
//!
//! Splits each line on a fixed delimiter into a fixed number of fields.
//! A line with the wrong field count is skipped and reported; there are no
//! partial-field defaults. Quoting is not supported: the registrar and
//! league exports never quote.

use std::path::Path;

use super::{ImportError, ImportResult, read_source};
use crate::models::{Address, Enrollment, PersonRef, Player, SectionEntry, Student};

/// Fields in an address row
pub const ADDRESS_FIELDS: usize = 8;

/// Fields in a roster row; the fourth is not loaded
pub const PLAYER_FIELDS: usize = 5;

/// Delimited-record importer
#[derive(Debug, Clone)]
pub struct DelimitedImporter {
    delimiter: char,
    arity: usize,
    skip_header: bool,
}

impl DelimitedImporter {
    /// Create an importer for `arity` fields separated by `delimiter`
    pub fn new(delimiter: char, arity: usize) -> Self {
        Self {
            delimiter,
            arity,
            skip_header: false,
        }
    }

    /// Comma-separated records
    pub fn comma(arity: usize) -> Self {
        Self::new(',', arity)
    }

    /// Tab-separated records
    pub fn tab(arity: usize) -> Self {
        Self::new('\t', arity)
    }

    /// Treat the first non-blank line as a header and skip it
    pub fn with_header(mut self, skip_header: bool) -> Self {
        self.skip_header = skip_header;
        self
    }

    /// Split content into rows of exactly `arity` trimmed fields
    ///
    /// Blank lines are ignored. Line numbers in errors are 1-based.
    pub fn parse_rows(&self, content: &str) -> ImportResult<Vec<String>> {
        self.parse_with(content, |fields| Ok(fields.to_vec()))
    }

    /// Split content into rows and convert each with `convert`
    ///
    /// A conversion error skips the row, like a field-count mismatch.
    pub fn parse_with<T>(
        &self,
        content: &str,
        mut convert: impl FnMut(&[String]) -> Result<T, String>,
    ) -> ImportResult<T> {
        let mut result = ImportResult::new();
        let mut header_pending = self.skip_header;

        for (index, line) in content.lines().enumerate() {
            let line_no = index + 1;
            if line.trim().is_empty() {
                continue;
            }
            if header_pending {
                header_pending = false;
                continue;
            }

            let fields: Vec<String> = line
                .split(self.delimiter)
                .map(|field| field.trim().to_string())
                .collect();

            if fields.len() != self.arity {
                result.skip(ImportError::FieldCount {
                    line: line_no,
                    expected: self.arity,
                    found: fields.len(),
                });
                continue;
            }

            match convert(&fields) {
                Ok(record) => result.records.push(record),
                Err(message) => result.skip(ImportError::InvalidField {
                    line: line_no,
                    message,
                }),
            }
        }

        result
    }

    pub fn parse_file_with<T>(
        &self,
        path: &Path,
        convert: impl FnMut(&[String]) -> Result<T, String>,
    ) -> Result<ImportResult<T>, ImportError> {
        Ok(self.parse_with(&read_source(path)?, convert))
    }

    /// Parse `name, grad_year, major` student rows
    ///
    /// An empty year or major leaves the field unset.
    pub fn parse_students(&self, content: &str) -> ImportResult<Student> {
        self.parse_with(content, student_from_fields)
    }

    /// Parse `section_code, title, student` class-list rows
    pub fn parse_section_entries(&self, content: &str) -> ImportResult<SectionEntry> {
        self.parse_with(content, section_entry_from_fields)
    }

    /// Parse `student, section_code, grade` enrollment rows
    pub fn parse_enrollments(&self, content: &str) -> ImportResult<Enrollment> {
        self.parse_with(content, enrollment_from_fields)
    }

    /// Parse `team, site, street, city, state, zip, phone, url` address rows
    pub fn parse_addresses(&self, content: &str) -> ImportResult<Address> {
        self.parse_with(content, address_from_fields)
    }

    /// Parse `id, name, position, _, team` roster rows
    pub fn parse_players(&self, content: &str) -> ImportResult<Player> {
        self.parse_with(content, player_from_fields)
    }
}

fn non_empty(field: &str) -> Option<String> {
    if field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

fn require<'a>(field: &'a str, what: &str) -> Result<&'a str, String> {
    if field.is_empty() {
        Err(format!("missing {}", what))
    } else {
        Ok(field)
    }
}

pub(crate) fn student_from_fields(fields: &[String]) -> Result<Student, String> {
    let name = require(&fields[0], "student name")?;
    let grad_year = match fields[1].as_str() {
        "" => None,
        year => Some(
            year.parse::<i32>()
                .map_err(|_| format!("invalid graduation year '{}'", year))?,
        ),
    };
    Ok(Student::new(name, grad_year, non_empty(&fields[2])))
}

pub(crate) fn section_entry_from_fields(fields: &[String]) -> Result<SectionEntry, String> {
    let code = require(&fields[0], "section code")?;
    let student = require(&fields[2], "student reference")?;
    Ok(SectionEntry::new(
        code,
        fields[1].clone(),
        PersonRef::parse(student),
    ))
}

pub(crate) fn enrollment_from_fields(fields: &[String]) -> Result<Enrollment, String> {
    let student = require(&fields[0], "student reference")?;
    let code = require(&fields[1], "section code")?;
    Ok(Enrollment::new(
        PersonRef::parse(student),
        code,
        non_empty(&fields[2]),
    ))
}

pub(crate) fn address_from_fields(fields: &[String]) -> Result<Address, String> {
    let team = require(&fields[0], "team name")?;
    Ok(Address {
        team: team.to_string(),
        site: fields[1].clone(),
        street: fields[2].clone(),
        city: fields[3].clone(),
        state: fields[4].clone(),
        zip: fields[5].clone(),
        phone: fields[6].clone(),
        url: fields[7].clone(),
    })
}

pub(crate) fn player_from_fields(fields: &[String]) -> Result<Player, String> {
    let id = require(&fields[0], "player id")?;
    let team = require(&fields[4], "team name")?;
    Ok(Player::new(id, fields[1].clone(), team, fields[2].clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rows_preserves_order() {
        let content = "a,b,c\nd,e,f\ng,h,i\n";
        let result = DelimitedImporter::comma(3).parse_rows(content);

        assert!(result.is_clean());
        assert_eq!(result.records.len(), 3);
        assert_eq!(result.records[0], vec!["a", "b", "c"]);
        assert_eq!(result.records[2], vec!["g", "h", "i"]);
    }

    #[test]
    fn test_parse_rows_skips_malformed_line() {
        let content = "a,b,c\nbroken,line\nd,e,f\nx,y,z,extra\n";
        let result = DelimitedImporter::comma(3).parse_rows(content);

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.errors.len(), 2);
        assert!(matches!(
            result.errors[0],
            ImportError::FieldCount {
                line: 2,
                expected: 3,
                found: 2
            }
        ));
        assert!(matches!(
            result.errors[1],
            ImportError::FieldCount { line: 4, found: 4, .. }
        ));
    }

    #[test]
    fn test_parse_addresses() {
        let content = "Minnesota Twins\tTarget Field\t1 Twins Way\tMinneapolis\tMN\t55403\t(612) 659-3400\ttwins.com\n\
                       Chicago Cubs\tWrigley Field\t1060 W Addison St\tChicago\tIL\t60613\n";
        let result = DelimitedImporter::tab(ADDRESS_FIELDS).parse_addresses(content);

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].team, "Minnesota Twins");
        assert_eq!(result.records[0].city, "Minneapolis");
        assert_eq!(result.records[0].url, "twins.com");
        assert!(matches!(
            result.errors[0],
            ImportError::FieldCount { line: 2, expected: 8, found: 6 }
        ));
    }

    #[test]
    fn test_parse_players_skips_header() {
        let content = "id,name,position,number,team\n\
                       545361,Byron Buxton,CF,25,Minnesota Twins\n\
                       663656,Kyle Tucker,RF,30,\n";
        let result = DelimitedImporter::comma(PLAYER_FIELDS)
            .with_header(true)
            .parse_players(content);

        assert_eq!(result.records.len(), 1);
        assert_eq!(
            result.records[0],
            Player::new("545361", "Byron Buxton", "Minnesota Twins", "CF")
        );
        assert!(matches!(
            result.errors[0],
            ImportError::InvalidField { line: 3, .. }
        ));
    }

    #[test]
    fn test_parse_students() {
        let content = "Ada Lovelace,2024,Mathematics\nAlan Turing,,\nGrace Hopper,20x5,Physics\n";
        let result = DelimitedImporter::comma(3).parse_students(content);

        assert_eq!(result.records.len(), 2);
        assert_eq!(
            result.records[0],
            Student::new("Ada Lovelace", Some(2024), Some("Mathematics".to_string()))
        );
        assert_eq!(result.records[1], Student::new("Alan Turing", None, None));
        assert!(matches!(
            result.errors[0],
            ImportError::InvalidField { line: 3, .. }
        ));
    }

    #[test]
    fn test_parse_section_entries() {
        let content = "CS-150-A,Intro to Computer Science,3\nCS-150-A,Intro to Computer Science,Ada Lovelace\n";
        let result = DelimitedImporter::comma(3).parse_section_entries(content);

        assert!(result.is_clean());
        assert_eq!(result.records[0].student, PersonRef::Position(3));
        assert_eq!(
            result.records[1].student,
            PersonRef::Name("Ada Lovelace".to_string())
        );
        assert_eq!(result.records[0].course_section, "CS-150-A");
    }

    #[test]
    fn test_parse_enrollments() {
        let content = "1,CS-150-A,A\n2,MATH-240-B,\n,MATH-240-B,B\n";
        let result = DelimitedImporter::comma(3).parse_enrollments(content);

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].grade.as_deref(), Some("A"));
        assert_eq!(result.records[1].grade, None);
        assert_eq!(result.errors.len(), 1);
    }
}
