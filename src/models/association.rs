//! Association records linking students to course offerings

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a source row refers to a student
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PersonRef {
    /// Exact student name
    Name(String),
    /// 1-based position of the student in load order
    Position(i64),
}

impl PersonRef {
    /// Interpret a raw source field: integers are positions, anything else a name
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(position) => PersonRef::Position(position),
            Err(_) => PersonRef::Name(trimmed.to_string()),
        }
    }
}

impl fmt::Display for PersonRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonRef::Name(name) => write!(f, "{}", name),
            PersonRef::Position(position) => write!(f, "#{}", position),
        }
    }
}

/// A class-list row: one student placed in one course section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionEntry {
    /// Course section code, resolved to a `course` id
    pub course_section: String,
    pub title: String,
    pub student: PersonRef,
}

impl SectionEntry {
    pub fn new(course_section: impl Into<String>, title: impl Into<String>, student: PersonRef) -> Self {
        Self {
            course_section: course_section.into(),
            title: title.into(),
            student,
        }
    }
}

/// A student's enrollment in a course section, with an optional grade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub student: PersonRef,
    /// Course section code, resolved to a `course` id
    pub course_section: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
}

impl Enrollment {
    pub fn new(student: PersonRef, course_section: impl Into<String>, grade: Option<String>) -> Self {
        Self {
            student,
            course_section: course_section.into(),
            grade,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_ref_parse() {
        assert_eq!(PersonRef::parse("4"), PersonRef::Position(4));
        assert_eq!(PersonRef::parse(" 12 "), PersonRef::Position(12));
        assert_eq!(
            PersonRef::parse("Ada Lovelace"),
            PersonRef::Name("Ada Lovelace".to_string())
        );
    }

    #[test]
    fn test_person_ref_display() {
        assert_eq!(PersonRef::Position(3).to_string(), "#3");
        assert_eq!(PersonRef::Name("Ada".to_string()).to_string(), "Ada");
    }
}
