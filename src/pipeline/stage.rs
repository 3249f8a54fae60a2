//! Pipeline stages

use serde::{Deserialize, Serialize};

use crate::store::TableName;

/// Pipeline stages in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Drop and recreate every table
    Schema,
    Majors,
    Departments,
    Locations,
    Semesters,
    Students,
    Faculty,
    Courses,
    Sections,
    Enrollments,
    /// Null out placeholder enrollment grades
    Grades,
    // League tables; run only when their sources are configured
    Teams,
    Addresses,
    Players,
}

impl Stage {
    /// Get all stages in execution order
    pub fn all() -> Vec<Self> {
        vec![
            Self::Schema,
            Self::Majors,
            Self::Departments,
            Self::Locations,
            Self::Semesters,
            Self::Students,
            Self::Faculty,
            Self::Courses,
            Self::Sections,
            Self::Enrollments,
            Self::Grades,
            Self::Teams,
            Self::Addresses,
            Self::Players,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Majors => "majors",
            Self::Departments => "departments",
            Self::Locations => "locations",
            Self::Semesters => "semesters",
            Self::Students => "students",
            Self::Faculty => "faculty",
            Self::Courses => "courses",
            Self::Sections => "sections",
            Self::Enrollments => "enrollments",
            Self::Grades => "grades",
            Self::Teams => "teams",
            Self::Addresses => "addresses",
            Self::Players => "players",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Schema => "Rebuild tables and id sequences",
            Self::Majors => "Load majors from the program list",
            Self::Departments => "Load departments from the directory blocks",
            Self::Locations => "Load building rooms",
            Self::Semesters => "Load configured academic terms",
            Self::Students => "Load students and resolve their majors",
            Self::Faculty => "Load the faculty directory",
            Self::Courses => "Load the published course table",
            Self::Sections => "Load class lists",
            Self::Enrollments => "Load enrollments",
            Self::Grades => "Clear placeholder grades",
            Self::Teams => "Load league teams from the JSON listing",
            Self::Addresses => "Load team addresses and resolve their teams",
            Self::Players => "Load team rosters and resolve their teams",
        }
    }

    /// Table this stage loads, if any
    pub fn table(&self) -> Option<TableName> {
        match self {
            Self::Schema | Self::Grades => None,
            Self::Majors => Some(TableName::Major),
            Self::Departments => Some(TableName::Department),
            Self::Locations => Some(TableName::Location),
            Self::Semesters => Some(TableName::Semester),
            Self::Students => Some(TableName::Student),
            Self::Faculty => Some(TableName::Faculty),
            Self::Courses => Some(TableName::Course),
            Self::Sections => Some(TableName::Section),
            Self::Enrollments => Some(TableName::Enrollment),
            Self::Teams => Some(TableName::Team),
            Self::Addresses => Some(TableName::Address),
            Self::Players => Some(TableName::Player),
        }
    }

    /// Stages that must complete before this one runs
    pub fn prerequisites(&self) -> &'static [Stage] {
        match self {
            Self::Schema => &[],
            Self::Majors
            | Self::Departments
            | Self::Locations
            | Self::Semesters
            | Self::Faculty
            | Self::Courses
            | Self::Teams => &[Self::Schema],
            Self::Students => &[Self::Majors],
            Self::Sections | Self::Enrollments => &[Self::Students, Self::Courses],
            Self::Grades => &[Self::Enrollments],
            Self::Addresses | Self::Players => &[Self::Teams],
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::all()
            .into_iter()
            .find(|stage| stage.name() == lower)
            .ok_or_else(|| format!("Unknown stage: {}", s))
    }
}
