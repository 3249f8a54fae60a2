//! Organizational records: majors, departments, buildings and terms

use serde::{Deserialize, Serialize};

/// An academic program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Major {
    /// Display name (natural key)
    pub name: String,
}

impl Major {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A department with its head's contact block
///
/// Every field after `name` is optional: the directory format this comes from
/// allows a block to stop early.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Department name (natural key)
    pub name: String,
    /// Department head
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_office: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_phone: Option<String>,
}

impl Department {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A room in a campus building
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Building name
    pub name: String,
    /// Room number within the building
    pub room_number: i32,
}

impl Location {
    pub fn new(name: impl Into<String>, room_number: i32) -> Self {
        Self {
            name: name.into(),
            room_number,
        }
    }

    /// Expand a building list into numbered rooms `1..=rooms` per building
    pub fn expand_buildings(buildings: &[String], rooms: i32) -> Vec<Location> {
        buildings
            .iter()
            .flat_map(|building| (1..=rooms).map(move |room| Location::new(building.clone(), room)))
            .collect()
    }
}

/// An academic term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
    /// Term name (natural key), e.g. "Fall 2023"
    pub name: String,
    pub start_date: String,
    pub end_date: String,
}

impl Semester {
    pub fn new(
        name: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }
}
