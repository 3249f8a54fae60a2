//! Person records: students and faculty

use serde::{Deserialize, Serialize};

/// A student
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Full name (natural key)
    pub name: String,
    /// Expected graduation year
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grad_year: Option<i32>,
    /// Major display name; resolved to a `major` id at load time.
    /// `None` stores a NULL reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
}

impl Student {
    pub fn new(name: impl Into<String>, grad_year: Option<i32>, major: Option<String>) -> Self {
        Self {
            name: name.into(),
            grad_year,
            major,
        }
    }
}

/// A faculty directory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
    /// "First Last" display name
    pub name: String,
    /// Building and room, e.g. "Olin 302"
    pub office: String,
    /// Phone extension
    pub extension: String,
    /// Campus username (natural key)
    pub username: String,
}

impl Faculty {
    pub fn new(
        name: impl Into<String>,
        office: impl Into<String>,
        extension: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            office: office.into(),
            extension: extension.into(),
            username: username.into(),
        }
    }
}
