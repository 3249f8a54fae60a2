//! Course offering records

use serde::{Deserialize, Serialize};

/// A scheduled course section as published by the registrar
///
/// `instructor` is free text copied from the source table, not a reference
/// to a `faculty` row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Section code (natural key), e.g. "CS-150-A"
    pub section: String,
    pub title: String,
    pub instructor: String,
    pub credits: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Room label as printed, e.g. "OLIN 102"
    pub location: String,
}
