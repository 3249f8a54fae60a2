//! Pipeline configuration
//!
//! Loaded from TOML; every section is optional and falls back to the
//! defaults below, which match the in-repo data layout.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::import::SourceLocation;
use crate::models::Semester;
use crate::store::UnresolvedPolicy;

/// Errors loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to parse config file '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl ConfigError {
    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::Parse { path, message } => format!(
                "Cannot parse {}: {message}\n\nHint: Every section is optional; remove keys you do not need.",
                path.display()
            ),
            ConfigError::Invalid(errors) => format!(
                "Invalid configuration:\n  - {}\n\nHint: Check the [load] and [report] sections.",
                errors.join("\n  - ")
            ),
            _ => self.to_string(),
        }
    }
}

/// Where each source document lives, relative to `data_dir` unless absolute or a URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub majors: String,
    pub students: String,
    pub departments: String,
    pub buildings: String,
    pub faculty: String,
    pub courses: String,
    pub sections: String,
    pub enrollments: String,
    /// League team listing (JSON array); league stages are skipped when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams: Option<String>,
    /// Team addresses (tab separated)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<String>,
    /// Team rosters (comma separated, with header)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub players: Option<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            majors: "programs.txt".to_string(),
            students: "students.csv".to_string(),
            departments: "departments.txt".to_string(),
            buildings: "buildings.txt".to_string(),
            faculty: "2023_24_Faculty_Directory_2.pdf".to_string(),
            courses: "http://www.faculty.luther.edu/~bernatzr/Registrar-Public/Course%20Enrollments/enrollments_FA2023.htm".to_string(),
            sections: "sections.txt".to_string(),
            enrollments: "enrollment.txt".to_string(),
            teams: None,
            addresses: None,
            players: None,
        }
    }
}

/// Load behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// What to do with a record whose reference does not resolve
    pub on_unresolved: UnresolvedPolicy,
    /// Enrollment grade value to null out after load
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade_placeholder: Option<String>,
    /// Rooms numbered per building in the location table
    pub rooms_per_building: i32,
    /// Academic terms loaded into the semester table
    pub semesters: Vec<Semester>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            on_unresolved: UnresolvedPolicy::Skip,
            grade_placeholder: None,
            rooms_per_building: 3,
            semesters: vec![
                Semester::new("Fall 2023", "August 30, 2023", "December 14, 2023"),
                Semester::new("JTerm 2024", "January 3, 2024", "January 26, 2024"),
                Semester::new("Spring 2024", "February 1, 2024", "May 16, 2024"),
            ],
        }
    }
}

/// Report parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Graduation year listed as seniors
    pub grad_year: i32,
    /// Section code whose students are listed
    pub section_code: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            grad_year: 2024,
            section_code: "CS-150-A".to_string(),
        }
    }
}

/// Full pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Store file
    pub database: PathBuf,
    /// Base directory for relative source paths
    pub data_dir: PathBuf,
    pub sources: SourcesConfig,
    pub load: LoadConfig,
    pub report: ReportConfig,
    /// HTTP timeout for remote sources
    pub fetch_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("luther.duckdb"),
            data_dir: PathBuf::from("data/luther"),
            sources: SourcesConfig::default(),
            load: LoadConfig::default(),
            report: ReportConfig::default(),
            fetch_timeout_secs: 30,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file and validate it
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml(&content).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Collect every validation problem at once
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.load.rooms_per_building < 0 {
            errors.push("load.rooms_per_building must not be negative".to_string());
        }
        if self.fetch_timeout_secs == 0 {
            errors.push("fetch_timeout_secs must be positive".to_string());
        }
        if self.report.section_code.trim().is_empty() {
            errors.push("report.section_code must not be empty".to_string());
        }
        if let Some(placeholder) = &self.load.grade_placeholder {
            if placeholder.is_empty() {
                errors.push("load.grade_placeholder must not be empty when set".to_string());
            }
        }
        for (field, value) in self.source_fields() {
            if value.trim().is_empty() {
                errors.push(format!("sources.{} must not be empty", field));
            }
        }
        for (field, value) in self.league_source_fields() {
            if value.is_some_and(|v| v.trim().is_empty()) {
                errors.push(format!("sources.{} must not be empty when set", field));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    fn source_fields(&self) -> [(&'static str, &str); 8] {
        let s = &self.sources;
        [
            ("majors", s.majors.as_str()),
            ("students", s.students.as_str()),
            ("departments", s.departments.as_str()),
            ("buildings", s.buildings.as_str()),
            ("faculty", s.faculty.as_str()),
            ("courses", s.courses.as_str()),
            ("sections", s.sections.as_str()),
            ("enrollments", s.enrollments.as_str()),
        ]
    }

    fn league_source_fields(&self) -> [(&'static str, Option<&str>); 3] {
        let s = &self.sources;
        [
            ("teams", s.teams.as_deref()),
            ("addresses", s.addresses.as_deref()),
            ("players", s.players.as_deref()),
        ]
    }

    /// Resolve a configured source against `data_dir`
    pub fn source(&self, source: &str) -> SourceLocation {
        SourceLocation::parse(source).relative_to(&self.data_dir)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn with_database(mut self, database: impl Into<PathBuf>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_courses_source(mut self, source: impl Into<String>) -> Self {
        self.sources.courses = source.into();
        self
    }

    /// Point the league stages at a team listing, address file and roster
    pub fn with_league_sources(
        mut self,
        teams: impl Into<String>,
        addresses: impl Into<String>,
        players: impl Into<String>,
    ) -> Self {
        self.sources.teams = Some(teams.into());
        self.sources.addresses = Some(addresses.into());
        self.sources.players = Some(players.into());
        self
    }

    pub fn with_unresolved_policy(mut self, policy: UnresolvedPolicy) -> Self {
        self.load.on_unresolved = policy;
        self
    }

    pub fn with_grade_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.load.grade_placeholder = Some(placeholder.into());
        self
    }

    pub fn with_report(mut self, grad_year: i32, section_code: impl Into<String>) -> Self {
        self.report = ReportConfig {
            grad_year,
            section_code: section_code.into(),
        };
        self
    }
}
