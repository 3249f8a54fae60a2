//! campus-etl - extract, normalize and load campus registrar sources
//!
//! Provides:
//! - Typed records for majors, departments, locations, semesters, students,
//!   faculty, courses and their associations, plus league teams, addresses
//!   and players
//! - Parsers for line lists, delimited files, paragraph blocks, PDF directory
//!   text, HTML course tables and JSON arrays
//! - A DuckDB store with generated schema, natural-key resolution and
//!   transactional, dependency-ordered loads
//! - In-memory report queries over the loaded tables
//! - A staged pipeline driven by TOML configuration

pub mod cli;
pub mod config;
pub mod import;
pub mod models;
pub mod pipeline;
pub mod query;
pub mod store;

pub use config::{ConfigError, PipelineConfig};
pub use import::{ImportError, ImportResult, SourceLocation};
pub use models::{
    Address, Course, Department, Enrollment, Faculty, Location, Major, PersonRef, Player,
    SectionEntry, Semester, Student, Team,
};
pub use pipeline::{Pipeline, PipelineError, RunReport, Stage, StageStatus};
pub use query::Snapshot;
pub use store::{
    LoadError, LoadStats, Loader, ResolveError, ResolveReference, Store, StoreError, TableName,
    UnresolvedPolicy,
};
