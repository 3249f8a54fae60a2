//! CLI module for the campus-etl binary

#[cfg(feature = "cli")]
pub mod output;
