//! Error types for pipeline operations

use thiserror::Error;

use super::stage::Stage;
use crate::config::ConfigError;
use crate::import::ImportError;
use crate::store::{LoadError, StoreError};

/// Errors that stop a stage or the whole run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Source could not be read or parsed
    #[error(transparent)]
    Import(#[from] ImportError),

    /// Store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Table load failed and was rolled back
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Only the course table can be fetched over HTTP
    #[error("Stage '{stage}' cannot read remote source {url}")]
    RemoteSource { stage: Stage, url: String },
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Config(e) => e.user_message(),
            PipelineError::Import(e) => e.user_message(),
            PipelineError::Store(e) => e.user_message(),
            PipelineError::Load(e) => e.user_message(),
            PipelineError::RemoteSource { stage, url } => format!(
                "Stage '{stage}' cannot read {url}\n\nHint: Download the file and point sources.{stage} at the local copy."
            ),
        }
    }
}
