//! Application-level errors

use std::path::PathBuf;
use thiserror::Error;

/// Failures of loading, configuring and selecting what to compute.
///
/// Domain validation findings are not errors; they are reported alongside
/// the computed phase.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("project file not found: {0}")]
    ProjectNotFound(PathBuf),

    #[error("invalid project file {path}: {source}")]
    InvalidProject {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("phase not found in project {project}: {selector}")]
    PhaseNotFound { project: String, selector: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
