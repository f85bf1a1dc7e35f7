//! Error types for configuration, tasks and dataset output.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use sources::QueryError;

/// Startup configuration errors. All of them stop the pipeline.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required credential is missing from both the environment and the config file
    #[error("{0} is not set (environment or config file)")]
    MissingCredential(&'static str),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A task entry in the config file failed validation
    #[error("task #{index} in config file is invalid: {source}")]
    Task {
        index: usize,
        #[source]
        source: TaskError,
    },

    #[error("invalid completion settings: {0}")]
    Completion(String),
}

/// Reasons a task is rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("task kind cannot be empty")]
    EmptyKind,
}

/// Errors writing or reading a dataset file.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset name cannot be empty")]
    EmptyName,
}
