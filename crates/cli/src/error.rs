//! Errors surfaced by `sl-cli` commands.

use std::path::PathBuf;

use storeloom_import::RepositoryError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum CliError {
    /// The input file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing to stdout failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client could not be set up.
    #[error("Product API client error: {0}")]
    Client(#[from] RepositoryError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file could not be mapped; nothing was submitted.
    #[error("Import rejected: {0}")]
    Rejected(String),

    /// Some records were not created.
    #[error("{failed} of {attempted} products failed to import")]
    Incomplete { failed: usize, attempted: usize },
}
