//! Error type for the anninsert command line.
//!
//! `CliError` wraps everything that can stop a CLI run: reading input
//! files, parsing them, resolving configuration, and synthesis itself.
//! Each variant maps onto an [`OutputErrorCode`], which is both the `code`
//! in the JSON error response and the process exit status.

use std::path::PathBuf;

use thiserror::Error;

use anninsert_core::config::ConfigError;
use anninsert_core::error::{InsertError, OutputErrorCode};

/// Errors surfaced by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// An input file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input file is not valid JSON of the expected shape.
    #[error("cannot parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A configuration value from the environment is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Synthesis failed.
    #[error(transparent)]
    Synthesis(#[from] InsertError),

    /// Writing the response failed.
    #[error("cannot write output: {0}")]
    Output(std::io::Error),
}

impl CliError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CliError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        CliError::Json {
            path: path.into(),
            source,
        }
    }
}

impl From<&CliError> for OutputErrorCode {
    fn from(err: &CliError) -> Self {
        match err {
            CliError::Io { .. } | CliError::Config(_) => OutputErrorCode::InvalidArguments,
            CliError::Json { .. } => OutputErrorCode::InvalidScene,
            CliError::Synthesis(inner) => OutputErrorCode::from(inner),
            CliError::Output(_) => OutputErrorCode::InternalError,
        }
    }
}
