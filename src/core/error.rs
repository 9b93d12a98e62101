//! Error types for the cfp library.

use std::path::PathBuf;

use thiserror::Error;

use crate::history::TokenError;

/// Result type alias using cfp's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading history or ordering tests.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// An outcome token is none of not-run, pass or fail.
    #[error("Parse error in row {row}: {source}")]
    Parse {
        row: usize,
        #[source]
        source: TokenError,
    },

    /// The history contained no executions.
    #[error("No test executions found in {origin}")]
    EmptyHistory { origin: String },

    /// A precondition of the ledger API was violated by its caller.
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// CSV reading or writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML rendering error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Create a new contract violation error.
    pub fn contract(message: impl Into<String>) -> Self {
        Self::ContractViolation(message.into())
    }

    /// Create a new config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Fail with a contract violation unless `condition` holds.
pub(crate) fn ensure_contract(condition: bool, message: impl FnOnce() -> String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(Error::ContractViolation(message()))
    }
}
