//! Error types for the playbook harness
//!
//! These cover everything that aborts a run: bad configuration, unreadable
//! suites, and failed prebuild playbooks. Individual scenario failures are
//! not errors; they are collected as [`crate::testing::Failure`] values.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === Suite Errors ===
    #[error("Failed to parse suite '{path}': {error}")]
    SuiteParse { path: String, error: String },

    // === Run Errors ===
    #[error("Pre-run build playbook failed: {script}: {reason}")]
    PrebuildFailed { script: String, reason: String },

    #[error("{failed} of {total} scenarios failed")]
    ScenariosFailed { failed: usize, total: usize },

    // === IO Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },
}

impl Error {
    /// Create a prebuild failure for the given script
    pub fn prebuild_failed(script: &str, reason: impl Into<String>) -> Self {
        Self::PrebuildFailed {
            script: script.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a suite parse error
    pub fn suite_parse(path: &str, error: impl ToString) -> Self {
        Self::SuiteParse {
            path: path.to_string(),
            error: error.to_string(),
        }
    }
}
