//! Error type for the I/O shell around the analysis core.
//!
//! The core itself never fails: unrecognised lines simply produce nothing.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading input, configuration or writing results
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input log not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Cannot serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AuditError>;
