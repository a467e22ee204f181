//! Error types for IsisCB conversion

use std::path::PathBuf;
use thiserror::Error;

/// Reason a single micro-format entry was discarded
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidEntry {
    #[error("entry has no sub-fields")]
    Empty,

    #[error("entry has no relationship or attribute type")]
    MissingType,

    #[error("entry has no target identifier")]
    MissingTarget,

    #[error("entry has no value")]
    MissingValue,
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Missing column '{0}'")]
    MissingColumn(String),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Failed to read {path}: {reason}")]
    LoadError { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(PathBuf),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
