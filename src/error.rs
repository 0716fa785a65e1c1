//! Error types for dataver operations

use crate::version::VersionId;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DataverError>;

#[derive(Error, Debug)]
pub enum DataverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML configuration error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Version '{version}' does not exist")]
    VersionNotFound { version: VersionId },

    #[error("Metadata file not found for {version}")]
    MetadataNotFound { version: VersionId },

    #[error("No dataset file found in {path}")]
    DatasetNotFound { path: PathBuf },

    #[error("Already at version {version}")]
    AlreadyAtVersion { version: VersionId },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid version identifier: '{value}' (expected v<N>, e.g. v3)")]
    InvalidVersionId { value: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("Walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Failed to persist file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl DataverError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    /// True for the "something is missing" family of errors
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::InputNotFound { .. }
            | Self::VersionNotFound { .. }
            | Self::MetadataNotFound { .. }
            | Self::DatasetNotFound { .. } => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// True for rejected arguments or state transitions
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::AlreadyAtVersion { .. } | Self::InvalidVersionId { .. }
        )
    }
}
