//! Error types for dm-core

use thiserror::Error;

/// Core error type for duckmig
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {0}")]
    ConfigParseError(#[from] serde_yaml::Error),

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Filename does not follow `YYYY-MM-DD_HH-MM-SS_<name>.<up|down>.sql`
    #[error("[E004] Malformed migration filename '{filename}': {reason}")]
    MalformedFilename { filename: String, reason: String },

    /// E005: Name passed to `create` cannot form a valid filename
    #[error("[E005] Invalid migration name '{name}': {reason}")]
    InvalidMigrationName { name: String, reason: String },

    /// E006: IO error with file path context
    #[error("[E006] IO error on '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

impl CoreError {
    pub(crate) fn malformed(filename: &str, reason: impl Into<String>) -> Self {
        CoreError::MalformedFilename {
            filename: filename.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        CoreError::IoWithPath {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
