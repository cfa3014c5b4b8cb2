//! Error types for rtcfg

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for rtcfg operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for rtcfg
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // Resolution Errors
    // -------------------------------------------------------------------------
    /// An injected global value does not fit its schema entry.
    #[error("Config key \"{key}\" not valid: {reason}")]
    InvalidGlobalValue { key: String, reason: String },

    /// Neither an injected global value nor a default exists for the key.
    #[error("Config key \"{0}\" must be defined (no injected value and no default)")]
    MissingValue(String),

    #[error("Config key \"{0}\" is not part of the schema")]
    UnknownKey(String),

    // -------------------------------------------------------------------------
    // Validation Errors
    // -------------------------------------------------------------------------
    /// A value handed to `set_config` was rejected by a built-in entry type.
    ///
    /// `message` is already phrased for the caller, e.g.
    /// `Expected "port=-1" to be greater than 1`.
    #[error("{message}")]
    InvalidValue { key: String, message: String },

    /// A value handed to `set_config` was rejected by a custom parser.
    ///
    /// The parser's message is kept verbatim.
    #[error("{message}")]
    CustomValue { key: String, message: String },

    #[error("Invalid schema entry for {key}: {reason}")]
    InvalidSchema { key: String, reason: String },

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Failed to serialize data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to parse config: {0}")]
    Parse(String),
}

impl Error {
    /// Check if this error comes from a deployment misconfiguration
    /// (bad injected value, missing value, broken schema)
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidGlobalValue { .. }
                | Error::MissingValue(_)
                | Error::InvalidSchema { .. }
        )
    }

    /// Check if this error was raised while validating a value to write
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidValue { .. } | Error::CustomValue { .. }
        )
    }

    /// The schema key this error is about, when there is one
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Error::InvalidGlobalValue { key, .. }
            | Error::InvalidValue { key, .. }
            | Error::CustomValue { key, .. }
            | Error::InvalidSchema { key, .. } => Some(key),
            Error::MissingValue(key) | Error::UnknownKey(key) => Some(key),
            _ => None,
        }
    }
}
