//! Core error types for focusflow-core.
//!
//! Persistence failures ([`StorageError`], [`ConfigError`]) are contained at
//! the collaborator boundary; the timer and stats engines never return them.
//! [`ValidationError`] rejects bad settings and records before they reach
//! the engine.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focusflow-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Session storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration file errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Session store errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// A persisted row could not be decoded into a session record
    #[error("Corrupt session record: {0}")]
    CorruptRecord(String),
}

/// Configuration file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// No usable data directory
    #[error("Could not determine data directory")]
    NoDataDir,
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Setting value outside its declared range
    #[error("Invalid value {value} for '{key}': must be between {min} and {max}")]
    InvalidSetting {
        key: String,
        value: u32,
        min: u32,
        max: u32,
    },

    /// Unrecognized setting key
    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    /// Session record violating its invariants
    #[error("Invalid session record: {0}")]
    InvalidRecord(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
