//! Core error types for tickwatch-core.
//!
//! Engine errors are recoverable: the engine state is left untouched and the
//! caller decides whether to re-prompt, log or ignore.

use std::path::PathBuf;
use thiserror::Error;

use crate::mode::Mode;
use crate::phase::Phase;

/// Core error type for tickwatch-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Rejected engine command
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Database-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Commands an engine refused to apply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Duration is zero or above 23:59:59.999.
    #[error("Invalid duration: {duration_ms} ms (expected 1..={max} ms)", max = crate::duration::MAX_DURATION_MS)]
    InvalidDuration { duration_ms: u64 },

    /// Command not valid in the engine's current phase.
    #[error("Cannot {operation} while {phase}")]
    InvalidTransition {
        operation: &'static str,
        phase: Phase,
    },

    /// Command addressed to the engine that is not currently active.
    #[error("The {mode} engine is not active")]
    InactiveMode { mode: Mode },
}

/// Storage-specific errors.
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

    /// Stored value could not be decoded
    #[error("Corrupt value under '{key}': {message}")]
    CorruptValue { key: String, message: String },

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
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
