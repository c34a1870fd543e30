//! Core error types for momentum-core.
//!
//! The streak engine and the validator are total functions and never
//! produce these; they surface from storage, configuration, user input
//! and the shared store behind the focus-timer bridge.

use std::path::PathBuf;
use thiserror::Error;

/// Error from opening the habit database with its default location.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
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

    /// No habit with the given id
    #[error("Habit not found: {0}")]
    HabitNotFound(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Data directory could not be resolved or created
    #[error("Failed to prepare data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Errors from the key-value store shared between the app and its widgets.
///
/// The timer bridge never lets these escape; they are logged and dropped.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Store could not be opened
    #[error("Failed to open shared store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A read or write against the store failed
    #[error("Shared store operation failed: {0}")]
    Backend(String),

    /// The in-memory store's lock was poisoned by a panicking writer
    #[error("Shared store lock poisoned")]
    Poisoned,
}

/// Validation errors for user-supplied values.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg)
                if inner.code == rusqlite::ErrorCode::DatabaseBusy
                    || inner.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                DatabaseError::Locked
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_sqlite_maps_to_locked() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert!(matches!(DatabaseError::from(err), DatabaseError::Locked));
    }

    #[test]
    fn other_sqlite_errors_are_query_failures() {
        let err = rusqlite::Error::QueryReturnedNoRows;
        assert!(matches!(
            DatabaseError::from(err),
            DatabaseError::QueryFailed(_)
        ));
    }

    #[test]
    fn core_error_keeps_the_source_message() {
        let err = CoreError::from(ConfigError::UnknownKey("timer.nope".into()));
        assert_eq!(
            err.to_string(),
            "Configuration error: Unknown configuration key: timer.nope"
        );
    }
}
