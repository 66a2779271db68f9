//! Core error types for geoattend-core.
//!
//! This module defines the error hierarchy using thiserror. Nothing in
//! this taxonomy is fatal to the process: the tick runner logs and keeps
//! going, geo failures degrade to the fail-safe default, and validation
//! errors are rejected before anything is persisted.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for geoattend-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Location acquisition errors
    #[error("Location error: {0}")]
    Geo(#[from] GeoError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
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

    /// A stored day bucket could not be decoded
    #[error("Corrupted day bucket for {date}: {message}")]
    CorruptedBucket { date: String, message: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
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

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Location acquisition errors.
///
/// Every variant is a recoverable outcome for the attendance evaluator:
/// a failed fix during the decision window produces the fail-safe 'No'
/// record, and a failed fix during the warning window is retried on the
/// next tick.
#[derive(Error, Debug)]
pub enum GeoError {
    /// The provider cannot produce a fix at all (no bridge, no permission).
    #[error("Location unavailable: {0}")]
    Unavailable(String),

    /// The provider did not answer within the bounded wait.
    #[error("Location request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The provider answered with a fix older than the freshness bound.
    #[error("Location fix is stale ({age_secs}s old, max {max_age_secs}s)")]
    Stale { age_secs: u64, max_age_secs: u64 },

    /// The provider answered with something that is not a coordinate pair.
    #[error("Malformed location response: {0}")]
    Malformed(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid time range
    #[error("Invalid time range: to_time ({to}) must be after from_time ({from})")]
    InvalidTimeRange {
        from: chrono::NaiveTime,
        to: chrono::NaiveTime,
    },

    /// Coordinate out of range or not finite
    #[error("Invalid coordinate for '{field}': {value}")]
    InvalidCoordinate { field: &'static str, value: f64 },

    /// Required field left empty
    #[error("'{0}' must not be empty")]
    EmptyField(&'static str),

    /// Value outside its allowed range
    #[error("Invalid value for '{field}': {message}")]
    OutOfRange { field: &'static str, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
