//! Core error types for misenplace-core.
//!
//! This module defines the error hierarchy using thiserror. Every variant
//! is meant to be shown to kitchen staff as-is, so messages name the task
//! or file involved.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for misenplace-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Backing file errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Bad add-task input
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Frequency outside once/daily/weekly
    #[error("Invalid frequency '{0}': expected once, daily or weekly")]
    InvalidFrequency(String),

    /// Zero or negative minutes
    #[error("Invalid duration for '{field}': {minutes} min (must be at least 1)")]
    InvalidDuration { field: &'static str, minutes: i64 },

    /// Unknown task key
    #[error("Task not found: {0}")]
    NotFound(String),

    /// Duplicate validation
    #[error("Task '{task}' already validated on {date}")]
    AlreadyValidated { task: String, date: chrono::NaiveDate },
}

/// Errors reading or writing the task file and the validation log.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backing file does not exist
    #[error("File not found: {}", path.display())]
    Missing { path: PathBuf },

    /// Header lacks a required column
    #[error("{} is missing required column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    /// A row could not be parsed
    #[error("Malformed row {line} in {}: {message}", path.display())]
    MalformedRow {
        path: PathBuf,
        line: u64,
        message: String,
    },

    /// Read/write failure
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV encoding failure
    #[error("CSV error on {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        StorageError::Csv {
            path: path.into(),
            source,
        }
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {}: {message}", path.display())]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {}: {message}", path.display())]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Authentication errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    /// Wrong name or password
    #[error("Invalid credentials for '{0}'")]
    InvalidCredentials(String),

    /// Auth mode needs credentials that are not configured
    #[error("Authentication is enabled but no credentials are configured")]
    NotConfigured,
}

/// Add-task input errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Empty task name
    #[error("Task name must not be empty")]
    EmptyName,

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
