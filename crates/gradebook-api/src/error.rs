//! Error types for the Gradebook server.
//!
//! This module defines the errors raised outside the request/response
//! taxonomy: configuration loading and record store persistence. Request
//! validation failures are mapped to HTTP responses in [`crate::api`].

use std::path::PathBuf;

/// A specialized `Result` type for Gradebook operations.
pub type Result<T> = std::result::Result<T, GradebookError>;

/// Errors that can occur while configuring or persisting the gradebook.
///
/// Variants include actionable suggestions where possible.
#[derive(Debug, thiserror::Error)]
pub enum GradebookError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid JSON syntax in configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your gradebook.json with a JSON linter")]
    ConfigParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    // ========================================================================
    // Store Errors
    // ========================================================================
    /// Failed to write the student store to disk.
    #[error("Failed to write student data to '{path}': {message}\n\nSuggestion: Check write permissions and available disk space")]
    StoreWriteError {
        /// Path of the data file being written.
        path: PathBuf,
        /// Description of the write failure.
        message: String,
    },

    /// Student data could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GradebookError {
    /// Creates a new `ConfigParseError` with the given path and message.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError` with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `StoreWriteError`.
    #[must_use]
    pub fn store_write(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::StoreWriteError {
            path: path.into(),
            message: message.into(),
        }
    }
}
