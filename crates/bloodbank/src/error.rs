//! Error types for bloodbank.
//!
//! This module defines all error types used throughout the bloodbank crate.
//! Errors fall into two user-facing classes: validation errors, raised before
//! anything is submitted, and server errors, raised when the backing store
//! rejects or fails a request.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for bloodbank operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Validation Errors ===
    /// One or more required form fields were left empty.
    #[error("please fill all required fields (missing: {})", fields.join(", "))]
    MissingFields {
        /// Names of the missing fields, in form order.
        fields: Vec<&'static str>,
    },

    /// The age field could not be read as a whole number.
    #[error("age must be a whole number, got '{value}'")]
    InvalidAge {
        /// The raw value that was entered.
        value: String,
    },

    // === Server Errors ===
    /// A request to the donor API failed before a response arrived, or the
    /// response could not be decoded.
    #[error("server error during {operation}: {message}")]
    Server {
        /// The operation that failed (e.g. "create donor").
        operation: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    /// The donor API answered with a non-success status.
    #[error("server error during {operation}: HTTP {status}")]
    ServerStatus {
        /// The operation that failed.
        operation: &'static str,
        /// The HTTP status code returned.
        status: u16,
    },

    /// The configured backend cannot perform this operation.
    #[error("{operation} is not available with the {backend} backend")]
    BackendUnsupported {
        /// The operation that was requested.
        operation: &'static str,
        /// Name of the active backend.
        backend: &'static str,
    },

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for bloodbank operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new server error.
    #[must_use]
    pub fn server(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Server {
            operation,
            message: message.into(),
        }
    }

    /// Map a reqwest failure into a server error for the given operation.
    #[must_use]
    pub fn transport(operation: &'static str, err: &reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::ServerStatus {
                operation,
                status: status.as_u16(),
            };
        }
        Self::server(operation, err.to_string())
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error was raised by form validation.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::MissingFields { .. } | Self::InvalidAge { .. })
    }

    /// Check if this error came from the donor API.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Server { .. } | Self::ServerStatus { .. })
    }
}
