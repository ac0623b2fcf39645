//! # Error Types
//!
//! Structured error types for glass_core. Every failure the configurator can
//! report is a variant here, so callers (CLI, embedding widget, tests) can
//! branch on the kind of problem instead of parsing messages.
//!
//! None of these errors is fatal: validation problems are fixed by editing,
//! network problems by retrying.
//!
//! ## Example
//!
//! ```rust
//! use glass_core::errors::{CalcError, CalcResult};
//!
//! fn validate_width(width_mm: f64) -> CalcResult<()> {
//!     if width_mm < 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "width_mm",
//!             width_mm.to_string(),
//!             "Width cannot be negative",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for glass_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for configurator and pricing operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An edit was rejected outright (out of range, wrong index, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Dimensions are present but violate a bound (door wider than the
    /// partition, offset pushes the door outside the structure, ...)
    #[error("Validation failed for '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// Not enough input to price the structure yet
    #[error("Incomplete input: {field} is missing or not positive")]
    IncompleteInput { field: String },

    /// A required field is missing on submission
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Package id not present in the loaded catalog
    #[error("Package not found: {package_id}")]
    PackageNotFound { package_id: u64 },

    /// Component id not present in the package or catalog
    #[error("Component not found: {component_id}")]
    ComponentNotFound { component_id: u64 },

    /// Catalog fetch or order post failed
    #[error("Network error during {operation}: {reason}")]
    Network { operation: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a Validation error
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an IncompleteInput error
    pub fn incomplete(field: impl Into<String>) -> Self {
        CalcError::IncompleteInput {
            field: field.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create a Network error
    pub fn network(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::Network {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        CalcError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalcError::Network { .. } | CalcError::FileLocked { .. })
    }

    /// Whether this error only means "not enough input yet"
    pub fn is_incomplete(&self) -> bool {
        matches!(self, CalcError::IncompleteInput { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::Validation { .. } => "VALIDATION_FAILED",
            CalcError::IncompleteInput { .. } => "INCOMPLETE_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::PackageNotFound { .. } => "PACKAGE_NOT_FOUND",
            CalcError::ComponentNotFound { .. } => "COMPONENT_NOT_FOUND",
            CalcError::Network { .. } => "NETWORK_ERROR",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::FileLocked { .. } => "FILE_LOCKED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(err: serde_json::Error) -> Self {
        CalcError::SerializationError {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::validation("door_offset_mm", "Door extends past the partition edge");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"Validation\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::missing_field("customer_phone").error_code(), "MISSING_FIELD");
        assert_eq!(CalcError::incomplete("height_mm").error_code(), "INCOMPLETE_INPUT");
        assert_eq!(CalcError::PackageNotFound { package_id: 7 }.error_code(), "PACKAGE_NOT_FOUND");
    }

    #[test]
    fn test_recoverable() {
        assert!(CalcError::network("fetch packages", "timeout").is_recoverable());
        assert!(!CalcError::missing_field("customer_name").is_recoverable());
        assert!(CalcError::incomplete("width_mm").is_incomplete());
    }
}
