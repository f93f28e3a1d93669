//! # Error Types
//!
//! Structured error types for combo_core. Most of them are configuration
//! errors raised while a code table or an action catalog is being declared:
//! they name the offending action code, pattern or table key so that a typo
//! in a hand-maintained declaration file can be found quickly.
//!
//! ## Example
//!
//! ```rust
//! use combo_core::errors::{CalcError, CalcResult};
//!
//! fn check_psi(key: &str, psi_0: f64) -> CalcResult<()> {
//!     if !(0.0..=1.0).contains(&psi_0) {
//!         return Err(CalcError::InvalidInput {
//!             field: format!("{}.psi_0", key),
//!             value: psi_0.to_string(),
//!             reason: "Combination factor must lie in [0, 1]".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_psi("wind", 0.6).is_ok());
//! assert!(check_psi("wind", 1.6).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for combo_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for registry, generation and file operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, wrong type, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// An action code was registered twice
    #[error("Duplicate action: '{code}' is already registered")]
    DuplicateAction { code: String },

    /// A relation references an action code that is not registered
    #[error("Unknown action '{reference}' referenced by {relation} relation of '{action}'")]
    UnknownAction {
        action: String,
        relation: String,
        reference: String,
    },

    /// No partial safety factor row under this key
    #[error("Unknown partial safety factors: '{key}'")]
    UnknownPartialSafetyFactors { key: String },

    /// No combination factor row under this key
    #[error("Unknown combination factors: '{key}'")]
    UnknownCombinationFactors { key: String },

    /// An incompatibility pattern is not a valid regular expression
    #[error("Invalid pattern '{pattern}' on action '{action}': {reason}")]
    InvalidPattern {
        action: String,
        pattern: String,
        reason: String,
    },

    /// A combination term has no resolvable coefficient
    #[error("Missing factor for action '{action}' in {situation} combination")]
    MissingFactor { action: String, situation: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
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

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create a DuplicateAction error
    pub fn duplicate_action(code: impl Into<String>) -> Self {
        CalcError::DuplicateAction { code: code.into() }
    }

    /// Create an UnknownAction error
    pub fn unknown_action(action: impl Into<String>, relation: impl Into<String>, reference: impl Into<String>) -> Self {
        CalcError::UnknownAction {
            action: action.into(),
            relation: relation.into(),
            reference: reference.into(),
        }
    }

    /// Create an UnknownAction error for a relation declared on (or a query
    /// about) an action that is not registered
    pub fn unknown_owner(code: impl Into<String>, relation: impl Into<String>) -> Self {
        let code = code.into();
        CalcError::UnknownAction {
            action: code.clone(),
            relation: relation.into(),
            reference: code,
        }
    }

    /// Create an UnknownPartialSafetyFactors error
    pub fn unknown_partial_safety_factors(key: impl Into<String>) -> Self {
        CalcError::UnknownPartialSafetyFactors { key: key.into() }
    }

    /// Create an UnknownCombinationFactors error
    pub fn unknown_combination_factors(key: impl Into<String>) -> Self {
        CalcError::UnknownCombinationFactors { key: key.into() }
    }

    /// Create an InvalidPattern error
    pub fn invalid_pattern(action: impl Into<String>, pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidPattern {
            action: action.into(),
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingFactor error
    pub fn missing_factor(action: impl Into<String>, situation: impl Into<String>) -> Self {
        CalcError::MissingFactor {
            action: action.into(),
            situation: situation.into(),
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

    /// Whether this error comes from a bad declaration (action, relation or
    /// table key) rather than from I/O or generation.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            CalcError::InvalidInput { .. }
                | CalcError::MissingField { .. }
                | CalcError::DuplicateAction { .. }
                | CalcError::UnknownAction { .. }
                | CalcError::UnknownPartialSafetyFactors { .. }
                | CalcError::UnknownCombinationFactors { .. }
                | CalcError::InvalidPattern { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::DuplicateAction { .. } => "DUPLICATE_ACTION",
            CalcError::UnknownAction { .. } => "UNKNOWN_ACTION",
            CalcError::UnknownPartialSafetyFactors { .. } => "UNKNOWN_PARTIAL_SAFETY_FACTORS",
            CalcError::UnknownCombinationFactors { .. } => "UNKNOWN_COMBINATION_FACTORS",
            CalcError::InvalidPattern { .. } => "INVALID_PATTERN",
            CalcError::MissingFactor { .. } => "MISSING_FACTOR",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}
