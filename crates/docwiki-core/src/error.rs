//! Unified application error types for DocWiki.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
///
/// The directory tree operations report discriminated kinds so that a
/// caller can distinguish a missing parent from a path collision without
/// parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Input validation failed before any I/O was attempted.
    Validation,
    /// The requested directory was not found.
    NotFound,
    /// The referenced parent directory does not exist.
    ParentNotFound,
    /// The source directory of a move does not exist.
    SourceNotFound,
    /// The target parent of a move does not exist.
    TargetParentNotFound,
    /// A directory was given itself (or an unfit sibling set) as parent.
    InvalidParent,
    /// A move targeted the moved directory itself.
    InvalidTarget,
    /// The operation would make a directory its own ancestor.
    CircularReference,
    /// Another directory already occupies the computed path.
    PathExists,
    /// The directory still has direct children or documents attached.
    NotEmpty,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::ParentNotFound => write!(f, "PARENT_NOT_FOUND"),
            Self::SourceNotFound => write!(f, "SOURCE_NOT_FOUND"),
            Self::TargetParentNotFound => write!(f, "TARGET_PARENT_NOT_FOUND"),
            Self::InvalidParent => write!(f, "INVALID_PARENT"),
            Self::InvalidTarget => write!(f, "INVALID_TARGET"),
            Self::CircularReference => write!(f, "CIRCULAR_REFERENCE"),
            Self::PathExists => write!(f, "PATH_EXISTS"),
            Self::NotEmpty => write!(f, "NOT_EMPTY"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout DocWiki.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire application boundary. `details` carries an optional
/// structured payload (e.g. the delete-safety report on a refused delete).
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    /// Optional structured payload for the caller.
    pub details: Option<serde_json::Value>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
            details: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
            details: None,
        }
    }

    /// Attach a structured payload to this error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a parent-not-found error.
    pub fn parent_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParentNotFound, message)
    }

    /// Create a source-not-found error.
    pub fn source_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SourceNotFound, message)
    }

    /// Create a target-parent-not-found error.
    pub fn target_parent_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TargetParentNotFound, message)
    }

    /// Create an invalid-parent error.
    pub fn invalid_parent(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidParent, message)
    }

    /// Create an invalid-target error.
    pub fn invalid_target(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidTarget, message)
    }

    /// Create a circular-reference error.
    pub fn circular_reference(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CircularReference, message)
    }

    /// Create a path-exists error.
    pub fn path_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PathExists, message)
    }

    /// Create a not-empty error.
    pub fn not_empty(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotEmpty, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
            details: self.details.clone(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_codes() {
        assert_eq!(ErrorKind::PathExists.to_string(), "PATH_EXISTS");
        assert_eq!(ErrorKind::CircularReference.to_string(), "CIRCULAR_REFERENCE");
        assert_eq!(ErrorKind::NotEmpty.to_string(), "NOT_EMPTY");
    }

    #[test]
    fn test_display_includes_kind_and_message() {
        let err = AppError::path_exists("A directory at path '/Docs' already exists");
        assert_eq!(
            err.to_string(),
            "PATH_EXISTS: A directory at path '/Docs' already exists"
        );
    }

    #[test]
    fn test_details_survive_clone() {
        let err = AppError::not_empty("Directory is not empty")
            .with_details(serde_json::json!({"children_count": 2}));
        let cloned = err.clone();
        assert_eq!(cloned.details, err.details);
        assert!(cloned.source.is_none());
    }
}
