//! # Navigation Errors
//!
//! One error type for everything the core can reject. Validation failures
//! (`MissingParameter`, `InvalidParameter`) and state-machine failures
//! (`NotFound`, `InvalidState`) are all recoverable: the command that
//! produced them had no effect.
//!
//! `Internal` is reserved for invariant violations the core detects in
//! itself. It is logged loudly and reported to callers as `InvalidState`.

use std::fmt;

use serde::Serialize;

/// Caller-facing error category. The wire name of each variant is the
/// `kind` field of an error payload.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingParameter,
    InvalidParameter,
    NotFound,
    InvalidState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavigationError {
    /// A required field was absent. `field` is the full path, e.g.
    /// `options.stack.leftItems[0].title`.
    MissingParameter { field: String },
    /// A field was present but unusable.
    InvalidParameter { field: String, value: String },
    /// No live component has this id.
    NotFound { id: String },
    /// The command is well-formed but not allowed in the current state.
    InvalidState { reason: String },
    /// The core broke one of its own invariants.
    Internal { reason: String },
}

impl NavigationError {
    pub fn missing(field: impl Into<String>) -> Self {
        NavigationError::MissingParameter {
            field: field.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, value: impl fmt::Display) -> Self {
        NavigationError::InvalidParameter {
            field: field.into(),
            value: value.to_string(),
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        NavigationError::NotFound { id: id.into() }
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        NavigationError::InvalidState {
            reason: reason.into(),
        }
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        NavigationError::Internal {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            NavigationError::MissingParameter { .. } => ErrorKind::MissingParameter,
            NavigationError::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            NavigationError::NotFound { .. } => ErrorKind::NotFound,
            NavigationError::InvalidState { .. } | NavigationError::Internal { .. } => {
                ErrorKind::InvalidState
            }
        }
    }

    /// The offending field, for validation errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            NavigationError::MissingParameter { field }
            | NavigationError::InvalidParameter { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }

    /// True for errors caused by the core itself rather than by caller input.
    pub fn is_internal(&self) -> bool {
        matches!(self, NavigationError::Internal { .. })
    }
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationError::MissingParameter { field } => {
                write!(f, "missing parameter: {field}")
            }
            NavigationError::InvalidParameter { field, value } => {
                write!(f, "invalid parameter {field}: {value}")
            }
            NavigationError::NotFound { id } => write!(f, "component not found: {id}"),
            NavigationError::InvalidState { reason } => write!(f, "invalid state: {reason}"),
            NavigationError::Internal { reason } => write!(f, "internal error: {reason}"),
        }
    }
}

impl std::error::Error for NavigationError {}
