//! PCache Error - Unified Error Types
//!
//! Every fallible pcache operation returns [`Result`]. Errors are raised at
//! the point of detection and never partially applied, so callers can treat
//! any error as "the operation did not happen".
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use std::fmt;
use thiserror::Error;

// =============================================================================
// Validation Context
// =============================================================================

/// The kind of identifier a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Namespace,
    Structure,
    StructureDefinition,
    StructureInstance,
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Namespace => write!(f, "namespace"),
            Self::Structure => write!(f, "structure"),
            Self::StructureDefinition => write!(f, "structure definition"),
            Self::StructureInstance => write!(f, "structure instance"),
        }
    }
}

/// The precondition a validation error reports as violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Violation {
    /// The identifier does not match its grammar.
    InvalidFormat,
    /// The identifier is already present where it must not be.
    AlreadyExists,
    /// The identifier is absent where it must be present.
    DoesNotExist,
    /// The instance's key set differs from its structure's key set.
    KeyMismatch,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat => write!(f, "has an invalid format"),
            Self::AlreadyExists => write!(f, "already exists"),
            Self::DoesNotExist => write!(f, "does not exist"),
            Self::KeyMismatch => write!(f, "does not match the structure's keys"),
        }
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Unified error type for all pcache operations.
#[derive(Error, Debug)]
pub enum PCacheError {
    #[error("validation error: {subject} '{name}' {violation}")]
    Validation {
        subject: Subject,
        name: String,
        violation: Violation,
    },

    #[error("format error: {0}")]
    Format(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("unsupported tick: {0}")]
    UnsupportedTick(String),

    #[error("length mismatch: {timestamps} timestamps but {values} values")]
    LengthMismatch { timestamps: usize, values: usize },

    #[error("index {index} out of range for series of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("{subject} not found: {name}")]
    NotFound { subject: Subject, name: String },

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Type Aliases
// =============================================================================

/// Result type alias for pcache operations.
pub type Result<T> = std::result::Result<T, PCacheError>;

// =============================================================================
// Constructors
// =============================================================================

impl PCacheError {
    pub fn validation(subject: Subject, name: impl Into<String>, violation: Violation) -> Self {
        Self::Validation {
            subject,
            name: name.into(),
            violation,
        }
    }

    pub fn not_found(subject: Subject, name: impl Into<String>) -> Self {
        Self::NotFound {
            subject,
            name: name.into(),
        }
    }
}

// =============================================================================
// Error Classification
// =============================================================================

impl PCacheError {
    /// Returns true if the error was caused by caller input rather than the
    /// environment.
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self,
            PCacheError::Io(_) | PCacheError::Configuration(_) | PCacheError::ResourceExhausted(_)
        )
    }

    /// Returns true if this is a validation failure.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, PCacheError::Validation { .. })
    }

    /// Returns true if a lookup found nothing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PCacheError::NotFound { .. })
    }

    /// The subject and violation of a validation error, if this is one.
    pub fn violation(&self) -> Option<(Subject, Violation)> {
        match self {
            PCacheError::Validation {
                subject, violation, ..
            } => Some((*subject, *violation)),
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
