//! Error types and error code constants for anninsert.
//!
//! `InsertError` is the single fatal error of a synthesis run. Every variant
//! carries enough location context (definition, field, criteria text) to
//! point at the offending part of the scene.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad command line or configuration)
//! - `3`: Invalid scene (unknown definition, bad field value, bad type path)
//! - `10`: Internal errors (invariant violations)

use std::fmt;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable error codes for JSON output and process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad flag, bad environment value).
    InvalidArguments = 2,
    /// The scene cannot be synthesized (malformed input).
    InvalidScene = 3,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Synthesis Error Type
// ============================================================================

/// Fatal errors raised while turning a scene into insertions.
///
/// No partial insertion list is produced once one of these is raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsertError {
    /// The scene is structurally unusable.
    #[error("malformed scene: {message}")]
    MalformedScene { message: String },

    /// An annotation refers to a definition the scene does not declare.
    #[error("unknown annotation definition '{name}'")]
    UnknownDefinition { name: String },

    /// An annotation sets a field its definition does not declare.
    #[error("annotation @{def} has no field '{field}'")]
    UndeclaredField { def: String, field: String },

    /// A field value does not have the shape of its declared type.
    #[error("value of @{def}.{field} does not match declared type {expected}")]
    FieldTypeMismatch {
        def: String,
        field: String,
        expected: String,
    },

    /// A nested type path does not exist in the type of a cast.
    #[error("type path '{path}' does not fit type {ty} at {criteria}")]
    TypePathMismatch {
        path: String,
        ty: String,
        criteria: String,
    },

    /// Unexpected synthesizer state.
    #[error("invariant violated at {criteria}: {message}")]
    Invariant { criteria: String, message: String },

    /// An annotation error tied to the element it was found on.
    #[error("{source} at {criteria}")]
    Located {
        criteria: String,
        #[source]
        source: Box<InsertError>,
    },
}

impl InsertError {
    /// Create a malformed scene error.
    pub fn malformed(message: impl Into<String>) -> Self {
        InsertError::MalformedScene {
            message: message.into(),
        }
    }

    /// Create an invariant error tied to the criteria where it was detected.
    pub fn invariant(criteria: impl fmt::Display, message: impl Into<String>) -> Self {
        InsertError::Invariant {
            criteria: criteria.to_string(),
            message: message.into(),
        }
    }

    /// Attach the criteria of the element being visited.
    ///
    /// Errors that already name their location are returned unchanged.
    pub fn at(self, criteria: impl fmt::Display) -> Self {
        match self {
            InsertError::UnknownDefinition { .. }
            | InsertError::UndeclaredField { .. }
            | InsertError::FieldTypeMismatch { .. } => InsertError::Located {
                criteria: criteria.to_string(),
                source: Box::new(self),
            },
            other => other,
        }
    }

    /// The error beneath any location wrapper.
    pub fn root(&self) -> &InsertError {
        match self {
            InsertError::Located { source, .. } => source.root(),
            other => other,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

impl From<&InsertError> for OutputErrorCode {
    fn from(err: &InsertError) -> Self {
        match err {
            InsertError::MalformedScene { .. }
            | InsertError::UnknownDefinition { .. }
            | InsertError::UndeclaredField { .. }
            | InsertError::FieldTypeMismatch { .. }
            | InsertError::TypePathMismatch { .. } => OutputErrorCode::InvalidScene,
            InsertError::Invariant { .. } => OutputErrorCode::InternalError,
            InsertError::Located { source, .. } => OutputErrorCode::from(source.as_ref()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
