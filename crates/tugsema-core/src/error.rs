//! Error types and error code constants for tugsema.
//!
//! This module provides a unified error type (`SemaError`) that bridges
//! domain-specific errors from the tree model and the CLI into a common
//! format suitable for JSON output.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad input from caller)
//! - `3`: Resolution errors (tree file not found, unknown walk root)
//! - `10`: Internal errors (malformed tree, I/O failures)
//!
//! Traversal cancellation is not an error. A walk that an observer stopped
//! early reports `completed: false` in an otherwise successful response.

use std::fmt;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// Resolution errors (file not found, root id out of range).
    ResolutionError = 3,
    /// Internal errors (malformed tree, unexpected state).
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
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
#[derive(Debug, Error)]
pub enum SemaError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Input file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// The requested walk root does not exist in the tree.
    #[error("unknown walk root: {root}")]
    UnknownRoot { root: String },

    /// The tree failed to load or failed structural validation.
    #[error("invalid tree: {message}")]
    InvalidTree { message: String },

    /// I/O failure while reading input or writing output.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&SemaError> for OutputErrorCode {
    fn from(err: &SemaError) -> Self {
        match err {
            SemaError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            SemaError::FileNotFound { .. } => OutputErrorCode::ResolutionError,
            SemaError::UnknownRoot { .. } => OutputErrorCode::ResolutionError,
            SemaError::InvalidTree { .. } => OutputErrorCode::InternalError,
            SemaError::Io(_) => OutputErrorCode::InternalError,
            SemaError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<serde_json::Error> for SemaError {
    fn from(err: serde_json::Error) -> Self {
        SemaError::InvalidTree {
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl SemaError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        SemaError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        SemaError::FileNotFound { path: path.into() }
    }

    /// Create an unknown root error.
    pub fn unknown_root(root: impl Into<String>) -> Self {
        SemaError::UnknownRoot { root: root.into() }
    }

    /// Create an invalid tree error.
    pub fn invalid_tree(message: impl Into<String>) -> Self {
        SemaError::InvalidTree {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        SemaError::InternalError {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
