//! JSON output types and serialization for CLI responses.
//!
//! ## Design Principles
//!
//! 1. **Status first:** Every response has `status` as its first field
//! 2. **Deterministic:** Same tree and options produce the same output,
//!    events appear in traversal order
//! 3. **Nullable vs absent:** Absent field means "not applicable"
//! 4. **Versioned:** Schema version in every response

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{OutputErrorCode, SemaError};

pub use crate::types::Location;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Event Records
// ============================================================================

/// One traversal event rendered for output.
///
/// `event` names the observer hook that fired (`reference`,
/// `visit_expr`, `module_reference`, ...). The remaining fields are filled in
/// when the hook carries the corresponding payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Hook that fired.
    pub event: String,
    /// Arena id of the subject node or entity, rendered as `kind#index`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Name of the referenced entity or label, when it has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Source location of the occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Reference kind (`decl_ref`, `decl_member_ref`, `type_ref`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Access kind (`read`, `write`, `read_write`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    /// True when the occurrence has no source spelling of its own.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub implicit: bool,
    /// Constructor type annotation (`decl#index`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctor_type: Option<String>,
    /// Enclosing extension annotation (`decl#index`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    /// Open (`true`) or close (`false`) subscript bracket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_bracket: Option<bool>,
}

impl EventRecord {
    /// Create a record for the given hook name.
    pub fn new(event: impl Into<String>) -> Self {
        EventRecord {
            event: event.into(),
            ..Default::default()
        }
    }

    /// Render the record as a single human-readable line.
    pub fn to_text_line(&self) -> String {
        let mut line = String::new();
        match &self.location {
            Some(loc) => line.push_str(&loc.to_string()),
            None => line.push('-'),
        }
        line.push(' ');
        line.push_str(self.kind.as_deref().unwrap_or(&self.event));
        if let Some(name) = &self.name {
            line.push(' ');
            line.push_str(name);
        }
        if let Some(access) = &self.access {
            line.push_str(&format!(" ({})", access));
        }
        if self.implicit {
            line.push_str(" [implicit]");
        }
        if let Some(open) = self.open_bracket {
            line.push_str(if open { " [open]" } else { " [close]" });
        }
        line
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Response for the `walk` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Root the walk started from (`module:0`, `decl:4`, ...).
    pub root: String,
    /// False when an observer hook cancelled the walk.
    pub completed: bool,
    /// Events in traversal order.
    pub events: Vec<EventRecord>,
}

impl WalkResponse {
    /// Create a successful walk response.
    pub fn new(root: impl Into<String>, completed: bool, events: Vec<EventRecord>) -> Self {
        WalkResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            root: root.into(),
            completed,
            events,
        }
    }
}

/// Error information carried by an [`ErrorResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
}

impl ErrorInfo {
    /// Create from a SemaError.
    pub fn from_error(err: &SemaError) -> Self {
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from a SemaError.
    pub fn from_error(err: &SemaError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Emitters
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================
