//! Tree model errors.

use thiserror::Error;
use tugsema_core::error::SemaError;

/// Structural problems found in a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AstError {
    /// A node refers to an arena slot that does not exist.
    #[error("dangling {kind} id {index} referenced from {owner}")]
    DanglingId {
        kind: &'static str,
        index: u32,
        owner: String,
    },

    /// A source location lies outside every registered buffer.
    #[error("source location {offset} of {owner} is outside every buffer")]
    UnknownBuffer { offset: u32, owner: String },

    /// A node contains itself, directly or through its descendants.
    #[error("{node} contains itself")]
    Cycle { node: String },
}

impl From<AstError> for SemaError {
    fn from(err: AstError) -> Self {
        SemaError::invalid_tree(err.to_string())
    }
}
