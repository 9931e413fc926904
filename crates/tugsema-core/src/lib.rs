//! Core infrastructure for tugsema.
//!
//! This crate provides the language-agnostic pieces shared by the tree model,
//! the traversal engine and the CLI:
//! - Error types and stable exit codes
//! - JSON output types for CLI responses
//! - Text utilities for byte offset and line:column conversion
//! - The `Location` type used in rendered output

pub mod error;
pub mod output;
pub mod text;
pub mod types;
