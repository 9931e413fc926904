//! tugsema: semantic source-entity traversal.
//!
//! Walks a fully resolved tree and reports every occurrence of a named entity
//! in source order, with its exact byte range, reference kind and read/write
//! context. Editors and indexers build rename, find-references and semantic
//! highlighting on top of the observer contract.

// Core infrastructure - re-exported from tugsema-core
pub use tugsema_core::error;
pub use tugsema_core::output;
pub use tugsema_core::text;
pub use tugsema_core::types;

// Tree model and traversal engine
pub use tugsema_ast as ast;
pub use tugsema_ide::{collector, walker};

// Front door
pub mod cli;
