//! Typed semantic tree for tugsema.
//!
//! The tree is an arena ([`AstContext`]) of declarations, statements,
//! expressions, patterns and type references, addressed by small `Copy` ids.
//! It arrives fully resolved: every reference expression already points at
//! the declaration it denotes, every type identifier at its bound entity.
//!
//! Nothing here walks the tree. The traversal engine lives in
//! `tugsema-ide` and only borrows the arena for the duration of a walk.
//!
//! # Example
//!
//! ```
//! use tugsema_ast::{AstBuilder, AstNode};
//!
//! let mut b = AstBuilder::new("main.swift", "var x = 0\nx\n");
//! let x = b.var("x", b.loc("x"));
//! let use_x = b.decl_ref(x, b.loc_nth("x", 1));
//! b.top_level_code(vec![AstNode::Expr(use_x)]);
//! let ast = b.finish();
//! assert_eq!(ast.decl_name(x), Some("x"));
//! ```

pub mod builder;
pub mod context;
pub mod decl;
pub mod error;
pub mod expr;
pub mod ids;
pub mod module;
pub mod pattern;
pub mod source;
pub mod stmt;
pub mod type_repr;
mod validate;

pub use builder::AstBuilder;
pub use context::{AstContext, AstNode};
pub use decl::*;
pub use error::AstError;
pub use expr::*;
pub use ids::{DeclId, ExprId, FileId, ModuleId, PatternId, StmtId, TypeId, TypeReprId};
pub use module::{FileKind, Module, ModuleKind, SourceFile, TypeInfo};
pub use pattern::{BindingIntroducer, Pattern, PatternKind};
pub use source::{CharSourceRange, SourceBuffer, SourceLoc, SourceManager, SourceRange};
pub use stmt::{CaseLabelItem, ConditionElement, Stmt, StmtKind};
pub use type_repr::{TypeRepr, TypeReprKind};

/// Identifier spelling as written (without back-ticks).
pub type Identifier = String;
