//! Semantic source-entity walking.
//!
//! [`walk`] drives a [`SourceEntityWalker`] over a resolved tree. The driver
//! reproduces source order where the tree's structure differs from it, hides
//! synthesized nodes, tracks the read/write context of every occurrence and
//! stops as soon as the observer asks it to.
//!
//! # Traversal Order
//!
//! - **Pre-order** for `visit_*` hooks, **post-order** for `leave_*` hooks
//! - Reference events fire in source order: `a.b` reports `a` then `b`,
//!   `a + b` reports `a`, `+`, `b`
//! - Cancellation is sticky: after a hook returns `false` only the pending
//!   `end_balanced_decl_visit` calls fire
//!
//! # Example
//!
//! ```
//! use tugsema_ast::{AstBuilder, AstNode};
//! use tugsema_ide::walker::{walk, DeclReference, SourceEntityWalker, WalkRoot};
//!
//! #[derive(Default)]
//! struct Refs(Vec<String>);
//!
//! impl SourceEntityWalker for Refs {
//!     fn visit_decl_reference(&mut self, reference: &DeclReference) -> bool {
//!         self.0.push(reference.data.kind.to_string());
//!         true
//!     }
//! }
//!
//! let mut b = AstBuilder::new("main.swift", "var x = 0\nx\n");
//! let x = b.var("x", b.loc("x"));
//! let use_x = b.decl_ref(x, b.loc_nth("x", 1));
//! b.top_level_code(vec![AstNode::Expr(use_x)]);
//! let file = b.file_id();
//! let ast = b.finish();
//!
//! let mut refs = Refs::default();
//! assert!(walk(&mut refs, &ast, WalkRoot::File(file)));
//! assert_eq!(refs.0, vec!["decl_ref"]);
//! ```

mod annotator;
mod context;
mod expr;
mod reference;
mod traits;

use std::fmt;

use tracing::debug;
use tugsema_ast::{
    AstContext, AstNode, DeclId, DeclKind, ExprId, FileId, ModuleId, PatternId, StmtId,
};

pub use traits::{AccessKind, DeclReference, ReferenceKind, ReferenceMetaData, SourceEntityWalker};

use annotator::SemaAnnotator;
use context::{Walk, CONTINUE};

/// A context that owns declarations and code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclContext {
    File(FileId),
    Module(ModuleId),
    Decl(DeclId),
    /// A closure expression.
    Closure(ExprId),
    /// The initializer of one entry of a pattern binding.
    Initializer { binding: DeclId, entry: usize },
}

impl fmt::Display for DeclContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclContext::File(id) => write!(f, "{id}"),
            DeclContext::Module(id) => write!(f, "{id}"),
            DeclContext::Decl(id) => write!(f, "{id}"),
            DeclContext::Closure(id) => write!(f, "closure {id}"),
            DeclContext::Initializer { binding, entry } => {
                write!(f, "initializer {binding}[{entry}]")
            }
        }
    }
}

/// Where a walk starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkRoot {
    File(FileId),
    Module(ModuleId),
    Decl(DeclId),
    Stmt(StmtId),
    Expr(ExprId),
    Pattern(PatternId),
    DeclContext(DeclContext),
    Node(AstNode),
}

impl fmt::Display for WalkRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalkRoot::File(id) => write!(f, "{id}"),
            WalkRoot::Module(id) => write!(f, "{id}"),
            WalkRoot::Decl(id) => write!(f, "{id}"),
            WalkRoot::Stmt(id) => write!(f, "{id}"),
            WalkRoot::Expr(id) => write!(f, "{id}"),
            WalkRoot::Pattern(id) => write!(f, "{id}"),
            WalkRoot::DeclContext(dc) => write!(f, "{dc}"),
            WalkRoot::Node(AstNode::Decl(id)) => write!(f, "{id}"),
            WalkRoot::Node(AstNode::Stmt(id)) => write!(f, "{id}"),
            WalkRoot::Node(AstNode::Expr(id)) => write!(f, "{id}"),
        }
    }
}

/// Walk `root` in `ast`, reporting to `walker`.
///
/// Returns `true` if the walk ran to completion and `false` if a hook
/// cancelled it.
pub fn walk<W: SourceEntityWalker + ?Sized>(walker: &mut W, ast: &AstContext, root: WalkRoot) -> bool {
    debug!(root = %root, "walk started");
    let mut annotator = SemaAnnotator::new(walker, ast);
    let flow = annotator.walk_root(root);
    let completed = flow.is_continue() && !annotator.is_cancelled();
    if completed {
        debug!(root = %root, "walk completed");
    } else {
        debug!(root = %root, "walk cancelled");
    }
    completed
}

pub fn walk_file<W: SourceEntityWalker + ?Sized>(walker: &mut W, ast: &AstContext, file: FileId) -> bool {
    walk(walker, ast, WalkRoot::File(file))
}

pub fn walk_module<W: SourceEntityWalker + ?Sized>(
    walker: &mut W,
    ast: &AstContext,
    module: ModuleId,
) -> bool {
    walk(walker, ast, WalkRoot::Module(module))
}

pub fn walk_decl<W: SourceEntityWalker + ?Sized>(walker: &mut W, ast: &AstContext, decl: DeclId) -> bool {
    walk(walker, ast, WalkRoot::Decl(decl))
}

pub fn walk_stmt<W: SourceEntityWalker + ?Sized>(walker: &mut W, ast: &AstContext, stmt: StmtId) -> bool {
    walk(walker, ast, WalkRoot::Stmt(stmt))
}

pub fn walk_expr<W: SourceEntityWalker + ?Sized>(walker: &mut W, ast: &AstContext, expr: ExprId) -> bool {
    walk(walker, ast, WalkRoot::Expr(expr))
}

pub fn walk_pattern<W: SourceEntityWalker + ?Sized>(
    walker: &mut W,
    ast: &AstContext,
    pattern: PatternId,
) -> bool {
    walk(walker, ast, WalkRoot::Pattern(pattern))
}

impl<W: SourceEntityWalker + ?Sized> SemaAnnotator<'_, W> {
    fn walk_root(&mut self, root: WalkRoot) -> Walk {
        match root {
            WalkRoot::File(id) => self.walk_file(id),
            WalkRoot::Module(id) => self.walk_module(id),
            WalkRoot::Decl(id) => self.walk_decl(id),
            WalkRoot::Stmt(id) => self.walk_stmt(id),
            WalkRoot::Expr(id) => self.walk_expr(id, None),
            WalkRoot::Pattern(id) => self.walk_pattern(id),
            WalkRoot::DeclContext(dc) => self.walk_decl_context(dc),
            WalkRoot::Node(node) => self.walk_node(node),
        }
    }

    fn walk_decl_context(&mut self, dc: DeclContext) -> Walk {
        match dc {
            DeclContext::File(id) => self.walk_file(id),
            DeclContext::Module(id) => self.walk_module(id),
            DeclContext::Decl(id) => self.walk_decl(id),
            DeclContext::Closure(id) => self.walk_expr(id, None),
            DeclContext::Initializer { binding, entry } => {
                let ast = self.ast;
                let init = match &ast.decl(binding).kind {
                    DeclKind::PatternBinding { entries, .. } => {
                        entries.get(entry).and_then(|e| e.init)
                    }
                    _ => None,
                };
                match init {
                    Some(init) => self.walk_expr(init, None),
                    None => CONTINUE,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roots_display_their_ids() {
        assert_eq!(WalkRoot::Module(ModuleId(0)).to_string(), "module#0");
        assert_eq!(WalkRoot::Node(AstNode::Expr(ExprId(7))).to_string(), "expr#7");
        assert_eq!(
            WalkRoot::DeclContext(DeclContext::Initializer {
                binding: DeclId(2),
                entry: 1
            })
            .to_string(),
            "initializer decl#2[1]"
        );
    }
}
