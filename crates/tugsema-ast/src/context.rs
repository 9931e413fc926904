//! The arena that owns every node of a tree.

use serde::{Deserialize, Serialize};

use crate::decl::{Decl, DeclKind};
use crate::error::AstError;
use crate::expr::{Expr, ExprKind};
use crate::ids::{DeclId, ExprId, FileId, ModuleId, PatternId, StmtId, TypeId, TypeReprId};
use crate::module::{Module, SourceFile, TypeInfo};
use crate::pattern::Pattern;
use crate::source::SourceManager;
use crate::stmt::Stmt;
use crate::type_repr::TypeRepr;
use crate::validate;

/// A statement-level element: the members of brace statements and
/// conditional-compilation clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AstNode {
    Decl(DeclId),
    Stmt(StmtId),
    Expr(ExprId),
}

/// Arena of all nodes plus the source buffers they point into.
///
/// Node accessors index directly and panic on ids that did not come from this
/// context; run [`AstContext::validate`] on trees loaded from outside.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstContext {
    pub sources: SourceManager,
    #[serde(default)]
    decls: Vec<Decl>,
    #[serde(default)]
    stmts: Vec<Stmt>,
    #[serde(default)]
    exprs: Vec<Expr>,
    #[serde(default)]
    patterns: Vec<Pattern>,
    #[serde(default)]
    type_reprs: Vec<TypeRepr>,
    #[serde(default)]
    modules: Vec<Module>,
    #[serde(default)]
    files: Vec<SourceFile>,
    #[serde(default)]
    types: Vec<TypeInfo>,
}

macro_rules! arena_accessors {
    ($($field:ident: $id:ident => $node:ident, $add:ident, $get:ident, $get_mut:ident, $count:ident;)*) => {
        $(
            pub fn $add(&mut self, node: $node) -> $id {
                self.$field.push(node);
                $id::from_index(self.$field.len() - 1)
            }

            pub fn $get(&self, id: $id) -> &$node {
                &self.$field[id.index()]
            }

            pub fn $get_mut(&mut self, id: $id) -> &mut $node {
                &mut self.$field[id.index()]
            }

            pub fn $count(&self) -> usize {
                self.$field.len()
            }
        )*
    };
}

impl AstContext {
    pub fn new() -> Self {
        Self::default()
    }

    arena_accessors! {
        decls: DeclId => Decl, add_decl, decl, decl_mut, decl_count;
        stmts: StmtId => Stmt, add_stmt, stmt, stmt_mut, stmt_count;
        exprs: ExprId => Expr, add_expr, expr, expr_mut, expr_count;
        patterns: PatternId => Pattern, add_pattern, pattern, pattern_mut, pattern_count;
        type_reprs: TypeReprId => TypeRepr, add_type_repr, type_repr, type_repr_mut, type_repr_count;
        modules: ModuleId => Module, add_module, module, module_mut, module_count;
        files: FileId => SourceFile, add_file, file, file_mut, file_count;
        types: TypeId => TypeInfo, add_type, type_info, type_info_mut, type_count;
    }

    /// Name of a declaration; module declarations take their module's name.
    pub fn decl_name(&self, id: DeclId) -> Option<&str> {
        let decl = self.decl(id);
        match &decl.kind {
            DeclKind::Module { module } => Some(self.module(*module).name.as_str()),
            _ => decl.name(),
        }
    }

    /// The associated type named `name` declared by protocol `proto`.
    pub fn associated_type(&self, proto: DeclId, name: &str) -> Option<DeclId> {
        let DeclKind::Protocol { members, .. } = &self.decl(proto).kind else {
            return None;
        };
        members.iter().copied().find(|member| {
            matches!(
                &self.decl(*member).kind,
                DeclKind::AssociatedType { name: n, .. } if n == name
            )
        })
    }

    /// Strip parentheses, `try` and `await` to reach the expression that
    /// determines the value.
    pub fn semantics_providing_expr(&self, mut id: ExprId) -> ExprId {
        loop {
            match self.expr(id).kind {
                ExprKind::Paren { sub } | ExprKind::Try { sub } | ExprKind::Await { sub } => {
                    id = sub
                }
                _ => return id,
            }
        }
    }

    /// Check that every id stored in the tree refers to an existing node and
    /// every location lies inside a registered buffer.
    pub fn validate(&self) -> Result<(), AstError> {
        validate::check(self)
    }
}
