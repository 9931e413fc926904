//! The observer contract.

use std::fmt;

use serde::{Deserialize, Serialize};
use tugsema_ast::{
    AstContext, CharSourceRange, DeclId, ExprId, ModuleId, PatternId, SourceLoc, StmtId, TypeId,
    TypeReprId,
};

use super::WalkRoot;

/// How an occurrence refers to its entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Plain name: `foo`.
    DeclRef,
    /// Member name: `x.foo`, or a method applied to its base.
    DeclMemberRef,
    /// `self.init` / `super.init`.
    DeclConstructorRef,
    /// Subscript brackets or a key-path subscript component.
    SubscriptRef,
    /// Type name in a type position.
    TypeRef,
    /// Enum case in a pattern.
    EnumElementRef,
    /// Member looked up dynamically.
    DynamicMemberRef,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::DeclRef => "decl_ref",
            ReferenceKind::DeclMemberRef => "decl_member_ref",
            ReferenceKind::DeclConstructorRef => "decl_constructor_ref",
            ReferenceKind::SubscriptRef => "subscript_ref",
            ReferenceKind::TypeRef => "type_ref",
            ReferenceKind::EnumElementRef => "enum_element_ref",
            ReferenceKind::DynamicMemberRef => "dynamic_member_ref",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether an occurrence reads, writes, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    Read,
    Write,
    ReadWrite,
}

impl AccessKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessKind::Read => "read",
            AccessKind::Write => "write",
            AccessKind::ReadWrite => "read_write",
        }
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceMetaData {
    pub kind: ReferenceKind,
    /// `None` when the position has no mutation context.
    pub access: Option<AccessKind>,
    /// The occurrence has no source spelling of its own.
    pub is_implicit: bool,
}

impl ReferenceMetaData {
    pub fn new(kind: ReferenceKind, access: Option<AccessKind>) -> Self {
        ReferenceMetaData {
            kind,
            access,
            is_implicit: false,
        }
    }

    pub fn implicit(mut self) -> Self {
        self.is_implicit = true;
        self
    }
}

/// A resolved entity occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeclReference {
    /// The referenced declaration.
    pub decl: DeclId,
    /// Exact source bytes of the occurrence.
    pub range: Option<CharSourceRange>,
    /// Set when a type name is the callee of a construction: `decl` is then
    /// the initializer and this is the type that was spelled.
    pub ctor_type: Option<DeclId>,
    /// Set when the occurrence is the extended type of the innermost
    /// enclosing extension.
    pub extension: Option<DeclId>,
    pub ty: Option<TypeId>,
    pub data: ReferenceMetaData,
}

/// Receives the events of a semantic walk.
///
/// Every hook defaults to "continue". Returning `false` from a `visit_*`
/// reference hook or any `leave_*` hook cancels the walk: no further hooks
/// fire except the pending [`end_balanced_decl_visit`] calls, and
/// [`walk`](SourceEntityWalker::walk) returns `false`.
///
/// Returning `false` from `visit_decl`, `visit_stmt`, `visit_expr` or
/// `visit_pattern` only skips that node's children, and its `leave_*` hook is
/// not called. `visit_type_repr` returning `false` cancels.
///
/// [`end_balanced_decl_visit`]: SourceEntityWalker::end_balanced_decl_visit
#[allow(unused_variables)]
pub trait SourceEntityWalker {
    /// Called around every declaration that is not filtered out as
    /// synthesized, paired with exactly one
    /// [`end_balanced_decl_visit`](SourceEntityWalker::end_balanced_decl_visit)
    /// whether or not its children are walked.
    fn begin_balanced_decl_visit(&mut self, decl: DeclId) {}

    fn end_balanced_decl_visit(&mut self, decl: DeclId) {}

    /// `name_range` covers the declared name, including back-ticks.
    fn visit_decl(&mut self, decl: DeclId, name_range: Option<CharSourceRange>) -> bool {
        true
    }

    fn leave_decl(&mut self, decl: DeclId) -> bool {
        true
    }

    fn visit_stmt(&mut self, stmt: StmtId) -> bool {
        true
    }

    fn leave_stmt(&mut self, stmt: StmtId) -> bool {
        true
    }

    fn visit_expr(&mut self, expr: ExprId) -> bool {
        true
    }

    fn leave_expr(&mut self, expr: ExprId) -> bool {
        true
    }

    fn visit_pattern(&mut self, pattern: PatternId) -> bool {
        true
    }

    fn leave_pattern(&mut self, pattern: PatternId) -> bool {
        true
    }

    fn visit_type_repr(&mut self, repr: TypeReprId) -> bool {
        true
    }

    fn leave_type_repr(&mut self, repr: TypeReprId) -> bool {
        true
    }

    fn visit_decl_reference(&mut self, reference: &DeclReference) -> bool {
        true
    }

    /// Called for the open and the close bracket of a subscript. By default
    /// the open bracket is reported as a plain reference and the close
    /// bracket is ignored.
    fn visit_subscript_reference(
        &mut self,
        decl: DeclId,
        range: Option<CharSourceRange>,
        data: ReferenceMetaData,
        is_open_bracket: bool,
    ) -> bool {
        if !is_open_bracket {
            return true;
        }
        self.visit_decl_reference(&DeclReference {
            decl,
            range,
            ctor_type: None,
            extension: None,
            ty: None,
            data,
        })
    }

    /// A value applied as a function through its `callAsFunction` method.
    fn visit_call_as_function_reference(
        &mut self,
        decl: DeclId,
        range: Option<CharSourceRange>,
        data: ReferenceMetaData,
    ) -> bool {
        true
    }

    /// A labeled argument of a call to `callee`.
    fn visit_call_arg_name(&mut self, name: &str, range: CharSourceRange, callee: DeclId) -> bool {
        true
    }

    /// A parameter's external label in the declaration `decl`.
    fn visit_declaration_argument_name(
        &mut self,
        name: Option<&str>,
        loc: SourceLoc,
        decl: DeclId,
    ) -> bool {
        true
    }

    fn visit_module_reference(&mut self, module: ModuleId, range: CharSourceRange) -> bool {
        true
    }

    fn should_walk_into_generic_params(&self) -> bool {
        true
    }

    fn should_walk_inactive_config_region(&self) -> bool {
        false
    }

    /// Walk `root` in `ast`; returns `true` if the walk was not cancelled.
    fn walk(&mut self, ast: &AstContext, root: WalkRoot) -> bool
    where
        Self: Sized,
    {
        super::walk(self, ast, root)
    }
}
