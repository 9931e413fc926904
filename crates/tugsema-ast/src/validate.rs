//! Structural validation: id links and containment cycles.

use std::collections::HashMap;
use std::fmt;

use crate::context::{AstContext, AstNode};
use crate::decl::DeclKind;
use crate::error::AstError;
use crate::expr::{ArgumentList, ExprKind};
use crate::ids::{DeclId, ExprId, FileId, ModuleId, PatternId, StmtId, TypeId, TypeReprId};
use crate::pattern::PatternKind;
use crate::source::SourceLoc;
use crate::stmt::{ConditionElement, StmtKind};
use crate::type_repr::TypeReprKind;

pub(crate) fn check(ast: &AstContext) -> Result<(), AstError> {
    check_links(ast)?;
    check_acyclic(ast)
}

fn check_links(ast: &AstContext) -> Result<(), AstError> {
    let checker = Checker { ast };
    for i in 0..ast.decl_count() {
        checker.decl_node(DeclId::from_index(i))?;
    }
    for i in 0..ast.stmt_count() {
        checker.stmt_node(StmtId::from_index(i))?;
    }
    for i in 0..ast.expr_count() {
        checker.expr_node(ExprId::from_index(i))?;
    }
    for i in 0..ast.pattern_count() {
        checker.pattern_node(PatternId::from_index(i))?;
    }
    for i in 0..ast.type_repr_count() {
        checker.type_repr_node(TypeReprId::from_index(i))?;
    }
    for i in 0..ast.module_count() {
        let id = ModuleId::from_index(i);
        let owner = id.to_string();
        let module = ast.module(id);
        if let Some(parent) = module.foreign_parent() {
            checker.module(parent, &owner)?;
        }
        for file in &module.files {
            checker.file(*file, &owner)?;
        }
    }
    for i in 0..ast.file_count() {
        let id = FileId::from_index(i);
        let owner = id.to_string();
        let file = ast.file(id);
        checker.module(file.module, &owner)?;
        checker.decls(&file.decls, &owner)?;
    }
    Ok(())
}

struct Checker<'a> {
    ast: &'a AstContext,
}

fn in_range(kind: &'static str, index: usize, len: usize, owner: &str) -> Result<(), AstError> {
    if index < len {
        Ok(())
    } else {
        Err(AstError::DanglingId {
            kind,
            index: index as u32,
            owner: owner.to_string(),
        })
    }
}

impl Checker<'_> {
    fn decl(&self, id: DeclId, owner: &str) -> Result<(), AstError> {
        in_range("decl", id.index(), self.ast.decl_count(), owner)
    }

    fn decls(&self, ids: &[DeclId], owner: &str) -> Result<(), AstError> {
        ids.iter().try_for_each(|id| self.decl(*id, owner))
    }

    fn stmt(&self, id: StmtId, owner: &str) -> Result<(), AstError> {
        in_range("stmt", id.index(), self.ast.stmt_count(), owner)
    }

    fn expr(&self, id: ExprId, owner: &str) -> Result<(), AstError> {
        in_range("expr", id.index(), self.ast.expr_count(), owner)
    }

    fn exprs(&self, ids: &[ExprId], owner: &str) -> Result<(), AstError> {
        ids.iter().try_for_each(|id| self.expr(*id, owner))
    }

    fn pattern(&self, id: PatternId, owner: &str) -> Result<(), AstError> {
        in_range("pattern", id.index(), self.ast.pattern_count(), owner)
    }

    fn type_repr(&self, id: TypeReprId, owner: &str) -> Result<(), AstError> {
        in_range("type_repr", id.index(), self.ast.type_repr_count(), owner)
    }

    fn type_reprs(&self, ids: &[TypeReprId], owner: &str) -> Result<(), AstError> {
        ids.iter().try_for_each(|id| self.type_repr(*id, owner))
    }

    fn module(&self, id: ModuleId, owner: &str) -> Result<(), AstError> {
        in_range("module", id.index(), self.ast.module_count(), owner)
    }

    fn file(&self, id: FileId, owner: &str) -> Result<(), AstError> {
        in_range("file", id.index(), self.ast.file_count(), owner)
    }

    fn ty(&self, id: Option<TypeId>, owner: &str) -> Result<(), AstError> {
        match id {
            Some(id) => in_range("type", id.index(), self.ast.type_count(), owner),
            None => Ok(()),
        }
    }

    fn loc(&self, loc: Option<SourceLoc>, owner: &str) -> Result<(), AstError> {
        match loc {
            Some(loc)
                if !self.ast.sources.buffers().is_empty()
                    && self.ast.sources.decompose(loc).is_none() =>
            {
                Err(AstError::UnknownBuffer {
                    offset: loc.offset(),
                    owner: owner.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    fn node(&self, node: &AstNode, owner: &str) -> Result<(), AstError> {
        match node {
            AstNode::Decl(id) => self.decl(*id, owner),
            AstNode::Stmt(id) => self.stmt(*id, owner),
            AstNode::Expr(id) => self.expr(*id, owner),
        }
    }

    fn args(&self, args: &ArgumentList, owner: &str) -> Result<(), AstError> {
        for arg in &args.args {
            self.expr(arg.expr, owner)?;
            self.loc(arg.label_loc, owner)?;
        }
        Ok(())
    }

    fn conditions(&self, conditions: &[ConditionElement], owner: &str) -> Result<(), AstError> {
        for cond in conditions {
            match cond {
                ConditionElement::Boolean(expr) => self.expr(*expr, owner)?,
                ConditionElement::Binding { pattern, init } => {
                    self.pattern(*pattern, owner)?;
                    self.expr(*init, owner)?;
                }
            }
        }
        Ok(())
    }

    fn decl_node(&self, id: DeclId) -> Result<(), AstError> {
        let owner = &id.to_string();
        let decl = self.ast.decl(id);
        self.loc(decl.loc, owner)?;
        for attr in &decl.attrs {
            if let Some(repr) = attr.type_repr {
                self.type_repr(repr, owner)?;
            }
            if let Some(args) = &attr.args {
                self.args(args, owner)?;
            }
            if let Some(init) = attr.semantic_init {
                self.expr(init, owner)?;
            }
        }
        self.decls(decl.generic_params(), owner)?;
        match &decl.kind {
            DeclKind::Func(func) => {
                self.decls(&func.params, owner)?;
                if let Some(result) = func.result {
                    self.type_repr(result, owner)?;
                }
                if let Some(body) = func.body {
                    self.stmt(body, owner)?;
                }
            }
            DeclKind::Constructor { params, body, .. } => {
                self.decls(params, owner)?;
                if let Some(body) = body {
                    self.stmt(*body, owner)?;
                }
            }
            DeclKind::Subscript {
                params,
                element_type,
                accessors,
                ..
            } => {
                self.decls(params, owner)?;
                self.decls(accessors, owner)?;
                if let Some(ty) = element_type {
                    self.type_repr(*ty, owner)?;
                }
            }
            DeclKind::Param {
                argument_name_loc,
                type_repr,
                default_value,
                ..
            } => {
                self.loc(*argument_name_loc, owner)?;
                if let Some(ty) = type_repr {
                    self.type_repr(*ty, owner)?;
                }
                if let Some(value) = default_value {
                    self.expr(*value, owner)?;
                }
            }
            DeclKind::Var { accessors, .. } => self.decls(accessors, owner)?,
            DeclKind::PatternBinding { entries, vars } => {
                for entry in entries {
                    self.pattern(entry.pattern, owner)?;
                    if let Some(init) = entry.init {
                        self.expr(init, owner)?;
                    }
                }
                self.decls(vars, owner)?;
            }
            DeclKind::Nominal {
                inherited, members, ..
            } => {
                self.type_reprs(inherited, owner)?;
                self.decls(members, owner)?;
            }
            DeclKind::EnumCase { elements } => self.decls(elements, owner)?,
            DeclKind::EnumElement {
                params, raw_value, ..
            } => {
                self.decls(params, owner)?;
                if let Some(raw) = raw_value {
                    self.expr(*raw, owner)?;
                }
            }
            DeclKind::Protocol {
                primary_associated_types,
                inherited,
                members,
                ..
            } => {
                for primary in primary_associated_types {
                    self.loc(Some(primary.loc), owner)?;
                }
                self.type_reprs(inherited, owner)?;
                self.decls(members, owner)?;
            }
            DeclKind::AssociatedType {
                inherited,
                default_type,
                ..
            } => {
                self.type_reprs(inherited, owner)?;
                if let Some(ty) = default_type {
                    self.type_repr(*ty, owner)?;
                }
            }
            DeclKind::TypeAlias { underlying, .. } => {
                if let Some(ty) = underlying {
                    self.type_repr(*ty, owner)?;
                }
            }
            DeclKind::GenericTypeParam { inherited, .. } => self.type_reprs(inherited, owner)?,
            DeclKind::Extension {
                extended_type,
                inherited,
                members,
            } => {
                if let Some(ty) = extended_type {
                    self.type_repr(*ty, owner)?;
                }
                self.type_reprs(inherited, owner)?;
                self.decls(members, owner)?;
            }
            DeclKind::Import {
                path,
                module,
                decls,
                end_loc,
            } => {
                for element in path {
                    self.loc(element.loc, owner)?;
                }
                if let Some(module) = module {
                    self.module(*module, owner)?;
                }
                self.decls(decls, owner)?;
                self.loc(*end_loc, owner)?;
            }
            DeclKind::Operator { .. } | DeclKind::PrecedenceGroup { .. } => {}
            DeclKind::IfConfig { clauses } => {
                for clause in clauses {
                    if let Some(cond) = clause.condition {
                        self.expr(cond, owner)?;
                    }
                    for element in &clause.elements {
                        self.node(element, owner)?;
                    }
                }
            }
            DeclKind::TopLevelCode { body } => self.stmt(*body, owner)?,
            DeclKind::Module { module } => self.module(*module, owner)?,
        }
        Ok(())
    }

    fn stmt_node(&self, id: StmtId) -> Result<(), AstError> {
        let owner = &id.to_string();
        match &self.ast.stmt(id).kind {
            StmtKind::Brace { elements } => {
                for element in elements {
                    self.node(element, owner)?;
                }
            }
            StmtKind::Return { result } => {
                if let Some(result) = result {
                    self.expr(*result, owner)?;
                }
            }
            StmtKind::Throw { error } => self.expr(*error, owner)?,
            StmtKind::If {
                conditions,
                then_stmt,
                else_stmt,
            } => {
                self.conditions(conditions, owner)?;
                self.stmt(*then_stmt, owner)?;
                if let Some(else_stmt) = else_stmt {
                    self.stmt(*else_stmt, owner)?;
                }
            }
            StmtKind::Guard { conditions, body } | StmtKind::While { conditions, body } => {
                self.conditions(conditions, owner)?;
                self.stmt(*body, owner)?;
            }
            StmtKind::RepeatWhile { body, condition } => {
                self.stmt(*body, owner)?;
                self.expr(*condition, owner)?;
            }
            StmtKind::ForEach {
                pattern,
                sequence,
                where_clause,
                body,
            } => {
                self.pattern(*pattern, owner)?;
                self.expr(*sequence, owner)?;
                if let Some(clause) = where_clause {
                    self.expr(*clause, owner)?;
                }
                self.stmt(*body, owner)?;
            }
            StmtKind::Switch { subject, cases } => {
                self.expr(*subject, owner)?;
                cases.iter().try_for_each(|case| self.stmt(*case, owner))?;
            }
            StmtKind::Case { labels, body } => {
                for label in labels {
                    self.pattern(label.pattern, owner)?;
                    if let Some(guard) = label.guard_expr {
                        self.expr(guard, owner)?;
                    }
                }
                self.stmt(*body, owner)?;
            }
            StmtKind::Do { body } => self.stmt(*body, owner)?,
            StmtKind::DoCatch { body, catches } => {
                self.stmt(*body, owner)?;
                catches.iter().try_for_each(|c| self.stmt(*c, owner))?;
            }
            StmtKind::Defer { body_fn } => self.decl(*body_fn, owner)?,
            StmtKind::Break | StmtKind::Continue | StmtKind::Fallthrough => {}
        }
        Ok(())
    }

    fn expr_node(&self, id: ExprId) -> Result<(), AstError> {
        let owner = &id.to_string();
        let expr = self.ast.expr(id);
        self.loc(expr.loc, owner)?;
        self.ty(expr.ty, owner)?;
        match &expr.kind {
            ExprKind::DeclRef { decl, name_loc } => {
                self.decl(*decl, owner)?;
                self.loc(*name_loc, owner)?;
            }
            ExprKind::MemberRef {
                base,
                member,
                name_loc,
            }
            | ExprKind::DynamicMemberRef {
                base,
                member,
                name_loc,
            } => {
                self.expr(*base, owner)?;
                self.decl(*member, owner)?;
                self.loc(*name_loc, owner)?;
            }
            ExprKind::OtherConstructorRef { decl, ctor_loc } => {
                self.decl(*decl, owner)?;
                self.loc(*ctor_loc, owner)?;
            }
            ExprKind::Subscript { base, args, decl } => {
                self.expr(*base, owner)?;
                self.args(args, owner)?;
                if let Some(decl) = decl {
                    self.decl(*decl, owner)?;
                }
            }
            ExprKind::KeyPath { root, components } => {
                if let Some(root) = root {
                    self.type_repr(*root, owner)?;
                }
                for component in components {
                    self.loc(component.loc, owner)?;
                    self.ty(component.ty, owner)?;
                    if let Some(decl) = component.kind.resolved_decl() {
                        self.decl(decl, owner)?;
                    }
                    if let Some(args) = component.kind.args() {
                        self.args(args, owner)?;
                    }
                }
            }
            ExprKind::Binary { lhs, op, rhs } => self.exprs(&[*lhs, *op, *rhs], owner)?,
            ExprKind::Assign { dest, src } => {
                for e in dest.iter().chain(src.iter()) {
                    self.expr(*e, owner)?;
                }
            }
            ExprKind::InOut { sub }
            | ExprKind::Load { sub }
            | ExprKind::CollectionUpcast { sub }
            | ExprKind::Paren { sub }
            | ExprKind::Try { sub }
            | ExprKind::Await { sub }
            | ExprKind::ForceValue { sub } => self.expr(*sub, owner)?,
            ExprKind::OpenExistential {
                opaque_value,
                existential,
                sub,
            } => self.exprs(&[*opaque_value, *existential, *sub], owner)?,
            ExprKind::MakeTemporarilyEscapable {
                nonescaping_closure,
                opaque_value,
                sub,
            } => self.exprs(&[*nonescaping_closure, *opaque_value, *sub], owner)?,
            ExprKind::OpaqueValue | ExprKind::Error => {}
            ExprKind::Literal { initializer, .. } => {
                if let Some(init) = initializer {
                    self.decl(*init, owner)?;
                }
            }
            ExprKind::Collection {
                elements,
                initializer,
                ..
            } => {
                self.exprs(elements, owner)?;
                if let Some(init) = initializer {
                    self.decl(*init, owner)?;
                }
            }
            ExprKind::Call { func, args } => {
                self.expr(*func, owner)?;
                self.args(args, owner)?;
            }
            ExprKind::DotSyntaxCall { func, base }
            | ExprKind::ConstructorRefCall { func, base } => {
                self.exprs(&[*func, *base], owner)?
            }
            ExprKind::AutoClosure { body, curry_thunk } => {
                self.expr(*body, owner)?;
                if let Some(thunk) = curry_thunk {
                    self.expr(*thunk, owner)?;
                }
            }
            ExprKind::Closure { params, body } => {
                self.decls(params, owner)?;
                self.stmt(*body, owner)?;
            }
            ExprKind::Type { repr } => {
                if let Some(repr) = repr {
                    self.type_repr(*repr, owner)?;
                }
            }
            ExprKind::Tuple { elements } => self.exprs(elements, owner)?,
            ExprKind::Ternary {
                condition,
                then_expr,
                else_expr,
            } => self.exprs(&[*condition, *then_expr, *else_expr], owner)?,
            ExprKind::Coerce { sub, cast_type } => {
                self.expr(*sub, owner)?;
                if let Some(ty) = cast_type {
                    self.type_repr(*ty, owner)?;
                }
            }
        }
        Ok(())
    }

    fn pattern_node(&self, id: PatternId) -> Result<(), AstError> {
        let owner = &id.to_string();
        let pattern = self.ast.pattern(id);
        self.loc(pattern.loc, owner)?;
        self.ty(pattern.ty, owner)?;
        match &pattern.kind {
            PatternKind::Named { var } => self.decl(*var, owner)?,
            PatternKind::Any | PatternKind::Bool { .. } => {}
            PatternKind::Typed { sub, type_repr, .. } => {
                self.pattern(*sub, owner)?;
                if let Some(ty) = type_repr {
                    self.type_repr(*ty, owner)?;
                }
            }
            PatternKind::Tuple { elements } => {
                elements.iter().try_for_each(|p| self.pattern(*p, owner))?
            }
            PatternKind::Paren { sub }
            | PatternKind::Binding { sub, .. }
            | PatternKind::OptionalSome { sub } => self.pattern(*sub, owner)?,
            PatternKind::EnumElement {
                parent_type,
                element,
                sub,
            } => {
                if let Some(ty) = parent_type {
                    self.type_repr(*ty, owner)?;
                }
                if let Some(element) = element {
                    self.decl(*element, owner)?;
                }
                if let Some(sub) = sub {
                    self.pattern(*sub, owner)?;
                }
            }
            PatternKind::Expr { expr } => self.expr(*expr, owner)?,
            PatternKind::Is { cast_type, sub } => {
                if let Some(ty) = cast_type {
                    self.type_repr(*ty, owner)?;
                }
                if let Some(sub) = sub {
                    self.pattern(*sub, owner)?;
                }
            }
        }
        Ok(())
    }

    fn type_repr_node(&self, id: TypeReprId) -> Result<(), AstError> {
        let owner = &id.to_string();
        let repr = self.ast.type_repr(id);
        self.loc(repr.loc, owner)?;
        match &repr.kind {
            TypeReprKind::Ident {
                name_loc,
                bound,
                generic_args,
                ..
            } => {
                self.loc(*name_loc, owner)?;
                if let Some(bound) = bound {
                    self.decl(*bound, owner)?;
                }
                self.type_reprs(generic_args, owner)?;
            }
            TypeReprKind::Compound { components } => self.type_reprs(components, owner)?,
            TypeReprKind::Tuple { elements } => self.type_reprs(elements, owner)?,
            TypeReprKind::Function { params, result } => {
                self.type_reprs(params, owner)?;
                self.type_repr(*result, owner)?;
            }
            TypeReprKind::Array { element } => self.type_repr(*element, owner)?,
            TypeReprKind::Dictionary { key, value } => self.type_reprs(&[*key, *value], owner)?,
            TypeReprKind::Optional { wrapped } => self.type_repr(*wrapped, owner)?,
            TypeReprKind::Composition { types } => self.type_reprs(types, owner)?,
            TypeReprKind::Attributed { base, .. } => self.type_repr(*base, owner)?,
        }
        Ok(())
    }
}

// ============================================================================
// Containment cycles
// ============================================================================

/// A node the traversal descends into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Node {
    Decl(DeclId),
    Stmt(StmtId),
    Expr(ExprId),
    Pattern(PatternId),
    TypeRepr(TypeReprId),
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Decl(id) => write!(f, "{id}"),
            Node::Stmt(id) => write!(f, "{id}"),
            Node::Expr(id) => write!(f, "{id}"),
            Node::Pattern(id) => write!(f, "{id}"),
            Node::TypeRepr(id) => write!(f, "{id}"),
        }
    }
}

impl From<AstNode> for Node {
    fn from(node: AstNode) -> Self {
        match node {
            AstNode::Decl(id) => Node::Decl(id),
            AstNode::Stmt(id) => Node::Stmt(id),
            AstNode::Expr(id) => Node::Expr(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    OnPath,
    Done,
}

/// Reject trees in which a node contains itself.
///
/// Only containment edges count; references to declarations (`DeclRef`,
/// bound type identifiers, named patterns) may point anywhere. Shared
/// subtrees are allowed. An opaque value counts as containing every
/// existential it is opened from, since the walk continues there.
fn check_acyclic(ast: &AstContext) -> Result<(), AstError> {
    let mut opened: HashMap<ExprId, Vec<ExprId>> = HashMap::new();
    for i in 0..ast.expr_count() {
        if let ExprKind::OpenExistential {
            opaque_value,
            existential,
            ..
        } = ast.expr(ExprId::from_index(i)).kind
        {
            opened.entry(opaque_value).or_default().push(existential);
        }
    }

    let mut finder = CycleFinder {
        ast,
        opened,
        marks: HashMap::new(),
    };
    let roots = (0..ast.decl_count())
        .map(|i| Node::Decl(DeclId::from_index(i)))
        .chain((0..ast.stmt_count()).map(|i| Node::Stmt(StmtId::from_index(i))))
        .chain((0..ast.expr_count()).map(|i| Node::Expr(ExprId::from_index(i))))
        .chain((0..ast.pattern_count()).map(|i| Node::Pattern(PatternId::from_index(i))))
        .chain((0..ast.type_repr_count()).map(|i| Node::TypeRepr(TypeReprId::from_index(i))));
    for root in roots {
        finder.visit(root)?;
    }
    Ok(())
}

struct CycleFinder<'a> {
    ast: &'a AstContext,
    opened: HashMap<ExprId, Vec<ExprId>>,
    marks: HashMap<Node, Mark>,
}

impl CycleFinder<'_> {
    fn visit(&mut self, node: Node) -> Result<(), AstError> {
        match self.marks.get(&node) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::OnPath) => {
                return Err(AstError::Cycle {
                    node: node.to_string(),
                })
            }
            None => {}
        }
        self.marks.insert(node, Mark::OnPath);
        for child in self.children(node) {
            self.visit(child)?;
        }
        self.marks.insert(node, Mark::Done);
        Ok(())
    }

    fn children(&self, node: Node) -> Vec<Node> {
        let mut out = Vec::new();
        match node {
            Node::Decl(id) => self.decl_children(id, &mut out),
            Node::Stmt(id) => self.stmt_children(id, &mut out),
            Node::Expr(id) => self.expr_children(id, &mut out),
            Node::Pattern(id) => self.pattern_children(id, &mut out),
            Node::TypeRepr(id) => self.type_repr_children(id, &mut out),
        }
        out
    }

    fn decl_children(&self, id: DeclId, out: &mut Vec<Node>) {
        let decl = self.ast.decl(id);
        for attr in &decl.attrs {
            out.extend(attr.type_repr.map(Node::TypeRepr));
            if let Some(args) = &attr.args {
                args_children(args, out);
            }
            out.extend(attr.semantic_init.map(Node::Expr));
        }
        decls(out, decl.generic_params());
        match &decl.kind {
            DeclKind::Func(func) => {
                decls(out, &func.params);
                out.extend(func.result.map(Node::TypeRepr));
                out.extend(func.body.map(Node::Stmt));
            }
            DeclKind::Constructor { params, body, .. } => {
                decls(out, params);
                out.extend(body.map(Node::Stmt));
            }
            DeclKind::Subscript {
                params,
                element_type,
                accessors,
                ..
            } => {
                decls(out, params);
                out.extend(element_type.map(Node::TypeRepr));
                decls(out, accessors);
            }
            DeclKind::Param {
                type_repr,
                default_value,
                ..
            } => {
                out.extend(type_repr.map(Node::TypeRepr));
                out.extend(default_value.map(Node::Expr));
            }
            DeclKind::Var { accessors, .. } => decls(out, accessors),
            DeclKind::PatternBinding { entries, vars } => {
                for entry in entries {
                    out.push(Node::Pattern(entry.pattern));
                    out.extend(entry.init.map(Node::Expr));
                }
                decls(out, vars);
            }
            DeclKind::Nominal {
                inherited, members, ..
            }
            | DeclKind::Protocol {
                inherited, members, ..
            } => {
                reprs(out, inherited);
                decls(out, members);
            }
            DeclKind::EnumCase { elements } => decls(out, elements),
            DeclKind::EnumElement {
                params, raw_value, ..
            } => {
                decls(out, params);
                out.extend(raw_value.map(Node::Expr));
            }
            DeclKind::AssociatedType {
                inherited,
                default_type,
                ..
            } => {
                reprs(out, inherited);
                out.extend(default_type.map(Node::TypeRepr));
            }
            DeclKind::TypeAlias { underlying, .. } => out.extend(underlying.map(Node::TypeRepr)),
            DeclKind::GenericTypeParam { inherited, .. } => reprs(out, inherited),
            DeclKind::Extension {
                extended_type,
                inherited,
                members,
            } => {
                out.extend(extended_type.map(Node::TypeRepr));
                reprs(out, inherited);
                decls(out, members);
            }
            DeclKind::IfConfig { clauses } => {
                for clause in clauses {
                    out.extend(clause.condition.map(Node::Expr));
                    out.extend(clause.elements.iter().map(|e| Node::from(*e)));
                }
            }
            DeclKind::TopLevelCode { body } => out.push(Node::Stmt(*body)),
            DeclKind::Import { .. }
            | DeclKind::Operator { .. }
            | DeclKind::PrecedenceGroup { .. }
            | DeclKind::Module { .. } => {}
        }
    }

    fn stmt_children(&self, id: StmtId, out: &mut Vec<Node>) {
        let conditions = |out: &mut Vec<Node>, conditions: &[ConditionElement]| {
            for cond in conditions {
                match cond {
                    ConditionElement::Boolean(expr) => out.push(Node::Expr(*expr)),
                    ConditionElement::Binding { pattern, init } => {
                        out.push(Node::Pattern(*pattern));
                        out.push(Node::Expr(*init));
                    }
                }
            }
        };
        match &self.ast.stmt(id).kind {
            StmtKind::Brace { elements } => out.extend(elements.iter().map(|e| Node::from(*e))),
            StmtKind::Return { result } => out.extend(result.map(Node::Expr)),
            StmtKind::Throw { error } => out.push(Node::Expr(*error)),
            StmtKind::If {
                conditions: conds,
                then_stmt,
                else_stmt,
            } => {
                conditions(out, conds);
                out.push(Node::Stmt(*then_stmt));
                out.extend(else_stmt.map(Node::Stmt));
            }
            StmtKind::Guard {
                conditions: conds,
                body,
            }
            | StmtKind::While {
                conditions: conds,
                body,
            } => {
                conditions(out, conds);
                out.push(Node::Stmt(*body));
            }
            StmtKind::RepeatWhile { body, condition } => {
                out.push(Node::Stmt(*body));
                out.push(Node::Expr(*condition));
            }
            StmtKind::ForEach {
                pattern,
                sequence,
                where_clause,
                body,
            } => {
                out.push(Node::Pattern(*pattern));
                out.push(Node::Expr(*sequence));
                out.extend(where_clause.map(Node::Expr));
                out.push(Node::Stmt(*body));
            }
            StmtKind::Switch { subject, cases } => {
                out.push(Node::Expr(*subject));
                out.extend(cases.iter().map(|c| Node::Stmt(*c)));
            }
            StmtKind::Case { labels, body } => {
                for label in labels {
                    out.push(Node::Pattern(label.pattern));
                    out.extend(label.guard_expr.map(Node::Expr));
                }
                out.push(Node::Stmt(*body));
            }
            StmtKind::Do { body } => out.push(Node::Stmt(*body)),
            StmtKind::DoCatch { body, catches } => {
                out.push(Node::Stmt(*body));
                out.extend(catches.iter().map(|c| Node::Stmt(*c)));
            }
            StmtKind::Defer { body_fn } => out.push(Node::Decl(*body_fn)),
            StmtKind::Break | StmtKind::Continue | StmtKind::Fallthrough => {}
        }
    }

    fn expr_children(&self, id: ExprId, out: &mut Vec<Node>) {
        match &self.ast.expr(id).kind {
            ExprKind::DeclRef { .. }
            | ExprKind::OtherConstructorRef { .. }
            | ExprKind::Literal { .. }
            | ExprKind::Error => {}
            ExprKind::OpaqueValue => {
                if let Some(existentials) = self.opened.get(&id) {
                    exprs(out, existentials);
                }
            }
            ExprKind::MemberRef { base, .. } | ExprKind::DynamicMemberRef { base, .. } => {
                out.push(Node::Expr(*base))
            }
            ExprKind::Subscript { base, args, .. } => {
                out.push(Node::Expr(*base));
                args_children(args, out);
            }
            ExprKind::KeyPath { root, components } => {
                out.extend(root.map(Node::TypeRepr));
                for component in components {
                    if let Some(args) = component.kind.args() {
                        args_children(args, out);
                    }
                }
            }
            ExprKind::Binary { lhs, op, rhs } => exprs(out, &[*lhs, *op, *rhs]),
            ExprKind::Assign { dest, src } => {
                out.extend(dest.map(Node::Expr));
                out.extend(src.map(Node::Expr));
            }
            ExprKind::InOut { sub }
            | ExprKind::Load { sub }
            | ExprKind::CollectionUpcast { sub }
            | ExprKind::Paren { sub }
            | ExprKind::Try { sub }
            | ExprKind::Await { sub }
            | ExprKind::ForceValue { sub } => out.push(Node::Expr(*sub)),
            ExprKind::OpenExistential {
                opaque_value,
                existential,
                sub,
            } => exprs(out, &[*opaque_value, *existential, *sub]),
            ExprKind::MakeTemporarilyEscapable {
                nonescaping_closure,
                opaque_value,
                sub,
            } => exprs(out, &[*nonescaping_closure, *opaque_value, *sub]),
            ExprKind::Collection { elements, .. } | ExprKind::Tuple { elements } => {
                exprs(out, elements)
            }
            ExprKind::Call { func, args } => {
                out.push(Node::Expr(*func));
                args_children(args, out);
            }
            ExprKind::DotSyntaxCall { func, base }
            | ExprKind::ConstructorRefCall { func, base } => exprs(out, &[*func, *base]),
            ExprKind::AutoClosure { body, curry_thunk } => {
                out.push(Node::Expr(*body));
                out.extend(curry_thunk.map(Node::Expr));
            }
            ExprKind::Closure { params, body } => {
                out.extend(params.iter().map(|p| Node::Decl(*p)));
                out.push(Node::Stmt(*body));
            }
            ExprKind::Type { repr } => out.extend(repr.map(Node::TypeRepr)),
            ExprKind::Ternary {
                condition,
                then_expr,
                else_expr,
            } => exprs(out, &[*condition, *then_expr, *else_expr]),
            ExprKind::Coerce { sub, cast_type } => {
                out.push(Node::Expr(*sub));
                out.extend(cast_type.map(Node::TypeRepr));
            }
        }
    }

    fn pattern_children(&self, id: PatternId, out: &mut Vec<Node>) {
        match &self.ast.pattern(id).kind {
            PatternKind::Named { .. } | PatternKind::Any | PatternKind::Bool { .. } => {}
            PatternKind::Typed { sub, type_repr, .. } => {
                out.push(Node::Pattern(*sub));
                out.extend(type_repr.map(Node::TypeRepr));
            }
            PatternKind::Tuple { elements } => {
                out.extend(elements.iter().map(|p| Node::Pattern(*p)))
            }
            PatternKind::Paren { sub }
            | PatternKind::Binding { sub, .. }
            | PatternKind::OptionalSome { sub } => out.push(Node::Pattern(*sub)),
            PatternKind::EnumElement {
                parent_type, sub, ..
            } => {
                out.extend(parent_type.map(Node::TypeRepr));
                out.extend(sub.map(Node::Pattern));
            }
            PatternKind::Expr { expr } => out.push(Node::Expr(*expr)),
            PatternKind::Is { cast_type, sub } => {
                out.extend(cast_type.map(Node::TypeRepr));
                out.extend(sub.map(Node::Pattern));
            }
        }
    }

    fn type_repr_children(&self, id: TypeReprId, out: &mut Vec<Node>) {
        match &self.ast.type_repr(id).kind {
            TypeReprKind::Ident { generic_args, .. } => reprs(out, generic_args),
            TypeReprKind::Compound { components } => reprs(out, components),
            TypeReprKind::Tuple { elements } => reprs(out, elements),
            TypeReprKind::Function { params, result } => {
                reprs(out, params);
                out.push(Node::TypeRepr(*result));
            }
            TypeReprKind::Array { element } => out.push(Node::TypeRepr(*element)),
            TypeReprKind::Dictionary { key, value } => reprs(out, &[*key, *value]),
            TypeReprKind::Optional { wrapped } => out.push(Node::TypeRepr(*wrapped)),
            TypeReprKind::Composition { types } => reprs(out, types),
            TypeReprKind::Attributed { base, .. } => out.push(Node::TypeRepr(*base)),
        }
    }
}

fn args_children(args: &ArgumentList, out: &mut Vec<Node>) {
    out.extend(args.args.iter().map(|arg| Node::Expr(arg.expr)));
}

fn decls(out: &mut Vec<Node>, ids: &[DeclId]) {
    out.extend(ids.iter().map(|id| Node::Decl(*id)));
}

fn exprs(out: &mut Vec<Node>, ids: &[ExprId]) {
    out.extend(ids.iter().map(|id| Node::Expr(*id)));
}

fn reprs(out: &mut Vec<Node>, ids: &[TypeReprId]) {
    out.extend(ids.iter().map(|id| Node::TypeRepr(*id)));
}
