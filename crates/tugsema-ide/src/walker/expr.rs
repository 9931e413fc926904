//! Traversal driver: expressions and argument lists.

use std::ops::ControlFlow;

use tracing::warn;
use tugsema_ast::{
    ArgumentList, AstContext, CharSourceRange, DeclKind, ExprId, ExprKind, SourceRange,
};

use super::annotator::SemaAnnotator;
use super::context::{Walk, CONTINUE};
use super::reference::extract_decl;
use super::traits::{AccessKind, ReferenceKind, ReferenceMetaData, SourceEntityWalker};

/// What is left to do for an expression after its own events were emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Descent {
    /// Walk the children in structural order.
    Children,
    /// Children were already walked in source order.
    Visited,
}

/// Implicit expressions of these kinds still emit events.
fn classified_when_implicit(kind: &ExprKind) -> bool {
    matches!(
        kind,
        ExprKind::InOut { .. }
            | ExprKind::Load { .. }
            | ExprKind::OpenExistential { .. }
            | ExprKind::MakeTemporarilyEscapable { .. }
            | ExprKind::CollectionUpcast { .. }
            | ExprKind::OpaqueValue
            | ExprKind::Subscript { .. }
            | ExprKind::KeyPath { .. }
            | ExprKind::Literal { .. }
            | ExprKind::Collection { .. }
    )
}

/// A reference applied to its base (`x.method`, `Type.init`) is a member
/// reference; anything else is a plain one.
fn reference_kind(ast: &AstContext, parent: Option<ExprId>, expr: ExprId) -> ReferenceKind {
    match parent.map(|p| &ast.expr(p).kind) {
        Some(ExprKind::DotSyntaxCall { func, .. } | ExprKind::ConstructorRefCall { func, .. })
            if *func == expr =>
        {
            ReferenceKind::DeclMemberRef
        }
        _ => ReferenceKind::DeclRef,
    }
}

impl<W: SourceEntityWalker + ?Sized> SemaAnnotator<'_, W> {
    /// Walk an expression. `parent` is the expression it is structurally
    /// nested in, if any.
    pub(crate) fn walk_expr(&mut self, id: ExprId, parent: Option<ExprId>) -> Walk {
        self.ctx.check()?;
        if self.ctx.exprs_to_skip.contains(&id) {
            return CONTINUE;
        }

        let ast = self.ast;
        let expr = ast.expr(id);

        // A curry thunk stands in for the expression it wraps.
        if let ExprKind::AutoClosure {
            curry_thunk: Some(inner),
            ..
        } = expr.kind
        {
            return self.walk_expr(inner, Some(id));
        }

        if !self.walker.visit_expr(id) {
            return CONTINUE;
        }

        if matches!(expr.kind, ExprKind::ConstructorRefCall { .. }) {
            self.scoped(
                |ctx| ctx.ctor_refs.push(id),
                |ctx| {
                    ctx.ctor_refs.pop();
                },
                |this| this.walk_expr_inner(id, parent),
            )?;
        } else {
            self.walk_expr_inner(id, parent)?;
        }

        self.ctx.check()?;
        let keep_going = self.walker.leave_expr(id);
        self.ctx.proceed(keep_going)
    }

    fn walk_expr_inner(&mut self, id: ExprId, parent: Option<ExprId>) -> Walk {
        if self.classify_expr(id, parent)? == Descent::Children {
            self.walk_expr_children(id)?;
        }
        CONTINUE
    }

    fn with_access<R>(&mut self, access: Option<AccessKind>, body: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.ctx.op_access;
        self.scoped(
            |ctx| ctx.op_access = access,
            move |ctx| ctx.op_access = saved,
            body,
        )
    }

    /// Emit the expression's own events, walking children in source order
    /// where structural order differs.
    fn classify_expr(&mut self, id: ExprId, parent: Option<ExprId>) -> Walk<Descent> {
        let ast = self.ast;
        let expr = ast.expr(id);
        let access = self.ctx.op_access;

        if let ExprKind::DeclRef { decl, .. } = expr.kind {
            let call_as_function = match &ast.decl(decl).kind {
                DeclKind::Func(func) => func.is_call_as_function(),
                _ => false,
            };
            if expr.implicit && call_as_function {
                self.pass_call_as_function_reference(
                    decl,
                    expr.loc,
                    ReferenceMetaData::new(ReferenceKind::DeclMemberRef, access),
                )?;
                return ControlFlow::Continue(Descent::Children);
            }
        }

        if expr.implicit && !classified_when_implicit(&expr.kind) {
            return ControlFlow::Continue(Descent::Children);
        }

        let descent = match &expr.kind {
            ExprKind::Literal { initializer, .. } | ExprKind::Collection { initializer, .. } => {
                if let Some(init) = initializer {
                    self.pass_reference(
                        *init,
                        expr.ty,
                        None,
                        expr.range,
                        ReferenceMetaData::new(ReferenceKind::DeclRef, access).implicit(),
                    )?;
                }
                Descent::Children
            }
            ExprKind::DeclRef { decl, name_loc } => {
                if let DeclKind::Module { module } = ast.decl(*decl).kind {
                    self.pass_module_reference(module, &ast.module(module).name, expr.loc)?;
                } else {
                    let kind = reference_kind(ast, parent, id);
                    self.pass_reference_at(
                        *decl,
                        expr.ty,
                        *name_loc,
                        ReferenceMetaData::new(kind, access),
                    )?;
                }
                Descent::Children
            }
            ExprKind::MemberRef {
                base,
                member,
                name_loc,
            } => {
                let base_access = match access {
                    Some(AccessKind::Write) => Some(AccessKind::ReadWrite),
                    other => other,
                };
                self.with_access(base_access, |this| this.walk_expr(*base, Some(id)))?;
                self.pass_reference_at(
                    *member,
                    expr.ty,
                    *name_loc,
                    ReferenceMetaData::new(ReferenceKind::DeclMemberRef, access),
                )?;
                Descent::Visited
            }
            ExprKind::OtherConstructorRef { decl, ctor_loc } => {
                self.pass_reference_at(
                    *decl,
                    expr.ty,
                    *ctor_loc,
                    ReferenceMetaData::new(ReferenceKind::DeclConstructorRef, access),
                )?;
                Descent::Children
            }
            ExprKind::Subscript { base, args, decl } => {
                self.walk_expr(*base, Some(id))?;
                let data = ReferenceMetaData {
                    kind: ReferenceKind::SubscriptRef,
                    access,
                    is_implicit: expr.implicit,
                };
                if let Some(decl) = decl {
                    self.pass_subscript_reference(*decl, expr.loc, data, true)?;
                }
                self.walk_argument_list(args, Some(id))?;
                if let Some(decl) = decl {
                    let close = expr.range.map(|r| r.end);
                    self.pass_subscript_reference(*decl, close, data, false)?;
                }
                Descent::Visited
            }
            ExprKind::KeyPath { components, .. } => {
                for component in components {
                    let Some(decl) = component.kind.resolved_decl() else {
                        continue;
                    };
                    let kind = if ast.decl(decl).is_subscript() {
                        ReferenceKind::SubscriptRef
                    } else {
                        ReferenceKind::DeclMemberRef
                    };
                    self.pass_reference(
                        decl,
                        component.ty,
                        component.loc,
                        component.loc.map(SourceRange::point),
                        ReferenceMetaData::new(kind, access),
                    )?;
                }
                Descent::Children
            }
            ExprKind::Binary { lhs, op, rhs } => {
                self.walk_expr(*lhs, Some(id))?;
                self.walk_expr(*op, Some(id))?;
                self.walk_expr(*rhs, Some(id))?;
                Descent::Visited
            }
            ExprKind::InOut { sub } => {
                self.with_access(Some(AccessKind::ReadWrite), |this| {
                    this.walk_expr(*sub, Some(id))
                })?;
                Descent::Visited
            }
            ExprKind::Load { sub } => {
                self.with_access(Some(AccessKind::Read), |this| this.walk_expr(*sub, Some(id)))?;
                Descent::Visited
            }
            ExprKind::Assign { dest, src } => {
                if let Some(dest) = dest {
                    self.with_access(Some(AccessKind::Write), |this| {
                        this.walk_expr(*dest, Some(id))
                    })?;
                }
                if let Some(src) = src {
                    self.walk_expr(*src, Some(id))?;
                }
                Descent::Visited
            }
            ExprKind::OpenExistential {
                opaque_value,
                existential,
                sub,
            } => {
                let (opaque, value) = (*opaque_value, *existential);
                self.scoped(
                    |ctx| {
                        ctx.opaque_values.insert(opaque, value);
                    },
                    |ctx| {
                        ctx.opaque_values.remove(&opaque);
                    },
                    |this| this.walk_expr(*sub, Some(id)),
                )?;
                Descent::Visited
            }
            ExprKind::MakeTemporarilyEscapable {
                nonescaping_closure,
                sub,
                ..
            } => {
                self.walk_expr(*nonescaping_closure, Some(id))?;
                // The synthesized call's callee is the user-written body.
                match ast.expr(*sub).kind {
                    ExprKind::Call { func, .. } => self.walk_expr(func, Some(*sub))?,
                    _ => warn!(expr = %id, "escapable conversion without a call"),
                }
                Descent::Visited
            }
            ExprKind::CollectionUpcast { sub } => {
                self.walk_expr(*sub, Some(id))?;
                Descent::Visited
            }
            ExprKind::OpaqueValue => match self.ctx.opaque_values.get(&id).copied() {
                Some(value) => {
                    self.walk_expr(value, Some(id))?;
                    Descent::Visited
                }
                None => Descent::Children,
            },
            ExprKind::DynamicMemberRef {
                base,
                member,
                name_loc,
            } => {
                self.walk_expr(*base, Some(id))?;
                self.pass_reference_at(
                    *member,
                    expr.ty,
                    *name_loc,
                    ReferenceMetaData::new(ReferenceKind::DynamicMemberRef, access),
                )?;
                Descent::Visited
            }
            _ => Descent::Children,
        };
        ControlFlow::Continue(descent)
    }

    fn walk_exprs(&mut self, ids: &[ExprId], parent: ExprId) -> Walk {
        for &id in ids {
            self.walk_expr(id, Some(parent))?;
        }
        CONTINUE
    }

    fn walk_expr_children(&mut self, id: ExprId) -> Walk {
        let ast = self.ast;
        let parent = Some(id);
        match &ast.expr(id).kind {
            ExprKind::DeclRef { .. }
            | ExprKind::OtherConstructorRef { .. }
            | ExprKind::OpaqueValue
            | ExprKind::Literal { .. }
            | ExprKind::Error => {}
            ExprKind::MemberRef { base, .. } | ExprKind::DynamicMemberRef { base, .. } => {
                self.walk_expr(*base, parent)?
            }
            ExprKind::Subscript { base, args, .. } => {
                self.walk_expr(*base, parent)?;
                self.walk_argument_list(args, parent)?;
            }
            ExprKind::KeyPath { root, components } => {
                if let Some(root) = root {
                    self.walk_type_repr(*root)?;
                }
                for component in components {
                    if let Some(args) = component.kind.args() {
                        self.walk_argument_list(args, parent)?;
                    }
                }
            }
            ExprKind::Binary { lhs, op, rhs } => self.walk_exprs(&[*lhs, *op, *rhs], id)?,
            ExprKind::Assign { dest, src } => {
                if let Some(dest) = dest {
                    self.walk_expr(*dest, parent)?;
                }
                if let Some(src) = src {
                    self.walk_expr(*src, parent)?;
                }
            }
            ExprKind::InOut { sub }
            | ExprKind::Load { sub }
            | ExprKind::CollectionUpcast { sub }
            | ExprKind::Paren { sub }
            | ExprKind::Try { sub }
            | ExprKind::Await { sub }
            | ExprKind::ForceValue { sub } => self.walk_expr(*sub, parent)?,
            ExprKind::OpenExistential {
                existential, sub, ..
            } => self.walk_exprs(&[*existential, *sub], id)?,
            ExprKind::MakeTemporarilyEscapable {
                nonescaping_closure,
                sub,
                ..
            } => self.walk_exprs(&[*nonescaping_closure, *sub], id)?,
            ExprKind::Collection { elements, .. } | ExprKind::Tuple { elements } => {
                self.walk_exprs(elements, id)?
            }
            ExprKind::Call { func, args } => {
                self.walk_expr(*func, parent)?;
                self.walk_argument_list(args, parent)?;
            }
            ExprKind::DotSyntaxCall { func, base }
            | ExprKind::ConstructorRefCall { func, base } => {
                self.walk_exprs(&[*base, *func], id)?
            }
            ExprKind::AutoClosure { body, .. } => self.walk_expr(*body, parent)?,
            ExprKind::Closure { params, body } => {
                for &param in params {
                    self.walk_decl(param)?;
                }
                self.walk_stmt(*body)?;
            }
            ExprKind::Type { repr } => {
                if let Some(repr) = repr {
                    self.walk_type_repr(*repr)?;
                }
            }
            ExprKind::Ternary {
                condition,
                then_expr,
                else_expr,
            } => self.walk_exprs(&[*condition, *then_expr, *else_expr], id)?,
            ExprKind::Coerce { sub, cast_type } => {
                self.walk_expr(*sub, parent)?;
                if let Some(ty) = cast_type {
                    self.walk_type_repr(*ty)?;
                }
            }
        }
        CONTINUE
    }

    /// Walk call arguments. Labels are reported for written argument lists
    /// of plain calls.
    pub(crate) fn walk_argument_list(&mut self, args: &ArgumentList, parent: Option<ExprId>) -> Walk {
        let ast = self.ast;
        if !args.implicit {
            if let Some(ExprKind::Call { func, .. }) = parent.map(|p| &ast.expr(p).kind) {
                self.pass_call_arg_names(*func, args)?;
            }
        }
        for arg in &args.args {
            self.walk_expr(arg.expr, parent)?;
        }
        CONTINUE
    }

    fn pass_call_arg_names(&mut self, func: ExprId, args: &ArgumentList) -> Walk {
        let Some(callee) = extract_decl(self.ast, func) else {
            return CONTINUE;
        };
        for arg in &args.args {
            let (Some(label), Some(loc)) = (&arg.label, arg.label_loc) else {
                continue;
            };
            if label.is_empty() {
                continue;
            }
            let range = CharSourceRange::new(loc, label.len() as u32);
            let keep_going = self.walker.visit_call_arg_name(label, range, callee);
            self.ctx.proceed(keep_going)?;
        }
        CONTINUE
    }
}
