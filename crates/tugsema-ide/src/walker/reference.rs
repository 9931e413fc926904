//! Reference classification and emission.

use tracing::warn;
use tugsema_ast::{
    AstContext, CharSourceRange, DeclId, DeclKind, ExprId, ExprKind, ImportPathElement, ModuleId,
    SourceLoc, SourceRange, TypeId,
};

use super::annotator::SemaAnnotator;
use super::context::{Walk, CONTINUE};
use super::traits::{DeclReference, ReferenceMetaData, SourceEntityWalker};

/// The declaration a callee expression ultimately applies, looking through
/// parentheses, applications and curry thunks.
pub(crate) fn extract_decl(ast: &AstContext, func: ExprId) -> Option<DeclId> {
    let func = ast.semantics_providing_expr(func);
    match ast.expr(func).kind {
        ExprKind::DeclRef { decl, .. } => Some(decl),
        ExprKind::Call { func, .. }
        | ExprKind::DotSyntaxCall { func, .. }
        | ExprKind::ConstructorRefCall { func, .. } => extract_decl(ast, func),
        ExprKind::Binary { op, .. } => extract_decl(ast, op),
        ExprKind::AutoClosure {
            curry_thunk: Some(inner),
            ..
        } => extract_decl(ast, inner),
        _ => None,
    }
}

impl<W: SourceEntityWalker + ?Sized> SemaAnnotator<'_, W> {
    /// Report a reference spelled by a name at `name_loc`. A back-ticked name
    /// covers both back-ticks.
    pub(super) fn pass_reference_at(
        &mut self,
        decl: DeclId,
        ty: Option<TypeId>,
        name_loc: Option<SourceLoc>,
        data: ReferenceMetaData,
    ) -> Walk {
        let sources = &self.ast.sources;
        let range = name_loc.map(|start| {
            let end = if sources.extract_text(start, 1) == Some("`") {
                sources.token_end(start.advanced(1))
            } else {
                start
            };
            SourceRange::new(start, end)
        });
        self.pass_reference(decl, ty, name_loc, range, data)
    }

    /// Report a reference whose name starts at `base_loc` and spans the
    /// token range `range`.
    pub(super) fn pass_reference(
        &mut self,
        decl: DeclId,
        ty: Option<TypeId>,
        base_loc: Option<SourceLoc>,
        range: Option<SourceRange>,
        data: ReferenceMetaData,
    ) -> Walk {
        let ast = self.ast;
        let mut target = Some(decl);
        let mut ctor_type = None;
        let mut extension = None;

        if let (true, Some(base_loc)) = (ast.decl(decl).is_type_decl(), base_loc) {
            // A type name that is the callee of a construction refers to the
            // initializer being called.
            if let Some(&ctor_ref) = self.ctx.ctor_refs.last() {
                if let ExprKind::ConstructorRefCall { func, .. } = ast.expr(ctor_ref).kind {
                    if ast.expr(func).loc == Some(base_loc) {
                        target = extract_decl(ast, func);
                        ctor_type = Some(decl);
                    }
                }
            }

            if let Some(&ext) = self.ctx.ext_decls.last() {
                if let DeclKind::Extension {
                    extended_type: Some(repr),
                    ..
                } = ast.decl(ext).kind
                {
                    if ast.type_repr(repr).loc == Some(base_loc) {
                        extension = Some(ext);
                    }
                }
            }
        }

        let Some(target) = target else {
            warn!(decl = %decl, "reference resolves to no declaration");
            debug_assert!(false, "unhandled reference to {decl}");
            return CONTINUE;
        };

        let reference = DeclReference {
            decl: target,
            range: range.map(|r| ast.sources.char_range(r)),
            ctor_type,
            extension,
            ty,
            data,
        };
        let keep_going = self.walker.visit_decl_reference(&reference);
        self.ctx.proceed(keep_going)
    }

    /// Report one subscript bracket.
    pub(super) fn pass_subscript_reference(
        &mut self,
        decl: DeclId,
        loc: Option<SourceLoc>,
        data: ReferenceMetaData,
        is_open_bracket: bool,
    ) -> Walk {
        let range = loc.map(|loc| CharSourceRange::new(loc, 1));
        let keep_going = self
            .walker
            .visit_subscript_reference(decl, range, data, is_open_bracket);
        self.ctx.proceed(keep_going)
    }

    pub(super) fn pass_call_as_function_reference(
        &mut self,
        decl: DeclId,
        loc: Option<SourceLoc>,
        data: ReferenceMetaData,
    ) -> Walk {
        let range = loc.map(|loc| CharSourceRange::new(loc, 1));
        let keep_going = self
            .walker
            .visit_call_as_function_reference(decl, range, data);
        self.ctx.proceed(keep_going)
    }

    /// Report a module name; occurrences without a location are skipped.
    pub(super) fn pass_module_reference(
        &mut self,
        module: ModuleId,
        name: &str,
        loc: Option<SourceLoc>,
    ) -> Walk {
        let Some(loc) = loc else {
            return CONTINUE;
        };
        let range = CharSourceRange::new(loc, name.len() as u32);
        let keep_going = self.walker.visit_module_reference(module, range);
        self.ctx.proceed(keep_going)
    }

    /// Report every component of an import path naming a foreign
    /// sub-module, outermost first.
    pub(super) fn pass_module_path(
        &mut self,
        path: &[ImportPathElement],
        module: ModuleId,
    ) -> Walk {
        let Some((last, parent_path)) = path.split_last() else {
            return CONTINUE;
        };
        if let Some(parent) = self.ast.module(module).foreign_parent() {
            if !parent_path.is_empty() {
                self.pass_module_path(parent_path, parent)?;
            }
        }
        self.pass_module_reference(module, &last.name, last.loc)
    }
}
