//! Traversal driver: declarations, statements, patterns and type references.
//!
//! Expressions live in `expr.rs` and reference emission in `reference.rs`;
//! all three extend the same [`SemaAnnotator`].

use tracing::warn;
use tugsema_ast::{
    AccessLevel, AstContext, AstNode, CharSourceRange, ConditionElement, DeclId, DeclKind,
    FileId, FileKind, FuncDecl, ModuleId, PatternId, PatternKind, StmtId, StmtKind, TypeReprId,
    TypeReprKind,
};

use super::context::{TraversalContext, Walk, CONTINUE};
use super::traits::{ReferenceKind, ReferenceMetaData, SourceEntityWalker};

pub(crate) struct SemaAnnotator<'a, W: ?Sized> {
    pub(super) walker: &'a mut W,
    pub(super) ast: &'a AstContext,
    pub(super) ctx: TraversalContext,
}

impl<'a, W: SourceEntityWalker + ?Sized> SemaAnnotator<'a, W> {
    pub(crate) fn new(walker: &'a mut W, ast: &'a AstContext) -> Self {
        SemaAnnotator {
            walker,
            ast,
            ctx: TraversalContext::default(),
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.ctx.is_cancelled()
    }

    /// Run `body` between `enter` and `exit`; `exit` runs on every path out.
    pub(super) fn scoped<R>(
        &mut self,
        enter: impl FnOnce(&mut TraversalContext),
        exit: impl FnOnce(&mut TraversalContext),
        body: impl FnOnce(&mut Self) -> R,
    ) -> R {
        enter(&mut self.ctx);
        let mut this = scopeguard::guard(self, move |this| exit(&mut this.ctx));
        body(&mut **this)
    }

    // ========================================================================
    // Roots
    // ========================================================================

    pub(crate) fn walk_file(&mut self, id: FileId) -> Walk {
        let ast = self.ast;
        let file = ast.file(id);
        for &decl in &file.decls {
            // Internal declarations of pre-compiled modules are not source.
            if file.kind == FileKind::Serialized && ast.decl(decl).access < AccessLevel::Public {
                continue;
            }
            self.walk_decl(decl)?;
        }
        CONTINUE
    }

    pub(crate) fn walk_module(&mut self, id: ModuleId) -> Walk {
        let ast = self.ast;
        for &file in &ast.module(id).files {
            self.walk_file(file)?;
        }
        CONTINUE
    }

    pub(crate) fn walk_node(&mut self, node: AstNode) -> Walk {
        match node {
            AstNode::Decl(id) => self.walk_decl(id),
            AstNode::Stmt(id) => self.walk_stmt(id),
            AstNode::Expr(id) => self.walk_expr(id, None),
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    pub(crate) fn walk_decl(&mut self, id: DeclId) -> Walk {
        self.ctx.check()?;
        let decl = self.ast.decl(id);

        // Synthesized declarations are invisible, but a synthesized binding
        // still leads to its variables.
        if decl.implicit && !decl.is_constructor() {
            if matches!(decl.kind, DeclKind::PatternBinding { .. }) {
                return self.walk_decl_children(id);
            }
            return CONTINUE;
        }

        self.walker.begin_balanced_decl_visit(id);
        let mut this = scopeguard::guard(self, move |this| this.walker.end_balanced_decl_visit(id));
        this.walk_decl_balanced(id)
    }

    fn walk_decl_balanced(&mut self, id: DeclId) -> Walk {
        let ast = self.ast;
        let decl = ast.decl(id);

        self.handle_custom_attributes(id)?;

        let mut loc = decl.loc;
        let mut name_len = 0;
        let mut is_extension = false;

        if decl.is_value_decl() {
            if !decl.implicit {
                name_len = self.value_name_len(id);
            }
            if let Some(params) = decl.params() {
                self.report_param_labels(id, params)?;
            }
            if let DeclKind::Protocol {
                primary_associated_types,
                ..
            } = &decl.kind
            {
                for primary in primary_associated_types {
                    if let Some(assoc) = ast.associated_type(id, &primary.name) {
                        self.pass_reference_at(
                            assoc,
                            None,
                            Some(primary.loc),
                            ReferenceMetaData::new(ReferenceKind::TypeRef, None),
                        )?;
                    }
                }
            }
        } else {
            match &decl.kind {
                DeclKind::Extension { extended_type, .. } => {
                    let range = extended_type.and_then(|repr| ast.type_repr(repr).range);
                    loc = range.map(|r| r.start);
                    if let Some(range) = range {
                        name_len = ast.sources.char_range(range).byte_length;
                    }
                    is_extension = true;
                }
                DeclKind::Import { .. } => self.handle_import(id)?,
                DeclKind::Operator { name, .. } | DeclKind::PrecedenceGroup { name } => {
                    name_len = name.len() as u32;
                }
                DeclKind::IfConfig { clauses } => {
                    if self.walker.should_walk_inactive_config_region() {
                        for clause in clauses {
                            for &element in &clause.elements {
                                self.walk_node(element)?;
                            }
                        }
                        return CONTINUE;
                    }
                }
                _ => {}
            }
        }

        let range = loc.map(|loc| CharSourceRange::new(loc, name_len));
        if !self.walker.visit_decl(id, range) {
            return CONTINUE;
        }

        // Only pushed when children are walked, so it is always popped.
        if is_extension {
            self.scoped(
                |ctx| ctx.ext_decls.push(id),
                |ctx| {
                    ctx.ext_decls.pop();
                },
                |this| this.walk_decl_children(id),
            )?;
        } else {
            self.walk_decl_children(id)?;
        }

        self.ctx.check()?;
        let keep_going = self.walker.leave_decl(id);
        self.ctx.proceed(keep_going)
    }

    /// Byte length of a value declaration's name at its location.
    fn value_name_len(&self, id: DeclId) -> u32 {
        let ast = self.ast;
        let Some(loc) = ast.decl(id).loc else {
            return 0;
        };
        match ast.decl_name(id) {
            Some(name) => {
                let escaped = ast.sources.extract_text(loc, 1) == Some("`");
                name.len() as u32 + if escaped { 2 } else { 0 }
            }
            None if ast.sources.extract_text(loc, 1) == Some("_") => 1,
            None => 0,
        }
    }

    fn report_param_labels(&mut self, decl: DeclId, params: &[DeclId]) -> Walk {
        let ast = self.ast;
        for &param in params {
            let DeclKind::Param {
                argument_name,
                argument_name_loc: Some(loc),
                ..
            } = &ast.decl(param).kind
            else {
                continue;
            };
            let keep_going =
                self.walker
                    .visit_declaration_argument_name(argument_name.as_deref(), *loc, decl);
            self.ctx.proceed(keep_going)?;
        }
        CONTINUE
    }

    fn handle_custom_attributes(&mut self, id: DeclId) -> Walk {
        let ast = self.ast;
        let decl = ast.decl(id);
        // Attributes on a variable belong to its binding and are walked there.
        let owner = match &decl.kind {
            DeclKind::Var { .. } => return CONTINUE,
            DeclKind::PatternBinding { .. } => match decl.kind.single_var() {
                Some(var) => ast.decl(var),
                None => return CONTINUE,
            },
            _ => decl,
        };

        for attr in &owner.attrs {
            if let Some(repr) = attr.type_repr {
                self.walk_type_repr(repr)?;
            }
            if let Some(init) = attr.semantic_init {
                if !ast.expr(init).implicit {
                    self.walk_expr(init, None)?;
                    // The binding's initializer slot holds the same expression.
                    self.ctx.exprs_to_skip.insert(init);
                }
            } else if let Some(args) = &attr.args {
                self.walk_argument_list(args, None)?;
            }
        }
        CONTINUE
    }

    fn handle_import(&mut self, id: DeclId) -> Walk {
        let ast = self.ast;
        let DeclKind::Import {
            path,
            module: Some(module),
            decls,
            end_loc,
        } = &ast.decl(id).kind
        else {
            return CONTINUE;
        };

        if ast.module(*module).is_foreign_submodule() {
            self.pass_module_path(path, *module)?;
        } else if let Some(first) = path.first() {
            self.pass_module_reference(*module, &first.name, first.loc)?;
        }

        if let [decl] = decls.as_slice() {
            self.pass_reference_at(
                *decl,
                None,
                *end_loc,
                ReferenceMetaData::new(ReferenceKind::DeclRef, None),
            )?;
        }
        CONTINUE
    }

    fn walk_decls(&mut self, ids: &[DeclId]) -> Walk {
        for &id in ids {
            self.walk_decl(id)?;
        }
        CONTINUE
    }

    fn walk_type_reprs(&mut self, ids: &[TypeReprId]) -> Walk {
        for &id in ids {
            self.walk_type_repr(id)?;
        }
        CONTINUE
    }

    fn walk_generic_params(&mut self, ids: &[DeclId]) -> Walk {
        if self.walker.should_walk_into_generic_params() {
            self.walk_decls(ids)?;
        }
        CONTINUE
    }

    fn walk_decl_children(&mut self, id: DeclId) -> Walk {
        let ast = self.ast;
        match &ast.decl(id).kind {
            DeclKind::Func(func) => {
                self.walk_generic_params(&func.generic_params)?;
                self.walk_decls(&func.params)?;
                if let Some(result) = func.result {
                    self.walk_type_repr(result)?;
                }
                if let Some(body) = func.body {
                    self.walk_stmt(body)?;
                }
            }
            DeclKind::Constructor {
                generic_params,
                params,
                body,
            } => {
                self.walk_generic_params(generic_params)?;
                self.walk_decls(params)?;
                if let Some(body) = body {
                    self.walk_stmt(*body)?;
                }
            }
            DeclKind::Subscript {
                generic_params,
                params,
                element_type,
                accessors,
            } => {
                self.walk_generic_params(generic_params)?;
                self.walk_decls(params)?;
                if let Some(ty) = element_type {
                    self.walk_type_repr(*ty)?;
                }
                self.walk_decls(accessors)?;
            }
            DeclKind::Param {
                type_repr,
                default_value,
                ..
            } => {
                if let Some(ty) = type_repr {
                    self.walk_type_repr(*ty)?;
                }
                if let Some(value) = default_value {
                    self.walk_expr(*value, None)?;
                }
            }
            DeclKind::Var { accessors, .. } => self.walk_decls(accessors)?,
            DeclKind::PatternBinding { entries, vars } => {
                for entry in entries {
                    self.walk_pattern(entry.pattern)?;
                    if let Some(init) = entry.init {
                        self.walk_expr(init, None)?;
                    }
                }
                self.walk_decls(vars)?;
            }
            DeclKind::Nominal {
                generic_params,
                inherited,
                members,
                ..
            } => {
                self.walk_generic_params(generic_params)?;
                self.walk_type_reprs(inherited)?;
                self.walk_decls(members)?;
            }
            DeclKind::EnumCase { elements } => self.walk_decls(elements)?,
            DeclKind::EnumElement {
                params, raw_value, ..
            } => {
                self.walk_decls(params)?;
                if let Some(raw) = raw_value {
                    self.walk_expr(*raw, None)?;
                }
            }
            DeclKind::Protocol {
                inherited, members, ..
            } => {
                self.walk_type_reprs(inherited)?;
                self.walk_decls(members)?;
            }
            DeclKind::AssociatedType {
                inherited,
                default_type,
                ..
            } => {
                self.walk_type_reprs(inherited)?;
                if let Some(ty) = default_type {
                    self.walk_type_repr(*ty)?;
                }
            }
            DeclKind::TypeAlias {
                generic_params,
                underlying,
                ..
            } => {
                self.walk_generic_params(generic_params)?;
                if let Some(ty) = underlying {
                    self.walk_type_repr(*ty)?;
                }
            }
            DeclKind::GenericTypeParam { inherited, .. } => self.walk_type_reprs(inherited)?,
            DeclKind::Extension {
                extended_type,
                inherited,
                members,
            } => {
                if let Some(ty) = extended_type {
                    self.walk_type_repr(*ty)?;
                }
                self.walk_type_reprs(inherited)?;
                self.walk_decls(members)?;
            }
            DeclKind::IfConfig { clauses } => {
                for clause in clauses.iter().filter(|c| c.is_active) {
                    for &element in &clause.elements {
                        self.walk_node(element)?;
                    }
                }
            }
            DeclKind::TopLevelCode { body } => self.walk_stmt(*body)?,
            DeclKind::Import { .. }
            | DeclKind::Operator { .. }
            | DeclKind::PrecedenceGroup { .. }
            | DeclKind::Module { .. } => {}
        }
        CONTINUE
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub(crate) fn walk_stmt(&mut self, id: StmtId) -> Walk {
        self.ctx.check()?;
        if !self.walker.visit_stmt(id) {
            return CONTINUE;
        }

        let ast = self.ast;
        if let StmtKind::Defer { body_fn } = ast.stmt(id).kind {
            // The body function is synthesized and would be filtered out, so
            // its body is walked directly.
            match &ast.decl(body_fn).kind {
                DeclKind::Func(FuncDecl {
                    body: Some(body), ..
                }) => self.walk_stmt(*body)?,
                _ => warn!(stmt = %id, decl = %body_fn, "defer without a body function"),
            }
        } else {
            self.walk_stmt_children(id)?;
        }

        self.ctx.check()?;
        let keep_going = self.walker.leave_stmt(id);
        self.ctx.proceed(keep_going)
    }

    fn walk_conditions(&mut self, conditions: &[ConditionElement]) -> Walk {
        for cond in conditions {
            match cond {
                ConditionElement::Boolean(expr) => self.walk_expr(*expr, None)?,
                ConditionElement::Binding { pattern, init } => {
                    self.walk_pattern(*pattern)?;
                    self.walk_expr(*init, None)?;
                }
            }
        }
        CONTINUE
    }

    fn walk_stmt_children(&mut self, id: StmtId) -> Walk {
        let ast = self.ast;
        match &ast.stmt(id).kind {
            StmtKind::Brace { elements } => {
                for &element in elements {
                    self.walk_node(element)?;
                }
            }
            StmtKind::Return { result } => {
                if let Some(result) = result {
                    self.walk_expr(*result, None)?;
                }
            }
            StmtKind::Throw { error } => self.walk_expr(*error, None)?,
            StmtKind::If {
                conditions,
                then_stmt,
                else_stmt,
            } => {
                self.walk_conditions(conditions)?;
                self.walk_stmt(*then_stmt)?;
                if let Some(else_stmt) = else_stmt {
                    self.walk_stmt(*else_stmt)?;
                }
            }
            StmtKind::Guard { conditions, body } | StmtKind::While { conditions, body } => {
                self.walk_conditions(conditions)?;
                self.walk_stmt(*body)?;
            }
            StmtKind::RepeatWhile { body, condition } => {
                self.walk_stmt(*body)?;
                self.walk_expr(*condition, None)?;
            }
            StmtKind::ForEach {
                pattern,
                sequence,
                where_clause,
                body,
            } => {
                self.walk_pattern(*pattern)?;
                self.walk_expr(*sequence, None)?;
                if let Some(clause) = where_clause {
                    self.walk_expr(*clause, None)?;
                }
                self.walk_stmt(*body)?;
            }
            StmtKind::Switch { subject, cases } => {
                self.walk_expr(*subject, None)?;
                for &case in cases {
                    self.walk_stmt(case)?;
                }
            }
            StmtKind::Case { labels, body } => {
                for label in labels {
                    self.walk_pattern(label.pattern)?;
                    if let Some(guard) = label.guard_expr {
                        self.walk_expr(guard, None)?;
                    }
                }
                self.walk_stmt(*body)?;
            }
            StmtKind::Do { body } => self.walk_stmt(*body)?,
            StmtKind::DoCatch { body, catches } => {
                self.walk_stmt(*body)?;
                for &catch in catches {
                    self.walk_stmt(catch)?;
                }
            }
            StmtKind::Defer { .. }
            | StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Fallthrough => {}
        }
        CONTINUE
    }

    // ========================================================================
    // Patterns
    // ========================================================================

    pub(crate) fn walk_pattern(&mut self, id: PatternId) -> Walk {
        self.ctx.check()?;
        if !self.walker.visit_pattern(id) {
            return CONTINUE;
        }

        let ast = self.ast;
        let pattern = ast.pattern(id);
        if !pattern.implicit {
            match &pattern.kind {
                PatternKind::EnumElement {
                    element: Some(element),
                    ..
                } => {
                    self.pass_reference_at(
                        *element,
                        pattern.ty,
                        pattern.loc,
                        ReferenceMetaData::new(ReferenceKind::EnumElementRef, None),
                    )?;
                }
                PatternKind::Typed {
                    sub,
                    propagated: true,
                    ..
                } => {
                    // The annotation was copied from another pattern and is
                    // walked there.
                    self.walk_pattern(*sub)?;
                    return self.leave_pattern(id);
                }
                _ => {}
            }
        }

        self.walk_pattern_children(id)?;
        self.leave_pattern(id)
    }

    fn leave_pattern(&mut self, id: PatternId) -> Walk {
        self.ctx.check()?;
        let keep_going = self.walker.leave_pattern(id);
        self.ctx.proceed(keep_going)
    }

    fn walk_pattern_children(&mut self, id: PatternId) -> Walk {
        let ast = self.ast;
        match &ast.pattern(id).kind {
            PatternKind::Named { .. } | PatternKind::Any | PatternKind::Bool { .. } => {}
            PatternKind::Typed { sub, type_repr, .. } => {
                self.walk_pattern(*sub)?;
                if let Some(ty) = type_repr {
                    self.walk_type_repr(*ty)?;
                }
            }
            PatternKind::Tuple { elements } => {
                for &element in elements {
                    self.walk_pattern(element)?;
                }
            }
            PatternKind::Paren { sub }
            | PatternKind::Binding { sub, .. }
            | PatternKind::OptionalSome { sub } => self.walk_pattern(*sub)?,
            PatternKind::EnumElement {
                parent_type, sub, ..
            } => {
                if let Some(ty) = parent_type {
                    self.walk_type_repr(*ty)?;
                }
                if let Some(sub) = sub {
                    self.walk_pattern(*sub)?;
                }
            }
            PatternKind::Expr { expr } => self.walk_expr(*expr, None)?,
            PatternKind::Is { cast_type, sub } => {
                if let Some(sub) = sub {
                    self.walk_pattern(*sub)?;
                }
                if let Some(ty) = cast_type {
                    self.walk_type_repr(*ty)?;
                }
            }
        }
        CONTINUE
    }

    // ========================================================================
    // Type references
    // ========================================================================

    pub(crate) fn walk_type_repr(&mut self, id: TypeReprId) -> Walk {
        self.ctx.check()?;
        let keep_going = self.walker.visit_type_repr(id);
        self.ctx.proceed(keep_going)?;

        let ast = self.ast;
        let repr = ast.type_repr(id);
        if let TypeReprKind::Ident {
            name,
            name_loc,
            bound: Some(bound),
            ..
        } = &repr.kind
        {
            if let DeclKind::Module { module } = ast.decl(*bound).kind {
                self.pass_module_reference(module, name, repr.loc)?;
            } else {
                self.pass_reference_at(
                    *bound,
                    None,
                    *name_loc,
                    ReferenceMetaData::new(ReferenceKind::TypeRef, None),
                )?;
            }
        }

        match &repr.kind {
            TypeReprKind::Ident { generic_args, .. } => self.walk_type_reprs(generic_args)?,
            TypeReprKind::Compound { components } => self.walk_type_reprs(components)?,
            TypeReprKind::Tuple { elements } => self.walk_type_reprs(elements)?,
            TypeReprKind::Function { params, result } => {
                self.walk_type_reprs(params)?;
                self.walk_type_repr(*result)?;
            }
            TypeReprKind::Array { element } => self.walk_type_repr(*element)?,
            TypeReprKind::Dictionary { key, value } => {
                self.walk_type_repr(*key)?;
                self.walk_type_repr(*value)?;
            }
            TypeReprKind::Optional { wrapped } => self.walk_type_repr(*wrapped)?,
            TypeReprKind::Composition { types } => self.walk_type_reprs(types)?,
            TypeReprKind::Attributed { base, .. } => self.walk_type_repr(*base)?,
        }

        self.ctx.check()?;
        let keep_going = self.walker.leave_type_repr(id);
        self.ctx.proceed(keep_going)
    }
}
