//! Programmatic tree construction over a source text.
//!
//! The builder owns one buffer, one native module named `main` and one source
//! file. Locations are found by searching the text, which keeps test trees
//! readable:
//!
//! ```
//! use tugsema_ast::AstBuilder;
//!
//! let b = AstBuilder::new("main.swift", "a + a");
//! assert_eq!(b.loc_nth("a", 1).offset(), 4);
//! ```

use crate::context::{AstContext, AstNode};
use crate::decl::{Decl, DeclKind, FuncDecl, NominalKind, PatternBindingEntry};
use crate::expr::{Argument, ArgumentList, Expr, ExprKind};
use crate::ids::{DeclId, ExprId, FileId, ModuleId, PatternId, StmtId, TypeId, TypeReprId};
use crate::module::{FileKind, Module, ModuleKind, SourceFile, TypeInfo};
use crate::pattern::{Pattern, PatternKind};
use crate::source::{SourceLoc, SourceRange};
use crate::stmt::{Stmt, StmtKind};
use crate::type_repr::{TypeRepr, TypeReprKind};

pub struct AstBuilder {
    ast: AstContext,
    text: String,
    base: SourceLoc,
    module: ModuleId,
    file: FileId,
}

impl AstBuilder {
    pub fn new(file_name: &str, text: &str) -> Self {
        let mut ast = AstContext::new();
        let base = ast.sources.add_buffer(file_name, text);
        let module = ast.add_module(Module::new("main", ModuleKind::Native));
        let file = ast.add_file(SourceFile {
            name: file_name.to_string(),
            kind: FileKind::Source,
            module,
            decls: Vec::new(),
        });
        ast.module_mut(module).files.push(file);
        AstBuilder {
            ast,
            text: text.to_string(),
            base,
            module,
            file,
        }
    }

    pub fn module_id(&self) -> ModuleId {
        self.module
    }

    pub fn file_id(&self) -> FileId {
        self.file
    }

    pub fn ast(&self) -> &AstContext {
        &self.ast
    }

    pub fn ast_mut(&mut self) -> &mut AstContext {
        &mut self.ast
    }

    pub fn finish(self) -> AstContext {
        self.ast
    }

    // ------------------------------------------------------------------------
    // Locations
    // ------------------------------------------------------------------------

    /// Location of the first occurrence of `needle`.
    ///
    /// # Panics
    ///
    /// Panics if `needle` does not occur in the text.
    pub fn loc(&self, needle: &str) -> SourceLoc {
        self.loc_nth(needle, 0)
    }

    /// Location of the `n`th (zero-based) occurrence of `needle`.
    ///
    /// # Panics
    ///
    /// Panics if there are fewer than `n + 1` occurrences.
    pub fn loc_nth(&self, needle: &str, n: usize) -> SourceLoc {
        match self.text.match_indices(needle).nth(n) {
            Some((offset, _)) => self.base.advanced(offset as u32),
            None => panic!("occurrence {n} of {needle:?} not found in source"),
        }
    }

    /// Location of the first occurrence of `needle` at or after `from`.
    ///
    /// # Panics
    ///
    /// Panics if there is no such occurrence.
    pub fn loc_after(&self, needle: &str, from: SourceLoc) -> SourceLoc {
        let start = (from.offset() - self.base.offset()) as usize;
        match self.text[start..].find(needle) {
            Some(offset) => from.advanced(offset as u32),
            None => panic!("{needle:?} not found after offset {start}"),
        }
    }

    pub fn range(&self, start: SourceLoc, end: SourceLoc) -> SourceRange {
        SourceRange::new(start, end)
    }

    fn expr_range(&self, id: ExprId) -> Option<SourceRange> {
        self.ast.expr(id).range
    }

    fn span_exprs(&self, first: ExprId, last: ExprId) -> Option<SourceRange> {
        match (self.expr_range(first), self.expr_range(last)) {
            (Some(a), Some(b)) => Some(SourceRange::new(a.start, b.end)),
            (a, b) => a.or(b),
        }
    }

    // ------------------------------------------------------------------------
    // Raw nodes
    // ------------------------------------------------------------------------

    pub fn decl(&mut self, decl: Decl) -> DeclId {
        self.ast.add_decl(decl)
    }

    pub fn stmt(&mut self, stmt: Stmt) -> StmtId {
        self.ast.add_stmt(stmt)
    }

    pub fn expr(&mut self, expr: Expr) -> ExprId {
        self.ast.add_expr(expr)
    }

    pub fn pattern(&mut self, pattern: Pattern) -> PatternId {
        self.ast.add_pattern(pattern)
    }

    pub fn type_repr(&mut self, repr: TypeRepr) -> TypeReprId {
        self.ast.add_type_repr(repr)
    }

    pub fn ty(&mut self, name: &str) -> TypeId {
        self.ast.add_type(TypeInfo {
            name: name.to_string(),
        })
    }

    /// Add another module, e.g. an import target.
    pub fn module(&mut self, name: &str, kind: ModuleKind) -> ModuleId {
        self.ast.add_module(Module::new(name, kind))
    }

    /// Append a declaration to the file's top-level list.
    pub fn top_level(&mut self, decl: DeclId) {
        self.ast.file_mut(self.file).decls.push(decl);
    }

    // ------------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------------

    pub fn var(&mut self, name: &str, loc: SourceLoc) -> DeclId {
        self.decl(Decl::new(
            DeclKind::Var {
                name: name.to_string(),
                accessors: vec![],
            },
            Some(loc),
        ))
    }

    /// `var name = init` binding a single variable; `keyword` locates `var`/`let`.
    pub fn binding(&mut self, keyword: SourceLoc, var: DeclId, init: Option<ExprId>) -> DeclId {
        let var_loc = self.ast.decl(var).loc;
        let pattern = self.pattern(Pattern::new(PatternKind::Named { var }, var_loc));
        self.decl(Decl::new(
            DeclKind::PatternBinding {
                entries: vec![PatternBindingEntry { pattern, init }],
                vars: vec![var],
            },
            Some(keyword),
        ))
    }

    pub fn param(
        &mut self,
        label: Option<(&str, SourceLoc)>,
        name: &str,
        loc: SourceLoc,
        type_repr: Option<TypeReprId>,
    ) -> DeclId {
        self.decl(Decl::new(
            DeclKind::Param {
                name: name.to_string(),
                argument_name: label.map(|(l, _)| l.to_string()),
                argument_name_loc: label.map(|(_, loc)| loc),
                type_repr,
                default_value: None,
            },
            Some(loc),
        ))
    }

    pub fn func(
        &mut self,
        name: &str,
        loc: SourceLoc,
        params: Vec<DeclId>,
        body: Option<StmtId>,
    ) -> DeclId {
        self.decl(Decl::new(
            DeclKind::Func(FuncDecl {
                name: name.to_string(),
                generic_params: vec![],
                params,
                result: None,
                body,
                is_method: false,
            }),
            Some(loc),
        ))
    }

    pub fn constructor(
        &mut self,
        loc: SourceLoc,
        params: Vec<DeclId>,
        body: Option<StmtId>,
    ) -> DeclId {
        self.decl(Decl::new(
            DeclKind::Constructor {
                generic_params: vec![],
                params,
                body,
            },
            Some(loc),
        ))
    }

    pub fn nominal(
        &mut self,
        kind: NominalKind,
        name: &str,
        loc: SourceLoc,
        members: Vec<DeclId>,
    ) -> DeclId {
        self.decl(Decl::new(
            DeclKind::Nominal {
                kind,
                name: name.to_string(),
                generic_params: vec![],
                inherited: vec![],
                members,
            },
            Some(loc),
        ))
    }

    /// Top-level statements wrapped in a top-level code declaration, appended
    /// to the file.
    pub fn top_level_code(&mut self, elements: Vec<AstNode>) -> DeclId {
        let body = self.brace(elements);
        let decl = self.decl(Decl::new(DeclKind::TopLevelCode { body }, None));
        self.top_level(decl);
        decl
    }

    // ------------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------------

    pub fn brace(&mut self, elements: Vec<AstNode>) -> StmtId {
        self.stmt(Stmt::new(StmtKind::Brace { elements }, None))
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    pub fn decl_ref(&mut self, decl: DeclId, loc: SourceLoc) -> ExprId {
        self.expr(Expr::new(
            ExprKind::DeclRef {
                decl,
                name_loc: Some(loc),
            },
            Some(loc),
            Some(SourceRange::point(loc)),
        ))
    }

    pub fn member_ref(&mut self, base: ExprId, member: DeclId, loc: SourceLoc) -> ExprId {
        let start = self.expr_range(base).map_or(loc, |r| r.start);
        self.expr(Expr::new(
            ExprKind::MemberRef {
                base,
                member,
                name_loc: Some(loc),
            },
            Some(loc),
            Some(SourceRange::new(start, loc)),
        ))
    }

    /// Implicit rvalue load of `sub`.
    pub fn load(&mut self, sub: ExprId) -> ExprId {
        let (loc, range) = (self.ast.expr(sub).loc, self.expr_range(sub));
        self.expr(Expr::new(ExprKind::Load { sub }, loc, range).implicit())
    }

    pub fn assign(&mut self, dest: ExprId, src: ExprId, eq_loc: SourceLoc) -> ExprId {
        let range = self.span_exprs(dest, src);
        self.expr(Expr::new(
            ExprKind::Assign {
                dest: Some(dest),
                src: Some(src),
            },
            Some(eq_loc),
            range,
        ))
    }

    /// `lhs op rhs` where `op` names the operator function at `op_loc`.
    pub fn binary(&mut self, lhs: ExprId, op: DeclId, op_loc: SourceLoc, rhs: ExprId) -> ExprId {
        let op = self.decl_ref(op, op_loc);
        let range = self.span_exprs(lhs, rhs);
        self.expr(Expr::new(ExprKind::Binary { lhs, op, rhs }, Some(op_loc), range))
    }

    pub fn arg(&self, label: Option<(&str, SourceLoc)>, expr: ExprId) -> Argument {
        Argument {
            label: label.map(|(l, _)| l.to_string()),
            label_loc: label.map(|(_, loc)| loc),
            expr,
        }
    }

    /// `func(args)`; `r_paren` locates the closing parenthesis.
    pub fn call(&mut self, func: ExprId, args: Vec<Argument>, r_paren: SourceLoc) -> ExprId {
        let (loc, start) = (
            self.ast.expr(func).loc,
            self.expr_range(func).map(|r| r.start),
        );
        let l_paren = self.loc_after("(", loc.unwrap_or(self.base));
        self.expr(Expr::new(
            ExprKind::Call {
                func,
                args: ArgumentList::new(args).with_brackets(l_paren, r_paren),
            },
            loc,
            start.map(|s| SourceRange::new(s, r_paren)),
        ))
    }

    pub fn ident_type(&mut self, name: &str, loc: SourceLoc, bound: Option<DeclId>) -> TypeReprId {
        self.type_repr(TypeRepr::new(
            TypeReprKind::Ident {
                name: name.to_string(),
                name_loc: Some(loc),
                bound,
                generic_args: vec![],
            },
            Some(SourceRange::point(loc)),
        ))
    }
}
