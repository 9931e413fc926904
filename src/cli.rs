//! CLI front door.
//!
//! Provides the helpers behind the `tugsema` binary:
//! - Loading a serialized tree and checking its id links
//! - Parsing walk roots written as `<kind>:<index>`
//! - Running an [`EventCollector`] and rendering its events for output
//!
//! ## Error Handling
//!
//! All functions return `Result<T, SemaError>`, so the binary maps every
//! failure to a stable exit code. A cancelled walk is not an error: it yields
//! a normal response with `completed: false`.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, info};
use tugsema_ast::{
    AstContext, CharSourceRange, DeclId, ExprId, FileId, ModuleId, PatternId, StmtId,
};
use tugsema_core::error::SemaError;
use tugsema_core::output::{EventRecord, WalkResponse};
use tugsema_core::text::byte_offset_to_position_str;
use tugsema_core::types::Location;
use tugsema_ide::{CollectorOptions, EventCollector, ReferenceMetaData, WalkEvent, WalkRoot};

// ============================================================================
// Walk Roots
// ============================================================================

/// A malformed `--root` argument.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RootSpecError {
    #[error("invalid root '{0}', expected <kind>:<index> (e.g., 'decl:4')")]
    Malformed(String),

    #[error("unknown root kind '{0}', expected one of: file, module, decl, stmt, expr, pattern")]
    UnknownKind(String),
}

impl From<RootSpecError> for SemaError {
    fn from(err: RootSpecError) -> Self {
        SemaError::invalid_args(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    File,
    Module,
    Decl,
    Stmt,
    Expr,
    Pattern,
}

impl RootKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RootKind::File => "file",
            RootKind::Module => "module",
            RootKind::Decl => "decl",
            RootKind::Stmt => "stmt",
            RootKind::Expr => "expr",
            RootKind::Pattern => "pattern",
        }
    }
}

/// A walk root as written on the command line, not yet checked against a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootSpec {
    pub kind: RootKind,
    pub index: u32,
}

impl Default for RootSpec {
    /// The first module: every file the tree holds.
    fn default() -> Self {
        RootSpec {
            kind: RootKind::Module,
            index: 0,
        }
    }
}

impl FromStr for RootSpec {
    type Err = RootSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || RootSpecError::Malformed(s.to_string());
        let (kind, index) = s.split_once(':').ok_or_else(malformed)?;
        let index = index.parse::<u32>().map_err(|_| malformed())?;
        let kind = match kind {
            "file" => RootKind::File,
            "module" => RootKind::Module,
            "decl" => RootKind::Decl,
            "stmt" => RootKind::Stmt,
            "expr" => RootKind::Expr,
            "pattern" => RootKind::Pattern,
            other => return Err(RootSpecError::UnknownKind(other.to_string())),
        };
        Ok(RootSpec { kind, index })
    }
}

impl fmt::Display for RootSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.index)
    }
}

impl RootSpec {
    /// Resolve against `ast`. Fails with a resolution error when the index is
    /// out of range.
    pub fn resolve(self, ast: &AstContext) -> Result<WalkRoot, SemaError> {
        let index = self.index;
        let (count, root) = match self.kind {
            RootKind::File => (ast.file_count(), WalkRoot::File(FileId(index))),
            RootKind::Module => (ast.module_count(), WalkRoot::Module(ModuleId(index))),
            RootKind::Decl => (ast.decl_count(), WalkRoot::Decl(DeclId(index))),
            RootKind::Stmt => (ast.stmt_count(), WalkRoot::Stmt(StmtId(index))),
            RootKind::Expr => (ast.expr_count(), WalkRoot::Expr(ExprId(index))),
            RootKind::Pattern => (ast.pattern_count(), WalkRoot::Pattern(PatternId(index))),
        };
        if index as usize >= count {
            return Err(SemaError::unknown_root(self.to_string()));
        }
        Ok(root)
    }
}

// ============================================================================
// Walk Command
// ============================================================================

/// Options for [`run_walk`].
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Where to start; the first module when absent.
    pub root: Option<RootSpec>,
    pub collector: CollectorOptions,
}

/// Load a tree from a JSON file and check that its id links resolve.
pub fn load_tree(path: &Path) -> Result<AstContext, SemaError> {
    if !path.exists() {
        return Err(SemaError::file_not_found(path.display().to_string()));
    }
    let json = fs::read_to_string(path)?;
    let ast: AstContext = serde_json::from_str(&json)?;
    ast.validate()?;
    debug!(
        path = %path.display(),
        decls = ast.decl_count(),
        exprs = ast.expr_count(),
        "tree loaded"
    );
    Ok(ast)
}

/// Walk the tree stored at `path` and collect every event.
pub fn run_walk(path: &Path, options: &WalkOptions) -> Result<WalkResponse, SemaError> {
    let ast = load_tree(path)?;
    let spec = options.root.unwrap_or_default();
    let root = spec.resolve(&ast)?;

    let report = EventCollector::new(options.collector).run(&ast, root);
    info!(
        root = %spec,
        events = report.events.len(),
        completed = report.completed,
        "walk finished"
    );

    let events = report
        .events
        .iter()
        .map(|event| render_event(&ast, event))
        .collect();
    Ok(WalkResponse::new(spec.to_string(), report.completed, events))
}

/// Render a walk response as text, one line per event with a source location.
pub fn render_text(response: &WalkResponse) -> String {
    let mut out = String::new();
    for record in response.events.iter().filter(|r| r.location.is_some()) {
        out.push_str(&record.to_text_line());
        out.push('\n');
    }
    if !response.completed {
        out.push_str("(walk cancelled)\n");
    }
    out
}

// ============================================================================
// Event Rendering
// ============================================================================

/// Buffer-relative location of an exact byte range.
pub fn location(ast: &AstContext, range: CharSourceRange) -> Option<Location> {
    let (buffer, start) = ast.sources.decompose(range.start)?;
    let end = start + range.byte_length as usize;
    let (line, col) = byte_offset_to_position_str(&buffer.text, start);
    Some(Location::with_span(
        buffer.name.as_str(),
        line,
        col,
        start as u64,
        end as u64,
    ))
}

fn decl_record(ast: &AstContext, event: &str, decl: DeclId) -> EventRecord {
    EventRecord {
        subject: Some(decl.to_string()),
        name: ast.decl_name(decl).map(str::to_string),
        ..EventRecord::new(event)
    }
}

fn node_record(event: &str, subject: impl fmt::Display) -> EventRecord {
    EventRecord {
        subject: Some(subject.to_string()),
        ..EventRecord::new(event)
    }
}

fn reference_record(
    ast: &AstContext,
    event: &str,
    decl: DeclId,
    range: Option<CharSourceRange>,
    data: ReferenceMetaData,
) -> EventRecord {
    EventRecord {
        location: range.and_then(|r| location(ast, r)),
        kind: Some(data.kind.as_str().to_string()),
        access: data.access.map(|a| a.as_str().to_string()),
        implicit: data.is_implicit,
        ..decl_record(ast, event, decl)
    }
}

/// Render one collected event for output.
pub fn render_event(ast: &AstContext, event: &WalkEvent) -> EventRecord {
    match event {
        WalkEvent::BeginDecl { decl } => decl_record(ast, "begin_decl", *decl),
        WalkEvent::EndDecl { decl } => decl_record(ast, "end_decl", *decl),
        WalkEvent::VisitDecl { decl, name_range } => EventRecord {
            location: name_range.and_then(|r| location(ast, r)),
            ..decl_record(ast, "visit_decl", *decl)
        },
        WalkEvent::LeaveDecl { decl } => decl_record(ast, "leave_decl", *decl),
        WalkEvent::VisitStmt { stmt } => node_record("visit_stmt", stmt),
        WalkEvent::LeaveStmt { stmt } => node_record("leave_stmt", stmt),
        WalkEvent::VisitExpr { expr } => node_record("visit_expr", expr),
        WalkEvent::LeaveExpr { expr } => node_record("leave_expr", expr),
        WalkEvent::VisitPattern { pattern } => node_record("visit_pattern", pattern),
        WalkEvent::LeavePattern { pattern } => node_record("leave_pattern", pattern),
        WalkEvent::VisitTypeRepr { repr } => node_record("visit_type_repr", repr),
        WalkEvent::LeaveTypeRepr { repr } => node_record("leave_type_repr", repr),
        WalkEvent::Reference(reference) => EventRecord {
            ctor_type: reference.ctor_type.map(|d| d.to_string()),
            extension: reference.extension.map(|d| d.to_string()),
            ..reference_record(
                ast,
                "reference",
                reference.decl,
                reference.range,
                reference.data,
            )
        },
        WalkEvent::SubscriptReference {
            decl,
            range,
            data,
            is_open_bracket,
        } => EventRecord {
            open_bracket: Some(*is_open_bracket),
            ..reference_record(ast, "subscript_reference", *decl, *range, *data)
        },
        WalkEvent::CallAsFunctionReference { decl, range, data } => {
            reference_record(ast, "call_as_function_reference", *decl, *range, *data)
        }
        WalkEvent::CallArgName {
            name,
            range,
            callee,
        } => EventRecord {
            subject: Some(callee.to_string()),
            name: Some(name.clone()),
            location: location(ast, *range),
            ..EventRecord::new("call_arg_name")
        },
        WalkEvent::DeclarationArgumentName { name, decl, .. } => EventRecord {
            subject: Some(decl.to_string()),
            name: name.clone(),
            location: event.range().and_then(|r| location(ast, r)),
            ..EventRecord::new("declaration_argument_name")
        },
        WalkEvent::ModuleReference { module, range } => EventRecord {
            subject: Some(module.to_string()),
            name: Some(ast.module(*module).name.clone()),
            location: location(ast, *range),
            ..EventRecord::new("module_reference")
        },
    }
}

// ============================================================================
// Tests
// ============================================================================
