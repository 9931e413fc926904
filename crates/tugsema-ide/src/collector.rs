//! EventCollector: an observer that records every walk event in order.
//!
//! The collector backs the CLI's `walk` command and most of the traversal
//! tests. Each hook invocation becomes one [`WalkEvent`]; subscript brackets
//! are recorded individually, both open and close.
//!
//! # Usage
//!
//! ```
//! use tugsema_ast::{AstBuilder, AstNode};
//! use tugsema_ide::collector::{CollectorOptions, EventCollector, WalkEvent};
//! use tugsema_ide::walker::WalkRoot;
//!
//! let mut b = AstBuilder::new("main.swift", "var x = 0\nx\n");
//! let x = b.var("x", b.loc("x"));
//! let use_x = b.decl_ref(x, b.loc_nth("x", 1));
//! b.top_level_code(vec![AstNode::Expr(use_x)]);
//! let file = b.file_id();
//! let ast = b.finish();
//!
//! let report = EventCollector::new(CollectorOptions::default()).run(&ast, WalkRoot::File(file));
//! assert!(report.completed);
//! assert_eq!(report.references().count(), 1);
//! ```

use serde::{Deserialize, Serialize};
use tugsema_ast::{
    AstContext, CharSourceRange, DeclId, ExprId, ModuleId, PatternId, SourceLoc, StmtId,
    TypeReprId,
};

use crate::walker::{walk, DeclReference, ReferenceMetaData, SourceEntityWalker, WalkRoot};

/// Settings for an [`EventCollector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectorOptions {
    /// Descend into generic parameter lists.
    pub walk_generic_params: bool,
    /// Walk every clause of conditional-compilation blocks, active or not.
    pub walk_inactive_regions: bool,
    /// Cancel the walk once this many reference events were recorded.
    pub stop_after_references: Option<usize>,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        CollectorOptions {
            walk_generic_params: true,
            walk_inactive_regions: false,
            stop_after_references: None,
        }
    }
}

/// One observer notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WalkEvent {
    BeginDecl {
        decl: DeclId,
    },
    EndDecl {
        decl: DeclId,
    },
    VisitDecl {
        decl: DeclId,
        name_range: Option<CharSourceRange>,
    },
    LeaveDecl {
        decl: DeclId,
    },
    VisitStmt {
        stmt: StmtId,
    },
    LeaveStmt {
        stmt: StmtId,
    },
    VisitExpr {
        expr: ExprId,
    },
    LeaveExpr {
        expr: ExprId,
    },
    VisitPattern {
        pattern: PatternId,
    },
    LeavePattern {
        pattern: PatternId,
    },
    VisitTypeRepr {
        repr: TypeReprId,
    },
    LeaveTypeRepr {
        repr: TypeReprId,
    },
    Reference(DeclReference),
    SubscriptReference {
        decl: DeclId,
        range: Option<CharSourceRange>,
        data: ReferenceMetaData,
        is_open_bracket: bool,
    },
    CallAsFunctionReference {
        decl: DeclId,
        range: Option<CharSourceRange>,
        data: ReferenceMetaData,
    },
    CallArgName {
        name: String,
        range: CharSourceRange,
        callee: DeclId,
    },
    DeclarationArgumentName {
        name: Option<String>,
        loc: SourceLoc,
        decl: DeclId,
    },
    ModuleReference {
        module: ModuleId,
        range: CharSourceRange,
    },
}

impl WalkEvent {
    /// True for events that report an entity occurrence rather than tree
    /// structure.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            WalkEvent::Reference(_)
                | WalkEvent::SubscriptReference { .. }
                | WalkEvent::CallAsFunctionReference { .. }
                | WalkEvent::ModuleReference { .. }
        )
    }

    /// Source range of a reference-like event.
    pub fn range(&self) -> Option<CharSourceRange> {
        match self {
            WalkEvent::Reference(reference) => reference.range,
            WalkEvent::SubscriptReference { range, .. }
            | WalkEvent::CallAsFunctionReference { range, .. } => *range,
            WalkEvent::CallArgName { range, .. } | WalkEvent::ModuleReference { range, .. } => {
                Some(*range)
            }
            WalkEvent::VisitDecl { name_range, .. } => *name_range,
            WalkEvent::DeclarationArgumentName { name, loc, .. } => {
                let len = name.as_ref().map_or(0, |n| n.len() as u32);
                Some(CharSourceRange::new(*loc, len))
            }
            _ => None,
        }
    }
}

/// Result of [`EventCollector::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkReport {
    /// False when the walk was cancelled.
    pub completed: bool,
    pub events: Vec<WalkEvent>,
}

impl WalkReport {
    pub fn references(&self) -> impl Iterator<Item = &WalkEvent> {
        self.events.iter().filter(|e| e.is_reference())
    }
}

/// Records every hook invocation as a [`WalkEvent`].
#[derive(Debug, Default)]
pub struct EventCollector {
    options: CollectorOptions,
    events: Vec<WalkEvent>,
    references: usize,
}

impl EventCollector {
    pub fn new(options: CollectorOptions) -> Self {
        EventCollector {
            options,
            events: Vec::new(),
            references: 0,
        }
    }

    pub fn events(&self) -> &[WalkEvent] {
        &self.events
    }

    /// Walk `root` and return everything that was recorded.
    pub fn run(mut self, ast: &AstContext, root: WalkRoot) -> WalkReport {
        let completed = walk(&mut self, ast, root);
        WalkReport {
            completed,
            events: self.events,
        }
    }

    fn record(&mut self, event: WalkEvent) -> bool {
        let is_reference = event.is_reference();
        self.events.push(event);
        if !is_reference {
            return true;
        }
        self.references += 1;
        match self.options.stop_after_references {
            Some(limit) => self.references < limit,
            None => true,
        }
    }
}

impl SourceEntityWalker for EventCollector {
    fn begin_balanced_decl_visit(&mut self, decl: DeclId) {
        self.events.push(WalkEvent::BeginDecl { decl });
    }

    fn end_balanced_decl_visit(&mut self, decl: DeclId) {
        self.events.push(WalkEvent::EndDecl { decl });
    }

    fn visit_decl(&mut self, decl: DeclId, name_range: Option<CharSourceRange>) -> bool {
        self.record(WalkEvent::VisitDecl { decl, name_range })
    }

    fn leave_decl(&mut self, decl: DeclId) -> bool {
        self.record(WalkEvent::LeaveDecl { decl })
    }

    fn visit_stmt(&mut self, stmt: StmtId) -> bool {
        self.record(WalkEvent::VisitStmt { stmt })
    }

    fn leave_stmt(&mut self, stmt: StmtId) -> bool {
        self.record(WalkEvent::LeaveStmt { stmt })
    }

    fn visit_expr(&mut self, expr: ExprId) -> bool {
        self.record(WalkEvent::VisitExpr { expr })
    }

    fn leave_expr(&mut self, expr: ExprId) -> bool {
        self.record(WalkEvent::LeaveExpr { expr })
    }

    fn visit_pattern(&mut self, pattern: PatternId) -> bool {
        self.record(WalkEvent::VisitPattern { pattern })
    }

    fn leave_pattern(&mut self, pattern: PatternId) -> bool {
        self.record(WalkEvent::LeavePattern { pattern })
    }

    fn visit_type_repr(&mut self, repr: TypeReprId) -> bool {
        self.record(WalkEvent::VisitTypeRepr { repr })
    }

    fn leave_type_repr(&mut self, repr: TypeReprId) -> bool {
        self.record(WalkEvent::LeaveTypeRepr { repr })
    }

    fn visit_decl_reference(&mut self, reference: &DeclReference) -> bool {
        self.record(WalkEvent::Reference(*reference))
    }

    fn visit_subscript_reference(
        &mut self,
        decl: DeclId,
        range: Option<CharSourceRange>,
        data: ReferenceMetaData,
        is_open_bracket: bool,
    ) -> bool {
        self.record(WalkEvent::SubscriptReference {
            decl,
            range,
            data,
            is_open_bracket,
        })
    }

    fn visit_call_as_function_reference(
        &mut self,
        decl: DeclId,
        range: Option<CharSourceRange>,
        data: ReferenceMetaData,
    ) -> bool {
        self.record(WalkEvent::CallAsFunctionReference { decl, range, data })
    }

    fn visit_call_arg_name(&mut self, name: &str, range: CharSourceRange, callee: DeclId) -> bool {
        self.record(WalkEvent::CallArgName {
            name: name.to_string(),
            range,
            callee,
        })
    }

    fn visit_declaration_argument_name(
        &mut self,
        name: Option<&str>,
        loc: SourceLoc,
        decl: DeclId,
    ) -> bool {
        self.record(WalkEvent::DeclarationArgumentName {
            name: name.map(str::to_string),
            loc,
            decl,
        })
    }

    fn visit_module_reference(&mut self, module: ModuleId, range: CharSourceRange) -> bool {
        self.record(WalkEvent::ModuleReference { module, range })
    }

    fn should_walk_into_generic_params(&self) -> bool {
        self.options.walk_generic_params
    }

    fn should_walk_inactive_config_region(&self) -> bool {
        self.options.walk_inactive_regions
    }
}
