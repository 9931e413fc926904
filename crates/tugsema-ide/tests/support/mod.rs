//! Shared helpers for traversal integration tests.

#![allow(dead_code)]

use tugsema_ast::{AstContext, CharSourceRange};
use tugsema_ide::{CollectorOptions, DeclReference, EventCollector, WalkEvent, WalkReport, WalkRoot};

pub fn collect(ast: &AstContext, root: WalkRoot) -> WalkReport {
    collect_with(ast, root, CollectorOptions::default())
}

pub fn collect_with(ast: &AstContext, root: WalkRoot, options: CollectorOptions) -> WalkReport {
    EventCollector::new(options).run(ast, root)
}

/// Source text covered by `range`, or `<none>`.
pub fn text(ast: &AstContext, range: Option<CharSourceRange>) -> String {
    range
        .and_then(|r| ast.sources.extract_range(r))
        .unwrap_or("<none>")
        .to_string()
}

/// Text of every reference-like event, in order.
pub fn reference_texts(ast: &AstContext, report: &WalkReport) -> Vec<String> {
    report.references().map(|e| text(ast, e.range())).collect()
}

/// Every `visit_decl_reference` payload, in order.
pub fn decl_references(report: &WalkReport) -> Vec<DeclReference> {
    report
        .events
        .iter()
        .filter_map(|e| match e {
            WalkEvent::Reference(reference) => Some(*reference),
            _ => None,
        })
        .collect()
}

pub fn count(report: &WalkReport, event: &WalkEvent) -> usize {
    report.events.iter().filter(|e| *e == event).count()
}

/// Begin and end balanced notifications pair up like brackets.
pub fn assert_balanced(report: &WalkReport) {
    let mut open = Vec::new();
    for event in &report.events {
        match event {
            WalkEvent::BeginDecl { decl } => open.push(*decl),
            WalkEvent::EndDecl { decl } => assert_eq!(open.pop(), Some(*decl)),
            _ => {}
        }
    }
    assert!(open.is_empty(), "unclosed declarations: {open:?}");
}
