//! Cancellation, balanced notifications, skipping and walk configuration.

mod support;

use tugsema_ast::{
    AccessLevel, Argument, ArgumentList, AstBuilder, AstContext, AstNode, CustomAttr, Decl,
    DeclId, DeclKind, Expr, ExprId, ExprKind, FileKind, FuncDecl, IfConfigClause, LiteralKind,
    NominalKind, Pattern, PatternBindingEntry, PatternKind, SourceFile, SourceRange, TypeReprId,
};
use tugsema_ide::{
    walk, CollectorOptions, DeclReference, SourceEntityWalker, WalkEvent, WalkRoot,
};

use support::{assert_balanced, collect, collect_with, count};

/// `p + q` inside top-level code.
fn sum_tree() -> (AstContext, WalkRoot) {
    let mut b = AstBuilder::new("main.swift", "var p = 0\nvar q = 0\np + q\n");
    let p = b.var("p", b.loc("p"));
    let q = b.var("q", b.loc("q"));
    let plus = b.func("+", b.loc("+"), vec![], None);
    let lhs = b.decl_ref(p, b.loc_nth("p", 1));
    let rhs = b.decl_ref(q, b.loc_nth("q", 1));
    let sum = b.binary(lhs, plus, b.loc("+"), rhs);
    b.top_level_code(vec![AstNode::Expr(sum)]);
    let file = b.file_id();
    (b.finish(), WalkRoot::File(file))
}

fn literal(b: &mut AstBuilder, needle: &str) -> ExprId {
    let loc = b.loc(needle);
    b.expr(Expr::new(
        ExprKind::Literal {
            kind: LiteralKind::Integer,
            initializer: None,
        },
        Some(loc),
        Some(SourceRange::point(loc)),
    ))
}

fn begun(events: &[WalkEvent]) -> Vec<DeclId> {
    events
        .iter()
        .filter_map(|e| match e {
            WalkEvent::BeginDecl { decl } => Some(*decl),
            _ => None,
        })
        .collect()
}

#[test]
fn cancellation_stops_everything_but_balanced_ends() {
    let (ast, root) = sum_tree();
    let report = collect_with(
        &ast,
        root,
        CollectorOptions {
            stop_after_references: Some(1),
            ..CollectorOptions::default()
        },
    );

    assert!(!report.completed);
    let first_ref = report
        .events
        .iter()
        .position(WalkEvent::is_reference)
        .expect("one reference is recorded");
    assert!(report.events[first_ref + 1..]
        .iter()
        .all(|e| matches!(e, WalkEvent::EndDecl { .. })));
    assert_eq!(report.references().count(), 1);
    assert_balanced(&report);
}

#[derive(Default)]
struct StopOnFirstLeave {
    calls: Vec<&'static str>,
}

impl SourceEntityWalker for StopOnFirstLeave {
    fn visit_expr(&mut self, _expr: ExprId) -> bool {
        self.calls.push("visit");
        true
    }

    fn leave_expr(&mut self, _expr: ExprId) -> bool {
        self.calls.push("leave");
        false
    }

    fn visit_decl_reference(&mut self, _reference: &DeclReference) -> bool {
        self.calls.push("ref");
        true
    }
}

#[test]
fn no_hook_fires_after_a_leave_hook_cancels() {
    let (ast, root) = sum_tree();
    let mut walker = StopOnFirstLeave::default();
    assert!(!walk(&mut walker, &ast, root));
    assert_eq!(walker.calls, vec!["visit", "visit", "ref", "leave"]);
}

#[derive(Default)]
struct RejectTypes {
    leaves: usize,
}

impl SourceEntityWalker for RejectTypes {
    fn visit_type_repr(&mut self, _repr: TypeReprId) -> bool {
        false
    }

    fn leave_expr(&mut self, _expr: ExprId) -> bool {
        self.leaves += 1;
        true
    }
}

#[test]
fn rejecting_a_type_reference_cancels() {
    let mut b = AstBuilder::new("main.swift", "struct T {}\nT.self\n");
    let t = b.nominal(NominalKind::Struct, "T", b.loc("T"), vec![]);
    let repr = b.ident_type("T", b.loc_nth("T", 1), Some(t));
    let type_expr = b.expr(Expr::new(ExprKind::Type { repr: Some(repr) }, None, None));
    let ast = b.finish();

    let mut walker = RejectTypes::default();
    assert!(!walker.walk(&ast, WalkRoot::Expr(type_expr)));
    assert_eq!(walker.leaves, 0);
}

#[derive(Default)]
struct SkipAllDecls {
    log: Vec<String>,
}

impl SourceEntityWalker for SkipAllDecls {
    fn begin_balanced_decl_visit(&mut self, decl: DeclId) {
        self.log.push(format!("begin {decl}"));
    }

    fn end_balanced_decl_visit(&mut self, decl: DeclId) {
        self.log.push(format!("end {decl}"));
    }

    fn visit_decl(&mut self, _decl: DeclId, _name: Option<tugsema_ast::CharSourceRange>) -> bool {
        false
    }

    fn leave_decl(&mut self, decl: DeclId) -> bool {
        self.log.push(format!("leave {decl}"));
        true
    }
}

#[test]
fn skipped_declarations_stay_balanced_without_leave() {
    let mut b = AstBuilder::new("main.swift", "struct S { var v = 0 }\n");
    let v = b.var("v", b.loc("v"));
    let s = b.nominal(NominalKind::Struct, "S", b.loc("S"), vec![v]);
    b.top_level(s);
    let file = b.file_id();
    let ast = b.finish();

    let mut walker = SkipAllDecls::default();
    assert!(walker.walk(&ast, WalkRoot::File(file)));
    assert_eq!(walker.log, vec![format!("begin {s}"), format!("end {s}")]);
}

#[test]
fn attribute_initializer_is_walked_once() {
    let mut b = AstBuilder::new("main.swift", "@Wrap var w = 0\n");
    let wrap = b.nominal(NominalKind::Struct, "Wrap", b.loc("Wrap"), vec![]);
    let attr_type = b.ident_type("Wrap", b.loc("Wrap"), Some(wrap));
    let init = literal(&mut b, "0");
    let w = b.decl(
        Decl::new(
            DeclKind::Var {
                name: "w".to_string(),
                accessors: vec![],
            },
            Some(b.loc("w")),
        )
        .with_attr(CustomAttr {
            type_repr: Some(attr_type),
            args: None,
            semantic_init: Some(init),
        }),
    );
    let binding = b.binding(b.loc("var"), w, Some(init));
    b.top_level(binding);
    let file = b.file_id();
    let ast = b.finish();

    let report = collect(&ast, WalkRoot::File(file));
    assert_eq!(count(&report, &WalkEvent::VisitExpr { expr: init }), 1);
    assert_eq!(count(&report, &WalkEvent::LeaveExpr { expr: init }), 1);

    let position = |wanted: &WalkEvent| report.events.iter().position(|e| e == wanted);
    let walked_init = position(&WalkEvent::VisitExpr { expr: init });
    let visited_binding = report
        .events
        .iter()
        .position(|e| matches!(e, WalkEvent::VisitDecl { decl, .. } if *decl == binding));
    assert!(walked_init < visited_binding);
    assert_eq!(begun(&report.events), vec![binding, w]);
}

#[test]
fn attribute_arguments_are_walked_before_the_declaration() {
    let mut b = AstBuilder::new("main.swift", "@Tag(1) func f() {}\n");
    let tag = b.nominal(NominalKind::Struct, "Tag", b.loc("Tag"), vec![]);
    let attr_type = b.ident_type("Tag", b.loc("Tag"), Some(tag));
    let one = literal(&mut b, "1");
    let f = b.decl(
        Decl::new(
            DeclKind::Func(FuncDecl {
                name: "f".to_string(),
                generic_params: vec![],
                params: vec![],
                result: None,
                body: None,
                is_method: false,
            }),
            Some(b.loc("f()")),
        )
        .with_attr(CustomAttr {
            type_repr: Some(attr_type),
            args: Some(ArgumentList::new(vec![Argument::unlabeled(one)])),
            semantic_init: None,
        }),
    );
    let ast = b.finish();

    let report = collect(&ast, WalkRoot::Decl(f));
    let kinds: Vec<_> = report
        .events
        .iter()
        .map(|e| match e {
            WalkEvent::BeginDecl { .. } => "begin",
            WalkEvent::VisitTypeRepr { .. } => "visit_type",
            WalkEvent::Reference(_) => "ref",
            WalkEvent::LeaveTypeRepr { .. } => "leave_type",
            WalkEvent::VisitExpr { .. } => "visit_expr",
            WalkEvent::LeaveExpr { .. } => "leave_expr",
            WalkEvent::VisitDecl { .. } => "visit_decl",
            WalkEvent::LeaveDecl { .. } => "leave_decl",
            WalkEvent::EndDecl { .. } => "end",
            _ => "other",
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            "begin",
            "visit_type",
            "ref",
            "leave_type",
            "visit_expr",
            "leave_expr",
            "visit_decl",
            "leave_decl",
            "end",
        ]
    );
}

#[test]
fn synthesized_declarations_are_hidden() {
    let mut b = AstBuilder::new("main.swift", "struct S { var v = 0 }\n");
    let hidden = b.decl(
        Decl::new(
            DeclKind::Func(FuncDecl {
                name: "helper".to_string(),
                generic_params: vec![],
                params: vec![],
                result: None,
                body: None,
                is_method: true,
            }),
            None,
        )
        .implicit(),
    );
    let v = b.var("v", b.loc("v"));
    let pattern = b.pattern(Pattern::new(PatternKind::Named { var: v }, Some(b.loc("v"))));
    let binding = b.decl(
        Decl::new(
            DeclKind::PatternBinding {
                entries: vec![PatternBindingEntry {
                    pattern,
                    init: None,
                }],
                vars: vec![v],
            },
            None,
        )
        .implicit(),
    );
    let init = b.decl(
        Decl::new(
            DeclKind::Constructor {
                generic_params: vec![],
                params: vec![],
                body: None,
            },
            Some(b.loc("S")),
        )
        .implicit(),
    );
    let ast = b.finish();

    assert!(collect(&ast, WalkRoot::Decl(hidden)).events.is_empty());

    let report = collect(&ast, WalkRoot::Decl(binding));
    assert_eq!(
        report.events[..2],
        [
            WalkEvent::VisitPattern { pattern },
            WalkEvent::LeavePattern { pattern },
        ]
    );
    assert_eq!(begun(&report.events), vec![v]);

    let report = collect(&ast, WalkRoot::Decl(init));
    assert_eq!(begun(&report.events), vec![init]);
    let name_range = report.events.iter().find_map(|e| match e {
        WalkEvent::VisitDecl { name_range, .. } => Some(*name_range),
        _ => None,
    });
    assert_eq!(name_range.flatten().map(|r| r.byte_length), Some(0));
}

fn if_config_tree() -> (AstContext, WalkRoot, DeclId, DeclId, DeclId) {
    let mut b = AstBuilder::new("main.swift", "#if DEBUG\nvar k = 0\n#else\nvar z = 0\n#endif\n");
    let k = b.var("k", b.loc("k"));
    let z = b.var("z", b.loc("z"));
    let config = b.decl(Decl::new(
        DeclKind::IfConfig {
            clauses: vec![
                IfConfigClause {
                    condition: None,
                    elements: vec![AstNode::Decl(k)],
                    is_active: true,
                },
                IfConfigClause {
                    condition: None,
                    elements: vec![AstNode::Decl(z)],
                    is_active: false,
                },
            ],
        },
        Some(b.loc("#if")),
    ));
    b.top_level(config);
    let file = b.file_id();
    (b.finish(), WalkRoot::File(file), config, k, z)
}

#[test]
fn inactive_regions_are_skipped_by_default() {
    let (ast, root, config, k, _) = if_config_tree();
    let report = collect(&ast, root);
    assert_eq!(begun(&report.events), vec![config, k]);
    assert!(report
        .events
        .iter()
        .any(|e| matches!(e, WalkEvent::VisitDecl { decl, .. } if *decl == config)));
}

#[test]
fn inactive_regions_are_walked_on_request() {
    let (ast, root, config, k, z) = if_config_tree();
    let report = collect_with(
        &ast,
        root,
        CollectorOptions {
            walk_inactive_regions: true,
            ..CollectorOptions::default()
        },
    );
    assert_eq!(begun(&report.events), vec![config, k, z]);
    assert!(!report
        .events
        .iter()
        .any(|e| matches!(e, WalkEvent::VisitDecl { decl, .. } if *decl == config)));
    assert_balanced(&report);
}

#[test]
fn generic_parameters_can_be_left_out() {
    let mut b = AstBuilder::new("main.swift", "func id<T>() {}\n");
    let t = b.decl(Decl::new(
        DeclKind::GenericTypeParam {
            name: "T".to_string(),
            inherited: vec![],
        },
        Some(b.loc("T")),
    ));
    let func = b.decl(Decl::new(
        DeclKind::Func(FuncDecl {
            name: "id".to_string(),
            generic_params: vec![t],
            params: vec![],
            result: None,
            body: None,
            is_method: false,
        }),
        Some(b.loc("id")),
    ));
    let ast = b.finish();

    let with = collect(&ast, WalkRoot::Decl(func));
    assert_eq!(begun(&with.events), vec![func, t]);

    let without = collect_with(
        &ast,
        WalkRoot::Decl(func),
        CollectorOptions {
            walk_generic_params: false,
            ..CollectorOptions::default()
        },
    );
    assert_eq!(begun(&without.events), vec![func]);
}

#[test]
fn serialized_internals_are_not_walked() {
    let mut b = AstBuilder::new("main.swift", "func hidden() {}\npublic func shown() {}\n");
    let hidden = b.func("hidden", b.loc("hidden"), vec![], None);
    let shown = b.func("shown", b.loc("shown"), vec![], None);
    b.ast_mut().decl_mut(shown).access = AccessLevel::Public;
    let module = b.module_id();
    let serialized = b.ast_mut().add_file(SourceFile {
        name: "Lib.swiftmodule".to_string(),
        kind: FileKind::Serialized,
        module,
        decls: vec![hidden, shown],
    });
    let ast = b.finish();

    let report = collect(&ast, WalkRoot::File(serialized));
    assert_eq!(begun(&report.events), vec![shown]);
}
