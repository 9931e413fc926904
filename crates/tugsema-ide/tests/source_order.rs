//! Source order, access kinds and occurrence ranges.

mod support;

use tugsema_ast::{
    Argument, ArgumentList, AstBuilder, AstContext, AstNode, CharSourceRange, Decl, DeclId,
    DeclKind, Expr, ExprKind, FileId, Fixity,
};
use tugsema_ide::{
    AccessKind, DeclReference, ReferenceKind, SourceEntityWalker, WalkEvent, WalkReport,
    WalkRoot,
};

use support::{collect, decl_references, reference_texts, text};

fn subscript_decl(b: &mut AstBuilder) -> DeclId {
    b.decl(Decl::new(
        DeclKind::Subscript {
            generic_params: vec![],
            params: vec![],
            element_type: None,
            accessors: vec![],
        },
        None,
    ))
}

/// `arr[i]` at top level.
fn subscript_tree() -> (AstContext, FileId, DeclId) {
    let mut b = AstBuilder::new("main.swift", "var arr = 0\nvar i = 0\narr[i]\n");
    let arr = b.var("arr", b.loc("arr"));
    let i = b.var("i", b.loc("i"));
    let subscript = subscript_decl(&mut b);
    let arr_use = b.decl_ref(arr, b.loc_nth("arr", 1));
    let i_use = b.decl_ref(i, b.loc_nth("i", 1));
    let access = b.expr(Expr::new(
        ExprKind::Subscript {
            base: arr_use,
            args: ArgumentList::new(vec![Argument::unlabeled(i_use)]),
            decl: Some(subscript),
        },
        Some(b.loc("[")),
        Some(b.range(b.loc_nth("arr", 1), b.loc("]"))),
    ));
    b.top_level_code(vec![AstNode::Expr(access)]);
    let file = b.file_id();
    (b.finish(), file, subscript)
}

fn described(ast: &AstContext, refs: &[DeclReference]) -> Vec<(String, ReferenceKind, Option<AccessKind>)> {
    refs.iter()
        .map(|r| (text(ast, r.range), r.data.kind, r.data.access))
        .collect()
}

#[test]
fn member_assignment_reports_base_then_member_then_source() {
    let mut b = AstBuilder::new("main.swift", "var p = 0\nvar q = 0\np.m = q\n");
    let p = b.var("p", b.loc("p"));
    let q = b.var("q", b.loc("q"));
    let m = b.var("m", b.loc("m"));
    let p_use = b.decl_ref(p, b.loc_nth("p", 1));
    let member = b.member_ref(p_use, m, b.loc("m"));
    let q_use = b.decl_ref(q, b.loc_nth("q", 1));
    let rvalue = b.load(q_use);
    let assign = b.assign(member, rvalue, b.loc_nth("=", 2));
    b.top_level_code(vec![AstNode::Expr(assign)]);
    let file = b.file_id();
    let ast = b.finish();

    let report = collect(&ast, WalkRoot::File(file));
    assert!(report.completed);
    assert_eq!(
        described(&ast, &decl_references(&report)),
        vec![
            ("p".to_string(), ReferenceKind::DeclRef, Some(AccessKind::ReadWrite)),
            ("m".to_string(), ReferenceKind::DeclMemberRef, Some(AccessKind::Write)),
            ("q".to_string(), ReferenceKind::DeclRef, Some(AccessKind::Read)),
        ]
    );
}

#[test]
fn plain_assignment_writes_destination_and_reads_source() {
    let mut b = AstBuilder::new("main.swift", "var p = 0\nvar q = 0\np = q\n");
    let p = b.var("p", b.loc("p"));
    let q = b.var("q", b.loc("q"));
    let p_use = b.decl_ref(p, b.loc_nth("p", 1));
    let q_use = b.decl_ref(q, b.loc_nth("q", 1));
    let rvalue = b.load(q_use);
    let assign = b.assign(p_use, rvalue, b.loc_nth("=", 2));
    let ast = b.finish();

    let report = collect(&ast, WalkRoot::Expr(assign));
    assert_eq!(
        described(&ast, &decl_references(&report)),
        vec![
            ("p".to_string(), ReferenceKind::DeclRef, Some(AccessKind::Write)),
            ("q".to_string(), ReferenceKind::DeclRef, Some(AccessKind::Read)),
        ]
    );
}

#[test]
fn inout_argument_is_read_write() {
    let mut b = AstBuilder::new("main.swift", "var p = 0\nbump(&p)\n");
    let p = b.var("p", b.loc("p"));
    let bump = b.func("bump", b.loc("bump"), vec![], None);
    let callee = b.decl_ref(bump, b.loc("bump"));
    // The second "p" is inside "bump".
    let p_use = b.decl_ref(p, b.loc_nth("p", 2));
    let inout = b.expr(Expr::new(
        ExprKind::InOut { sub: p_use },
        Some(b.loc("&")),
        Some(b.range(b.loc("&"), b.loc_nth("p", 2))),
    ));
    let arg = b.arg(None, inout);
    let call = b.call(callee, vec![arg], b.loc(")"));
    let ast = b.finish();

    let report = collect(&ast, WalkRoot::Expr(call));
    assert_eq!(
        described(&ast, &decl_references(&report)),
        vec![
            ("bump".to_string(), ReferenceKind::DeclRef, None),
            ("p".to_string(), ReferenceKind::DeclRef, Some(AccessKind::ReadWrite)),
        ]
    );
}

#[test]
fn binary_operands_surround_the_operator() {
    let mut b = AstBuilder::new("main.swift", "var p = 0\nvar q = 0\np + q\n");
    let p = b.var("p", b.loc("p"));
    let q = b.var("q", b.loc("q"));
    let plus = b.func("+", b.loc("+"), vec![], None);
    let lhs = b.decl_ref(p, b.loc_nth("p", 1));
    let rhs = b.decl_ref(q, b.loc_nth("q", 1));
    let sum = b.binary(lhs, plus, b.loc("+"), rhs);
    let ast = b.finish();

    let report = collect(&ast, WalkRoot::Expr(sum));
    assert_eq!(reference_texts(&ast, &report), vec!["p", "+", "q"]);

    let visited: Vec<_> = report
        .events
        .iter()
        .filter_map(|e| match e {
            WalkEvent::VisitExpr { expr } => Some(*expr),
            _ => None,
        })
        .collect();
    let ExprKind::Binary { op, .. } = ast.expr(sum).kind else {
        unreachable!()
    };
    assert_eq!(visited, vec![sum, lhs, op, rhs]);
}

#[test]
fn subscript_brackets_pair_around_the_arguments() {
    let (ast, file, subscript) = subscript_tree();
    let report = collect(&ast, WalkRoot::File(file));

    assert_eq!(reference_texts(&ast, &report), vec!["arr", "[", "i", "]"]);
    let brackets: Vec<_> = report
        .events
        .iter()
        .filter_map(|e| match e {
            WalkEvent::SubscriptReference {
                decl,
                is_open_bracket,
                data,
                ..
            } => Some((*decl, *is_open_bracket, data.kind)),
            _ => None,
        })
        .collect();
    assert_eq!(
        brackets,
        vec![
            (subscript, true, ReferenceKind::SubscriptRef),
            (subscript, false, ReferenceKind::SubscriptRef),
        ]
    );
}

#[derive(Default)]
struct PlainReferences(Vec<CharSourceRange>);

impl SourceEntityWalker for PlainReferences {
    fn visit_decl_reference(&mut self, reference: &DeclReference) -> bool {
        self.0.extend(reference.range);
        true
    }
}

#[test]
fn default_subscript_hook_reports_only_the_open_bracket() {
    let (ast, file, _) = subscript_tree();
    let mut walker = PlainReferences::default();
    assert!(walker.walk(&ast, WalkRoot::File(file)));

    let texts: Vec<_> = walker
        .0
        .iter()
        .map(|r| text(&ast, Some(*r)))
        .collect();
    assert_eq!(texts, vec!["arr", "[", "i"]);
}

#[test]
fn backticked_names_cover_the_backticks() {
    let mut b = AstBuilder::new("main.swift", "var `default` = 0\n`default`\n");
    let var = b.var("default", b.loc("`default`"));
    b.top_level(var);
    let use_var = b.decl_ref(var, b.loc_nth("`default`", 1));
    b.top_level_code(vec![AstNode::Expr(use_var)]);
    let file = b.file_id();
    let ast = b.finish();

    let report = collect(&ast, WalkRoot::File(file));
    let name_range = report.events.iter().find_map(|e| match e {
        WalkEvent::VisitDecl { decl, name_range } if *decl == var => Some(*name_range),
        _ => None,
    });
    assert_eq!(text(&ast, name_range.flatten()), "`default`");
    assert_eq!(reference_texts(&ast, &report), vec!["`default`"]);
}

/// Text of the name range reported by `visit_decl` for `decl`.
fn decl_name_text(ast: &AstContext, report: &WalkReport, decl: DeclId) -> String {
    let name_range = report.events.iter().find_map(|e| match e {
        WalkEvent::VisitDecl { decl: d, name_range } if *d == decl => *name_range,
        _ => None,
    });
    text(ast, name_range)
}

#[test]
fn discarded_binder_name_is_the_underscore() {
    let mut b = AstBuilder::new("main.swift", "var _ = 0\n");
    let discarded = b.var("", b.loc("_"));
    let ast = b.finish();

    let report = collect(&ast, WalkRoot::Decl(discarded));
    assert_eq!(decl_name_text(&ast, &report, discarded), "_");
}

#[test]
fn operator_and_precedence_group_names_cover_their_tokens() {
    let mut b = AstBuilder::new("main.swift", "infix operator <>\nprecedencegroup Ranking {}\n");
    let op = b.decl(Decl::new(
        DeclKind::Operator {
            name: "<>".to_string(),
            fixity: Fixity::Infix,
        },
        Some(b.loc("<>")),
    ));
    let group = b.decl(Decl::new(
        DeclKind::PrecedenceGroup {
            name: "Ranking".to_string(),
        },
        Some(b.loc("Ranking")),
    ));
    b.top_level(op);
    b.top_level(group);
    let file = b.file_id();
    let ast = b.finish();

    let report = collect(&ast, WalkRoot::File(file));
    assert_eq!(decl_name_text(&ast, &report, op), "<>");
    assert_eq!(decl_name_text(&ast, &report, group), "Ranking");
    assert!(report.references().next().is_none());
}

#[test]
fn walking_twice_yields_identical_events() {
    let (ast, file, _) = subscript_tree();
    let first = collect(&ast, WalkRoot::File(file));
    let second = collect(&ast, WalkRoot::File(file));
    assert_eq!(first, second);
    assert!(!first.events.is_empty());
}
