//! Reference enrichment: constructors, extensions, imports, labels and
//! synthesized call sugar.

mod support;

use tugsema_ast::{
    AstBuilder, AstNode, CharSourceRange, CollectionKind, Decl, DeclKind, Expr, ExprKind,
    FuncDecl, ImportPathElement, LiteralKind, ModuleKind, NominalKind, PrimaryAssociatedType,
    SourceRange,
};
use tugsema_ide::{
    DeclReference, ReferenceKind, ReferenceMetaData, WalkEvent, WalkRoot,
};

use support::{collect, decl_references, reference_texts, text};

#[test]
fn construction_reports_the_initializer_at_the_type_name() {
    let mut b = AstBuilder::new("main.swift", "struct Foo { init(x: Int) {} }\nFoo(x: 1)\n");
    let param = b.param(Some(("x", b.loc("x"))), "x", b.loc("x"), None);
    let init = b.constructor(b.loc("init"), vec![param], None);
    let foo = b.nominal(NominalKind::Struct, "Foo", b.loc("Foo"), vec![init]);

    let foo_use = b.loc_nth("Foo", 1);
    let ctor_fn = b.expr(
        Expr::new(
            ExprKind::DeclRef {
                decl: init,
                name_loc: Some(foo_use),
            },
            Some(foo_use),
            Some(SourceRange::point(foo_use)),
        )
        .implicit(),
    );
    let repr = b.ident_type("Foo", foo_use, Some(foo));
    let type_expr = b.expr(Expr::new(
        ExprKind::Type { repr: Some(repr) },
        Some(foo_use),
        Some(SourceRange::point(foo_use)),
    ));
    let ctor_call = b.expr(Expr::new(
        ExprKind::ConstructorRefCall {
            func: ctor_fn,
            base: type_expr,
        },
        Some(foo_use),
        Some(SourceRange::point(foo_use)),
    ));
    let one = b.expr(Expr::new(
        ExprKind::Literal {
            kind: LiteralKind::Integer,
            initializer: None,
        },
        Some(b.loc("1")),
        Some(SourceRange::point(b.loc("1"))),
    ));
    let arg = b.arg(Some(("x", b.loc_nth("x", 1))), one);
    let call = b.call(ctor_call, vec![arg], b.loc_nth(")", 1));
    let ast = b.finish();

    let report = collect(&ast, WalkRoot::Expr(call));
    let refs = decl_references(&report);
    assert_eq!(refs.len(), 1, "the type name is reported once");
    assert_eq!(refs[0].decl, init);
    assert_eq!(refs[0].ctor_type, Some(foo));
    assert_eq!(refs[0].data.kind, ReferenceKind::TypeRef);
    assert_eq!(text(&ast, refs[0].range), "Foo");

    let labels: Vec<_> = report
        .events
        .iter()
        .filter_map(|e| match e {
            WalkEvent::CallArgName {
                name,
                range,
                callee,
            } => Some((name.as_str(), text(&ast, Some(*range)), *callee)),
            _ => None,
        })
        .collect();
    assert_eq!(labels, vec![("x", "x".to_string(), init)]);
}

#[test]
fn extended_type_carries_its_extension() {
    let mut b = AstBuilder::new(
        "main.swift",
        "protocol P {}\nstruct Foo {}\nextension Foo: P {}\n",
    );
    let proto = b.decl(Decl::new(
        DeclKind::Protocol {
            name: "P".to_string(),
            primary_associated_types: vec![],
            inherited: vec![],
            members: vec![],
        },
        Some(b.loc("P")),
    ));
    let foo = b.nominal(NominalKind::Struct, "Foo", b.loc("Foo"), vec![]);
    let extended = b.ident_type("Foo", b.loc_nth("Foo", 1), Some(foo));
    let conformance = b.ident_type("P", b.loc_nth("P", 1), Some(proto));
    let ext = b.decl(Decl::new(
        DeclKind::Extension {
            extended_type: Some(extended),
            inherited: vec![conformance],
            members: vec![],
        },
        Some(b.loc("extension")),
    ));
    b.top_level(ext);
    let file = b.file_id();
    let ast = b.finish();

    let report = collect(&ast, WalkRoot::File(file));
    let name_range = report.events.iter().find_map(|e| match e {
        WalkEvent::VisitDecl { decl, name_range } if *decl == ext => *name_range,
        _ => None,
    });
    assert_eq!(text(&ast, name_range), "Foo");

    let refs = decl_references(&report);
    assert_eq!(refs.len(), 2);
    assert_eq!((refs[0].decl, refs[0].extension), (foo, Some(ext)));
    assert_eq!((refs[1].decl, refs[1].extension), (proto, None));
    assert!(refs.iter().all(|r| r.data.kind == ReferenceKind::TypeRef));
}

#[test]
fn implicit_call_as_function_is_reported_separately() {
    let mut b = AstBuilder::new("main.swift", "var p = 0\np()\n");
    let p = b.var("p", b.loc("p"));
    let method = b.decl(Decl::new(
        DeclKind::Func(FuncDecl {
            name: "callAsFunction".to_string(),
            generic_params: vec![],
            params: vec![],
            result: None,
            body: None,
            is_method: true,
        }),
        None,
    ));
    let p_loc = b.loc_nth("p", 1);
    let p_use = b.decl_ref(p, p_loc);
    let method_ref = b.expr(
        Expr::new(
            ExprKind::DeclRef {
                decl: method,
                name_loc: None,
            },
            Some(p_loc),
            None,
        )
        .implicit(),
    );
    let applied = b.expr(Expr::new(
        ExprKind::DotSyntaxCall {
            func: method_ref,
            base: p_use,
        },
        Some(p_loc),
        Some(SourceRange::point(p_loc)),
    ));
    let call = b.call(applied, vec![], b.loc(")"));
    let ast = b.finish();

    let report = collect(&ast, WalkRoot::Expr(call));
    let events: Vec<_> = report.references().cloned().collect();
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], WalkEvent::Reference(r) if r.decl == p));
    assert_eq!(
        events[1],
        WalkEvent::CallAsFunctionReference {
            decl: method,
            range: Some(CharSourceRange::new(p_loc, 1)),
            data: ReferenceMetaData::new(ReferenceKind::DeclMemberRef, None),
        }
    );
}

#[test]
fn literal_reports_its_implicit_initializer() {
    let mut b = AstBuilder::new("main.swift", "let s = \"hi\"\n");
    let init = b.decl(Decl::new(
        DeclKind::Constructor {
            generic_params: vec![],
            params: vec![],
            body: None,
        },
        None,
    ));
    let ty = b.ty("Name");
    let lit_loc = b.loc("\"hi\"");
    let literal = b.expr(
        Expr::new(
            ExprKind::Literal {
                kind: LiteralKind::String,
                initializer: Some(init),
            },
            Some(lit_loc),
            Some(SourceRange::point(lit_loc)),
        )
        .with_type(ty),
    );
    let ast = b.finish();

    let report = collect(&ast, WalkRoot::Expr(literal));
    let refs = decl_references(&report);
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].decl, init);
    assert_eq!(refs[0].ty, Some(ty));
    assert!(refs[0].data.is_implicit);
    assert_eq!(text(&ast, refs[0].range), "\"hi\"");
}

#[test]
fn collection_literal_reports_its_implicit_initializer() {
    let mut b = AstBuilder::new("main.swift", "let a = [1]\n");
    let init = b.decl(Decl::new(
        DeclKind::Constructor {
            generic_params: vec![],
            params: vec![],
            body: None,
        },
        None,
    ));
    let ty = b.ty("Array");
    let one_loc = b.loc("1");
    let one = b.expr(Expr::new(
        ExprKind::Literal {
            kind: LiteralKind::Integer,
            initializer: None,
        },
        Some(one_loc),
        Some(SourceRange::point(one_loc)),
    ));
    let open = b.loc("[");
    let array = b.expr(
        Expr::new(
            ExprKind::Collection {
                kind: CollectionKind::Array,
                elements: vec![one],
                initializer: Some(init),
            },
            Some(open),
            Some(b.range(open, b.loc("]"))),
        )
        .with_type(ty),
    );
    let ast = b.finish();

    let report = collect(&ast, WalkRoot::Expr(array));
    let refs = decl_references(&report);
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].decl, init);
    assert_eq!(refs[0].ty, Some(ty));
    assert!(refs[0].data.is_implicit);
    assert_eq!(text(&ast, refs[0].range), "[1]");
    // The element is still walked after the initializer reference.
    assert!(report.events.contains(&WalkEvent::VisitExpr { expr: one }));
}

#[test]
fn imports_report_module_paths() {
    let mut b = AstBuilder::new(
        "main.swift",
        "import Outer.Inner\nimport Solo\nimport struct Lib.Thing\n",
    );
    let outer = b.module("Outer", ModuleKind::Foreign { parent: None });
    let inner = b.module(
        "Inner",
        ModuleKind::Foreign {
            parent: Some(outer),
        },
    );
    let solo = b.module("Solo", ModuleKind::Native);
    let lib = b.module("Lib", ModuleKind::Native);
    let thing = b.nominal(NominalKind::Struct, "Thing", b.loc("Thing"), vec![]);

    let element = |b: &AstBuilder, name: &str| ImportPathElement {
        name: name.to_string(),
        loc: Some(b.loc(name)),
    };
    let submodule_path = vec![element(&b, "Outer"), element(&b, "Inner")];
    let solo_path = vec![element(&b, "Solo")];
    let scoped_path = vec![element(&b, "Lib"), element(&b, "Thing")];

    let imports = [
        (submodule_path, inner, vec![], b.loc("Inner"), 0),
        (solo_path, solo, vec![], b.loc("Solo"), 1),
        (scoped_path, lib, vec![thing], b.loc("Thing"), 2),
    ];
    for (path, module, decls, end_loc, nth) in imports {
        let import = b.decl(Decl::new(
            DeclKind::Import {
                path,
                module: Some(module),
                decls,
                end_loc: Some(end_loc),
            },
            Some(b.loc_nth("import", nth)),
        ));
        b.top_level(import);
    }
    let file = b.file_id();
    let ast = b.finish();

    let report = collect(&ast, WalkRoot::File(file));
    assert_eq!(
        reference_texts(&ast, &report),
        vec!["Outer", "Inner", "Solo", "Lib", "Thing"]
    );
    let modules: Vec<_> = report
        .events
        .iter()
        .filter_map(|e| match e {
            WalkEvent::ModuleReference { module, .. } => Some(*module),
            _ => None,
        })
        .collect();
    assert_eq!(modules, vec![outer, inner, solo, lib]);
    assert_eq!(decl_references(&report)[0].decl, thing);
}

#[test]
fn protocol_header_reports_primary_associated_types() {
    let mut b = AstBuilder::new("main.swift", "protocol Box<Item> { associatedtype Item }\n");
    let assoc_loc = b.loc_nth("Item", 1);
    let primary_loc = b.loc("Item");
    let box_loc = b.loc("Box");
    let assoc = b.decl(Decl::new(
        DeclKind::AssociatedType {
            name: "Item".to_string(),
            inherited: vec![],
            default_type: None,
        },
        Some(assoc_loc),
    ));
    let proto = b.decl(Decl::new(
        DeclKind::Protocol {
            name: "Box".to_string(),
            primary_associated_types: vec![PrimaryAssociatedType {
                name: "Item".to_string(),
                loc: primary_loc,
            }],
            inherited: vec![],
            members: vec![assoc],
        },
        Some(box_loc),
    ));
    b.top_level(proto);
    let file = b.file_id();
    let ast = b.finish();

    let report = collect(&ast, WalkRoot::File(file));
    assert_eq!(
        report.events,
        vec![
            WalkEvent::BeginDecl { decl: proto },
            WalkEvent::Reference(DeclReference {
                decl: assoc,
                range: Some(CharSourceRange::new(primary_loc, 4)),
                ctor_type: None,
                extension: None,
                ty: None,
                data: ReferenceMetaData::new(ReferenceKind::TypeRef, None),
            }),
            WalkEvent::VisitDecl {
                decl: proto,
                name_range: Some(CharSourceRange::new(box_loc, 3)),
            },
            WalkEvent::BeginDecl { decl: assoc },
            WalkEvent::VisitDecl {
                decl: assoc,
                name_range: Some(CharSourceRange::new(assoc_loc, 4)),
            },
            WalkEvent::LeaveDecl { decl: assoc },
            WalkEvent::EndDecl { decl: assoc },
            WalkEvent::LeaveDecl { decl: proto },
            WalkEvent::EndDecl { decl: proto },
        ]
    );
}

#[test]
fn parameter_labels_precede_the_declaration() {
    let mut b = AstBuilder::new("main.swift", "func move(to dest: Int) {}\n");
    let int = b.nominal(NominalKind::Struct, "Int", b.loc("Int"), vec![]);
    let int_repr = b.ident_type("Int", b.loc("Int"), Some(int));
    let param = b.param(Some(("to", b.loc("to"))), "dest", b.loc("dest"), Some(int_repr));
    let func = b.func("move", b.loc("move"), vec![param], None);
    b.top_level(func);
    let (to_loc, move_loc, dest_loc, int_loc) =
        (b.loc("to"), b.loc("move"), b.loc("dest"), b.loc("Int"));
    let file = b.file_id();
    let ast = b.finish();

    let report = collect(&ast, WalkRoot::File(file));
    assert_eq!(
        report.events,
        vec![
            WalkEvent::BeginDecl { decl: func },
            WalkEvent::DeclarationArgumentName {
                name: Some("to".to_string()),
                loc: to_loc,
                decl: func,
            },
            WalkEvent::VisitDecl {
                decl: func,
                name_range: Some(CharSourceRange::new(move_loc, 4)),
            },
            WalkEvent::BeginDecl { decl: param },
            WalkEvent::VisitDecl {
                decl: param,
                name_range: Some(CharSourceRange::new(dest_loc, 4)),
            },
            WalkEvent::VisitTypeRepr { repr: int_repr },
            WalkEvent::Reference(DeclReference {
                decl: int,
                range: Some(CharSourceRange::new(int_loc, 3)),
                ctor_type: None,
                extension: None,
                ty: None,
                data: ReferenceMetaData::new(ReferenceKind::TypeRef, None),
            }),
            WalkEvent::LeaveTypeRepr { repr: int_repr },
            WalkEvent::LeaveDecl { decl: param },
            WalkEvent::EndDecl { decl: param },
            WalkEvent::LeaveDecl { decl: func },
            WalkEvent::EndDecl { decl: func },
        ]
    );
}

#[test]
fn module_values_and_module_types_report_modules() {
    let mut b = AstBuilder::new("main.swift", "Swift.print\nlet t: Swift.Int\n");
    let swift = b.module("Swift", ModuleKind::Native);
    let swift_decl = b.decl(Decl::new(DeclKind::Module { module: swift }, None));
    let value = b.decl_ref(swift_decl, b.loc("Swift"));
    let repr = b.ident_type("Swift", b.loc_nth("Swift", 1), Some(swift_decl));
    let type_expr = b.expr(Expr::new(ExprKind::Type { repr: Some(repr) }, None, None));
    b.top_level_code(vec![AstNode::Expr(value), AstNode::Expr(type_expr)]);
    let file = b.file_id();
    let ast = b.finish();

    let report = collect(&ast, WalkRoot::File(file));
    let modules: Vec<_> = report
        .references()
        .map(|e| match e {
            WalkEvent::ModuleReference { module, range } => (*module, text(&ast, Some(*range))),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(
        modules,
        vec![(swift, "Swift".to_string()), (swift, "Swift".to_string())]
    );
}

#[test]
fn constructor_delegation_and_dynamic_members_have_their_own_kinds() {
    let mut b = AstBuilder::new("main.swift", "self.init()\nvar p = 0\np.dyn\n");
    let init = b.constructor(b.loc("init"), vec![], None);
    let delegation = b.expr(Expr::new(
        ExprKind::OtherConstructorRef {
            decl: init,
            ctor_loc: Some(b.loc("init")),
        },
        Some(b.loc("init")),
        None,
    ));
    let p = b.var("p", b.loc("p"));
    let dynamic = b.var("dyn", b.loc("dyn"));
    let p_use = b.decl_ref(p, b.loc_nth("p", 1));
    let member = b.expr(Expr::new(
        ExprKind::DynamicMemberRef {
            base: p_use,
            member: dynamic,
            name_loc: Some(b.loc("dyn")),
        },
        Some(b.loc("dyn")),
        None,
    ));
    b.top_level_code(vec![AstNode::Expr(delegation), AstNode::Expr(member)]);
    let file = b.file_id();
    let ast = b.finish();

    let report = collect(&ast, WalkRoot::File(file));
    let kinds: Vec<_> = decl_references(&report)
        .iter()
        .map(|r| (text(&ast, r.range), r.data.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("init".to_string(), ReferenceKind::DeclConstructorRef),
            ("p".to_string(), ReferenceKind::DeclRef),
            ("dyn".to_string(), ReferenceKind::DynamicMemberRef),
        ]
    );
}
