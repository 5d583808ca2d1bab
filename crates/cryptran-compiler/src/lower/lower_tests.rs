use cryptran_core::Type;
use serde_json::{Value, json};

use super::{Lowered, lower};
use crate::analyze::ProgramIndex;
use crate::diagnostics::DiagnosticKind;
use crate::target::{self as t, BinOp, Builtin, ExprKind, Item, MethodKind, Target, Unit, unresolved};
use crate::test_utils::*;

fn lower_for(target: Target, body: Vec<Value>) -> Lowered {
    let program = program(body);
    let index = ProgramIndex::build(&program);
    lower(&program, &index, target, None)
}

fn function<'u>(unit: &'u Unit, name: &str) -> &'u t::Function {
    unit.items
        .iter()
        .find_map(|item| match item {
            Item::Function(f) if f.name == name => Some(f),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no function {name} in {:#?}", unit.items))
}

fn class<'u>(unit: &'u Unit, name: &str) -> &'u t::Class {
    unit.classes()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("no class {name}"))
}

fn method_of<'c>(class: &'c t::Class, name: &str) -> &'c t::Method {
    class
        .methods
        .iter()
        .find(|m| m.name == name)
        .unwrap_or_else(|| panic!("no method {name} in {}", class.name))
}

fn returned(stmt: &t::Stmt) -> &t::TExpr {
    match stmt {
        t::Stmt::Return(Some(value)) => value,
        other => panic!("expected a return, got {other:?}"),
    }
}

fn builtin_op(stmt: &t::Stmt) -> Option<Builtin> {
    match stmt {
        t::Stmt::Expr(t::TExpr {
            kind: ExprKind::Builtin { op, .. },
            ..
        }) => Some(*op),
        _ => None,
    }
}

#[test]
fn reserved_word_parameter_is_suffixed() {
    let f = with_doc(
        func_decl("f", &["delete"], vec![ret(Some(ident("delete")))]),
        "* @param {uint32} delete",
    );

    let cpp = lower_for(Target::Cpp, vec![f.clone()]);
    let lowered = function(&cpp.unit, "f");
    assert_eq!(lowered.params[0].name, "delete_");
    assert_eq!(returned(&lowered.body[0]), &t::TExpr::ident("delete_", Type::u32()));

    let pascal = lower_for(Target::Pascal, vec![f]);
    assert_eq!(function(&pascal.unit, "F").params[0].name, "Delete_");
    assert_eq!(pascal.diagnostics.count_of(DiagnosticKind::IdentifierRenamed), 0);
}

#[test]
fn rotate_left_is_written_as_shifts() {
    let f = with_doc(
        func_decl(
            "rot",
            &["x"],
            vec![ret(Some(method_call(ident("OpCodes"), "RotL32", vec![ident("x"), num(8)])))],
        ),
        "* @param {uint32} x\n * @returns {uint32}",
    );
    let lowered = lower_for(Target::Cpp, vec![f]);
    let value = returned(&function(&lowered.unit, "rot").body[0]);

    let ExprKind::Binary {
        op: BinOp::BitOr,
        left,
        right,
    } = &value.kind
    else {
        panic!("expected an or of two shifts, got {value:?}");
    };
    assert!(matches!(&left.kind, ExprKind::Binary { op: BinOp::Shl, right, .. } if right.int_value() == Some(8)));
    assert!(matches!(&right.kind, ExprKind::Binary { op: BinOp::Shr, right, .. } if right.int_value() == Some(24)));
    assert_eq!(value.ty, Type::u32());
}

#[test]
fn push_of_several_values_appends_each() {
    let f = with_doc(
        func_decl(
            "emit",
            &["out"],
            vec![expr_stmt(method_call(ident("out"), "push", vec![num(1), num(2)]))],
        ),
        "* @param {uint8[]} out",
    );
    let lowered = lower_for(Target::Cpp, vec![f]);
    let body = &function(&lowered.unit, "emit").body;

    assert_eq!(body.len(), 2);
    assert!(body.iter().all(|s| builtin_op(s) == Some(Builtin::Append)));
    let t::Stmt::Expr(t::TExpr {
        kind: ExprKind::Builtin { args, .. },
        ..
    }) = &body[1]
    else {
        unreachable!();
    };
    assert_eq!(args[1].ty, Type::u8());
}

#[test]
fn exchange_through_array_literal_is_a_swap() {
    let f = with_doc(
        func_decl(
            "exchange",
            &["a", "b"],
            vec![expr_stmt(assign(
                "=",
                array_pattern(&["a", "b"]),
                array(vec![ident("b"), ident("a")]),
            ))],
        ),
        "* @param {uint32} a\n * @param {uint32} b",
    );
    let lowered = lower_for(Target::Cpp, vec![f]);
    let body = &function(&lowered.unit, "exchange").body;

    assert_eq!(body.len(), 1);
    assert_eq!(builtin_op(&body[0]), Some(Builtin::Swap));
}

#[test]
fn array_destructuring_reads_through_a_temporary() {
    let f = func_decl(
        "split",
        &[],
        vec![
            declare(
                "const",
                array_pattern(&["hi", "lo"]),
                Some(call(ident("halves"), vec![])),
            ),
            ret(Some(ident("hi"))),
        ],
    );
    let halves = with_doc(
        func_decl("halves", &[], vec![ret(Some(array(vec![num(1), num(2)])))]),
        "* @returns {uint16[]}",
    );
    let lowered = lower_for(Target::Cpp, vec![halves, f]);
    let body = &function(&lowered.unit, "split").body;

    assert!(matches!(&body[0], t::Stmt::VarDecl { ty, .. } if *ty == Type::seq(Type::u16())));
    assert!(matches!(&body[1], t::Stmt::VarDecl { name, ty, .. } if name == "hi" && *ty == Type::u16()));
    assert!(matches!(&body[2], t::Stmt::VarDecl { name, .. } if name == "lo"));
}

#[test]
fn switch_groups_empty_cases_and_drops_breaks() {
    let switch = json!({
        "type": "SwitchStatement",
        "discriminant": ident("x"),
        "cases": [
            { "type": "SwitchCase", "test": num(1), "consequent": [] },
            { "type": "SwitchCase", "test": num(2), "consequent": [ret(Some(num(1)))] },
            {
                "type": "SwitchCase",
                "test": num(3),
                "consequent": [expr_stmt(update("++", ident("x"), false)), { "type": "BreakStatement" }]
            },
            { "type": "SwitchCase", "test": null, "consequent": [ret(Some(num(0)))] }
        ]
    });
    let f = with_doc(
        func_decl("pick", &["x"], vec![switch, ret(Some(ident("x")))]),
        "* @param {uint32} x\n * @returns {uint32}",
    );
    let lowered = lower_for(Target::Cpp, vec![f]);
    let body = &function(&lowered.unit, "pick").body;

    let t::Stmt::Switch { cases, default, .. } = &body[0] else {
        panic!("expected a switch, got {:?}", body[0]);
    };
    assert_eq!(cases.len(), 2);
    assert_eq!(cases[0].labels.len(), 2);
    assert_eq!(cases[1].body.len(), 1);
    assert!(!cases[1].body.iter().any(|s| matches!(s, t::Stmt::Break)));
    assert!(default.is_some());
    assert_eq!(lowered.diagnostics.count_of(DiagnosticKind::UnsupportedConstruct), 0);
}

#[test]
fn for_of_over_bytes_binds_bytes() {
    let each = json!({
        "type": "ForOfStatement",
        "left": declare("const", ident("b"), None),
        "right": ident("data"),
        "body": block(vec![expr_stmt(assign("^=", ident("sum"), ident("b")))])
    });
    let f = with_doc(
        func_decl(
            "checksum",
            &["data"],
            vec![var("let", "sum", Some(num(0))), each, ret(Some(ident("sum")))],
        ),
        "* @param {uint8[]} data",
    );
    let lowered = lower_for(Target::Cpp, vec![f]);
    let body = &function(&lowered.unit, "checksum").body;

    assert!(matches!(&body[1], t::Stmt::ForEach { var, ty, .. } if var == "b" && *ty == Type::u8()));
}

#[test]
fn counting_down_uses_a_signed_counter() {
    let f = with_doc(
        func_decl(
            "down",
            &["n"],
            vec![for_stmt(
                var("let", "i", Some(bin("-", ident("n"), num(1)))),
                bin(">=", ident("i"), num(0)),
                update("--", ident("i"), false),
                vec![],
            )],
        ),
        "* @param {uint32} n",
    );
    let lowered = lower_for(Target::Cpp, vec![f]);
    let body = &function(&lowered.unit, "down").body;

    let t::Stmt::For { init: Some(init), .. } = &body[0] else {
        panic!("expected a for loop, got {:?}", body[0]);
    };
    assert!(matches!(init.as_ref(), t::Stmt::VarDecl { ty, .. } if *ty == Type::i32()));
}

#[test]
fn thrown_errors_carry_their_message() {
    let f = func_decl("fail", &[], vec![throw(new_expr("Error", vec![string("bad key")]))]);
    let lowered = lower_for(Target::Cpp, vec![f]);
    let body = &function(&lowered.unit, "fail").body;

    assert_eq!(body, &[t::Stmt::Throw(t::TExpr::string("bad key"))]);
}

#[test]
fn console_output_is_dropped() {
    let f = func_decl(
        "trace",
        &[],
        vec![expr_stmt(method_call(ident("console"), "log", vec![string("x")]))],
    );
    let lowered = lower_for(Target::Cpp, vec![f]);
    assert!(function(&lowered.unit, "trace").body.is_empty());
}

#[test]
fn pascal_moves_increments_out_of_expressions() {
    let body = vec![
        var("let", "i", Some(num(0))),
        expr_stmt(assign("=", index(ident("buf"), update("++", ident("i"), false)), num(7))),
    ];
    let f = with_doc(func_decl("fill", &["buf"], body), "* @param {uint8[]} buf");

    let pascal = lower_for(Target::Pascal, vec![f.clone()]);
    let split = &function(&pascal.unit, "Fill").body;
    assert_eq!(split.len(), 3);
    assert!(matches!(&split[1], t::Stmt::Expr(e) if matches!(e.kind, ExprKind::Assign { .. })));
    assert!(matches!(&split[2], t::Stmt::Expr(e) if matches!(e.kind, ExprKind::Postfix { .. })));

    let cpp = lower_for(Target::Cpp, vec![f]);
    assert_eq!(function(&cpp.unit, "fill").body.len(), 2);
}

#[test]
fn unknown_statements_become_placeholders() {
    let lowered = lower_for(Target::Cpp, vec![json!({ "type": "LabeledStatement", "label": ident("outer") })]);

    assert!(matches!(&lowered.unit.init[..], [t::Stmt::Placeholder(p)] if p.kind == "LabeledStatement"));
    assert_eq!(lowered.diagnostics.count_of(DiagnosticKind::UnhandledNode), 1);
}

#[test]
fn overrides_take_the_framework_signature() {
    let instance = class_decl(
        "DemoInstance",
        Some("IAlgorithmInstance"),
        vec![
            method("Feed", &["data"], vec![expr_stmt(assign("=", this_member("buffer"), ident("data")))]),
            method("Result", &[], vec![ret(Some(this_member("buffer")))]),
            getter("size", vec![ret(Some(this_member("blockSize")))]),
        ],
    );
    let lowered = lower_for(Target::Cpp, vec![instance]);
    let class = class(&lowered.unit, "DemoInstance");

    assert_eq!(class.base.as_deref(), Some("IAlgorithmInstance"));
    let feed = method_of(class, "Feed");
    assert!(feed.quals.is_override);
    assert!(!feed.quals.is_virtual);
    assert_eq!(feed.params[0].ty, Type::bytes());
    assert_eq!(method_of(class, "Result").ret, Type::bytes());

    let size = method_of(class, "get_size");
    assert_eq!(size.kind, MethodKind::Getter);
    assert!(size.quals.is_const);
}

#[test]
fn override_signature_wins_over_annotations() {
    let instance = class_decl(
        "DemoInstance",
        Some("IAlgorithmInstance"),
        vec![
            with_doc(method("Feed", &["data"], vec![]), "* @param {string} data"),
            with_doc(method("Result", &[], vec![ret(Some(array(vec![])))]), "* @returns {uint32}"),
        ],
    );
    let lowered = lower_for(Target::Cpp, vec![instance]);
    let class = class(&lowered.unit, "DemoInstance");

    let feed = method_of(class, "Feed");
    assert!(feed.quals.is_override);
    assert_eq!(feed.params[0].ty, Type::bytes());
    let result = method_of(class, "Result");
    assert!(result.quals.is_override);
    assert_eq!(result.ret, Type::bytes());
    assert!(!lowered.diagnostics.has_errors());
}

#[test]
fn super_call_becomes_base_arguments() {
    let base = class_decl(
        "Base",
        None,
        vec![constructor(&["rounds"], vec![expr_stmt(assign("=", this_member("rounds"), ident("rounds")))])],
    );
    let derived = class_decl("Derived", Some("Base"), vec![constructor(&[], vec![super_call(vec![num(12)])])]);
    let lowered = lower_for(Target::Cpp, vec![base, derived]);
    let ctor = &class(&lowered.unit, "Derived").methods[0];

    assert_eq!(ctor.kind, MethodKind::Constructor);
    assert_eq!(ctor.super_args.as_ref().map(Vec::len), Some(1));
    assert!(ctor.body.is_empty());
}

#[test]
fn static_constants_assigned_after_the_class() {
    let cipher = class_decl("Cipher", None, vec![]);
    let table = expr_stmt(assign("=", member(ident("Cipher"), "SBOX"), array(vec![num(1), num(2), num(3)])));
    let lowered = lower_for(Target::Cpp, vec![cipher, table]);
    let class = class(&lowered.unit, "Cipher");

    assert_eq!(class.fields.len(), 1);
    let sbox = &class.fields[0];
    assert_eq!(sbox.name, "SBOX");
    assert!(sbox.is_static && sbox.is_const);
    assert!(sbox.init.is_some());
    assert!(lowered.unit.init.is_empty());
}

#[test]
fn members_with_one_spelling_are_numbered() {
    let class = class_decl(
        "Keys",
        None,
        vec![constructor(
            &[],
            vec![
                expr_stmt(assign("=", this_member("keySize"), num(16))),
                expr_stmt(assign("=", this_member("key_size"), num(32))),
            ],
        )],
    );
    let lowered = lower_for(Target::Cpp, vec![class]);
    let names: Vec<&str> = class_fields(&lowered.unit, "Keys");

    assert_eq!(names, ["key_size", "key_size_2"]);
    assert_eq!(lowered.diagnostics.count_of(DiagnosticKind::IdentifierRenamed), 1);
}

fn class_fields<'u>(unit: &'u Unit, name: &str) -> Vec<&'u str> {
    class(unit, name).fields.iter().map(|f| f.name.as_str()).collect()
}

#[test]
fn lowered_programs_carry_no_unknown_types() {
    let f = func_decl(
        "collect",
        &["input"],
        vec![
            var("let", "out", Some(array(vec![]))),
            var("let", "last", Some(null())),
            counted_for(
                "i",
                member(ident("input"), "length"),
                vec![
                    expr_stmt(method_call(ident("out"), "push", vec![index(ident("input"), ident("i"))])),
                    expr_stmt(assign("=", ident("last"), index(ident("input"), ident("i")))),
                ],
            ),
            ret(Some(ident("out"))),
        ],
    );
    let lowered = lower_for(Target::Cpp, vec![f]);

    assert_eq!(unresolved(&lowered.unit), Vec::<String>::new());
}

fn builtin_of(expr: &t::TExpr) -> Option<Builtin> {
    match &expr.kind {
        ExprKind::Builtin { op, .. } => Some(*op),
        _ => None,
    }
}

#[test]
fn dictionary_fallback_tests_presence_first() {
    let f = func_decl(
        "lookup",
        &["registry", "name"],
        vec![ret(Some(logical("||", index(ident("registry"), ident("name")), num(0))))],
    );
    let lowered = lower_for(Target::Cpp, vec![f]);

    let value = returned(&function(&lowered.unit, "lookup").body[0]);
    let ExprKind::Conditional { cond, then, els } = &value.kind else {
        panic!("expected a conditional, got {value:?}");
    };
    assert_eq!(builtin_of(cond), Some(Builtin::MapContains));
    assert_eq!(builtin_of(then), Some(Builtin::MapGet));
    assert_eq!(els.int_value(), Some(0));
    assert_eq!(value.ty, Type::u32());
}

#[test]
fn fallback_on_a_number_tests_against_zero() {
    let f = with_doc(
        func_decl("either", &["a", "b"], vec![ret(Some(logical("||", ident("a"), ident("b"))))]),
        "* @param {uint32} a\n * @param {uint32} b",
    );
    let lowered = lower_for(Target::Cpp, vec![f]);

    let value = returned(&function(&lowered.unit, "either").body[0]);
    let ExprKind::Conditional { cond, then, els } = &value.kind else {
        panic!("expected a conditional, got {value:?}");
    };
    assert!(matches!(cond.kind, ExprKind::Binary { op: BinOp::Ne, .. }));
    assert_eq!(**then, t::TExpr::ident("a", Type::u32()));
    assert_eq!(**els, t::TExpr::ident("b", Type::u32()));
}

#[test]
fn fallback_on_a_call_keeps_one_evaluation() {
    let next = func_decl("next", &[], vec![ret(Some(num(3)))]);
    let pick = func_decl(
        "pick",
        &[],
        vec![ret(Some(logical("||", call(ident("next"), vec![]), num(7))))],
    );
    let lowered = lower_for(Target::Cpp, vec![next, pick]);

    let value = returned(&function(&lowered.unit, "pick").body[0]);
    let ExprKind::Builtin {
        op: Builtin::ValueOr,
        args,
    } = &value.kind
    else {
        panic!("expected ValueOr, got {value:?}");
    };
    assert!(matches!(args[0].kind, ExprKind::Call { .. }));
    assert_eq!(args[1].int_value(), Some(7));
}

#[test]
fn record_literal_follows_field_order() {
    let f = func_decl(
        "sizes",
        &[],
        vec![ret(Some(object(vec![
            ("stepSize", num(8)),
            ("maxSize", num(32)),
            ("minSize", num(16)),
        ])))],
    );
    let lowered = lower_for(Target::Cpp, vec![f]);

    let value = returned(&function(&lowered.unit, "sizes").body[0]);
    assert_eq!(value.ty, Type::named("KeySize"));
    let ExprKind::Construct { args } = &value.kind else {
        panic!("expected a construction, got {value:?}");
    };
    let args: Vec<_> = args.iter().map(t::TExpr::int_value).collect();
    assert_eq!(args, [Some(16), Some(32), Some(8)]);
}

#[test]
fn object_of_objects_is_a_map_literal() {
    let link = |text: &str| object(vec![("text", string(text)), ("uri", string("https://example.org"))]);
    let f = func_decl(
        "links",
        &[],
        vec![ret(Some(object(vec![("spec", link("Spec")), ("paper", link("Paper"))])))],
    );
    let lowered = lower_for(Target::Cpp, vec![f]);

    let value = returned(&function(&lowered.unit, "links").body[0]);
    assert_eq!(value.ty, Type::map(Type::string(), Type::named("LinkItem")));
    let ExprKind::MapLit(entries) = &value.kind else {
        panic!("expected a map literal, got {value:?}");
    };
    let keys: Vec<_> = entries.iter().map(|(key, _)| key.clone()).collect();
    assert_eq!(keys, [t::TExpr::string("spec"), t::TExpr::string("paper")]);
    assert!(entries.iter().all(|(_, v)| matches!(v.kind, ExprKind::Construct { .. })));
}

#[test]
fn flat_object_is_a_field_initializer_list() {
    let f = func_decl(
        "limits",
        &[],
        vec![ret(Some(object(vec![("low", num(1)), ("high", num(9))])))],
    );
    let lowered = lower_for(Target::Cpp, vec![f]);

    let value = returned(&function(&lowered.unit, "limits").body[0]);
    assert!(value.ty.is_map());
    let ExprKind::InitList(fields) = &value.kind else {
        panic!("expected an initializer list, got {value:?}");
    };
    let fields: Vec<_> = fields
        .iter()
        .map(|(name, value)| (name.as_str(), value.int_value()))
        .collect();
    assert_eq!(fields, [("low", Some(1)), ("high", Some(9))]);
}
