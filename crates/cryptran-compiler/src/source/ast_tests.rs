use serde_json::json;

use super::ast::{ArrowBody, ClassMember, Expr, ForInit, Program, Stmt};
use super::Span;
use crate::test_utils::*;

#[test]
fn unknown_statement_becomes_unsupported() {
    let program = program(vec![
        json!({ "type": "WithStatement", "object": ident("x"), "body": block(vec![]), "start": 4, "end": 20 }),
        expr_stmt(ident("x")),
    ]);

    assert_eq!(program.body.len(), 2);
    let Stmt::Unsupported(u) = &program.body[0] else {
        panic!("expected unsupported statement");
    };
    assert_eq!(u.kind, "WithStatement");
    assert_eq!(u.reason, "unknown node type");
    assert_eq!(u.span, Some(Span::new(4, 20)));
    assert_eq!(program.body[1].kind(), "ExpressionStatement");
}

#[test]
fn malformed_known_node_keeps_its_kind() {
    let expr = parse_expr(json!({ "type": "BinaryExpression", "operator": "+" }));

    let Expr::Unsupported(u) = expr else {
        panic!("expected unsupported expression");
    };
    assert_eq!(u.kind, "BinaryExpression");
    assert!(u.reason.contains("missing field"));
}

#[test]
fn unknown_expression_nested_in_known_statement() {
    let stmt = parse_stmt(expr_stmt(json!({ "type": "YieldExpression", "argument": null })));

    let Stmt::ExpressionStatement { expression, .. } = stmt else {
        panic!("expected expression statement");
    };
    assert_eq!(expression.kind(), "YieldExpression");
}

#[test]
fn arrow_bodies_and_for_init() {
    let Expr::ArrowFunctionExpression(arrow) = parse_expr(arrow(&["a"], ident("a"))) else {
        panic!("expected arrow");
    };
    assert!(matches!(arrow.body, ArrowBody::Expr(_)));

    let stmt = parse_stmt(counted_for("i", num(4), vec![]));
    let Stmt::ForStatement { init: Some(ForInit::Decl(decl)), .. } = stmt else {
        panic!("expected for with declaration");
    };
    assert_eq!(decl.kind, "let");
}

#[test]
fn class_members() {
    let program = program(vec![class_decl(
        "A",
        None,
        vec![
            method("run", &[], vec![]),
            json!({ "type": "PropertyDefinition", "key": ident("size"), "value": num(4), "static": true }),
            json!({ "type": "StaticBlock", "body": [] }),
        ],
    )]);
    let Stmt::ClassDeclaration(class) = &program.body[0] else {
        panic!("expected class");
    };

    let kinds: Vec<&str> = class.body.body.iter().map(ClassMember::kind).collect();
    assert_eq!(kinds, ["MethodDefinition", "PropertyDefinition", "StaticBlock"]);
    let ClassMember::PropertyDefinition(prop) = &class.body.body[1] else {
        panic!("expected property");
    };
    assert!(prop.is_static);
}

#[test]
fn expression_helpers() {
    let e = parse_expr(this_member("key"));
    assert_eq!(e.as_this_member(), Some("key"));

    let e = parse_expr(json!({ "type": "ChainExpression", "expression": member(ident("a"), "b") }));
    assert!(matches!(e.unwrap_parens(), Expr::MemberExpression { .. }));

    assert!(parse_expr(null()).is_null_like());
    assert!(parse_expr(ident("undefined")).is_null_like());
    assert!(parse_expr(unary("void", num(0))).is_null_like());
    assert!(!parse_expr(num(0)).is_null_like());

    let pattern = parse_expr(json!({ "type": "AssignmentPattern", "left": ident("n"), "right": num(1) }));
    assert_eq!(pattern.binding_name(), Some("n"));
    assert_eq!(parse_expr(string("k")).key_name().as_deref(), Some("k"));
}

#[test]
fn invalid_json_is_an_input_error() {
    let err = Program::from_json("{ not json").unwrap_err();
    assert!(matches!(err, crate::Error::InvalidInput(_)));
}
