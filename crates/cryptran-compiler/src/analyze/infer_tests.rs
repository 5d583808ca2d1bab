use cryptran_core::Type;
use serde_json::Value;

use super::index::ProgramIndex;
use super::infer::{InferCtx, Origin, infer, resolve};
use super::scope::ScopeStack;
use crate::test_utils::*;

fn ty_in(scope: &ScopeStack, expr: Value) -> String {
    let index = ProgramIndex::default();
    let cx = InferCtx::new(scope, &index);
    infer(&parse_expr(expr), &cx).ty.to_string()
}

fn ty_of(expr: Value) -> String {
    ty_in(&ScopeStack::new(), expr)
}

fn scope_with(bindings: &[(&str, Type)]) -> ScopeStack {
    let mut scope = ScopeStack::new();
    for (name, ty) in bindings {
        scope.declare(*name, ty.clone());
    }
    scope
}

fn resolved(name: &str, init: Option<Value>) -> (String, Origin) {
    let index = ProgramIndex::default();
    let scope = ScopeStack::new();
    let cx = InferCtx::new(&scope, &index);
    let init = init.map(parse_expr);
    let found = resolve(Some(name), init.as_ref(), None, &cx);
    (found.ty.to_string(), found.origin)
}

#[test]
fn literals() {
    assert_eq!(ty_of(num(5)), "uint32");
    assert_eq!(ty_of(hex(0xFF)), "uint32");
    assert_eq!(ty_of(num(4_294_967_296)), "uint64");
    assert_eq!(ty_of(float(1.5)), "float64");
    assert_eq!(ty_of(string("abc")), "string");
    assert_eq!(ty_of(boolean(true)), "bool");
    assert_eq!(ty_of(null()), "unknown");
    assert_eq!(ty_of(unary("-", num(1))), "int32");
    assert_eq!(ty_of(template(&["a", ""], vec![ident("x")])), "string");
}

#[test]
fn unsigned_shift_and_int_coercion() {
    assert_eq!(ty_of(bin(">>>", ident("x"), num(0))), "uint32");
    assert_eq!(ty_of(bin("|", ident("x"), num(0))), "int32");
}

#[test]
fn bit_operations_promote_sub_word_operands() {
    let scope = scope_with(&[("b", Type::u8()), ("w", Type::u64())]);
    assert_eq!(ty_in(&scope, bin("<<", ident("b"), num(8))), "uint32");
    assert_eq!(ty_in(&scope, bin("^", ident("w"), num(1))), "uint64");
    assert_eq!(ty_in(&scope, bin("&", ident("q"), num(255))), "uint32");
}

#[test]
fn arithmetic_and_comparison() {
    let scope = scope_with(&[("a", Type::u16()), ("big", Type::u64()), ("f", Type::f64())]);
    assert_eq!(ty_in(&scope, bin("+", ident("a"), num(1))), "uint32");
    assert_eq!(ty_in(&scope, bin("*", ident("a"), ident("big"))), "uint64");
    assert_eq!(ty_in(&scope, bin("/", ident("a"), ident("f"))), "float64");
    assert_eq!(ty_in(&scope, bin("+", string("n="), ident("a"))), "string");
    assert_eq!(ty_in(&scope, bin("<", ident("a"), num(3))), "bool");
}

#[test]
fn integer_array_literals_pick_smallest_element() {
    assert_eq!(ty_of(array(vec![num(1), num(2), hex(0xFF)])), "uint8[]");
    assert_eq!(ty_of(array(vec![num(1), num(256)])), "uint16[]");
    assert_eq!(ty_of(array(vec![hex(0xDEADBEEF)])), "uint32[]");
    assert_eq!(ty_of(array(vec![unary("-", num(1)), num(2)])), "int32[]");
    assert_eq!(ty_of(array(vec![])), "unknown[]");
    assert_eq!(ty_of(array(vec![string("a"), string("b")])), "string[]");
}

#[test]
fn object_literal_matching_a_record() {
    let index = ProgramIndex::default();
    let scope = ScopeStack::new();
    let cx = InferCtx::new(&scope, &index);
    let expr = parse_expr(object(vec![
        ("minSize", num(16)),
        ("maxSize", num(32)),
        ("stepSize", num(8)),
    ]));

    let found = infer(&expr, &cx);
    assert_eq!(found.ty.to_string(), "KeySize");
    assert_eq!(found.origin, Origin::Framework);

    assert_eq!(
        ty_of(object(vec![("a", num(1)), ("b", num(2))])),
        "map<string, uint32>"
    );
}

#[test]
fn framework_members() {
    assert_eq!(
        ty_of(method_call(ident("OpCodes"), "RotL32", vec![ident("x"), num(5)])),
        "uint32"
    );
    assert_eq!(
        ty_of(method_call(ident("OpCodes"), "Unpack32BE", vec![ident("x")])),
        "uint8[]"
    );
    assert_eq!(ty_of(member(ident("CategoryType"), "BLOCK")), "CategoryType");
    assert_eq!(
        ty_of(member(member(ident("AlgorithmFramework"), "CategoryType"), "BLOCK")),
        "CategoryType"
    );
    assert_eq!(ty_of(new_expr("KeySize", vec![num(16), num(32), num(8)])), "KeySize");
}

#[test]
fn constructors() {
    assert_eq!(ty_of(new_expr("Uint32Array", vec![num(16)])), "uint32[]");
    assert_eq!(ty_of(new_expr("Uint8Array", vec![ident("n")])), "uint8[]");
    assert_eq!(ty_of(new_expr("Array", vec![num(16)])), "unknown[]");
    assert_eq!(ty_of(new_expr("Error", vec![string("bad")])), "Error");
    assert_eq!(ty_of(new_expr("Map", vec![])), "map<unknown, unknown>");
}

#[test]
fn sequence_methods() {
    let scope = scope_with(&[("data", Type::bytes()), ("words", Type::words())]);
    assert_eq!(ty_in(&scope, method_call(ident("data"), "slice", vec![num(0), num(4)])), "uint8[]");
    assert_eq!(ty_in(&scope, method_call(ident("data"), "indexOf", vec![num(3)])), "int32");
    assert_eq!(ty_in(&scope, method_call(ident("words"), "pop", vec![])), "uint32");
    assert_eq!(ty_in(&scope, member(ident("data"), "length")), "uint32");
    assert_eq!(ty_in(&scope, index(ident("data"), ident("i"))), "uint8");
    assert_eq!(
        ty_in(
            &scope,
            method_call(ident("data"), "map", vec![arrow(&["b"], bin("^", ident("b"), num(1)))])
        ),
        "uint32[]"
    );
    assert_eq!(
        ty_in(
            &scope,
            method_call(
                ident("data"),
                "map",
                vec![arrow(&["b"], method_call(ident("b"), "toString", vec![num(16)]))]
            )
        ),
        "string[]"
    );
}

#[test]
fn string_methods() {
    let scope = scope_with(&[("s", Type::string())]);
    assert_eq!(ty_in(&scope, method_call(ident("s"), "charCodeAt", vec![num(0)])), "uint8");
    assert_eq!(ty_in(&scope, method_call(ident("s"), "split", vec![string(",")])), "string[]");
    assert_eq!(ty_in(&scope, method_call(ident("s"), "toUpperCase", vec![])), "string");
    assert_eq!(ty_in(&scope, index(ident("s"), num(0))), "string");
}

#[test]
fn math_calls() {
    let scope = scope_with(&[("a", Type::u8())]);
    assert_eq!(ty_in(&scope, method_call(ident("Math"), "floor", vec![ident("x")])), "uint32");
    assert_eq!(ty_in(&scope, method_call(ident("Math"), "min", vec![ident("a"), num(4)])), "uint32");
    assert_eq!(ty_in(&scope, method_call(ident("Math"), "sqrt", vec![num(2)])), "float64");
}

#[test]
fn conditional_and_logical() {
    let scope = scope_with(&[("key", Type::optional(Type::bytes())), ("t", Type::bool())]);
    assert_eq!(ty_in(&scope, cond(ident("t"), null(), num(1))), "uint32");
    assert_eq!(ty_in(&scope, cond(ident("t"), string("a"), num(1))), "string");
    assert_eq!(ty_in(&scope, logical("||", ident("key"), array(vec![]))), "uint8[]");
    assert_eq!(ty_in(&scope, logical("&&", ident("t"), ident("t"))), "bool");
}

#[test]
fn resolution_chain() {
    assert_eq!(resolved("keySize", None), ("uint32".to_string(), Origin::Heuristic));
    assert_eq!(resolved("frob", None), ("uint32".to_string(), Origin::Default));
    assert_eq!(resolved("frob", Some(null())), ("uint32?".to_string(), Origin::Default));
    assert_eq!(resolved("key", Some(null())), ("uint8[]".to_string(), Origin::Heuristic));
    assert_eq!(resolved("count", Some(null())), ("uint32?".to_string(), Origin::Heuristic));
    assert_eq!(resolved("out", Some(array(vec![]))), ("uint8[]".to_string(), Origin::Structural));
    assert_eq!(resolved("roundKeys", Some(array(vec![]))), ("uint32[]".to_string(), Origin::Heuristic));
    assert_eq!(resolved("key", Some(num(3))), ("uint32".to_string(), Origin::Structural));
}

#[test]
fn annotation_wins() {
    let index = ProgramIndex::default();
    let scope = ScopeStack::new();
    let cx = InferCtx::new(&scope, &index);
    let init = parse_expr(num(0));

    let found = resolve(Some("key"), Some(&init), Some(&Type::u16()), &cx);
    assert_eq!(found.ty, Type::u16());
    assert_eq!(found.origin, Origin::Annotation);
}
