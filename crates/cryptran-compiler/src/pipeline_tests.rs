use cryptran_core::Case;
use serde_json::json;

use crate::test_utils::*;
use crate::{DiagnosticKind, EmitterConfig, Error, Target, Transpiler};

fn transpile(target: Target, body: Vec<serde_json::Value>) -> crate::Output {
    let config = EmitterConfig::for_target(target).runtime(false);
    Transpiler::new(target).config(config).run(&program(body))
}

#[test]
fn rotate_left_lowers_to_two_shifts() {
    let f = with_doc(
        func_decl(
            "rotate",
            &["x"],
            vec![ret(Some(method_call(ident("OpCodes"), "RotL32", vec![ident("x"), num(5)])))],
        ),
        "* @param {uint32} x\n * @returns {uint32}",
    );

    let cpp = transpile(Target::Cpp, vec![f.clone()]);
    assert!(cpp.text.contains("inline uint32_t rotate(uint32_t x) {"));
    assert!(cpp.text.contains("x << 5"));
    assert!(cpp.text.contains("x >> 27"));

    let pascal = transpile(Target::Pascal, vec![f]);
    assert!(pascal.text.contains("function Rotate(X: Cardinal): Cardinal;"));
    assert!(pascal.text.contains("X shl 5"));
    assert!(pascal.text.contains("X shr 27"));
}

#[test]
fn pushing_a_byte_vector_appends_in_bulk() {
    let f = with_doc(
        func_decl(
            "extend",
            &["buffer", "other"],
            vec![expr_stmt(method_call(ident("buffer"), "push", vec![ident("other")]))],
        ),
        "* @param {uint8[]} buffer\n * @param {uint8[]} other",
    );

    let cpp = transpile(Target::Cpp, vec![f.clone()]);
    assert!(cpp.text.contains("buffer.insert(buffer.end(), other.begin(), other.end());"));
    assert!(!cpp.text.contains("push_back"));

    let pascal = transpile(Target::Pascal, vec![f]);
    assert!(pascal.text.contains("Rt.AppendAll<Byte>(Buffer, Other);"));
}

#[test]
fn field_only_assigned_null_is_optional() {
    let class = class_decl(
        "Holder",
        None,
        vec![constructor(
            &[],
            vec![expr_stmt(assign("=", this_member("pending"), null()))],
        )],
    );

    let cpp = transpile(Target::Cpp, vec![class]);
    assert!(cpp.text.contains("std::optional<uint32_t> pending"));
    assert!(cpp.text.contains("#include <optional>"));
}

#[test]
fn reserved_word_parameter_gets_a_suffix() {
    let f = with_doc(
        func_decl("pick", &["class"], vec![ret(Some(ident("class")))]),
        "* @param {uint32} class\n * @returns {uint32}",
    );

    let cpp = transpile(Target::Cpp, vec![f.clone()]);
    assert!(cpp.text.contains("inline uint32_t pick(uint32_t class_) {\n    return class_;\n}"));
    assert_eq!(cpp.diagnostics.count_of(DiagnosticKind::IdentifierRenamed), 0);

    let pascal = transpile(Target::Pascal, vec![f]);
    assert!(pascal.text.contains("function Pick(Class_: Cardinal): Cardinal;"));
}

#[test]
fn unsupported_statements_are_reported_not_fatal() {
    let labeled = json!({ "type": "LabeledStatement", "label": ident("outer") });
    let output = transpile(Target::Cpp, vec![labeled]);

    assert!(!output.is_clean());
    assert_eq!(output.diagnostics.count_of(DiagnosticKind::UnhandledNode), 1);
    assert!(output.text.contains("cryptran: unhandled LabeledStatement"));
}

#[test]
fn naming_override_applies_to_declarations() {
    let f = with_doc(
        func_decl("keySchedule", &["key"], vec![]),
        "* @param {uint8[]} key",
    );
    let output = Transpiler::new(Target::Cpp)
        .config(EmitterConfig::for_target(Target::Cpp).runtime(false))
        .naming(Case::Camel)
        .run(&program(vec![f]));
    assert!(output.text.contains("inline void keySchedule(std::vector<uint8_t> key)"));
}

#[test]
fn malformed_json_is_an_error() {
    let err = Transpiler::new(Target::Pascal).run_json("{").unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[test]
fn empty_program_is_a_clean_unit() {
    let output = Transpiler::new(Target::Pascal)
        .run_json(r#"{ "type": "Program", "body": [] }"#)
        .unwrap();
    assert!(output.is_clean());
    assert!(output.text.starts_with("unit Generated;"));
    assert!(output.text.trim_end().ends_with("end."));
}

#[test]
fn text_keyed_parameter_reads_as_a_dictionary() {
    let f = func_decl(
        "lookup",
        &["registry", "name"],
        vec![ret(Some(logical("||", index(ident("registry"), ident("name")), num(0))))],
    );

    let cpp = transpile(Target::Cpp, vec![f.clone()]);
    assert_eq!(cpp.diagnostics.count_of(DiagnosticKind::UnsupportedConstruct), 0);
    assert!(!cpp.text.contains("cryptran: unhandled"));
    assert!(cpp.text.contains("std::map<std::string, uint32_t>"));
    assert!(cpp.text.contains("registry.count(name) != 0"));
    assert!(cpp.text.contains("registry.at(name)"));

    let pascal = transpile(Target::Pascal, vec![f]);
    assert_eq!(pascal.diagnostics.count_of(DiagnosticKind::UnsupportedConstruct), 0);
    assert!(pascal.text.contains("TDictionary<string, Cardinal>"));
}

#[test]
fn fallback_reads_a_call_once() {
    let next = func_decl("next", &[], vec![ret(Some(num(3)))]);
    let pick = func_decl(
        "pick",
        &[],
        vec![ret(Some(logical("||", call(ident("next"), vec![]), num(7))))],
    );

    let cpp = transpile(Target::Cpp, vec![next.clone(), pick.clone()]);
    assert_eq!(cpp.diagnostics.count_of(DiagnosticKind::UnsupportedConstruct), 0);
    assert!(cpp.text.contains("rt::value_or<"));
    assert!(cpp.text.contains("(next(), 7"));
    assert!(!cpp.text.contains("next() != 0"));

    let pascal = transpile(Target::Pascal, vec![next, pick]);
    assert!(pascal.text.contains("Rt.ValueOr<"));
    assert!(pascal.text.contains("(Next(), 7)"));
    assert!(!pascal.text.contains("Rt.IfThen"));
}

#[test]
fn fallback_with_effects_on_both_sides_is_reported() {
    let next = func_decl("next", &[], vec![ret(Some(num(3)))]);
    let pick = func_decl(
        "pick",
        &[],
        vec![ret(Some(logical(
            "||",
            call(ident("next"), vec![]),
            call(ident("next"), vec![]),
        )))],
    );

    let cpp = transpile(Target::Cpp, vec![next, pick]);
    assert_eq!(cpp.diagnostics.count_of(DiagnosticKind::UnsupportedConstruct), 1);
    assert!(!cpp.text.contains("rt::value_or"));
}
