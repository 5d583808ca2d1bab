use std::path::{Path, PathBuf};

use serde_json::json;

use super::check::passes;
use super::setup::EmitterOptions;
use super::transpile::{TranspileArgs, execute};

fn rotate_program() -> serde_json::Value {
    json!({
        "type": "Program",
        "body": [{
            "type": "FunctionDeclaration",
            "id": { "type": "Identifier", "name": "rotate" },
            "params": [{ "type": "Identifier", "name": "x" }],
            "body": {
                "type": "BlockStatement",
                "body": [{
                    "type": "ReturnStatement",
                    "argument": {
                        "type": "CallExpression",
                        "callee": {
                            "type": "MemberExpression",
                            "object": { "type": "Identifier", "name": "OpCodes" },
                            "property": { "type": "Identifier", "name": "RotL32" },
                            "computed": false
                        },
                        "arguments": [
                            { "type": "Identifier", "name": "x" },
                            { "type": "Literal", "value": 5, "raw": "5" }
                        ]
                    }
                }]
            },
            "leadingComments": [{ "type": "Block", "value": "* @param {uint32} x\n * @returns {uint32}" }]
        }]
    })
}

fn labeled_program() -> serde_json::Value {
    json!({
        "type": "Program",
        "body": [{ "type": "LabeledStatement", "label": { "type": "Identifier", "name": "outer" } }]
    })
}

fn write_input(dir: &Path, name: &str, program: serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, program.to_string()).unwrap();
    path
}

fn args(input: PathBuf, target: &str) -> TranspileArgs {
    TranspileArgs {
        options: EmitterOptions {
            input,
            target: target.to_string(),
            runtime: false,
            ..Default::default()
        },
        output: None,
        source: None,
        strict: false,
        color: false,
    }
}

#[test]
fn writes_the_unit_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "rot.json", rotate_program());

    let (mut out, mut err) = (Vec::new(), Vec::new());
    let passed = execute(&args(input, "cpp"), &mut out, &mut err).unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(passed);
    assert!(text.contains("inline uint32_t rotate(uint32_t x) {"));
    assert!(text.contains("x << 5"));
    assert!(err.is_empty());
}

#[test]
fn writes_the_unit_to_the_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "rot.json", rotate_program());
    let target = dir.path().join("Rot.pas");

    let mut a = args(input, "pascal");
    a.output = Some(target.clone());
    let (mut out, mut err) = (Vec::new(), Vec::new());
    assert!(execute(&a, &mut out, &mut err).unwrap());

    assert!(out.is_empty());
    let text = std::fs::read_to_string(target).unwrap();
    assert!(text.contains("function Rotate(X: Cardinal): Cardinal;"));
    assert!(text.trim_end().ends_with("end."));
}

#[test]
fn diagnostics_go_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "labels.json", labeled_program());

    let (mut out, mut err) = (Vec::new(), Vec::new());
    let passed = execute(&args(input, "cpp"), &mut out, &mut err).unwrap();

    let text = String::from_utf8(out).unwrap();
    let report = String::from_utf8(err).unwrap();
    assert!(passed);
    assert!(text.contains("cryptran: unhandled LabeledStatement"));
    assert!(report.starts_with("error"));
    assert!(report.contains("LabeledStatement"));
}

#[test]
fn strict_fails_on_any_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "labels.json", labeled_program());

    let mut a = args(input, "cpp");
    a.strict = true;
    let (mut out, mut err) = (Vec::new(), Vec::new());
    assert!(!execute(&a, &mut out, &mut err).unwrap());
    assert!(!out.is_empty());
}

#[test]
fn check_passes_unless_errors() {
    let clean = cryptran_compiler::Transpiler::new(cryptran_compiler::Target::Cpp)
        .run_json(&rotate_program().to_string())
        .unwrap();
    assert!(passes(&clean, false));
    assert!(passes(&clean, true));

    let broken = cryptran_compiler::Transpiler::new(cryptran_compiler::Target::Cpp)
        .run_json(&labeled_program().to_string())
        .unwrap();
    assert!(!passes(&broken, false));
}

#[test]
fn malformed_input_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.json");
    std::fs::write(&input, "{ not json").unwrap();

    let (mut out, mut err) = (Vec::new(), Vec::new());
    let e = execute(&args(input, "cpp"), &mut out, &mut err).unwrap_err();
    assert!(e.to_string().starts_with("invalid ESTree input:"));
}

#[test]
fn missing_input_names_the_path() {
    let (mut out, mut err) = (Vec::new(), Vec::new());
    let a = args(PathBuf::from("/nonexistent/aes.json"), "cpp");
    let e = execute(&a, &mut out, &mut err).unwrap_err();
    assert!(e.to_string().starts_with("failed to read /nonexistent/aes.json"));
}
