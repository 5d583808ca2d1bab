use std::path::PathBuf;

use cryptran_compiler::{BraceLayout, EmitterConfig, Target};
use cryptran_core::Case;
use indoc::indoc;

use super::error::CliError;
use super::setup::EmitterOptions;

fn options(input: &str, target: &str) -> EmitterOptions {
    EmitterOptions {
        input: PathBuf::from(input),
        target: target.to_string(),
        runtime: true,
        ..Default::default()
    }
}

#[test]
fn unit_name_follows_the_input_file() {
    let transpiler = options("dir/aes-128.json", "cpp").transpiler().unwrap();
    let expected = EmitterConfig::for_target(Target::Cpp)
        .unit_name("aes_128")
        .unwrap();
    assert_eq!(transpiler.emitter_config(), &expected);
}

#[test]
fn stdin_and_odd_file_names_keep_the_default_unit() {
    let defaults = EmitterConfig::for_target(Target::Pascal);

    let stdin = options("-", "pascal").transpiler().unwrap();
    assert_eq!(stdin.emitter_config(), &defaults);

    let digits = options("128.json", "pascal").transpiler().unwrap();
    assert_eq!(digits.emitter_config(), &defaults);
}

#[test]
fn flags_override_the_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("style.json");
    let style = indoc! {r#"
        {
          "indentUnit": "  ",
          "unitName": "FromFile",
          "emitRuntime": false
        }
    "#};
    std::fs::write(&config, style).unwrap();

    let mut opts = options("-", "cpp");
    opts.config = Some(config);
    opts.indent = Some("tab".to_string());
    opts.braces = Some("own-line".to_string());
    opts.naming = Some("camel".to_string());
    opts.namespace = Some("crypto".to_string());
    opts.newline = Some("crlf".to_string());

    let transpiler = opts.transpiler().unwrap();
    let expected = EmitterConfig::for_target(Target::Cpp)
        .indent_unit("\t")
        .unwrap()
        .brace_layout(BraceLayout::OwnLine)
        .naming(Some(Case::Camel))
        .unit_name("FromFile")
        .unwrap()
        .namespace_name("crypto")
        .unwrap()
        .newline("crlf")
        .unwrap()
        .runtime(false);
    assert_eq!(transpiler.target(), Target::Cpp);
    assert_eq!(transpiler.emitter_config(), &expected);
}

#[test]
fn numeric_indent_is_a_count_of_spaces() {
    let mut opts = options("-", "pascal");
    opts.indent = Some("3".to_string());
    let transpiler = opts.transpiler().unwrap();
    let expected = EmitterConfig::for_target(Target::Pascal)
        .indent_unit("   ")
        .unwrap();
    assert_eq!(transpiler.emitter_config(), &expected);

    opts.indent = Some("wide".to_string());
    assert!(matches!(opts.transpiler(), Err(CliError::InvalidFlag(_))));
}

#[test]
fn no_runtime_turns_the_stub_off() {
    let mut opts = options("-", "cpp");
    opts.runtime = false;
    let transpiler = opts.transpiler().unwrap();
    let expected = EmitterConfig::for_target(Target::Cpp).runtime(false);
    assert_eq!(transpiler.emitter_config(), &expected);
}

#[test]
fn unknown_target_is_reported() {
    let err = options("-", "rust").transpiler().unwrap_err();
    assert_eq!(err.to_string(), "unknown target `rust` (expected cpp or pascal)");
}

#[test]
fn invalid_unit_name_is_reported() {
    let mut opts = options("-", "cpp");
    opts.unit = Some("not a name".to_string());
    assert!(matches!(opts.transpiler(), Err(CliError::Compile(_))));
}

#[test]
fn missing_config_file_names_the_path() {
    let mut opts = options("-", "cpp");
    opts.config = Some(PathBuf::from("/nonexistent/style.json"));
    let err = opts.transpiler().unwrap_err();
    assert!(err.to_string().starts_with("failed to read /nonexistent/style.json"));
}
