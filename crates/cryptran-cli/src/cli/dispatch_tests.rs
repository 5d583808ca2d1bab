//! Tests for CLI dispatch logic.
//!
//! These tests verify:
//! 1. Emitter flags are shared by transpile and check
//! 2. Params extraction: correct fields are extracted from ArgMatches
//! 3. Invalid choices are rejected by clap

use std::path::PathBuf;

use super::*;
use crate::cli::commands::{check_command, targets_command, transpile_command, types_command};
use crate::cli::dispatch::EmitterParams;
use crate::commands::setup::EmitterOptions;

#[test]
fn transpile_defaults() {
    let m = transpile_command()
        .try_get_matches_from(["transpile", "aes.json"])
        .unwrap();
    let params = TranspileParams::from_matches(&m);

    assert_eq!(params.emitter.input, PathBuf::from("aes.json"));
    assert_eq!(params.emitter.target, "cpp");
    assert_eq!(params.emitter.config, None);
    assert!(!params.emitter.no_runtime);
    assert_eq!(params.output, None);
    assert!(!params.strict);
    assert_eq!(params.color, ColorChoice::Auto);
}

#[test]
fn transpile_extracts_every_flag() {
    let m = transpile_command()
        .try_get_matches_from([
            "transpile",
            "aes.json",
            "-t",
            "pascal",
            "-c",
            "style.json",
            "--indent",
            "tab",
            "--braces",
            "own-line",
            "--naming",
            "camel",
            "--unit",
            "AesUnit",
            "--namespace",
            "crypto",
            "--newline",
            "crlf",
            "--no-runtime",
            "-o",
            "Aes.pas",
            "--source",
            "aes.js",
            "--strict",
            "--color",
            "never",
        ])
        .unwrap();
    let params = TranspileParams::from_matches(&m);

    assert_eq!(
        params.emitter,
        EmitterParams {
            input: PathBuf::from("aes.json"),
            target: "pascal".to_string(),
            config: Some(PathBuf::from("style.json")),
            indent: Some("tab".to_string()),
            braces: Some("own-line".to_string()),
            naming: Some("camel".to_string()),
            unit: Some("AesUnit".to_string()),
            namespace: Some("crypto".to_string()),
            newline: Some("crlf".to_string()),
            no_runtime: true,
        }
    );
    assert_eq!(params.output, Some(PathBuf::from("Aes.pas")));
    assert_eq!(params.source, Some(PathBuf::from("aes.js")));
    assert!(params.strict);
    assert_eq!(params.color, ColorChoice::Never);
}

#[test]
fn no_runtime_flag_disables_the_stub() {
    let m = check_command()
        .try_get_matches_from(["check", "aes.json", "--no-runtime"])
        .unwrap();
    let options: EmitterOptions = CheckParams::from_matches(&m).emitter.into();
    assert!(!options.runtime);

    let m = check_command()
        .try_get_matches_from(["check", "aes.json"])
        .unwrap();
    let options: EmitterOptions = CheckParams::from_matches(&m).emitter.into();
    assert!(options.runtime);
}

#[test]
fn check_accepts_source_and_strict() {
    let m = check_command()
        .try_get_matches_from(["check", "-", "--source", "aes.js", "--strict", "--color", "always"])
        .unwrap();
    let params = CheckParams::from_matches(&m);

    assert_eq!(params.emitter.input, PathBuf::from("-"));
    assert_eq!(params.source, Some(PathBuf::from("aes.js")));
    assert!(params.strict);
    assert_eq!(params.color, ColorChoice::Always);
}

#[test]
fn types_takes_only_input_and_color() {
    let m = types_command()
        .try_get_matches_from(["types", "aes.json", "--color", "never"])
        .unwrap();
    let params = TypesParams::from_matches(&m);
    assert_eq!(params.input, PathBuf::from("aes.json"));
    assert_eq!(params.color, ColorChoice::Never);

    let result = types_command().try_get_matches_from(["types", "aes.json", "-t", "pascal"]);
    assert!(result.is_err());
}

#[test]
fn input_is_required() {
    let result = transpile_command().try_get_matches_from(["transpile"]);
    assert!(result.is_err());
}

#[test]
fn invalid_choices_are_rejected() {
    let braces = transpile_command().try_get_matches_from(["transpile", "a.json", "--braces", "k&r"]);
    assert!(braces.is_err());

    let color = check_command().try_get_matches_from(["check", "a.json", "--color", "sometimes"]);
    assert!(color.is_err());
}

#[test]
fn targets_takes_no_positionals() {
    let m = targets_command().try_get_matches_from(["targets"]).unwrap();
    assert_eq!(TargetsParams::from_matches(&m).color, ColorChoice::Auto);
    assert!(targets_command().try_get_matches_from(["targets", "cpp"]).is_err());
}

#[test]
fn cli_requires_a_subcommand() {
    assert!(build_cli().try_get_matches_from(["cryptran"]).is_err());
}
