use cryptran_core::Case;

use super::config::{BraceLayout, EmitterConfig};
use crate::Error;
use crate::target::Target;

#[test]
fn target_defaults() {
    let cpp = EmitterConfig::for_target(Target::Cpp);
    assert_eq!(cpp.indent_unit, "    ");
    assert_eq!(cpp.brace_layout, BraceLayout::SameLine);

    let pascal = EmitterConfig::for_target(Target::Pascal);
    assert_eq!(pascal.indent_unit, "  ");
    assert_eq!(pascal.brace_layout, BraceLayout::OwnLine);
    assert_eq!(pascal.naming, None);
    assert!(pascal.runtime);
    assert_eq!(pascal.newline, "\n");
}

#[test]
fn json_overlays_present_keys() {
    let config = EmitterConfig::for_target(Target::Cpp)
        .merge_json(
            r#"{
                "indentUnit": "\t",
                "braceLayout": "ownLine",
                "namingConvention": "camelCase",
                "unitName": "Aes",
                "newline": "crlf",
                "emitRuntime": false
            }"#,
        )
        .unwrap();

    assert_eq!(config.indent_unit, "\t");
    assert_eq!(config.brace_layout, BraceLayout::OwnLine);
    assert_eq!(config.naming, Some(Case::Camel));
    assert_eq!(config.unit_name, "Aes");
    assert_eq!(config.namespace_name, "cryptran");
    assert_eq!(config.newline, "\r\n");
    assert!(!config.runtime);
}

#[test]
fn empty_json_keeps_defaults() {
    let config = EmitterConfig::for_target(Target::Pascal).merge_json("{}").unwrap();
    assert_eq!(config, EmitterConfig::for_target(Target::Pascal));
}

#[test]
fn unknown_keys_are_rejected() {
    let err = EmitterConfig::default().merge_json(r#"{ "tabs": true }"#).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn indent_must_be_whitespace() {
    assert!(EmitterConfig::default().indent_unit("  ").is_ok());
    assert!(EmitterConfig::default().indent_unit("").is_err());
    assert!(EmitterConfig::default().indent_unit("--").is_err());
}

#[test]
fn newline_accepts_names_and_sequences() {
    assert_eq!(EmitterConfig::default().newline("lf").unwrap().newline, "\n");
    assert_eq!(EmitterConfig::default().newline("\r\n").unwrap().newline, "\r\n");
    let err = EmitterConfig::default().newline("cr").unwrap_err();
    assert_eq!(err.to_string(), r#"invalid emitter configuration: newline "cr" must be lf or crlf"#);
}

#[test]
fn names_must_be_identifiers() {
    assert!(EmitterConfig::default().unit_name("Blowfish_2").is_ok());
    assert!(EmitterConfig::default().unit_name("2fish").is_err());
    assert!(EmitterConfig::default().namespace_name("crypto::ciphers").is_err());
    assert!(EmitterConfig::default().namespace_name("").is_err());
}

#[test]
fn names_must_not_be_reserved_words() {
    let err = EmitterConfig::default().namespace_name("class").unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
    assert_eq!(
        err.to_string(),
        "invalid emitter configuration: namespace name `class` is a reserved word in cpp"
    );
    assert!(EmitterConfig::default().unit_name("Begin").is_err());
    assert!(EmitterConfig::default().namespace_name("std").is_err());
    assert!(
        EmitterConfig::default()
            .merge_json(r#"{ "namespaceName": "template" }"#)
            .is_err()
    );
    assert!(EmitterConfig::default().namespace_name("classes").is_ok());
}

#[test]
fn brace_layout_from_str() {
    assert_eq!("same".parse::<BraceLayout>().unwrap(), BraceLayout::SameLine);
    assert_eq!("own-line".parse::<BraceLayout>().unwrap(), BraceLayout::OwnLine);
    assert!("allman".parse::<BraceLayout>().is_err());
}
