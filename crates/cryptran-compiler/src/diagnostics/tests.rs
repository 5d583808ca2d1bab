use super::*;
use crate::source::Span;

#[test]
fn severity_display() {
    insta::assert_snapshot!(format!("{}", Severity::Error), @"error");
    insta::assert_snapshot!(format!("{}", Severity::Warning), @"warning");
}

#[test]
fn default_severities() {
    assert_eq!(DiagnosticKind::UnhandledNode.default_severity(), Severity::Error);
    assert_eq!(
        DiagnosticKind::UnsupportedConstruct.default_severity(),
        Severity::Error
    );
    assert_eq!(
        DiagnosticKind::InferenceFallback.default_severity(),
        Severity::Warning
    );
    assert_eq!(
        DiagnosticKind::IdentifierRenamed.default_severity(),
        Severity::Warning
    );
}

#[test]
fn report_with_default_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnhandledNode, "WithStatement")
        .emit();

    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics.has_errors());
    assert!(!diagnostics.has_warnings());
    insta::assert_snapshot!(diagnostics.render(), @"error: no translation for node [WithStatement]");
}

#[test]
fn report_with_custom_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::InferenceFallback, "Identifier")
        .message("state")
        .span(Some(Span::new(4, 9)))
        .emit();

    assert_eq!(diagnostics.warning_count(), 1);
    assert_eq!(diagnostics.error_count(), 0);
    insta::assert_snapshot!(
        diagnostics.render(),
        @"warning at 4..9: type of `state` could not be inferred [Identifier]"
    );
}

#[test]
fn counts_by_kind() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::IdentifierRenamed, "Identifier")
        .emit();
    diagnostics
        .report(DiagnosticKind::IdentifierRenamed, "Identifier")
        .emit();
    diagnostics
        .report(DiagnosticKind::UnsupportedConstruct, "SpreadElement")
        .message("spread arguments")
        .emit();

    assert_eq!(diagnostics.count_of(DiagnosticKind::IdentifierRenamed), 2);
    assert_eq!(diagnostics.count_of(DiagnosticKind::UnhandledNode), 0);
    assert_eq!(diagnostics.error_count(), 1);
    assert_eq!(
        diagnostics.iter().last().map(|d| d.message()),
        Some("construct has no static equivalent: spread arguments")
    );
}

#[test]
fn render_with_source_snippet() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnhandledNode, "WithStatement")
        .message("`WithStatement`")
        .span(Some(Span::new(0, 4)))
        .emit();

    let result = diagnostics.printer().source("with (x) {}").render();
    insta::assert_snapshot!(result, @r"
    error: no translation for `WithStatement`
      |
    1 | with (x) {}
      | ^^^^ WithStatement
    ");
}

#[test]
fn render_without_span_falls_back_to_plain() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::IdentifierRenamed, "Identifier")
        .message("`key_size` renamed to `key_size_2`")
        .emit();

    let result = diagnostics.printer().source("let keySize;").render();
    insta::assert_snapshot!(
        result,
        @"warning: `key_size` renamed to `key_size_2` [Identifier]"
    );
}

#[test]
fn extend_merges() {
    let mut a = Diagnostics::new();
    a.report(DiagnosticKind::UnhandledNode, "X").emit();
    let mut b = Diagnostics::new();
    b.report(DiagnosticKind::InferenceFallback, "Y").emit();

    a.extend(b);
    assert_eq!(a.len(), 2);
    assert!(a.has_errors());
    assert!(a.has_warnings());
}
