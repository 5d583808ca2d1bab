use indoc::indoc;

use super::config::{BraceLayout, EmitterConfig};
use super::printer::Printer;
use crate::target::Target;

fn printer(layout: BraceLayout) -> Printer {
    Printer::new(&EmitterConfig::for_target(Target::Cpp).brace_layout(layout))
}

#[test]
fn indented_restores_depth() {
    let mut p = printer(BraceLayout::SameLine);
    Printer::indented(&mut p, |p| {
        p.line("a");
        Printer::indented(p, |p| p.line("b"));
        assert_eq!(p.depth(), 1);
    });
    assert_eq!(p.depth(), 0);
    p.line("c");

    insta::assert_snapshot!(p.finish(), @r"
    a
        b
    c
    ");
}

#[test]
fn blank_lines_are_never_doubled() {
    let mut p = printer(BraceLayout::SameLine);
    p.blank();
    p.line("a");
    p.blank();
    p.blank();
    p.line("b");
    assert_eq!(p.finish(), "a\n\nb\n");
}

#[test]
fn empty_lines_carry_no_indentation() {
    let mut p = printer(BraceLayout::SameLine);
    Printer::indented(&mut p, |p| {
        p.line("x");
        p.line("");
        p.line("y");
    });
    assert_eq!(p.finish(), "    x\n\n    y\n");
}

#[test]
fn same_line_braces() {
    let mut p = printer(BraceLayout::SameLine);
    Printer::braced(&mut p, "if (x)", "", |p| p.line("a();"));
    Printer::continued(&mut p, "else", |p| p.line("b();"));
    Printer::braced(&mut p, "struct S", ";", |p| p.line("int v;"));

    assert_eq!(
        p.finish(),
        indoc! {"
            if (x) {
                a();
            } else {
                b();
            }
            struct S {
                int v;
            };
        "}
    );
}

#[test]
fn own_line_braces() {
    let mut p = printer(BraceLayout::OwnLine);
    Printer::braced(&mut p, "if (x)", "", |p| p.line("a();"));
    Printer::continued(&mut p, "else", |p| p.line("b();"));

    assert_eq!(
        p.finish(),
        indoc! {"
            if (x)
            {
                a();
            }
            else
            {
                b();
            }
        "}
    );
}

#[test]
fn labels_sit_one_level_out() {
    let mut p = printer(BraceLayout::SameLine);
    Printer::braced(&mut p, "class C", ";", |p| {
        p.label("public:");
        p.line("int v;");
    });
    assert_eq!(p.finish(), "class C {\npublic:\n    int v;\n};\n");
}

#[test]
fn raw_text_takes_the_configured_newline() {
    let config = EmitterConfig::for_target(Target::Pascal).newline("crlf").unwrap();
    let mut p = Printer::new(&config);
    p.raw("a\nb\n");
    p.line("c");
    assert_eq!(p.finish(), "a\r\nb\r\nc\r\n");
}

#[test]
fn nested_printer_starts_at_the_current_depth() {
    let mut p = printer(BraceLayout::SameLine);
    let inline = Printer::indented(&mut p, |p| {
        let mut inner = p.nested();
        inner.line("x;");
        inner.into_inline()
    });
    assert_eq!(inline, "    x;");
}

#[test]
fn finish_leaves_one_trailing_newline() {
    let mut p = printer(BraceLayout::SameLine);
    p.line("a");
    p.line("");
    p.line("");
    assert_eq!(p.finish(), "a\n");
}
