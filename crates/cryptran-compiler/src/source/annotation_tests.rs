use cryptran_core::Type;

use super::annotation::parse_doc;
use super::ast::Comment;

fn comment(value: &str) -> Vec<Comment> {
    vec![Comment {
        kind: "Block".to_string(),
        value: value.to_string(),
    }]
}

#[test]
fn jsdoc_tags() {
    let doc = parse_doc(&comment(
        "*\n * Rotate left\n * @param {number} value - word to rotate\n * @param {uint8} [positions=1]\n * @returns {number}\n ",
    ));

    assert_eq!(doc.lines, ["Rotate left", "@param {number} value - word to rotate", "@param {uint8} [positions=1]", "@returns {number}"]);
    assert_eq!(doc.param("value"), Some(&Type::u32()));
    assert_eq!(doc.param("positions"), Some(&Type::u8()));
    assert_eq!(doc.returns, Some(Type::u32()));
    assert_eq!(doc.ty, None);
}

#[test]
fn parameters_section() {
    let doc = parse_doc(&comment(
        "*\n * Mix a column\n *\n * Parameters:\n *   col (int32): column word\n *   table (byte[]): lookup\n *\n * Returns: int32\n ",
    ));

    assert_eq!(doc.param("col"), Some(&Type::u32()));
    assert_eq!(doc.param("table"), Some(&Type::bytes()));
    assert_eq!(doc.returns, Some(Type::u32()));
}

#[test]
fn type_tag_and_unions() {
    let doc = parse_doc(&comment("* @type {Uint32Array|null} "));
    assert_eq!(doc.ty, Some(Type::optional(Type::words())));

    let doc = parse_doc(&comment("* @type {string|number} "));
    assert_eq!(doc.ty, Some(Type::string()));
}

#[test]
fn untyped_annotations_are_ignored() {
    let doc = parse_doc(&comment(
        "*\n * @param {Object} options\n * @param {*} anything\n * @param {Object} options.size\n * @returns {any}\n ",
    ));

    assert!(doc.params.is_empty());
    assert_eq!(doc.returns, None);
    assert!(!doc.is_empty());
}

#[test]
fn first_annotation_wins() {
    let mut comments = comment("* @returns {uint8} ");
    comments.extend(comment("* @returns {uint16} "));

    assert_eq!(parse_doc(&comments).returns, Some(Type::u8()));
}
