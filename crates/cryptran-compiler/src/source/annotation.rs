//! Doc comment annotations.
//!
//! Two styles are recognized, and may be mixed in one comment:
//!
//! ```text
//! /**
//!  * Rotate left
//!  * @param {number} value - word to rotate
//!  * @param {number} positions
//!  * @returns {number}
//!  */
//! ```
//!
//! ```text
//! /**
//!  * Rotate left
//!
//! Parameters:
//!   value (int32): word to rotate
//!   positions (byte): bit count
//!
//! Returns: int32
//!  */
//! ```
//!
//! In the second style the integer names denote machine words, so signed
//! spellings resolve to the unsigned type of the same width.

use cryptran_core::{Primitive, Type, parse_type};
use indexmap::IndexMap;

use super::ast::Comment;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DocComment {
    /// Cleaned comment lines, for re-emission as a target comment block.
    pub lines: Vec<String>,
    pub params: IndexMap<String, Type>,
    pub returns: Option<Type>,
    /// `@type {T}` on a variable, field or property.
    pub ty: Option<Type>,
}

impl DocComment {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn param(&self, name: &str) -> Option<&Type> {
        self.params.get(name)
    }
}

/// Collect annotations from the comments attached to a declaration.
pub fn parse_doc(comments: &[Comment]) -> DocComment {
    let mut doc = DocComment::default();
    for comment in comments {
        parse_comment(&comment.value, &mut doc);
    }
    doc
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Body,
    Parameters,
}

fn parse_comment(text: &str, doc: &mut DocComment) {
    let mut section = Section::Body;

    for raw in text.lines() {
        let line = clean_line(raw);
        if !(line.is_empty() && doc.lines.is_empty()) {
            doc.lines.push(line.to_string());
        }

        if line.is_empty() {
            section = Section::Body;
            continue;
        }

        if let Some(rest) = line.strip_prefix('@') {
            section = Section::Body;
            parse_tag(rest, doc);
            continue;
        }

        if line.eq_ignore_ascii_case("parameters:") || line.eq_ignore_ascii_case("params:") {
            section = Section::Parameters;
            continue;
        }

        if let Some(rest) = strip_prefix_ignore_case(line, "returns:") {
            section = Section::Body;
            if let Some(ty) = word_type(rest) {
                doc.returns.get_or_insert(ty);
            }
            continue;
        }

        if section == Section::Parameters
            && let Some((name, ty)) = parse_parameter_line(line)
        {
            doc.params.entry(name).or_insert(ty);
        }
    }

    while doc.lines.last().is_some_and(|l| l.is_empty()) {
        doc.lines.pop();
    }
}

fn clean_line(raw: &str) -> &str {
    let line = raw.trim();
    let line = line.strip_prefix('*').unwrap_or(line);
    line.trim()
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| line[prefix.len()..].trim())
}

fn parse_tag(rest: &str, doc: &mut DocComment) {
    let (tag, body) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let body = body.trim();

    match tag {
        "param" | "arg" | "argument" => {
            let Some((ty, after)) = braced_type(body) else {
                return;
            };
            let Some(name) = param_name(after) else {
                return;
            };
            if let Some(ty) = parse_annotation_type(ty) {
                doc.params.entry(name).or_insert(ty);
            }
        }
        "returns" | "return" => {
            if let Some(ty) = braced_type(body).and_then(|(ty, _)| parse_annotation_type(ty)) {
                doc.returns.get_or_insert(ty);
            }
        }
        "type" => {
            if let Some(ty) = braced_type(body).and_then(|(ty, _)| parse_annotation_type(ty)) {
                doc.ty.get_or_insert(ty);
            }
        }
        _ => {}
    }
}

/// Split `{T} rest` into `T` and `rest`, honouring nested braces.
fn braced_type(body: &str) -> Option<(&str, &str)> {
    let inner = body.strip_prefix('{')?;
    let mut depth = 1usize;
    for (i, c) in inner.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((inner[..i].trim(), inner[i + 1..].trim()));
                }
            }
            _ => {}
        }
    }
    None
}

/// `name`, `[name]` or `[name=default]`, followed by an optional description.
/// Dotted names document members of an options object and are skipped.
fn param_name(after: &str) -> Option<String> {
    let word = after.split_whitespace().next()?;
    let word = word.trim_start_matches('[');
    let word = word.split(['=', ']']).next()?;
    if word.is_empty() || word.contains('.') {
        return None;
    }
    Some(word.to_string())
}

/// `name (T): description`
fn parse_parameter_line(line: &str) -> Option<(String, Type)> {
    let (name, rest) = line.split_once('(')?;
    let name = name.trim();
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$') {
        return None;
    }
    let (ty, _) = rest.split_once(')')?;
    let ty = word_type(ty)?;
    Some((name.to_string(), ty))
}

fn word_type(text: &str) -> Option<Type> {
    let text = text.trim();
    let ty = parse_annotation_type(text).or_else(|| {
        let first = text.split_whitespace().next()?;
        parse_annotation_type(first)
    })?;
    Some(unsigned_words(ty))
}

fn parse_annotation_type(text: &str) -> Option<Type> {
    match parse_type(text) {
        Ok(ty) if !ty.contains_unknown() => Some(ty),
        Ok(_) => None,
        Err(e) => {
            log::debug!("ignoring annotation type `{text}`: {e}");
            None
        }
    }
}

fn unsigned_words(ty: Type) -> Type {
    match ty {
        Type::Primitive(Primitive::Int { width, .. }) => Type::int(width, false),
        Type::Sequence(inner) => Type::seq(unsigned_words(*inner)),
        Type::Optional(inner) => Type::optional(unsigned_words(*inner)),
        other => other,
    }
}
