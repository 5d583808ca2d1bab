//! Indentation-aware line buffer shared by the emitters.

use super::config::{BraceLayout, EmitterConfig};

/// Output buffer with one depth counter.
///
/// Depth changes only through [`Printer::indented`] (and the block helpers
/// built on it), which restores the entry depth when its closure returns.
/// The helpers take any `AsMut<Printer>` owner so an emitter can recurse
/// into its own methods inside the closure.
#[derive(Debug)]
pub struct Printer {
    out: String,
    depth: usize,
    indent_unit: String,
    newline: String,
    layout: BraceLayout,
}

impl Printer {
    pub fn new(config: &EmitterConfig) -> Self {
        Self {
            out: String::new(),
            depth: 0,
            indent_unit: config.indent_unit.clone(),
            newline: config.newline.clone(),
            layout: config.brace_layout,
        }
    }

    /// Empty buffer with the same settings, starting at the current depth.
    /// Used for multi-line expressions such as lambda bodies.
    pub fn nested(&self) -> Self {
        Self {
            out: String::new(),
            depth: self.depth,
            indent_unit: self.indent_unit.clone(),
            newline: self.newline.clone(),
            layout: self.layout,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn layout(&self) -> BraceLayout {
        self.layout
    }

    pub fn newline(&self) -> &str {
        &self.newline
    }

    pub fn indentation(&self) -> String {
        self.indent_unit.repeat(self.depth)
    }

    /// One line at the current depth. An empty line carries no indentation.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.out.push_str(&self.indent_unit);
            }
            self.out.push_str(text);
        }
        self.out.push_str(&self.newline);
    }

    /// One line a level shallower than the current depth: access
    /// specifiers, `case` labels.
    pub fn label(&mut self, text: impl AsRef<str>) {
        for _ in 1..self.depth {
            self.out.push_str(&self.indent_unit);
        }
        self.out.push_str(text.as_ref());
        self.out.push_str(&self.newline);
    }

    /// Blank separator line; never two in a row, never at the start.
    pub fn blank(&mut self) {
        let double = format!("{0}{0}", self.newline);
        if self.out.is_empty() || self.out.ends_with(&double) {
            return;
        }
        self.out.push_str(&self.newline);
    }

    /// Verbatim text, normalized to the configured newline.
    pub fn raw(&mut self, text: &str) {
        for line in text.lines() {
            self.out.push_str(line);
            self.out.push_str(&self.newline);
        }
    }

    /// Run `f` one level deeper; the entry depth is restored on return.
    pub fn indented<E, R>(e: &mut E, f: impl FnOnce(&mut E) -> R) -> R
    where
        E: AsMut<Printer>,
    {
        let entry = e.as_mut().depth;
        e.as_mut().depth = entry + 1;
        let result = f(e);
        e.as_mut().depth = entry;
        result
    }

    /// `open`, the body one level deeper, `close`; each on its own line.
    pub fn wrapped<E, R>(e: &mut E, open: &str, close: &str, f: impl FnOnce(&mut E) -> R) -> R
    where
        E: AsMut<Printer>,
    {
        e.as_mut().line(open);
        let result = Self::indented(e, f);
        e.as_mut().line(close);
        result
    }

    /// `head {` ... `}tail` with the body one level deeper.
    pub fn braced<E, R>(e: &mut E, head: &str, tail: &str, f: impl FnOnce(&mut E) -> R) -> R
    where
        E: AsMut<Printer>,
    {
        let p = e.as_mut();
        match p.layout {
            BraceLayout::SameLine if head.is_empty() => p.line("{"),
            BraceLayout::SameLine => p.line(format!("{head} {{")),
            BraceLayout::OwnLine => {
                if !head.is_empty() {
                    p.line(head);
                }
                p.line("{");
            }
        }
        let result = Self::indented(e, f);
        e.as_mut().line(format!("}}{tail}"));
        result
    }

    /// Continuation of a braced block just closed: `} else {` on one line,
    /// or `else` and `{` on their own lines.
    pub fn continued<E, R>(e: &mut E, head: &str, f: impl FnOnce(&mut E) -> R) -> R
    where
        E: AsMut<Printer>,
    {
        let p = e.as_mut();
        if p.layout == BraceLayout::OwnLine {
            return Self::braced(e, head, "", f);
        }
        p.trim_last_newline();
        p.out.push(' ');
        p.out.push_str(head);
        p.out.push_str(" {");
        let newline = p.newline.clone();
        p.out.push_str(&newline);
        let result = Self::indented(e, f);
        e.as_mut().line("}");
        result
    }

    fn trim_last_newline(&mut self) {
        if self.out.ends_with(&self.newline) {
            self.out.truncate(self.out.len() - self.newline.len());
        }
    }

    /// Contents without the final newline, for splicing into a line.
    pub fn into_inline(mut self) -> String {
        self.trim_last_newline();
        self.out
    }

    /// Contents with exactly one trailing newline.
    pub fn finish(mut self) -> String {
        while self.out.ends_with(&self.newline) {
            self.trim_last_newline();
        }
        self.out.push_str(&self.newline);
        self.out
    }
}

impl AsMut<Printer> for Printer {
    fn as_mut(&mut self) -> &mut Printer {
        self
    }
}
