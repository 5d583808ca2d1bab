//! Diagnostics collected while lowering.
//!
//! A run never aborts on unexpected input shapes. Everything that could not be
//! translated faithfully is reported here, and an empty collection is the
//! only guarantee that the emitted text is a trustworthy translation.

mod message;
mod printer;

#[cfg(test)]
mod tests;

pub use message::{Diagnostic, DiagnosticKind, Severity};
pub use printer::DiagnosticsPrinter;

use crate::source::Span;

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    messages: Vec<Diagnostic>,
}

#[must_use = "diagnostic not emitted, call .emit()"]
pub struct DiagnosticBuilder<'a> {
    diagnostics: &'a mut Diagnostics,
    message: Diagnostic,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Create a diagnostic with the given kind, naming the source node kind
    /// that triggered it.
    ///
    /// Uses the kind's default message. Call `.message()` on the builder to
    /// provide detail.
    pub fn report(
        &mut self,
        kind: DiagnosticKind,
        node_kind: impl Into<String>,
    ) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            diagnostics: self,
            message: Diagnostic::with_default_message(kind, node_kind.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.messages.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|d| d.is_error())
    }

    pub fn has_warnings(&self) -> bool {
        self.messages.iter().any(|d| d.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_warning()).count()
    }

    /// Number of diagnostics of the given kind.
    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.messages.iter().filter(|d| d.kind == kind).count()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.messages.extend(other.messages);
    }

    pub fn render(&self) -> String {
        self.printer().render()
    }

    pub fn render_colored(&self, source: Option<&str>, colored: bool) -> String {
        let printer = self.printer().colored(colored);
        match source {
            Some(source) => printer.source(source).render(),
            None => printer.render(),
        }
    }
}

impl<'a> DiagnosticBuilder<'a> {
    /// Provide custom detail for this diagnostic, rendered using the kind's template.
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        let detail = msg.into();
        self.message.message = self.message.kind.message(Some(&detail));
        self
    }

    pub fn span(mut self, span: Option<Span>) -> Self {
        self.message.span = span;
        self
    }

    pub fn emit(self) {
        self.diagnostics.messages.push(self.message);
    }
}
