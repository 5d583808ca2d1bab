use crate::source::Span;

/// What went wrong, ordered by how much it undermines the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    /// No lowering rule for a source node; a placeholder was emitted.
    UnhandledNode,
    /// Known node used in a way the targets cannot express.
    UnsupportedConstruct,
    /// A declaration's type came from the domain default.
    InferenceFallback,
    /// Two source names collided after sanitization.
    IdentifierRenamed,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::UnhandledNode | Self::UnsupportedConstruct => Severity::Error,
            Self::InferenceFallback | Self::IdentifierRenamed => Severity::Warning,
        }
    }

    /// Base message for this kind, used when no custom message is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::UnhandledNode => "no translation for node",
            Self::UnsupportedConstruct => "construct has no static equivalent",
            Self::InferenceFallback => "type could not be inferred",
            Self::IdentifierRenamed => "identifier renamed to avoid a collision",
        }
    }

    /// Template for custom messages. Contains `{}` placeholder for caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::UnhandledNode => "no translation for {}".to_string(),
            Self::InferenceFallback => "type of `{}` could not be inferred".to_string(),
            Self::IdentifierRenamed => "`{}`".to_string(),
            Self::UnsupportedConstruct => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// Render the final message.
    ///
    /// - `None` → returns `fallback_message()`
    /// - `Some(detail)` → returns `custom_message()` with `{}` replaced by detail
    pub fn message(&self, msg: Option<&str>) -> String {
        match msg {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub(crate) kind: DiagnosticKind,
    pub(crate) message: String,
    /// ESTree `type` of the offending node.
    pub(crate) node_kind: String,
    pub(crate) span: Option<Span>,
}

impl Diagnostic {
    pub(crate) fn with_default_message(kind: DiagnosticKind, node_kind: String) -> Self {
        Self {
            kind,
            message: kind.fallback_message().to_string(),
            node_kind,
            span: None,
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn node_kind(&self) -> &str {
        &self.node_kind
    }

    pub fn span(&self) -> Option<Span> {
        self.span
    }

    pub(crate) fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub(crate) fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.severity())?;
        if let Some(span) = self.span {
            write!(f, " at {}..{}", span.start, span.end)?;
        }
        write!(f, ": {} [{}]", self.message, self.node_kind)
    }
}
