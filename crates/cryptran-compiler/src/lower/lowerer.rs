//! Lowering state and entry points.

use cryptran_core::{Case, Type};
use indexmap::IndexMap;

use crate::analyze::infer::{complete, infer};
use crate::analyze::{InferCtx, Inferred, Origin, ProgramIndex, ScopeStack};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::source::{Expr, Span};
use crate::target::{ExprKind, Placeholder, TExpr};

use super::dialect::Dialect;
use super::names::{NameScopes, sanitize};

pub struct Lowerer<'a> {
    pub(super) index: &'a ProgramIndex,
    pub(super) dialect: &'static dyn Dialect,
    pub(super) naming: Case,
    pub(super) scope: ScopeStack,
    pub(super) names: NameScopes,
    /// Target spelling of local class members: class, then source member
    /// name (getters and setters under `get x` / `set x`).
    pub(super) members: IndexMap<String, IndexMap<String, String>>,
    /// Class whose body is being lowered.
    pub(super) class: Option<String>,
    /// Declared return type of the routine being lowered.
    pub(super) ret: Type,
    pub(super) diagnostics: Diagnostics,
    temps: u32,
}

impl<'a> Lowerer<'a> {
    pub fn new(index: &'a ProgramIndex, dialect: &'static dyn Dialect, naming: Option<Case>) -> Self {
        Self {
            index,
            dialect,
            naming: naming.unwrap_or_else(|| dialect.default_case()),
            scope: ScopeStack::new(),
            names: NameScopes::new(dialect),
            members: IndexMap::new(),
            class: None,
            ret: Type::void(),
            diagnostics: Diagnostics::new(),
            temps: 0,
        }
    }

    pub fn finish(self) -> Diagnostics {
        self.diagnostics
    }

    pub(super) fn cx(&self) -> InferCtx<'_> {
        InferCtx::new(&self.scope, self.index).in_class(self.class.as_deref())
    }

    /// Inferred type of a source expression, holes closed by the defaults.
    pub(super) fn type_of(&self, expr: &Expr) -> Type {
        self.inferred(expr).ty
    }

    pub(super) fn inferred(&self, expr: &Expr) -> Inferred {
        let found = infer(expr, &self.cx());
        complete(None, found, false)
    }

    pub(super) fn sanitize(&self, name: &str) -> String {
        sanitize(name, Some(self.naming), self.dialect)
    }

    /// Class, enum and record names keep their casing.
    pub(super) fn type_name(&self, name: &str) -> String {
        sanitize(name, None, self.dialect)
    }

    /// Enter a routine body: fresh type frame and name frame.
    pub(super) fn enter_routine(&mut self, closure: bool) {
        if closure {
            self.scope.push_closure();
        } else {
            self.scope.push();
        }
        self.names.push(true);
    }

    pub(super) fn exit_routine(&mut self) {
        self.scope.pop();
        self.names.pop();
    }

    pub(super) fn enter_block(&mut self) {
        self.scope.push();
        self.names.push(false);
    }

    pub(super) fn exit_block(&mut self) {
        self.scope.pop();
        self.names.pop();
    }

    /// Bind a local in both the type and the name scope; returns its target
    /// name.
    pub(super) fn declare_local(&mut self, source: &str, ty: Type, node_kind: &str) -> String {
        let natural = self.sanitize(source);
        let binding = self.names.declare(source, natural, &ty);
        if binding.renamed {
            self.diagnostics
                .report(DiagnosticKind::IdentifierRenamed, node_kind)
                .message(format!("{source}` is emitted as `{}", binding.name))
                .emit();
        }
        self.scope.declare(source, ty);
        binding.name
    }

    /// Target name of a visible source binding.
    pub(super) fn local_name(&self, source: &str) -> String {
        self.names
            .lookup(source)
            .map_or_else(|| self.sanitize(source), str::to_string)
    }

    pub(super) fn fresh_temp(&mut self, hint: &str) -> String {
        self.temps += 1;
        format!("{hint}{}", self.temps)
    }

    /// Record a declaration whose type came from the default rule.
    pub(super) fn note_origin(&mut self, name: &str, found: &Inferred, node_kind: &str) {
        if found.origin != Origin::Default {
            return;
        }
        log::warn!("`{name}` defaults to {}", found.ty);
        self.diagnostics
            .report(DiagnosticKind::InferenceFallback, node_kind)
            .message(name)
            .emit();
    }

    pub(super) fn unhandled(&mut self, kind: &str, reason: &str, span: Option<Span>) -> Placeholder {
        log::debug!("no rule for {kind}: {reason}");
        self.diagnostics
            .report(DiagnosticKind::UnhandledNode, kind)
            .message(format!("{kind} ({reason})"))
            .span(span)
            .emit();
        Placeholder::new(kind, reason)
    }

    pub(super) fn unsupported(&mut self, kind: &str, detail: &str, span: Option<Span>) -> Placeholder {
        self.diagnostics
            .report(DiagnosticKind::UnsupportedConstruct, kind)
            .message(detail)
            .span(span)
            .emit();
        Placeholder::new(kind, detail)
    }

    /// Placeholder expression for an unsupported construct, typed as the
    /// source expression would have been.
    pub(super) fn unsupported_expr(&mut self, expr: &Expr, detail: &str) -> TExpr {
        let ty = self.type_of(expr);
        let placeholder = self.unsupported(expr.kind(), detail, expr.span());
        TExpr::new(ExprKind::Placeholder(placeholder), ty)
    }

    pub(super) fn unhandled_expr(&mut self, expr: &Expr, reason: &str) -> TExpr {
        let ty = self.type_of(expr);
        let placeholder = self.unhandled(expr.kind(), reason, expr.span());
        TExpr::new(ExprKind::Placeholder(placeholder), ty)
    }
}
