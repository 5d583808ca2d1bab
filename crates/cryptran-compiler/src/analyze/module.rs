//! Module plumbing.
//!
//! Corpus files wrap their declarations in a UMD factory and guard it with
//! `require`/`module.exports` checks. This module flattens the factory body
//! into the effective top level and recognizes the plumbing statements that
//! have no counterpart in a compiled unit.

use crate::source::{Expr, Stmt};

/// Identifiers that only exist for module loading.
const LOADER_GLOBALS: &[&str] = &[
    "require",
    "module",
    "exports",
    "define",
    "global",
    "globalThis",
    "window",
    "self",
    "root",
];

/// Namespace objects whose members resolve against the framework catalogue.
pub const NAMESPACES: &[&str] = &["AlgorithmFramework", "OpCodes"];

/// Effective top-level statements: UMD factories are inlined and loader
/// plumbing is dropped.
pub fn top_level(body: &[Stmt]) -> Vec<&Stmt> {
    let mut out = Vec::new();
    collect(body, &mut out);
    out
}

fn collect<'a>(body: &'a [Stmt], out: &mut Vec<&'a Stmt>) {
    for stmt in body {
        if let Some(factory) = umd_factory(stmt) {
            log::debug!("inlining module factory body ({} statements)", factory.len());
            collect(factory, out);
            continue;
        }
        if is_plumbing(stmt) {
            log::debug!("dropping module plumbing: {}", stmt.kind());
            continue;
        }
        out.push(stmt);
    }
}

/// Body of the factory function in `(function (root, factory) {..})(this, function (..) {..})`.
fn umd_factory(stmt: &Stmt) -> Option<&[Stmt]> {
    let Stmt::ExpressionStatement { expression, .. } = stmt else {
        return None;
    };
    let Expr::CallExpression(call) = expression.unwrap_parens() else {
        return None;
    };
    let Expr::FunctionExpression(wrapper) = call.callee.unwrap_parens() else {
        return None;
    };

    let factory = call.arguments.iter().rev().find_map(|arg| match arg.unwrap_parens() {
        Expr::FunctionExpression(f) => Some(&f.body.body),
        _ => None,
    });

    match factory {
        Some(body) => Some(body.as_slice()),
        // Immediately-invoked wrapper without a factory argument.
        None if call.arguments.is_empty() => Some(wrapper.body.body.as_slice()),
        None => None,
    }
}

/// Statements that only serve module loading.
pub fn is_plumbing(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::ExpressionStatement {
            directive: Some(_), ..
        } => true,
        Stmt::ExpressionStatement { expression, .. } => is_plumbing_expr(expression),
        Stmt::IfStatement { test, .. } => mentions_loader(test),
        Stmt::VariableDeclaration(decl) => decl.declarations.iter().all(|d| match &d.init {
            Some(init) => is_module_reference(init),
            None => false,
        }),
        Stmt::ReturnStatement { .. } => true,
        Stmt::EmptyStatement {} => true,
        _ => false,
    }
}

fn is_plumbing_expr(expr: &Expr) -> bool {
    match expr.unwrap_parens() {
        Expr::Literal(lit) => lit.value.is_string(),
        Expr::AssignmentExpression { left, .. } => mentions_loader(left),
        Expr::CallExpression(call) => {
            call.callee.as_ident() == Some("require") || mentions_loader(&call.callee)
        }
        _ => false,
    }
}

/// `require(..)`, a namespace object, or a member of one.
fn is_module_reference(expr: &Expr) -> bool {
    match expr.unwrap_parens() {
        Expr::CallExpression(call) => call.callee.as_ident() == Some("require"),
        Expr::Identifier(id) => NAMESPACES.contains(&id.name.as_str()),
        Expr::MemberExpression { object, .. } => is_module_reference(object) || mentions_loader(object),
        Expr::LogicalExpression { left, right, .. } => {
            is_module_reference(left) || is_module_reference(right)
        }
        _ => false,
    }
}

/// True if any identifier in `expr` is a loader global.
fn mentions_loader(expr: &Expr) -> bool {
    match expr.unwrap_parens() {
        Expr::Identifier(id) => LOADER_GLOBALS.contains(&id.name.as_str()),
        Expr::MemberExpression {
            object, property, ..
        } => mentions_loader(object) || (property.as_ident().is_none() && mentions_loader(property)),
        Expr::UnaryExpression { argument, .. } => mentions_loader(argument),
        Expr::BinaryExpression { left, right, .. } | Expr::LogicalExpression { left, right, .. } => {
            mentions_loader(left) || mentions_loader(right)
        }
        Expr::CallExpression(call) => mentions_loader(&call.callee),
        _ => false,
    }
}
