//! Statements.

use super::CppEmitter;
use crate::emit::placeholder_note;
use crate::emit::printer::Printer;
use crate::target::{Case, Catch, Stmt, TExpr};

impl CppEmitter<'_> {
    pub(super) fn body(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    pub(super) fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(body) => Printer::braced(self, "", "", |e| e.body(body)),
            Stmt::VarDecl { .. } => {
                let decl = self.var_decl(stmt);
                self.p.line(format!("{decl};"));
            }
            Stmt::Expr(e) => {
                let text = self.expr(e);
                self.p.line(format!("{text};"));
            }
            Stmt::If { cond, then, els } => self.if_chain(cond, then, els.as_deref(), false),
            Stmt::For {
                init,
                cond,
                update,
                body,
            } => {
                let init = match init.as_deref() {
                    Some(decl @ Stmt::VarDecl { .. }) => self.var_decl(decl),
                    Some(Stmt::Expr(e)) => self.expr(e),
                    Some(other) => {
                        log::error!("unexpected for-loop initializer {other:?}");
                        String::new()
                    }
                    None => String::new(),
                };
                let cond = cond.as_ref().map(|c| self.expr(c)).unwrap_or_default();
                let update: Vec<String> = update.iter().map(|u| self.expr(u)).collect();
                let head = format!("for ({init}; {cond}; {})", update.join(", "));
                Printer::braced(self, &head, "", |e| e.body(body));
            }
            Stmt::ForEach {
                var,
                ty,
                iter,
                body,
            } => {
                let head = format!("for ({} {var} : {})", self.ty(ty), self.expr(iter));
                Printer::braced(self, &head, "", |e| e.body(body));
            }
            Stmt::While { cond, body } => {
                let head = format!("while ({})", self.expr(cond));
                Printer::braced(self, &head, "", |e| e.body(body));
            }
            Stmt::DoWhile { body, cond } => {
                let tail = format!(" while ({});", self.expr(cond));
                Printer::braced(self, "do", &tail, |e| e.body(body));
            }
            Stmt::Switch {
                subject,
                cases,
                default,
            } => self.switch(subject, cases, default.as_deref()),
            Stmt::Try {
                body,
                catch,
                finally,
            } => self.try_stmt(body, catch.as_ref(), finally.as_deref()),
            Stmt::Return(Some(value)) => {
                let value = self.expr(value);
                self.p.line(format!("return {value};"));
            }
            Stmt::Return(None) => self.p.line("return;"),
            Stmt::Throw(message) => {
                let message = self.expr(message);
                self.p.line(format!("throw std::runtime_error({message});"));
            }
            Stmt::Break => self.p.line("break;"),
            Stmt::Continue => self.p.line("continue;"),
            Stmt::Comment(text) => self.p.line(format!("// {text}")),
            Stmt::Placeholder(placeholder) => {
                let note = self.comment(&placeholder_note(placeholder));
                self.p.line(note);
            }
        }
    }

    /// `T name = init` without the semicolon; `T name{}` when there is no
    /// initializer.
    fn var_decl(&mut self, stmt: &Stmt) -> String {
        let Stmt::VarDecl { name, ty, init } = stmt else {
            return String::new();
        };
        let ty = self.ty(ty);
        match init {
            Some(init) => format!("{ty} {name} = {}", self.expr(init)),
            None => format!("{ty} {name}{{}}"),
        }
    }

    fn if_chain(&mut self, cond: &TExpr, then: &[Stmt], els: Option<&[Stmt]>, continued: bool) {
        let head = format!("if ({})", self.expr(cond));
        if continued {
            Printer::continued(self, &format!("else {head}"), |e| e.body(then));
        } else {
            Printer::braced(self, &head, "", |e| e.body(then));
        }
        match els {
            Some([Stmt::If { cond, then, els }]) => self.if_chain(cond, then, els.as_deref(), true),
            Some(els) => Printer::continued(self, "else", |e| e.body(els)),
            None => {}
        }
    }

    /// Integer and enum subjects use `switch`; strings and other values
    /// compare case by case.
    fn switch(&mut self, subject: &TExpr, cases: &[Case], default: Option<&[Stmt]>) {
        if !(subject.ty.is_integer() || self.is_enum(&subject.ty)) {
            return self.compare_chain(subject, cases, default);
        }
        let head = format!("switch ({})", self.expr(subject));
        Printer::braced(self, &head, "", |e| {
            for case in cases {
                let (last, rest) = case.labels.split_last().map_or((None, &[][..]), |(l, r)| (Some(l), r));
                for label in rest {
                    let label = e.expr(label);
                    e.p.line(format!("case {label}:"));
                }
                let Some(last) = last else { continue };
                let last = e.expr(last);
                e.case_body(&format!("case {last}:"), &case.body);
            }
            if let Some(default) = default {
                e.case_body("default:", default);
            }
        });
    }

    fn case_body(&mut self, label: &str, body: &[Stmt]) {
        Printer::braced(self, label, "", |e| {
            e.body(body);
            if !body.last().is_some_and(Stmt::is_terminal) {
                e.p.line("break;");
            }
        });
    }

    fn compare_chain(&mut self, subject: &TExpr, cases: &[Case], default: Option<&[Stmt]>) {
        let subject_text = self.operand(subject, super::exprs::EQUALITY + 1);
        let mut first = true;
        for case in cases {
            let tests: Vec<String> = case
                .labels
                .iter()
                .map(|label| {
                    let label = self.operand(label, super::exprs::EQUALITY + 1);
                    format!("{subject_text} == {label}")
                })
                .collect();
            let head = format!("if ({})", tests.join(" || "));
            let body = strip_break(&case.body);
            if first {
                Printer::braced(self, &head, "", |e| e.body(body));
                first = false;
            } else {
                Printer::continued(self, &format!("else {head}"), |e| e.body(body));
            }
        }
        if let Some(default) = default {
            let body = strip_break(default);
            if first {
                Printer::braced(self, "", "", |e| e.body(body));
            } else {
                Printer::continued(self, "else", |e| e.body(body));
            }
        }
    }

    /// C++ has no `finally`: the handler runs it on the error path and
    /// rethrows; the normal path runs it after the block.
    fn try_stmt(&mut self, body: &[Stmt], catch: Option<&Catch>, finally: Option<&[Stmt]>) {
        let guarded = |e: &mut Self| {
            Printer::braced(e, "try", "", |e| e.body(body));
            if let Some(catch) = catch {
                let head = format!("catch (const std::exception& {})", catch.name);
                Printer::continued(e, &head, |e| e.body(&catch.body));
            }
        };
        let Some(finally) = finally else {
            return guarded(self);
        };
        Printer::braced(self, "try", "", guarded);
        Printer::continued(self, "catch (...)", |e| {
            e.body(finally);
            e.p.line("throw;");
        });
        self.body(finally);
    }
}

/// Case bodies in an `if` chain have nothing to break out of.
fn strip_break(body: &[Stmt]) -> &[Stmt] {
    match body.split_last() {
        Some((Stmt::Break, rest)) => rest,
        _ => body,
    }
}
