//! Interface declarations, routine bodies and the load-time routine.

use cryptran_core::Type;

use super::PascalEmitter;
use crate::emit::printer::Printer;
use crate::emit::{classes_base_first, placeholder_note};
use crate::target::{
    Class, ExprKind, Function, Global, Item, Method, MethodKind, Param, Stmt, TExpr,
};

impl<'a> PascalEmitter<'a> {
    pub(super) fn interface(&mut self) {
        let unit = self.unit;
        let classes = classes_base_first(unit);
        if !classes.is_empty() {
            self.p.line("type");
            Printer::indented(self, |e| {
                if classes.len() > 1 {
                    for &class in &classes {
                        e.p.line(format!("{} = class;", class.name));
                    }
                    e.p.blank();
                }
                for &class in &classes {
                    e.class_decl(class);
                    e.p.blank();
                }
            });
        }

        let (consts, vars): (Vec<&Global>, Vec<&Global>) =
            globals(unit.items.iter()).partition(|g| is_constant(g));
        if !consts.is_empty() {
            self.p.line("const");
            Printer::indented(self, |e| {
                for global in consts {
                    e.doc(&global.doc);
                    let ty = e.ty(&global.ty);
                    let value = global.init.as_ref().map(|v| e.expr(v)).unwrap_or_default();
                    e.p.line(format!("{}: {ty} = {value};", global.name));
                }
            });
            self.p.blank();
        }
        if !vars.is_empty() {
            self.p.line("var");
            Printer::indented(self, |e| {
                for global in vars {
                    e.doc(&global.doc);
                    let ty = e.ty(&global.ty);
                    e.p.line(format!("{}: {ty};", global.name));
                }
            });
            self.p.blank();
        }

        for item in &unit.items {
            match item {
                Item::Function(function) => {
                    self.doc(&function.doc);
                    let head = self.routine_head(None, function_sig(function), true);
                    self.p.line(format!("{head};"));
                }
                Item::Placeholder(placeholder) => {
                    let note = self.comment(&placeholder_note(placeholder));
                    self.p.line(note);
                }
                Item::Class(_) | Item::Global(_) => {}
            }
        }
    }

    pub(super) fn implementation(&mut self) {
        let unit = self.unit;
        for &class in &classes_base_first(unit) {
            self.class = Some(class);
            for method in &class.methods {
                self.method_impl(class, method);
                self.p.blank();
            }
            if needs_default_constructor(class) {
                let prologue = self.constructor_prologue(class, None);
                self.p.line(format!("constructor {}.Create;", class.name));
                self.routine_body(&prologue, &[], "end;");
                self.p.blank();
            }
            self.class = None;
        }

        for item in &unit.items {
            if let Item::Function(function) = item {
                let head = self.routine_head(None, function_sig(function), false);
                self.p.line(format!("{head};"));
                self.routine_body(&[], &function.body, "end;");
                self.p.blank();
            }
        }

        let mut prologue = Vec::new();
        for &class in &classes_base_first(unit) {
            for field in class.fields.iter().filter(|f| f.is_static) {
                if let Some(init) = &field.init {
                    let value = self.expr(init);
                    prologue.push(format!("{}.{} := {value};", class.name, field.name));
                }
            }
        }
        for global in globals(unit.items.iter()).filter(|g| !is_constant(g)) {
            if let Some(init) = &global.init {
                let value = self.expr(init);
                prologue.push(format!("{} := {value};", global.name));
            }
        }
        if prologue.is_empty() && unit.init.is_empty() {
            return;
        }

        let routine = format!("Register{}", self.unit_name());
        self.p.line("{ Top-level statements of the source module, run once at load time. }");
        self.p.line(format!("procedure {routine};"));
        self.routine_body(&prologue, &unit.init, "end;");
        self.p.blank();
        self.p.line("initialization");
        Printer::indented(self, |e| e.p.line(format!("{routine};")));
    }

    pub(super) fn doc(&mut self, doc: &[String]) {
        for line in doc {
            self.p.line(format!("/// {line}").trim_end());
        }
    }

    fn class_decl(&mut self, class: &'a Class) {
        self.class = Some(class);
        self.doc(&class.doc);
        let head = match &class.base {
            Some(base) => format!("{} = class({base})", class.name),
            None => format!("{} = class", class.name),
        };
        Printer::wrapped(self, &head, "end;", |e| {
            e.p.label("public");
            for field in class.fields.iter().filter(|f| !f.is_static) {
                e.doc(&field.doc);
                let ty = e.ty(&field.ty);
                e.p.line(format!("{}: {ty};", field.name));
            }
            for field in class.fields.iter().filter(|f| f.is_static) {
                e.doc(&field.doc);
                let ty = e.ty(&field.ty);
                e.p.line(format!("class var {}: {ty};", field.name));
            }
            if !class.fields.is_empty() && !class.methods.is_empty() {
                e.p.blank();
            }
            for method in &class.methods {
                e.doc(&method.doc);
                let head = e.routine_head(None, method_sig(method), true);
                let directives = directives(method);
                e.p.line(format!("{head};{directives}"));
            }
            if needs_default_constructor(class) {
                e.p.line("constructor Create;");
            }
        });
        self.class = None;
    }

    fn method_impl(&mut self, class: &'a Class, method: &'a Method) {
        let head = self.routine_head(Some(&class.name), method_sig(method), false);
        self.p.line(format!("{head};"));
        let prologue = match method.kind {
            MethodKind::Constructor => self.constructor_prologue(class, method.super_args.as_deref()),
            _ => Vec::new(),
        };
        self.routine_body(&prologue, &method.body, "end;");
    }

    /// `inherited Create(..)` then the instance field initializers.
    fn constructor_prologue(&mut self, class: &Class, super_args: Option<&[TExpr]>) -> Vec<String> {
        let mut lines = Vec::new();
        match (super_args, &class.base) {
            (Some(args), Some(_)) => {
                let args = self.args(args);
                lines.push(format!("inherited Create({args});"));
            }
            (None, Some(_)) => lines.push("inherited Create;".to_string()),
            _ => {}
        }
        for field in class.fields.iter().filter(|f| !f.is_static) {
            if let Some(init) = &field.init {
                let value = self.expr(init);
                lines.push(format!("{} := {value};", field.name));
            }
        }
        lines
    }

    /// `function Owner.Name(A: T; B: U): R` without the semicolon.
    pub(super) fn routine_head(&mut self, owner: Option<&str>, sig: Sig<'_>, defaults: bool) -> String {
        let qualifier = owner.map(|o| format!("{o}.")).unwrap_or_default();
        let params = self.params(sig.params, defaults);
        let params = if params.is_empty() {
            String::new()
        } else {
            format!("({params})")
        };
        let class = if sig.is_static { "class " } else { "" };
        match sig.kind {
            MethodKind::Constructor => format!("constructor {qualifier}Create{params}"),
            MethodKind::Destructor => format!("destructor {qualifier}Destroy"),
            _ if sig.ret.is_void() => {
                format!("{class}procedure {qualifier}{}{params}", sig.name)
            }
            _ => format!(
                "{class}function {qualifier}{}{params}: {}",
                sig.name,
                self.ty(sig.ret)
            ),
        }
    }

    pub(super) fn params(&mut self, params: &[Param], defaults: bool) -> String {
        let mut out = Vec::with_capacity(params.len());
        for param in params {
            let mut text = format!("{}: {}", param.name, self.ty(&param.ty));
            if defaults && let Some(default) = &param.default {
                text.push_str(&format!(" = {}", self.expr(default)));
            }
            out.push(text);
        }
        out.join("; ")
    }

    /// Hoisted `var` section, then `begin` .. `close`.
    pub(super) fn routine_body(&mut self, prologue: &[String], body: &[Stmt], close: &str) {
        let mut locals: Vec<(&str, &Type)> = Vec::new();
        collect_locals(body, &mut locals);
        if !locals.is_empty() {
            self.p.line("var");
            Printer::indented(self, |e| {
                for (name, ty) in &locals {
                    let ty = e.ty(ty);
                    e.p.line(format!("{name}: {ty};"));
                }
            });
        }
        let saved = std::mem::take(&mut self.loop_updates);
        Printer::wrapped(self, "begin", close, |e| {
            for line in prologue {
                e.p.line(line);
            }
            e.body(body);
        });
        self.loop_updates = saved;
    }
}

/// The parts of a routine the heading needs.
#[derive(Clone, Copy)]
pub(super) struct Sig<'s> {
    pub(super) kind: MethodKind,
    pub(super) name: &'s str,
    pub(super) params: &'s [Param],
    pub(super) ret: &'s Type,
    pub(super) is_static: bool,
}

fn method_sig(method: &Method) -> Sig<'_> {
    Sig {
        kind: method.kind,
        name: &method.name,
        params: &method.params,
        ret: &method.ret,
        is_static: method.quals.is_static,
    }
}

fn function_sig(function: &Function) -> Sig<'_> {
    Sig {
        kind: MethodKind::Method,
        name: &function.name,
        params: &function.params,
        ret: &function.ret,
        is_static: false,
    }
}

fn directives(method: &Method) -> &'static str {
    let quals = method.quals;
    match method.kind {
        MethodKind::Destructor => " override;",
        MethodKind::Constructor => "",
        _ if quals.is_static => " static;",
        _ if quals.is_override => " override;",
        _ if quals.is_virtual => " virtual;",
        _ => "",
    }
}

/// Instance fields with initializers and no constructor to run them.
fn needs_default_constructor(class: &Class) -> bool {
    class.fields.iter().any(|f| !f.is_static && f.init.is_some())
        && !class.methods.iter().any(|m| m.kind == MethodKind::Constructor)
}

fn globals<'u>(items: impl Iterator<Item = &'u Item>) -> impl Iterator<Item = &'u Global> {
    items.filter_map(|item| match item {
        Item::Global(global) => Some(global),
        _ => None,
    })
}

/// A typed constant: a `const` scalar with a literal value.
fn is_constant(global: &Global) -> bool {
    global.is_const
        && global
            .init
            .as_ref()
            .is_some_and(|init| matches!(init.kind, ExprKind::Literal(_)) || init.int_value().is_some())
}

/// Every local a routine body declares, first declaration wins. Lambda
/// bodies keep their own `var` sections.
fn collect_locals<'s>(body: &'s [Stmt], out: &mut Vec<(&'s str, &'s Type)>) {
    let add = |name: &'s str, ty: &'s Type, out: &mut Vec<(&'s str, &'s Type)>| {
        if !out.iter().any(|(n, _)| n.eq_ignore_ascii_case(name)) {
            out.push((name, ty));
        }
    };
    for stmt in body {
        match stmt {
            Stmt::VarDecl { name, ty, .. } => add(name, ty, out),
            Stmt::Block(inner) | Stmt::While { body: inner, .. } | Stmt::DoWhile { body: inner, .. } => {
                collect_locals(inner, out);
            }
            Stmt::If { then, els, .. } => {
                collect_locals(then, out);
                if let Some(els) = els {
                    collect_locals(els, out);
                }
            }
            Stmt::For { init, body, .. } => {
                if let Some(init) = init {
                    collect_locals(std::slice::from_ref(init.as_ref()), out);
                }
                collect_locals(body, out);
            }
            Stmt::ForEach { var, ty, body, .. } => {
                add(var, ty, out);
                collect_locals(body, out);
            }
            Stmt::Switch { cases, default, .. } => {
                for case in cases {
                    collect_locals(&case.body, out);
                }
                if let Some(default) = default {
                    collect_locals(default, out);
                }
            }
            Stmt::Try {
                body,
                catch,
                finally,
            } => {
                collect_locals(body, out);
                if let Some(catch) = catch {
                    collect_locals(&catch.body, out);
                }
                if let Some(finally) = finally {
                    collect_locals(finally, out);
                }
            }
            Stmt::Expr(_)
            | Stmt::Return(_)
            | Stmt::Throw(_)
            | Stmt::Break
            | Stmt::Continue
            | Stmt::Comment(_)
            | Stmt::Placeholder(_) => {}
        }
    }
}
