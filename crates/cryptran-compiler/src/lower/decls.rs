//! Declarations: classes, members, free functions, globals and the unit's
//! init routine.

use cryptran_core::Type;
use indexmap::{IndexMap, IndexSet};

use crate::analyze::framework;
use crate::analyze::index::static_field_assignment;
use crate::analyze::infer::{complete, resolve};
use crate::analyze::module::top_level;
use crate::analyze::{Inferred, MethodInfo, Origin};
use crate::diagnostics::DiagnosticKind;
use crate::source::{Class, ClassMember, Comment, Expr, Function, MethodDef, Program, PropertyDef, Stmt, VarDecl, parse_doc};
use crate::target::{self as t, Item, MethodKind, Param, Qualifiers, Unit};

use super::lowerer::Lowerer;
use super::names::{accessor_name, is_constant_name};

/// Initializers of static fields assigned after the class body
/// (`Cipher.SBOX = [..];`), by class and field.
type StaticInits<'p> = IndexMap<(String, String), &'p Expr>;

impl Lowerer<'_> {
    /// Lower the effective top level of `program` into a unit. The unit and
    /// namespace names are left for the caller to fill in.
    pub fn lower_program(&mut self, program: &Program) -> Unit {
        let body = top_level(&program.body);
        log::debug!("lowering {} top-level statements", body.len());

        let mut unit = Unit::new("", "");
        unit.ref_types = self.ref_types();
        self.assign_member_names();
        for (name, ty) in self.index.globals() {
            self.declare_local(name, ty.clone(), "VariableDeclarator");
        }

        let mut statics: StaticInits<'_> = IndexMap::new();
        for stmt in &body {
            if let Some((class, field, value)) = static_field_assignment(stmt)
                && self.is_static_field(class, field)
            {
                statics.insert((class.to_string(), field.to_string()), value);
            }
        }

        for stmt in &body {
            match stmt {
                Stmt::ClassDeclaration(class) => self.class_decl(class, &statics, &mut unit),
                Stmt::FunctionDeclaration(func) => self.function_decl(func, &mut unit),
                Stmt::VariableDeclaration(decl) => self.global_decl(decl, &mut unit),
                stmt if static_field_assignment(stmt)
                    .is_some_and(|(class, field, _)| self.is_static_field(class, field)) => {}
                stmt => self.stmt(stmt, &[], &mut unit.init),
            }
        }
        log::debug!("lowered {} items", unit.items.len());
        unit
    }

    fn ref_types(&self) -> IndexSet<String> {
        let local = self.index.classes().map(|c| c.name.clone());
        let catalogue = framework().entries().filter(|e| e.is_class()).map(|e| e.name.clone());
        local.chain(catalogue).collect()
    }

    fn is_static_field(&self, class: &str, field: &str) -> bool {
        self.index
            .class(class)
            .and_then(|c| c.fields.get(field))
            .is_some_and(|f| f.is_static)
    }

    /// Fix the target spelling of every local class member up front, so uses
    /// that precede the declaration agree with it. Members inherited from a
    /// local base keep the base's spelling; framework members keep theirs.
    fn assign_member_names(&mut self) {
        let index = self.index;
        for class in index.classes() {
            let mut table: IndexMap<String, String> = IndexMap::new();
            let mut taken: IndexSet<String> = IndexSet::new();

            let mut keys: Vec<(String, String)> = Vec::new();
            for name in class.fields.keys().chain(class.methods.keys()) {
                if name != "constructor" {
                    keys.push((name.clone(), name.clone()));
                }
            }
            for name in class.getters.keys() {
                keys.push((format!("get {name}"), accessor_name("get", name, self.naming)));
            }
            for name in class.setters.keys() {
                keys.push((format!("set {name}"), accessor_name("set", name, self.naming)));
            }

            for (key, natural) in keys {
                let inherited = class
                    .base
                    .as_deref()
                    .and_then(|b| self.lineage_member(b, &key));
                let natural = match inherited {
                    Some(name) => name,
                    None if self.index.is_framework_member(&class.name, &key) => key.clone(),
                    None => self.sanitize(&natural),
                };
                let mut candidate = natural.clone();
                let mut n = 1;
                while !taken.insert(self.fold(&candidate)) {
                    n += 1;
                    candidate = format!("{natural}_{n}");
                }
                if candidate != natural {
                    self.diagnostics
                        .report(DiagnosticKind::IdentifierRenamed, "ClassBody")
                        .message(format!("{}.{key}` is emitted as `{candidate}", class.name))
                        .emit();
                }
                table.insert(key, candidate);
            }
            self.members.insert(class.name.clone(), table);
        }
    }

    /// Member spelling recorded for `key` on `class` or one of its local
    /// ancestors.
    fn lineage_member(&self, class: &str, key: &str) -> Option<String> {
        let mut next = Some(class);
        let mut depth = 0;
        while let Some(name) = next
            && depth < 32
        {
            if let Some(target) = self.members.get(name).and_then(|m| m.get(key)) {
                return Some(target.clone());
            }
            next = self.index.class(name).and_then(|c| c.base.as_deref());
            depth += 1;
        }
        None
    }

    fn fold(&self, name: &str) -> String {
        if self.dialect.case_insensitive() {
            name.to_ascii_lowercase()
        } else {
            name.to_string()
        }
    }

    fn class_decl(&mut self, class: &Class, statics: &StaticInits<'_>, unit: &mut Unit) {
        let Some(id) = &class.id else {
            let placeholder = self.unhandled("ClassDeclaration", "class without a name", None);
            unit.items.push(Item::Placeholder(placeholder));
            return;
        };
        let Some(info) = self.index.class(&id.name).cloned() else {
            return;
        };
        log::debug!("lowering class {}", id.name);
        self.class = Some(id.name.clone());

        let props: IndexMap<String, &PropertyDef> = class
            .body
            .body
            .iter()
            .filter_map(|m| match m {
                ClassMember::PropertyDefinition(prop) if !prop.computed => {
                    prop.key.key_name().map(|name| (name, prop))
                }
                _ => None,
            })
            .collect();

        let mut fields = Vec::new();
        for (name, field) in &info.fields {
            let prop = props.get(name);
            let value = statics
                .get(&(id.name.clone(), name.clone()))
                .copied()
                .or_else(|| prop.and_then(|p| p.value.as_ref()));
            self.note_origin(name, &Inferred::new(field.ty.clone(), field.origin), "PropertyDefinition");
            let init = value.map(|value| {
                self.enter_routine(false);
                let lowered = self.expr_as(value, &field.ty);
                self.exit_routine();
                lowered
            });
            let doc = prop.map(|p| parse_doc(&p.leading_comments).lines).unwrap_or_default();
            fields.push(t::Field {
                name: self.member_name(&id.name, name),
                ty: field.ty.clone(),
                is_static: field.is_static,
                is_const: field.is_static && is_constant_name(name) && init.is_some(),
                init,
                doc,
            });
        }

        let mut methods = Vec::new();
        for member in &class.body.body {
            match member {
                ClassMember::MethodDefinition(def) => {
                    if let Some(method) = self.method_decl(&id.name, def) {
                        methods.push(method);
                    }
                }
                ClassMember::PropertyDefinition(prop) if prop.computed => {
                    self.unsupported("PropertyDefinition", "computed class field name", None);
                }
                ClassMember::PropertyDefinition(_) => {}
                ClassMember::Unsupported(u) => {
                    self.unhandled(&u.kind, &u.reason, u.span);
                }
            }
        }

        self.class = None;
        unit.items.push(Item::Class(t::Class {
            name: self.type_name(&id.name),
            base: info.base.as_deref().map(|b| self.type_name(b)),
            doc: parse_doc(&class.leading_comments).lines,
            fields,
            methods,
        }));
    }

    fn method_decl(&mut self, class: &str, def: &MethodDef) -> Option<t::Method> {
        let Some(name) = (!def.computed).then(|| def.key.key_name()).flatten() else {
            self.unsupported("MethodDefinition", "computed method name", None);
            return None;
        };
        let index = self.index;
        let info = index.class(class)?;
        let (kind, found, target) = match def.kind.as_str() {
            "constructor" => (MethodKind::Constructor, info.constructor(), self.type_name(class)),
            "get" => (
                MethodKind::Getter,
                info.getters.get(&name),
                self.member_name(class, &format!("get {name}")),
            ),
            "set" => (
                MethodKind::Setter,
                info.setters.get(&name),
                self.member_name(class, &format!("set {name}")),
            ),
            _ => (MethodKind::Method, info.methods.get(&name), self.member_name(class, &name)),
        };
        let info = found?.clone();

        let inherited = match kind {
            MethodKind::Method if !def.is_static => self.index.inherited_method(class, &name),
            _ => None,
        };
        let is_override = inherited.is_some();
        let is_const = kind == MethodKind::Getter && returns_own_field(&def.value);

        let mut comments: Vec<Comment> = def.leading_comments.clone();
        comments.extend(def.value.leading_comments.iter().cloned());

        let body: &[Stmt] = &def.value.body.body;
        let (super_call, body) = match body.split_first() {
            Some((first, rest)) if kind == MethodKind::Constructor && is_super_call(first) => {
                (Some(first), rest)
            }
            _ => (None, body),
        };

        let ret = self.routine_ret(&info, &def.value);
        self.enter_routine(false);
        let params = self.params(&def.value, &info);
        let saved = std::mem::replace(&mut self.ret, ret.clone());
        let super_args = super_call.and_then(|stmt| self.super_args(class, stmt));
        let stmts = self.stmts(body);
        self.ret = saved;
        self.exit_routine();

        Some(t::Method {
            name: target,
            kind,
            params,
            ret,
            quals: Qualifiers {
                is_static: def.is_static,
                is_virtual: !def.is_static && !is_override && kind != MethodKind::Constructor,
                is_override,
                is_const,
            },
            super_args,
            body: stmts,
            doc: parse_doc(&comments).lines,
        })
    }

    /// Arguments of the leading `super(..)`, converted to the base
    /// constructor's parameter types when they are known.
    fn super_args(&mut self, class: &str, stmt: &Stmt) -> Option<Vec<t::TExpr>> {
        let Stmt::ExpressionStatement { expression, .. } = stmt else {
            return None;
        };
        let Expr::CallExpression(call) = expression.unwrap_parens() else {
            return None;
        };
        let params = self
            .index
            .base_of(class)
            .map(str::to_string)
            .and_then(|base| self.constructor_params(&base));
        Some(self.args(&call.arguments, params.as_deref()))
    }

    fn function_decl(&mut self, func: &Function, unit: &mut Unit) {
        let Some(id) = &func.id else {
            let placeholder = self.unhandled("FunctionDeclaration", "function without a name", func.span());
            unit.items.push(Item::Placeholder(placeholder));
            return;
        };
        let Some(info) = self.index.function_info(&id.name).cloned() else {
            return;
        };
        log::debug!("lowering function {}", id.name);

        let ret = self.routine_ret(&info, func);
        self.enter_routine(false);
        let params = self.params(func, &info);
        let saved = std::mem::replace(&mut self.ret, ret.clone());
        let body = self.stmts(&func.body.body);
        self.ret = saved;
        self.exit_routine();

        unit.items.push(Item::Function(t::Function {
            name: self.sanitize(&id.name),
            params,
            ret,
            body,
            doc: parse_doc(&func.leading_comments).lines,
        }));
    }

    /// Declared return type, with a body that never returns a value taken as
    /// `void`.
    fn routine_ret(&mut self, info: &MethodInfo, func: &Function) -> Type {
        let ret = &info.sig.ret;
        if !ret.contains_unknown() {
            return ret.clone();
        }
        if !self.returns_value(&func.body.body) {
            return Type::void();
        }
        let name = func.id.as_ref().map_or("return value", |id| id.name.as_str());
        let found = complete(None, Inferred::new(ret.clone(), info.ret_origin), false);
        self.note_origin(name, &found, "FunctionDeclaration");
        found.ty
    }

    /// Bind the parameters of a routine in the current frame. Defaults are
    /// kept; rest and destructured parameters are reported.
    fn params(&mut self, func: &Function, info: &MethodInfo) -> Vec<Param> {
        let mut out = Vec::with_capacity(func.params.len());
        for (i, param) in func.params.iter().enumerate() {
            let source = param.binding_name().unwrap_or("arg");
            let ty = info
                .sig
                .param_type(i)
                .cloned()
                .unwrap_or_else(|| complete(Some(source), Inferred::unknown(), false).ty);
            let origin = info.param_origins.get(i).copied().unwrap_or(Origin::Default);
            self.note_origin(source, &Inferred::new(ty.clone(), origin), param.kind());

            let default = match param {
                Expr::AssignmentPattern { right, .. } => Some(self.expr_as(right, &ty)),
                Expr::Identifier(_) => None,
                Expr::RestElement { .. } => {
                    self.unsupported("RestElement", "rest parameter", param.span());
                    None
                }
                other => {
                    self.unsupported(other.kind(), "destructuring parameter", other.span());
                    None
                }
            };
            let name = self.declare_local(source, ty.clone(), param.kind());
            out.push(Param { name, ty, default });
        }
        out
    }

    fn global_decl(&mut self, decl: &VarDecl, unit: &mut Unit) {
        let doc = parse_doc(&decl.leading_comments);
        for d in &decl.declarations {
            let Some(name) = d.id.as_ident() else {
                let placeholder = self.unsupported(d.id.kind(), "destructuring at module level", d.id.span());
                unit.items.push(Item::Placeholder(placeholder));
                continue;
            };
            let found = resolve(Some(name), d.init.as_ref(), doc.ty.as_ref(), &self.cx());
            self.note_origin(name, &found, "VariableDeclarator");
            let ty = match self.index.global(name) {
                Some(ty) if !ty.contains_unknown() => ty.clone(),
                _ => found.ty,
            };
            let init = d.init.as_ref().map(|init| self.expr_as(init, &ty));
            unit.items.push(Item::Global(t::Global {
                name: self.local_name(name),
                ty,
                init,
                is_const: decl.kind == "const",
                doc: doc.lines.clone(),
            }));
        }
    }
}

fn is_super_call(stmt: &Stmt) -> bool {
    let Stmt::ExpressionStatement { expression, .. } = stmt else {
        return false;
    };
    matches!(
        expression.unwrap_parens(),
        Expr::CallExpression(call) if matches!(call.callee.unwrap_parens(), Expr::Super {})
    )
}

/// `get x() { return this.x_; }`
fn returns_own_field(func: &Function) -> bool {
    matches!(
        func.body.body.as_slice(),
        [Stmt::ReturnStatement { argument: Some(value) }] if value.as_this_member().is_some()
    )
}
