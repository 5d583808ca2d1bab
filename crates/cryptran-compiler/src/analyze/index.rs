//! Declaration pre-pass.
//!
//! Collects every class, function and module-level binding before any body
//! is lowered, so a use may precede its declaration. Resolution runs in
//! three passes: parameter signatures (annotation, then an overridden
//! framework method, then heuristics), field types (from every `this.x = ..`
//! in the constructor first and the other methods after), then return types.
//! The field and return passes run twice so that members defined in terms of
//! each other settle.

use cryptran_core::Type;
use indexmap::IndexMap;

use crate::source::{
    Class, ClassMember, Comment, DocComment, Expr, ForInit, Function, MethodDef, Program, Stmt,
    VarDecl, parse_doc,
};

use super::framework::{MethodSig, framework};
use super::heuristics;
use super::infer::{InferCtx, Inferred, Origin, complete, constructed_name, infer, member_of, resolve};
use super::module::{NAMESPACES, top_level};
use super::scope::ScopeStack;

#[derive(Clone, Debug, PartialEq)]
pub struct FieldInfo {
    pub ty: Type,
    pub origin: Origin,
    pub is_static: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberKind {
    Constructor,
    Method,
    Getter,
    Setter,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MethodInfo {
    pub sig: MethodSig,
    pub kind: MemberKind,
    pub is_static: bool,
    pub param_origins: Vec<Origin>,
    pub ret_origin: Origin,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassInfo {
    pub name: String,
    pub base: Option<String>,
    pub fields: IndexMap<String, FieldInfo>,
    /// Plain methods and the constructor (under `constructor`).
    pub methods: IndexMap<String, MethodInfo>,
    pub getters: IndexMap<String, MethodInfo>,
    pub setters: IndexMap<String, MethodInfo>,
}

impl ClassInfo {
    fn new(name: &str, base: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            base,
            fields: IndexMap::new(),
            methods: IndexMap::new(),
            getters: IndexMap::new(),
            setters: IndexMap::new(),
        }
    }

    pub fn constructor(&self) -> Option<&MethodInfo> {
        self.methods.get("constructor")
    }
}

#[derive(Clone, Debug, Default)]
pub struct ProgramIndex {
    classes: IndexMap<String, ClassInfo>,
    functions: IndexMap<String, MethodInfo>,
    globals: IndexMap<String, Type>,
}

impl ProgramIndex {
    pub fn build(program: &Program) -> Self {
        let body = top_level(&program.body);
        let mut index = Self::default();

        for stmt in &body {
            match stmt {
                Stmt::ClassDeclaration(class) => index.declare_class(class),
                Stmt::FunctionDeclaration(func) => {
                    if let Some(id) = &func.id {
                        let info = index.signature(func, &func.leading_comments, None, MemberKind::Method, false);
                        index.functions.insert(id.name.clone(), info);
                    }
                }
                _ => {}
            }
        }

        for _ in 0..2 {
            index.resolve_fields(&body);
            index.resolve_globals(&body);
            index.resolve_returns(&body);
        }

        log::debug!(
            "indexed {} classes, {} functions, {} globals",
            index.classes.len(),
            index.functions.len(),
            index.globals.len()
        );
        index
    }

    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.values()
    }

    pub fn function(&self, name: &str) -> Option<&MethodSig> {
        self.functions.get(name).map(|f| &f.sig)
    }

    pub fn function_info(&self, name: &str) -> Option<&MethodInfo> {
        self.functions.get(name)
    }

    pub fn functions(&self) -> impl Iterator<Item = (&str, &MethodInfo)> {
        self.functions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn global(&self, name: &str) -> Option<&Type> {
        self.globals.get(name)
    }

    pub fn globals(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.globals.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Direct base of a local or framework class.
    pub fn base_of(&self, name: &str) -> Option<&str> {
        match self.classes.get(name) {
            Some(class) => class.base.as_deref(),
            None => framework().get(name).and_then(|e| e.base.as_deref()),
        }
    }

    /// Local classes from `name` up, stopping at the first non-local base.
    fn local_lineage<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ClassInfo> + 'a {
        let mut next = self.classes.get(name);
        let mut guard = 0;
        std::iter::from_fn(move || {
            let class = next?;
            guard += 1;
            next = if guard < 32 {
                class.base.as_deref().and_then(|b| self.classes.get(b))
            } else {
                None
            };
            Some(class)
        })
    }

    /// First framework class in the lineage of `name`, possibly `name`
    /// itself.
    pub fn framework_ancestor<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if self.classes.get(name).is_none() {
            return framework().get(name).map(|e| e.name.as_str());
        }
        let last = self.local_lineage(name).last()?;
        let base = last.base.as_deref()?;
        framework().get(base).map(|e| e.name.as_str())
    }

    pub fn is_subclass_of(&self, name: &str, ancestor: &str) -> bool {
        if self.local_lineage(name).any(|c| c.name == ancestor) {
            return true;
        }
        self.framework_ancestor(name)
            .is_some_and(|kb| framework().is_subtype(kb, ancestor))
    }

    /// Classes and framework classes are reference types; records and enums
    /// are values.
    pub fn is_ref_type(&self, name: &str) -> bool {
        self.classes.contains_key(name) || framework().is_class(name)
    }

    /// Type of a field or getter, searching local classes before the
    /// framework.
    pub fn member_type(&self, owner: &str, name: &str) -> Option<Inferred> {
        for class in self.local_lineage(owner) {
            if let Some(field) = class.fields.get(name) {
                return Some(Inferred::new(field.ty.clone(), field.origin));
            }
            if let Some(getter) = class.getters.get(name) {
                return Some(Inferred::new(getter.sig.ret.clone(), getter.ret_origin));
            }
        }
        let kb = self.framework_ancestor(owner)?;
        framework()
            .field(kb, name)
            .map(|ty| Inferred::framework(ty.clone()))
    }

    pub fn method_sig(&self, owner: &str, name: &str) -> Option<MethodSig> {
        for class in self.local_lineage(owner) {
            if let Some(method) = class.methods.get(name) {
                return Some(method.sig.clone());
            }
        }
        let kb = self.framework_ancestor(owner)?;
        framework().method(kb, name).map(|(_, sig)| sig.clone())
    }

    /// True if `name` on `owner` is declared by the framework, so it keeps
    /// the framework's spelling.
    pub fn is_framework_member(&self, owner: &str, name: &str) -> bool {
        let Some(kb) = self.framework_ancestor(owner) else {
            return false;
        };
        let catalogue = framework();
        catalogue.field(kb, name).is_some() || catalogue.method(kb, name).is_some()
    }

    /// Signature of `method` as declared by a strict ancestor of `class`.
    pub fn inherited_method(&self, class: &str, method: &str) -> Option<MethodSig> {
        let base = self.base_of(class)?.to_string();
        self.method_sig(&base, method)
    }

    fn declare_class(&mut self, class: &Class) {
        let Some(id) = &class.id else {
            return;
        };
        let base = class.super_class.as_deref().and_then(constructed_name).map(str::to_string);
        // Register the shell first so signatures can see the base chain.
        self.classes.insert(id.name.clone(), ClassInfo::new(&id.name, base));

        for member in &class.body.body {
            match member {
                ClassMember::MethodDefinition(def) => self.declare_method(&id.name, def),
                ClassMember::PropertyDefinition(prop) => {
                    let Some(name) = (!prop.computed).then(|| prop.key.key_name()).flatten() else {
                        continue;
                    };
                    let doc = parse_doc(&prop.leading_comments);
                    let scope = ScopeStack::new();
                    let cx = InferCtx::new(&scope, self).in_class(Some(&id.name));
                    let found = resolve(Some(&name), prop.value.as_ref(), doc.ty.as_ref(), &cx);
                    let field = FieldInfo {
                        ty: found.ty,
                        origin: found.origin,
                        is_static: prop.is_static,
                    };
                    if let Some(class) = self.classes.get_mut(&id.name) {
                        class.fields.insert(name, field);
                    }
                }
                ClassMember::Unsupported(u) => {
                    log::debug!("skipping class member {} in {}", u.kind, id.name);
                }
            }
        }
    }

    fn declare_method(&mut self, class: &str, def: &MethodDef) {
        let Some(name) = (!def.computed).then(|| def.key.key_name()).flatten() else {
            return;
        };
        let kind = match def.kind.as_str() {
            "constructor" => MemberKind::Constructor,
            "get" => MemberKind::Getter,
            "set" => MemberKind::Setter,
            _ => MemberKind::Method,
        };

        let mut comments = def.leading_comments.clone();
        comments.extend(def.value.leading_comments.iter().cloned());

        let inherited = match kind {
            MemberKind::Method => self.inherited_method(class, &name),
            _ => None,
        };
        let mut info = self.signature(&def.value, &comments, inherited.as_ref(), kind, def.is_static);

        if kind == MemberKind::Setter
            && let Some(found) = self.base_of(class).and_then(|b| self.member_type(b, &name))
            && let Some(first) = info.sig.params.first_mut()
            && info.param_origins.first() != Some(&Origin::Annotation)
        {
            first.1 = found.ty;
            info.param_origins[0] = found.origin;
        }

        let Some(entry) = self.classes.get_mut(class) else {
            return;
        };
        match kind {
            MemberKind::Getter => {
                entry.getters.insert(name, info);
            }
            MemberKind::Setter => {
                entry.setters.insert(name, info);
            }
            _ => {
                entry.methods.insert(name, info);
            }
        }
    }

    /// Parameter types and, where already known, the return type.
    fn signature(
        &self,
        func: &Function,
        comments: &[Comment],
        inherited: Option<&MethodSig>,
        kind: MemberKind,
        is_static: bool,
    ) -> MethodInfo {
        let doc = parse_doc(comments);
        let scope = ScopeStack::new();
        let cx = InferCtx::new(&scope, self);

        let mut params = Vec::new();
        let mut param_origins = Vec::new();
        for (i, param) in func.params.iter().enumerate() {
            let name = param.binding_name().unwrap_or("arg").to_string();
            // An override keeps its ancestor's signature over any annotation.
            let found = if let Some(ty) = inherited
                .and_then(|sig| sig.param_type(i))
                .filter(|ty| !ty.is_unknown())
            {
                Inferred::framework(ty.clone())
            } else if let Some(ty) = doc.param(&name) {
                Inferred::new(ty.clone(), Origin::Annotation)
            } else {
                let default = match param {
                    Expr::AssignmentPattern { right, .. } => Some(right.as_ref()),
                    _ => None,
                };
                let found = default.map_or_else(Inferred::unknown, |d| infer(d, &cx));
                let found = if matches!(param, Expr::RestElement { .. }) && found.ty.is_unknown() {
                    Inferred::structural(Type::seq(Type::Unknown))
                } else {
                    found
                };
                let found = complete(Some(&name), found, default.is_some_and(Expr::is_null_like));
                if found.origin == Origin::Default && keyed_by_text(&func.body.body, &name, &doc) {
                    Inferred::structural(Type::map(Type::string(), Type::u32()))
                } else {
                    found
                }
            };
            params.push((name, found.ty));
            param_origins.push(found.origin);
        }

        let (ret, ret_origin) = if let Some(sig) = inherited.filter(|sig| !sig.ret.is_unknown()) {
            (sig.ret.clone(), Origin::Framework)
        } else if let Some(ty) = &doc.returns {
            (ty.clone(), Origin::Annotation)
        } else {
            match kind {
                MemberKind::Constructor | MemberKind::Setter => (Type::void(), Origin::Structural),
                _ => (Type::Unknown, Origin::Default),
            }
        };

        MethodInfo {
            sig: MethodSig { params, ret },
            kind,
            is_static,
            param_origins,
            ret_origin,
        }
    }

    fn resolve_fields(&mut self, body: &[&Stmt]) {
        let mut updates: Vec<(String, IndexMap<String, FieldInfo>)> = Vec::new();

        for stmt in body {
            let Stmt::ClassDeclaration(class) = stmt else {
                continue;
            };
            let Some(id) = &class.id else {
                continue;
            };
            let mut candidates: IndexMap<String, Vec<Candidate>> = IndexMap::new();

            let mut methods: Vec<&MethodDef> = class
                .body
                .body
                .iter()
                .filter_map(|m| match m {
                    ClassMember::MethodDefinition(def) => Some(def),
                    _ => None,
                })
                .collect();
            // Constructor assignments take precedence.
            methods.sort_by_key(|def| def.kind != "constructor");

            for def in methods {
                let params = self.method_params(&id.name, def);
                let mut scope = ScopeStack::new();
                scope.push();
                for (name, ty) in params {
                    scope.declare(name, ty);
                }
                let mut walker = BodyWalker::new(scope, self, Some(&id.name));
                walker.walk(&def.value.body.body, &mut |visit, cx| {
                    let Visit::Assign {
                        target,
                        value,
                        operator,
                        comments,
                    } = visit
                    else {
                        return;
                    };
                    let Some(field) = target.as_this_member() else {
                        return;
                    };
                    if operator != "=" {
                        return;
                    }
                    let annotation = comments.and_then(|c| parse_doc(c).ty);
                    candidates.entry(field.to_string()).or_default().push(Candidate {
                        annotation,
                        found: infer(value, cx),
                        null: value.is_null_like(),
                    });
                });
            }

            let Some(existing) = self.classes.get(&id.name) else {
                continue;
            };
            let mut fields = existing.fields.clone();
            for (name, list) in candidates {
                if fields.get(&name).is_some_and(|f| f.is_static) {
                    continue;
                }
                if existing.getters.contains_key(&name) || existing.setters.contains_key(&name) {
                    continue;
                }
                // Inherited fields belong to the ancestor that declares them.
                let inherited = existing
                    .base
                    .as_deref()
                    .is_some_and(|b| self.member_type(b, &name).is_some());
                if inherited {
                    continue;
                }
                let declared = fields.get(&name).filter(|f| f.origin == Origin::Annotation).cloned();
                let resolved = declared
                    .map(|f| Inferred::new(f.ty, f.origin))
                    .unwrap_or_else(|| resolve_candidates(&name, &list));
                fields.insert(
                    name,
                    FieldInfo {
                        ty: resolved.ty,
                        origin: resolved.origin,
                        is_static: false,
                    },
                );
            }
            updates.push((id.name.clone(), fields));
        }

        for stmt in body {
            self.static_assignment(stmt, &mut updates);
        }

        for (class, fields) in updates {
            if let Some(entry) = self.classes.get_mut(&class) {
                entry.fields = fields;
            }
        }
    }

    /// `ClassName.member = value` at module level declares a static field.
    fn static_assignment(&self, stmt: &Stmt, updates: &mut [(String, IndexMap<String, FieldInfo>)]) {
        let Some((class, member, value)) = static_field_assignment(stmt) else {
            return;
        };
        if !self.classes.contains_key(class) {
            return;
        }
        let scope = ScopeStack::new();
        let cx = InferCtx::new(&scope, self);
        let found = resolve(Some(member), Some(value), None, &cx);
        if let Some((_, fields)) = updates.iter_mut().find(|(name, _)| name == class) {
            fields.insert(
                member.to_string(),
                FieldInfo {
                    ty: found.ty,
                    origin: found.origin,
                    is_static: true,
                },
            );
        }
    }

    fn method_params(&self, class: &str, def: &MethodDef) -> Vec<(String, Type)> {
        let Some(name) = def.key.key_name() else {
            return Vec::new();
        };
        let Some(info) = self.class(class) else {
            return Vec::new();
        };
        let table = match def.kind.as_str() {
            "get" => &info.getters,
            "set" => &info.setters,
            _ => &info.methods,
        };
        table
            .get(&name)
            .map(|m| m.sig.params.clone())
            .unwrap_or_default()
    }

    fn resolve_globals(&mut self, body: &[&Stmt]) {
        for stmt in body {
            let Stmt::VariableDeclaration(decl) = stmt else {
                continue;
            };
            let doc = parse_doc(&decl.leading_comments);
            for d in &decl.declarations {
                let Some(name) = d.id.binding_name() else {
                    continue;
                };
                let scope = ScopeStack::new();
                let cx = InferCtx::new(&scope, self);
                let found = resolve(Some(name), d.init.as_ref(), doc.ty.as_ref(), &cx);
                self.globals.insert(name.to_string(), found.ty);
            }
        }
    }

    fn resolve_returns(&mut self, body: &[&Stmt]) {
        let mut updates: Vec<(Option<String>, MemberKind, String, Inferred)> = Vec::new();

        for stmt in body {
            match stmt {
                Stmt::FunctionDeclaration(func) => {
                    let Some(id) = &func.id else {
                        continue;
                    };
                    let Some(info) = self.functions.get(&id.name) else {
                        continue;
                    };
                    if info.ret_origin != Origin::Default && info.ret_origin != Origin::Heuristic {
                        continue;
                    }
                    let ret = self.body_return(&id.name, &info.sig.params, &func.body.body, None);
                    updates.push((None, MemberKind::Method, id.name.clone(), ret));
                }
                Stmt::ClassDeclaration(class) => {
                    let Some(id) = &class.id else {
                        continue;
                    };
                    for member in &class.body.body {
                        let ClassMember::MethodDefinition(def) = member else {
                            continue;
                        };
                        let Some(name) = def.key.key_name() else {
                            continue;
                        };
                        let Some(class_info) = self.class(&id.name) else {
                            continue;
                        };
                        let (kind, info) = match def.kind.as_str() {
                            "get" => (MemberKind::Getter, class_info.getters.get(&name)),
                            "method" => (MemberKind::Method, class_info.methods.get(&name)),
                            _ => continue,
                        };
                        let Some(info) = info else {
                            continue;
                        };
                        if info.ret_origin != Origin::Default && info.ret_origin != Origin::Heuristic {
                            continue;
                        }
                        let ret =
                            self.body_return(&name, &info.sig.params, &def.value.body.body, Some(&id.name));
                        updates.push((Some(id.name.clone()), kind, name, ret));
                    }
                }
                _ => {}
            }
        }

        for (class, kind, name, ret) in updates {
            let slot = match class {
                None => self.functions.get_mut(&name),
                Some(class) => self.classes.get_mut(&class).and_then(|c| match kind {
                    MemberKind::Getter => c.getters.get_mut(&name),
                    _ => c.methods.get_mut(&name),
                }),
            };
            if let Some(info) = slot {
                info.sig.ret = ret.ty;
                info.ret_origin = ret.origin;
            }
        }
    }

    /// Return type from the `return` statements of a body: the first
    /// resolved non-null argument; `void` when nothing is returned.
    fn body_return(
        &self,
        name: &str,
        params: &[(String, Type)],
        body: &[Stmt],
        class: Option<&str>,
    ) -> Inferred {
        let mut scope = ScopeStack::new();
        scope.push();
        for (param, ty) in params {
            scope.declare(param.as_str(), ty.clone());
        }

        let mut returns_value = false;
        let mut only_null = true;
        let mut first_partial: Option<Inferred> = None;
        let mut resolved: Option<Inferred> = None;

        let mut walker = BodyWalker::new(scope, self, class);
        walker.walk(body, &mut |visit, cx| {
            let Visit::Return(Some(arg)) = visit else {
                return;
            };
            returns_value = true;
            if arg.is_null_like() {
                return;
            }
            only_null = false;
            if resolved.is_some() {
                return;
            }
            let found = infer(arg, cx);
            if found.is_resolved() {
                resolved = Some(found);
            } else if first_partial.is_none() && !found.ty.is_unknown() {
                first_partial = Some(found);
            }
        });

        if !returns_value {
            return Inferred::structural(Type::void());
        }
        if let Some(found) = resolved {
            return found;
        }
        let guess = heuristics::by_name(name);
        match first_partial {
            Some(partial) => complete(Some(name), partial, false),
            None if only_null => complete(Some(name), Inferred::unknown(), true),
            None => match guess {
                Some(ty) => Inferred::new(ty, Origin::Heuristic),
                None => Inferred::new(Type::u32(), Origin::Default),
            },
        }
    }
}

struct Candidate {
    annotation: Option<Type>,
    found: Inferred,
    null: bool,
}

/// Field type from its assignments: annotation, then the first resolved
/// candidate, then the first non-null candidate completed by heuristics.
/// Only-null fields become optional.
fn resolve_candidates(name: &str, list: &[Candidate]) -> Inferred {
    if let Some(ty) = list.iter().find_map(|c| c.annotation.clone()) {
        return Inferred::new(ty, Origin::Annotation);
    }
    let non_null: Vec<&Candidate> = list.iter().filter(|c| !c.null).collect();
    if let Some(c) = non_null.iter().find(|c| c.found.is_resolved()) {
        return c.found.clone();
    }
    match non_null.iter().find(|c| !c.found.ty.is_unknown()) {
        Some(c) => complete(Some(name), c.found.clone(), false),
        None => complete(Some(name), Inferred::unknown(), list.iter().any(|c| c.null)),
    }
}

/// `ClassName.member = value;` as a module-level statement.
pub fn static_field_assignment(stmt: &Stmt) -> Option<(&str, &str, &Expr)> {
    let Stmt::ExpressionStatement { expression, .. } = stmt else {
        return None;
    };
    let Expr::AssignmentExpression {
        operator,
        left,
        right,
    } = expression.unwrap_parens()
    else {
        return None;
    };
    if operator != "=" {
        return None;
    }
    let (object, member) = left.as_member()?;
    let class = object.as_ident()?;
    if NAMESPACES.contains(&class) {
        return None;
    }
    Some((class, member, right))
}

/// `name[key]` appears in `body` with a key that reads as text, making
/// `name` a string-keyed dictionary.
fn keyed_by_text(body: &[Stmt], name: &str, doc: &DocComment) -> bool {
    body.iter().any(|stmt| {
        stmt.any_expr(&mut |e| match e {
            Expr::MemberExpression {
                object,
                property,
                computed: true,
            } => object.unwrap_parens().as_ident() == Some(name) && is_text_key(property, doc),
            _ => false,
        })
    })
}

fn is_text_key(key: &Expr, doc: &DocComment) -> bool {
    match key.unwrap_parens() {
        Expr::Literal(lit) => lit.value.is_string(),
        Expr::TemplateLiteral { .. } => true,
        Expr::Identifier(id) => doc
            .param(&id.name)
            .cloned()
            .or_else(|| heuristics::by_name(&id.name))
            .is_some_and(|ty| ty.is_string()),
        Expr::BinaryExpression {
            operator,
            left,
            right,
        } if operator == "+" => is_text_key(left, doc) || is_text_key(right, doc),
        _ => false,
    }
}

/// What [`BodyWalker`] reports.
pub enum Visit<'s> {
    Return(Option<&'s Expr>),
    Assign {
        target: &'s Expr,
        value: &'s Expr,
        operator: &'s str,
        /// Comments on the enclosing expression statement.
        comments: Option<&'s [Comment]>,
    },
}

/// Walks a function body in order, binding locals as they are declared, and
/// reports returns and assignments with the scope as it stands at that
/// point. Nested functions are not entered.
pub struct BodyWalker<'a> {
    scope: ScopeStack,
    index: &'a ProgramIndex,
    class: Option<&'a str>,
}

type VisitFn<'v, 's> = dyn FnMut(Visit<'s>, &InferCtx<'_>) + 'v;

impl<'a> BodyWalker<'a> {
    pub fn new(scope: ScopeStack, index: &'a ProgramIndex, class: Option<&'a str>) -> Self {
        Self {
            scope,
            index,
            class,
        }
    }

    fn cx(&self) -> InferCtx<'_> {
        InferCtx {
            scope: &self.scope,
            index: self.index,
            class: self.class,
        }
    }

    pub fn walk<'s>(&mut self, body: &'s [Stmt], visit: &mut VisitFn<'_, 's>) {
        for stmt in body {
            self.stmt(stmt, visit);
        }
    }

    fn nested<'s>(&mut self, stmt: &'s Stmt, visit: &mut VisitFn<'_, 's>) {
        self.scope.push();
        self.stmt(stmt, visit);
        self.scope.pop();
    }

    fn stmt<'s>(&mut self, stmt: &'s Stmt, visit: &mut VisitFn<'_, 's>) {
        match stmt {
            Stmt::VariableDeclaration(decl) => self.declare(decl, visit),
            Stmt::ExpressionStatement {
                expression,
                leading_comments,
                ..
            } => self.expr(expression, Some(leading_comments), visit),
            Stmt::ReturnStatement { argument } => {
                if let Some(arg) = argument {
                    self.expr(arg, None, visit);
                }
                visit(Visit::Return(argument.as_ref()), &self.cx());
            }
            Stmt::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                self.expr(test, None, visit);
                self.nested(consequent, visit);
                if let Some(alt) = alternate {
                    self.nested(alt, visit);
                }
            }
            Stmt::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                self.scope.push();
                match init {
                    Some(ForInit::Decl(decl)) => self.declare(decl, visit),
                    Some(ForInit::Expr(e)) => self.expr(e, None, visit),
                    None => {}
                }
                for e in [test, update].into_iter().flatten() {
                    self.expr(e, None, visit);
                }
                self.stmt(body, visit);
                self.scope.pop();
            }
            Stmt::ForOfStatement { left, right, body } | Stmt::ForInStatement { left, right, body } => {
                self.scope.push();
                let iterated = infer(right, &self.cx()).ty;
                let item = match stmt {
                    Stmt::ForInStatement { .. } if iterated.is_sequence() => Type::u32(),
                    Stmt::ForInStatement { .. } => Type::string(),
                    _ => iterated.element().cloned().unwrap_or(Type::Unknown),
                };
                let name = match left {
                    ForInit::Decl(decl) => decl.declarations.first().and_then(|d| d.id.binding_name()),
                    ForInit::Expr(e) => e.binding_name(),
                };
                if let Some(name) = name {
                    let ty = complete(Some(name), Inferred::structural(item), false).ty;
                    self.scope.declare(name, ty);
                }
                self.stmt(body, visit);
                self.scope.pop();
            }
            Stmt::WhileStatement { test, body } | Stmt::DoWhileStatement { body, test } => {
                self.expr(test, None, visit);
                self.nested(body, visit);
            }
            Stmt::BlockStatement(block) => {
                self.scope.push();
                self.walk(&block.body, visit);
                self.scope.pop();
            }
            Stmt::TryStatement {
                block,
                handler,
                finalizer,
            } => {
                self.scope.push();
                self.walk(&block.body, visit);
                self.scope.pop();
                if let Some(handler) = handler {
                    self.scope.push();
                    if let Some(name) = handler.param.as_ref().and_then(Expr::binding_name) {
                        self.scope.declare(name, Type::named("Error"));
                    }
                    self.walk(&handler.body.body, visit);
                    self.scope.pop();
                }
                if let Some(finalizer) = finalizer {
                    self.scope.push();
                    self.walk(&finalizer.body, visit);
                    self.scope.pop();
                }
            }
            Stmt::SwitchStatement {
                discriminant,
                cases,
            } => {
                self.expr(discriminant, None, visit);
                self.scope.push();
                for case in cases {
                    self.walk(&case.consequent, visit);
                }
                self.scope.pop();
            }
            Stmt::ThrowStatement { argument } => self.expr(argument, None, visit),
            Stmt::FunctionDeclaration(func) => {
                if let Some(id) = &func.id {
                    let params = vec![Type::u32(); func.params.len()];
                    self.scope.declare(id.name.as_str(), Type::func(params, Type::Unknown));
                }
            }
            Stmt::ClassDeclaration(_)
            | Stmt::BreakStatement {}
            | Stmt::ContinueStatement {}
            | Stmt::EmptyStatement {}
            | Stmt::Unsupported(_) => {}
        }
    }

    fn declare<'s>(&mut self, decl: &'s VarDecl, visit: &mut VisitFn<'_, 's>) {
        let doc = parse_doc(&decl.leading_comments);
        for d in &decl.declarations {
            if let Some(init) = &d.init {
                self.expr(init, None, visit);
            }
            let bindings = self.pattern_bindings(&d.id, d.init.as_ref(), doc.ty.as_ref());
            for (name, ty) in bindings {
                self.scope.declare(name, ty);
            }
        }
    }

    /// Names bound by a declarator and their resolved types.
    pub fn pattern_bindings(
        &self,
        pattern: &Expr,
        init: Option<&Expr>,
        annotation: Option<&Type>,
    ) -> Vec<(String, Type)> {
        let cx = self.cx();
        match pattern {
            Expr::ArrayPattern { elements } => {
                let source = init.map_or(Type::Unknown, |e| infer(e, &cx).ty);
                let element = source.element().cloned().unwrap_or(Type::Unknown);
                elements
                    .iter()
                    .flatten()
                    .filter_map(|e| e.binding_name())
                    .map(|name| {
                        let ty = complete(Some(name), Inferred::structural(element.clone()), false).ty;
                        (name.to_string(), ty)
                    })
                    .collect()
            }
            Expr::ObjectPattern { properties } => {
                let source = init.map_or(Type::Unknown, |e| infer(e, &cx).ty);
                properties
                    .iter()
                    .filter_map(|p| match p {
                        Expr::Property { key, value, .. } => {
                            Some((key.key_name()?, value.binding_name()?.to_string()))
                        }
                        _ => None,
                    })
                    .map(|(key, name)| {
                        let found = match &source {
                            Type::Named(owner) => member_of(owner, &key, &cx),
                            Type::Map(_, value) => Inferred::structural((**value).clone()),
                            _ => Inferred::unknown(),
                        };
                        let ty = complete(Some(&name), found, false).ty;
                        (name, ty)
                    })
                    .collect()
            }
            other => match other.binding_name() {
                Some(name) => vec![(name.to_string(), resolve(Some(name), init, annotation, &cx).ty)],
                None => Vec::new(),
            },
        }
    }

    fn expr<'s>(&mut self, expr: &'s Expr, comments: Option<&'s [Comment]>, visit: &mut VisitFn<'_, 's>) {
        match expr.unwrap_parens() {
            Expr::AssignmentExpression {
                operator,
                left,
                right,
            } => {
                self.expr(right, None, visit);
                visit(
                    Visit::Assign {
                        target: left,
                        value: right,
                        operator,
                        comments,
                    },
                    &self.cx(),
                );
                if operator == "="
                    && let Some(name) = left.as_ident()
                {
                    let ty = infer(right, &self.cx()).ty;
                    self.scope.refine(name, &ty);
                }
            }
            Expr::SequenceExpression { expressions } => {
                for e in expressions {
                    self.expr(e, None, visit);
                }
            }
            _ => {}
        }
    }
}
