//! Statements: declarations and destructuring, loops, `switch`, `try` and
//! `throw`.

use cryptran_core::Type;

use crate::analyze::Inferred;
use crate::analyze::index::{BodyWalker, Visit};
use crate::analyze::infer::{complete, constructed_name, infer, is_error_type, resolve};
use crate::source::{CatchClause, Declarator, Expr, ForInit, Function, Stmt, SwitchCase, VarDecl, parse_doc};
use crate::target::{self as t, Builtin, Callee, ExprKind, TExpr, UnOp};

use super::coerce::coerce;
use super::exprs::stringify;
use super::lowerer::Lowerer;

impl Lowerer<'_> {
    /// Statements of a nested block, in their own scope.
    pub(super) fn block(&mut self, body: &[Stmt]) -> Vec<t::Stmt> {
        self.enter_block();
        let out = self.stmts(body);
        self.exit_block();
        out
    }

    /// Statements in the current scope. Function declarations are hoisted
    /// to the front.
    pub(super) fn stmts(&mut self, body: &[Stmt]) -> Vec<t::Stmt> {
        let mut out = Vec::new();
        for stmt in body {
            if let Stmt::FunctionDeclaration(func) = stmt {
                self.local_function(func, &mut out);
            }
        }
        for (i, stmt) in body.iter().enumerate() {
            if !matches!(stmt, Stmt::FunctionDeclaration(_)) {
                self.stmt(stmt, &body[i + 1..], &mut out);
            }
        }
        out
    }

    /// Body of a branch or loop.
    fn nested(&mut self, stmt: &Stmt) -> Vec<t::Stmt> {
        match stmt {
            Stmt::BlockStatement(block) => self.block(&block.body),
            other => self.block(std::slice::from_ref(other)),
        }
    }

    /// Lower `stmt` into `out`. `rest` holds the statements that follow it
    /// in the same block.
    pub(super) fn stmt(&mut self, stmt: &Stmt, rest: &[Stmt], out: &mut Vec<t::Stmt>) {
        match stmt {
            Stmt::VariableDeclaration(decl) => self.var_decl(decl, rest, out),
            Stmt::FunctionDeclaration(func) => self.local_function(func, out),
            Stmt::ClassDeclaration(_) => {
                let placeholder = self.unsupported(stmt.kind(), "class declared inside a routine", None);
                out.push(t::Stmt::Placeholder(placeholder));
            }
            Stmt::ExpressionStatement {
                expression,
                directive,
                ..
            } => {
                if directive.is_none() {
                    self.expr_stmt(expression, out);
                }
            }
            Stmt::ReturnStatement { argument } => self.return_stmt(argument.as_ref(), out),
            Stmt::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                let cond = self.cond(test);
                let then = self.nested(consequent);
                let els = match alternate {
                    Some(alternate) => Some(self.nested(alternate)),
                    None => None,
                };
                out.push(t::Stmt::If { cond, then, els });
            }
            Stmt::ForStatement {
                init,
                test,
                update,
                body,
            } => self.for_stmt(init.as_ref(), test.as_ref(), update.as_ref(), body, out),
            Stmt::ForOfStatement { left, right, body } => self.for_of(left, right, body, out),
            Stmt::ForInStatement { left, right, body } => self.for_in(left, right, body, out),
            Stmt::WhileStatement { test, body } => {
                let cond = self.cond(test);
                let body = self.nested(body);
                out.push(t::Stmt::While { cond, body });
            }
            Stmt::DoWhileStatement { body, test } => {
                let body = self.nested(body);
                let cond = self.cond(test);
                out.push(t::Stmt::DoWhile { body, cond });
            }
            Stmt::BlockStatement(block) => {
                let body = self.block(&block.body);
                out.push(t::Stmt::Block(body));
            }
            Stmt::BreakStatement {} => out.push(t::Stmt::Break),
            Stmt::ContinueStatement {} => out.push(t::Stmt::Continue),
            Stmt::ThrowStatement { argument } => self.throw_stmt(argument, out),
            Stmt::TryStatement {
                block,
                handler,
                finalizer,
            } => {
                let body = self.block(&block.body);
                let catch = match handler {
                    Some(handler) => Some(self.catch_clause(handler)),
                    None => None,
                };
                let finally = match finalizer {
                    Some(finalizer) => Some(self.block(&finalizer.body)),
                    None => None,
                };
                out.push(t::Stmt::Try {
                    body,
                    catch,
                    finally,
                });
            }
            Stmt::SwitchStatement {
                discriminant,
                cases,
            } => self.switch_stmt(discriminant, cases, out),
            Stmt::EmptyStatement {} => {}
            Stmt::Unsupported(u) => {
                let placeholder = self.unhandled(&u.kind, &u.reason, u.span);
                out.push(t::Stmt::Placeholder(placeholder));
            }
        }
    }

    /// An expression evaluated for its effects.
    pub(super) fn expr_stmt(&mut self, e: &Expr, out: &mut Vec<t::Stmt>) {
        match e.unwrap_parens() {
            Expr::SequenceExpression { expressions } => {
                for expr in expressions {
                    self.expr_stmt(expr, out);
                }
                return;
            }
            Expr::AssignmentExpression {
                operator,
                left,
                right,
            } if operator == "=" => {
                if let Expr::ArrayPattern { elements } = left.unwrap_parens() {
                    self.pattern_assign(elements, right, e, out);
                    return;
                }
            }
            Expr::CallExpression(call) => {
                if let Some((object, _)) = call.callee.as_member()
                    && object.as_ident() == Some("console")
                    && !self.scope.is_declared("console")
                {
                    return;
                }
                if let Some((object, "push")) = call.callee.as_member()
                    && call.arguments.len() > 1
                    && self.push_each(object, &call.arguments, out)
                {
                    return;
                }
            }
            _ => {}
        }
        let lowered = self.expr(e);
        self.emit_expr(lowered, out);
    }

    fn emit_expr(&mut self, expr: TExpr, out: &mut Vec<t::Stmt>) {
        if self.dialect.assignment_is_statement() {
            out.extend(split_effects(expr).into_iter().map(t::Stmt::Expr));
        } else {
            out.push(t::Stmt::Expr(expr));
        }
    }

    /// Move assignments and increments nested in `value` into statements
    /// around it, for targets where they are not expressions. Returns the
    /// remaining value and the effects that must run after it.
    fn lift_effects(&mut self, value: TExpr, out: &mut Vec<t::Stmt>) -> (TExpr, Vec<t::Stmt>) {
        if !self.dialect.assignment_is_statement() {
            return (value, Vec::new());
        }
        let mut value = value;
        let mut before = Vec::new();
        let mut after = Vec::new();
        hoist(&mut value, &mut before, &mut after);
        out.extend(before.into_iter().map(t::Stmt::Expr));
        (value, after.into_iter().map(t::Stmt::Expr).collect())
    }

    /// `arr.push(a, b, c)` as one append per value. False when `object` is
    /// not a sequence.
    fn push_each(&mut self, object: &Expr, args: &[Expr], out: &mut Vec<t::Stmt>) -> bool {
        let spread = args.iter().any(|a| matches!(a, Expr::SpreadElement { .. }));
        let Type::Sequence(element) = self.type_of(object).unwrap_optional().clone() else {
            return false;
        };
        if spread {
            return false;
        }
        let recv = self.expr(object);
        let recv = self.unwrap_value(recv);
        for arg in args {
            let item = self.expr_as(arg, &element);
            let append = TExpr::builtin(Builtin::Append, vec![recv.clone(), item], Type::void());
            self.emit_expr(append, out);
        }
        true
    }

    /// `[a, b] = value`. A plain exchange `[a, b] = [b, a]` becomes a swap.
    fn pattern_assign(&mut self, targets: &[Option<Expr>], value: &Expr, e: &Expr, out: &mut Vec<t::Stmt>) {
        if let Expr::ArrayExpression { elements } = value.unwrap_parens()
            && let ([Some(a), Some(b)], [Some(x), Some(y)]) = (targets, elements.as_slice())
            && same_place(a, y)
            && same_place(b, x)
        {
            let a = self.expr(a);
            let b = self.expr(b);
            out.push(t::Stmt::Expr(TExpr::builtin(Builtin::Swap, vec![a, b], Type::void())));
            return;
        }

        let source = self.expr(value);
        let ty = source.ty.clone();
        let Some(element) = ty.element().cloned() else {
            let placeholder =
                self.unsupported(e.kind(), "destructuring of a value that is not a sequence", e.span());
            out.push(t::Stmt::Placeholder(placeholder));
            return;
        };
        let temp = self.fresh_temp("tmp");
        let temp = self.declare_local(&temp, ty.clone(), "ArrayPattern");
        out.push(t::Stmt::VarDecl {
            name: temp.clone(),
            ty: ty.clone(),
            init: Some(source),
        });
        let holder = TExpr::ident(temp, ty.clone());
        for (i, target) in targets.iter().enumerate() {
            let Some(target) = target else {
                continue;
            };
            let (target, read) = match target {
                Expr::RestElement { argument } => (
                    argument.as_ref(),
                    TExpr::builtin(Builtin::Slice, vec![holder.clone(), index_of(i)], ty.clone()),
                ),
                target => (target, element_at(&holder, i, &element)),
            };
            let lhs = self.expr(target);
            if !lhs.is_lvalue() {
                let placeholder = self.unsupported(target.kind(), "destructuring into a computed value", None);
                out.push(t::Stmt::Placeholder(placeholder));
                continue;
            }
            let want = lhs.ty.clone();
            self.emit_expr(TExpr::assign(lhs, coerce(read, &want)), out);
        }
    }

    fn var_decl(&mut self, decl: &VarDecl, rest: &[Stmt], out: &mut Vec<t::Stmt>) {
        let doc = parse_doc(&decl.leading_comments);
        for d in &decl.declarations {
            match &d.id {
                Expr::Identifier(id) => {
                    self.declare_var(&id.name, d.init.as_ref(), doc.ty.as_ref(), rest, out);
                }
                Expr::ArrayPattern { elements } => self.array_destructure(elements, d, out),
                Expr::ObjectPattern { properties } => self.object_destructure(properties, d, out),
                other => {
                    let placeholder = self.unhandled(other.kind(), "declarator pattern", None);
                    out.push(t::Stmt::Placeholder(placeholder));
                }
            }
        }
    }

    /// Declare one local. Without an initializer (or with `null`), the first
    /// later assignment in the block decides the type.
    fn declare_var(
        &mut self,
        name: &str,
        init: Option<&Expr>,
        annotation: Option<&Type>,
        rest: &[Stmt],
        out: &mut Vec<t::Stmt>,
    ) -> String {
        let nullable = init.is_some_and(Expr::is_null_like);
        let lookahead = if annotation.is_none() && (init.is_none() || nullable) {
            self.first_assigned(name, rest)
        } else {
            None
        };
        let found = match lookahead {
            Some(found) => complete(Some(name), found, nullable),
            None => resolve(Some(name), init, annotation, &self.cx()),
        };
        self.note_origin(name, &found, "VariableDeclarator");
        let ty = found.ty;

        let mut after = Vec::new();
        let init = match init {
            Some(init) => {
                let value = self.expr_as(init, &ty);
                let (value, effects) = self.lift_effects(value, out);
                after = effects;
                Some(value)
            }
            None => None,
        };
        let target = self.declare_local(name, ty.clone(), "VariableDeclarator");
        out.push(t::Stmt::VarDecl {
            name: target.clone(),
            ty,
            init,
        });
        out.extend(after);
        target
    }

    /// Type of the first plain assignment to `name` among `rest`.
    fn first_assigned(&self, name: &str, rest: &[Stmt]) -> Option<Inferred> {
        let mut found: Option<Inferred> = None;
        let mut walker = BodyWalker::new(self.scope.clone(), self.index, self.class.as_deref());
        walker.walk(rest, &mut |visit, cx| {
            if found.is_some() {
                return;
            }
            if let Visit::Assign {
                target,
                value,
                operator: "=",
                ..
            } = visit
                && target.as_ident() == Some(name)
                && !value.is_null_like()
            {
                let ty = infer(value, cx);
                if !ty.ty.is_unknown() {
                    found = Some(ty);
                }
            }
        });
        found
    }

    /// A pure source is read in place; anything else goes through a
    /// temporary first.
    fn destructure_source(&mut self, init: &Expr, kind: &str, out: &mut Vec<t::Stmt>) -> TExpr {
        let source = self.expr(init);
        let source = self.unwrap_value(source);
        if source.is_pure() {
            return source;
        }
        let ty = source.ty.clone();
        let temp = self.fresh_temp("tmp");
        let temp = self.declare_local(&temp, ty.clone(), kind);
        out.push(t::Stmt::VarDecl {
            name: temp.clone(),
            ty: ty.clone(),
            init: Some(source),
        });
        TExpr::ident(temp, ty)
    }

    fn array_destructure(&mut self, elements: &[Option<Expr>], d: &Declarator, out: &mut Vec<t::Stmt>) {
        let Some(init) = &d.init else {
            let placeholder = self.unsupported("ArrayPattern", "destructuring without an initializer", None);
            out.push(t::Stmt::Placeholder(placeholder));
            return;
        };
        if let Expr::ArrayExpression { elements: values } = init.unwrap_parens()
            && !values.iter().flatten().any(|v| matches!(v, Expr::SpreadElement { .. }))
            && !elements.iter().flatten().any(|p| matches!(p, Expr::RestElement { .. }))
        {
            for (pattern, value) in elements.iter().zip(values) {
                let (Some(pattern), Some(value)) = (pattern, value) else {
                    continue;
                };
                match pattern.binding_name() {
                    Some(name) => {
                        self.declare_var(name, Some(value), None, &[], out);
                    }
                    None => {
                        let placeholder = self.unsupported(pattern.kind(), "nested destructuring", None);
                        out.push(t::Stmt::Placeholder(placeholder));
                    }
                }
            }
            return;
        }

        let holder = self.destructure_source(init, "ArrayPattern", out);
        let Some(element) = holder.ty.element().cloned() else {
            let placeholder =
                self.unsupported("ArrayPattern", "destructuring of a value that is not a sequence", None);
            out.push(t::Stmt::Placeholder(placeholder));
            return;
        };
        for (i, pattern) in elements.iter().enumerate() {
            let Some(pattern) = pattern else {
                continue;
            };
            let read = match pattern {
                Expr::RestElement { .. } => TExpr::builtin(
                    Builtin::Slice,
                    vec![holder.clone(), index_of(i)],
                    holder.ty.clone(),
                ),
                _ => element_at(&holder, i, &element),
            };
            self.bind_read(pattern, read, out);
        }
    }

    fn object_destructure(&mut self, properties: &[Expr], d: &Declarator, out: &mut Vec<t::Stmt>) {
        let Some(init) = &d.init else {
            let placeholder = self.unsupported("ObjectPattern", "destructuring without an initializer", None);
            out.push(t::Stmt::Placeholder(placeholder));
            return;
        };
        let holder = self.destructure_source(init, "ObjectPattern", out);
        for property in properties {
            let Expr::Property { key, value, .. } = property else {
                let placeholder = self.unsupported(property.kind(), "rest in an object pattern", None);
                out.push(t::Stmt::Placeholder(placeholder));
                continue;
            };
            let Some(key) = key.key_name() else {
                let placeholder = self.unsupported("ObjectPattern", "computed key in an object pattern", None);
                out.push(t::Stmt::Placeholder(placeholder));
                continue;
            };
            let ty = self.field_type(&holder.ty, &key);
            let read = self.property(holder.clone(), &key, ty);
            self.bind_read(value, read, out);
        }
    }

    /// Declared type of member `key` of a value of type `owner`.
    fn field_type(&self, owner: &Type, key: &str) -> Type {
        match owner.unwrap_optional() {
            Type::Named(name) => {
                let found = self.index.member_type(name, key).unwrap_or_else(Inferred::unknown);
                complete(Some(key), found, false).ty
            }
            Type::Map(_, value) => (**value).clone(),
            _ => complete(Some(key), Inferred::unknown(), false).ty,
        }
    }

    /// Declare the local a destructuring pattern binds, initialized by `read`.
    fn bind_read(&mut self, pattern: &Expr, read: TExpr, out: &mut Vec<t::Stmt>) {
        let Some(name) = pattern.binding_name() else {
            let placeholder = self.unsupported(pattern.kind(), "nested destructuring", None);
            out.push(t::Stmt::Placeholder(placeholder));
            return;
        };
        let ty = read.ty.clone();
        let local = self.declare_local(name, ty.clone(), pattern.kind());
        out.push(t::Stmt::VarDecl {
            name: local,
            ty,
            init: Some(read),
        });
    }

    /// A function declared inside a routine: a local holding a closure.
    fn local_function(&mut self, func: &Function, out: &mut Vec<t::Stmt>) {
        let Some(id) = &func.id else {
            let placeholder = self.unhandled("FunctionDeclaration", "function without a name", func.span());
            out.push(t::Stmt::Placeholder(placeholder));
            return;
        };
        let value = Expr::FunctionExpression(func.clone());
        let closure = self.lambda(&value, &[], None);
        let ty = closure.ty.clone();
        let name = self.declare_local(&id.name, ty.clone(), "FunctionDeclaration");
        out.push(t::Stmt::VarDecl {
            name,
            ty,
            init: Some(closure),
        });
    }

    fn return_stmt(&mut self, argument: Option<&Expr>, out: &mut Vec<t::Stmt>) {
        let Some(argument) = argument else {
            out.push(t::Stmt::Return(None));
            return;
        };
        if self.ret.is_void() {
            if !argument.is_null_like() {
                let value = self.expr(argument);
                if !value.is_pure() {
                    self.emit_expr(value, out);
                }
            }
            out.push(t::Stmt::Return(None));
            return;
        }
        let ret = self.ret.clone();
        let value = self.expr_as(argument, &ret);
        let (value, after) = self.lift_effects(value, out);
        if !after.is_empty() {
            self.unsupported("ReturnStatement", "increment after the returned value is read", None);
            out.extend(after);
        }
        out.push(t::Stmt::Return(Some(value)));
    }

    fn for_stmt(
        &mut self,
        init: Option<&ForInit>,
        test: Option<&Expr>,
        update: Option<&Expr>,
        body: &Stmt,
        out: &mut Vec<t::Stmt>,
    ) {
        self.enter_block();
        let mut setup = Vec::new();
        match init {
            Some(ForInit::Decl(decl)) => {
                let doc = parse_doc(&decl.leading_comments);
                for d in &decl.declarations {
                    match d.id.as_ident() {
                        Some(name) => {
                            let counter = self.counter_type(d, update);
                            let annotation = counter.as_ref().or(doc.ty.as_ref());
                            self.declare_var(name, d.init.as_ref(), annotation, &[], &mut setup);
                        }
                        None => {
                            let placeholder = self.unsupported("ForStatement", "destructuring loop variable", None);
                            setup.push(t::Stmt::Placeholder(placeholder));
                        }
                    }
                }
            }
            Some(ForInit::Expr(e)) => self.expr_stmt(e, &mut setup),
            None => {}
        }
        let cond = test.map(|test| self.cond(test));
        let mut updates = Vec::new();
        if let Some(update) = update {
            self.update_list(update, &mut updates);
        }
        let body = self.nested(body);
        self.exit_block();

        let init = if setup.is_empty() {
            None
        } else {
            Some(Box::new(setup.remove(0)))
        };
        let lowered = t::Stmt::For {
            init,
            cond,
            update: updates,
            body,
        };
        if setup.is_empty() {
            out.push(lowered);
        } else {
            setup.push(lowered);
            out.push(t::Stmt::Block(setup));
        }
    }

    /// A counter that counts down is signed, so that `i >= 0` terminates.
    fn counter_type(&self, d: &Declarator, update: Option<&Expr>) -> Option<Type> {
        let name = d.id.as_ident()?;
        let init = d.init.as_ref()?;
        let decrements = match update?.unwrap_parens() {
            Expr::UpdateExpression { operator, argument, .. } => {
                operator == "--" && argument.as_ident() == Some(name)
            }
            Expr::AssignmentExpression { operator, left, .. } => {
                operator == "-=" && left.as_ident() == Some(name)
            }
            _ => false,
        };
        let ty = self.type_of(init);
        (decrements && ty.is_integer() && !ty.is_signed()).then(|| Type::int(ty.width().unwrap_or(32).max(32), true))
    }

    fn update_list(&mut self, update: &Expr, out: &mut Vec<TExpr>) {
        match update.unwrap_parens() {
            Expr::SequenceExpression { expressions } => {
                for expr in expressions {
                    self.update_list(expr, out);
                }
            }
            expr => out.push(self.expr(expr)),
        }
    }

    /// Name bound by the left side of `for .. of` / `for .. in`.
    fn loop_binding<'s>(&self, left: &'s ForInit) -> Option<&'s str> {
        match left {
            ForInit::Decl(decl) => decl.declarations.first().and_then(|d| d.id.as_ident()),
            ForInit::Expr(e) => e.as_ident(),
        }
    }

    fn for_of(&mut self, left: &ForInit, right: &Expr, body: &Stmt, out: &mut Vec<t::Stmt>) {
        let iter = self.expr(right);
        let iter = self.unwrap_value(iter);
        let element = match &iter.ty {
            Type::Sequence(element) => (**element).clone(),
            ty if ty.is_string() => Type::string(),
            ty => {
                let detail = format!("`for .. of` over a value of type {ty}");
                let placeholder = self.unsupported("ForOfStatement", &detail, None);
                out.push(t::Stmt::Placeholder(placeholder));
                return;
            }
        };
        let Some(name) = self.loop_binding(left) else {
            let placeholder = self.unsupported("ForOfStatement", "destructuring loop variable", None);
            out.push(t::Stmt::Placeholder(placeholder));
            return;
        };
        self.enter_block();
        let var = self.declare_local(name, element.clone(), "ForOfStatement");
        let body = self.nested(body);
        self.exit_block();
        out.push(t::Stmt::ForEach {
            var,
            ty: element,
            iter,
            body,
        });
    }

    /// `for (k in dict)` walks the keys; `for (i in seq)` walks the indices.
    fn for_in(&mut self, left: &ForInit, right: &Expr, body: &Stmt, out: &mut Vec<t::Stmt>) {
        let Some(name) = self.loop_binding(left) else {
            let placeholder = self.unsupported("ForInStatement", "destructuring loop variable", None);
            out.push(t::Stmt::Placeholder(placeholder));
            return;
        };
        let iter = self.expr(right);
        let iter = self.unwrap_value(iter);
        match iter.ty.clone() {
            Type::Map(key, _) => {
                let keys = TExpr::builtin(Builtin::MapKeys, vec![iter], Type::seq((*key).clone()));
                self.enter_block();
                let var = self.declare_local(name, (*key).clone(), "ForInStatement");
                let body = self.nested(body);
                self.exit_block();
                out.push(t::Stmt::ForEach {
                    var,
                    ty: *key,
                    iter: keys,
                    body,
                });
            }
            Type::Sequence(_) if iter.is_pure() => {
                self.enter_block();
                let var = self.declare_local(name, Type::u32(), "ForInStatement");
                let index = TExpr::ident(var.clone(), Type::u32());
                let size = TExpr::builtin(Builtin::Size, vec![iter], Type::u32());
                let cond = TExpr::binary(t::BinOp::Lt, index.clone(), size, Type::bool());
                let step = TExpr::unary(UnOp::PreInc, index, Type::u32());
                let body = self.nested(body);
                self.exit_block();
                out.push(t::Stmt::For {
                    init: Some(Box::new(t::Stmt::VarDecl {
                        name: var,
                        ty: Type::u32(),
                        init: Some(TExpr::u32(0)),
                    })),
                    cond: Some(cond),
                    update: vec![step],
                    body,
                });
            }
            ty => {
                let detail = format!("`for .. in` over a value of type {ty}");
                let placeholder = self.unsupported("ForInStatement", &detail, None);
                out.push(t::Stmt::Placeholder(placeholder));
            }
        }
    }

    /// Errors are raised with their message only.
    fn throw_stmt(&mut self, argument: &Expr, out: &mut Vec<t::Stmt>) {
        let argument = argument.unwrap_parens();
        if let Expr::NewExpression(call) | Expr::CallExpression(call) = argument
            && constructed_name(&call.callee).is_some_and(is_error_type)
        {
            let message = match call.arguments.first() {
                Some(message) => {
                    let value = self.expr(message);
                    stringify(self.unwrap_value(value))
                }
                None => TExpr::string(""),
            };
            out.push(t::Stmt::Throw(message));
            return;
        }
        let value = self.expr(argument);
        let value = self.unwrap_value(value);
        let ty = value.ty.clone();
        match &ty {
            ty if ty.is_string() => out.push(t::Stmt::Throw(value)),
            Type::Named(name) if is_error_type(name) => {
                let message = TExpr::builtin(Builtin::ErrorMessage, vec![value], Type::string());
                out.push(t::Stmt::Throw(message));
            }
            _ => {
                let placeholder = self.unsupported("ThrowStatement", "throw of a value that is not an error", None);
                out.push(t::Stmt::Placeholder(placeholder));
            }
        }
    }

    fn catch_clause(&mut self, handler: &CatchClause) -> t::Catch {
        self.enter_block();
        let source = match handler.param.as_ref().and_then(Expr::binding_name) {
            Some(name) => name.to_string(),
            None => self.fresh_temp("error"),
        };
        let name = self.declare_local(&source, Type::named("Error"), "CatchClause");
        let body = self.stmts(&handler.body.body);
        self.exit_block();
        t::Catch { name, body }
    }

    /// Cases with empty bodies share the next body; the trailing `break` of
    /// a body is dropped.
    fn switch_stmt(&mut self, discriminant: &Expr, cases: &[SwitchCase], out: &mut Vec<t::Stmt>) {
        let subject = self.expr(discriminant);
        let subject = self.unwrap_value(subject);
        let ty = subject.ty.clone();

        let mut groups = Vec::new();
        let mut default = None;
        let mut labels = Vec::new();
        let mut is_default = false;
        for (i, case) in cases.iter().enumerate() {
            match &case.test {
                Some(test) => labels.push(self.expr_as(test, &ty)),
                None => is_default = true,
            }
            let last = i + 1 == cases.len();
            if case.consequent.is_empty() && !last {
                continue;
            }
            let mut body = self.block(&case.consequent);
            if matches!(body.last(), Some(t::Stmt::Break)) {
                body.pop();
            } else if !last && !body.last().is_some_and(t::Stmt::is_terminal) {
                self.unsupported("SwitchCase", "fall-through into the next case", None);
            }
            if self.dialect.case_break_leaves_loop() && breaks_out(&body) {
                self.unsupported("SwitchCase", "`break` nested inside a case body", None);
            }
            if is_default {
                default = Some(body);
                labels.clear();
            } else {
                groups.push(t::Case {
                    labels: std::mem::take(&mut labels),
                    body,
                });
            }
            is_default = false;
        }
        out.push(t::Stmt::Switch {
            subject,
            cases: groups,
            default,
        });
    }
}

fn index_of(i: usize) -> TExpr {
    TExpr::int(i as i128, Type::u32())
}

fn element_at(holder: &TExpr, i: usize, element: &Type) -> TExpr {
    TExpr::new(
        ExprKind::Index {
            object: Box::new(holder.clone()),
            index: Box::new(index_of(i)),
        },
        element.clone(),
    )
}

/// Both expressions denote the same variable, field or element.
fn same_place(a: &Expr, b: &Expr) -> bool {
    match (a.unwrap_parens(), b.unwrap_parens()) {
        (Expr::Identifier(x), Expr::Identifier(y)) => x.name == y.name,
        (Expr::ThisExpression {}, Expr::ThisExpression {}) => true,
        (Expr::Literal(x), Expr::Literal(y)) => x.value == y.value,
        (
            Expr::MemberExpression {
                object: o1,
                property: p1,
                computed: c1,
            },
            Expr::MemberExpression {
                object: o2,
                property: p2,
                computed: c2,
            },
        ) => c1 == c2 && same_place(o1, o2) && same_place(p1, p2),
        _ => false,
    }
}

/// A `break` in `body` that is not inside a loop of its own.
fn breaks_out(body: &[t::Stmt]) -> bool {
    body.iter().any(|stmt| match stmt {
        t::Stmt::Break => true,
        t::Stmt::Block(inner) => breaks_out(inner),
        t::Stmt::If { then, els, .. } => {
            breaks_out(then) || els.as_deref().is_some_and(breaks_out)
        }
        t::Stmt::Try { body, catch, finally } => {
            breaks_out(body)
                || catch.as_ref().is_some_and(|c| breaks_out(&c.body))
                || finally.as_deref().is_some_and(breaks_out)
        }
        _ => false,
    })
}

/// `expr` as a list of statement expressions: its nested assignments and
/// prefix increments first, then `expr` itself, then postfix increments.
fn split_effects(expr: TExpr) -> Vec<TExpr> {
    let mut expr = expr;
    let mut before = Vec::new();
    let mut after = Vec::new();
    for child in effect_children(&mut expr.kind) {
        hoist(child, &mut before, &mut after);
    }
    before.push(expr);
    before.extend(after);
    before
}

/// Replace every assignment and increment inside `expr` by its target,
/// collecting the effect itself into `before` or `after`.
fn hoist(expr: &mut TExpr, before: &mut Vec<TExpr>, after: &mut Vec<TExpr>) {
    for child in effect_children(&mut expr.kind) {
        hoist(child, before, after);
    }
    let target = match &expr.kind {
        ExprKind::Assign { target, .. } | ExprKind::Postfix { target, .. } => (**target).clone(),
        ExprKind::Unary {
            op: UnOp::PreInc | UnOp::PreDec,
            operand,
        } => (**operand).clone(),
        _ => return,
    };
    let effect = std::mem::replace(expr, target);
    if matches!(effect.kind, ExprKind::Postfix { .. }) {
        after.push(effect);
    } else {
        before.push(effect);
    }
}

/// Children evaluated unconditionally. Branches of `?:`, the right side of
/// `&&`/`||` and closure bodies are left alone.
fn effect_children(kind: &mut ExprKind) -> Vec<&mut TExpr> {
    match kind {
        ExprKind::Binary {
            op: t::BinOp::And | t::BinOp::Or,
            left,
            ..
        } => vec![left.as_mut()],
        ExprKind::Binary { left, right, .. } => vec![left.as_mut(), right.as_mut()],
        ExprKind::Unary { operand, .. } => vec![operand.as_mut()],
        ExprKind::Postfix { target, .. } => vec![target.as_mut()],
        ExprKind::Assign { target, value, .. } => vec![target.as_mut(), value.as_mut()],
        ExprKind::Member { object, .. } => vec![object.as_mut()],
        ExprKind::Index { object, index } => vec![object.as_mut(), index.as_mut()],
        ExprKind::Call { callee, args } => {
            let mut children: Vec<&mut TExpr> = match callee {
                Callee::Method { recv, .. } => vec![recv.as_mut()],
                Callee::Value(function) => vec![function.as_mut()],
                _ => Vec::new(),
            };
            children.extend(args.iter_mut());
            children
        }
        ExprKind::Builtin { args, .. } | ExprKind::Construct { args } | ExprKind::ArrayLit(args) => {
            args.iter_mut().collect()
        }
        ExprKind::MapLit(entries) => entries.iter_mut().flat_map(|(k, v)| [k, v]).collect(),
        ExprKind::InitList(entries) => entries.iter_mut().map(|(_, v)| v).collect(),
        ExprKind::Conditional { cond, .. } => vec![cond.as_mut()],
        ExprKind::Cast(inner) | ExprKind::Group(inner) => vec![inner.as_mut()],
        _ => Vec::new(),
    }
}
