//! Operators, identifiers, members, literals and closures.

use cryptran_core::Type;
use serde_json::Value;

use crate::analyze::Inferred;
use crate::analyze::framework;
use crate::analyze::index::{BodyWalker, Visit};
use crate::analyze::infer::{
    callback_return, complete, constructed_name, integer_value, is_error_type, is_float_literal,
    literal_type, object_keys, typed_array_element,
};
use crate::source::ast::TemplateElement;
use crate::source::{ArrowBody, Expr, Literal, Stmt};
use crate::target::{self as t, BinOp, Builtin, Callee, ExprKind, IncDec, Lit, Param, TExpr, UnOp};

use super::coerce::{coerce, empty_value, falsy, fits, truthy};
use super::lowerer::Lowerer;
use super::names::accessor_name;

/// Body of a closure.
enum Body<'s> {
    Expr(&'s Expr),
    Block(&'s [Stmt]),
}

impl Lowerer<'_> {
    pub(super) fn expr(&mut self, e: &Expr) -> TExpr {
        match e {
            Expr::Literal(lit) => self.literal(e, lit),
            Expr::Identifier(id) => self.identifier(&id.name, e),
            Expr::ThisExpression {} => match self.class.clone() {
                Some(class) => TExpr::new(ExprKind::This, Type::named(class)),
                None => self.unsupported_expr(e, "`this` outside a class"),
            },
            Expr::Super {} => self.unsupported_expr(e, "`super` outside a call"),
            Expr::BinaryExpression {
                operator,
                left,
                right,
            } => self.binary(operator, left, right, e),
            Expr::LogicalExpression {
                operator,
                left,
                right,
            } => self.logical(operator, left, right, e),
            Expr::UnaryExpression { operator, argument } => self.unary(operator, argument, e),
            Expr::UpdateExpression {
                operator,
                argument,
                prefix,
            } => self.update(operator, argument, *prefix, e),
            Expr::AssignmentExpression {
                operator,
                left,
                right,
            } => self.assignment(operator, left, right, e),
            Expr::CallExpression(call) => self.call(call, e),
            Expr::NewExpression(call) => self.construct(call, e),
            Expr::MemberExpression {
                object,
                property,
                computed,
            } => self.member(object, property, *computed, e),
            Expr::ChainExpression { expression } => self.expr(expression),
            Expr::ArrayExpression { elements } => self.array(elements, e, None),
            Expr::ObjectExpression { properties } => self.object(properties, e, None),
            Expr::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => self.conditional(test, consequent, alternate, None),
            Expr::ArrowFunctionExpression(_) | Expr::FunctionExpression(_) => {
                self.lambda(e, &[], None)
            }
            Expr::TemplateLiteral {
                quasis,
                expressions,
            } => self.template(quasis, expressions),
            Expr::SequenceExpression { .. } => {
                self.unsupported_expr(e, "comma operator outside a statement")
            }
            Expr::ParenthesizedExpression { expression } => self.expr(expression).group(),
            Expr::SpreadElement { .. } => self.unsupported_expr(e, "spread outside an array literal"),
            Expr::Property { .. }
            | Expr::ArrayPattern { .. }
            | Expr::ObjectPattern { .. }
            | Expr::AssignmentPattern { .. }
            | Expr::RestElement { .. } => self.unhandled_expr(e, "pattern in expression position"),
            Expr::Unsupported(u) => {
                let placeholder = self.unhandled(&u.kind, &u.reason, u.span);
                TExpr::new(ExprKind::Placeholder(placeholder), Type::u32())
            }
        }
    }

    /// Lower `e` where a value of type `want` is expected.
    pub(super) fn expr_as(&mut self, e: &Expr, want: &Type) -> TExpr {
        if want.is_unknown() || want.is_void() {
            return self.expr(e);
        }
        if e.is_null_like() {
            return empty_value(want);
        }
        match e {
            Expr::ArrayExpression { elements } if want.is_sequence() => {
                self.array(elements, e, Some(want))
            }
            Expr::ObjectExpression { properties } => {
                let object = self.object(properties, e, Some(want));
                coerce(object, want)
            }
            Expr::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => self.conditional(test, consequent, alternate, Some(want)),
            Expr::ArrowFunctionExpression(_) | Expr::FunctionExpression(_) => match want {
                Type::Function { params, ret } => self.lambda(e, params, Some(ret)),
                _ => self.expr(e),
            },
            Expr::ParenthesizedExpression { expression } => self.expr_as(expression, want).group(),
            _ => {
                let lowered = self.expr(e);
                coerce(lowered, want)
            }
        }
    }

    /// Condition of an `if`, a loop or a `?:`.
    pub(super) fn cond(&mut self, e: &Expr) -> TExpr {
        let lowered = self.expr(e);
        truthy(lowered)
    }

    pub(super) fn is_ref(&self, ty: &Type) -> bool {
        ty.named_str().is_some_and(|n| self.index.is_ref_type(n))
    }

    /// The value inside an optional. References are nullable already and only
    /// change their static type.
    pub(super) fn unwrap_value(&self, e: TExpr) -> TExpr {
        match e.ty.clone() {
            Type::Optional(inner) if self.is_ref(&inner) => TExpr { ty: *inner, ..e },
            Type::Optional(inner) => TExpr::builtin(Builtin::ValueOf, vec![e], *inner),
            _ => e,
        }
    }

    fn literal(&mut self, e: &Expr, lit: &Literal) -> TExpr {
        if lit.regex.is_some() {
            return self.unsupported_expr(e, "regular expression literal");
        }
        if let Some(digits) = &lit.bigint {
            return match digits.parse::<i128>() {
                Ok(value) => TExpr::int(value, Type::u64()),
                Err(_) => self.unsupported_expr(e, "bigint literal out of range"),
            };
        }
        match &lit.value {
            Value::Bool(b) => TExpr::boolean(*b),
            Value::String(s) => TExpr::string(s.as_str()),
            Value::Number(n) if is_float_literal(n, lit.raw.as_deref()) => TExpr::new(
                ExprKind::Literal(Lit::Float(n.as_f64().unwrap_or(0.0))),
                Type::f64(),
            ),
            Value::Number(_) => {
                let value = integer_value(e).unwrap_or(0);
                let raw = lit.raw.as_ref().filter(|r| is_hex(r)).cloned();
                TExpr::new(ExprKind::Literal(Lit::Int { value, raw }), literal_type(lit))
            }
            Value::Null => TExpr::null(Type::optional(Type::u32())),
            _ => self.unhandled_expr(e, "literal value"),
        }
    }

    fn identifier(&mut self, name: &str, e: &Expr) -> TExpr {
        if !self.scope.is_declared(name) {
            match name {
                "undefined" => return TExpr::null(Type::optional(Type::u32())),
                "NaN" | "Infinity" => return TExpr::ident(name, Type::f64()),
                _ => {}
            }
            if self.index.class(name).is_some() || framework().get(name).is_some() {
                return TExpr::ident(self.type_name(name), Type::named(name));
            }
            if framework().global(name).is_some() {
                return TExpr::ident(name, self.type_of(e));
            }
        }
        let ty = self.type_of(e);
        TExpr::ident(self.local_name(name), ty)
    }

    /// Type or namespace named by `e`, unless a local shadows it.
    pub(super) fn type_ref(&self, e: &Expr) -> Option<String> {
        match e.unwrap_parens() {
            Expr::Identifier(id) if !self.scope.is_declared(&id.name) => {
                let name = id.name.as_str();
                let known = matches!(name, "Math" | "Number" | "OpCodes" | "AlgorithmFramework")
                    || self.index.class(name).is_some()
                    || framework().get(name).is_some();
                known.then(|| name.to_string())
            }
            expr => match expr.as_member() {
                Some((Expr::Identifier(ns), name))
                    if ns.name == "AlgorithmFramework" && framework().get(name).is_some() =>
                {
                    Some(name.to_string())
                }
                _ => None,
            },
        }
    }

    fn member(&mut self, object: &Expr, property: &Expr, computed: bool, e: &Expr) -> TExpr {
        let object = object.unwrap_parens();
        if !computed {
            let Some(name) = property.as_ident() else {
                return self.unhandled_expr(e, "member key");
            };
            if let Some(owner) = self.type_ref(object) {
                return self.static_member(&owner, name, e);
            }
            let recv = self.expr(object);
            let ty = self.type_of(e);
            return self.property(recv, name, ty);
        }

        let recv = self.expr(object);
        let recv = self.unwrap_value(recv);
        match recv.ty.clone() {
            Type::Sequence(element) => {
                let index = self.position(property);
                TExpr::new(
                    ExprKind::Index {
                        object: Box::new(recv),
                        index: Box::new(index),
                    },
                    *element,
                )
            }
            Type::Map(key, value) => {
                let key = self.expr_as(property, &key);
                TExpr::builtin(Builtin::MapGet, vec![recv, key], *value)
            }
            ty if ty.is_string() => {
                let index = self.position(property);
                TExpr::builtin(Builtin::CharAt, vec![recv, index], Type::string())
            }
            Type::Named(_) if matches!(property, Expr::Literal(_)) => match property.key_name() {
                Some(key) => {
                    let ty = self.type_of(e);
                    self.property(recv, &key, ty)
                }
                None => self.unsupported_expr(e, "computed member name"),
            },
            _ => self.unsupported_expr(e, "indexed access on a value that is not a collection"),
        }
    }

    /// Sequence and string positions.
    pub(super) fn position(&mut self, e: &Expr) -> TExpr {
        let index = self.expr(e);
        if index.ty.is_integer() {
            index
        } else {
            coerce(index, &Type::u32())
        }
    }

    fn static_member(&mut self, owner: &str, name: &str, e: &Expr) -> TExpr {
        match owner {
            "Math" => return math_constant(name).unwrap_or_else(|| {
                self.unsupported_expr(e, &format!("`Math.{name}`"))
            }),
            "Number" => {
                return match name {
                    "MAX_SAFE_INTEGER" => TExpr::int(9_007_199_254_740_991, Type::u64()),
                    "MIN_SAFE_INTEGER" => TExpr::int(-9_007_199_254_740_991, Type::int(64, true)),
                    "EPSILON" => float(f64::EPSILON),
                    "MAX_VALUE" => float(f64::MAX),
                    _ => self.unsupported_expr(e, &format!("`Number.{name}`")),
                };
            }
            "OpCodes" | "AlgorithmFramework" => {
                return self.unsupported_expr(e, &format!("`{owner}.{name}` used as a value"));
            }
            _ => {}
        }
        if framework().enum_has(owner, name) {
            return TExpr::new(
                ExprKind::StaticMember {
                    owner: self.type_name(owner),
                    name: name.to_string(),
                },
                Type::named(owner),
            );
        }
        if self.index.class(owner).is_some() {
            let ty = self.type_of(e);
            return TExpr::new(
                ExprKind::StaticMember {
                    owner: self.type_name(owner),
                    name: self.member_name(owner, name),
                },
                ty,
            );
        }
        self.unsupported_expr(e, &format!("`{owner}` has no member `{name}`"))
    }

    /// Read of the named member of an already lowered value.
    pub(super) fn property(&mut self, recv: TExpr, name: &str, ty: Type) -> TExpr {
        let recv = self.unwrap_value(recv);
        if name == "length" && (recv.ty.is_string() || recv.ty.is_sequence() || recv.ty.is_map()) {
            return TExpr::builtin(Builtin::Size, vec![recv], Type::u32());
        }
        match recv.ty.clone() {
            Type::Named(owner) => {
                if is_error_type(&owner) && name == "message" {
                    return TExpr::builtin(Builtin::ErrorMessage, vec![recv], Type::string());
                }
                if let Some((getter, ret)) = self.accessor(&owner, "get", name) {
                    return TExpr::new(
                        ExprKind::Call {
                            callee: Callee::Method {
                                recv: Box::new(recv),
                                name: getter,
                            },
                            args: Vec::new(),
                        },
                        ret,
                    );
                }
                let member = self.member_name(&owner, name);
                TExpr::new(
                    ExprKind::Member {
                        object: Box::new(recv),
                        name: member,
                    },
                    ty,
                )
            }
            Type::Map(_, value) => {
                TExpr::builtin(Builtin::MapGet, vec![recv, TExpr::string(name)], *value)
            }
            _ => {
                let member = self.sanitize(name);
                TExpr::new(
                    ExprKind::Member {
                        object: Box::new(recv),
                        name: member,
                    },
                    ty,
                )
            }
        }
    }

    /// Target spelling of member `name` of `owner`: the name chosen for the
    /// declaring local class, the framework's own spelling, or the sanitized
    /// source name.
    pub(super) fn member_name(&self, owner: &str, name: &str) -> String {
        let mut next = Some(owner);
        let mut depth = 0;
        while let Some(class) = next
            && depth < 32
        {
            if let Some(target) = self.members.get(class).and_then(|m| m.get(name)) {
                return target.clone();
            }
            next = self.index.class(class).and_then(|c| c.base.as_deref());
            depth += 1;
        }
        if self.index.is_framework_member(owner, name) || framework().get(owner).is_some() {
            return name.to_string();
        }
        self.sanitize(name)
    }

    /// Getter (`kind` = `get`) or setter (`set`) for property `name` in the
    /// local lineage of `owner`: its method name and value type. A field of
    /// the same name declared lower in the lineage wins.
    pub(super) fn accessor(&self, owner: &str, kind: &str, name: &str) -> Option<(String, Type)> {
        let mut next = self.index.class(owner);
        let mut depth = 0;
        while let Some(class) = next
            && depth < 32
        {
            if class.fields.contains_key(name) {
                return None;
            }
            let table = if kind == "get" {
                &class.getters
            } else {
                &class.setters
            };
            if let Some(info) = table.get(name) {
                let method = self
                    .members
                    .get(&class.name)
                    .and_then(|m| m.get(&format!("{kind} {name}")))
                    .cloned()
                    .unwrap_or_else(|| accessor_name(kind, name, self.naming));
                let ty = if kind == "get" {
                    info.sig.ret.clone()
                } else {
                    info.sig.param_type(0).cloned().unwrap_or_else(Type::u32)
                };
                return Some((method, ty));
            }
            next = class.base.as_deref().and_then(|b| self.index.class(b));
            depth += 1;
        }
        None
    }

    fn binary(&mut self, op: &str, left: &Expr, right: &Expr, e: &Expr) -> TExpr {
        if matches!(op, "==" | "===" | "!=" | "!==") {
            let negate = op.starts_with('!');
            if let Some(folded) = self.typeof_test(left, right, negate) {
                return folded;
            }
            if let Some(folded) = self.typeof_test(right, left, negate) {
                return folded;
            }
            if left.is_null_like() || right.is_null_like() {
                let other = if right.is_null_like() { left } else { right };
                let value = self.expr(other);
                return if negate { truthy(value) } else { falsy(value) };
            }
        }
        match op {
            "instanceof" => return self.instance_of(left, right, e),
            "in" => return self.key_in(left, right, e),
            _ => {}
        }

        let ty = self.type_of(e);
        let l = self.expr(left);
        let l = self.unwrap_value(l);
        let r = self.expr(right);
        let r = self.unwrap_value(r);
        match op {
            "+" if l.ty.is_string() || r.ty.is_string() => {
                TExpr::binary(BinOp::Add, stringify(l), stringify(r), Type::string())
            }
            ">>>" if r.int_value() == Some(0) => l.cast(Type::u32()),
            ">>>" => TExpr::binary(BinOp::Shr, l.cast(Type::u32()), r, Type::u32()),
            "|" if r.int_value() == Some(0) => l.cast(Type::i32()),
            "**" => pow(l, r, &ty),
            _ => match bin_op(op) {
                Some(bin) if bin.is_comparison() => TExpr::binary(bin, l, r, Type::bool()),
                Some(bin @ (BinOp::Shl | BinOp::Shr)) => {
                    TExpr::binary(bin, widen(l, &ty), r, ty)
                }
                Some(bin) => TExpr::binary(bin, l, r, ty),
                None => self.unhandled_expr(e, &format!("operator `{op}`")),
            },
        }
    }

    /// `typeof x === 'number'` folds to a constant from the static type of
    /// `x`.
    fn typeof_test(&mut self, side: &Expr, other: &Expr, negate: bool) -> Option<TExpr> {
        let Expr::UnaryExpression { operator, argument } = side.unwrap_parens() else {
            return None;
        };
        if operator != "typeof" {
            return None;
        }
        let Expr::Literal(Literal {
            value: Value::String(expected),
            ..
        }) = other.unwrap_parens()
        else {
            return None;
        };
        let ty = self.type_of(argument);
        if expected == "undefined" && ty.is_optional() {
            let value = self.expr(argument);
            return Some(if negate { truthy(value) } else { falsy(value) });
        }
        Some(TExpr::boolean((typeof_name(&ty) == expected) != negate))
    }

    fn instance_of(&mut self, left: &Expr, right: &Expr, e: &Expr) -> TExpr {
        let ty = self.type_of(left);
        let wanted = constructed_name(right);
        let holds = match (ty.unwrap_optional(), wanted) {
            (Type::Named(actual), Some(wanted)) => {
                actual == wanted
                    || self.index.is_subclass_of(actual, wanted)
                    || (is_error_type(actual) && is_error_type(wanted))
            }
            (Type::Sequence(_), Some(wanted)) => {
                wanted == "Array" || typed_array_element(wanted).is_some()
            }
            _ => false,
        };
        if holds {
            TExpr::boolean(true)
        } else {
            self.unsupported_expr(e, "`instanceof` that does not follow from static types")
        }
    }

    fn key_in(&mut self, left: &Expr, right: &Expr, e: &Expr) -> TExpr {
        let recv = self.expr(right);
        let recv = self.unwrap_value(recv);
        match recv.ty.clone() {
            Type::Map(key, _) => {
                let key = self.expr_as(left, &key);
                TExpr::builtin(Builtin::MapContains, vec![recv, key], Type::bool())
            }
            Type::Named(owner) => match left.key_name() {
                Some(key) if matches!(left, Expr::Literal(_)) => {
                    let known = self.index.member_type(&owner, &key).is_some()
                        || self.index.method_sig(&owner, &key).is_some();
                    TExpr::boolean(known)
                }
                _ => self.unsupported_expr(e, "`in` with a computed key on an object"),
            },
            _ => self.unsupported_expr(e, "`in` on a value that is not a dictionary"),
        }
    }

    fn logical(&mut self, op: &str, left: &Expr, right: &Expr, e: &Expr) -> TExpr {
        match op {
            "&&" => {
                let l = self.cond(left);
                let r = self.cond(right);
                TExpr::binary(BinOp::And, l, r, Type::bool())
            }
            "||" => self.fallback(left, right, e),
            "??" => self.coalesce(left, right, e),
            _ => self.unhandled_expr(e, &format!("operator `{op}`")),
        }
    }

    /// `a || b`
    fn fallback(&mut self, left: &Expr, right: &Expr, e: &Expr) -> TExpr {
        if let Some(lookup) = self.dictionary_fallback(left, right, e) {
            return lookup;
        }
        let l = self.expr(left);
        if l.ty.is_bool() {
            let r = self.cond(right);
            return TExpr::binary(BinOp::Or, l, r, Type::bool());
        }
        self.value_or(l, right, e)
    }

    /// `a ?? b`
    fn coalesce(&mut self, left: &Expr, right: &Expr, e: &Expr) -> TExpr {
        if let Some(lookup) = self.dictionary_fallback(left, right, e) {
            return lookup;
        }
        let l = self.expr(left);
        let absent_possible = l.ty.is_optional() || self.is_ref(&l.ty) || l.ty.is_function();
        if !absent_possible {
            return l;
        }
        self.value_or(l, right, e)
    }

    /// `l` when truthy, else `right`. `l` is read once: a pure `l` is tested
    /// in place, anything else goes through the runtime's `ValueOr`, which
    /// takes the fallback eagerly.
    fn value_or(&mut self, l: TExpr, right: &Expr, e: &Expr) -> TExpr {
        let value = self.unwrap_value(l.clone());
        let ty = value.ty.clone();
        let r = self.expr_as(right, &ty);
        if l.is_pure() {
            return TExpr::new(
                ExprKind::Conditional {
                    cond: Box::new(truthy(l)),
                    then: Box::new(value),
                    els: Box::new(r),
                },
                ty,
            );
        }
        if !unobservable(&r) {
            return self.unsupported_expr(e, "fallback whose operands both have side effects");
        }
        TExpr::builtin(Builtin::ValueOr, vec![l, r], ty)
    }

    /// `m[k] || d` and `m.k || d` on a dictionary: a lookup guarded by a
    /// presence test.
    fn dictionary_fallback(&mut self, left: &Expr, right: &Expr, e: &Expr) -> Option<TExpr> {
        let Expr::MemberExpression {
            object,
            property,
            computed,
        } = left.unwrap_parens()
        else {
            return None;
        };
        let Type::Map(key_ty, value_ty) = self.type_of(object).unwrap_optional().clone() else {
            return None;
        };
        let name = if *computed {
            None
        } else {
            Some(property.as_ident()?.to_string())
        };
        let recv = self.expr(object);
        let recv = self.unwrap_value(recv);
        let key = match name {
            Some(name) => TExpr::string(name),
            None => self.expr_as(property, &key_ty),
        };
        if !recv.is_pure() || !key.is_pure() {
            return Some(self.unsupported_expr(e, "dictionary lookup whose key has side effects"));
        }
        let test = TExpr::builtin(
            Builtin::MapContains,
            vec![recv.clone(), key.clone()],
            Type::bool(),
        );
        let hit = TExpr::builtin(Builtin::MapGet, vec![recv, key], (*value_ty).clone());
        let miss = self.expr_as(right, &value_ty);
        Some(TExpr::new(
            ExprKind::Conditional {
                cond: Box::new(test),
                then: Box::new(hit),
                els: Box::new(miss),
            },
            *value_ty,
        ))
    }

    fn unary(&mut self, op: &str, argument: &Expr, e: &Expr) -> TExpr {
        match op {
            "!" => {
                let value = self.expr(argument);
                falsy(value)
            }
            "-" => {
                if let Some(value) = integer_value(e) {
                    let ty = if fits(value, &Type::i32()) {
                        Type::i32()
                    } else {
                        Type::int(64, true)
                    };
                    return TExpr::int(value, ty);
                }
                let value = self.expr(argument);
                let value = self.unwrap_value(value);
                if let ExprKind::Literal(Lit::Float(f)) = value.kind {
                    return float(-f);
                }
                let ty = self.type_of(e);
                let operand = if value.ty.is_integer() {
                    value.cast(ty.clone())
                } else {
                    value
                };
                TExpr::unary(UnOp::Neg, operand, ty)
            }
            "+" => {
                let value = self.expr(argument);
                if value.ty.is_string() {
                    TExpr::builtin(Builtin::ParseInt, vec![value], Type::u32())
                } else {
                    value
                }
            }
            "~" => {
                let ty = self.type_of(e);
                let value = self.expr(argument);
                let value = self.unwrap_value(value);
                let operand = if value.ty.is_integer() {
                    value.cast(ty.clone())
                } else {
                    coerce(value, &ty)
                };
                TExpr::unary(UnOp::BitNot, operand, ty)
            }
            "typeof" => {
                let ty = self.type_of(argument);
                TExpr::string(typeof_name(&ty))
            }
            "void" => TExpr::null(Type::optional(Type::u32())),
            "delete" => self.delete(argument, e),
            _ => self.unhandled_expr(e, &format!("operator `{op}`")),
        }
    }

    fn delete(&mut self, argument: &Expr, e: &Expr) -> TExpr {
        let Expr::MemberExpression {
            object,
            property,
            computed,
        } = argument.unwrap_parens()
        else {
            return self.unsupported_expr(e, "`delete` of something other than a member");
        };
        let Type::Map(key_ty, _) = self.type_of(object).unwrap_optional().clone() else {
            return self.unsupported_expr(e, "`delete` on a value that is not a dictionary");
        };
        let key = match (computed, property.as_ident()) {
            (false, Some(name)) => TExpr::string(name),
            (false, None) => return self.unhandled_expr(e, "member key"),
            (true, _) => self.expr_as(property, &key_ty),
        };
        let recv = self.expr(object);
        let recv = self.unwrap_value(recv);
        TExpr::builtin(Builtin::MapDelete, vec![recv, key], Type::void())
    }

    fn update(&mut self, op: &str, argument: &Expr, prefix: bool, e: &Expr) -> TExpr {
        let target = self.expr(argument);
        if !target.is_lvalue() {
            return self.unsupported_expr(e, "increment of a value that is not a variable");
        }
        let ty = target.ty.clone();
        let increment = op == "++";
        if prefix {
            let op = if increment { UnOp::PreInc } else { UnOp::PreDec };
            TExpr::unary(op, target, ty)
        } else {
            let op = if increment { IncDec::Inc } else { IncDec::Dec };
            TExpr::new(
                ExprKind::Postfix {
                    op,
                    target: Box::new(target),
                },
                ty,
            )
        }
    }

    fn assignment(&mut self, op: &str, left: &Expr, right: &Expr, e: &Expr) -> TExpr {
        let left = left.unwrap_parens();
        if matches!(left, Expr::ArrayPattern { .. } | Expr::ObjectPattern { .. }) {
            return self.unsupported_expr(e, "destructuring assignment inside an expression");
        }
        if op == "="
            && let Some(store) = self.store(left, right)
        {
            return store;
        }

        let target = self.expr(left);
        if !target.is_lvalue() {
            return self.unsupported_expr(e, "assignment to a value that is not a variable");
        }
        let ty = target.ty.clone();
        let expands = matches!(op, ">>>=" | "**=" | "||=" | "&&=" | "??=");
        if expands && !target.is_pure() {
            return self.unsupported_expr(e, "compound assignment to a target with side effects");
        }

        match op {
            "=" => {
                let value = self.expr_as(right, &ty);
                if let Some(name) = left.as_ident() {
                    self.scope.refine(name, &value.ty);
                }
                TExpr::assign(target, value)
            }
            ">>>=" => {
                let amount = self.expr(right);
                let shifted =
                    TExpr::binary(BinOp::Shr, target.clone().cast(Type::u32()), amount, Type::u32());
                TExpr::assign(target, coerce(shifted, &ty))
            }
            "**=" => {
                let exponent = self.expr(right);
                let value = pow(target.clone(), exponent, &ty);
                TExpr::assign(target, coerce(value, &ty))
            }
            "||=" | "&&=" | "??=" => {
                let value = self.expr_as(right, &ty);
                let test = truthy(target.clone());
                let (then, els) = if op == "&&=" {
                    (value, target.clone())
                } else {
                    (target.clone(), value)
                };
                let chosen = TExpr::new(
                    ExprKind::Conditional {
                        cond: Box::new(test),
                        then: Box::new(then),
                        els: Box::new(els),
                    },
                    ty,
                );
                TExpr::assign(target, chosen)
            }
            _ => {
                let Some(bin) = op.strip_suffix('=').and_then(bin_op) else {
                    return self.unhandled_expr(e, &format!("operator `{op}`"));
                };
                let mut value = self.expr(right);
                if bin == BinOp::Add && ty.is_string() {
                    value = stringify(self.unwrap_value(value));
                }
                TExpr::new(
                    ExprKind::Assign {
                        op: Some(bin),
                        target: Box::new(target),
                        value: Box::new(value),
                    },
                    ty,
                )
            }
        }
    }

    /// Stores that are calls in the target: dictionary entries, sequence
    /// lengths and property setters.
    fn store(&mut self, left: &Expr, right: &Expr) -> Option<TExpr> {
        let Expr::MemberExpression {
            object,
            property,
            computed,
        } = left
        else {
            return None;
        };
        let name = if *computed { None } else { property.as_ident() };
        match self.type_of(object).unwrap_optional().clone() {
            Type::Map(key_ty, value_ty) => {
                if !computed && name.is_none() {
                    return None;
                }
                let recv = self.expr(object);
                let recv = self.unwrap_value(recv);
                let key = match name {
                    Some(name) => TExpr::string(name),
                    None => self.expr_as(property, &key_ty),
                };
                let value = self.expr_as(right, &value_ty);
                Some(TExpr::builtin(Builtin::MapSet, vec![recv, key, value], Type::void()))
            }
            Type::Sequence(_) if name == Some("length") => {
                let recv = self.expr(object);
                let length = self.expr_as(right, &Type::u32());
                Some(TExpr::builtin(Builtin::Resize, vec![recv, length], Type::void()))
            }
            Type::Named(owner) => {
                let (setter, param) = self.accessor(&owner, "set", name?)?;
                let recv = self.expr(object);
                let recv = self.unwrap_value(recv);
                let value = self.expr_as(right, &param);
                Some(TExpr::new(
                    ExprKind::Call {
                        callee: Callee::Method {
                            recv: Box::new(recv),
                            name: setter,
                        },
                        args: vec![value],
                    },
                    Type::void(),
                ))
            }
            _ => None,
        }
    }

    fn conditional(
        &mut self,
        test: &Expr,
        consequent: &Expr,
        alternate: &Expr,
        want: Option<&Type>,
    ) -> TExpr {
        let cond = self.cond(test);
        let ty = match want {
            Some(want) => want.clone(),
            None => self.conditional_type(consequent, alternate),
        };
        let then = self.expr_as(consequent, &ty);
        let els = self.expr_as(alternate, &ty);
        TExpr::new(
            ExprKind::Conditional {
                cond: Box::new(cond),
                then: Box::new(then),
                els: Box::new(els),
            },
            ty,
        )
    }

    /// The consequent decides; a `null` branch makes the type optional,
    /// except for collections, which use their empty value.
    fn conditional_type(&self, consequent: &Expr, alternate: &Expr) -> Type {
        let then_null = consequent.is_null_like();
        let els_null = alternate.is_null_like();
        let base = if then_null {
            self.type_of(alternate)
        } else {
            self.type_of(consequent)
        };
        if (then_null || els_null) && !base.is_sequence() && !base.is_map() {
            Type::optional(base)
        } else {
            base
        }
    }

    /// Arrow and function expressions. `params_hint` and `ret_hint` come
    /// from the context (a callback slot or a declared function type).
    pub(super) fn lambda(&mut self, e: &Expr, params_hint: &[Type], ret_hint: Option<&Type>) -> TExpr {
        let (params, body) = match e.unwrap_parens() {
            Expr::ArrowFunctionExpression(arrow) => (
                arrow.params.as_slice(),
                match &arrow.body {
                    ArrowBody::Expr(value) => Body::Expr(value),
                    ArrowBody::Block(block) => Body::Block(&block.body),
                },
            ),
            Expr::FunctionExpression(func) => (func.params.as_slice(), Body::Block(&func.body.body)),
            _ => return self.expr(e),
        };

        let mut param_tys = Vec::with_capacity(params.len());
        for (i, param) in params.iter().enumerate() {
            let name = param.binding_name().unwrap_or("arg");
            let found = match params_hint.get(i) {
                Some(ty) if !ty.contains_unknown() => Inferred::structural(ty.clone()),
                _ => complete(Some(name), Inferred::unknown(), false),
            };
            self.note_origin(name, &found, param.kind());
            param_tys.push(found.ty);
        }

        let ret = match ret_hint {
            Some(ty) if !ty.contains_unknown() => ty.clone(),
            _ => {
                let found = callback_return(e, &param_tys, &self.cx());
                let silent = matches!(body, Body::Block(stmts) if !self.returns_value(stmts));
                if found.is_unknown() && silent {
                    Type::void()
                } else {
                    complete(None, Inferred::structural(found), false).ty
                }
            }
        };

        self.enter_routine(true);
        let mut lowered = Vec::with_capacity(params.len());
        for (param, ty) in params.iter().zip(&param_tys) {
            if param.binding_name().is_none() {
                self.unsupported(param.kind(), "destructuring parameter", param.span());
            }
            let name = param.binding_name().unwrap_or("arg");
            let target = self.declare_local(name, ty.clone(), param.kind());
            lowered.push(Param::new(target, ty.clone()));
        }
        let saved = std::mem::replace(&mut self.ret, ret.clone());
        let stmts = match body {
            Body::Expr(value) if ret.is_void() => {
                let mut out = Vec::new();
                self.expr_stmt(value, &mut out);
                out
            }
            Body::Expr(value) => vec![t::Stmt::Return(Some(self.expr_as(value, &ret)))],
            Body::Block(stmts) => self.stmts(stmts),
        };
        self.ret = saved;
        self.exit_routine();

        TExpr::new(
            ExprKind::Lambda {
                params: lowered,
                ret: ret.clone(),
                body: stmts,
            },
            Type::func(param_tys, ret),
        )
    }

    /// True if some `return` in `body` carries a value.
    pub(super) fn returns_value(&self, body: &[Stmt]) -> bool {
        let mut found = false;
        let mut walker = BodyWalker::new(self.scope.clone(), self.index, self.class.as_deref());
        walker.walk(body, &mut |visit, _| {
            if let Visit::Return(Some(_)) = visit {
                found = true;
            }
        });
        found
    }

    fn template(&mut self, quasis: &[TemplateElement], expressions: &[Expr]) -> TExpr {
        let mut parts = Vec::new();
        for (i, quasi) in quasis.iter().enumerate() {
            let text = quasi
                .value
                .cooked
                .clone()
                .unwrap_or_else(|| quasi.value.raw.clone());
            if !text.is_empty() {
                parts.push(TExpr::string(text));
            }
            if let Some(e) = expressions.get(i) {
                let value = self.expr(e);
                parts.push(stringify(self.unwrap_value(value)));
            }
        }
        parts
            .into_iter()
            .reduce(|acc, part| TExpr::binary(BinOp::Add, acc, part, Type::string()))
            .unwrap_or_else(|| TExpr::string(""))
    }

    fn array(&mut self, elements: &[Option<Expr>], e: &Expr, want: Option<&Type>) -> TExpr {
        let ty = match want {
            Some(want) if want.is_sequence() => want.clone(),
            _ => self.type_of(e),
        };
        let element = ty.element().cloned().unwrap_or_else(Type::u8);

        let mut parts: Vec<TExpr> = Vec::new();
        let mut run: Vec<TExpr> = Vec::new();
        for item in elements {
            match item {
                Some(Expr::SpreadElement { argument }) => {
                    if !run.is_empty() {
                        parts.push(TExpr::new(ExprKind::ArrayLit(std::mem::take(&mut run)), ty.clone()));
                    }
                    parts.push(self.expr_as(argument, &ty));
                }
                Some(item) => run.push(self.expr_as(item, &element)),
                None => run.push(empty_value(&element)),
            }
        }
        if !run.is_empty() || parts.is_empty() {
            parts.push(TExpr::new(ExprKind::ArrayLit(run), ty.clone()));
        }
        parts
            .into_iter()
            .reduce(|acc, part| TExpr::builtin(Builtin::Concat, vec![acc, part], ty.clone()))
            .unwrap_or_else(|| TExpr::new(ExprKind::ArrayLit(Vec::new()), ty))
    }

    /// Object literals: positional construction of a framework record whose
    /// fields match the keys, a map literal when every value is itself an
    /// object, and a field-initializer list otherwise.
    fn object(&mut self, properties: &[Expr], e: &Expr, want: Option<&Type>) -> TExpr {
        let Some(keys) = object_keys(properties) else {
            return self.unsupported_expr(e, "computed or spread key in an object literal");
        };
        let values: Vec<(String, &Expr)> = properties
            .iter()
            .filter_map(|p| match p {
                Expr::Property { key, value, .. } => Some((key.key_name()?, value.as_ref())),
                _ => None,
            })
            .collect();

        let kb = framework();
        let wanted_record = want
            .and_then(Type::named_str)
            .and_then(|name| kb.get(name))
            .filter(|entry| entry.is_record());
        let record = match wanted_record {
            Some(record) => Some(record),
            None if !keys.is_empty() => kb.record_matching(keys.as_slice()),
            None => None,
        };
        if let Some(record) = record {
            let mut args = Vec::with_capacity(record.fields.len());
            for (field, ty) in &record.fields {
                let arg = match values.iter().find(|(key, _)| key == field) {
                    Some((_, value)) => self.expr_as(value, ty),
                    None => empty_value(ty),
                };
                args.push(arg);
            }
            return TExpr::new(ExprKind::Construct { args }, Type::named(record.name.as_str()));
        }

        let ty = match want {
            Some(want) if want.is_map() => want.clone(),
            _ => self.type_of(e),
        };
        let Type::Map(key_ty, value_ty) = ty.clone() else {
            return self.unsupported_expr(e, "object literal of an unknown shape");
        };
        if values.is_empty() {
            return TExpr::new(ExprKind::MapLit(Vec::new()), ty);
        }
        let nested = values
            .iter()
            .all(|(_, value)| matches!(value.unwrap_parens(), Expr::ObjectExpression { .. }));
        if nested {
            let mut entries = Vec::with_capacity(values.len());
            for (key, value) in &values {
                let key = coerce(TExpr::string(key.as_str()), &key_ty);
                entries.push((key, self.expr_as(value, &value_ty)));
            }
            return TExpr::new(ExprKind::MapLit(entries), ty);
        }
        let mut entries = Vec::with_capacity(values.len());
        for (key, value) in &values {
            entries.push((key.clone(), self.expr_as(value, &value_ty)));
        }
        TExpr::new(ExprKind::InitList(entries), ty)
    }
}

pub(super) fn bin_op(op: &str) -> Option<BinOp> {
    let bin = match op {
        "+" => BinOp::Add,
        "-" => BinOp::Sub,
        "*" => BinOp::Mul,
        "/" => BinOp::Div,
        "%" => BinOp::Rem,
        "<<" => BinOp::Shl,
        ">>" => BinOp::Shr,
        "&" => BinOp::BitAnd,
        "|" => BinOp::BitOr,
        "^" => BinOp::BitXor,
        "==" | "===" => BinOp::Eq,
        "!=" | "!==" => BinOp::Ne,
        "<" => BinOp::Lt,
        "<=" => BinOp::Le,
        ">" => BinOp::Gt,
        ">=" => BinOp::Ge,
        _ => return None,
    };
    Some(bin)
}

/// String form of a value for concatenation.
pub(super) fn stringify(e: TExpr) -> TExpr {
    if e.ty.is_string() {
        e
    } else {
        TExpr::builtin(Builtin::ToString, vec![e], Type::string())
    }
}

/// `a ** b`, converted back when an integer result is expected.
pub(super) fn pow(base: TExpr, exponent: TExpr, ty: &Type) -> TExpr {
    let value = TExpr::builtin(Builtin::Pow, vec![base, exponent], Type::f64());
    if ty.is_integer() {
        value.cast(ty.clone())
    } else {
        value
    }
}

/// Sub-word operands of a shift are widened to the result type first.
pub(super) fn widen(e: TExpr, ty: &Type) -> TExpr {
    if e.ty.is_integer() && ty.is_integer() && e.ty.width() < ty.width() {
        e.cast(ty.clone())
    } else {
        e
    }
}

pub(super) fn float(value: f64) -> TExpr {
    TExpr::new(ExprKind::Literal(Lit::Float(value)), Type::f64())
}

/// Evaluating `e` when its value is not needed changes nothing.
fn unobservable(e: &TExpr) -> bool {
    match &e.kind {
        ExprKind::ArrayLit(items) => items.iter().all(unobservable),
        ExprKind::MapLit(entries) => entries.iter().all(|(k, v)| unobservable(k) && unobservable(v)),
        ExprKind::InitList(fields) => fields.iter().all(|(_, v)| unobservable(v)),
        ExprKind::Builtin {
            op: Builtin::NewSequence,
            args,
        } => args.iter().all(unobservable),
        _ => e.is_pure(),
    }
}

fn math_constant(name: &str) -> Option<TExpr> {
    use std::f64::consts;
    let value = match name {
        "PI" => consts::PI,
        "E" => consts::E,
        "LN2" => consts::LN_2,
        "LN10" => consts::LN_10,
        "LOG2E" => consts::LOG2_E,
        "LOG10E" => consts::LOG10_E,
        "SQRT2" => consts::SQRT_2,
        "SQRT1_2" => consts::FRAC_1_SQRT_2,
        _ => return None,
    };
    Some(float(value))
}

fn is_hex(raw: &str) -> bool {
    raw.starts_with("0x") || raw.starts_with("0X")
}

/// What `typeof` yields for a value of static type `ty`.
fn typeof_name(ty: &Type) -> &'static str {
    match ty.unwrap_optional() {
        ty if ty.is_bool() => "boolean",
        ty if ty.is_numeric() => "number",
        ty if ty.is_string() => "string",
        ty if ty.is_function() => "function",
        _ => "object",
    }
}
