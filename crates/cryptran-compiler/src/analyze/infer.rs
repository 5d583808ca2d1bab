//! Type inference over source expressions.
//!
//! [`infer`] applies the structural and framework rules and may leave
//! `Unknown` holes. [`resolve`] runs the full chain for a declaration:
//! annotation, then structure and framework, then name heuristics, then the
//! defaults (`uint32`, `uint32?` for nullable initializers, `uint8` for holes
//! inside sequences).

use std::fmt;

use cryptran_core::Type;
use serde_json::{Number, Value};

use crate::source::{ArrowBody, Call, Expr, Literal, Stmt};

use super::framework::framework;
use super::heuristics;
use super::index::{BodyWalker, ProgramIndex, Visit};
use super::module::NAMESPACES;
use super::scope::ScopeStack;

/// Which rule produced a type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    Annotation,
    Framework,
    Structural,
    Heuristic,
    Default,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Origin::Annotation => "annotation",
            Origin::Framework => "framework",
            Origin::Structural => "structural",
            Origin::Heuristic => "heuristic",
            Origin::Default => "default",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Inferred {
    pub ty: Type,
    pub origin: Origin,
}

impl Inferred {
    pub fn new(ty: Type, origin: Origin) -> Self {
        Self { ty, origin }
    }

    pub fn structural(ty: Type) -> Self {
        Self::new(ty, Origin::Structural)
    }

    pub fn framework(ty: Type) -> Self {
        Self::new(ty, Origin::Framework)
    }

    pub fn unknown() -> Self {
        Self::structural(Type::Unknown)
    }

    pub fn is_resolved(&self) -> bool {
        !self.ty.contains_unknown()
    }

    fn map(self, f: impl FnOnce(Type) -> Type) -> Self {
        Self {
            ty: f(self.ty),
            origin: self.origin,
        }
    }
}

/// Everything inference may consult.
#[derive(Clone, Copy)]
pub struct InferCtx<'a> {
    pub scope: &'a ScopeStack,
    pub index: &'a ProgramIndex,
    /// Class whose members `this` refers to.
    pub class: Option<&'a str>,
}

impl<'a> InferCtx<'a> {
    pub fn new(scope: &'a ScopeStack, index: &'a ProgramIndex) -> Self {
        Self {
            scope,
            index,
            class: None,
        }
    }

    pub fn in_class(mut self, class: Option<&'a str>) -> Self {
        self.class = class;
        self
    }
}

/// Full resolution chain for a declaration named `name`.
pub fn resolve(
    name: Option<&str>,
    init: Option<&Expr>,
    annotation: Option<&Type>,
    cx: &InferCtx<'_>,
) -> Inferred {
    if let Some(ty) = annotation {
        return Inferred::new(ty.clone(), Origin::Annotation);
    }
    let nullable = init.is_some_and(Expr::is_null_like);
    let found = init.map_or_else(Inferred::unknown, |e| infer(e, cx));
    complete(name, found, nullable)
}

/// Close the holes structural inference left, from the name and defaults.
pub fn complete(name: Option<&str>, found: Inferred, nullable: bool) -> Inferred {
    if found.is_resolved() {
        return found;
    }
    let guess = name.and_then(heuristics::by_name);

    if found.ty.is_unknown() {
        return match guess {
            Some(ty) => Inferred::new(nullable_form(ty, nullable), Origin::Heuristic),
            None => Inferred::new(nullable_form(Type::u32(), nullable), Origin::Default),
        };
    }

    if let Some(guess) = guess
        && same_shape(&found.ty, &guess)
    {
        return Inferred::new(guess, Origin::Heuristic);
    }

    let fill = if found.ty.is_sequence() {
        Type::u8()
    } else {
        Type::u32()
    };
    found.map(|ty| ty.fill_unknown(&fill))
}

/// Sequences and maps represent absence as emptiness; everything else
/// becomes optional.
fn nullable_form(ty: Type, nullable: bool) -> Type {
    if nullable && !ty.is_sequence() && !ty.is_map() {
        Type::optional(ty)
    } else {
        ty
    }
}

fn same_shape(found: &Type, guess: &Type) -> bool {
    matches!(
        (found, guess),
        (Type::Sequence(_), Type::Sequence(_)) | (Type::Map(..), Type::Map(..))
    )
}

/// Structural and framework inference. May return `Unknown` or a type with
/// `Unknown` holes.
pub fn infer(expr: &Expr, cx: &InferCtx<'_>) -> Inferred {
    match expr {
        Expr::Literal(lit) => Inferred::structural(literal_type(lit)),
        Expr::Identifier(id) => identifier(&id.name, cx),
        Expr::ThisExpression {} => match cx.class {
            Some(class) => Inferred::structural(Type::named(class)),
            None => Inferred::unknown(),
        },
        Expr::Super {} => match cx.class.and_then(|c| cx.index.base_of(c)) {
            Some(base) => Inferred::structural(Type::named(base)),
            None => Inferred::unknown(),
        },
        Expr::BinaryExpression {
            operator,
            left,
            right,
        } => binary(operator, left, right, cx),
        Expr::LogicalExpression {
            operator,
            left,
            right,
        } => logical(operator, left, right, cx),
        Expr::UnaryExpression { operator, argument } => unary(operator, argument, cx),
        Expr::UpdateExpression { argument, .. } => infer(argument, cx),
        Expr::AssignmentExpression {
            operator,
            left,
            right,
        } => {
            if operator == "=" {
                infer(right, cx)
            } else {
                infer(left, cx)
            }
        }
        Expr::CallExpression(call) => self::call(call, cx),
        Expr::NewExpression(call) => construct(call, cx),
        Expr::MemberExpression {
            object,
            property,
            computed,
        } => member(object, property, *computed, cx),
        Expr::ArrayExpression { elements } => array(elements, cx),
        Expr::ObjectExpression { properties } => object(properties, cx),
        Expr::ConditionalExpression {
            consequent,
            alternate,
            ..
        } => {
            let then = infer(consequent, cx);
            if then.ty.is_unknown() {
                infer(alternate, cx)
            } else {
                then
            }
        }
        Expr::ArrowFunctionExpression(arrow) => {
            let params = vec![Type::Unknown; arrow.params.len()];
            let ret = match &arrow.body {
                ArrowBody::Expr(body) => infer(body, cx).ty,
                ArrowBody::Block(block) => block_return(&block.body, cx),
            };
            Inferred::structural(Type::func(params, ret))
        }
        Expr::FunctionExpression(func) => {
            let params = vec![Type::Unknown; func.params.len()];
            let ret = block_return(&func.body.body, cx);
            Inferred::structural(Type::func(params, ret))
        }
        Expr::TemplateLiteral { .. } => Inferred::structural(Type::string()),
        Expr::SequenceExpression { expressions } => expressions
            .last()
            .map_or_else(Inferred::unknown, |e| infer(e, cx)),
        Expr::ParenthesizedExpression { expression } | Expr::ChainExpression { expression } => {
            infer(expression, cx)
        }
        Expr::SpreadElement { argument } => infer(argument, cx),
        Expr::AssignmentPattern { left, right } => {
            let ty = infer(left, cx);
            if ty.ty.is_unknown() { infer(right, cx) } else { ty }
        }
        Expr::Property { .. }
        | Expr::ArrayPattern { .. }
        | Expr::ObjectPattern { .. }
        | Expr::RestElement { .. }
        | Expr::Unsupported(_) => Inferred::unknown(),
    }
}

/// Type of a literal on its own.
pub fn literal_type(lit: &Literal) -> Type {
    if lit.bigint.is_some() {
        return Type::u64();
    }
    if lit.regex.is_some() {
        return Type::Unknown;
    }
    match &lit.value {
        Value::Bool(_) => Type::bool(),
        Value::String(_) => Type::string(),
        Value::Number(n) => number_type(n, lit.raw.as_deref()),
        _ => Type::Unknown,
    }
}

/// True when the literal is written as a float (`1.5`, `1e3`), as opposed to
/// an integer in any radix.
pub fn is_float_literal(n: &Number, raw: Option<&str>) -> bool {
    if let Some(raw) = raw {
        let raw = raw.to_ascii_lowercase();
        if raw.starts_with("0x") || raw.starts_with("0b") || raw.starts_with("0o") {
            return false;
        }
        return raw.contains('.') || raw.contains('e');
    }
    !n.is_u64() && !n.is_i64() && n.as_f64().is_some_and(|f| f.fract() != 0.0)
}

fn number_type(n: &Number, raw: Option<&str>) -> Type {
    if is_float_literal(n, raw) {
        return Type::f64();
    }
    if let Some(u) = n.as_u64() {
        return if u > u32::MAX as u64 { Type::u64() } else { Type::u32() };
    }
    if let Some(i) = n.as_i64() {
        return if i >= i32::MIN as i64 {
            Type::i32()
        } else {
            Type::int(64, true)
        };
    }
    match n.as_f64() {
        Some(f) if f > u32::MAX as f64 => Type::u64(),
        _ => Type::u32(),
    }
}

/// Integer value of an integer literal, looking through unary minus.
pub fn integer_value(expr: &Expr) -> Option<i128> {
    match expr.unwrap_parens() {
        Expr::Literal(lit) => match &lit.value {
            Value::Number(n) if !is_float_literal(n, lit.raw.as_deref()) => n
                .as_u64()
                .map(i128::from)
                .or_else(|| n.as_i64().map(i128::from))
                .or_else(|| n.as_f64().map(|f| f as i128)),
            _ => None,
        },
        Expr::UnaryExpression { operator, argument } if operator == "-" => {
            integer_value(argument).map(|v| -v)
        }
        _ => None,
    }
}

/// Widen sub-word integers the way the source language's 32-bit bit
/// operations do.
fn promote(ty: &Type) -> Type {
    match ty.width() {
        Some(w) if ty.is_integer() && w < 32 => Type::int(32, ty.is_signed()),
        _ => ty.clone(),
    }
}

fn identifier(name: &str, cx: &InferCtx<'_>) -> Inferred {
    if let Some(ty) = cx.scope.lookup(name) {
        return Inferred::structural(ty.clone());
    }
    if let Some(ty) = cx.index.global(name) {
        return Inferred::structural(ty.clone());
    }
    if let Some(sig) = cx.index.function(name) {
        return Inferred::structural(sig.as_type());
    }
    if cx.index.class(name).is_some() {
        return Inferred::structural(Type::named(name));
    }
    let kb = framework();
    if let Some(sig) = kb.global(name) {
        return Inferred::framework(sig.as_type());
    }
    if kb.get(name).is_some() {
        return Inferred::framework(Type::named(name));
    }
    match name {
        "NaN" | "Infinity" => Inferred::structural(Type::f64()),
        _ => Inferred::unknown(),
    }
}

fn binary(op: &str, left: &Expr, right: &Expr, cx: &InferCtx<'_>) -> Inferred {
    match op {
        "==" | "!=" | "===" | "!==" | "<" | "<=" | ">" | ">=" | "instanceof" | "in" => {
            Inferred::structural(Type::bool())
        }
        ">>>" => Inferred::structural(Type::u32()),
        "|" if integer_value(right) == Some(0) => Inferred::structural(Type::i32()),
        "&" | "|" | "^" | "<<" | ">>" => {
            let l = infer(left, cx).ty.unwrap_optional().clone();
            let ty = if l.is_integer() {
                promote(&l)
            } else {
                let r = infer(right, cx).ty.unwrap_optional().clone();
                if r.is_integer() { promote(&r) } else { Type::u32() }
            };
            Inferred::structural(ty)
        }
        "+" => {
            let l = infer(left, cx);
            let r = infer(right, cx);
            if l.ty.is_string() || r.ty.is_string() {
                Inferred::structural(Type::string())
            } else {
                arithmetic(&l.ty, &r.ty)
            }
        }
        "-" | "*" | "/" | "%" | "**" => arithmetic(&infer(left, cx).ty, &infer(right, cx).ty),
        _ => Inferred::unknown(),
    }
}

fn arithmetic(l: &Type, r: &Type) -> Inferred {
    let (l, r) = (l.unwrap_optional(), r.unwrap_optional());
    let ty = if l.is_float() || r.is_float() {
        Type::f64()
    } else if l.is_integer() && r.is_integer() {
        let (lw, rw) = (l.width().unwrap_or(32), r.width().unwrap_or(32));
        if rw > lw { promote(r) } else { promote(l) }
    } else if l.is_integer() {
        promote(l)
    } else if r.is_integer() {
        promote(r)
    } else {
        Type::Unknown
    };
    Inferred::structural(ty)
}

fn logical(op: &str, left: &Expr, right: &Expr, cx: &InferCtx<'_>) -> Inferred {
    let l = infer(left, cx);
    let r = infer(right, cx);
    if l.ty.is_bool() && r.ty.is_bool() {
        return l;
    }
    match op {
        "&&" => r,
        _ if l.ty.is_unknown() => r,
        _ => l.map(|ty| ty.unwrap_optional().clone()),
    }
}

fn unary(op: &str, argument: &Expr, cx: &InferCtx<'_>) -> Inferred {
    match op {
        "!" | "delete" => Inferred::structural(Type::bool()),
        "typeof" => Inferred::structural(Type::string()),
        "void" => Inferred::unknown(),
        "-" => infer(argument, cx).map(|ty| match ty.unwrap_optional() {
            t if t.is_integer() => Type::int(t.width().unwrap_or(32).max(32), true),
            t if t.is_float() => t.clone(),
            _ => Type::Unknown,
        }),
        "+" => infer(argument, cx).map(|ty| {
            if ty.is_float() { Type::f64() } else { Type::u32() }
        }),
        "~" => infer(argument, cx).map(|ty| {
            if ty.is_integer() { promote(&ty) } else { Type::u32() }
        }),
        _ => Inferred::unknown(),
    }
}

/// Member `name` of a value of type `owner`, searching local classes and
/// then the framework catalogue.
pub fn member_of(owner: &str, name: &str, cx: &InferCtx<'_>) -> Inferred {
    let kb = framework();
    if kb.enum_has(owner, name) {
        return Inferred::framework(Type::named(owner));
    }
    if let Some(found) = cx.index.member_type(owner, name) {
        return found;
    }
    if let Some(sig) = cx.index.method_sig(owner, name) {
        return Inferred::structural(sig.as_type());
    }
    Inferred::unknown()
}

fn member(object: &Expr, property: &Expr, computed: bool, cx: &InferCtx<'_>) -> Inferred {
    let object = object.unwrap_parens();

    if !computed && let Some(name) = property.as_ident() {
        if let Some(owner) = object.as_ident()
            && !cx.scope.is_declared(owner)
            && let Some(found) = static_member(owner, name, cx)
        {
            return found;
        }
        if name == "length" {
            return Inferred::structural(Type::u32());
        }
        let recv = infer(object, cx);
        return match recv.ty.unwrap_optional() {
            Type::Named(owner) => member_of(owner, name, cx),
            Type::Map(_, value) => Inferred::structural((**value).clone()),
            _ => Inferred::unknown(),
        };
    }

    let recv = infer(object, cx);
    match recv.ty.unwrap_optional() {
        Type::Sequence(element) => Inferred::structural((**element).clone()),
        Type::Map(_, value) => Inferred::structural((**value).clone()),
        t if t.is_string() => Inferred::structural(Type::string()),
        Type::Named(owner) => match property.key_name() {
            Some(key) if matches!(property, Expr::Literal(_)) => member_of(owner, &key, cx),
            _ => Inferred::unknown(),
        },
        _ => Inferred::unknown(),
    }
}

/// `Namespace.member`, `Enum.MEMBER`, `Class.staticField`.
fn static_member(owner: &str, name: &str, cx: &InferCtx<'_>) -> Option<Inferred> {
    let kb = framework();
    match owner {
        "OpCodes" => {
            return kb
                .global(&format!("OpCodes.{name}"))
                .map(|sig| Inferred::framework(sig.as_type()));
        }
        "AlgorithmFramework" => {
            if let Some(sig) = kb.global(name) {
                return Some(Inferred::framework(sig.as_type()));
            }
            return kb.get(name).map(|_| Inferred::framework(Type::named(name)));
        }
        "Math" => return Some(Inferred::structural(Type::f64())),
        "Number" => {
            let ty = match name {
                "MAX_SAFE_INTEGER" | "MIN_SAFE_INTEGER" => Type::u64(),
                _ => Type::f64(),
            };
            return Some(Inferred::structural(ty));
        }
        _ => {}
    }
    if kb.is_enum(owner) {
        return Some(Inferred::framework(Type::named(owner)));
    }
    if cx.index.class(owner).is_some() {
        return Some(member_of(owner, name, cx));
    }
    None
}

fn array(elements: &[Option<Expr>], cx: &InferCtx<'_>) -> Inferred {
    let present: Vec<&Expr> = elements.iter().flatten().collect();
    if present.is_empty() {
        return Inferred::structural(Type::seq(Type::Unknown));
    }

    let values: Option<Vec<i128>> = present.iter().map(|e| integer_value(e)).collect();
    if let Some(values) = values {
        let ty = if values.iter().any(|v| *v < 0) {
            Type::i32()
        } else {
            let max = values.iter().copied().max().unwrap_or(0);
            Type::smallest_unsigned(u64::try_from(max).unwrap_or(u64::MAX))
        };
        return Inferred::structural(Type::seq(ty));
    }

    for element in &present {
        if let Expr::SpreadElement { argument } = element {
            let spread = infer(argument, cx);
            if spread.ty.is_sequence() && spread.is_resolved() {
                return spread;
            }
            continue;
        }
        let found = infer(element, cx);
        if !found.ty.is_unknown() {
            return found.map(Type::seq);
        }
    }
    Inferred::structural(Type::seq(Type::Unknown))
}

/// Keys of an object literal, or `None` if any key is computed or spread.
pub fn object_keys(properties: &[Expr]) -> Option<Vec<String>> {
    properties
        .iter()
        .map(|p| match p {
            Expr::Property {
                key,
                computed: false,
                ..
            } => key.key_name(),
            _ => None,
        })
        .collect()
}

fn object(properties: &[Expr], cx: &InferCtx<'_>) -> Inferred {
    if let Some(keys) = object_keys(properties)
        && !keys.is_empty()
        && let Some(record) = framework().record_matching(keys.as_slice())
    {
        return Inferred::framework(Type::named(record.name.as_str()));
    }
    let value = properties
        .iter()
        .find_map(|p| match p {
            Expr::Property { value, .. } => Some(infer(value, cx).ty),
            _ => None,
        })
        .unwrap_or(Type::Unknown);
    Inferred::structural(Type::map(Type::string(), value))
}

/// Name of the constructed type in `new X(..)` / `new AlgorithmFramework.X(..)`.
pub fn constructed_name(callee: &Expr) -> Option<&str> {
    match callee.unwrap_parens() {
        Expr::Identifier(id) => Some(&id.name),
        expr => match expr.as_member() {
            Some((Expr::Identifier(ns), name)) if NAMESPACES.contains(&ns.name.as_str()) => {
                Some(name)
            }
            _ => None,
        },
    }
}

/// Element type of a typed-array constructor name.
pub fn typed_array_element(name: &str) -> Option<Type> {
    let ty = match name {
        "Uint8Array" | "Uint8ClampedArray" => Type::u8(),
        "Int8Array" => Type::int(8, true),
        "Uint16Array" => Type::u16(),
        "Int16Array" => Type::int(16, true),
        "Uint32Array" => Type::u32(),
        "Int32Array" => Type::i32(),
        "Float32Array" => Type::float(32),
        "Float64Array" => Type::f64(),
        "BigUint64Array" => Type::u64(),
        "BigInt64Array" => Type::int(64, true),
        _ => return None,
    };
    Some(ty)
}

pub fn is_error_type(name: &str) -> bool {
    matches!(
        name,
        "Error" | "TypeError" | "RangeError" | "ReferenceError" | "SyntaxError"
    )
}

fn construct(call: &Call, cx: &InferCtx<'_>) -> Inferred {
    let Some(name) = constructed_name(&call.callee) else {
        return Inferred::unknown();
    };
    if let Some(element) = typed_array_element(name) {
        return Inferred::structural(Type::seq(element));
    }
    if name == "Array" {
        let elements = if call.arguments.len() == 1 {
            Vec::new()
        } else {
            call.arguments.iter().cloned().map(Some).collect()
        };
        return array(&elements, cx);
    }
    if is_error_type(name) {
        return Inferred::structural(Type::named("Error"));
    }
    match name {
        "Map" => Inferred::structural(Type::map(Type::Unknown, Type::Unknown)),
        "Object" => Inferred::structural(Type::map(Type::string(), Type::Unknown)),
        _ if cx.index.class(name).is_some() => Inferred::structural(Type::named(name)),
        _ if framework().get(name).is_some() => Inferred::framework(Type::named(name)),
        _ => Inferred::structural(Type::named(name)),
    }
}

fn call(call: &Call, cx: &InferCtx<'_>) -> Inferred {
    match call.callee.unwrap_parens() {
        Expr::Identifier(id) => function_call(&id.name, cx),
        Expr::Super {} => Inferred::structural(Type::void()),
        callee => match callee.as_member() {
            Some((object, name)) => method_call(object, name, &call.arguments, cx),
            None => match infer(callee, cx).ty {
                Type::Function { ret, .. } => Inferred::structural(*ret),
                _ => Inferred::unknown(),
            },
        },
    }
}

fn function_call(name: &str, cx: &InferCtx<'_>) -> Inferred {
    if let Some(Type::Function { ret, .. }) = cx.scope.lookup(name) {
        return Inferred::structural((**ret).clone());
    }
    if let Some(sig) = cx.index.function(name) {
        return Inferred::structural(sig.ret.clone());
    }
    if let Some(sig) = framework().global(name) {
        return Inferred::framework(sig.ret.clone());
    }
    let ty = match name {
        "parseInt" | "Number" => Type::u32(),
        "parseFloat" => Type::f64(),
        "String" => Type::string(),
        "Boolean" | "isNaN" | "isFinite" => Type::bool(),
        _ => Type::Unknown,
    };
    Inferred::structural(ty)
}

fn method_call(object: &Expr, name: &str, args: &[Expr], cx: &InferCtx<'_>) -> Inferred {
    let object = object.unwrap_parens();
    let kb = framework();

    if let Some(ns) = object.as_ident()
        && !cx.scope.is_declared(ns)
    {
        let found = match ns {
            "OpCodes" => Some(
                kb.global(&format!("OpCodes.{name}"))
                    .map_or_else(Inferred::unknown, |sig| Inferred::framework(sig.ret.clone())),
            ),
            "AlgorithmFramework" => Some(
                kb.global(name)
                    .map_or_else(Inferred::unknown, |sig| Inferred::framework(sig.ret.clone())),
            ),
            "Math" => Some(math(name, args, cx)),
            "String" => Some(Inferred::structural(Type::string())),
            "Array" => Some(match name {
                "isArray" => Inferred::structural(Type::bool()),
                "from" | "of" => args
                    .first()
                    .map(|a| infer(a, cx))
                    .filter(|a| a.ty.is_sequence())
                    .unwrap_or_else(|| Inferred::structural(Type::bytes())),
                _ => Inferred::unknown(),
            }),
            "Object" => Some(match name {
                "keys" => Inferred::structural(Type::seq(Type::string())),
                "freeze" | "seal" | "assign" => {
                    args.first().map_or_else(Inferred::unknown, |a| infer(a, cx))
                }
                "values" => args.first().map_or_else(Inferred::unknown, |a| {
                    infer(a, cx).map(|ty| match ty {
                        Type::Map(_, value) => Type::seq(*value),
                        _ => Type::seq(Type::Unknown),
                    })
                }),
                _ => Inferred::unknown(),
            }),
            "Number" => Some(Inferred::structural(match name {
                "parseFloat" => Type::f64(),
                "parseInt" => Type::u32(),
                _ => Type::bool(),
            })),
            "JSON" if name == "stringify" => Some(Inferred::structural(Type::string())),
            _ if cx.index.class(ns).is_some() => cx
                .index
                .method_sig(ns, name)
                .map(|sig| Inferred::structural(sig.ret)),
            _ => None,
        };
        if let Some(found) = found {
            return found;
        }
    }

    if matches!(object, Expr::Super {}) {
        let base = cx.class.and_then(|c| cx.index.base_of(c));
        return base
            .and_then(|b| cx.index.method_sig(b, name))
            .map_or_else(Inferred::unknown, |sig| Inferred::structural(sig.ret));
    }

    let recv = infer(object, cx);
    match recv.ty.unwrap_optional() {
        Type::Named(owner) => match cx.index.method_sig(owner, name) {
            Some(sig) if kb.method(owner, name).is_some() && cx.index.class(owner).is_none() => {
                Inferred::framework(sig.ret)
            }
            Some(sig) => Inferred::structural(sig.ret),
            None => Inferred::unknown(),
        },
        Type::Sequence(element) => sequence_method(name, element, args, cx),
        Type::Map(key, value) => Inferred::structural(match name {
            "get" => (**value).clone(),
            "has" | "delete" => Type::bool(),
            "set" | "clear" => Type::void(),
            "keys" => Type::seq((**key).clone()),
            "values" => Type::seq((**value).clone()),
            _ => Type::Unknown,
        }),
        t if t.is_string() => Inferred::structural(string_method(name)),
        t if t.is_numeric() => Inferred::structural(match name {
            "toString" | "toFixed" | "toPrecision" => Type::string(),
            _ => Type::Unknown,
        }),
        _ => Inferred::structural(match name {
            "join" | "toString" | "toUpperCase" | "toLowerCase" | "padStart" | "padEnd"
            | "substring" | "substr" | "charAt" | "trim" => Type::string(),
            "indexOf" | "lastIndexOf" | "findIndex" => Type::i32(),
            "includes" | "startsWith" | "endsWith" | "some" | "every" | "has" => Type::bool(),
            "push" | "unshift" => Type::u32(),
            "charCodeAt" => Type::u8(),
            _ => Type::Unknown,
        }),
    }
}

fn sequence_method(name: &str, element: &Type, args: &[Expr], cx: &InferCtx<'_>) -> Inferred {
    let ty = match name {
        "push" | "unshift" => Type::u32(),
        "pop" | "shift" | "find" | "at" => element.clone(),
        "slice" | "concat" | "reverse" | "fill" | "sort" | "splice" | "filter" | "copyWithin" => {
            Type::seq(element.clone())
        }
        "map" => {
            let ret = args
                .first()
                .map(|f| callback_return(f, &[element.clone(), Type::u32()], cx))
                .unwrap_or(Type::Unknown);
            Type::seq(if ret.is_unknown() { element.clone() } else { ret })
        }
        "indexOf" | "lastIndexOf" | "findIndex" => Type::i32(),
        "includes" | "some" | "every" => Type::bool(),
        "join" | "toString" => Type::string(),
        "reduce" => match args.get(1) {
            Some(init) => infer(init, cx).ty,
            None => element.clone(),
        },
        "forEach" => Type::void(),
        _ => Type::Unknown,
    };
    Inferred::structural(ty)
}

fn string_method(name: &str) -> Type {
    match name {
        "charCodeAt" | "codePointAt" => Type::u8(),
        "indexOf" | "lastIndexOf" | "search" => Type::i32(),
        "includes" | "startsWith" | "endsWith" => Type::bool(),
        "split" => Type::seq(Type::string()),
        _ => Type::string(),
    }
}

fn math(name: &str, args: &[Expr], cx: &InferCtx<'_>) -> Inferred {
    let arg = |i: usize| {
        args.get(i)
            .map_or(Type::Unknown, |a| infer(a, cx).ty.unwrap_optional().clone())
    };
    let ty = match name {
        "floor" | "ceil" | "round" | "trunc" => {
            let a = arg(0);
            if a.is_integer() { promote(&a) } else { Type::u32() }
        }
        "abs" => {
            let a = arg(0);
            if a.is_numeric() { a } else { Type::f64() }
        }
        "min" | "max" => {
            let tys: Vec<Type> = (0..args.len()).map(arg).collect();
            if tys.iter().any(Type::is_float) {
                Type::f64()
            } else {
                tys.iter()
                    .find(|t| t.is_integer())
                    .map_or_else(Type::u32, promote)
            }
        }
        "imul" | "sign" => Type::i32(),
        "clz32" => Type::u32(),
        _ => Type::f64(),
    };
    Inferred::structural(ty)
}

/// Return type of a callback called with arguments of `params`.
pub fn callback_return(callback: &Expr, params: &[Type], cx: &InferCtx<'_>) -> Type {
    let (names, body): (Vec<Option<&str>>, Result<&Expr, &[Stmt]>) = match callback.unwrap_parens()
    {
        Expr::ArrowFunctionExpression(arrow) => (
            arrow.params.iter().map(Expr::binding_name).collect(),
            match &arrow.body {
                ArrowBody::Expr(e) => Ok(e.as_ref()),
                ArrowBody::Block(b) => Err(b.body.as_slice()),
            },
        ),
        Expr::FunctionExpression(func) => (
            func.params.iter().map(Expr::binding_name).collect(),
            Err(func.body.body.as_slice()),
        ),
        other => {
            return match infer(other, cx).ty {
                Type::Function { ret, .. } => *ret,
                _ => Type::Unknown,
            };
        }
    };

    let mut scope = cx.scope.clone();
    scope.push_closure();
    for (name, ty) in names.iter().zip(params) {
        if let Some(name) = name {
            scope.declare(*name, ty.clone());
        }
    }
    let inner = InferCtx { scope: &scope, ..*cx };
    match body {
        Ok(expr) => infer(expr, &inner).ty,
        Err(stmts) => block_return(stmts, &inner),
    }
}

/// First resolved `return` type in a body, with locals bound as declared.
fn block_return(body: &[Stmt], cx: &InferCtx<'_>) -> Type {
    let mut found = Type::Unknown;
    let mut walker = BodyWalker::new(cx.scope.clone(), cx.index, cx.class);
    walker.walk(body, &mut |visit, inner| {
        if let Visit::Return(Some(arg)) = visit
            && found.is_unknown()
        {
            found = infer(arg, inner).ty;
        }
    });
    found
}
