//! Calls and construction, including the library idioms of the corpus:
//! collection and string methods, `Math`, and the `OpCodes` bit primitives.

use cryptran_core::Type;

use crate::analyze::framework;
use crate::analyze::infer::{constructed_name, integer_value, is_error_type, typed_array_element};
use crate::source::{Call, Expr};
use crate::target::{BinOp, Builtin, Callee, ExprKind, TExpr};

use super::coerce::coerce;
use super::exprs::{pow, stringify};
use super::lowerer::Lowerer;

/// `OpCodes` primitives expanded inline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WordOp {
    Rotate { left: bool, width: u8 },
    Pack { width: u8, big_endian: bool },
    Unpack { width: u8, big_endian: bool },
}

impl WordOp {
    fn parse(name: &str) -> Option<Self> {
        let width = |digits: &str| match digits {
            "8" => Some(8),
            "16" => Some(16),
            "32" => Some(32),
            _ => None,
        };
        let endian = |rest: &str| -> Option<(u8, bool)> {
            let (digits, big_endian) = match rest.strip_suffix("BE") {
                Some(digits) => (digits, true),
                None => (rest.strip_suffix("LE")?, false),
            };
            let width = width(digits).filter(|w| *w >= 16)?;
            Some((width, big_endian))
        };
        if let Some(rest) = name.strip_prefix("Rot") {
            let (left, digits) = match rest.strip_prefix('L') {
                Some(digits) => (true, digits),
                None => (false, rest.strip_prefix('R')?),
            };
            return Some(WordOp::Rotate {
                left,
                width: width(digits)?,
            });
        }
        if let Some(rest) = name.strip_prefix("Unpack") {
            let (width, big_endian) = endian(rest)?;
            return Some(WordOp::Unpack { width, big_endian });
        }
        let (width, big_endian) = endian(name.strip_prefix("Pack")?)?;
        Some(WordOp::Pack { width, big_endian })
    }

    fn arity(self) -> usize {
        match self {
            WordOp::Rotate { .. } => 2,
            WordOp::Pack { width, .. } => usize::from(width / 8),
            WordOp::Unpack { .. } => 1,
        }
    }
}

impl Lowerer<'_> {
    pub(super) fn call(&mut self, call: &Call, e: &Expr) -> TExpr {
        match call.callee.unwrap_parens() {
            Expr::Super {} => {
                self.unsupported_expr(e, "`super(..)` outside the start of a constructor")
            }
            Expr::Identifier(id) => self.free_call(&call.callee, &id.name, &call.arguments, e),
            callee => match callee.as_member() {
                Some((object, name)) => self.method_call(object, name, &call.arguments, e),
                None => {
                    let function = self.expr(callee);
                    let params = match &function.ty {
                        Type::Function { params, .. } => Some(params.clone()),
                        _ => None,
                    };
                    let args = self.args(&call.arguments, params.as_deref());
                    let ty = self.type_of(e);
                    call_expr(Callee::Value(Box::new(function)), args, ty)
                }
            },
        }
    }

    /// Lower call arguments against the parameter types, when known. Extra
    /// arguments beyond a known parameter list are dropped.
    pub(super) fn args(&mut self, args: &[Expr], params: Option<&[Type]>) -> Vec<TExpr> {
        let count = params.map_or(args.len(), |p| p.len().min(args.len()));
        let mut lowered = Vec::with_capacity(count);
        for (i, arg) in args.iter().take(count).enumerate() {
            let value = match (arg, params.and_then(|p| p.get(i))) {
                (Expr::SpreadElement { .. }, _) => self.unsupported_expr(arg, "spread argument"),
                (_, Some(ty)) => self.expr_as(arg, ty),
                (_, None) => self.expr(arg),
            };
            lowered.push(value);
        }
        lowered
    }

    fn free_call(&mut self, callee: &Expr, name: &str, args: &[Expr], e: &Expr) -> TExpr {
        if self.scope.is_declared(name) {
            let function = self.expr(callee);
            let Type::Function { params, ret } = function.ty.clone() else {
                return self.unsupported_expr(e, &format!("call of `{name}`, which is not a function"));
            };
            let args = self.args(args, Some(params.as_slice()));
            return call_expr(Callee::Value(Box::new(function)), args, *ret);
        }
        if let Some(sig) = self.index.function(name) {
            let params: Vec<Type> = sig.params.iter().map(|(_, ty)| ty.clone()).collect();
            let ret = sig.ret.clone();
            let args = self.args(args, Some(params.as_slice()));
            return call_expr(Callee::Function(self.sanitize(name)), args, ret);
        }
        if let Some(Type::Function { params, ret }) = self.index.global(name).cloned() {
            let function = TExpr::ident(self.sanitize(name), Type::func(params.clone(), (*ret).clone()));
            let args = self.args(args, Some(params.as_slice()));
            return call_expr(Callee::Value(Box::new(function)), args, *ret);
        }
        match name {
            "rotl32" | "rotateLeft" | "ROTL" => {
                let op = WordOp::Rotate { left: true, width: 32 };
                return self.word_op(op, "OpCodes.RotL32", args, e);
            }
            "rotr32" | "rotateRight" | "ROTR" => {
                let op = WordOp::Rotate { left: false, width: 32 };
                return self.word_op(op, "OpCodes.RotR32", args, e);
            }
            _ => {}
        }
        if framework().global(name).is_some() {
            return self.runtime(name, args, e);
        }

        let ty = self.type_of(e);
        match name {
            "parseInt" => {
                let args = self.args(args, Some([Type::string(), Type::u32()].as_slice()));
                TExpr::builtin(Builtin::ParseInt, args, Type::u32())
            }
            "Number" => match args.first() {
                Some(arg) => {
                    let value = self.expr(arg);
                    let value = self.unwrap_value(value);
                    if value.ty.is_string() {
                        TExpr::builtin(Builtin::ParseInt, vec![value], Type::u32())
                    } else {
                        value
                    }
                }
                None => TExpr::u32(0),
            },
            "String" => match args.first() {
                Some(arg) => {
                    let value = self.expr(arg);
                    stringify(self.unwrap_value(value))
                }
                None => TExpr::string(""),
            },
            "Boolean" => match args.first() {
                Some(arg) => self.cond(arg),
                None => TExpr::boolean(false),
            },
            _ => {
                self.unsupported(
                    e.kind(),
                    &format!("call to `{name}`, which is not declared"),
                    e.span(),
                );
                let args = self.args(args, None);
                call_expr(Callee::Function(self.sanitize(name)), args, ty)
            }
        }
    }

    fn method_call(&mut self, object: &Expr, name: &str, args: &[Expr], e: &Expr) -> TExpr {
        let object = object.unwrap_parens();
        if let Some(ns) = object.as_ident()
            && !self.scope.is_declared(ns)
        {
            match ns {
                "OpCodes" => return self.opcodes(name, args, e),
                "AlgorithmFramework" => return self.runtime(name, args, e),
                "Math" => return self.math(name, args, e),
                "String" if name == "fromCharCode" => return self.from_char_code(args),
                "Array" => return self.array_static(name, args, e),
                "Object" => return self.object_static(name, args, e),
                "Number" if name == "parseInt" => {
                    let args = self.args(args, Some([Type::string(), Type::u32()].as_slice()));
                    return TExpr::builtin(Builtin::ParseInt, args, Type::u32());
                }
                "console" => return self.unsupported_expr(e, "console output inside an expression"),
                _ if self.index.class(ns).is_some() => {
                    let params = self
                        .index
                        .method_sig(ns, name)
                        .map(|sig| sig.params.into_iter().map(|(_, ty)| ty).collect::<Vec<_>>());
                    let args = self.args(args, params.as_deref());
                    let ty = self.type_of(e);
                    let callee = Callee::Static {
                        owner: self.type_name(ns),
                        name: self.member_name(ns, name),
                    };
                    return call_expr(callee, args, ty);
                }
                _ => {}
            }
        }

        if matches!(object, Expr::Super {}) {
            let base = self
                .class
                .as_deref()
                .and_then(|c| self.index.base_of(c))
                .map(str::to_string);
            let params = base
                .as_deref()
                .and_then(|b| self.index.method_sig(b, name))
                .map(|sig| sig.params.into_iter().map(|(_, ty)| ty).collect::<Vec<_>>());
            let args = self.args(args, params.as_deref());
            let method = match &base {
                Some(base) => self.member_name(base, name),
                None => self.sanitize(name),
            };
            let ty = self.type_of(e);
            return call_expr(Callee::Super(method), args, ty);
        }

        let recv = self.expr(object);
        let recv = self.unwrap_value(recv);
        match recv.ty.clone() {
            Type::Sequence(element) => self.sequence_method(recv, *element, name, args, e),
            Type::Map(key, value) => self.map_method(recv, &key, &value, name, args, e),
            ty if ty.is_string() => self.string_method(recv, name, args, e),
            ty if ty.is_numeric() && name == "toString" => {
                let mut lowered = vec![recv];
                lowered.extend(self.args(args, Some([Type::u32()].as_slice())));
                TExpr::builtin(Builtin::ToString, lowered, Type::string())
            }
            Type::Named(owner) => {
                let params = self
                    .index
                    .method_sig(&owner, name)
                    .map(|sig| sig.params.into_iter().map(|(_, ty)| ty).collect::<Vec<_>>());
                let args = self.args(args, params.as_deref());
                let ty = self.type_of(e);
                let callee = Callee::Method {
                    recv: Box::new(recv),
                    name: self.member_name(&owner, name),
                };
                call_expr(callee, args, ty)
            }
            ty => self.unsupported_expr(e, &format!("method `{name}` on a value of type {ty}")),
        }
    }

    /// Call of a helper the runtime stub supplies, by catalogue name.
    fn runtime(&mut self, qualified: &str, args: &[Expr], e: &Expr) -> TExpr {
        let Some(sig) = framework().global(qualified) else {
            self.unsupported(
                e.kind(),
                &format!("`{qualified}` is not a known framework function"),
                e.span(),
            );
            let args = self.args(args, None);
            let ty = self.type_of(e);
            return call_expr(Callee::Runtime(qualified.to_string()), args, ty);
        };
        let params: Vec<Type> = sig.params.iter().map(|(_, ty)| ty.clone()).collect();
        let args = self.args(args, Some(params.as_slice()));
        call_expr(Callee::Runtime(qualified.to_string()), args, sig.ret.clone())
    }

    fn opcodes(&mut self, name: &str, args: &[Expr], e: &Expr) -> TExpr {
        let qualified = format!("OpCodes.{name}");
        match WordOp::parse(name) {
            Some(op) => self.word_op(op, &qualified, args, e),
            None => self.runtime(&qualified, args, e),
        }
    }

    /// Rotations, packs and unpacks, written out as shifts and masks when
    /// the operands can be evaluated twice.
    fn word_op(&mut self, op: WordOp, qualified: &str, args: &[Expr], e: &Expr) -> TExpr {
        let spread = args.iter().any(|a| matches!(a, Expr::SpreadElement { .. }));
        if args.len() != op.arity() || spread {
            return self.runtime(qualified, args, e);
        }
        let params: Vec<Type> = match op {
            WordOp::Rotate { width, .. } => vec![Type::int(width, false), Type::u32()],
            WordOp::Pack { width, .. } => vec![Type::u8(); usize::from(width / 8)],
            WordOp::Unpack { width, .. } => vec![Type::int(width, false)],
        };
        let mut lowered = self.args(args, Some(params.as_slice()));
        match op {
            WordOp::Pack { width, big_endian } => pack(width, big_endian, lowered),
            _ if !lowered.iter().all(TExpr::is_pure) => {
                let ret = framework()
                    .global(qualified)
                    .map_or_else(|| self.type_of(e), |sig| sig.ret.clone());
                call_expr(Callee::Runtime(qualified.to_string()), lowered, ret)
            }
            WordOp::Rotate { left, width } => {
                let amount = lowered.pop().unwrap_or_else(|| TExpr::u32(0));
                let value = lowered.pop().unwrap_or_else(|| TExpr::u32(0));
                rotate(left, width, value, amount)
            }
            WordOp::Unpack { width, big_endian } => {
                let word = lowered.pop().unwrap_or_else(|| TExpr::u32(0));
                unpack(width, big_endian, word)
            }
        }
    }

    fn math(&mut self, name: &str, args: &[Expr], e: &Expr) -> TExpr {
        let ty = self.type_of(e);
        let mut lowered = Vec::with_capacity(args.len());
        for arg in args {
            if matches!(arg, Expr::SpreadElement { .. }) {
                return self.unsupported_expr(e, "spread argument");
            }
            let value = self.expr(arg);
            lowered.push(self.unwrap_value(value));
        }
        let mut lowered = lowered.into_iter();
        let mut first = || lowered.next();
        match name {
            "floor" | "ceil" | "round" | "trunc" => {
                let Some(x) = first() else {
                    return self.unsupported_expr(e, &format!("`Math.{name}` without an argument"));
                };
                if x.ty.is_integer() {
                    return x;
                }
                let op = match name {
                    "floor" => Builtin::Floor,
                    "ceil" => Builtin::Ceil,
                    "round" => Builtin::Round,
                    _ => Builtin::Trunc,
                };
                TExpr::builtin(op, vec![coerce(x, &Type::f64())], Type::f64()).cast(ty)
            }
            "abs" => match first() {
                Some(x) => TExpr::builtin(Builtin::Abs, vec![x], ty),
                None => self.unsupported_expr(e, "`Math.abs` without an argument"),
            },
            "min" | "max" => {
                let op = if name == "min" { Builtin::Min } else { Builtin::Max };
                let folded = std::iter::from_fn(first)
                    .map(|x| coerce(x, &ty))
                    .reduce(|acc, x| TExpr::builtin(op, vec![acc, x], ty.clone()));
                match folded {
                    Some(folded) => folded,
                    None => self.unsupported_expr(e, &format!("`Math.{name}` without arguments")),
                }
            }
            "pow" => match (first(), first()) {
                (Some(base), Some(exponent)) => pow(base, exponent, &ty),
                _ => self.unsupported_expr(e, "`Math.pow` needs two arguments"),
            },
            "sqrt" => match first() {
                Some(x) => TExpr::builtin(Builtin::Sqrt, vec![coerce(x, &Type::f64())], Type::f64()),
                None => self.unsupported_expr(e, "`Math.sqrt` without an argument"),
            },
            "imul" => match (first(), first()) {
                (Some(a), Some(b)) => {
                    let product =
                        TExpr::binary(BinOp::Mul, a.cast(Type::u32()), b.cast(Type::u32()), Type::u32());
                    product.cast(Type::i32())
                }
                _ => self.unsupported_expr(e, "`Math.imul` needs two arguments"),
            },
            _ => self.unsupported_expr(e, &format!("`Math.{name}`")),
        }
    }

    fn from_char_code(&mut self, args: &[Expr]) -> TExpr {
        let mut parts = Vec::with_capacity(args.len());
        for arg in args {
            let code = self.expr_as(arg, &Type::u32());
            parts.push(TExpr::builtin(Builtin::FromCharCode, vec![code], Type::string()));
        }
        parts
            .into_iter()
            .reduce(|acc, part| TExpr::binary(BinOp::Add, acc, part, Type::string()))
            .unwrap_or_else(|| TExpr::string(""))
    }

    fn array_static(&mut self, name: &str, args: &[Expr], e: &Expr) -> TExpr {
        let ty = self.type_of(e);
        match (name, args) {
            ("isArray", [arg]) => TExpr::boolean(self.type_of(arg).is_sequence()),
            ("from", [source]) => self.expr_as(source, &ty),
            ("from", [source, mapper]) => {
                let items = self.expr(source);
                let element = items.ty.element().cloned().unwrap_or_else(Type::u8);
                let Some(mapper) = self.callback(Some(mapper), &[element, Type::u32()], None) else {
                    return self.unsupported_expr(e, "`Array.from` with a mapper that is not a function");
                };
                let ty = callback_seq(&mapper).unwrap_or(ty);
                TExpr::builtin(Builtin::Map, vec![items, mapper], ty)
            }
            ("of", items) => {
                let element = ty.element().cloned().unwrap_or_else(Type::u8);
                let items = items.iter().map(|item| self.expr_as(item, &element)).collect();
                TExpr::new(ExprKind::ArrayLit(items), ty)
            }
            _ => self.unsupported_expr(e, &format!("`Array.{name}`")),
        }
    }

    fn object_static(&mut self, name: &str, args: &[Expr], e: &Expr) -> TExpr {
        let Some(arg) = args.first() else {
            return self.unsupported_expr(e, &format!("`Object.{name}` without an argument"));
        };
        match name {
            "freeze" | "seal" => self.expr(arg),
            "keys" | "values" => {
                let value = self.expr(arg);
                let value = self.unwrap_value(value);
                let Type::Map(key, item) = value.ty.clone() else {
                    return self.unsupported_expr(e, &format!("`Object.{name}` on a value that is not a dictionary"));
                };
                if name == "keys" {
                    TExpr::builtin(Builtin::MapKeys, vec![value], Type::seq(*key))
                } else {
                    TExpr::builtin(Builtin::MapValues, vec![value], Type::seq(*item))
                }
            }
            _ => self.unsupported_expr(e, &format!("`Object.{name}`")),
        }
    }

    /// A function argument of a collection method, lowered against the
    /// parameter types the method passes it.
    fn callback(&mut self, f: Option<&Expr>, params: &[Type], ret: Option<&Type>) -> Option<TExpr> {
        let f = f?;
        match f.unwrap_parens() {
            Expr::ArrowFunctionExpression(_) | Expr::FunctionExpression(_) => {
                Some(self.lambda(f, params, ret))
            }
            _ => {
                let value = self.expr(f);
                value.ty.is_function().then_some(value)
            }
        }
    }

    /// `-n` from the end when `arg` is a negative literal.
    fn offset(&mut self, recv: &TExpr, arg: &Expr) -> TExpr {
        match integer_value(arg) {
            Some(v) if v < 0 && recv.is_pure() => {
                let size = TExpr::builtin(Builtin::Size, vec![recv.clone()], Type::u32());
                TExpr::binary(BinOp::Sub, size, TExpr::int(-v, Type::u32()), Type::u32())
            }
            _ => self.position(arg),
        }
    }

    fn sequence_method(&mut self, recv: TExpr, element: Type, name: &str, args: &[Expr], e: &Expr) -> TExpr {
        let seq = recv.ty.clone();
        match name {
            "push" => match args {
                [Expr::SpreadElement { argument }] => {
                    let items = self.expr_as(argument, &seq);
                    TExpr::builtin(Builtin::AppendAll, vec![recv, items], Type::void())
                }
                [arg] if self.type_of(arg).is_sequence() && !element.is_sequence() => {
                    let items = self.expr_as(arg, &seq);
                    TExpr::builtin(Builtin::AppendAll, vec![recv, items], Type::void())
                }
                [arg] => {
                    let item = self.expr_as(arg, &element);
                    TExpr::builtin(Builtin::Append, vec![recv, item], Type::void())
                }
                _ => self.unsupported_expr(e, "`push` of several values inside an expression"),
            },
            "pop" => TExpr::builtin(Builtin::PopBack, vec![recv], element),
            "shift" => TExpr::builtin(Builtin::PopFront, vec![recv], element),
            "unshift" => match args {
                [arg] => {
                    let item = self.expr_as(arg, &element);
                    TExpr::builtin(Builtin::Prepend, vec![recv, item], Type::void())
                }
                _ => self.unsupported_expr(e, "`unshift` of several values"),
            },
            "slice" | "subarray" => {
                let mut lowered = vec![recv.clone()];
                for arg in args.iter().take(2) {
                    let bound = self.offset(&recv, arg);
                    lowered.push(bound);
                }
                TExpr::builtin(Builtin::Slice, lowered, seq)
            }
            "fill" => {
                let Some(value) = args.first() else {
                    return self.unsupported_expr(e, "`fill` without a value");
                };
                let value = self.expr_as(value, &element);
                if let ExprKind::Builtin {
                    op: Builtin::NewSequence,
                    args: sized,
                } = &recv.kind
                    && sized.len() == 1
                    && args.len() == 1
                {
                    let length = sized[0].clone();
                    return TExpr::builtin(Builtin::NewSequence, vec![length, value], seq);
                }
                let mut lowered = vec![recv, value];
                for arg in args.iter().skip(1).take(2) {
                    lowered.push(self.position(arg));
                }
                TExpr::builtin(Builtin::Fill, lowered, seq)
            }
            "includes" | "indexOf" => {
                let Some(needle) = args.first() else {
                    return self.unsupported_expr(e, &format!("`{name}` without a value"));
                };
                let needle = self.expr_as(needle, &element);
                if name == "includes" {
                    TExpr::builtin(Builtin::Contains, vec![recv, needle], Type::bool())
                } else {
                    TExpr::builtin(Builtin::IndexOf, vec![recv, needle], Type::i32())
                }
            }
            "concat" => {
                let mut acc = recv;
                for arg in args {
                    let part = if self.type_of(arg).is_sequence() {
                        self.expr_as(arg, &seq)
                    } else {
                        let item = self.expr_as(arg, &element);
                        TExpr::new(ExprKind::ArrayLit(vec![item]), seq.clone())
                    };
                    acc = TExpr::builtin(Builtin::Concat, vec![acc, part], seq.clone());
                }
                acc
            }
            "join" | "toString" => {
                let separator = match args.first() {
                    Some(sep) if name == "join" => self.expr_as(sep, &Type::string()),
                    _ => TExpr::string(","),
                };
                TExpr::builtin(Builtin::Join, vec![recv, separator], Type::string())
            }
            "reverse" => TExpr::builtin(Builtin::Reverse, vec![recv], seq),
            "sort" => {
                let mut lowered = vec![recv];
                if let Some(compare) =
                    self.callback(args.first(), &[element.clone(), element], Some(&Type::i32()))
                {
                    lowered.push(compare);
                }
                TExpr::builtin(Builtin::Sort, lowered, seq)
            }
            "map" | "filter" | "forEach" | "some" | "every" | "find" | "findIndex" => {
                let ret = match name {
                    "map" => None,
                    "forEach" => Some(Type::void()),
                    _ => Some(Type::bool()),
                };
                let params = [element.clone(), Type::u32()];
                let Some(f) = self.callback(args.first(), &params, ret.as_ref()) else {
                    return self.unsupported_expr(e, &format!("`{name}` without a function argument"));
                };
                let (op, ty) = match name {
                    "map" => (Builtin::Map, callback_seq(&f).unwrap_or(seq)),
                    "filter" => (Builtin::Filter, seq),
                    "forEach" => (Builtin::ForEach, Type::void()),
                    "some" => (Builtin::Some, Type::bool()),
                    "every" => (Builtin::Every, Type::bool()),
                    "find" => (Builtin::Find, element),
                    _ => (Builtin::FindIndex, Type::i32()),
                };
                TExpr::builtin(op, vec![recv, f], ty)
            }
            "reduce" => {
                let init = match args.get(1) {
                    Some(init) => {
                        let ty = self.type_of(init);
                        Some(self.expr_as(init, &ty))
                    }
                    None => None,
                };
                let acc = init.as_ref().map_or_else(|| element.clone(), |i| i.ty.clone());
                let params = [acc.clone(), element, Type::u32()];
                let Some(f) = self.callback(args.first(), &params, Some(&acc)) else {
                    return self.unsupported_expr(e, "`reduce` without a function argument");
                };
                let mut lowered = vec![recv, f];
                lowered.extend(init);
                TExpr::builtin(Builtin::Reduce, lowered, acc)
            }
            "splice" => match args {
                [start] if recv.is_pure() => {
                    let start = self.position(start);
                    let size = TExpr::builtin(Builtin::Size, vec![recv.clone()], Type::u32());
                    let count = TExpr::binary(BinOp::Sub, size, start.clone(), Type::u32());
                    TExpr::builtin(Builtin::Splice, vec![recv, start, count], seq)
                }
                [start, count] => {
                    let start = self.position(start);
                    let count = self.position(count);
                    TExpr::builtin(Builtin::Splice, vec![recv, start, count], seq)
                }
                _ => self.unsupported_expr(e, "`splice` that inserts values"),
            },
            "at" => match args.first() {
                Some(arg) => {
                    let index = self.offset(&recv, arg);
                    TExpr::new(
                        ExprKind::Index {
                            object: Box::new(recv),
                            index: Box::new(index),
                        },
                        element,
                    )
                }
                None => self.unsupported_expr(e, "`at` without an index"),
            },
            _ => self.unsupported_expr(e, &format!("sequence method `{name}`")),
        }
    }

    fn map_method(
        &mut self,
        recv: TExpr,
        key: &Type,
        value: &Type,
        name: &str,
        args: &[Expr],
        e: &Expr,
    ) -> TExpr {
        let (op, params, ty) = match name {
            "get" => (Builtin::MapGet, vec![key.clone()], value.clone()),
            "set" => (Builtin::MapSet, vec![key.clone(), value.clone()], Type::void()),
            "has" => (Builtin::MapContains, vec![key.clone()], Type::bool()),
            "delete" => (Builtin::MapDelete, vec![key.clone()], Type::void()),
            "keys" => (Builtin::MapKeys, Vec::new(), Type::seq(key.clone())),
            "values" => (Builtin::MapValues, Vec::new(), Type::seq(value.clone())),
            _ => return self.unsupported_expr(e, &format!("dictionary method `{name}`")),
        };
        if args.len() < params.len() {
            return self.unsupported_expr(e, &format!("`{name}` with missing arguments"));
        }
        let mut lowered = vec![recv];
        lowered.extend(self.args(args, Some(params.as_slice())));
        TExpr::builtin(op, lowered, ty)
    }

    fn string_method(&mut self, recv: TExpr, name: &str, args: &[Expr], e: &Expr) -> TExpr {
        let string = Type::string();
        let (op, params, ty) = match name {
            "charCodeAt" => {
                let index = match args.first() {
                    Some(arg) => self.position(arg),
                    None => TExpr::u32(0),
                };
                return TExpr::builtin(Builtin::CharCodeAt, vec![recv, index], Type::u8());
            }
            "slice" | "substring" => {
                let mut lowered = vec![recv.clone()];
                for arg in args.iter().take(2) {
                    let bound = self.offset(&recv, arg);
                    lowered.push(bound);
                }
                return TExpr::builtin(Builtin::Substring, lowered, string);
            }
            "padStart" => {
                let mut lowered = vec![recv];
                lowered.extend(self.args(args, Some([Type::u32(), string.clone()].as_slice())));
                if lowered.len() == 2 {
                    lowered.push(TExpr::string(" "));
                }
                return TExpr::builtin(Builtin::PadStart, lowered, string);
            }
            "toString" => return recv,
            "charAt" => (Builtin::CharAt, vec![Type::u32()], string),
            "substr" => (Builtin::Substr, vec![Type::u32(), Type::u32()], string),
            "toUpperCase" => (Builtin::ToUpper, Vec::new(), string),
            "toLowerCase" => (Builtin::ToLower, Vec::new(), string),
            "split" => (Builtin::Split, vec![string.clone()], Type::seq(string)),
            "indexOf" => (Builtin::IndexOf, vec![string], Type::i32()),
            "includes" => (Builtin::Contains, vec![string], Type::bool()),
            _ => return self.unsupported_expr(e, &format!("string method `{name}`")),
        };
        let mut lowered = vec![recv];
        lowered.extend(self.args(args, Some(params.as_slice())));
        TExpr::builtin(op, lowered, ty)
    }

    /// Parameter types of the constructor `new class(..)` runs: the first
    /// one declared in the local lineage.
    pub(super) fn constructor_params(&self, class: &str) -> Option<Vec<Type>> {
        let mut next = self.index.class(class);
        let mut depth = 0;
        while let Some(info) = next
            && depth < 32
        {
            if let Some(ctor) = info.constructor() {
                return Some(ctor.sig.params.iter().map(|(_, ty)| ty.clone()).collect());
            }
            next = info.base.as_deref().and_then(|b| self.index.class(b));
            depth += 1;
        }
        None
    }

    pub(super) fn construct(&mut self, call: &Call, e: &Expr) -> TExpr {
        let Some(name) = constructed_name(&call.callee) else {
            return self.unsupported_expr(e, "construction through a computed callee");
        };
        let ty = self.type_of(e);
        let args = call.arguments.as_slice();

        if name == "Array" || typed_array_element(name).is_some() {
            let element = ty.element().cloned().unwrap_or_else(Type::u8);
            return match args {
                [] => TExpr::new(ExprKind::ArrayLit(Vec::new()), ty),
                [single] => {
                    let source = self.type_of(single);
                    if source.is_sequence() {
                        self.expr_as(single, &ty)
                    } else if name == "Array" && !source.is_numeric() {
                        let item = self.expr_as(single, &element);
                        TExpr::new(ExprKind::ArrayLit(vec![item]), ty)
                    } else {
                        let length = self.expr_as(single, &Type::u32());
                        TExpr::builtin(Builtin::NewSequence, vec![length], ty)
                    }
                }
                items if name == "Array" => {
                    let items = items.iter().map(|item| self.expr_as(item, &element)).collect();
                    TExpr::new(ExprKind::ArrayLit(items), ty)
                }
                _ => self.unsupported_expr(e, "typed array view over a buffer"),
            };
        }
        if is_error_type(name) {
            return self.unsupported_expr(e, "error object outside a `throw`");
        }
        if matches!(name, "Map" | "Object") {
            return TExpr::new(ExprKind::MapLit(Vec::new()), ty);
        }
        if self.index.class(name).is_some() {
            let params = self.constructor_params(name);
            let args = self.args(args, params.as_deref());
            return TExpr::new(ExprKind::Construct { args }, Type::named(name));
        }
        if let Some(entry) = framework().get(name)
            && !entry.is_enum()
        {
            let params: Option<Vec<Type>> = if entry.is_record() {
                Some(entry.fields.values().cloned().collect())
            } else {
                entry
                    .methods
                    .get("constructor")
                    .map(|sig| sig.params.iter().map(|(_, ty)| ty.clone()).collect())
            };
            let args = self.args(args, params.as_deref());
            return TExpr::new(ExprKind::Construct { args }, Type::named(name));
        }
        self.unsupported_expr(e, &format!("construction of `{name}`, which is not declared"))
    }
}

fn call_expr(callee: Callee, args: Vec<TExpr>, ty: Type) -> TExpr {
    TExpr::new(ExprKind::Call { callee, args }, ty)
}

/// Sequence of what the mapped function returns.
fn callback_seq(f: &TExpr) -> Option<Type> {
    match &f.ty {
        Type::Function { ret, .. } if !ret.is_void() => Some(Type::seq((**ret).clone())),
        _ => None,
    }
}

/// `x` rotated by `n` within a `width`-bit word. Sub-word rotations work in
/// 32 bits and truncate; a variable amount is masked on both sides so that
/// no shift reaches the word width.
fn rotate(left: bool, width: u8, x: TExpr, n: TExpr) -> TExpr {
    let word = Type::int(width, false);
    let wide = if width < 32 { Type::u32() } else { word.clone() };
    let bits = i128::from(width);
    let (toward, back) = if left {
        (BinOp::Shl, BinOp::Shr)
    } else {
        (BinOp::Shr, BinOp::Shl)
    };
    let (near, far) = match n.int_value() {
        Some(k) => {
            let k = k.rem_euclid(bits);
            if k == 0 {
                return x.cast(word);
            }
            (TExpr::int(k, Type::u32()), TExpr::int(bits - k, Type::u32()))
        }
        None => {
            let mask = TExpr::int(bits - 1, Type::u32());
            let near = TExpr::binary(BinOp::BitAnd, n, mask.clone(), Type::u32());
            let rest = TExpr::binary(BinOp::Sub, TExpr::int(bits, Type::u32()), near.clone(), Type::u32());
            let far = TExpr::binary(BinOp::BitAnd, rest, mask, Type::u32());
            (near, far)
        }
    };
    let value = x.cast(wide.clone());
    let high = TExpr::binary(toward, value.clone(), near, wide.clone());
    let low = TExpr::binary(back, value, far, wide.clone());
    TExpr::binary(BinOp::BitOr, high, low, wide).cast(word)
}

/// Bytes shifted into place and or-ed, most significant first for big
/// endian.
fn pack(width: u8, big_endian: bool, bytes: Vec<TExpr>) -> TExpr {
    let word = Type::int(width, false);
    let count = bytes.len();
    let mut packed: Option<TExpr> = None;
    for (i, byte) in bytes.into_iter().enumerate() {
        let slot = if big_endian { count - 1 - i } else { i };
        let part = byte.cast(word.clone());
        let part = if slot == 0 {
            part
        } else {
            let shift = TExpr::int(8 * slot as i128, Type::u32());
            TExpr::binary(BinOp::Shl, part, shift, word.clone())
        };
        packed = Some(match packed {
            Some(acc) => TExpr::binary(BinOp::BitOr, acc, part, word.clone()),
            None => part,
        });
    }
    packed.unwrap_or_else(|| TExpr::int(0, word))
}

fn unpack(width: u8, big_endian: bool, word: TExpr) -> TExpr {
    let count = usize::from(width / 8);
    let ty = word.ty.clone();
    let bytes = (0..count)
        .map(|i| {
            let slot = if big_endian { count - 1 - i } else { i };
            let shifted = if slot == 0 {
                word.clone()
            } else {
                let shift = TExpr::int(8 * slot as i128, Type::u32());
                TExpr::binary(BinOp::Shr, word.clone(), shift, ty.clone())
            };
            TExpr::binary(BinOp::BitAnd, shifted, TExpr::int(0xFF, Type::u32()), ty.clone())
                .cast(Type::u8())
        })
        .collect();
    TExpr::new(ExprKind::ArrayLit(bytes), Type::bytes())
}
