//! Expressions, with parentheses from Pascal operator precedence.
//!
//! Pascal has four binary levels and comparisons bind loosest, so every
//! comparison under `and`/`or` is parenthesized.

use cryptran_core::Type;

use super::PascalEmitter;
use crate::emit::literals::{pascal_float, pascal_int, pascal_string};
use crate::emit::placeholder_note;
use crate::target::{BinOp, Builtin, Callee, ExprKind, Lit, Param, Stmt, TExpr, UnOp};

const PRIMARY: u8 = 5;
pub(super) const UNARY: u8 = 4;
const MULTIPLICATIVE: u8 = 3;
pub(super) const ADDITIVE: u8 = 2;
const RELATIONAL: u8 = 1;

/// Array literals longer than this are laid out in rows.
const ROW: usize = 16;

fn binary_prec(op: BinOp) -> u8 {
    match op {
        BinOp::Mul | BinOp::Div | BinOp::Rem | BinOp::Shl | BinOp::Shr => MULTIPLICATIVE,
        BinOp::BitAnd | BinOp::And => MULTIPLICATIVE,
        BinOp::Add | BinOp::Sub | BinOp::BitOr | BinOp::BitXor | BinOp::Or => ADDITIVE,
        BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => RELATIONAL,
    }
}

fn binary_token(op: BinOp, integer: bool) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div if integer => "div",
        BinOp::Div => "/",
        BinOp::Rem => "mod",
        BinOp::Shl => "shl",
        BinOp::Shr => "shr",
        BinOp::BitAnd | BinOp::And => "and",
        BinOp::BitOr | BinOp::Or => "or",
        BinOp::BitXor => "xor",
        BinOp::Eq => "=",
        BinOp::Ne => "<>",
        BinOp::Lt => "<",
        BinOp::Le => "<=",
        BinOp::Gt => ">",
        BinOp::Ge => ">=",
    }
}

/// Mixed bitwise or mixed logical operands get parentheses even where
/// precedence makes them redundant.
fn clarify(parent: BinOp, child: &TExpr) -> bool {
    let ExprKind::Binary { op, .. } = &child.kind else {
        return false;
    };
    if *op == parent {
        return false;
    }
    parent.is_bitwise() || matches!((parent, op), (BinOp::And, BinOp::Or) | (BinOp::Or, BinOp::And))
}

/// Parameters a callback value takes.
fn arity(f: &TExpr) -> usize {
    match &f.ty {
        Type::Function { params, .. } => params.len(),
        _ => 1,
    }
}

impl PascalEmitter<'_> {
    /// `e`, parenthesized when it binds looser than `min`.
    pub(super) fn operand(&mut self, e: &TExpr, min: u8) -> String {
        let text = self.expr(e);
        if self.prec(e) < min {
            format!("({text})")
        } else {
            text
        }
    }

    fn prec(&self, e: &TExpr) -> u8 {
        match &e.kind {
            ExprKind::Literal(Lit::Int { value, .. }) if *value < 0 => UNARY,
            ExprKind::Literal(Lit::Float(value)) if *value < 0.0 => UNARY,
            ExprKind::Binary { op: BinOp::Shr, left, .. } if left.ty.is_signed() => PRIMARY,
            ExprKind::Binary { op, .. } => binary_prec(*op),
            ExprKind::Unary { .. } => UNARY,
            ExprKind::Assign { .. } => RELATIONAL,
            ExprKind::Cast(inner) if e.ty.is_bool() && inner.ty.is_numeric() => RELATIONAL,
            ExprKind::Builtin { op, args } => self.builtin_prec(*op, args),
            _ => PRIMARY,
        }
    }

    fn builtin_prec(&self, op: Builtin, args: &[TExpr]) -> u8 {
        let string = args.first().is_some_and(|r| r.ty.is_string());
        match op {
            Builtin::Contains if string => RELATIONAL,
            Builtin::IndexOf | Builtin::Concat if string => ADDITIVE,
            Builtin::NotEmpty | Builtin::IsEmpty => RELATIONAL,
            _ => PRIMARY,
        }
    }

    pub(super) fn expr(&mut self, e: &TExpr) -> String {
        match &e.kind {
            ExprKind::Literal(lit) => literal(lit),
            ExprKind::Null => self.null(&e.ty),
            ExprKind::Ident(name) => name.clone(),
            ExprKind::This => "Self".to_string(),
            ExprKind::Binary { op, left, right } => self.binary(*op, left, right, &e.ty),
            ExprKind::Unary { op, operand } => match op {
                UnOp::Neg => {
                    let operand = self.operand(operand, UNARY);
                    if operand.starts_with(['-', '+']) {
                        format!("-({operand})")
                    } else {
                        format!("-{operand}")
                    }
                }
                UnOp::Not | UnOp::BitNot => format!("not {}", self.operand(operand, UNARY)),
                UnOp::PreInc | UnOp::PreDec => {
                    log::warn!("increment inside a Pascal expression; value read without it");
                    self.operand(operand, UNARY)
                }
            },
            ExprKind::Postfix { target, .. } => {
                log::warn!("increment inside a Pascal expression; value read without it");
                self.operand(target, PRIMARY)
            }
            ExprKind::Assign { target, value, .. } => {
                log::warn!("assignment inside a Pascal expression");
                let target = self.expr(target);
                let value = self.expr(value);
                format!("{target} := {value}")
            }
            ExprKind::Member { object, name } => {
                let object = self.operand(object, PRIMARY);
                format!("{object}.{name}")
            }
            ExprKind::StaticMember { owner, name } => format!("{owner}.{name}"),
            ExprKind::Index { object, index } => {
                let text = self.operand(object, PRIMARY);
                let index = if object.ty.is_string() {
                    self.one_based(index)
                } else {
                    self.expr(index)
                };
                format!("{text}[{index}]")
            }
            ExprKind::Call { callee, args } => self.call(callee, args),
            ExprKind::Builtin { op, args } => self.builtin(*op, args, &e.ty),
            ExprKind::Construct { args } => {
                let name = self.ty(&e.ty);
                if args.is_empty() && !self.is_ref(&e.ty) {
                    format!("Default({name})")
                } else if args.is_empty() {
                    format!("{name}.Create")
                } else {
                    format!("{name}.Create({})", self.args(args))
                }
            }
            ExprKind::ArrayLit(items) if items.is_empty() => "nil".to_string(),
            ExprKind::ArrayLit(items) => {
                let ty = self.ty(&e.ty);
                let items: Vec<String> = items.iter().map(|item| self.expr(item)).collect();
                format!("{ty}.Create{}", self.list(&items))
            }
            ExprKind::MapLit(entries) => {
                let entries: Vec<(String, String)> = entries
                    .iter()
                    .map(|(key, value)| (self.expr(key), self.expr(value)))
                    .collect();
                self.map_of(&e.ty, entries)
            }
            ExprKind::InitList(entries) => {
                let entries: Vec<(String, String)> = entries
                    .iter()
                    .map(|(key, value)| (pascal_string(key), self.expr(value)))
                    .collect();
                self.map_of(&e.ty, entries)
            }
            ExprKind::Conditional { cond, then, els } => {
                let ty = self.ty(&e.ty);
                let cond = self.expr(cond);
                let then = self.expr(then);
                let els = self.expr(els);
                format!("Rt.IfThen<{ty}>({cond}, {then}, {els})")
            }
            ExprKind::Lambda { params, ret, body } => self.lambda(params, ret, body),
            ExprKind::Cast(inner) => self.cast(inner, &e.ty),
            ExprKind::Group(inner) => format!("({})", self.expr(inner)),
            ExprKind::Placeholder(placeholder) => {
                let note = self.comment(&placeholder_note(placeholder));
                if e.ty.is_void() {
                    note
                } else {
                    format!("{note} {}", self.null(&e.ty))
                }
            }
        }
    }

    /// `{ text }`, never closed early by the text itself.
    pub(super) fn comment(&self, text: &str) -> String {
        format!("{{ {} }}", text.replace('}', ")"))
    }

    fn null(&self, ty: &Type) -> String {
        match ty {
            t if self.is_ref(t) => "nil".to_string(),
            Type::Sequence(_) | Type::Map(..) | Type::Function { .. } => "nil".to_string(),
            Type::Optional(_) => format!("{}.Null", self.ty(ty)),
            t if t.is_string() => "''".to_string(),
            other => format!("Default({})", self.ty(other)),
        }
    }

    /// A zero-based string position as a one-based index.
    fn one_based(&mut self, index: &TExpr) -> String {
        match index.int_value() {
            Some(value) => (value + 1).to_string(),
            None => format!("{} + 1", self.operand(index, ADDITIVE)),
        }
    }

    fn binary(&mut self, op: BinOp, left: &TExpr, right: &TExpr, ty: &Type) -> String {
        if op == BinOp::Shr && left.ty.is_signed() {
            let l = self.expr(left);
            let r = self.expr(right);
            return format!("Rt.Sar({l}, {r})");
        }
        let prec = binary_prec(op);
        let (left_min, right_min) = if prec == RELATIONAL {
            (RELATIONAL + 1, RELATIONAL + 1)
        } else {
            (prec, prec + 1)
        };
        let l = if clarify(op, left) {
            format!("({})", self.expr(left))
        } else {
            self.operand(left, left_min)
        };
        let r = if clarify(op, right) {
            format!("({})", self.expr(right))
        } else {
            self.operand(right, right_min)
        };
        let integer = ty.is_integer() || (left.ty.is_integer() && right.ty.is_integer());
        format!("{l} {} {r}", binary_token(op, integer))
    }

    pub(super) fn args(&mut self, args: &[TExpr]) -> String {
        let args: Vec<String> = args.iter().map(|arg| self.expr(arg)).collect();
        args.join(", ")
    }

    fn call(&mut self, callee: &Callee, args: &[TExpr]) -> String {
        let args = self.args(args);
        match callee {
            Callee::Function(name) => format!("{name}({args})"),
            Callee::Method { recv, name } => {
                let recv = self.operand(recv, PRIMARY);
                format!("{recv}.{name}({args})")
            }
            Callee::Static { owner, name } => format!("{owner}.{name}({args})"),
            Callee::Super(name) if args.is_empty() => format!("inherited {name}"),
            Callee::Super(name) => format!("inherited {name}({args})"),
            Callee::Value(f) => {
                let f = self.operand(f, PRIMARY);
                format!("{f}({args})")
            }
            Callee::Runtime(name) => format!("{name}({args})"),
        }
    }

    /// `(a, b)`, or rows of [`ROW`] items for long literals.
    fn list(&self, items: &[String]) -> String {
        if items.len() <= ROW {
            return format!("({})", items.join(", "));
        }
        let newline = self.p.newline();
        let outer = self.p.indentation();
        let inner = format!("{outer}{}", self.config.indent_unit);
        let rows: Vec<String> = items
            .chunks(ROW)
            .map(|row| format!("{inner}{}", row.join(", ")))
            .collect();
        format!("({newline}{}{newline}{outer})", rows.join(&format!(",{newline}")))
    }

    fn map_of(&mut self, ty: &Type, entries: Vec<(String, String)>) -> String {
        let Type::Map(key, value) = ty else {
            return self.null(ty);
        };
        let dict = self.ty(ty);
        if entries.is_empty() {
            return format!("{dict}.Create");
        }
        let (keys, values): (Vec<String>, Vec<String>) = entries.into_iter().unzip();
        format!(
            "Rt.MapOf<{}, {}>([{}], [{}])",
            self.ty(key),
            self.ty(value),
            keys.join(", "),
            values.join(", ")
        )
    }

    fn cast(&mut self, inner: &TExpr, ty: &Type) -> String {
        if self.ty(&inner.ty) == self.ty(ty) || matches!(ty, Type::Optional(i) if **i == inner.ty) {
            return self.expr(inner);
        }
        if ty.is_string() && inner.ty.is_integer() {
            return format!("IntToStr({})", self.expr(inner));
        }
        if ty.is_string() && inner.ty.is_float() {
            return format!("FloatToStr({})", self.expr(inner));
        }
        if ty.is_bool() && inner.ty.is_numeric() {
            return format!("{} <> 0", self.operand(inner, RELATIONAL + 1));
        }
        if ty.is_integer() && inner.ty.is_float() {
            let trunc = format!("Trunc({})", self.expr(inner));
            return format!("{}({trunc})", self.ty(ty));
        }
        if ty.is_integer() && inner.ty.is_bool() {
            return format!("Ord({})", self.expr(inner));
        }
        if ty.is_float() && inner.ty.is_integer() {
            return self.expr(inner);
        }
        format!("{}({})", self.ty(ty), self.expr(inner))
    }

    /// Anonymous method; the body is laid out in a nested printer and
    /// spliced into the current line.
    fn lambda(&mut self, params: &[Param], ret: &Type, body: &[Stmt]) -> String {
        let params = self.params(params, false);
        let params = if params.is_empty() {
            String::new()
        } else {
            format!("({params})")
        };
        let head = if ret.is_void() {
            format!("procedure{params}")
        } else {
            format!("function{params}: {}", self.ty(ret))
        };
        let nested = self.p.nested();
        let outer = std::mem::replace(&mut self.p, nested);
        self.p.line(&head);
        self.routine_body(&[], body, "end");
        let text = std::mem::replace(&mut self.p, outer).into_inline();
        text.trim_start().to_string()
    }

    fn rt(&mut self, name: &str, generics: &[String], args: &[TExpr]) -> String {
        let args = self.args(args);
        if generics.is_empty() {
            format!("Rt.{name}({args})")
        } else {
            format!("Rt.{name}<{}>({args})", generics.join(", "))
        }
    }

    fn builtin(&mut self, op: Builtin, args: &[TExpr], ty: &Type) -> String {
        let recv = args.first();
        let string = recv.is_some_and(|r| r.ty.is_string());
        let map = recv.is_some_and(|r| r.ty.is_map());
        let t: Vec<String> = recv
            .and_then(|r| r.ty.element())
            .map(|e| self.ty(e))
            .into_iter()
            .collect();
        match op {
            Builtin::Append => self.rt("Append", &t, args),
            Builtin::AppendAll => self.rt("AppendAll", &t, args),
            Builtin::Prepend => self.rt("Prepend", &t, args),
            Builtin::PopBack => self.rt("PopBack", &t, args),
            Builtin::PopFront => self.rt("PopFront", &t, args),
            Builtin::Slice if string => self.rt("SliceStr", &[], args),
            Builtin::Slice => self.rt("Slice", &t, args),
            Builtin::Splice => self.rt("Splice", &t, args),
            Builtin::Fill => self.rt("Fill", &t, args),
            Builtin::NewSequence => {
                let element = ty.element().map_or_else(|| self.ty(&Type::Unknown), |e| self.ty(e));
                self.rt("NewArray", &[element], args)
            }
            Builtin::Resize => format!("SetLength({})", self.args(args)),
            Builtin::Contains if string => match args {
                [s, x] => format!("Pos({}, {}) > 0", self.expr(x), self.expr(s)),
                _ => self.rt("Contains", &[], args),
            },
            Builtin::Contains => self.rt("Contains", &t, args),
            Builtin::IndexOf if string => match args {
                [s, x] => format!("Pos({}, {}) - 1", self.expr(x), self.expr(s)),
                _ => self.rt("IndexOf", &[], args),
            },
            Builtin::IndexOf => self.rt("IndexOf", &t, args),
            Builtin::Concat if string => {
                let parts: Vec<String> = args.iter().map(|a| self.operand(a, ADDITIVE + 1)).collect();
                parts.join(" + ")
            }
            Builtin::Concat => self.rt("Concat", &t, args),
            Builtin::Join => self.rt("Join", &[], args),
            Builtin::Reverse => self.rt("Reverse", &t, args),
            Builtin::Sort => self.rt("Sort", &t, args),
            Builtin::Size if map => format!("{}.Count", self.receiver(recv)),
            Builtin::Size => format!("Length({})", self.args(args)),
            Builtin::Map => {
                let result = ty.element().map_or_else(|| self.ty(&Type::Unknown), |e| self.ty(e));
                let mut generics = t.clone();
                generics.push(result);
                let name = if args.get(1).is_some_and(|f| arity(f) > 1) {
                    "MapIndexed"
                } else {
                    "Map"
                };
                self.rt(name, &generics, args)
            }
            Builtin::Filter => self.callback_rt("Filter", &t, args),
            Builtin::ForEach => self.callback_rt("ForEach", &t, args),
            Builtin::Some => self.callback_rt("Some", &t, args),
            Builtin::Every => self.callback_rt("Every", &t, args),
            Builtin::Find => self.callback_rt("Find", &t, args),
            Builtin::FindIndex => self.callback_rt("FindIndex", &t, args),
            Builtin::Reduce => {
                // Without a seed the accumulator is the element type.
                let mut generics = t.clone();
                if args.len() > 2 {
                    generics.push(self.ty(ty));
                }
                let name = if args.get(1).is_some_and(|f| arity(f) > 2) {
                    "ReduceIndexed"
                } else {
                    "Reduce"
                };
                self.rt(name, &generics, args)
            }
            Builtin::CharCodeAt => match args {
                [s, i] => {
                    let s = self.operand(s, PRIMARY);
                    format!("Ord({s}[{}])", self.one_based(i))
                }
                _ => self.rt("CharCodeAt", &[], args),
            },
            Builtin::CharAt => match args {
                [s, i] => {
                    let s = self.operand(s, PRIMARY);
                    format!("string({s}[{}])", self.one_based(i))
                }
                _ => self.rt("CharAt", &[], args),
            },
            Builtin::FromCharCode => format!("Chr({})", self.args(args)),
            Builtin::Substring => self.rt("Substring", &[], args),
            Builtin::Substr => match args {
                [s, begin, rest @ ..] => {
                    let s = self.expr(s);
                    let begin = self.one_based(begin);
                    let count = match rest.first() {
                        Some(count) => self.expr(count),
                        None => "MaxInt".to_string(),
                    };
                    format!("Copy({s}, {begin}, {count})")
                }
                _ => self.rt("Substr", &[], args),
            },
            Builtin::ToUpper => format!("UpperCase({})", self.args(args)),
            Builtin::ToLower => format!("LowerCase({})", self.args(args)),
            Builtin::Split => self.rt("Split", &[], args),
            Builtin::PadStart => self.rt("PadStart", &[], args),
            Builtin::ToString => match args {
                [value] if value.ty.is_integer() => format!("IntToStr({})", self.expr(value)),
                [value] if value.ty.is_float() => format!("FloatToStr({})", self.expr(value)),
                [value] if value.ty.is_bool() => format!("BoolToStr({}, True)", self.expr(value)),
                [value] if value.ty.is_string() => self.expr(value),
                _ => self.rt("ToRadix", &[], args),
            },
            Builtin::ParseInt => self.rt("ParseInt", &[], args),
            Builtin::MapContains => self.method_on(args, "ContainsKey"),
            Builtin::MapGet => match args {
                [m, key] => {
                    let m = self.operand(m, PRIMARY);
                    format!("{m}[{}]", self.expr(key))
                }
                _ => self.method_on(args, "Items"),
            },
            Builtin::MapSet => self.method_on(args, "AddOrSetValue"),
            Builtin::MapDelete => self.method_on(args, "Remove"),
            Builtin::MapKeys => format!("{}.Keys.ToArray", self.receiver(recv)),
            Builtin::MapValues => format!("{}.Values.ToArray", self.receiver(recv)),
            Builtin::NotEmpty | Builtin::IsEmpty => {
                let (cmp, none) = if op == Builtin::NotEmpty { ("<>", ">") } else { ("=", "=") };
                let Some(value) = recv else {
                    return "False".to_string();
                };
                if string {
                    format!("{} {cmp} ''", self.operand(value, RELATIONAL + 1))
                } else if map {
                    format!("{}.Count {none} 0", self.operand(value, PRIMARY))
                } else {
                    format!("Length({}) {none} 0", self.expr(value))
                }
            }
            Builtin::Min | Builtin::Max => {
                let name = if op == Builtin::Min { "Min" } else { "Max" };
                let mut parts: Vec<String> = args.iter().map(|a| self.expr(a)).collect();
                let Some(mut acc) = parts.pop() else {
                    return self.null(ty);
                };
                while let Some(next) = parts.pop() {
                    acc = format!("{name}({next}, {acc})");
                }
                acc
            }
            Builtin::Abs => match recv {
                Some(value) if value.ty.is_integer() && !value.ty.is_signed() => self.expr(value),
                _ => format!("Abs({})", self.args(args)),
            },
            Builtin::Floor | Builtin::Ceil | Builtin::Round | Builtin::Trunc => {
                let name = match op {
                    Builtin::Floor => "Floor",
                    Builtin::Ceil => "Ceil",
                    Builtin::Round => "Round",
                    _ => "Trunc",
                };
                match recv {
                    Some(value) if value.ty.is_integer() => self.expr(value),
                    _ => format!("{name}({})", self.args(args)),
                }
            }
            Builtin::Pow | Builtin::Sqrt => {
                let name = if op == Builtin::Pow { "Power" } else { "Sqrt" };
                let call = format!("{name}({})", self.args(args));
                if ty.is_integer() {
                    format!("Trunc({call})")
                } else {
                    call
                }
            }
            Builtin::HasValue => match recv {
                Some(value) if self.is_ref(&value.ty) => format!("Assigned({})", self.expr(value)),
                _ => format!("{}.HasValue", self.receiver(recv)),
            },
            Builtin::ValueOf => match recv {
                Some(value) if self.is_ref(&value.ty) => self.expr(value),
                _ => format!("{}.Value", self.receiver(recv)),
            },
            Builtin::ValueOr => match recv {
                Some(value) if value.ty.is_optional() => self.method_on(args, "ValueOr"),
                _ => {
                    let t = self.ty(ty);
                    self.rt("ValueOr", &[t], args)
                }
            },
            Builtin::Swap => {
                let t = args.first().map_or_else(|| self.ty(&Type::Unknown), |a| self.ty(&a.ty));
                self.rt("Swap", &[t], args)
            }
            Builtin::ErrorMessage => format!("{}.Message", self.receiver(recv)),
        }
    }

    /// `Rt.Name<T>` or `Rt.NameIndexed<T>` by the callback's arity.
    fn callback_rt(&mut self, name: &str, generics: &[String], args: &[TExpr]) -> String {
        if args.get(1).is_some_and(|f| arity(f) > 1) {
            self.rt(&format!("{name}Indexed"), generics, args)
        } else {
            self.rt(name, generics, args)
        }
    }

    fn receiver(&mut self, recv: Option<&TExpr>) -> String {
        recv.map(|r| self.operand(r, PRIMARY)).unwrap_or_default()
    }

    /// `recv.Name(rest..)` with the first argument as the receiver.
    fn method_on(&mut self, args: &[TExpr], name: &str) -> String {
        let Some((recv, rest)) = args.split_first() else {
            return format!("{name}()");
        };
        let recv = self.operand(recv, PRIMARY);
        format!("{recv}.{name}({})", self.args(rest))
    }
}

fn literal(lit: &Lit) -> String {
    match lit {
        Lit::Int { value, raw } => pascal_int(*value, raw.as_deref()),
        Lit::Float(value) => pascal_float(*value),
        Lit::Str(text) => pascal_string(text),
        Lit::Bool(true) => "True".to_string(),
        Lit::Bool(false) => "False".to_string(),
    }
}
