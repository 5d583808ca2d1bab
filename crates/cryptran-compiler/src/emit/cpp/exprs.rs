//! Expressions, with parentheses from C++ operator precedence.

use cryptran_core::Type;

use super::CppEmitter;
use crate::emit::literals::{cpp_float, cpp_int, cpp_string};
use crate::emit::placeholder_note;
use crate::emit::printer::Printer;
use crate::target::{
    BinOp, Builtin, Callee, ExprKind, IncDec, Lit, Param, Stmt, TExpr, UnOp, Visitor, walk_stmts,
};

pub(super) const PRIMARY: u8 = 16;
const UNARY: u8 = 15;
const MULTIPLICATIVE: u8 = 13;
const ADDITIVE: u8 = 12;
const SHIFT: u8 = 11;
const RELATIONAL: u8 = 9;
pub(super) const EQUALITY: u8 = 8;
const BIT_AND: u8 = 7;
const BIT_XOR: u8 = 6;
const BIT_OR: u8 = 5;
const LOGICAL_AND: u8 = 4;
const LOGICAL_OR: u8 = 3;
const ASSIGNMENT: u8 = 2;

/// Array literals longer than this are laid out in rows.
const ROW: usize = 16;

fn binary_prec(op: BinOp) -> u8 {
    match op {
        BinOp::Mul | BinOp::Div | BinOp::Rem => MULTIPLICATIVE,
        BinOp::Add | BinOp::Sub => ADDITIVE,
        BinOp::Shl | BinOp::Shr => SHIFT,
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => RELATIONAL,
        BinOp::Eq | BinOp::Ne => EQUALITY,
        BinOp::BitAnd => BIT_AND,
        BinOp::BitXor => BIT_XOR,
        BinOp::BitOr => BIT_OR,
        BinOp::And => LOGICAL_AND,
        BinOp::Or => LOGICAL_OR,
    }
}

fn binary_token(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Rem => "%",
        BinOp::Shl => "<<",
        BinOp::Shr => ">>",
        BinOp::BitAnd => "&",
        BinOp::BitOr => "|",
        BinOp::BitXor => "^",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::Lt => "<",
        BinOp::Le => "<=",
        BinOp::Gt => ">",
        BinOp::Ge => ">=",
        BinOp::And => "&&",
        BinOp::Or => "||",
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

impl CppEmitter<'_> {
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
            ExprKind::Binary { op, .. } => binary_prec(*op),
            ExprKind::Unary { .. } => UNARY,
            ExprKind::Assign { .. } | ExprKind::Conditional { .. } => ASSIGNMENT,
            ExprKind::Builtin { op, args } => self.builtin_prec(*op, args),
            _ => PRIMARY,
        }
    }

    fn builtin_prec(&self, op: Builtin, args: &[TExpr]) -> u8 {
        let recv = args.first();
        match op {
            Builtin::Contains if recv.is_some_and(|r| r.ty.is_string() || r.is_pure()) => EQUALITY,
            Builtin::MapContains => EQUALITY,
            Builtin::HasValue if recv.is_some_and(|r| self.is_ref(&r.ty)) => EQUALITY,
            Builtin::NotEmpty => UNARY,
            Builtin::MapSet => ASSIGNMENT,
            _ => PRIMARY,
        }
    }

    pub(super) fn expr(&mut self, e: &TExpr) -> String {
        match &e.kind {
            ExprKind::Literal(lit) => self.literal(lit, &e.ty),
            ExprKind::Null => self.null(&e.ty),
            ExprKind::Ident(name) => name.clone(),
            ExprKind::This => self.this_value(),
            ExprKind::Binary { op, left, right } => self.binary(*op, left, right, &e.ty),
            ExprKind::Unary { op, operand } => {
                let token = match op {
                    UnOp::Neg => "-",
                    UnOp::Not => "!",
                    UnOp::BitNot => "~",
                    UnOp::PreInc => "++",
                    UnOp::PreDec => "--",
                };
                let operand = self.operand(operand, UNARY);
                if operand.starts_with(['-', '+']) {
                    format!("{token}({operand})")
                } else {
                    format!("{token}{operand}")
                }
            }
            ExprKind::Postfix { op, target } => {
                let target = self.operand(target, PRIMARY);
                match op {
                    IncDec::Inc => format!("{target}++"),
                    IncDec::Dec => format!("{target}--"),
                }
            }
            ExprKind::Assign { op, target, value } => {
                let target = self.operand(target, UNARY);
                let value = self.operand(value, ASSIGNMENT);
                match op {
                    Some(op) => format!("{target} {}= {value}", binary_token(*op)),
                    None => format!("{target} = {value}"),
                }
            }
            ExprKind::Member { object, name } => {
                let object = self.receiver(object);
                format!("{object}{name}")
            }
            ExprKind::StaticMember { owner, name } => format!("{owner}::{name}"),
            ExprKind::Index { object, index } => {
                let object = self.operand(object, PRIMARY);
                let index = self.expr(index);
                format!("{object}[{index}]")
            }
            ExprKind::Call { callee, args } => self.call(callee, args),
            ExprKind::Builtin { op, args } => self.builtin(*op, args, &e.ty),
            ExprKind::Construct { args } => {
                let args = self.args(args);
                let name = e.ty.named_str().map(|n| self.type_name(n)).unwrap_or_default();
                if self.is_ref(&e.ty) {
                    format!("std::make_shared<{name}>({args})")
                } else {
                    format!("{name}({args})")
                }
            }
            ExprKind::ArrayLit(items) => {
                let ty = self.ty(&e.ty);
                let items: Vec<String> = items.iter().map(|item| self.expr(item)).collect();
                format!("{ty}{}", self.list(&items))
            }
            ExprKind::MapLit(entries) => {
                let ty = self.ty(&e.ty);
                let entries: Vec<String> = entries
                    .iter()
                    .map(|(key, value)| format!("{{{}, {}}}", self.expr(key), self.expr(value)))
                    .collect();
                format!("{ty}{}", self.list(&entries))
            }
            ExprKind::InitList(entries) => {
                let ty = self.ty(&e.ty);
                let entries: Vec<String> = entries
                    .iter()
                    .map(|(key, value)| format!("{{{}, {}}}", cpp_string(key), self.expr(value)))
                    .collect();
                format!("{ty}{}", self.list(&entries))
            }
            ExprKind::Conditional { cond, then, els } => {
                let cond = self.operand(cond, LOGICAL_OR);
                let then = self.operand(then, ASSIGNMENT);
                let els = self.operand(els, ASSIGNMENT);
                format!("{cond} ? {then} : {els}")
            }
            ExprKind::Lambda { params, ret, body } => self.lambda(params, ret, body),
            ExprKind::Cast(inner) => self.cast(inner, &e.ty),
            ExprKind::Group(inner) => format!("({})", self.expr(inner)),
            ExprKind::Placeholder(placeholder) => {
                let note = self.comment(&placeholder_note(placeholder));
                if e.ty.is_void() {
                    format!("{note} (void)0")
                } else {
                    format!("{note} {}{{}}", self.ty(&e.ty))
                }
            }
        }
    }

    /// `/* text */`, never closed early by the text itself.
    pub(super) fn comment(&self, text: &str) -> String {
        format!("/* {} */", text.replace("*/", "* /"))
    }

    fn literal(&self, lit: &Lit, ty: &Type) -> String {
        match lit {
            Lit::Int { value, raw } => cpp_int(*value, raw.as_deref(), ty),
            Lit::Float(value) => cpp_float(*value, ty),
            Lit::Str(text) => cpp_string(text),
            Lit::Bool(value) => value.to_string(),
        }
    }

    fn null(&self, ty: &Type) -> String {
        match ty {
            t if self.is_ref(t) => "nullptr".to_string(),
            Type::Optional(_) => "std::nullopt".to_string(),
            other => format!("{}{{}}", self.ty(other)),
        }
    }

    /// `this` as a value: the owning `shared_ptr`, typed as the class.
    fn this_value(&self) -> String {
        match self.class {
            Some(class) if class.base.is_some() => format!(
                "std::static_pointer_cast<{}>(shared_from_this())",
                class.name
            ),
            Some(_) => "shared_from_this()".to_string(),
            None => "this".to_string(),
        }
    }

    /// Object text plus the member operator: `this->`, `p->`, `v.`.
    fn receiver(&mut self, object: &TExpr) -> String {
        if matches!(object.kind, ExprKind::This) {
            return "this->".to_string();
        }
        let text = self.operand(object, PRIMARY);
        if self.is_ref(&object.ty) || object.ty.is_optional() {
            format!("{text}->")
        } else {
            format!("{text}.")
        }
    }

    fn binary(&mut self, op: BinOp, left: &TExpr, right: &TExpr, ty: &Type) -> String {
        let prec = binary_prec(op);
        let mut l = if clarify(op, left) {
            format!("({})", self.expr(left))
        } else {
            self.operand(left, prec)
        };
        let r = if clarify(op, right) {
            format!("({})", self.expr(right))
        } else {
            self.operand(right, prec + 1)
        };
        // Two character pointers do not add up to a string.
        if op == BinOp::Add && ty.is_string() && matches!(left.kind, ExprKind::Literal(Lit::Str(_))) {
            l = format!("std::string({l})");
        }
        format!("{l} {} {r}", binary_token(op))
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
                let recv = self.receiver(recv);
                format!("{recv}{name}({args})")
            }
            Callee::Static { owner, name } => format!("{owner}::{name}({args})"),
            Callee::Super(name) => match self.class.and_then(|c| c.base.as_deref()) {
                Some(base) => format!("{base}::{name}({args})"),
                None => format!("{name}({args})"),
            },
            Callee::Value(f) => {
                let f = self.operand(f, PRIMARY);
                format!("{f}({args})")
            }
            Callee::Runtime(name) => format!("{}({args})", name.replace('.', "::")),
        }
    }

    /// `{a, b}`, or rows of [`ROW`] items for long literals.
    fn list(&self, items: &[String]) -> String {
        if items.len() <= ROW {
            return format!("{{{}}}", items.join(", "));
        }
        let newline = self.p.newline();
        let outer = self.p.indentation();
        let inner = format!("{outer}{}", self.config.indent_unit);
        let rows: Vec<String> = items
            .chunks(ROW)
            .map(|row| format!("{inner}{}", row.join(", ")))
            .collect();
        format!("{{{newline}{}{newline}{outer}}}", rows.join(&format!(",{newline}")))
    }

    fn cast(&mut self, inner: &TExpr, ty: &Type) -> String {
        if self.ty(&inner.ty) == self.ty(ty) || matches!(ty, Type::Optional(i) if **i == inner.ty) {
            return self.expr(inner);
        }
        if ty.is_string() && inner.ty.is_numeric() {
            return format!("std::to_string({})", self.expr(inner));
        }
        if ty.is_bool() && inner.ty.is_numeric() {
            return format!("{} != 0", self.operand(inner, EQUALITY + 1));
        }
        format!("static_cast<{}>({})", self.ty(ty), self.expr(inner))
    }

    fn lambda(&mut self, params: &[Param], ret: &Type, body: &[Stmt]) -> String {
        let capture = if mutates_outer(params, body) { "&" } else { "=" };
        let params = self.params(params, false);
        let head = format!("[{capture}]({params}) -> {}", self.ty(ret));
        let nested = self.p.nested();
        let outer = std::mem::replace(&mut self.p, nested);
        Printer::braced(self, &head, "", |e| e.body(body));
        let text = std::mem::replace(&mut self.p, outer).into_inline();
        // The first line continues the enclosing one.
        text.trim_start().to_string()
    }

    fn builtin(&mut self, op: Builtin, args: &[TExpr], ty: &Type) -> String {
        let recv = args.first();
        let arg = |i: usize| args.get(i);
        match op {
            Builtin::Append => self.method_on(args, "push_back"),
            Builtin::AppendAll => match (recv, arg(1)) {
                (Some(r), Some(w)) if r.is_pure() && w.is_pure() => {
                    let r = self.receiver(r);
                    let w = self.receiver(w);
                    format!("{r}insert({r}end(), {w}begin(), {w}end())")
                }
                _ => self.runtime("append_all", args),
            },
            Builtin::Prepend => match recv {
                Some(r) if r.is_pure() => {
                    let r = self.receiver(r);
                    let value = arg(1).map(|v| self.expr(v)).unwrap_or_default();
                    format!("{r}insert({r}begin(), {value})")
                }
                _ => self.runtime("prepend", args),
            },
            Builtin::PopBack => self.runtime("pop_back", args),
            Builtin::PopFront => self.runtime("pop_front", args),
            Builtin::Slice => self.slice(args, ty),
            Builtin::Splice => self.runtime("splice", args),
            Builtin::Fill => self.runtime("fill", args),
            Builtin::NewSequence => format!("{}({})", self.ty(ty), self.args(args)),
            Builtin::Resize => self.method_on(args, "resize"),
            Builtin::Contains => match (recv, arg(1)) {
                (Some(s), Some(x)) if s.ty.is_string() => {
                    let s = self.receiver(s);
                    let x = self.expr(x);
                    format!("{s}find({x}) != std::string::npos")
                }
                (Some(r), Some(x)) if r.is_pure() => {
                    let r = self.receiver(r);
                    let x = self.expr(x);
                    format!("std::find({r}begin(), {r}end(), {x}) != {r}end()")
                }
                _ => self.runtime("contains", args),
            },
            Builtin::IndexOf => self.runtime("index_of", args),
            Builtin::Concat => self.runtime("concat", args),
            Builtin::Join => self.runtime("join", args),
            Builtin::Reverse => self.runtime("reverse", args),
            Builtin::Sort => self.runtime("sort", args),
            Builtin::Size => self.method_on(args, "size"),
            Builtin::Map => self.runtime("map", args),
            Builtin::Filter => self.runtime("filter", args),
            Builtin::Reduce => self.runtime("reduce", args),
            Builtin::ForEach => self.runtime("for_each", args),
            Builtin::Some => self.runtime("some", args),
            Builtin::Every => self.runtime("every", args),
            Builtin::Find => self.runtime("find", args),
            Builtin::FindIndex => self.runtime("find_index", args),
            Builtin::CharCodeAt => self.runtime("char_code_at", args),
            Builtin::CharAt => match (recv, arg(1)) {
                (Some(s), Some(i)) => {
                    let s = self.operand(s, PRIMARY);
                    let i = self.expr(i);
                    format!("std::string(1, {s}[{i}])")
                }
                _ => self.runtime("char_at", args),
            },
            Builtin::FromCharCode => {
                format!("std::string(1, static_cast<char>({}))", self.args(args))
            }
            Builtin::Substring => self.runtime("substring", args),
            Builtin::Substr => self.method_on(args, "substr"),
            Builtin::ToUpper => self.runtime("to_upper", args),
            Builtin::ToLower => self.runtime("to_lower", args),
            Builtin::Split => self.runtime("split", args),
            Builtin::PadStart => self.runtime("pad_start", args),
            Builtin::ToString => match args {
                [value] if value.ty.is_numeric() => format!("std::to_string({})", self.expr(value)),
                _ => self.runtime("to_string", args),
            },
            Builtin::ParseInt => self.runtime("parse_int", args),
            Builtin::MapContains => format!("{} != 0", self.method_on(args, "count")),
            Builtin::MapGet => self.method_on(args, "at"),
            Builtin::MapSet => match args {
                [map, key, value] => {
                    let map = self.operand(map, PRIMARY);
                    let key = self.expr(key);
                    let value = self.operand(value, ASSIGNMENT);
                    format!("{map}[{key}] = {value}")
                }
                _ => self.runtime("map_set", args),
            },
            Builtin::MapDelete => self.method_on(args, "erase"),
            Builtin::MapKeys => self.runtime("keys", args),
            Builtin::MapValues => self.runtime("values", args),
            Builtin::NotEmpty => format!("!{}", self.method_on(args, "empty")),
            Builtin::IsEmpty => self.method_on(args, "empty"),
            Builtin::Min | Builtin::Max => {
                let name = if op == Builtin::Min { "min" } else { "max" };
                let t = self.ty(ty);
                match args {
                    [one] => self.expr(one),
                    [_, _] => format!("std::{name}<{t}>({})", self.args(args)),
                    _ => format!("std::{name}<{t}>({{{}}})", self.args(args)),
                }
            }
            Builtin::Abs => match recv {
                Some(value) if value.ty.is_integer() && !value.ty.is_signed() => self.expr(value),
                _ => self.math("abs", args, ty),
            },
            Builtin::Floor => self.math("floor", args, ty),
            Builtin::Ceil => self.math("ceil", args, ty),
            Builtin::Round => self.math("round", args, ty),
            Builtin::Trunc => self.math("trunc", args, ty),
            Builtin::Pow => self.math("pow", args, ty),
            Builtin::Sqrt => self.math("sqrt", args, ty),
            Builtin::HasValue => match recv {
                Some(value) if self.is_ref(&value.ty) => {
                    format!("{} != nullptr", self.operand(value, EQUALITY + 1))
                }
                _ => self.optional_method(args, "has_value"),
            },
            Builtin::ValueOf => match recv {
                Some(value) if self.is_ref(&value.ty) => self.expr(value),
                _ => self.optional_method(args, "value"),
            },
            Builtin::ValueOr => match recv {
                Some(value) if value.ty.is_optional() => self.optional_method(args, "value_or"),
                _ => format!("rt::value_or<{}>({})", self.ty(ty), self.args(args)),
            },
            Builtin::Swap => format!("std::swap({})", self.args(args)),
            Builtin::ErrorMessage => format!("std::string({})", self.method_on(args, "what")),
        }
    }

    /// `recv.name(rest..)` with the first argument as the receiver.
    fn method_on(&mut self, args: &[TExpr], name: &str) -> String {
        let Some((recv, rest)) = args.split_first() else {
            return format!("{name}()");
        };
        let recv = self.receiver(recv);
        format!("{recv}{name}({})", self.args(rest))
    }

    /// Member of `std::optional` itself, which [`Self::receiver`] would
    /// forward to the contained value.
    fn optional_method(&mut self, args: &[TExpr], name: &str) -> String {
        let Some((recv, rest)) = args.split_first() else {
            return format!("{name}()");
        };
        let recv = self.operand(recv, PRIMARY);
        format!("{recv}.{name}({})", self.args(rest))
    }

    fn runtime(&mut self, name: &str, args: &[TExpr]) -> String {
        format!("rt::{name}({})", self.args(args))
    }

    /// `std::name(..)`, converted back when the result is an integer.
    fn math(&mut self, name: &str, args: &[TExpr], ty: &Type) -> String {
        let call = format!("std::{name}({})", self.args(args));
        let float_args = args.iter().all(|a| a.ty.is_float());
        if ty.is_integer() && (float_args || name != "abs") {
            format!("static_cast<{}>({call})", self.ty(ty))
        } else {
            call
        }
    }

    /// Iterator-range copy when the operands can be evaluated twice.
    fn slice(&mut self, args: &[TExpr], ty: &Type) -> String {
        let t = self.ty(ty);
        match args {
            [seq] => format!("{t}({})", self.expr(seq)),
            [seq, begin, rest @ ..] if seq.is_pure() && !seq.ty.is_string() => {
                let r = self.receiver(seq);
                let begin = self.operand(begin, ADDITIVE + 1);
                let end = match rest.first() {
                    Some(end) => format!("{r}begin() + {}", self.operand(end, ADDITIVE + 1)),
                    None => format!("{r}end()"),
                };
                format!("{t}({r}begin() + {begin}, {end})")
            }
            _ => self.runtime("slice", args),
        }
    }
}

/// The body writes to a variable it did not declare, so the lambda must
/// capture by reference.
fn mutates_outer(params: &[Param], body: &[Stmt]) -> bool {
    struct Writes {
        locals: Vec<String>,
        outer: bool,
    }

    fn root(e: &TExpr) -> Option<&str> {
        match &e.kind {
            ExprKind::Ident(name) => Some(name),
            ExprKind::Member { object, .. } | ExprKind::Index { object, .. } => root(object),
            ExprKind::Group(inner) => root(inner),
            _ => None,
        }
    }

    impl Writes {
        fn write(&mut self, target: &TExpr) {
            if let Some(name) = root(target)
                && !self.locals.iter().any(|l| l == name)
            {
                self.outer = true;
            }
        }
    }

    impl Visitor for Writes {
        fn visit_stmt(&mut self, stmt: &Stmt) {
            match stmt {
                Stmt::VarDecl { name, .. } | Stmt::ForEach { var: name, .. } => {
                    self.locals.push(name.clone());
                }
                _ => {}
            }
        }

        fn visit_expr(&mut self, e: &TExpr) {
            match &e.kind {
                ExprKind::Assign { target, .. } | ExprKind::Postfix { target, .. } => {
                    self.write(target);
                }
                ExprKind::Unary {
                    op: UnOp::PreInc | UnOp::PreDec,
                    operand,
                } => self.write(operand),
                ExprKind::Builtin { op, args } if mutates_receiver(*op) => {
                    if let Some(recv) = args.first() {
                        self.write(recv);
                    }
                }
                _ => {}
            }
        }
    }

    let mut writes = Writes {
        locals: params.iter().map(|p| p.name.clone()).collect(),
        outer: false,
    };
    walk_stmts("<lambda>", body, &mut writes);
    writes.outer
}

fn mutates_receiver(op: Builtin) -> bool {
    matches!(
        op,
        Builtin::Append
            | Builtin::AppendAll
            | Builtin::Prepend
            | Builtin::PopBack
            | Builtin::PopFront
            | Builtin::Splice
            | Builtin::Fill
            | Builtin::Resize
            | Builtin::Reverse
            | Builtin::Sort
            | Builtin::MapSet
            | Builtin::MapDelete
            | Builtin::Swap
    )
}
