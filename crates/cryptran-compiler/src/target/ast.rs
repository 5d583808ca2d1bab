//! Typed target tree shared by the C++ and Pascal emitters.
//!
//! Names in this tree are already sanitized for the target. Types are
//! target-neutral [`Type`]s; each emitter spells them.

use cryptran_core::Type;
use indexmap::IndexSet;

#[derive(Clone, Debug, PartialEq)]
pub struct Unit {
    pub name: String,
    pub namespace: String,
    /// Class types passed by reference (`std::shared_ptr`, Pascal class
    /// instances). Records and enums are values.
    pub ref_types: IndexSet<String>,
    pub items: Vec<Item>,
    /// Module-level statements run once when the unit is loaded
    /// (algorithm registration and the like).
    pub init: Vec<Stmt>,
}

impl Unit {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ref_types: IndexSet::new(),
            items: Vec::new(),
            init: Vec::new(),
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.items.iter().filter_map(|item| match item {
            Item::Class(class) => Some(class),
            _ => None,
        })
    }

    pub fn is_ref_type(&self, name: &str) -> bool {
        self.ref_types.contains(name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Class(Class),
    Function(Function),
    Global(Global),
    Placeholder(Placeholder),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Class {
    pub name: String,
    pub base: Option<String>,
    pub doc: Vec<String>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: Type,
    pub is_static: bool,
    pub is_const: bool,
    pub init: Option<TExpr>,
    pub doc: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodKind {
    Constructor,
    Destructor,
    Method,
    Getter,
    Setter,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Qualifiers {
    pub is_static: bool,
    pub is_virtual: bool,
    pub is_override: bool,
    pub is_const: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Method {
    pub name: String,
    pub kind: MethodKind,
    pub params: Vec<Param>,
    pub ret: Type,
    pub quals: Qualifiers,
    /// Arguments of the leading `super(..)` call of a constructor.
    pub super_args: Option<Vec<TExpr>>,
    pub body: Vec<Stmt>,
    pub doc: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Type,
    pub default: Option<TExpr>,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub ret: Type,
    pub body: Vec<Stmt>,
    pub doc: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Global {
    pub name: String,
    pub ty: Type,
    pub init: Option<TExpr>,
    pub is_const: bool,
    pub doc: Vec<String>,
}

/// Stand-in for a source construct with no translation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placeholder {
    /// ESTree `type` of the source node.
    pub kind: String,
    pub reason: String,
}

impl Placeholder {
    pub fn new(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Block(Vec<Stmt>),
    VarDecl {
        name: String,
        ty: Type,
        init: Option<TExpr>,
    },
    Expr(TExpr),
    If {
        cond: TExpr,
        then: Vec<Stmt>,
        els: Option<Vec<Stmt>>,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<TExpr>,
        update: Vec<TExpr>,
        body: Vec<Stmt>,
    },
    ForEach {
        var: String,
        ty: Type,
        iter: TExpr,
        body: Vec<Stmt>,
    },
    While {
        cond: TExpr,
        body: Vec<Stmt>,
    },
    DoWhile {
        body: Vec<Stmt>,
        cond: TExpr,
    },
    /// Case bodies never fall through; a trailing `break` is implied.
    Switch {
        subject: TExpr,
        cases: Vec<Case>,
        default: Option<Vec<Stmt>>,
    },
    Try {
        body: Vec<Stmt>,
        catch: Option<Catch>,
        finally: Option<Vec<Stmt>>,
    },
    Return(Option<TExpr>),
    /// Raise an error carrying the string-typed message.
    Throw(TExpr),
    Break,
    Continue,
    Comment(String),
    Placeholder(Placeholder),
}

impl Stmt {
    /// True if control never reaches the statement after this one.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Stmt::Return(_) | Stmt::Throw(_) | Stmt::Break | Stmt::Continue
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Case {
    pub labels: Vec<TExpr>,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Catch {
    pub name: String,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TExpr {
    pub kind: ExprKind,
    pub ty: Type,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Lit {
    /// `raw` keeps the source spelling (hex) when it denotes the same value.
    Int { value: i128, raw: Option<String> },
    Float(f64),
    Str(String),
    Bool(bool),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge
        )
    }

    pub fn is_bitwise(self) -> bool {
        matches!(
            self,
            BinOp::Shl | BinOp::Shr | BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
    BitNot,
    PreInc,
    PreDec,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IncDec {
    Inc,
    Dec,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Callee {
    /// Free function of this unit.
    Function(String),
    Method { recv: Box<TExpr>, name: String },
    Static { owner: String, name: String },
    /// Base-class implementation of a method of the enclosing class.
    Super(String),
    /// A function-typed value (lambda parameter or local).
    Value(Box<TExpr>),
    /// Helper supplied by the runtime stub, by catalogue name
    /// (`RegisterAlgorithm`, `OpCodes.XorArrays`).
    Runtime(String),
}

/// Operations on strings, sequences, maps and optionals that each target
/// spells differently. The receiver, when there is one, is the first
/// argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    Append,
    AppendAll,
    Prepend,
    PopBack,
    PopFront,
    /// `(seq, begin, end?)`
    Slice,
    /// `(seq, start, count)`
    Splice,
    /// `(seq, value, begin?, end?)`
    Fill,
    /// `(length, fill?)`; the element type comes from the expression type.
    NewSequence,
    Resize,
    Contains,
    IndexOf,
    Concat,
    Join,
    Reverse,
    Sort,
    Size,
    Map,
    Filter,
    Reduce,
    ForEach,
    Some,
    Every,
    Find,
    FindIndex,
    CharCodeAt,
    CharAt,
    FromCharCode,
    /// `(s, begin, end?)`
    Substring,
    /// `(s, begin, length?)`
    Substr,
    ToUpper,
    ToLower,
    Split,
    PadStart,
    /// `(value, radix?)`
    ToString,
    /// `(text, radix?)`
    ParseInt,
    MapContains,
    MapGet,
    MapSet,
    MapDelete,
    MapKeys,
    MapValues,
    NotEmpty,
    IsEmpty,
    Min,
    Max,
    Abs,
    Floor,
    Ceil,
    Round,
    Trunc,
    Pow,
    Sqrt,
    HasValue,
    ValueOf,
    /// `(value, fallback)`: `value` unless it is absent or the empty value of
    /// its type. Each argument is evaluated once.
    ValueOr,
    Swap,
    ErrorMessage,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Literal(Lit),
    /// Absent value; spelled by the expression type.
    Null,
    Ident(String),
    This,
    Binary {
        op: BinOp,
        left: Box<TExpr>,
        right: Box<TExpr>,
    },
    Unary {
        op: UnOp,
        operand: Box<TExpr>,
    },
    Postfix {
        op: IncDec,
        target: Box<TExpr>,
    },
    Assign {
        op: Option<BinOp>,
        target: Box<TExpr>,
        value: Box<TExpr>,
    },
    Member {
        object: Box<TExpr>,
        name: String,
    },
    /// `Owner::name`: static field, enum member or class constant.
    StaticMember {
        owner: String,
        name: String,
    },
    Index {
        object: Box<TExpr>,
        index: Box<TExpr>,
    },
    Call {
        callee: Callee,
        args: Vec<TExpr>,
    },
    Builtin {
        op: Builtin,
        args: Vec<TExpr>,
    },
    /// Construction of the class or record named by the expression type.
    Construct {
        args: Vec<TExpr>,
    },
    ArrayLit(Vec<TExpr>),
    MapLit(Vec<(TExpr, TExpr)>),
    /// Field-initializer list for a record or string-keyed map.
    InitList(Vec<(String, TExpr)>),
    Conditional {
        cond: Box<TExpr>,
        then: Box<TExpr>,
        els: Box<TExpr>,
    },
    Lambda {
        params: Vec<Param>,
        ret: Type,
        body: Vec<Stmt>,
    },
    /// Conversion of the operand to the expression type.
    Cast(Box<TExpr>),
    Group(Box<TExpr>),
    Placeholder(Placeholder),
}

impl TExpr {
    pub fn new(kind: ExprKind, ty: Type) -> Self {
        Self { kind, ty }
    }

    pub fn int(value: i128, ty: Type) -> Self {
        Self::new(ExprKind::Literal(Lit::Int { value, raw: None }), ty)
    }

    pub fn u32(value: u32) -> Self {
        Self::int(i128::from(value), Type::u32())
    }

    pub fn string(text: impl Into<String>) -> Self {
        Self::new(ExprKind::Literal(Lit::Str(text.into())), Type::string())
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(ExprKind::Literal(Lit::Bool(value)), Type::bool())
    }

    pub fn ident(name: impl Into<String>, ty: Type) -> Self {
        Self::new(ExprKind::Ident(name.into()), ty)
    }

    pub fn null(ty: Type) -> Self {
        Self::new(ExprKind::Null, ty)
    }

    pub fn binary(op: BinOp, left: TExpr, right: TExpr, ty: Type) -> Self {
        Self::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            ty,
        )
    }

    pub fn unary(op: UnOp, operand: TExpr, ty: Type) -> Self {
        Self::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            ty,
        )
    }

    pub fn builtin(op: Builtin, args: Vec<TExpr>, ty: Type) -> Self {
        Self::new(ExprKind::Builtin { op, args }, ty)
    }

    pub fn cast(self, ty: Type) -> Self {
        if self.ty == ty {
            return self;
        }
        Self::new(ExprKind::Cast(Box::new(self)), ty)
    }

    pub fn group(self) -> Self {
        let ty = self.ty.clone();
        Self::new(ExprKind::Group(Box::new(self)), ty)
    }

    pub fn assign(target: TExpr, value: TExpr) -> Self {
        let ty = target.ty.clone();
        Self::new(
            ExprKind::Assign {
                op: None,
                target: Box::new(target),
                value: Box::new(value),
            },
            ty,
        )
    }

    pub fn placeholder(kind: impl Into<String>, reason: impl Into<String>, ty: Type) -> Self {
        Self::new(ExprKind::Placeholder(Placeholder::new(kind, reason)), ty)
    }

    /// Integer value of a literal, looking through groups and casts.
    pub fn int_value(&self) -> Option<i128> {
        match &self.kind {
            ExprKind::Literal(Lit::Int { value, .. }) => Some(*value),
            ExprKind::Group(inner) | ExprKind::Cast(inner) => inner.int_value(),
            ExprKind::Unary {
                op: UnOp::Neg,
                operand,
            } => operand.int_value().map(|v| -v),
            _ => None,
        }
    }

    /// Evaluating twice is unobservable and cheap.
    pub fn is_pure(&self) -> bool {
        match &self.kind {
            ExprKind::Literal(_) | ExprKind::Null | ExprKind::Ident(_) | ExprKind::This => true,
            ExprKind::StaticMember { .. } => true,
            ExprKind::Member { object, .. } => object.is_pure(),
            ExprKind::Index { object, index } => object.is_pure() && index.is_pure(),
            ExprKind::Group(inner) | ExprKind::Cast(inner) => inner.is_pure(),
            ExprKind::Binary { left, right, .. } => left.is_pure() && right.is_pure(),
            ExprKind::Unary { op, operand } => {
                !matches!(op, UnOp::PreInc | UnOp::PreDec) && operand.is_pure()
            }
            ExprKind::Builtin {
                op: Builtin::Size,
                args,
            } => args.iter().all(TExpr::is_pure),
            _ => false,
        }
    }

    pub fn is_lvalue(&self) -> bool {
        match &self.kind {
            ExprKind::Ident(_) | ExprKind::StaticMember { .. } => true,
            ExprKind::Member { .. } | ExprKind::Index { .. } => true,
            ExprKind::Group(inner) => inner.is_lvalue(),
            _ => false,
        }
    }
}

/// Read-only traversal hooks over a [`Unit`]. Every declared type and every
/// expression is visited once, in source order; `path` names the enclosing
/// declaration.
pub trait Visitor {
    fn visit_type(&mut self, _path: &str, _ty: &Type) {}
    fn visit_expr(&mut self, _expr: &TExpr) {}
    fn visit_stmt(&mut self, _stmt: &Stmt) {}
}

/// Every place in `unit` where an `Unknown` type survived, as a
/// human-readable path. Empty for a well-formed tree.
pub fn unresolved(unit: &Unit) -> Vec<String> {
    struct Holes(Vec<String>);

    impl Visitor for Holes {
        fn visit_type(&mut self, path: &str, ty: &Type) {
            if ty.contains_unknown() {
                self.0.push(format!("{path}: {ty}"));
            }
        }
    }

    let mut holes = Holes(Vec::new());
    walk_unit(unit, &mut holes);
    holes.0
}

pub fn walk_unit<V: Visitor + ?Sized>(unit: &Unit, v: &mut V) {
    for item in &unit.items {
        match item {
            Item::Class(class) => {
                for field in &class.fields {
                    let path = format!("{}.{}", class.name, field.name);
                    v.visit_type(&path, &field.ty);
                    if let Some(init) = &field.init {
                        walk_expr(&path, init, v);
                    }
                }
                for method in &class.methods {
                    let path = format!("{}.{}", class.name, method.name);
                    for arg in method.super_args.iter().flatten() {
                        walk_expr(&path, arg, v);
                    }
                    walk_callable(&path, &method.params, &method.ret, &method.body, v);
                }
            }
            Item::Function(func) => {
                walk_callable(&func.name, &func.params, &func.ret, &func.body, v);
            }
            Item::Global(global) => {
                v.visit_type(&global.name, &global.ty);
                if let Some(init) = &global.init {
                    walk_expr(&global.name, init, v);
                }
            }
            Item::Placeholder(_) => {}
        }
    }
    walk_stmts("<init>", &unit.init, v);
}

pub fn walk_stmts<V: Visitor + ?Sized>(path: &str, stmts: &[Stmt], v: &mut V) {
    for stmt in stmts {
        walk_stmt(path, stmt, v);
    }
}

fn walk_callable<V: Visitor + ?Sized>(
    path: &str,
    params: &[Param],
    ret: &Type,
    body: &[Stmt],
    v: &mut V,
) {
    for param in params {
        v.visit_type(&format!("{path}({})", param.name), &param.ty);
        if let Some(default) = &param.default {
            walk_expr(path, default, v);
        }
    }
    v.visit_type(&format!("{path} -> "), ret);
    walk_stmts(path, body, v);
}

fn walk_stmt<V: Visitor + ?Sized>(path: &str, stmt: &Stmt, v: &mut V) {
    v.visit_stmt(stmt);
    match stmt {
        Stmt::Block(body) => walk_stmts(path, body, v),
        Stmt::VarDecl { name, ty, init } => {
            v.visit_type(&format!("{path}/{name}"), ty);
            if let Some(init) = init {
                walk_expr(path, init, v);
            }
        }
        Stmt::Expr(e) | Stmt::Throw(e) | Stmt::Return(Some(e)) => walk_expr(path, e, v),
        Stmt::If { cond, then, els } => {
            walk_expr(path, cond, v);
            walk_stmts(path, then, v);
            if let Some(els) = els {
                walk_stmts(path, els, v);
            }
        }
        Stmt::For {
            init,
            cond,
            update,
            body,
        } => {
            if let Some(init) = init {
                walk_stmt(path, init, v);
            }
            if let Some(cond) = cond {
                walk_expr(path, cond, v);
            }
            for e in update {
                walk_expr(path, e, v);
            }
            walk_stmts(path, body, v);
        }
        Stmt::ForEach {
            var,
            ty,
            iter,
            body,
        } => {
            v.visit_type(&format!("{path}/{var}"), ty);
            walk_expr(path, iter, v);
            walk_stmts(path, body, v);
        }
        Stmt::While { cond, body } | Stmt::DoWhile { body, cond } => {
            walk_expr(path, cond, v);
            walk_stmts(path, body, v);
        }
        Stmt::Switch {
            subject,
            cases,
            default,
        } => {
            walk_expr(path, subject, v);
            for case in cases {
                for label in &case.labels {
                    walk_expr(path, label, v);
                }
                walk_stmts(path, &case.body, v);
            }
            if let Some(default) = default {
                walk_stmts(path, default, v);
            }
        }
        Stmt::Try {
            body,
            catch,
            finally,
        } => {
            walk_stmts(path, body, v);
            if let Some(catch) = catch {
                walk_stmts(path, &catch.body, v);
            }
            if let Some(finally) = finally {
                walk_stmts(path, finally, v);
            }
        }
        Stmt::Return(None)
        | Stmt::Break
        | Stmt::Continue
        | Stmt::Comment(_)
        | Stmt::Placeholder(_) => {}
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(path: &str, expr: &TExpr, v: &mut V) {
    v.visit_expr(expr);
    v.visit_type(path, &expr.ty);
    match &expr.kind {
        ExprKind::Literal(_)
        | ExprKind::Null
        | ExprKind::Ident(_)
        | ExprKind::This
        | ExprKind::StaticMember { .. }
        | ExprKind::Placeholder(_) => {}
        ExprKind::Binary { left, right, .. } => {
            walk_expr(path, left, v);
            walk_expr(path, right, v);
        }
        ExprKind::Unary { operand: inner, .. }
        | ExprKind::Postfix { target: inner, .. }
        | ExprKind::Member { object: inner, .. }
        | ExprKind::Cast(inner)
        | ExprKind::Group(inner) => walk_expr(path, inner, v),
        ExprKind::Assign { target, value, .. } => {
            walk_expr(path, target, v);
            walk_expr(path, value, v);
        }
        ExprKind::Index { object, index } => {
            walk_expr(path, object, v);
            walk_expr(path, index, v);
        }
        ExprKind::Call { callee, args } => {
            match callee {
                Callee::Method { recv, .. } | Callee::Value(recv) => walk_expr(path, recv, v),
                Callee::Function(_) | Callee::Static { .. } | Callee::Super(_) | Callee::Runtime(_) => {}
            }
            for arg in args {
                walk_expr(path, arg, v);
            }
        }
        ExprKind::Builtin { args, .. } | ExprKind::Construct { args } | ExprKind::ArrayLit(args) => {
            for arg in args {
                walk_expr(path, arg, v);
            }
        }
        ExprKind::MapLit(entries) => {
            for (key, value) in entries {
                walk_expr(path, key, v);
                walk_expr(path, value, v);
            }
        }
        ExprKind::InitList(entries) => {
            for (_, value) in entries {
                walk_expr(path, value, v);
            }
        }
        ExprKind::Conditional { cond, then, els } => {
            walk_expr(path, cond, v);
            walk_expr(path, then, v);
            walk_expr(path, els, v);
        }
        ExprKind::Lambda { params, ret, body } => {
            walk_callable(&format!("{path}/<lambda>"), params, ret, body, v);
        }
    }
}
