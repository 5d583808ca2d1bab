//! What a unit uses, for include and `uses` assembly.

use cryptran_core::{Primitive, Type};

use crate::target::{Builtin, ExprKind, Lit, Stmt, TExpr, Unit, Visitor, walk_unit};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Usage {
    pub strings: bool,
    pub sequences: bool,
    pub maps: bool,
    pub optionals: bool,
    pub functions: bool,
    pub references: bool,
    pub exceptions: bool,
    pub math: bool,
    pub algorithms: bool,
}

impl Usage {
    pub fn of(unit: &Unit) -> Self {
        let mut scan = Scan {
            usage: Usage::default(),
            unit,
        };
        walk_unit(unit, &mut scan);
        scan.usage
    }
}

struct Scan<'a> {
    usage: Usage,
    unit: &'a Unit,
}

impl Scan<'_> {
    fn ty(&mut self, ty: &Type) {
        match ty {
            Type::Primitive(Primitive::String) => self.usage.strings = true,
            Type::Primitive(_) | Type::Unknown => {}
            Type::Sequence(element) => {
                self.usage.sequences = true;
                self.ty(element);
            }
            Type::Optional(inner) => {
                if !matches!(&**inner, Type::Named(name) if self.unit.is_ref_type(name)) {
                    self.usage.optionals = true;
                }
                self.ty(inner);
            }
            Type::Named(name) => {
                if self.unit.is_ref_type(name) {
                    self.usage.references = true;
                }
            }
            Type::Map(key, value) => {
                self.usage.maps = true;
                self.ty(key);
                self.ty(value);
            }
            Type::Function { params, ret } => {
                self.usage.functions = true;
                for param in params {
                    self.ty(param);
                }
                self.ty(ret);
            }
        }
    }
}

impl Visitor for Scan<'_> {
    fn visit_type(&mut self, _path: &str, ty: &Type) {
        self.ty(ty);
    }

    fn visit_expr(&mut self, expr: &TExpr) {
        if let ExprKind::Builtin { op, .. } = &expr.kind {
            match op {
                Builtin::Abs
                | Builtin::Floor
                | Builtin::Ceil
                | Builtin::Round
                | Builtin::Trunc
                | Builtin::Pow
                | Builtin::Sqrt
                | Builtin::Min
                | Builtin::Max => self.usage.math = true,
                Builtin::Contains | Builtin::Swap | Builtin::Reverse | Builtin::Sort => {
                    self.usage.algorithms = true;
                }
                _ => {}
            }
        }
        if let ExprKind::Literal(Lit::Float(f)) = &expr.kind
            && !f.is_finite()
        {
            self.usage.math = true;
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        if matches!(stmt, Stmt::Throw(_) | Stmt::Try { .. }) {
            self.usage.exceptions = true;
        }
    }
}
