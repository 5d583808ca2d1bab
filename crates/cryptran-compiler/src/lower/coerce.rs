//! Conversions to an expected type, and truthiness.

use cryptran_core::Type;

use crate::target::{BinOp, Builtin, ExprKind, Lit, TExpr, UnOp};

/// Convert `expr` to `want`.
///
/// Absent values become the empty value of `want`, literals are retyped
/// when they fit, optionals are unwrapped, and numeric values get an
/// explicit cast when the conversion narrows, changes signedness or drops
/// a fraction. Anything else is returned as is.
pub fn coerce(expr: TExpr, want: &Type) -> TExpr {
    if expr.ty == *want || want.is_unknown() || want.is_void() {
        return expr;
    }
    let TExpr { kind, ty } = expr;
    match kind {
        ExprKind::Null => empty_value(want),
        ExprKind::ArrayLit(items) if want.is_sequence() => {
            let element = want.element().cloned().unwrap_or(Type::Unknown);
            let items = items.into_iter().map(|e| coerce(e, &element)).collect();
            TExpr::new(ExprKind::ArrayLit(items), want.clone())
        }
        ExprKind::MapLit(entries) if entries.is_empty() && want.is_map() => {
            TExpr::new(ExprKind::MapLit(entries), want.clone())
        }
        ExprKind::Builtin {
            op: Builtin::NewSequence,
            mut args,
        } if want.is_sequence() => {
            if let (Some(fill), Some(element)) = (args.get_mut(1), want.element()) {
                let value = std::mem::replace(fill, TExpr::null(Type::Unknown));
                *fill = coerce(value, element);
            }
            TExpr::builtin(Builtin::NewSequence, args, want.clone())
        }
        ExprKind::Literal(Lit::Int { value, raw }) if fits(value, want.unwrap_optional()) => {
            TExpr::new(
                ExprKind::Literal(Lit::Int { value, raw }),
                want.unwrap_optional().clone(),
            )
        }
        ExprKind::Literal(Lit::Int { value, .. }) if want.unwrap_optional().is_float() => {
            TExpr::new(
                ExprKind::Literal(Lit::Float(value as f64)),
                want.unwrap_optional().clone(),
            )
        }
        ExprKind::Conditional { cond, then, els } => {
            let then = coerce(*then, want);
            let els = coerce(*els, want);
            TExpr::new(
                ExprKind::Conditional {
                    cond,
                    then: Box::new(then),
                    els: Box::new(els),
                },
                want.clone(),
            )
        }
        kind => convert(TExpr::new(kind, ty), want),
    }
}

fn convert(expr: TExpr, want: &Type) -> TExpr {
    match (&expr.ty, want) {
        (Type::Optional(inner), want) if !want.is_optional() => {
            let inner = (**inner).clone();
            coerce(TExpr::builtin(Builtin::ValueOf, vec![expr], inner), want)
        }
        // Values convert into optionals implicitly in both targets.
        (_, Type::Optional(inner)) => coerce(expr, inner),
        (from, want) if from.is_numeric() && want.is_numeric() => {
            if needs_cast(from, want) {
                expr.cast(want.clone())
            } else {
                expr
            }
        }
        _ => expr,
    }
}

fn needs_cast(from: &Type, want: &Type) -> bool {
    if from.is_float() {
        return want.is_integer() || want.width() < from.width();
    }
    if want.is_float() {
        return false;
    }
    want.width() < from.width() || want.is_signed() != from.is_signed()
}

/// True if `value` is representable in the integer type `ty`.
pub fn fits(value: i128, ty: &Type) -> bool {
    if !ty.is_integer() {
        return false;
    }
    let width = u32::from(ty.width().unwrap_or(32));
    if ty.is_signed() {
        let bound = 1i128 << (width - 1);
        (-bound..bound).contains(&value)
    } else {
        (0..(1i128 << width)).contains(&value)
    }
}

/// The value `null`/`undefined` stands for at type `ty`: empty collections,
/// zero, `false`, the empty string, or an absent reference.
pub fn empty_value(ty: &Type) -> TExpr {
    match ty {
        Type::Sequence(_) => TExpr::new(ExprKind::ArrayLit(Vec::new()), ty.clone()),
        Type::Map(..) => TExpr::new(ExprKind::MapLit(Vec::new()), ty.clone()),
        t if t.is_bool() => TExpr::boolean(false),
        t if t.is_integer() => TExpr::int(0, ty.clone()),
        t if t.is_float() => TExpr::new(ExprKind::Literal(Lit::Float(0.0)), ty.clone()),
        t if t.is_string() => TExpr::string(""),
        _ => TExpr::null(ty.clone()),
    }
}

/// Explicit test standing for the source truthiness of `expr`.
pub fn truthy(expr: TExpr) -> TExpr {
    let ty = expr.ty.clone();
    match &ty {
        t if t.is_bool() => expr,
        t if t.is_numeric() => TExpr::binary(BinOp::Ne, expr, empty_value(t), Type::bool()),
        t if t.is_string() || t.is_sequence() || t.is_map() => {
            TExpr::builtin(Builtin::NotEmpty, vec![expr], Type::bool())
        }
        Type::Optional(_) => TExpr::builtin(Builtin::HasValue, vec![expr], Type::bool()),
        _ => TExpr::binary(BinOp::Ne, expr, TExpr::null(ty), Type::bool()),
    }
}

/// Negation of [`truthy`].
pub fn falsy(expr: TExpr) -> TExpr {
    let ty = expr.ty.clone();
    match &ty {
        t if t.is_bool() => TExpr::unary(UnOp::Not, expr, Type::bool()),
        t if t.is_numeric() => TExpr::binary(BinOp::Eq, expr, empty_value(t), Type::bool()),
        t if t.is_string() || t.is_sequence() || t.is_map() => {
            TExpr::builtin(Builtin::IsEmpty, vec![expr], Type::bool())
        }
        Type::Optional(_) => TExpr::unary(
            UnOp::Not,
            TExpr::builtin(Builtin::HasValue, vec![expr], Type::bool()),
            Type::bool(),
        ),
        _ => TExpr::binary(BinOp::Eq, expr, TExpr::null(ty), Type::bool()),
    }
}
