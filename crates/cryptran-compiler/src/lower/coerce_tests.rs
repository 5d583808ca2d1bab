use cryptran_core::Type;

use super::coerce::{coerce, empty_value, falsy, fits, truthy};
use crate::target::{BinOp, Builtin, ExprKind, Lit, TExpr};

#[test]
fn integer_ranges() {
    assert!(fits(255, &Type::u8()));
    assert!(!fits(256, &Type::u8()));
    assert!(!fits(-1, &Type::u32()));
    assert!(fits(-1, &Type::i32()));
    assert!(fits(i128::from(u32::MAX), &Type::u32()));
    assert!(!fits(1, &Type::f64()));
}

#[test]
fn null_becomes_the_empty_value() {
    let bytes = coerce(TExpr::null(Type::Unknown), &Type::bytes());
    assert_eq!(bytes.kind, ExprKind::ArrayLit(Vec::new()));
    assert_eq!(bytes.ty, Type::bytes());

    let text = coerce(TExpr::null(Type::Unknown), &Type::string());
    assert_eq!(text, TExpr::string(""));

    let object = coerce(TExpr::null(Type::Unknown), &Type::named("Cipher"));
    assert_eq!(object, TExpr::null(Type::named("Cipher")));
}

#[test]
fn fitting_literals_are_retyped() {
    let lit = coerce(TExpr::u32(7), &Type::u8());
    assert_eq!(lit.ty, Type::u8());
    assert!(matches!(lit.kind, ExprKind::Literal(Lit::Int { value: 7, .. })));

    let wide = coerce(TExpr::u32(300), &Type::u8());
    assert!(matches!(wide.kind, ExprKind::Cast(_)));
}

#[test]
fn array_literal_elements_follow_the_sequence() {
    let items = vec![TExpr::u32(1), TExpr::u32(2)];
    let lit = coerce(TExpr::new(ExprKind::ArrayLit(items), Type::words()), &Type::bytes());
    let ExprKind::ArrayLit(items) = &lit.kind else {
        panic!("expected an array literal, got {lit:?}");
    };
    assert!(items.iter().all(|e| e.ty == Type::u8()));
    assert_eq!(lit.ty, Type::bytes());
}

#[test]
fn narrowing_and_sign_changes_are_cast() {
    let x = TExpr::ident("x", Type::u32());
    assert!(matches!(coerce(x.clone(), &Type::u8()).kind, ExprKind::Cast(_)));
    assert!(matches!(coerce(x.clone(), &Type::i32()).kind, ExprKind::Cast(_)));
    assert_eq!(coerce(x.clone(), &Type::u64()), x);
    assert_eq!(coerce(x.clone(), &Type::f64()), x);

    let f = TExpr::ident("f", Type::f64());
    assert!(matches!(coerce(f, &Type::u32()).kind, ExprKind::Cast(_)));
}

#[test]
fn optionals_are_unwrapped() {
    let maybe = TExpr::ident("m", Type::optional(Type::u32()));
    let value = coerce(maybe, &Type::u32());
    assert!(matches!(
        value.kind,
        ExprKind::Builtin {
            op: Builtin::ValueOf,
            ..
        }
    ));
    assert_eq!(value.ty, Type::u32());
}

#[test]
fn values_flow_into_optionals() {
    let x = TExpr::ident("x", Type::u32());
    assert_eq!(coerce(x.clone(), &Type::optional(Type::u32())), x);
}

#[test]
fn empty_values_per_type() {
    assert_eq!(empty_value(&Type::bool()), TExpr::boolean(false));
    assert_eq!(empty_value(&Type::u16()), TExpr::int(0, Type::u16()));
    assert_eq!(empty_value(&Type::string()), TExpr::string(""));
    assert_eq!(empty_value(&Type::map(Type::string(), Type::u32())).ty, Type::map(Type::string(), Type::u32()));
}

#[test]
fn truthiness_is_explicit() {
    let flag = TExpr::ident("ok", Type::bool());
    assert_eq!(truthy(flag.clone()), flag);

    let n = truthy(TExpr::ident("n", Type::u32()));
    assert!(matches!(n.kind, ExprKind::Binary { op: BinOp::Ne, .. }));
    assert_eq!(n.ty, Type::bool());

    let s = truthy(TExpr::ident("s", Type::string()));
    assert!(matches!(
        s.kind,
        ExprKind::Builtin {
            op: Builtin::NotEmpty,
            ..
        }
    ));

    let o = truthy(TExpr::ident("o", Type::optional(Type::u8())));
    assert!(matches!(
        o.kind,
        ExprKind::Builtin {
            op: Builtin::HasValue,
            ..
        }
    ));

    let c = falsy(TExpr::ident("c", Type::named("Cipher")));
    assert!(matches!(c.kind, ExprKind::Binary { op: BinOp::Eq, .. }));
}
