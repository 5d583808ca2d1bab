use crate::types::{Primitive, Type};

#[test]
fn display_primitives() {
    insta::assert_snapshot!(Type::bool().to_string(), @"bool");
    insta::assert_snapshot!(Type::u8().to_string(), @"uint8");
    insta::assert_snapshot!(Type::int(16, true).to_string(), @"int16");
    insta::assert_snapshot!(Type::f64().to_string(), @"float64");
    insta::assert_snapshot!(Type::string().to_string(), @"string");
    insta::assert_snapshot!(Type::void().to_string(), @"void");
    insta::assert_snapshot!(Type::Unknown.to_string(), @"unknown");
}

#[test]
fn display_composites() {
    insta::assert_snapshot!(Type::bytes().to_string(), @"uint8[]");
    insta::assert_snapshot!(Type::seq(Type::words()).to_string(), @"uint32[][]");
    insta::assert_snapshot!(Type::optional(Type::u32()).to_string(), @"uint32?");
    insta::assert_snapshot!(Type::named("KeySize").to_string(), @"KeySize");
    insta::assert_snapshot!(
        Type::map(Type::string(), Type::bytes()).to_string(),
        @"map<string, uint8[]>"
    );
    insta::assert_snapshot!(
        Type::func(vec![Type::u32(), Type::u8()], Type::u32()).to_string(),
        @"(uint32, uint8) => uint32"
    );
    insta::assert_snapshot!(
        Type::seq(Type::func(vec![], Type::void())).to_string(),
        @"(() => void)[]"
    );
}

#[test]
fn structural_equality() {
    assert_eq!(Type::seq(Type::u8()), Type::bytes());
    assert_ne!(Type::bytes(), Type::words());
    assert_ne!(Type::int(32, true), Type::u32());
    assert_eq!(
        Type::Primitive(Primitive::Int {
            width: 8,
            signed: false
        }),
        Type::u8()
    );
}

#[test]
fn optional_does_not_nest() {
    let once = Type::optional(Type::u32());
    assert_eq!(Type::optional(once.clone()), once);
}

#[test]
fn unknown_holes() {
    let ty = Type::map(Type::string(), Type::seq(Type::Unknown));
    assert!(ty.contains_unknown());

    let filled = ty.fill_unknown(&Type::u8());
    assert!(!filled.contains_unknown());
    assert_eq!(filled, Type::map(Type::string(), Type::bytes()));
}

#[test]
fn smallest_unsigned() {
    assert_eq!(Type::smallest_unsigned(0), Type::u8());
    assert_eq!(Type::smallest_unsigned(255), Type::u8());
    assert_eq!(Type::smallest_unsigned(256), Type::u16());
    assert_eq!(Type::smallest_unsigned(0xDEADBEEF), Type::u32());
    assert_eq!(Type::smallest_unsigned(1 << 40), Type::u64());
}

#[test]
fn accessors() {
    assert_eq!(Type::bytes().element(), Some(&Type::u8()));
    assert_eq!(Type::u8().element(), None);
    assert_eq!(Type::optional(Type::bytes()).unwrap_optional(), &Type::bytes());
    assert_eq!(Type::u32().width(), Some(32));
    assert!(Type::int(8, true).is_signed());
    assert!(Type::f64().is_numeric());
    assert!(!Type::string().is_numeric());
}
