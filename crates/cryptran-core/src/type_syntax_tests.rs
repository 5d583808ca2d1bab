use crate::type_syntax::{TypeParseError, parse_type};
use crate::types::Type;

fn parse(text: &str) -> Type {
    parse_type(text).unwrap_or_else(|e| panic!("failed to parse {text:?}: {e}"))
}

#[test]
fn canonical_scalars() {
    assert_eq!(parse("bool"), Type::bool());
    assert_eq!(parse("uint8"), Type::u8());
    assert_eq!(parse("int32"), Type::i32());
    assert_eq!(parse("uint64"), Type::u64());
    assert_eq!(parse("float32"), Type::float(32));
    assert_eq!(parse("string"), Type::string());
    assert_eq!(parse("void"), Type::void());
}

#[test]
fn annotation_aliases() {
    assert_eq!(parse("byte"), Type::u8());
    assert_eq!(parse("word"), Type::u32());
    assert_eq!(parse("number"), Type::u32());
    assert_eq!(parse("boolean"), Type::bool());
    assert_eq!(parse("array"), Type::bytes());
    assert_eq!(parse("Uint8Array"), Type::bytes());
    assert_eq!(parse("Uint32Array"), Type::words());
    assert_eq!(parse("undefined"), Type::void());
}

#[test]
fn sequences() {
    assert_eq!(parse("uint8[]"), Type::bytes());
    assert_eq!(parse("Array<uint32>"), Type::words());
    assert_eq!(parse("Array.<number>"), Type::words());
    assert_eq!(parse("byte[][]"), Type::seq(Type::bytes()));
}

#[test]
fn optionals() {
    let expected = Type::optional(Type::u32());
    assert_eq!(parse("uint32?"), expected);
    assert_eq!(parse("?number"), expected);
    assert_eq!(parse("number|null"), expected);
    assert_eq!(parse("null | number"), expected);
    assert_eq!(parse("number|undefined"), expected);
    assert_eq!(parse("!number"), Type::u32());
}

#[test]
fn maps_and_functions() {
    assert_eq!(
        parse("Map<string, byte[]>"),
        Type::map(Type::string(), Type::bytes())
    );
    assert_eq!(
        parse("Object<string, number>"),
        Type::map(Type::string(), Type::u32())
    );
    assert_eq!(
        parse("(uint32, uint8) => uint32"),
        Type::func(vec![Type::u32(), Type::u8()], Type::u32())
    );
    assert_eq!(
        parse("function(byte): boolean"),
        Type::func(vec![Type::u8()], Type::bool())
    );
    assert_eq!(parse("function()"), Type::func(vec![], Type::void()));
}

#[test]
fn named_types() {
    assert_eq!(parse("KeySize"), Type::named("KeySize"));
    assert_eq!(parse("KeySize[]"), Type::seq(Type::named("KeySize")));
    assert_eq!(parse("AlgorithmFramework.LinkItem"), Type::named("AlgorithmFramework.LinkItem"));
}

#[test]
fn union_keeps_first_member() {
    assert_eq!(parse("number|string"), Type::u32());
}

#[test]
fn canonical_rendering_parses_back() {
    let types = [
        Type::bytes(),
        Type::optional(Type::words()),
        Type::seq(Type::optional(Type::u8())),
        Type::map(Type::string(), Type::seq(Type::named("TestCase"))),
        Type::func(vec![Type::bytes(), Type::bool()], Type::optional(Type::u32())),
        Type::seq(Type::func(vec![Type::u8()], Type::void())),
        Type::optional(Type::func(vec![], Type::string())),
        Type::func(vec![], Type::func(vec![Type::u16()], Type::int(64, true))),
    ];
    for ty in types {
        let text = ty.to_string();
        assert_eq!(parse(&text), ty, "round trip of {text}");
    }
}

#[test]
fn rejects_dynamic_types() {
    assert_eq!(
        parse_type("*"),
        Err(TypeParseError::Unsupported("*".to_string()))
    );
    assert_eq!(
        parse_type("Object"),
        Err(TypeParseError::Unsupported("Object".to_string()))
    );
    assert_eq!(
        parse_type("null"),
        Err(TypeParseError::Unsupported("null".to_string()))
    );
    assert!(matches!(
        parse_type("Set<number>"),
        Err(TypeParseError::Unsupported(_))
    ));
}

#[test]
fn reports_syntax_errors() {
    assert_eq!(parse_type(""), Err(TypeParseError::UnexpectedEnd));
    assert_eq!(parse_type("uint8["), Err(TypeParseError::UnexpectedEnd));
    assert_eq!(parse_type("uint8 uint8"), Err(TypeParseError::Trailing(6)));
    assert!(matches!(
        parse_type("uint8 # x"),
        Err(TypeParseError::UnexpectedChar { offset: 6, .. })
    ));
    assert!(matches!(
        parse_type("(uint8, uint16)"),
        Err(TypeParseError::Expected { expected: "`=>`", .. })
    ));
}
