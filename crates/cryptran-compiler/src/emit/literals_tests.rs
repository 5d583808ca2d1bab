use cryptran_core::Type;

use super::literals::{cpp_float, cpp_int, cpp_string, pascal_float, pascal_int, pascal_string};

#[test]
fn cpp_integer_suffixes() {
    assert_eq!(cpp_int(42, None, &Type::u32()), "42u");
    assert_eq!(cpp_int(42, None, &Type::u8()), "42");
    assert_eq!(cpp_int(-1, None, &Type::i32()), "-1");
    assert_eq!(cpp_int(7, None, &Type::u64()), "7ull");
    assert_eq!(cpp_int(-7, None, &Type::int(64, true)), "-7ll");
}

#[test]
fn hex_spelling_is_kept_when_it_matches() {
    assert_eq!(cpp_int(255, Some("0xFF"), &Type::u32()), "0xFFu");
    assert_eq!(cpp_int(255, Some("0xfe"), &Type::u32()), "255u");
    assert_eq!(pascal_int(255, Some("0xff")), "$ff");
    assert_eq!(pascal_int(255, Some("255")), "255");
    assert_eq!(pascal_int(-3, None), "-3");
}

#[test]
fn most_negative_i64_is_an_expression() {
    let text = cpp_int(i128::from(i64::MIN), None, &Type::int(64, true));
    assert_eq!(text, "(-9223372036854775807ll - 1)");
}

#[test]
fn floats_always_carry_a_point() {
    assert_eq!(cpp_float(1.0, &Type::f64()), "1.0");
    assert_eq!(cpp_float(0.5, &Type::float(32)), "0.5f");
    assert_eq!(cpp_float(f64::INFINITY, &Type::f64()), "std::numeric_limits<double>::infinity()");
    assert_eq!(pascal_float(2.0), "2.0");
    assert_eq!(pascal_float(f64::NEG_INFINITY), "NegInfinity");
    assert_eq!(pascal_float(f64::NAN), "NaN");
}

#[test]
fn cpp_string_escapes() {
    assert_eq!(cpp_string("a\"b\\c"), r#""a\"b\\c""#);
    assert_eq!(cpp_string("line\n"), r#""line\n""#);
    assert_eq!(cpp_string("\u{1}9"), r#""\0019""#);
}

#[test]
fn pascal_string_escapes() {
    assert_eq!(pascal_string(""), "''");
    assert_eq!(pascal_string("it's"), "'it''s'");
    assert_eq!(pascal_string("a\nb"), "'a'#10'b'");
    assert_eq!(pascal_string("\t"), "#9");
}

/// Value of an emitted integer literal: optional sign, `0x` or `$` hex or
/// decimal digits, C++ suffix.
fn read_int(text: &str) -> i128 {
    let body = text.trim_end_matches(|c| c == 'u' || c == 'l');
    let (negative, body) = match body.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, body),
    };
    let magnitude = match body.strip_prefix("0x").or_else(|| body.strip_prefix('$')) {
        Some(digits) => i128::from_str_radix(digits, 16).unwrap(),
        None => body.parse::<i128>().unwrap(),
    };
    if negative { -magnitude } else { magnitude }
}

#[test]
fn integer_literals_read_back_as_their_value() {
    let cases = [
        (0, Type::u32()),
        (255, Type::u8()),
        (65_535, Type::u16()),
        (i128::from(u32::MAX), Type::u32()),
        (i128::from(i32::MIN), Type::i32()),
        (i128::from(u64::MAX), Type::u64()),
        (i128::from(i64::MAX), Type::int(64, true)),
        (-5, Type::int(64, true)),
    ];
    for (value, ty) in cases {
        let hex = (value >= 0).then(|| format!("0x{value:X}"));
        for raw in [None, hex.as_deref()] {
            let cpp = cpp_int(value, raw, &ty);
            assert_eq!(read_int(&cpp), value, "{cpp} for {ty}");
            let pascal = pascal_int(value, raw);
            assert_eq!(read_int(&pascal), value, "{pascal}");
        }
    }
}

#[test]
fn float_literals_read_back_as_their_value() {
    for value in [0.0, 1.0, -0.25, 1e-7, 6.02e23, f64::MAX, f64::MIN_POSITIVE] {
        let cpp = cpp_float(value, &Type::f64());
        assert_eq!(cpp.parse::<f64>().unwrap(), value, "{cpp}");
        let pascal = pascal_float(value);
        assert_eq!(pascal.parse::<f64>().unwrap(), value, "{pascal}");
    }
}
