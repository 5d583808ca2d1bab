//! Literal spelling per target.

use cryptran_core::{Primitive, Type};

/// Hex digits of a source spelling such as `0xFF`, when it denotes `value`.
fn hex_digits(raw: Option<&str>, value: i128) -> Option<&str> {
    let digits = raw?
        .strip_prefix("0x")
        .or_else(|| raw?.strip_prefix("0X"))?;
    let parsed = i128::from_str_radix(digits, 16).ok()?;
    (parsed == value).then_some(digits)
}

/// `42u`, `0xFFFFFFFFu`, `-1`, `0x0123456789ABCDEFull`.
pub fn cpp_int(value: i128, raw: Option<&str>, ty: &Type) -> String {
    let suffix = match ty {
        Type::Primitive(Primitive::Int { width: 32, signed: false }) => "u",
        Type::Primitive(Primitive::Int { width: 64, signed: false }) => "ull",
        Type::Primitive(Primitive::Int { width: 64, signed: true }) => "ll",
        _ => "",
    };
    if value == i128::from(i64::MIN) {
        return "(-9223372036854775807ll - 1)".to_string();
    }
    let body = match hex_digits(raw, value) {
        Some(digits) => format!("0x{digits}"),
        None => value.unsigned_abs().to_string(),
    };
    let sign = if value < 0 { "-" } else { "" };
    format!("{sign}{body}{suffix}")
}

/// `42`, `$FF`, `-1`.
pub fn pascal_int(value: i128, raw: Option<&str>) -> String {
    match hex_digits(raw, value) {
        Some(digits) => format!("${digits}"),
        None => value.to_string(),
    }
}

/// Shortest round-tripping spelling with a decimal point or exponent.
fn float_text(value: f64) -> String {
    let text = format!("{value:?}");
    if text.contains(['.', 'e', 'E']) {
        text
    } else {
        format!("{text}.0")
    }
}

pub fn cpp_float(value: f64, ty: &Type) -> String {
    let single = ty.width() == Some(32);
    let scalar = if single { "float" } else { "double" };
    if value.is_nan() {
        return format!("std::numeric_limits<{scalar}>::quiet_NaN()");
    }
    if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else { "" };
        return format!("{sign}std::numeric_limits<{scalar}>::infinity()");
    }
    let text = float_text(value);
    if single { format!("{text}f") } else { text }
}

pub fn pascal_float(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "NegInfinity" } else { "Infinity" }.to_string();
    }
    float_text(value)
}

/// Double-quoted C++ literal. Control characters use three-digit octal
/// escapes, which never absorb a following digit.
pub fn cpp_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\{:03o}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Single-quoted Pascal literal; control characters become `#nn` codes
/// between quoted runs.
pub fn pascal_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    let mut quoted = false;
    for c in text.chars() {
        if (c as u32) < 0x20 || c as u32 == 0x7f {
            if quoted {
                out.push('\'');
                quoted = false;
            }
            out.push_str(&format!("#{}", c as u32));
            continue;
        }
        if !quoted {
            out.push('\'');
            quoted = true;
        }
        if c == '\'' {
            out.push_str("''");
        } else {
            out.push(c);
        }
    }
    if quoted {
        out.push('\'');
    }
    if out.is_empty() {
        out.push_str("''");
    }
    out
}
