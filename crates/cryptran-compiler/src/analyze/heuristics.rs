//! Name-based type guesses.
//!
//! Consulted only after annotations, the framework catalogue and structural
//! inference have all failed. Rules are checked against the last word of the
//! name first, then against every word, so `keyLength` is a count (last word)
//! while `roundKeyData` is key material (any word).

use cryptran_core::Type;
use cryptran_core::utils::split_words;

use super::framework::framework;

struct Rule {
    words: &'static [&'static str],
    ty: fn() -> Type,
}

/// Checked in order; the first rule with a matching word wins.
const RULES: &[Rule] = &[
    Rule {
        words: &[
            "size", "sizes", "length", "len", "count", "index", "idx", "rounds", "round",
            "offset", "pos", "position", "bits", "width", "num", "total", "step", "shift",
            "amount", "mask", "counter", "year", "level",
        ],
        ty: Type::u32,
    },
    Rule {
        words: &["sbox", "sboxes", "box", "boxes", "perm", "permutation"],
        ty: Type::bytes,
    },
    Rule {
        words: &[
            "table", "tables", "schedule", "keys", "subkeys", "words", "state", "registers",
            "lanes", "constants",
        ],
        ty: Type::words,
    },
    Rule {
        words: &[
            "name", "text", "description", "uri", "url", "message", "msg", "hex", "str",
            "string", "label", "inventor", "category",
        ],
        ty: Type::string,
    },
    Rule {
        words: &[
            "key", "iv", "nonce", "data", "bytes", "block", "buffer", "buf", "input", "output",
            "plaintext", "ciphertext", "digest", "hash", "salt", "tag", "result", "padding",
            "chunk", "expected", "vector", "mac",
        ],
        ty: Type::bytes,
    },
    Rule {
        words: &["byte", "octet"],
        ty: Type::u8,
    },
    Rule {
        words: &["word", "value", "val", "carry", "temp", "tmp", "sum", "seed"],
        ty: Type::u32,
    },
];

/// Single-letter and conventional loop names.
const SCALARS: &[(&str, fn() -> Type)] = &[
    ("i", Type::u32),
    ("j", Type::u32),
    ("k", Type::u32),
    ("n", Type::u32),
    ("m", Type::u32),
    ("r", Type::u32),
    ("t", Type::u32),
    ("b", Type::u8),
];

const BOOL_PREFIXES: &[&str] = &["is", "has", "can", "should", "use", "enable", "enabled", "allow"];

/// Type suggested by an identifier alone.
pub fn by_name(name: &str) -> Option<Type> {
    if let Some((_, ty)) = SCALARS.iter().find(|(n, _)| *n == name) {
        return Some(ty());
    }
    if let Some(class) = framework()
        .entries()
        .find(|e| e.is_class() && e.name.eq_ignore_ascii_case(name))
    {
        return Some(Type::named(class.name.as_str()));
    }

    let words: Vec<String> = split_words(name)
        .iter()
        .map(|w| w.to_ascii_lowercase())
        .collect();
    let first = words.first()?;

    if words.len() > 1 && BOOL_PREFIXES.contains(&first.as_str()) {
        return Some(Type::bool());
    }

    let last = words.last()?;
    if let Some(rule) = RULES.iter().find(|r| r.words.contains(&last.as_str())) {
        return Some((rule.ty)());
    }

    RULES
        .iter()
        .find(|r| words.iter().any(|w| r.words.contains(&w.as_str())))
        .map(|r| (r.ty)())
}
