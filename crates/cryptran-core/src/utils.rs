//! Identifier case conversion.
//!
//! All conversions go through [`split_words`] and are idempotent: converting
//! a converted name again changes nothing.

use std::str::FromStr;

/// Naming convention applied to emitted identifiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
pub enum Case {
    #[default]
    #[serde(rename = "snake_case", alias = "snake")]
    Snake,
    #[serde(rename = "PascalCase", alias = "pascal")]
    Pascal,
    #[serde(rename = "camelCase", alias = "camel")]
    Camel,
}

impl Case {
    pub fn apply(self, s: &str) -> String {
        match self {
            Case::Snake => to_snake_case(s),
            Case::Pascal => to_pascal_case(s),
            Case::Camel => to_camel_case(s),
        }
    }
}

impl FromStr for Case {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "snake" | "snake_case" => Ok(Case::Snake),
            "pascal" | "PascalCase" => Ok(Case::Pascal),
            "camel" | "camelCase" => Ok(Case::Camel),
            other => Err(format!(
                "unknown naming convention `{other}` (expected snake_case, PascalCase or camelCase)"
            )),
        }
    }
}

/// Split an identifier into words.
///
/// Boundaries: `_`, `-`, `.`, space, a lowercase or digit followed by an
/// uppercase letter, and the last capital of an acronym followed by a
/// lowercase letter (`HTTPServer` splits as `HTTP`, `Server`). Digits stay
/// with the preceding word.
pub fn split_words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, '_' | '-' | '.' | ' ') {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_ascii_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower);
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let shouting = !word.chars().any(|c| c.is_ascii_lowercase());
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let rest: String = if shouting {
        chars.as_str().to_ascii_lowercase()
    } else {
        chars.as_str().to_string()
    };
    format!("{}{}", first.to_ascii_uppercase(), rest)
}

/// Convert to PascalCase.
///
/// # Examples
/// ```
/// use cryptran_core::utils::to_pascal_case;
/// assert_eq!(to_pascal_case("key_size"), "KeySize");
/// assert_eq!(to_pascal_case("FOO_BAR"), "FooBar");
/// assert_eq!(to_pascal_case("KeySize"), "KeySize");
/// ```
pub fn to_pascal_case(s: &str) -> String {
    glue(split_words(s).iter().map(|w| capitalize(w)))
}

/// Concatenate capitalized words so that splitting the result finds them
/// again. A lone capital followed by a word that does not continue in
/// lowercase would read back as one acronym, so the two are joined into one
/// word up front.
fn glue(parts: impl Iterator<Item = String>) -> String {
    let mut words: Vec<String> = Vec::new();
    for part in parts {
        if let Some(last) = words.last_mut()
            && is_lone_capital(last)
            && !part.chars().nth(1).is_some_and(|c| c.is_ascii_lowercase())
        {
            last.push_str(&part.to_ascii_lowercase());
            continue;
        }
        words.push(part);
    }
    words.concat()
}

fn is_lone_capital(word: &str) -> bool {
    let mut chars = word.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase()) && chars.next().is_none()
}

/// Convert to snake_case.
///
/// # Examples
/// ```
/// use cryptran_core::utils::to_snake_case;
/// assert_eq!(to_snake_case("keySize"), "key_size");
/// assert_eq!(to_snake_case("HTTPServer"), "http_server");
/// ```
pub fn to_snake_case(s: &str) -> String {
    split_words(s)
        .iter()
        .map(|w| w.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Convert to camelCase.
pub fn to_camel_case(s: &str) -> String {
    let words = split_words(s);
    let Some((first, rest)) = words.split_first() else {
        return String::new();
    };
    let mut out = first.to_ascii_lowercase();
    out.push_str(&glue(rest.iter().map(|w| capitalize(w))));
    out
}
