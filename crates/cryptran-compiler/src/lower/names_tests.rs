use cryptran_core::{Case, Type};

use super::dialect::{Dialect, dialect};
use super::names::{NameScopes, accessor_name, sanitize};
use crate::target::Target;

fn cpp() -> &'static dyn Dialect {
    dialect(Target::Cpp)
}

fn pascal() -> &'static dyn Dialect {
    dialect(Target::Pascal)
}

#[test]
fn invalid_characters_become_underscores() {
    assert_eq!(sanitize("$key", None, cpp()), "_key");
    assert_eq!(sanitize("a-b", None, cpp()), "a_b");
}

#[test]
fn leading_digit_is_prefixed() {
    assert_eq!(sanitize("3des", None, cpp()), "n3des");
}

#[test]
fn naming_convention_is_applied() {
    assert_eq!(sanitize("keySize", Some(Case::Snake), cpp()), "key_size");
    assert_eq!(sanitize("keySize", Some(Case::Pascal), pascal()), "KeySize");
}

#[test]
fn constants_keep_their_spelling() {
    assert_eq!(sanitize("SBOX", Some(Case::Snake), cpp()), "SBOX");
    assert_eq!(sanitize("MAX_ROUNDS", Some(Case::Pascal), pascal()), "MAX_ROUNDS");
}

#[test]
fn reserved_words_get_a_suffix() {
    assert_eq!(sanitize("delete", None, cpp()), "delete_");
    assert_eq!(sanitize("class", Some(Case::Snake), cpp()), "class_");
    assert_eq!(sanitize("Begin", None, pascal()), "Begin_");
    assert_eq!(sanitize("result", Some(Case::Pascal), pascal()), "Result_");
}

#[test]
fn sanitize_is_idempotent() {
    let names = ["keySize", "3des", "$x", "delete", "SBOX", "round_keys", "new", "Type"];
    for target in Target::ALL {
        let d = dialect(target);
        for name in names {
            let once = sanitize(name, Some(d.default_case()), d);
            let twice = sanitize(&once, Some(d.default_case()), d);
            assert_eq!(once, twice, "{name} for {}", target.name());
            assert!(!d.is_reserved(&once), "{once} is reserved in {}", target.name());
        }
    }
}

#[test]
fn sanitize_is_idempotent_for_every_short_name() {
    const ALPHABET: [char; 8] = ['a', 'b', 'A', 'B', '1', '_', '$', 'x'];
    let mut names = vec![String::new()];
    let mut frontier = vec![String::new()];
    for _ in 0..5 {
        frontier = frontier
            .iter()
            .flat_map(|prefix| ALPHABET.iter().map(move |c| format!("{prefix}{c}")))
            .collect();
        names.extend(frontier.iter().cloned());
    }

    for target in Target::ALL {
        let d = dialect(target);
        for case in [Case::Snake, Case::Pascal, Case::Camel] {
            for name in &names {
                let once = sanitize(name, Some(case), d);
                let twice = sanitize(&once, Some(case), d);
                assert_eq!(once, twice, "{name:?} as {case:?} for {}", target.name());
            }
        }
    }
}

#[test]
fn accessor_names_follow_the_convention() {
    assert_eq!(accessor_name("get", "keySize", Case::Snake), "get_key_size");
    assert_eq!(accessor_name("set", "keySize", Case::Pascal), "SetKeySize");
}

#[test]
fn distinct_sources_with_one_spelling_are_numbered() {
    let mut names = NameScopes::new(cpp());
    let first = names.declare("key_size", "key_size".to_string(), &Type::u32());
    let second = names.declare("keySize", "key_size".to_string(), &Type::u32());

    assert_eq!(first.name, "key_size");
    assert!(!first.renamed);
    assert_eq!(second.name, "key_size_2");
    assert!(second.renamed);
    assert_eq!(names.lookup("keySize"), Some("key_size_2"));
}

#[test]
fn nested_blocks_shadow_in_cpp() {
    let mut names = NameScopes::new(cpp());
    names.declare("x", "x".to_string(), &Type::u32());
    names.push(false);
    let inner = names.declare("x", "x".to_string(), &Type::string());
    assert_eq!(inner.name, "x");
    assert!(!inner.renamed);
    names.pop();
    assert_eq!(names.lookup("x"), Some("x"));
}

#[test]
fn pascal_locals_share_the_routine_namespace() {
    let mut names = NameScopes::new(pascal());
    names.push(true);
    names.declare("i", "I".to_string(), &Type::u32());
    names.push(false);
    let same = names.declare("i", "I".to_string(), &Type::u32());
    let other = names.declare("j", "i".to_string(), &Type::u32());
    let retyped = names.declare("i", "I".to_string(), &Type::string());

    assert_eq!(same.name, "I");
    assert!(!same.renamed);
    assert_eq!(other.name, "i_2");
    assert_eq!(retyped.name, "I_3");
}

#[test]
fn lookup_ignores_popped_frames() {
    let mut names = NameScopes::new(cpp());
    names.push(true);
    names.declare("tmp", "tmp".to_string(), &Type::u8());
    names.pop();
    assert_eq!(names.lookup("tmp"), None);
}
