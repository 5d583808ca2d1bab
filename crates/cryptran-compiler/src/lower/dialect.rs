//! Per-target facts the lowering needs before any text exists.

use cryptran_core::Case;

use crate::target::Target;

pub trait Dialect: Sync {
    fn target(&self) -> Target;

    /// Words that may not name a declaration.
    fn reserved(&self) -> &'static [&'static str];

    /// Naming convention when the configuration does not set one.
    fn default_case(&self) -> Case;

    /// Every local of a routine shares one namespace (a hoisted `var`
    /// section) instead of nesting per block.
    fn flat_locals(&self) -> bool {
        false
    }

    /// Assignments and increments exist only as statements.
    fn assignment_is_statement(&self) -> bool {
        false
    }

    /// `break` inside a case branch leaves the enclosing loop rather than
    /// the case statement.
    fn case_break_leaves_loop(&self) -> bool {
        false
    }

    fn case_insensitive(&self) -> bool {
        self.target().case_insensitive()
    }

    fn is_reserved(&self, name: &str) -> bool {
        if self.case_insensitive() {
            self.reserved().iter().any(|w| w.eq_ignore_ascii_case(name))
        } else {
            self.reserved().contains(&name)
        }
    }
}

pub fn dialect(target: Target) -> &'static dyn Dialect {
    match target {
        Target::Cpp => &CppDialect,
        Target::Pascal => &PascalDialect,
    }
}

pub struct CppDialect;

pub struct PascalDialect;

impl Dialect for CppDialect {
    fn target(&self) -> Target {
        Target::Cpp
    }

    fn reserved(&self) -> &'static [&'static str] {
        CPP_RESERVED
    }

    fn default_case(&self) -> Case {
        Case::Snake
    }
}

impl Dialect for PascalDialect {
    fn target(&self) -> Target {
        Target::Pascal
    }

    fn reserved(&self) -> &'static [&'static str] {
        PASCAL_RESERVED
    }

    fn default_case(&self) -> Case {
        Case::Pascal
    }

    fn flat_locals(&self) -> bool {
        true
    }

    fn assignment_is_statement(&self) -> bool {
        true
    }

    fn case_break_leaves_loop(&self) -> bool {
        true
    }
}

const CPP_RESERVED: &[&str] = &[
    "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "bool", "break",
    "case", "catch", "char", "char8_t", "char16_t", "char32_t", "class", "compl", "concept",
    "const", "consteval", "constexpr", "constinit", "const_cast", "continue", "co_await",
    "co_return", "co_yield", "decltype", "default", "delete", "do", "double", "dynamic_cast",
    "else", "enum", "explicit", "export", "extern", "false", "float", "for", "friend", "goto",
    "if", "inline", "int", "long", "mutable", "namespace", "new", "noexcept", "not", "not_eq",
    "nullptr", "operator", "or", "or_eq", "private", "protected", "public", "register",
    "reinterpret_cast", "requires", "return", "short", "signed", "sizeof", "static",
    "static_assert", "static_cast", "struct", "switch", "template", "this", "thread_local",
    "throw", "true", "try", "typedef", "typeid", "typename", "union", "unsigned", "using",
    "virtual", "void", "volatile", "wchar_t", "while", "xor", "xor_eq",
    // Names the emitted header and its runtime stub rely on.
    "std", "rt", "NULL", "main", "errno", "assert",
];

const PASCAL_RESERVED: &[&str] = &[
    "and", "array", "as", "asm", "begin", "case", "class", "const", "constructor", "destructor",
    "div", "do", "downto", "else", "end", "except", "exports", "file", "finalization", "finally",
    "for", "function", "goto", "if", "implementation", "in", "inherited", "initialization",
    "inline", "interface", "is", "label", "library", "mod", "nil", "not", "object", "of", "on",
    "operator", "or", "out", "packed", "procedure", "program", "property", "raise", "record",
    "repeat", "resourcestring", "set", "shl", "shr", "string", "then", "threadvar", "to", "try",
    "type", "unit", "until", "uses", "var", "while", "with", "xor",
    // System routines and implicit names a local would shadow.
    "result", "self", "exit", "break", "continue", "true", "false", "length", "high", "low",
    "ord", "chr", "inc", "dec", "copy", "delete", "insert", "setlength", "sizeof", "exception",
    // Names the emitted unit and its runtime stub rely on.
    "rt", "tnullable", "opcodes",
];
