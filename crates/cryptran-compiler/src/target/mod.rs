//! Typed output tree and the set of output languages.
//!
//! The tree is built once by [`crate::lower`] and read by the emitters. Every
//! expression carries its [`cryptran_core::Type`]; [`ast::unresolved`] checks
//! that no `Unknown` survived lowering.

pub mod ast;


use std::fmt;
use std::str::FromStr;

pub use ast::{
    BinOp, Builtin, Callee, Case, Catch, Class, ExprKind, Field, Function, Global, IncDec, Item,
    Lit, Method, MethodKind, Param, Placeholder, Qualifiers, Stmt, TExpr, UnOp, Unit, Visitor,
    unresolved, walk_expr, walk_stmts, walk_unit,
};

use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    Cpp,
    Pascal,
}

impl Target {
    pub const ALL: [Target; 2] = [Target::Cpp, Target::Pascal];

    pub fn name(self) -> &'static str {
        match self {
            Target::Cpp => "cpp",
            Target::Pascal => "pascal",
        }
    }

    /// Conventional file extension of an emitted unit.
    pub fn extension(self) -> &'static str {
        match self {
            Target::Cpp => "hpp",
            Target::Pascal => "pas",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Target::Cpp => "C++17 header (std::vector, std::optional, std::shared_ptr)",
            Target::Pascal => "Object Pascal unit (Delphi, FreePascal in Delphi mode)",
        }
    }

    /// Identifiers differing only in case name the same thing.
    pub fn case_insensitive(self) -> bool {
        matches!(self, Target::Pascal)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpp" | "c++" | "cxx" | "hpp" => Ok(Target::Cpp),
            "pascal" | "pas" | "delphi" | "fpc" => Ok(Target::Pascal),
            _ => Err(Error::UnknownTarget(s.to_string())),
        }
    }
}
