//! Lowering: source tree to the typed target tree.
//!
//! One pass over the effective top level, after the declaration index is
//! built. Declarations and scopes are handled pre-order, expression children
//! post-order. Every expression leaves with a concrete type; a construct
//! without a rule becomes a placeholder plus an error diagnostic, and the
//! pass continues.
//!
//! - [`lowerer`]: pass state, diagnostics helpers.
//! - [`decls`]: classes, functions, globals and the unit's init routine.
//! - [`stmts`]: statements, destructuring, switch grouping.
//! - [`exprs`]: operators, members, literals, closures.
//! - [`idioms`]: calls; collection, string, math and bit-primitive idioms.
//! - [`coerce`]: conversions to an expected type, truthiness.
//! - [`names`] and [`dialect`]: identifier spelling per target.

mod coerce;
mod decls;
mod dialect;
mod exprs;
mod idioms;
mod lowerer;
mod names;
mod stmts;

#[cfg(test)]
mod coerce_tests;
#[cfg(test)]
mod lower_tests;
#[cfg(test)]
mod names_tests;

pub use dialect::{Dialect, dialect};
pub use lowerer::Lowerer;
pub use names::{Binding, NameScopes, accessor_name, sanitize};

use cryptran_core::Case;

use crate::Diagnostics;
use crate::analyze::ProgramIndex;
use crate::source::Program;
use crate::target::{Target, Unit};

/// Result of [`lower`].
#[derive(Debug)]
pub struct Lowered {
    pub unit: Unit,
    pub diagnostics: Diagnostics,
}

/// Lower `program` for `target`. `naming` overrides the target's default
/// identifier convention.
pub fn lower(program: &Program, index: &ProgramIndex, target: Target, naming: Option<Case>) -> Lowered {
    let mut lowerer = Lowerer::new(index, dialect(target), naming);
    let unit = lowerer.lower_program(program);
    Lowered {
        unit,
        diagnostics: lowerer.finish(),
    }
}
