#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures shared by the cryptran compiler and CLI.
//!
//! - [`Type`]: the closed set of static types the lowering pipeline assigns
//!   to source constructs, with a canonical text form.
//! - [`type_syntax`]: parser for that text form (plus the aliases found in
//!   source annotations).
//! - [`utils`]: identifier case conversion.
//! - [`Colors`]: ANSI palette for CLI output.

pub mod colors;
pub mod type_syntax;
pub mod types;
pub mod utils;

#[cfg(test)]
mod type_syntax_tests;
#[cfg(test)]
mod types_tests;

pub use colors::Colors;
pub use type_syntax::{TypeParseError, parse_type};
pub use types::{Primitive, Type};
pub use utils::Case;
