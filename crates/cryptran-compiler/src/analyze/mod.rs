//! Static analysis of the input program.
//!
//! - [`module`]: flattens module-loader wrappers into the effective top level.
//! - [`framework`]: the algorithm framework catalogue.
//! - [`index`]: declaration pre-pass over classes, functions and globals.
//! - [`infer`]: expression types and the declaration resolution chain.
//! - [`heuristics`]: name-based fallbacks.
//! - [`scope`]: nested name bindings.
//! - [`report`]: text listing of an index.

pub mod framework;
pub mod heuristics;
pub mod index;
pub mod infer;
pub mod module;
pub mod report;
pub mod scope;

#[cfg(test)]
mod framework_tests;
#[cfg(test)]
mod infer_tests;
#[cfg(test)]
mod scope_tests;

pub use framework::{EntryKind, Framework, FrameworkEntry, MethodSig, framework};
pub use index::{ClassInfo, FieldInfo, MemberKind, MethodInfo, ProgramIndex};
pub use infer::{InferCtx, Inferred, Origin};
pub use report::render_index;
pub use scope::ScopeStack;
