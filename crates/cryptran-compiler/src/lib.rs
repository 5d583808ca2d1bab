//! cryptran: translate ESTree documents of the algorithm corpus into C++ and
//! Object Pascal.
//!
//! # Example
//!
//! ```
//! use cryptran_compiler::{Target, Transpiler};
//!
//! let json = r#"{"type":"Program","body":[]}"#;
//! let output = Transpiler::new(Target::Cpp).run_json(json).expect("valid ESTree");
//! assert!(output.diagnostics.is_empty());
//! assert!(output.text.contains("namespace cryptran"));
//! ```
//!
//! The pipeline is [`source`] (ESTree and doc annotations) → [`analyze`]
//! (declaration index and type inference) → [`lower`] (rewrite into the
//! typed [`target`] tree) → [`emit`] (C++ or Pascal text). A run always
//! produces text; whatever could not be translated is reported in the
//! [`Diagnostics`] that accompany it.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod analyze;
pub mod diagnostics;
pub mod emit;
pub mod lower;
pub mod pipeline;
pub mod source;
pub mod target;

#[cfg(test)]
mod pipeline_tests;
#[cfg(test)]
pub mod test_utils;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, DiagnosticsPrinter, Severity};
pub use emit::{BraceLayout, EmitterConfig};
pub use pipeline::{Output, Transpiler};
pub use source::{Program, Span};
pub use target::Target;

/// Errors that stop a run before any text is produced.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input is not a JSON ESTree document.
    #[error("invalid ESTree input: {0}")]
    InvalidInput(serde_json::Error),

    /// The emitter configuration does not parse.
    #[error("invalid emitter configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown target `{0}` (expected cpp or pascal)")]
    UnknownTarget(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
