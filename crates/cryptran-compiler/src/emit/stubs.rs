//! Runtime stubs injected verbatim into emitted units.
//!
//! They declare the algorithm framework (base classes, records, enums),
//! `OpCodes`, and the collection and string helpers the emitters call.

/// C++17 helpers in namespace `rt` plus the framework declarations.
pub const CPP_RUNTIME: &str = include_str!("stubs/runtime.hpp");

/// Pascal `type` section placed in the interface of every unit.
pub const PASCAL_INTERFACE: &str = include_str!("stubs/runtime_interface.pas");

/// Bodies of the routines [`PASCAL_INTERFACE`] declares.
pub const PASCAL_IMPLEMENTATION: &str = include_str!("stubs/runtime_implementation.pas");
