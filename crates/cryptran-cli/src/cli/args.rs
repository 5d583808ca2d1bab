//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` that can be composed into commands,
//! so `transpile` and `check` accept the same input and formatting flags.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// ESTree JSON document (positional, "-" for stdin).
pub fn input_arg() -> Arg {
    Arg::new("input")
        .value_name("INPUT")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("ESTree JSON file (use \"-\" for stdin)")
}

/// Target language (-t/--target).
pub fn target_arg() -> Arg {
    Arg::new("target")
        .short('t')
        .long("target")
        .value_name("TARGET")
        .default_value("cpp")
        .help("Target language (cpp, pascal)")
}

/// Original source text for diagnostic snippets (--source).
pub fn source_arg() -> Arg {
    Arg::new("source")
        .long("source")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Original JavaScript source, for diagnostic snippets")
}

/// JSON emitter configuration file (-c/--config).
pub fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Emitter configuration file (JSON)")
}

/// Indentation unit (--indent).
pub fn indent_arg() -> Arg {
    Arg::new("indent")
        .long("indent")
        .value_name("N|tab")
        .help("Indentation: a number of spaces or \"tab\"")
}

/// Brace layout (--braces).
pub fn braces_arg() -> Arg {
    Arg::new("braces")
        .long("braces")
        .value_name("LAYOUT")
        .value_parser(["same-line", "own-line"])
        .help("Where blocks open")
}

/// Identifier convention (--naming).
pub fn naming_arg() -> Arg {
    Arg::new("naming")
        .long("naming")
        .value_name("CASE")
        .value_parser(["snake", "pascal", "camel"])
        .help("Identifier convention (default: the target's own)")
}

/// Unit name (--unit).
pub fn unit_arg() -> Arg {
    Arg::new("unit")
        .long("unit")
        .value_name("NAME")
        .help("Unit name (default: the input file stem)")
}

/// C++ namespace (--namespace).
pub fn namespace_arg() -> Arg {
    Arg::new("namespace")
        .long("namespace")
        .value_name("NAME")
        .help("Namespace of the emitted C++ declarations")
}

/// Line ending (--newline).
pub fn newline_arg() -> Arg {
    Arg::new("newline")
        .long("newline")
        .value_name("STYLE")
        .value_parser(["lf", "crlf"])
        .help("Line ending of the emitted text")
}

/// Leave out the runtime stub (--no-runtime).
pub fn no_runtime_arg() -> Arg {
    Arg::new("no_runtime")
        .long("no-runtime")
        .action(ArgAction::SetTrue)
        .help("Do not inject the runtime stub")
}

/// Write output to file (-o/--output).
pub fn output_file_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Write output to file")
}

/// Treat warnings as errors (--strict).
pub fn strict_arg() -> Arg {
    Arg::new("strict")
        .long("strict")
        .action(ArgAction::SetTrue)
        .help("Treat warnings as errors")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize diagnostics")
}
