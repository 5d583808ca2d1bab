//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Input, target and emitter formatting flags.
fn with_emitter_args(cmd: Command) -> Command {
    cmd.arg(input_arg())
        .arg(target_arg())
        .arg(config_arg())
        .arg(indent_arg())
        .arg(braces_arg())
        .arg(naming_arg())
        .arg(unit_arg())
        .arg(namespace_arg())
        .arg(newline_arg())
        .arg(no_runtime_arg())
}

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("cryptran")
        .about("Transpile crypto algorithm sources (ESTree JSON) to C++ and Object Pascal")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(transpile_command())
        .subcommand(check_command())
        .subcommand(types_command())
        .subcommand(targets_command())
}

/// Emit a C++ header or Pascal unit.
pub fn transpile_command() -> Command {
    let cmd = Command::new("transpile")
        .about("Translate an ESTree document into target source")
        .after_help(
            r#"EXAMPLES:
  cryptran transpile aes.json                      # C++ header on stdout
  cryptran transpile aes.json -t pascal -o Aes.pas
  cryptran transpile aes.json --no-runtime --braces own-line
  acorn --ecma2020 aes.js | cryptran transpile -   # from stdin"#,
        )
        .arg(output_file_arg())
        .arg(source_arg())
        .arg(strict_arg())
        .arg(color_arg());
    with_emitter_args(cmd)
}

/// Report what could not be translated, without emitting.
pub fn check_command() -> Command {
    let cmd = Command::new("check")
        .about("Report constructs that cannot be translated")
        .after_help(
            r#"EXAMPLES:
  cryptran check aes.json                # errors only
  cryptran check aes.json --strict       # warnings fail too
  cryptran check aes.json --source aes.js"#,
        )
        .arg(source_arg())
        .arg(strict_arg())
        .arg(color_arg());
    with_emitter_args(cmd)
}

/// Print inferred declaration types.
pub fn types_command() -> Command {
    Command::new("types")
        .about("Show inferred types of classes, fields, routines and globals")
        .after_help(
            r#"EXAMPLES:
  cryptran types aes.json
  cryptran types aes.json --color never | less"#,
        )
        .arg(input_arg())
        .arg(color_arg())
}

/// List targets.
pub fn targets_command() -> Command {
    Command::new("targets")
        .about("List supported target languages")
        .arg(color_arg())
}
