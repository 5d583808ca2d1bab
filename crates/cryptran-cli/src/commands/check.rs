use std::path::PathBuf;

use cryptran_compiler::Output;

use super::error::CliError;
use super::setup::EmitterOptions;
use super::transpile::report;

pub struct CheckArgs {
    pub options: EmitterOptions,
    pub source: Option<PathBuf>,
    pub strict: bool,
    pub color: bool,
}

pub fn run(args: CheckArgs) {
    let output = match translate(&args.options) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    if !passes(&output, args.strict) {
        let mut stderr = std::io::stderr().lock();
        if let Err(e) = report(&output, args.source.as_deref(), args.color, &mut stderr) {
            eprintln!("error: {}", e);
        }
        std::process::exit(1);
    }

    // Silent on success (like cargo check)
}

fn translate(options: &EmitterOptions) -> Result<Output, CliError> {
    let transpiler = options.transpiler()?;
    let json = options.read_input()?;
    Ok(transpiler.run_json(&json)?)
}

/// Errors always fail; warnings fail under `--strict`.
pub fn passes(output: &Output, strict: bool) -> bool {
    let diagnostics = &output.diagnostics;
    if strict {
        !diagnostics.has_errors() && !diagnostics.has_warnings()
    } else {
        !diagnostics.has_errors()
    }
}
