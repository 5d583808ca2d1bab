use std::io::Write;
use std::path::{Path, PathBuf};

use cryptran_compiler::Output;

use super::error::CliError;
use super::setup::{EmitterOptions, read_file};

pub struct TranspileArgs {
    pub options: EmitterOptions,
    pub output: Option<PathBuf>,
    /// JavaScript the ESTree was parsed from, for source-annotated diagnostics.
    pub source: Option<PathBuf>,
    pub strict: bool,
    pub color: bool,
}

pub fn run(args: TranspileArgs) {
    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr().lock();
    match execute(&args, &mut stdout, &mut stderr) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Emit the unit to `-o` or `out`, diagnostics to `err`. Returns whether the
/// run passes: always unless `--strict` and something was reported.
pub fn execute(
    args: &TranspileArgs,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<bool, CliError> {
    let transpiler = args.options.transpiler()?;
    let json = args.options.read_input()?;
    let output = transpiler.run_json(&json)?;

    match &args.output {
        Some(path) => std::fs::write(path, &output.text).map_err(|source| CliError::Write {
            path: path.clone(),
            source,
        })?,
        None => out
            .write_all(output.text.as_bytes())
            .map_err(|source| CliError::Write {
                path: PathBuf::from("<stdout>"),
                source,
            })?,
    }

    report(&output, args.source.as_deref(), args.color, err)?;
    Ok(!args.strict || output.is_clean())
}

/// Render diagnostics, annotated with the JavaScript source when given.
pub fn report(
    output: &Output,
    source: Option<&Path>,
    color: bool,
    err: &mut impl Write,
) -> Result<(), CliError> {
    if output.diagnostics.is_empty() {
        return Ok(());
    }
    let text = source.map(read_file).transpose()?;
    let path = source.map(|p| p.to_string_lossy().into_owned());

    let mut printer = output.diagnostics.printer().colored(color);
    if let Some(text) = &text {
        printer = printer.source(text);
    }
    if let Some(path) = &path {
        printer = printer.path(path);
    }
    write!(err, "{}", printer.render()).map_err(|source| CliError::Write {
        path: PathBuf::from("<stderr>"),
        source,
    })?;

    let diagnostics = &output.diagnostics;
    log::info!(
        "{} error(s), {} warning(s)",
        diagnostics.error_count(),
        diagnostics.warning_count()
    );
    Ok(())
}
