//! Inferred signatures of every class, routine and global, with where each
//! type came from.

use std::path::PathBuf;

use cryptran_compiler::Program;
use cryptran_compiler::analyze::{ProgramIndex, render_index};
use cryptran_core::Colors;

use super::error::CliError;
use super::setup::read_input;

pub struct TypesArgs {
    pub input: PathBuf,
    pub color: bool,
}

pub fn run(args: TypesArgs) {
    match execute(&args) {
        Ok(text) => print!("{}", text),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

pub fn execute(args: &TypesArgs) -> Result<String, CliError> {
    let json = read_input(&args.input)?;
    let program = Program::from_json(&json)?;
    let index = ProgramIndex::build(&program);
    Ok(render_index(&index, Colors::new(args.color)))
}
