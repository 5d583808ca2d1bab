//! Shared setup for the commands that translate: input loading and emitter
//! configuration from flags.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use cryptran_compiler::{BraceLayout, EmitterConfig, Target, Transpiler};
use cryptran_core::Case;

use super::error::CliError;

/// Input path, target and formatting flags as given on the command line.
#[derive(Clone, Debug, Default)]
pub struct EmitterOptions {
    pub input: PathBuf,
    pub target: String,
    pub config: Option<PathBuf>,
    pub indent: Option<String>,
    pub braces: Option<String>,
    pub naming: Option<String>,
    pub unit: Option<String>,
    pub namespace: Option<String>,
    pub newline: Option<String>,
    pub runtime: bool,
}

impl EmitterOptions {
    pub fn target(&self) -> Result<Target, CliError> {
        Ok(self.target.parse::<Target>()?)
    }

    /// Target defaults, then the input's file name as unit name, then the
    /// config file, then individual flags.
    pub fn transpiler(&self) -> Result<Transpiler, CliError> {
        let target = self.target()?;
        let mut config = EmitterConfig::for_target(target);

        if let Some(stem) = unit_from_path(&self.input) {
            config = match config.clone().unit_name(stem) {
                Ok(named) => named,
                Err(_) => config,
            };
        }

        if let Some(path) = &self.config {
            let text = read_file(path)?;
            config = config.merge_json(&text)?;
        }

        if let Some(indent) = &self.indent {
            config = config.indent_unit(indent_unit(indent)?)?;
        }
        if let Some(braces) = &self.braces {
            config = config.brace_layout(BraceLayout::from_str(braces)?);
        }
        if let Some(naming) = &self.naming {
            let case = Case::from_str(naming).map_err(CliError::InvalidFlag)?;
            config = config.naming(Some(case));
        }
        if let Some(unit) = &self.unit {
            config = config.unit_name(unit.as_str())?;
        }
        if let Some(namespace) = &self.namespace {
            config = config.namespace_name(namespace.as_str())?;
        }
        if let Some(newline) = &self.newline {
            config = config.newline(newline)?;
        }
        if !self.runtime {
            config = config.runtime(false);
        }

        log::debug!("emitter configuration for {target}: {config:?}");
        Ok(Transpiler::new(target).config(config))
    }

    pub fn read_input(&self) -> Result<String, CliError> {
        read_input(&self.input)
    }
}

/// `-` reads standard input.
pub fn read_input(path: &Path) -> Result<String, CliError> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|source| CliError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        return Ok(text);
    }
    read_file(path)
}

pub fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// `tab` or a count of spaces.
fn indent_unit(value: &str) -> Result<String, CliError> {
    if value == "tab" {
        return Ok("\t".to_string());
    }
    match value.parse::<usize>() {
        Ok(n) if (1..=16).contains(&n) => Ok(" ".repeat(n)),
        _ => Err(CliError::InvalidFlag(format!(
            "--indent expects a number of spaces (1-16) or `tab`, got `{value}`"
        ))),
    }
}

/// `aes-128.json` names the unit `aes_128`.
fn unit_from_path(path: &Path) -> Option<String> {
    if path.as_os_str() == "-" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    Some(stem.replace(['-', '.'], "_"))
}
