//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! - `*Params` structs mirror the command `*Args` but are populated from clap
//! - `from_matches()` extractors pull the fields each command uses
//! - `Into<*Args>` impls bridge dispatch to the command handlers

use std::path::PathBuf;

use clap::ArgMatches;

use super::ColorChoice;
use crate::commands::check::CheckArgs;
use crate::commands::setup::EmitterOptions;
use crate::commands::transpile::TranspileArgs;
use crate::commands::types::TypesArgs;

/// Input and formatting flags shared by `transpile`, `check` and `types`.
#[derive(Debug, PartialEq, Eq)]
pub struct EmitterParams {
    pub input: PathBuf,
    pub target: String,
    pub config: Option<PathBuf>,
    pub indent: Option<String>,
    pub braces: Option<String>,
    pub naming: Option<String>,
    pub unit: Option<String>,
    pub namespace: Option<String>,
    pub newline: Option<String>,
    pub no_runtime: bool,
}

impl EmitterParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            input: m.get_one::<PathBuf>("input").cloned().unwrap_or_default(),
            target: m
                .get_one::<String>("target")
                .cloned()
                .unwrap_or_else(|| "cpp".to_string()),
            config: m.get_one::<PathBuf>("config").cloned(),
            indent: m.get_one::<String>("indent").cloned(),
            braces: m.get_one::<String>("braces").cloned(),
            naming: m.get_one::<String>("naming").cloned(),
            unit: m.get_one::<String>("unit").cloned(),
            namespace: m.get_one::<String>("namespace").cloned(),
            newline: m.get_one::<String>("newline").cloned(),
            no_runtime: m.get_flag("no_runtime"),
        }
    }
}

impl From<EmitterParams> for EmitterOptions {
    fn from(p: EmitterParams) -> Self {
        Self {
            input: p.input,
            target: p.target,
            config: p.config,
            indent: p.indent,
            braces: p.braces,
            naming: p.naming,
            unit: p.unit,
            namespace: p.namespace,
            newline: p.newline,
            runtime: !p.no_runtime,
        }
    }
}

pub struct TranspileParams {
    pub emitter: EmitterParams,
    pub output: Option<PathBuf>,
    pub source: Option<PathBuf>,
    pub strict: bool,
    pub color: ColorChoice,
}

impl TranspileParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            emitter: EmitterParams::from_matches(m),
            output: m.get_one::<PathBuf>("output").cloned(),
            source: m.get_one::<PathBuf>("source").cloned(),
            strict: m.get_flag("strict"),
            color: parse_color(m),
        }
    }
}

impl From<TranspileParams> for TranspileArgs {
    fn from(p: TranspileParams) -> Self {
        Self {
            options: p.emitter.into(),
            output: p.output,
            source: p.source,
            strict: p.strict,
            color: p.color.should_colorize(),
        }
    }
}

pub struct CheckParams {
    pub emitter: EmitterParams,
    pub source: Option<PathBuf>,
    pub strict: bool,
    pub color: ColorChoice,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            emitter: EmitterParams::from_matches(m),
            source: m.get_one::<PathBuf>("source").cloned(),
            strict: m.get_flag("strict"),
            color: parse_color(m),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        Self {
            options: p.emitter.into(),
            source: p.source,
            strict: p.strict,
            color: p.color.should_colorize(),
        }
    }
}

pub struct TypesParams {
    pub input: PathBuf,
    pub color: ColorChoice,
}

impl TypesParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            input: m.get_one::<PathBuf>("input").cloned().unwrap_or_default(),
            color: parse_color(m),
        }
    }
}

impl From<TypesParams> for TypesArgs {
    fn from(p: TypesParams) -> Self {
        Self {
            input: p.input,
            color: p.color.should_colorize(),
        }
    }
}

pub struct TargetsParams {
    pub color: ColorChoice,
}

impl TargetsParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            color: parse_color(m),
        }
    }
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}
