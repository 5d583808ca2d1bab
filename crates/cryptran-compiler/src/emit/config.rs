//! Emitter configuration.

use std::str::FromStr;

use cryptran_core::Case;
use serde::Deserialize;

use crate::lower::dialect;
use crate::target::Target;
use crate::{Error, Result};

/// Where a block opens: the C++ `{` or the Pascal `begin`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum BraceLayout {
    /// `if (x) {`
    #[default]
    #[serde(rename = "sameLine", alias = "same-line", alias = "same")]
    SameLine,
    /// `if (x)` then `{` (or `begin`) on the next line.
    #[serde(rename = "ownLine", alias = "own-line", alias = "own")]
    OwnLine,
}

impl FromStr for BraceLayout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "same" | "same-line" | "sameLine" => Ok(BraceLayout::SameLine),
            "own" | "own-line" | "ownLine" => Ok(BraceLayout::OwnLine),
            other => Err(Error::InvalidConfig(format!(
                "unknown brace layout `{other}` (expected same-line or own-line)"
            ))),
        }
    }
}

/// Formatting and naming choices for one emitted unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmitterConfig {
    pub(crate) indent_unit: String,
    pub(crate) brace_layout: BraceLayout,
    /// `None` keeps the target's own convention.
    pub(crate) naming: Option<Case>,
    pub(crate) unit_name: String,
    pub(crate) namespace_name: String,
    pub(crate) newline: String,
    /// Inject the runtime stub ahead of the declarations.
    pub(crate) runtime: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self::for_target(Target::Cpp)
    }
}

/// Shape of a JSON configuration file. Every key is optional and overlays
/// the target defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ConfigFile {
    indent_unit: Option<String>,
    brace_layout: Option<BraceLayout>,
    naming_convention: Option<Case>,
    unit_name: Option<String>,
    namespace_name: Option<String>,
    newline: Option<String>,
    emit_runtime: Option<bool>,
}

impl EmitterConfig {
    /// C++: four spaces, same-line braces. Pascal: two spaces, own-line
    /// braces.
    pub fn for_target(target: Target) -> Self {
        let (indent, layout) = match target {
            Target::Cpp => ("    ", BraceLayout::SameLine),
            Target::Pascal => ("  ", BraceLayout::OwnLine),
        };
        Self {
            indent_unit: indent.to_string(),
            brace_layout: layout,
            naming: None,
            unit_name: "generated".to_string(),
            namespace_name: "cryptran".to_string(),
            newline: "\n".to_string(),
            runtime: true,
        }
    }

    /// Overlay the keys present in a JSON config file.
    pub fn merge_json(mut self, text: &str) -> Result<Self> {
        let file: ConfigFile =
            serde_json::from_str(text).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        if let Some(indent) = file.indent_unit {
            self = self.indent_unit(indent)?;
        }
        if let Some(layout) = file.brace_layout {
            self.brace_layout = layout;
        }
        if file.naming_convention.is_some() {
            self.naming = file.naming_convention;
        }
        if let Some(name) = file.unit_name {
            self = self.unit_name(name)?;
        }
        if let Some(name) = file.namespace_name {
            self = self.namespace_name(name)?;
        }
        if let Some(newline) = file.newline {
            self = self.newline(&newline)?;
        }
        if let Some(runtime) = file.emit_runtime {
            self.runtime = runtime;
        }
        Ok(self)
    }

    /// Set the indentation unit; only spaces and tabs are accepted.
    pub fn indent_unit(mut self, value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() || !value.chars().all(|c| c == ' ' || c == '\t') {
            return Err(Error::InvalidConfig(format!(
                "indent unit {value:?} must be spaces or tabs"
            )));
        }
        self.indent_unit = value;
        Ok(self)
    }

    pub fn brace_layout(mut self, value: BraceLayout) -> Self {
        self.brace_layout = value;
        self
    }

    pub fn naming(mut self, value: Option<Case>) -> Self {
        self.naming = value;
        self
    }

    pub fn unit_name(mut self, value: impl Into<String>) -> Result<Self> {
        self.unit_name = identifier("unit name", value.into())?;
        Ok(self)
    }

    pub fn namespace_name(mut self, value: impl Into<String>) -> Result<Self> {
        self.namespace_name = identifier("namespace name", value.into())?;
        Ok(self)
    }

    pub fn runtime(mut self, value: bool) -> Self {
        self.runtime = value;
        self
    }

    /// `lf`, `crlf`, or the sequence itself.
    pub fn newline(mut self, value: &str) -> Result<Self> {
        self.newline = match value {
            "lf" | "\n" => "\n".to_string(),
            "crlf" | "\r\n" => "\r\n".to_string(),
            other => {
                return Err(Error::InvalidConfig(format!(
                    "newline {other:?} must be lf or crlf"
                )));
            }
        };
        Ok(self)
    }
}

/// A name usable verbatim in either target.
fn identifier(what: &str, value: String) -> Result<String> {
    let valid = value.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(Error::InvalidConfig(format!(
            "{what} `{value}` is not an identifier"
        )));
    }
    if let Some(target) = Target::ALL.into_iter().find(|t| dialect(*t).is_reserved(&value)) {
        return Err(Error::InvalidConfig(format!(
            "{what} `{value}` is a reserved word in {target}"
        )));
    }
    Ok(value)
}
