//! Pipeline facade: ESTree in, target text and diagnostics out.
//!
//! A run owns its program index, scopes and diagnostics; only the framework
//! catalogue is shared between runs.

use cryptran_core::Case;

use crate::Result;
use crate::analyze::ProgramIndex;
use crate::diagnostics::Diagnostics;
use crate::emit::{EmitterConfig, emit};
use crate::lower::{Lowered, lower};
use crate::source::Program;
use crate::target::{Target, unresolved};

/// Text of one emitted unit plus everything the run could not translate.
#[derive(Debug)]
pub struct Output {
    pub text: String,
    pub diagnostics: Diagnostics,
}

impl Output {
    /// No diagnostics at all: the only guarantee that the text is a
    /// faithful translation.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Configured translation to one target.
#[derive(Clone, Debug)]
pub struct Transpiler {
    target: Target,
    config: EmitterConfig,
}

impl Transpiler {
    /// Target defaults for formatting and naming.
    pub fn new(target: Target) -> Self {
        Self {
            target,
            config: EmitterConfig::for_target(target),
        }
    }

    pub fn config(mut self, config: EmitterConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the target's identifier convention.
    pub fn naming(mut self, naming: Case) -> Self {
        self.config = self.config.naming(Some(naming));
        self
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn emitter_config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Parse `json` as an ESTree `Program` and translate it. Only input
    /// that is not an ESTree document fails.
    pub fn run_json(&self, json: &str) -> Result<Output> {
        let program = Program::from_json(json)?;
        Ok(self.run(&program))
    }

    pub fn run(&self, program: &Program) -> Output {
        let Lowered { unit, diagnostics } = self.lower(program);
        let text = emit(&unit, &self.config, self.target);
        Output { text, diagnostics }
    }

    /// Index, infer and lower without emitting.
    pub fn lower(&self, program: &Program) -> Lowered {
        log::debug!("lowering {} top-level statements for {}", program.body.len(), self.target);
        let index = ProgramIndex::build(program);
        let lowered = lower(program, &index, self.target, self.config.naming);
        for path in unresolved(&lowered.unit) {
            log::warn!("type left unresolved at {path}");
        }
        lowered
    }
}
