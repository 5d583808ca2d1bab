//! Object Pascal unit emitter (Delphi, FreePascal in Delphi mode).
//!
//! Classes are declared in the interface section and implemented in the
//! implementation section. Locals of every routine are hoisted into its
//! `var` section. Static fields, initialized globals and the source
//! module's top-level statements run from the `initialization` section.

mod decls;
mod exprs;
mod stmts;

use cryptran_core::{Case, Primitive, Type};

use super::config::EmitterConfig;
use super::printer::Printer;
use super::stubs::{PASCAL_IMPLEMENTATION, PASCAL_INTERFACE};
use super::usage::Usage;
use crate::analyze::framework;
use crate::lower::{dialect, sanitize};
use crate::target::{Class, Target, TExpr, Unit};

pub struct PascalEmitter<'a> {
    pub(super) unit: &'a Unit,
    pub(super) config: &'a EmitterConfig,
    pub(super) p: Printer,
    /// Class whose members are being emitted.
    pub(super) class: Option<&'a Class>,
    /// Updates of the enclosing loops written as `while`, innermost last.
    /// A `Continue` runs them first.
    pub(super) loop_updates: Vec<Vec<TExpr>>,
}

impl AsMut<Printer> for PascalEmitter<'_> {
    fn as_mut(&mut self) -> &mut Printer {
        &mut self.p
    }
}

impl<'a> PascalEmitter<'a> {
    pub fn new(unit: &'a Unit, config: &'a EmitterConfig) -> Self {
        Self {
            unit,
            config,
            p: Printer::new(config),
            class: None,
            loop_updates: Vec::new(),
        }
    }

    pub fn emit(mut self) -> String {
        let name = self.unit_name();
        self.p.line(format!("unit {name};"));
        self.p.blank();
        self.p.line(format!("{{ Generated by cryptran from `{name}`. Do not edit. }}"));
        self.p.blank();
        self.p.line("{$IFDEF FPC}");
        self.p.line("  {$MODE DELPHI}");
        self.p.line("{$ENDIF}");
        self.p.line("{$Q-}");
        self.p.line("{$R-}");
        self.p.blank();
        self.p.line("interface");
        self.p.blank();
        self.uses();
        if self.config.runtime {
            self.p.blank();
            self.p.raw(PASCAL_INTERFACE);
        }
        self.p.blank();
        self.interface();
        self.p.blank();
        self.p.line("implementation");
        if self.config.runtime {
            self.p.blank();
            self.p.raw(PASCAL_IMPLEMENTATION);
        }
        self.p.blank();
        self.implementation();
        self.p.blank();
        self.p.line("end.");
        self.p.finish()
    }

    pub(super) fn unit_name(&self) -> String {
        let name = if self.unit.name.is_empty() {
            &self.config.unit_name
        } else {
            &self.unit.name
        };
        sanitize(name, Some(Case::Pascal), dialect(Target::Pascal))
    }

    fn uses(&mut self) {
        let usage = Usage::of(self.unit);
        let runtime = self.config.runtime;
        let mut units = vec!["SysUtils"];
        if runtime || usage.maps {
            units.push("Generics.Collections");
        }
        if runtime {
            units.push("Generics.Defaults");
        }
        if runtime || usage.math {
            units.push("Math");
        }
        self.p.line("uses");
        Printer::indented(self, |e| e.p.line(format!("{};", units.join(", "))));
    }

    /// Pascal spelling of a type. `void` only appears as a procedure's
    /// missing result and never reaches here from a declaration.
    pub(super) fn ty(&self, ty: &Type) -> String {
        match ty {
            Type::Primitive(p) => primitive(*p).to_string(),
            Type::Sequence(element) => format!("TArray<{}>", self.ty(element)),
            Type::Optional(inner) if self.is_ref(inner) => self.ty(inner),
            Type::Optional(inner) => format!("TNullable<{}>", self.ty(inner)),
            Type::Named(name) if name == "Error" => "Exception".to_string(),
            Type::Named(name) => self.type_name(name),
            Type::Map(key, value) => {
                format!("TDictionary<{}, {}>", self.ty(key), self.ty(value))
            }
            Type::Function { params, ret } => {
                let mut args: Vec<String> = params.iter().map(|p| self.ty(p)).collect();
                if ret.is_void() {
                    if args.is_empty() {
                        "TProc".to_string()
                    } else {
                        format!("TProc<{}>", args.join(", "))
                    }
                } else {
                    args.push(self.ty(ret));
                    format!("TFunc<{}>", args.join(", "))
                }
            }
            Type::Unknown => {
                log::warn!("unresolved type reached the Pascal emitter; spelled as Cardinal");
                "Cardinal".to_string()
            }
        }
    }

    pub(super) fn type_name(&self, name: &str) -> String {
        sanitize(name, None, dialect(Target::Pascal))
    }

    /// Class instances: compared with `nil`, tested with `Assigned`.
    pub(super) fn is_ref(&self, ty: &Type) -> bool {
        match ty {
            Type::Named(name) => self.unit.is_ref_type(name),
            Type::Optional(inner) => self.is_ref(inner),
            _ => false,
        }
    }

    pub(super) fn is_enum(&self, ty: &Type) -> bool {
        matches!(ty, Type::Named(name) if framework().is_enum(name))
    }
}

fn primitive(p: Primitive) -> &'static str {
    match p {
        Primitive::Bool => "Boolean",
        Primitive::Int { width: 8, signed: false } => "Byte",
        Primitive::Int { width: 16, signed: false } => "Word",
        Primitive::Int { width: 64, signed: false } => "UInt64",
        Primitive::Int { signed: false, .. } => "Cardinal",
        Primitive::Int { width: 8, signed: true } => "ShortInt",
        Primitive::Int { width: 16, signed: true } => "SmallInt",
        Primitive::Int { width: 64, signed: true } => "Int64",
        Primitive::Int { signed: true, .. } => "Integer",
        Primitive::Float { width: 32 } => "Single",
        Primitive::Float { .. } => "Double",
        Primitive::String => "string",
        Primitive::Void => "",
    }
}
