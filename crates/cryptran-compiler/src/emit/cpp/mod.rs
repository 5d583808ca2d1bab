//! C++17 header emitter.
//!
//! Class-typed values are `std::shared_ptr`s, sequences `std::vector`s,
//! optional values `std::optional`. Class bodies declare members; method
//! bodies follow out of line as `inline` definitions so any class may
//! call any other.

mod decls;
mod exprs;
mod stmts;

use cryptran_core::{Case, Primitive, Type};

use super::config::EmitterConfig;
use super::printer::Printer;
use super::stubs::CPP_RUNTIME;
use super::usage::Usage;
use crate::analyze::framework;
use crate::lower::{dialect, sanitize};
use crate::target::{Class, Target, Unit};

pub struct CppEmitter<'a> {
    pub(super) unit: &'a Unit,
    pub(super) config: &'a EmitterConfig,
    pub(super) p: Printer,
    /// Class whose members are being emitted.
    pub(super) class: Option<&'a Class>,
}

impl AsMut<Printer> for CppEmitter<'_> {
    fn as_mut(&mut self) -> &mut Printer {
        &mut self.p
    }
}

impl<'a> CppEmitter<'a> {
    pub fn new(unit: &'a Unit, config: &'a EmitterConfig) -> Self {
        Self {
            unit,
            config,
            p: Printer::new(config),
            class: None,
        }
    }

    pub fn emit(mut self) -> String {
        self.preamble();
        let namespace = self.namespace();
        self.p.blank();
        self.p.line(format!("namespace {namespace} {{"));
        self.p.blank();
        self.declarations();
        self.p.blank();
        self.p.line(format!("}}  // namespace {namespace}"));
        self.p.finish()
    }

    fn namespace(&self) -> String {
        if self.unit.namespace.is_empty() {
            self.config.namespace_name.clone()
        } else {
            self.unit.namespace.clone()
        }
    }

    pub(super) fn unit_name(&self) -> String {
        let name = if self.unit.name.is_empty() {
            &self.config.unit_name
        } else {
            &self.unit.name
        };
        sanitize(name, Some(Case::Snake), dialect(Target::Cpp))
    }

    fn preamble(&mut self) {
        let usage = Usage::of(self.unit);
        self.p.line(format!(
            "// Generated by cryptran from `{}`. Do not edit.",
            self.unit_name()
        ));
        self.p.line("#pragma once");
        self.p.blank();

        let classes = self.unit.classes().next().is_some();
        let mut includes = vec!["cstdint"];
        let wanted = [
            (usage.algorithms, "algorithm"),
            (usage.math, "cmath"),
            (usage.functions, "functional"),
            (usage.math, "limits"),
            (usage.maps, "map"),
            (usage.references || classes, "memory"),
            (usage.optionals, "optional"),
            (usage.exceptions, "stdexcept"),
            (usage.strings, "string"),
            (usage.sequences, "vector"),
        ];
        includes.extend(wanted.iter().filter(|(used, _)| *used).map(|(_, h)| *h));
        for header in includes {
            self.p.line(format!("#include <{header}>"));
        }

        if self.config.runtime {
            self.p.blank();
            self.p.raw(CPP_RUNTIME);
        }
    }

    /// C++ spelling of a type.
    pub(super) fn ty(&self, ty: &Type) -> String {
        match ty {
            Type::Primitive(p) => primitive(*p).to_string(),
            Type::Sequence(element) => format!("std::vector<{}>", self.ty(element)),
            Type::Optional(inner) if self.is_ref(inner) => self.ty(inner),
            Type::Optional(inner) => format!("std::optional<{}>", self.ty(inner)),
            Type::Named(name) if name == "Error" => "std::runtime_error".to_string(),
            Type::Named(name) if self.unit.is_ref_type(name) => {
                format!("std::shared_ptr<{}>", self.type_name(name))
            }
            Type::Named(name) => self.type_name(name),
            Type::Map(key, value) => format!("std::map<{}, {}>", self.ty(key), self.ty(value)),
            Type::Function { params, ret } => {
                let params: Vec<String> = params.iter().map(|p| self.ty(p)).collect();
                format!("std::function<{}({})>", self.ty(ret), params.join(", "))
            }
            Type::Unknown => {
                log::warn!("unresolved type reached the C++ emitter; spelled as uint32_t");
                "uint32_t".to_string()
            }
        }
    }

    pub(super) fn type_name(&self, name: &str) -> String {
        sanitize(name, None, dialect(Target::Cpp))
    }

    /// Values of this type are pointers: accessed with `->`, absent as
    /// `nullptr`.
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
        Primitive::Bool => "bool",
        Primitive::Int { width: 8, signed: false } => "uint8_t",
        Primitive::Int { width: 16, signed: false } => "uint16_t",
        Primitive::Int { width: 64, signed: false } => "uint64_t",
        Primitive::Int { signed: false, .. } => "uint32_t",
        Primitive::Int { width: 8, signed: true } => "int8_t",
        Primitive::Int { width: 16, signed: true } => "int16_t",
        Primitive::Int { width: 64, signed: true } => "int64_t",
        Primitive::Int { signed: true, .. } => "int32_t",
        Primitive::Float { width: 32 } => "float",
        Primitive::Float { .. } => "double",
        Primitive::String => "std::string",
        Primitive::Void => "void",
    }
}
