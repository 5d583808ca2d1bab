//! Emitters: typed target tree to source text.
//!
//! Each emitter is a pure function of the tree and an [`EmitterConfig`].
//! Output is assembled in a fixed order: includes or `uses` computed from
//! the types the unit actually uses, the runtime stub, forward
//! declarations, classes (bases before derived), then routine bodies.
//! Placeholders surface as comments and are logged.

mod config;
mod literals;
mod printer;
mod stubs;
mod usage;

pub mod cpp;
pub mod pascal;

#[cfg(test)]
mod config_tests;
#[cfg(test)]
mod cpp_tests;
#[cfg(test)]
mod literals_tests;
#[cfg(test)]
mod printer_tests;

pub use config::{BraceLayout, EmitterConfig};
pub use printer::Printer;
pub use usage::Usage;

use indexmap::IndexSet;

use crate::target::{Class, Placeholder, Target, Unit};

/// Source text of `unit` for `target`.
pub fn emit(unit: &Unit, config: &EmitterConfig, target: Target) -> String {
    log::debug!("emitting {} items as {target}", unit.items.len());
    match target {
        Target::Cpp => cpp::CppEmitter::new(unit, config).emit(),
        Target::Pascal => pascal::PascalEmitter::new(unit, config).emit(),
    }
}

/// Local classes with every base ahead of its subclasses; otherwise in
/// source order.
pub(crate) fn classes_base_first(unit: &Unit) -> Vec<&Class> {
    let classes: Vec<&Class> = unit.classes().collect();
    let mut placed: IndexSet<&str> = IndexSet::new();
    let mut ordered = Vec::with_capacity(classes.len());

    fn place<'a>(
        class: &'a Class,
        classes: &[&'a Class],
        placed: &mut IndexSet<&'a str>,
        ordered: &mut Vec<&'a Class>,
    ) {
        if !placed.insert(class.name.as_str()) {
            return;
        }
        if let Some(base) = class.base.as_deref()
            && let Some(parent) = classes.iter().find(|c| c.name == base)
        {
            place(parent, classes, placed, ordered);
        }
        ordered.push(class);
    }

    for class in &classes {
        place(class, &classes, &mut placed, &mut ordered);
    }
    ordered
}

/// Comment text of a placeholder, logged once per emission.
pub(crate) fn placeholder_note(placeholder: &Placeholder) -> String {
    log::error!(
        "emitting placeholder for {}: {}",
        placeholder.kind,
        placeholder.reason
    );
    format!("cryptran: unhandled {}: {}", placeholder.kind, placeholder.reason)
}
