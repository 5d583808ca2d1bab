//! Text listing of a [`ProgramIndex`], one declaration per line.

use std::fmt::Write as _;

use cryptran_core::{Colors, Type};

use super::index::{MemberKind, MethodInfo, ProgramIndex};
use super::infer::Origin;

pub fn render_index(index: &ProgramIndex, colors: Colors) -> String {
    let mut out = String::new();

    for class in index.classes() {
        let _ = write!(out, "class {}", colors.name(&class.name));
        if let Some(base) = &class.base {
            let _ = write!(out, " extends {}", colors.ty(base));
        }
        out.push('\n');

        for (name, field) in &class.fields {
            let stat = if field.is_static { "static " } else { "" };
            let _ = writeln!(
                out,
                "  {stat}{}: {}{}",
                colors.name(name),
                colors.ty(&field.ty.to_string()),
                origin(field.origin, colors)
            );
        }
        for (name, method) in &class.methods {
            let _ = writeln!(out, "  {}", signature(name, method, colors));
        }
        for (name, getter) in &class.getters {
            let _ = writeln!(
                out,
                "  get {}: {}{}",
                colors.name(name),
                colors.ty(&getter.sig.ret.to_string()),
                origin(getter.ret_origin, colors)
            );
        }
        for (name, setter) in &class.setters {
            let _ = writeln!(out, "  set {}({})", colors.name(name), params(setter, colors));
        }
    }

    for (name, function) in index.functions() {
        let _ = writeln!(out, "function {}", signature(name, function, colors));
    }

    for (name, ty) in index.globals() {
        let _ = writeln!(out, "let {}: {}", colors.name(name), colors.ty(&ty.to_string()));
    }

    out
}

fn signature(name: &str, method: &MethodInfo, colors: Colors) -> String {
    let stat = if method.is_static { "static " } else { "" };
    let params = params(method, colors);
    if method.kind == MemberKind::Constructor {
        return format!("constructor({params})");
    }
    format!(
        "{stat}{}({params}): {}{}",
        colors.name(name),
        colors.ty(&method.sig.ret.to_string()),
        origin(method.ret_origin, colors)
    )
}

fn params(method: &MethodInfo, colors: Colors) -> String {
    method
        .sig
        .params
        .iter()
        .map(|(name, ty): &(String, Type)| format!("{name}: {}", colors.ty(&ty.to_string())))
        .collect::<Vec<_>>()
        .join(", ")
}

fn origin(origin: Origin, colors: Colors) -> String {
    colors.note(&format!("  # {origin}"))
}
