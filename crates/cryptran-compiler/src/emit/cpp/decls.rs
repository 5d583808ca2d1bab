//! Classes, routines, globals and the unit's load-time routine.

use super::CppEmitter;
use crate::emit::classes_base_first;
use crate::emit::placeholder_note;
use crate::emit::printer::Printer;
use crate::target::{Class, Field, Function, Global, Item, Method, MethodKind, Param};

impl<'a> CppEmitter<'a> {
    pub(super) fn declarations(&mut self) {
        let unit = self.unit;
        let classes = classes_base_first(unit);
        let functions: Vec<&Function> = unit
            .items
            .iter()
            .filter_map(|item| match item {
                Item::Function(f) => Some(f),
                _ => None,
            })
            .collect();

        for &class in &classes {
            self.p.line(format!("class {};", class.name));
        }
        self.p.blank();

        for &class in &classes {
            self.class_decl(class);
            self.p.blank();
        }

        for &function in &functions {
            let params = self.params(&function.params, true);
            let ret = self.ty(&function.ret);
            self.p.line(format!("inline {ret} {}({params});", function.name));
        }
        self.p.blank();

        for item in &unit.items {
            match item {
                Item::Global(global) => self.global(global),
                Item::Placeholder(placeholder) => {
                    let note = self.comment(&placeholder_note(placeholder));
                    self.p.line(note);
                }
                Item::Class(_) | Item::Function(_) => {}
            }
        }
        self.p.blank();

        for &class in &classes {
            self.class = Some(class);
            for method in &class.methods {
                self.method_def(class, method);
                self.p.blank();
            }
            self.class = None;
        }

        for function in functions {
            self.function_def(function);
            self.p.blank();
        }

        if !unit.init.is_empty() {
            self.init_routine();
        }
    }

    pub(super) fn doc(&mut self, doc: &[String]) {
        for line in doc {
            self.p.line(format!("/// {line}").trim_end());
        }
    }

    fn class_decl(&mut self, class: &'a Class) {
        self.class = Some(class);
        self.doc(&class.doc);
        let head = match &class.base {
            Some(base) => format!("class {} : public {base}", class.name),
            None => format!(
                "class {0} : public std::enable_shared_from_this<{0}>",
                class.name
            ),
        };
        Printer::braced(self, &head, ";", |e| {
            e.p.label("public:");
            for field in &class.fields {
                e.doc(&field.doc);
                let decl = e.field_decl(field);
                e.p.line(decl);
            }
            if !class.fields.is_empty() && !class.methods.is_empty() {
                e.p.blank();
            }
            for method in &class.methods {
                e.doc(&method.doc);
                let decl = e.method_decl(class, method);
                e.p.line(decl);
            }
        });
        self.class = None;
    }

    /// Storage, qualifiers, type, name, initializer.
    fn field_decl(&mut self, field: &Field) -> String {
        let ty = self.ty(&field.ty);
        let storage = if field.is_static { "inline static " } else { "" };
        let constness = if field.is_const { "const " } else { "" };
        match &field.init {
            Some(init) => {
                let init = self.expr(init);
                format!("{storage}{constness}{ty} {} = {init};", field.name)
            }
            None => format!("{storage}{ty} {}{{}};", field.name),
        }
    }

    fn method_decl(&mut self, class: &Class, method: &Method) -> String {
        let params = self.params(&method.params, true);
        let quals = method.quals;
        match method.kind {
            MethodKind::Constructor => format!("{}({params});", class.name),
            MethodKind::Destructor if quals.is_override => format!("~{}() override;", class.name),
            MethodKind::Destructor => format!("virtual ~{}();", class.name),
            MethodKind::Method | MethodKind::Getter | MethodKind::Setter => {
                let mut decl = String::new();
                if quals.is_static {
                    decl.push_str("static ");
                }
                if quals.is_virtual {
                    decl.push_str("virtual ");
                }
                decl.push_str(&format!("{} {}({params})", self.ty(&method.ret), method.name));
                if quals.is_const {
                    decl.push_str(" const");
                }
                if quals.is_override {
                    decl.push_str(" override");
                }
                decl.push(';');
                decl
            }
        }
    }

    fn method_def(&mut self, class: &'a Class, method: &'a Method) {
        let params = self.params(&method.params, false);
        let head = match method.kind {
            MethodKind::Constructor => {
                let mut head = format!("inline {0}::{0}({params})", class.name);
                if let (Some(args), Some(base)) = (&method.super_args, &class.base) {
                    let args = self.args(args);
                    head.push_str(&format!(" : {base}({args})"));
                }
                head
            }
            MethodKind::Destructor => format!("inline {0}::~{0}()", class.name),
            MethodKind::Method | MethodKind::Getter | MethodKind::Setter => {
                let constness = if method.quals.is_const { " const" } else { "" };
                format!(
                    "inline {} {}::{}({params}){constness}",
                    self.ty(&method.ret),
                    class.name,
                    method.name
                )
            }
        };
        Printer::braced(self, &head, "", |e| e.body(&method.body));
    }

    fn function_def(&mut self, function: &'a Function) {
        self.doc(&function.doc);
        let params = self.params(&function.params, false);
        let head = format!("inline {} {}({params})", self.ty(&function.ret), function.name);
        Printer::braced(self, &head, "", |e| e.body(&function.body));
    }

    fn global(&mut self, global: &Global) {
        self.doc(&global.doc);
        let ty = self.ty(&global.ty);
        let constness = if global.is_const { "const " } else { "" };
        let decl = match &global.init {
            Some(init) => {
                let init = self.expr(init);
                format!("inline {constness}{ty} {} = {init};", global.name)
            }
            None => format!("inline {ty} {}{{}};", global.name),
        };
        self.p.line(decl);
    }

    fn init_routine(&mut self) {
        let unit = self.unit;
        let name = self.unit_name();
        self.p.line("/// Top-level statements of the source module, run once at load time.");
        Printer::braced(self, &format!("inline void register_{name}()"), "", |e| {
            e.body(&unit.init);
        });
        self.p.blank();
        self.p.line(format!(
            "inline const bool {name}_registered = (register_{name}(), true);"
        ));
    }

    /// `T name` list; declarations carry the defaults.
    pub(super) fn params(&mut self, params: &[Param], defaults: bool) -> String {
        let mut out = Vec::with_capacity(params.len());
        for param in params {
            let mut text = format!("{} {}", self.ty(&param.ty), param.name);
            if defaults && let Some(default) = &param.default {
                text.push_str(&format!(" = {}", self.expr(default)));
            }
            out.push(text);
        }
        out.join(", ")
    }
}
