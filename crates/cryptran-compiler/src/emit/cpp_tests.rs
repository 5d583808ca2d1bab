use cryptran_core::Type;

use super::{EmitterConfig, emit};
use crate::target::{
    BinOp, Builtin, Case, Catch, Class, ExprKind, Field, Function, Item, Method, MethodKind,
    Param, Placeholder, Qualifiers, Stmt, TExpr, Target, Unit,
};

fn config() -> EmitterConfig {
    EmitterConfig::for_target(Target::Cpp).runtime(false)
}

fn cpp(unit: &Unit) -> String {
    emit(unit, &config(), Target::Cpp)
}

fn function(name: &str, params: Vec<Param>, ret: Type, body: Vec<Stmt>) -> Item {
    Item::Function(Function {
        name: name.to_string(),
        params,
        ret,
        body,
        doc: Vec::new(),
    })
}

fn unit_with(items: Vec<Item>) -> Unit {
    let mut unit = Unit::new("rot", "ns");
    unit.items = items;
    unit
}

fn x() -> TExpr {
    TExpr::ident("x", Type::u32())
}

fn n() -> TExpr {
    TExpr::ident("n", Type::u32())
}

#[test]
fn rotate_function() {
    let shl = TExpr::binary(BinOp::Shl, x(), n(), Type::u32());
    let width = TExpr::binary(BinOp::Sub, TExpr::u32(32), n(), Type::u32());
    let shr = TExpr::binary(BinOp::Shr, x(), width, Type::u32());
    let body = vec![Stmt::Return(Some(TExpr::binary(BinOp::BitOr, shl, shr, Type::u32())))];
    let unit = unit_with(vec![function(
        "rotl",
        vec![Param::new("x", Type::u32()), Param::new("n", Type::u32())],
        Type::u32(),
        body,
    )]);

    insta::assert_snapshot!(cpp(&unit), @r"
    // Generated by cryptran from `rot`. Do not edit.
    #pragma once

    #include <cstdint>

    namespace ns {

    inline uint32_t rotl(uint32_t x, uint32_t n);

    inline uint32_t rotl(uint32_t x, uint32_t n) {
        return (x << n) | (x >> (32u - n));
    }

    }  // namespace ns
    ");
}

#[test]
fn includes_follow_usage() {
    let data = TExpr::ident("data", Type::bytes());
    let size = TExpr::builtin(Builtin::Size, vec![data], Type::u32());
    let unit = unit_with(vec![function(
        "count",
        vec![Param::new("data", Type::bytes())],
        Type::u32(),
        vec![Stmt::Return(Some(size))],
    )]);
    let text = cpp(&unit);

    assert!(text.contains("#include <vector>"));
    assert!(!text.contains("#include <string>"));
    assert!(!text.contains("#include <memory>"));
    assert!(text.contains("inline uint32_t count(std::vector<uint8_t> data) {"));
    assert!(text.contains("return data.size();"));
}

#[test]
fn runtime_stub_is_optional() {
    let unit = unit_with(Vec::new());
    let with = emit(&unit, &EmitterConfig::for_target(Target::Cpp), Target::Cpp);
    assert!(with.contains("namespace rt {"));
    assert!(!cpp(&unit).contains("namespace rt {"));
}

fn cipher() -> Class {
    let this_rounds = TExpr::new(
        ExprKind::Member {
            object: Box::new(TExpr::new(ExprKind::This, Type::named("Cipher"))),
            name: "rounds".to_string(),
        },
        Type::u32(),
    );
    Class {
        name: "Cipher".to_string(),
        base: None,
        doc: vec!["Toy cipher.".to_string()],
        fields: vec![Field {
            name: "rounds".to_string(),
            ty: Type::u32(),
            is_static: false,
            is_const: false,
            init: None,
            doc: Vec::new(),
        }],
        methods: vec![Method {
            name: "get_rounds".to_string(),
            kind: MethodKind::Getter,
            params: Vec::new(),
            ret: Type::u32(),
            quals: Qualifiers {
                is_const: true,
                ..Qualifiers::default()
            },
            super_args: None,
            body: vec![Stmt::Return(Some(this_rounds))],
            doc: Vec::new(),
        }],
    }
}

#[test]
fn class_is_declared_then_defined() {
    let mut unit = unit_with(vec![Item::Class(cipher())]);
    unit.ref_types.insert("Cipher".to_string());
    let text = cpp(&unit);

    assert!(text.contains("#include <memory>"));
    assert!(text.contains("class Cipher;"));
    assert!(text.contains("/// Toy cipher."));
    assert!(text.contains("class Cipher : public std::enable_shared_from_this<Cipher> {"));
    assert!(text.contains("public:\n    uint32_t rounds{};"));
    assert!(text.contains("    uint32_t get_rounds() const;"));
    assert!(text.contains("inline uint32_t Cipher::get_rounds() const {\n    return this->rounds;\n}"));
}

#[test]
fn derived_constructor_forwards_to_base() {
    let base = cipher();
    let derived = Class {
        name: "Strong".to_string(),
        base: Some("Cipher".to_string()),
        doc: Vec::new(),
        fields: Vec::new(),
        methods: vec![Method {
            name: "Strong".to_string(),
            kind: MethodKind::Constructor,
            params: vec![Param::new("n", Type::u32())],
            ret: Type::void(),
            quals: Qualifiers::default(),
            super_args: Some(vec![n()]),
            body: Vec::new(),
            doc: Vec::new(),
        }],
    };
    let mut unit = unit_with(vec![Item::Class(derived), Item::Class(base)]);
    unit.ref_types.insert("Cipher".to_string());
    unit.ref_types.insert("Strong".to_string());
    let text = cpp(&unit);

    let base_at = text.find("class Cipher :").unwrap();
    let derived_at = text.find("class Strong : public Cipher {").unwrap();
    assert!(base_at < derived_at);
    assert!(text.contains("    Strong(uint32_t n);"));
    assert!(text.contains("inline Strong::Strong(uint32_t n) : Cipher(n) {"));
}

#[test]
fn string_switch_becomes_comparisons() {
    let s = TExpr::ident("mode", Type::string());
    let ret = |v: u32| vec![Stmt::Return(Some(TExpr::u32(v))), Stmt::Break];
    let switch = Stmt::Switch {
        subject: s,
        cases: vec![
            Case {
                labels: vec![TExpr::string("ecb"), TExpr::string("ECB")],
                body: ret(1),
            },
            Case {
                labels: vec![TExpr::string("cbc")],
                body: ret(2),
            },
        ],
        default: Some(ret(0)),
    };
    let unit = unit_with(vec![function(
        "mode_id",
        vec![Param::new("mode", Type::string())],
        Type::u32(),
        vec![switch],
    )]);
    let text = cpp(&unit);

    assert!(text.contains(r#"    if (mode == "ecb" || mode == "ECB") {"#));
    assert!(text.contains(r#"    } else if (mode == "cbc") {"#));
    assert!(text.contains("    } else {\n        return 0u;\n    }"));
    assert!(!text.contains("break;"));
}

#[test]
fn integer_switch_breaks_after_each_case() {
    let switch = Stmt::Switch {
        subject: x(),
        cases: vec![Case {
            labels: vec![TExpr::u32(1), TExpr::u32(2)],
            body: vec![Stmt::Expr(TExpr::assign(n(), TExpr::u32(7)))],
        }],
        default: None,
    };
    let unit = unit_with(vec![function(
        "pick",
        vec![Param::new("x", Type::u32()), Param::new("n", Type::u32())],
        Type::void(),
        vec![switch],
    )]);
    let text = cpp(&unit);

    assert!(text.contains("switch (x) {\n        case 1u:\n        case 2u: {\n            n = 7u;\n            break;\n        }"));
}

#[test]
fn finally_runs_on_both_paths() {
    let log = |text: &str| Stmt::Comment(text.to_string());
    let stmt = Stmt::Try {
        body: vec![log("work")],
        catch: Some(Catch {
            name: "e".to_string(),
            body: vec![log("handle")],
        }),
        finally: Some(vec![log("cleanup")]),
    };
    let unit = unit_with(vec![function("guarded", Vec::new(), Type::void(), vec![stmt])]);
    let text = cpp(&unit);

    assert!(text.contains("catch (const std::exception& e) {"));
    assert!(text.contains("} catch (...) {\n        // cleanup\n        throw;\n    }\n    // cleanup\n"));
    assert!(text.contains("#include <stdexcept>"));
}

#[test]
fn placeholders_become_comments() {
    let unit = unit_with(vec![Item::Placeholder(Placeholder::new(
        "WithStatement",
        "no equivalent",
    ))]);
    assert!(cpp(&unit).contains("/* cryptran: unhandled WithStatement: no equivalent */"));
}

#[test]
fn module_statements_run_at_load_time() {
    let mut unit = unit_with(Vec::new());
    unit.init.push(Stmt::Comment("register".to_string()));
    let text = cpp(&unit);

    assert!(text.contains("inline void register_rot() {\n    // register\n}"));
    assert!(text.contains("inline const bool rot_registered = (register_rot(), true);"));
}

#[test]
fn own_line_layout() {
    let unit = unit_with(vec![function(
        "noop",
        Vec::new(),
        Type::void(),
        vec![Stmt::Return(None)],
    )]);
    let config = config().brace_layout(super::BraceLayout::OwnLine);
    let text = emit(&unit, &config, Target::Cpp);
    assert!(text.contains("inline void noop()\n{\n    return;\n}"));
}
