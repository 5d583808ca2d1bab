//! ESTree builders for tests.
//!
//! Each helper returns the JSON shape the parser front-end produces, so tests
//! exercise the same deserialization path as real input.

use serde_json::{Value, json};

use crate::source::{Expr, Program, Stmt};

pub fn program(body: Vec<Value>) -> Program {
    serde_json::from_value(json!({ "type": "Program", "body": body }))
        .expect("test program must deserialize")
}

pub fn parse_expr(value: Value) -> Expr {
    serde_json::from_value(value).expect("test expression must deserialize")
}

pub fn parse_stmt(value: Value) -> Stmt {
    serde_json::from_value(value).expect("test statement must deserialize")
}

pub fn ident(name: &str) -> Value {
    json!({ "type": "Identifier", "name": name })
}

pub fn num(n: i64) -> Value {
    json!({ "type": "Literal", "value": n, "raw": n.to_string() })
}

pub fn hex(n: u64) -> Value {
    json!({ "type": "Literal", "value": n, "raw": format!("0x{n:02X}") })
}

pub fn float(f: f64) -> Value {
    json!({ "type": "Literal", "value": f, "raw": format!("{f:?}") })
}

pub fn string(s: &str) -> Value {
    json!({ "type": "Literal", "value": s, "raw": format!("'{s}'") })
}

pub fn boolean(b: bool) -> Value {
    json!({ "type": "Literal", "value": b, "raw": b.to_string() })
}

pub fn null() -> Value {
    json!({ "type": "Literal", "value": null, "raw": "null" })
}

pub fn this() -> Value {
    json!({ "type": "ThisExpression" })
}

pub fn member(object: Value, property: &str) -> Value {
    json!({ "type": "MemberExpression", "object": object, "property": ident(property), "computed": false })
}

pub fn this_member(property: &str) -> Value {
    member(this(), property)
}

pub fn index(object: Value, key: Value) -> Value {
    json!({ "type": "MemberExpression", "object": object, "property": key, "computed": true })
}

pub fn call(callee: Value, args: Vec<Value>) -> Value {
    json!({ "type": "CallExpression", "callee": callee, "arguments": args })
}

pub fn method_call(object: Value, method: &str, args: Vec<Value>) -> Value {
    call(member(object, method), args)
}

pub fn new_expr(callee: &str, args: Vec<Value>) -> Value {
    json!({ "type": "NewExpression", "callee": ident(callee), "arguments": args })
}

pub fn bin(op: &str, left: Value, right: Value) -> Value {
    json!({ "type": "BinaryExpression", "operator": op, "left": left, "right": right })
}

pub fn logical(op: &str, left: Value, right: Value) -> Value {
    json!({ "type": "LogicalExpression", "operator": op, "left": left, "right": right })
}

pub fn unary(op: &str, argument: Value) -> Value {
    json!({ "type": "UnaryExpression", "operator": op, "argument": argument, "prefix": true })
}

pub fn update(op: &str, argument: Value, prefix: bool) -> Value {
    json!({ "type": "UpdateExpression", "operator": op, "argument": argument, "prefix": prefix })
}

pub fn assign(op: &str, left: Value, right: Value) -> Value {
    json!({ "type": "AssignmentExpression", "operator": op, "left": left, "right": right })
}

pub fn cond(test: Value, consequent: Value, alternate: Value) -> Value {
    json!({ "type": "ConditionalExpression", "test": test, "consequent": consequent, "alternate": alternate })
}

pub fn array(elements: Vec<Value>) -> Value {
    json!({ "type": "ArrayExpression", "elements": elements })
}

pub fn array_pattern(names: &[&str]) -> Value {
    let elements: Vec<Value> = names.iter().map(|n| ident(n)).collect();
    json!({ "type": "ArrayPattern", "elements": elements })
}

pub fn object(props: Vec<(&str, Value)>) -> Value {
    let properties: Vec<Value> = props
        .into_iter()
        .map(|(key, value)| {
            json!({ "type": "Property", "key": ident(key), "value": value, "computed": false, "shorthand": false })
        })
        .collect();
    json!({ "type": "ObjectExpression", "properties": properties })
}

pub fn spread(argument: Value) -> Value {
    json!({ "type": "SpreadElement", "argument": argument })
}

pub fn template(quasis: &[&str], expressions: Vec<Value>) -> Value {
    let quasis: Vec<Value> = quasis
        .iter()
        .map(|q| json!({ "type": "TemplateElement", "value": { "raw": q, "cooked": q } }))
        .collect();
    json!({ "type": "TemplateLiteral", "quasis": quasis, "expressions": expressions })
}

pub fn arrow(params: &[&str], body: Value) -> Value {
    let params: Vec<Value> = params.iter().map(|p| ident(p)).collect();
    json!({ "type": "ArrowFunctionExpression", "params": params, "body": body })
}

pub fn function_expr(params: &[&str], body: Vec<Value>) -> Value {
    let params: Vec<Value> = params.iter().map(|p| ident(p)).collect();
    json!({ "type": "FunctionExpression", "id": null, "params": params, "body": block(body) })
}

pub fn block(body: Vec<Value>) -> Value {
    json!({ "type": "BlockStatement", "body": body })
}

pub fn expr_stmt(expression: Value) -> Value {
    json!({ "type": "ExpressionStatement", "expression": expression })
}

pub fn ret(argument: Option<Value>) -> Value {
    json!({ "type": "ReturnStatement", "argument": argument })
}

pub fn var(kind: &str, name: &str, init: Option<Value>) -> Value {
    declare(kind, ident(name), init)
}

pub fn declare(kind: &str, id: Value, init: Option<Value>) -> Value {
    json!({
        "type": "VariableDeclaration",
        "kind": kind,
        "declarations": [{ "type": "VariableDeclarator", "id": id, "init": init }]
    })
}

pub fn if_stmt(test: Value, consequent: Vec<Value>, alternate: Option<Vec<Value>>) -> Value {
    json!({
        "type": "IfStatement",
        "test": test,
        "consequent": block(consequent),
        "alternate": alternate.map(block)
    })
}

pub fn for_stmt(init: Value, test: Value, update: Value, body: Vec<Value>) -> Value {
    json!({ "type": "ForStatement", "init": init, "test": test, "update": update, "body": block(body) })
}

/// `for (let i = 0; i < bound; i++) { .. }`
pub fn counted_for(var_name: &str, bound: Value, body: Vec<Value>) -> Value {
    for_stmt(
        var("let", var_name, Some(num(0))),
        bin("<", ident(var_name), bound),
        update("++", ident(var_name), false),
        body,
    )
}

pub fn throw(argument: Value) -> Value {
    json!({ "type": "ThrowStatement", "argument": argument })
}

pub fn with_doc(mut node: Value, doc: &str) -> Value {
    node["leadingComments"] = json!([{ "type": "Block", "value": doc }]);
    node
}

pub fn func_decl(name: &str, params: &[&str], body: Vec<Value>) -> Value {
    let params: Vec<Value> = params.iter().map(|p| ident(p)).collect();
    json!({ "type": "FunctionDeclaration", "id": ident(name), "params": params, "body": block(body) })
}

pub fn class_decl(name: &str, base: Option<&str>, members: Vec<Value>) -> Value {
    json!({
        "type": "ClassDeclaration",
        "id": ident(name),
        "superClass": base.map(ident),
        "body": { "type": "ClassBody", "body": members }
    })
}

fn method_def(kind: &str, name: &str, params: &[&str], body: Vec<Value>, is_static: bool) -> Value {
    json!({
        "type": "MethodDefinition",
        "kind": kind,
        "static": is_static,
        "computed": false,
        "key": ident(name),
        "value": function_expr(params, body)
    })
}

pub fn constructor(params: &[&str], body: Vec<Value>) -> Value {
    method_def("constructor", "constructor", params, body, false)
}

pub fn method(name: &str, params: &[&str], body: Vec<Value>) -> Value {
    method_def("method", name, params, body, false)
}

pub fn static_method(name: &str, params: &[&str], body: Vec<Value>) -> Value {
    method_def("method", name, params, body, true)
}

pub fn getter(name: &str, body: Vec<Value>) -> Value {
    method_def("get", name, &[], body, false)
}

pub fn setter(name: &str, param: &str, body: Vec<Value>) -> Value {
    method_def("set", name, &[param], body, false)
}

pub fn super_call(args: Vec<Value>) -> Value {
    expr_stmt(call(json!({ "type": "Super" }), args))
}
