//! ESTree-shaped input tree.
//!
//! The three node sums ([`Stmt`], [`Expr`], [`ClassMember`]) deserialize
//! fail-soft: a node whose `type` is outside the vocabulary, or whose payload
//! is malformed, becomes an `Unsupported` variant carrying the source kind
//! instead of failing the whole document.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::Span;

#[derive(Debug, Clone, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Identifier {
    pub name: String,
    #[serde(default)]
    pub start: Option<usize>,
    #[serde(default)]
    pub end: Option<usize>,
}

impl Identifier {
    pub fn span(&self) -> Option<Span> {
        Span::from_bounds(self.start, self.end)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Literal {
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub raw: Option<String>,
    #[serde(default)]
    pub regex: Option<Value>,
    #[serde(default)]
    pub bigint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub body: Vec<Stmt>,
}

/// Function declarations, function expressions and method values.
#[derive(Debug, Clone, Deserialize)]
pub struct Function {
    #[serde(default)]
    pub id: Option<Identifier>,
    #[serde(default)]
    pub params: Vec<Expr>,
    pub body: Block,
    #[serde(default, rename = "leadingComments")]
    pub leading_comments: Vec<Comment>,
    #[serde(default)]
    pub start: Option<usize>,
    #[serde(default)]
    pub end: Option<usize>,
}

impl Function {
    pub fn span(&self) -> Option<Span> {
        Span::from_bounds(self.start, self.end)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Arrow {
    #[serde(default)]
    pub params: Vec<Expr>,
    pub body: ArrowBody,
}

#[derive(Debug, Clone)]
pub enum ArrowBody {
    Block(Block),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct VarDecl {
    #[serde(default)]
    pub kind: String,
    pub declarations: Vec<Declarator>,
    #[serde(default, rename = "leadingComments")]
    pub leading_comments: Vec<Comment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Declarator {
    pub id: Expr,
    #[serde(default)]
    pub init: Option<Expr>,
    #[serde(default)]
    pub start: Option<usize>,
    #[serde(default)]
    pub end: Option<usize>,
}

#[derive(Debug, Clone)]
pub enum ForInit {
    Decl(VarDecl),
    Expr(Expr),
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatchClause {
    #[serde(default)]
    pub param: Option<Expr>,
    pub body: Block,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SwitchCase {
    #[serde(default)]
    pub test: Option<Expr>,
    #[serde(default)]
    pub consequent: Vec<Stmt>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Class {
    #[serde(default)]
    pub id: Option<Identifier>,
    #[serde(default, rename = "superClass")]
    pub super_class: Option<Box<Expr>>,
    pub body: ClassBody,
    #[serde(default, rename = "leadingComments")]
    pub leading_comments: Vec<Comment>,
    #[serde(default)]
    pub start: Option<usize>,
    #[serde(default)]
    pub end: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassBody {
    #[serde(default)]
    pub body: Vec<ClassMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Call {
    pub callee: Box<Expr>,
    #[serde(default)]
    pub arguments: Vec<Expr>,
    #[serde(default)]
    pub start: Option<usize>,
    #[serde(default)]
    pub end: Option<usize>,
}

impl Call {
    pub fn span(&self) -> Option<Span> {
        Span::from_bounds(self.start, self.end)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateElement {
    pub value: TemplateValue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateValue {
    #[serde(default)]
    pub cooked: Option<String>,
    #[serde(default)]
    pub raw: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MethodDef {
    pub key: Expr,
    #[serde(default = "default_method_kind")]
    pub kind: String,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub computed: bool,
    pub value: Function,
    #[serde(default, rename = "leadingComments")]
    pub leading_comments: Vec<Comment>,
    #[serde(default)]
    pub start: Option<usize>,
    #[serde(default)]
    pub end: Option<usize>,
}

fn default_method_kind() -> String {
    "method".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertyDef {
    pub key: Expr,
    #[serde(default)]
    pub value: Option<Expr>,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub computed: bool,
    #[serde(default, rename = "leadingComments")]
    pub leading_comments: Vec<Comment>,
    #[serde(default)]
    pub start: Option<usize>,
    #[serde(default)]
    pub end: Option<usize>,
}

/// Node outside the supported vocabulary, or a known node with a malformed
/// payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unsupported {
    pub kind: String,
    pub reason: String,
    pub span: Option<Span>,
}

impl Unsupported {
    fn from_value(value: &Value, error: serde_json::Error) -> Self {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("<untyped>")
            .to_string();
        let message = error.to_string();
        let reason = if message.starts_with("unknown variant") {
            "unknown node type".to_string()
        } else {
            message
        };
        let offset = |key: &str| value.get(key).and_then(Value::as_u64).map(|n| n as usize);
        Self {
            kind,
            reason,
            span: Span::from_bounds(offset("start"), offset("end")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", remote = "Self")]
pub enum Stmt {
    VariableDeclaration(VarDecl),
    FunctionDeclaration(Function),
    ClassDeclaration(Class),
    ExpressionStatement {
        expression: Expr,
        #[serde(default)]
        directive: Option<String>,
        #[serde(default, rename = "leadingComments")]
        leading_comments: Vec<Comment>,
    },
    ReturnStatement {
        #[serde(default)]
        argument: Option<Expr>,
    },
    IfStatement {
        test: Expr,
        consequent: Box<Stmt>,
        #[serde(default)]
        alternate: Option<Box<Stmt>>,
    },
    ForStatement {
        #[serde(default)]
        init: Option<ForInit>,
        #[serde(default)]
        test: Option<Expr>,
        #[serde(default)]
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    ForOfStatement {
        left: ForInit,
        right: Expr,
        body: Box<Stmt>,
    },
    ForInStatement {
        left: ForInit,
        right: Expr,
        body: Box<Stmt>,
    },
    WhileStatement {
        test: Expr,
        body: Box<Stmt>,
    },
    DoWhileStatement {
        body: Box<Stmt>,
        test: Expr,
    },
    BlockStatement(Block),
    BreakStatement {},
    ContinueStatement {},
    ThrowStatement {
        argument: Expr,
    },
    TryStatement {
        block: Block,
        #[serde(default)]
        handler: Option<CatchClause>,
        #[serde(default)]
        finalizer: Option<Block>,
    },
    SwitchStatement {
        discriminant: Expr,
        cases: Vec<SwitchCase>,
    },
    EmptyStatement {},
    #[serde(skip)]
    Unsupported(Unsupported),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", remote = "Self")]
pub enum Expr {
    #[serde(alias = "StringLiteral", alias = "NumericLiteral", alias = "BooleanLiteral")]
    #[serde(alias = "NullLiteral")]
    Literal(Literal),
    Identifier(Identifier),
    ThisExpression {},
    Super {},
    BinaryExpression {
        operator: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    LogicalExpression {
        operator: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    UnaryExpression {
        operator: String,
        argument: Box<Expr>,
    },
    UpdateExpression {
        operator: String,
        argument: Box<Expr>,
        #[serde(default)]
        prefix: bool,
    },
    AssignmentExpression {
        operator: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    CallExpression(Call),
    NewExpression(Call),
    MemberExpression {
        object: Box<Expr>,
        property: Box<Expr>,
        #[serde(default)]
        computed: bool,
    },
    ChainExpression {
        expression: Box<Expr>,
    },
    ArrayExpression {
        elements: Vec<Option<Expr>>,
    },
    ObjectExpression {
        properties: Vec<Expr>,
    },
    Property {
        key: Box<Expr>,
        value: Box<Expr>,
        #[serde(default)]
        computed: bool,
        #[serde(default)]
        shorthand: bool,
    },
    ConditionalExpression {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    ArrowFunctionExpression(Arrow),
    FunctionExpression(Function),
    SpreadElement {
        argument: Box<Expr>,
    },
    TemplateLiteral {
        quasis: Vec<TemplateElement>,
        expressions: Vec<Expr>,
    },
    SequenceExpression {
        expressions: Vec<Expr>,
    },
    ParenthesizedExpression {
        expression: Box<Expr>,
    },
    ArrayPattern {
        elements: Vec<Option<Expr>>,
    },
    ObjectPattern {
        properties: Vec<Expr>,
    },
    AssignmentPattern {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    RestElement {
        argument: Box<Expr>,
    },
    #[serde(skip)]
    Unsupported(Unsupported),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", remote = "Self")]
pub enum ClassMember {
    MethodDefinition(MethodDef),
    #[serde(alias = "ClassProperty")]
    PropertyDefinition(PropertyDef),
    #[serde(skip)]
    Unsupported(Unsupported),
}

macro_rules! fail_soft {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = Value::deserialize(deserializer)?;
                match $ty::deserialize(value.clone()) {
                    Ok(node) => Ok(node),
                    Err(e) => Ok($ty::Unsupported(Unsupported::from_value(&value, e))),
                }
            }
        }
    };
}

fail_soft!(Stmt);
fail_soft!(Expr);
fail_soft!(ClassMember);

fn node_type(value: &Value) -> Option<&str> {
    value.get("type").and_then(Value::as_str)
}

impl<'de> Deserialize<'de> for ArrowBody {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if node_type(&value) == Some("BlockStatement") {
            let block = Block::deserialize(value).map_err(serde::de::Error::custom)?;
            return Ok(ArrowBody::Block(block));
        }
        let expr = <Expr as Deserialize>::deserialize(value).map_err(serde::de::Error::custom)?;
        Ok(ArrowBody::Expr(Box::new(expr)))
    }
}

impl<'de> Deserialize<'de> for ForInit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if node_type(&value) == Some("VariableDeclaration") {
            let decl = VarDecl::deserialize(value).map_err(serde::de::Error::custom)?;
            return Ok(ForInit::Decl(decl));
        }
        let expr = <Expr as Deserialize>::deserialize(value).map_err(serde::de::Error::custom)?;
        Ok(ForInit::Expr(expr))
    }
}

impl Stmt {
    /// ESTree `type` of this node.
    pub fn kind(&self) -> &str {
        match self {
            Stmt::VariableDeclaration(_) => "VariableDeclaration",
            Stmt::FunctionDeclaration(_) => "FunctionDeclaration",
            Stmt::ClassDeclaration(_) => "ClassDeclaration",
            Stmt::ExpressionStatement { .. } => "ExpressionStatement",
            Stmt::ReturnStatement { .. } => "ReturnStatement",
            Stmt::IfStatement { .. } => "IfStatement",
            Stmt::ForStatement { .. } => "ForStatement",
            Stmt::ForOfStatement { .. } => "ForOfStatement",
            Stmt::ForInStatement { .. } => "ForInStatement",
            Stmt::WhileStatement { .. } => "WhileStatement",
            Stmt::DoWhileStatement { .. } => "DoWhileStatement",
            Stmt::BlockStatement(_) => "BlockStatement",
            Stmt::BreakStatement {} => "BreakStatement",
            Stmt::ContinueStatement {} => "ContinueStatement",
            Stmt::ThrowStatement { .. } => "ThrowStatement",
            Stmt::TryStatement { .. } => "TryStatement",
            Stmt::SwitchStatement { .. } => "SwitchStatement",
            Stmt::EmptyStatement {} => "EmptyStatement",
            Stmt::Unsupported(u) => &u.kind,
        }
    }

    /// Whether `pred` holds for some expression in this statement. Nested
    /// function and class bodies are not searched.
    pub fn any_expr(&self, pred: &mut dyn FnMut(&Expr) -> bool) -> bool {
        match self {
            Stmt::VariableDeclaration(decl) => decl.any_expr(pred),
            Stmt::ExpressionStatement { expression, .. }
            | Stmt::ThrowStatement {
                argument: expression,
            } => expression.any_expr(pred),
            Stmt::ReturnStatement { argument } => argument.as_ref().is_some_and(|e| e.any_expr(pred)),
            Stmt::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                test.any_expr(pred)
                    || consequent.any_expr(pred)
                    || alternate.as_ref().is_some_and(|s| s.any_expr(pred))
            }
            Stmt::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                let init = match init {
                    Some(ForInit::Decl(decl)) => decl.any_expr(pred),
                    Some(ForInit::Expr(e)) => e.any_expr(pred),
                    None => false,
                };
                init || [test, update].into_iter().flatten().any(|e| e.any_expr(pred)) || body.any_expr(pred)
            }
            Stmt::ForOfStatement { right, body, .. } | Stmt::ForInStatement { right, body, .. } => {
                right.any_expr(pred) || body.any_expr(pred)
            }
            Stmt::WhileStatement { test, body } | Stmt::DoWhileStatement { body, test } => {
                test.any_expr(pred) || body.any_expr(pred)
            }
            Stmt::BlockStatement(block) => block.body.iter().any(|s| s.any_expr(pred)),
            Stmt::TryStatement {
                block,
                handler,
                finalizer,
            } => {
                block.body.iter().any(|s| s.any_expr(pred))
                    || handler
                        .as_ref()
                        .is_some_and(|h| h.body.body.iter().any(|s| s.any_expr(pred)))
                    || finalizer
                        .as_ref()
                        .is_some_and(|f| f.body.iter().any(|s| s.any_expr(pred)))
            }
            Stmt::SwitchStatement {
                discriminant,
                cases,
            } => {
                discriminant.any_expr(pred)
                    || cases.iter().any(|case| {
                        case.test.as_ref().is_some_and(|t| t.any_expr(pred))
                            || case.consequent.iter().any(|s| s.any_expr(pred))
                    })
            }
            Stmt::FunctionDeclaration(_)
            | Stmt::ClassDeclaration(_)
            | Stmt::BreakStatement {}
            | Stmt::ContinueStatement {}
            | Stmt::EmptyStatement {}
            | Stmt::Unsupported(_) => false,
        }
    }
}

impl VarDecl {
    fn any_expr(&self, pred: &mut dyn FnMut(&Expr) -> bool) -> bool {
        self.declarations
            .iter()
            .any(|d| d.init.as_ref().is_some_and(|e| e.any_expr(pred)))
    }
}

impl Expr {
    /// Whether `pred` holds for this expression or one inside it. Function
    /// bodies are not searched.
    pub fn any_expr(&self, pred: &mut dyn FnMut(&Expr) -> bool) -> bool {
        if pred(self) {
            return true;
        }
        match self {
            Expr::BinaryExpression { left, right, .. }
            | Expr::LogicalExpression { left, right, .. }
            | Expr::AssignmentExpression { left, right, .. }
            | Expr::AssignmentPattern { left, right } => left.any_expr(pred) || right.any_expr(pred),
            Expr::UnaryExpression { argument, .. }
            | Expr::UpdateExpression { argument, .. }
            | Expr::SpreadElement { argument }
            | Expr::RestElement { argument } => argument.any_expr(pred),
            Expr::CallExpression(call) | Expr::NewExpression(call) => {
                call.callee.any_expr(pred) || call.arguments.iter().any(|a| a.any_expr(pred))
            }
            Expr::MemberExpression {
                object,
                property,
                computed,
            } => object.any_expr(pred) || (*computed && property.any_expr(pred)),
            Expr::ChainExpression { expression } | Expr::ParenthesizedExpression { expression } => {
                expression.any_expr(pred)
            }
            Expr::ArrayExpression { elements } | Expr::ArrayPattern { elements } => {
                elements.iter().flatten().any(|e| e.any_expr(pred))
            }
            Expr::ObjectExpression { properties } | Expr::ObjectPattern { properties } => {
                properties.iter().any(|p| p.any_expr(pred))
            }
            Expr::Property {
                key,
                value,
                computed,
                ..
            } => (*computed && key.any_expr(pred)) || value.any_expr(pred),
            Expr::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => test.any_expr(pred) || consequent.any_expr(pred) || alternate.any_expr(pred),
            Expr::TemplateLiteral { expressions, .. } | Expr::SequenceExpression { expressions } => {
                expressions.iter().any(|e| e.any_expr(pred))
            }
            Expr::Literal(_)
            | Expr::Identifier(_)
            | Expr::ThisExpression {}
            | Expr::Super {}
            | Expr::ArrowFunctionExpression(_)
            | Expr::FunctionExpression(_)
            | Expr::Unsupported(_) => false,
        }
    }

    /// ESTree `type` of this node.
    pub fn kind(&self) -> &str {
        match self {
            Expr::Literal(_) => "Literal",
            Expr::Identifier(_) => "Identifier",
            Expr::ThisExpression {} => "ThisExpression",
            Expr::Super {} => "Super",
            Expr::BinaryExpression { .. } => "BinaryExpression",
            Expr::LogicalExpression { .. } => "LogicalExpression",
            Expr::UnaryExpression { .. } => "UnaryExpression",
            Expr::UpdateExpression { .. } => "UpdateExpression",
            Expr::AssignmentExpression { .. } => "AssignmentExpression",
            Expr::CallExpression(_) => "CallExpression",
            Expr::NewExpression(_) => "NewExpression",
            Expr::MemberExpression { .. } => "MemberExpression",
            Expr::ChainExpression { .. } => "ChainExpression",
            Expr::ArrayExpression { .. } => "ArrayExpression",
            Expr::ObjectExpression { .. } => "ObjectExpression",
            Expr::Property { .. } => "Property",
            Expr::ConditionalExpression { .. } => "ConditionalExpression",
            Expr::ArrowFunctionExpression(_) => "ArrowFunctionExpression",
            Expr::FunctionExpression(_) => "FunctionExpression",
            Expr::SpreadElement { .. } => "SpreadElement",
            Expr::TemplateLiteral { .. } => "TemplateLiteral",
            Expr::SequenceExpression { .. } => "SequenceExpression",
            Expr::ParenthesizedExpression { .. } => "ParenthesizedExpression",
            Expr::ArrayPattern { .. } => "ArrayPattern",
            Expr::ObjectPattern { .. } => "ObjectPattern",
            Expr::AssignmentPattern { .. } => "AssignmentPattern",
            Expr::RestElement { .. } => "RestElement",
            Expr::Unsupported(u) => &u.kind,
        }
    }

    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Expr::Identifier(id) => Some(&id.name),
            _ => None,
        }
    }

    /// Name bound by a simple parameter or declarator pattern (`x`, `x = 1`,
    /// `...x`). Destructuring patterns bind several names and return `None`.
    pub fn binding_name(&self) -> Option<&str> {
        match self {
            Expr::Identifier(id) => Some(&id.name),
            Expr::AssignmentPattern { left, .. } => left.binding_name(),
            Expr::RestElement { argument } => argument.binding_name(),
            _ => None,
        }
    }

    /// Non-computed `object.name` access.
    pub fn as_member(&self) -> Option<(&Expr, &str)> {
        match self {
            Expr::MemberExpression {
                object,
                property,
                computed: false,
            } => property.as_ident().map(|name| (object.as_ref(), name)),
            _ => None,
        }
    }

    /// `this.name`
    pub fn as_this_member(&self) -> Option<&str> {
        match self.as_member() {
            Some((Expr::ThisExpression {}, name)) => Some(name),
            _ => None,
        }
    }

    /// Property name of an object-literal or class key.
    pub fn key_name(&self) -> Option<String> {
        match self {
            Expr::Identifier(id) => Some(id.name.clone()),
            Expr::Literal(lit) => match &lit.value {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Strips `ParenthesizedExpression` and `ChainExpression` wrappers.
    pub fn unwrap_parens(&self) -> &Expr {
        match self {
            Expr::ParenthesizedExpression { expression } | Expr::ChainExpression { expression } => {
                expression.unwrap_parens()
            }
            other => other,
        }
    }

    pub fn is_null_like(&self) -> bool {
        match self.unwrap_parens() {
            Expr::Literal(lit) => lit.value.is_null() && lit.regex.is_none() && lit.bigint.is_none(),
            Expr::Identifier(id) => id.name == "undefined",
            Expr::UnaryExpression { operator, .. } => operator == "void",
            _ => false,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Expr::Identifier(id) => id.span(),
            Expr::CallExpression(call) | Expr::NewExpression(call) => call.span(),
            Expr::FunctionExpression(f) => f.span(),
            Expr::Unsupported(u) => u.span,
            _ => None,
        }
    }
}

impl ClassMember {
    pub fn kind(&self) -> &str {
        match self {
            ClassMember::MethodDefinition(_) => "MethodDefinition",
            ClassMember::PropertyDefinition(_) => "PropertyDefinition",
            ClassMember::Unsupported(u) => &u.kind,
        }
    }
}

impl Program {
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(crate::Error::InvalidInput)
    }
}
