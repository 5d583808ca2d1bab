//! Input side of the pipeline: the ESTree tree and its doc annotations.

pub mod annotation;
pub mod ast;

#[cfg(test)]
mod annotation_tests;
#[cfg(test)]
mod ast_tests;

pub use annotation::{DocComment, parse_doc};
pub use ast::{
    Arrow, ArrowBody, Block, Call, CatchClause, Class, ClassMember, Comment, Declarator, Expr,
    ForInit, Function, Identifier, Literal, MethodDef, Program, PropertyDef, Stmt, SwitchCase,
    Unsupported, VarDecl,
};

/// Byte range into the original source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn from_bounds(start: Option<usize>, end: Option<usize>) -> Option<Self> {
        match (start, end) {
            (Some(start), Some(end)) if end >= start => Some(Self::new(start, end)),
            (Some(start), _) => Some(Self::new(start, start)),
            _ => None,
        }
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}
