#![forbid(unsafe_code)]

pub mod dialect;

use std::borrow::Borrow;
use std::fmt;

use compact_str::CompactString;
use miette::SourceSpan;

pub use dialect::{BuiltinFunction, Dialect, DialectKind, EvmDialect, NoBuiltins};

pub type Span = SourceSpan;

pub fn span(start: usize, len: usize) -> Span {
    SourceSpan::new(start.into(), len)
}

pub fn span_between(start: usize, end: usize) -> Span {
    debug_assert!(end >= start);
    span(start, end - start)
}

/// An identifier as it appears in the tree.
///
/// Only string equality matters; short names are stored inline.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(CompactString);

impl Name {
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(CompactString::new(s.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Self(CompactString::from(s))
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedName {
    pub span: Span,
    pub name: Name,
    pub ty: Option<Name>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identifier {
    pub span: Span,
    pub name: Name,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    Number,
    Boolean,
    String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Literal {
    pub span: Span,
    pub kind: LiteralKind,
    /// Source text for numbers and booleans, the unescaped contents for strings.
    pub value: String,
    pub ty: Option<Name>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionCall {
    pub span: Span,
    pub function_name: Identifier,
    pub arguments: Vec<Expression>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expression {
    Literal(Literal),
    Identifier(Identifier),
    FunctionCall(FunctionCall),
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Literal(x) => x.span,
            Expression::Identifier(x) => x.span,
            Expression::FunctionCall(x) => x.span,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub span: Span,
    pub statements: Vec<Statement>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Statement {
    ExpressionStatement(ExpressionStatement),
    Assignment(Assignment),
    VariableDeclaration(VariableDeclaration),
    FunctionDefinition(FunctionDefinition),
    If(If),
    Switch(Switch),
    ForLoop(ForLoop),
    Break(Break),
    Continue(Continue),
    Leave(Leave),
    Block(Block),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::ExpressionStatement(x) => x.span,
            Statement::Assignment(x) => x.span,
            Statement::VariableDeclaration(x) => x.span,
            Statement::FunctionDefinition(x) => x.span,
            Statement::If(x) => x.span,
            Statement::Switch(x) => x.span,
            Statement::ForLoop(x) => x.span,
            Statement::Break(x) => x.span,
            Statement::Continue(x) => x.span,
            Statement::Leave(x) => x.span,
            Statement::Block(x) => x.span,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpressionStatement {
    pub span: Span,
    pub expression: Expression,
}

/// `a, b := f()`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub span: Span,
    pub variable_names: Vec<Identifier>,
    pub value: Expression,
}

/// `let a, b := f()`; without a value all variables start at zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableDeclaration {
    pub span: Span,
    pub variables: Vec<TypedName>,
    pub value: Option<Expression>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionDefinition {
    pub span: Span,
    pub name: Name,
    pub parameters: Vec<TypedName>,
    pub returns: Vec<TypedName>,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct If {
    pub span: Span,
    pub condition: Expression,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Switch {
    pub span: Span,
    pub expression: Expression,
    pub cases: Vec<Case>,
}

/// A `case` arm; `value == None` is the `default` arm.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Case {
    pub span: Span,
    pub value: Option<Literal>,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForLoop {
    pub span: Span,
    pub pre: Block,
    pub condition: Expression,
    pub post: Block,
    pub body: Block,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Break {
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Continue {
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Leave {
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_compare_by_text() {
        let a = Name::new("x_1");
        let b = Name::from(String::from("x_1"));
        assert_eq!(a, b);
        assert_eq!(a, "x_1");
        assert_eq!(a.to_string(), "x_1");
    }

    #[test]
    fn name_sets_can_be_queried_by_str() {
        let set: HashSet<Name> = ["a", "b"].into_iter().map(Name::from).collect();
        assert!(set.contains("a"));
        assert!(!set.contains("c"));
    }

    #[test]
    fn blocks_carry_their_span_through_clones() {
        let block = Block {
            span: span_between(0, 9),
            statements: vec![Statement::Leave(Leave { span: span(2, 5) })],
        };
        let copy = block.clone();
        assert_eq!(copy, block);
        assert_eq!(copy.span, span(0, 9));
        assert_eq!(copy.statements[0].span(), span(2, 5));
    }
}
