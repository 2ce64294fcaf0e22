#![forbid(unsafe_code)]

use yul_ast::Span;

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Keywords
    KwFunction,
    KwLet,
    KwIf,
    KwSwitch,
    KwCase,
    KwDefault,
    KwFor,
    KwBreak,
    KwContinue,
    KwLeave,
    KwTrue,
    KwFalse,

    // Operators / punctuation
    Arrow,
    ColonEq,
    Colon,
    Comma,

    LParen,
    RParen,
    LBrace,
    RBrace,

    Eof,

    // Literals / identifiers
    Ident(String),
    /// Decimal or `0x` hex number, kept as written.
    Number(String),
    String(String),
}
