#![forbid(unsafe_code)]
#![allow(unused_assignments)]

use logos::Logos;
use miette::Diagnostic;
use thiserror::Error;
use yul_ast::{span_between, Span};

use crate::token::{Token, TokenKind};

#[derive(Debug, Error, Diagnostic)]
#[error("lex error: {message}")]
#[diagnostic(code(yul::lex))]
#[allow(unused_assignments)]
pub struct LexError {
    pub message: String,
    #[label]
    pub span: Span,
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
enum RawToken {
    #[token("/*", block_comment)]
    BlockComment(bool),

    #[token("function")]
    KwFunction,
    #[token("let")]
    KwLet,
    #[token("if")]
    KwIf,
    #[token("switch")]
    KwSwitch,
    #[token("case")]
    KwCase,
    #[token("default")]
    KwDefault,
    #[token("for")]
    KwFor,
    #[token("break")]
    KwBreak,
    #[token("continue")]
    KwContinue,
    #[token("leave")]
    KwLeave,
    #[token("true")]
    KwTrue,
    #[token("false")]
    KwFalse,

    #[token("->")]
    Arrow,
    #[token(":=")]
    ColonEq,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    #[regex(r"0x[0-9a-fA-F]*", |lex| parse_hex(lex.slice()))]
    Hex(Option<String>),

    #[regex(r"[0-9]+", |lex| lex.slice().to_string())]
    Decimal(String),

    // Supported escapes: \n, \t, \r, \", \', \\ and \xNN.
    #[regex(r#""([^"\\\n]|\\.)*""#, parse_string)]
    String(Option<String>),

    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$.]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r#""([^"\\\n]|\\.)*"#)]
    UnterminatedString,
}

/// Consumes a block comment up to and including `*/`. `false` if the source ends first.
fn block_comment(lex: &mut logos::Lexer<RawToken>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(lex.remainder().len());
            false
        }
    }
}

fn parse_hex(s: &str) -> Option<String> {
    if s.len() <= 2 {
        return None;
    }
    Some(s.to_string())
}

fn parse_string(lex: &mut logos::Lexer<RawToken>) -> Option<String> {
    let s = lex.slice();
    let inner = &s[1..s.len().saturating_sub(1)];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let esc = chars.next()?;
        match esc {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            '\\' => out.push('\\'),
            'x' => {
                let hi = chars.next()?.to_digit(16)?;
                let lo = chars.next()?.to_digit(16)?;
                out.push(char::from_u32(hi * 16 + lo)?);
            }
            _ => return None,
        }
    }

    Some(out)
}

pub struct Lexer<'a> {
    src: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src }
    }

    pub fn lex(&self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        let mut lex = RawToken::lexer(self.src);

        while let Some(raw) = lex.next() {
            let range = lex.span();
            let span = span_between(range.start, range.end);

            let kind = match raw {
                Ok(RawToken::BlockComment(true)) => continue,
                Ok(RawToken::BlockComment(false)) => {
                    return Err(LexError {
                        message: "unterminated block comment".to_string(),
                        span,
                    });
                }

                Ok(RawToken::KwFunction) => TokenKind::KwFunction,
                Ok(RawToken::KwLet) => TokenKind::KwLet,
                Ok(RawToken::KwIf) => TokenKind::KwIf,
                Ok(RawToken::KwSwitch) => TokenKind::KwSwitch,
                Ok(RawToken::KwCase) => TokenKind::KwCase,
                Ok(RawToken::KwDefault) => TokenKind::KwDefault,
                Ok(RawToken::KwFor) => TokenKind::KwFor,
                Ok(RawToken::KwBreak) => TokenKind::KwBreak,
                Ok(RawToken::KwContinue) => TokenKind::KwContinue,
                Ok(RawToken::KwLeave) => TokenKind::KwLeave,
                Ok(RawToken::KwTrue) => TokenKind::KwTrue,
                Ok(RawToken::KwFalse) => TokenKind::KwFalse,

                Ok(RawToken::Arrow) => TokenKind::Arrow,
                Ok(RawToken::ColonEq) => TokenKind::ColonEq,
                Ok(RawToken::Colon) => TokenKind::Colon,
                Ok(RawToken::Comma) => TokenKind::Comma,

                Ok(RawToken::LParen) => TokenKind::LParen,
                Ok(RawToken::RParen) => TokenKind::RParen,
                Ok(RawToken::LBrace) => TokenKind::LBrace,
                Ok(RawToken::RBrace) => TokenKind::RBrace,

                Ok(RawToken::Ident(s)) => TokenKind::Ident(s),
                Ok(RawToken::Decimal(s)) => TokenKind::Number(s),
                Ok(RawToken::Hex(Some(s))) => TokenKind::Number(s),
                Ok(RawToken::Hex(None)) => {
                    return Err(LexError {
                        message: "invalid hex literal".to_string(),
                        span,
                    });
                }
                Ok(RawToken::String(Some(s))) => TokenKind::String(s),
                Ok(RawToken::String(None)) => {
                    return Err(LexError {
                        message: "invalid string literal".to_string(),
                        span,
                    });
                }
                Ok(RawToken::UnterminatedString) => {
                    return Err(LexError {
                        message: "unterminated string literal".to_string(),
                        span,
                    });
                }

                Err(_) => {
                    return Err(LexError {
                        message: "unexpected token".to_string(),
                        span,
                    });
                }
            };

            tokens.push(Token { kind, span });
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            span: span_between(self.src.len(), self.src.len()),
        });

        Ok(tokens)
    }
}
