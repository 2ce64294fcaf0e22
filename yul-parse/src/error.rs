#![forbid(unsafe_code)]
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;
use yul_ast::Span;
use yul_lex::TokenKind;

#[derive(Debug, Error, Diagnostic)]
#[error("parse error: {message}")]
#[diagnostic(code(yul::parse))]
pub struct ParseError {
    pub message: String,
    #[label]
    pub span: Span,
    /// What the parser saw instead, in source spelling.
    #[help]
    pub found: Option<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            found: None,
        }
    }

    /// `expected <what>` at a token, remembering the token for the label.
    pub fn expected(what: &str, found: &TokenKind, span: Span) -> Self {
        Self {
            message: format!("expected {what}"),
            span,
            found: Some(format!("found {}", describe(found))),
        }
    }
}

/// How a token reads in an error message.
pub fn describe(kind: &TokenKind) -> String {
    let fixed = match kind {
        TokenKind::KwFunction => "'function'",
        TokenKind::KwLet => "'let'",
        TokenKind::KwIf => "'if'",
        TokenKind::KwSwitch => "'switch'",
        TokenKind::KwCase => "'case'",
        TokenKind::KwDefault => "'default'",
        TokenKind::KwFor => "'for'",
        TokenKind::KwBreak => "'break'",
        TokenKind::KwContinue => "'continue'",
        TokenKind::KwLeave => "'leave'",
        TokenKind::KwTrue => "'true'",
        TokenKind::KwFalse => "'false'",
        TokenKind::Arrow => "'->'",
        TokenKind::ColonEq => "':='",
        TokenKind::Colon => "':'",
        TokenKind::Comma => "','",
        TokenKind::LParen => "'('",
        TokenKind::RParen => "')'",
        TokenKind::LBrace => "'{'",
        TokenKind::RBrace => "'}'",
        TokenKind::Eof => "end of input",
        TokenKind::Ident(name) => return format!("identifier '{name}'"),
        TokenKind::Number(text) => return format!("number {text}"),
        TokenKind::String(_) => "string literal",
    };
    fixed.to_string()
}

#[cfg(test)]
mod tests {
	use super::*;
	use yul_ast::span_between;

	#[test]
	fn tokens_are_described_by_their_spelling() {
		assert_eq!(describe(&TokenKind::ColonEq), "':='");
		assert_eq!(describe(&TokenKind::Ident("x_1".to_string())), "identifier 'x_1'");
		assert_eq!(describe(&TokenKind::Eof), "end of input");
	}

	#[test]
	fn expected_errors_remember_the_found_token() {
		let err = ParseError::expected("'{'", &TokenKind::Number("7".to_string()), span_between(3, 4));
		assert_eq!(err.to_string(), "parse error: expected '{'");
		assert_eq!(err.found.as_deref(), Some("found number 7"));
	}
}
