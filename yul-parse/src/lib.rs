#![forbid(unsafe_code)]

mod error;
mod fmt;
mod parser;

use miette::IntoDiagnostic;
use yul_lex::Lexer;

pub use error::ParseError;
pub use fmt::{format_block, format_expr};
pub use parser::Parser;

/// Parse a whole program; the root of a program is a block.
pub fn parse_source(src: &str) -> miette::Result<yul_ast::Block> {
    let tokens = Lexer::new(src).lex().into_diagnostic()?;
    let mut parser = Parser::new(&tokens);
    parser.parse_program().into_diagnostic()
}

pub fn parse_expr(src: &str) -> miette::Result<yul_ast::Expression> {
    let tokens = Lexer::new(src).lex().into_diagnostic()?;
    let mut parser = Parser::new(&tokens);
    parser.parse_expr_eof().into_diagnostic()
}
