#![forbid(unsafe_code)]
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;
use yul_ast::{Name, Span};

#[derive(Debug, Error, Diagnostic)]
pub enum OptimizerError {
    /// Every suffixed candidate for `name` is already reserved in its scope.
    #[error("internal error: exhausted suffixes while looking for a clean name for '{name}'")]
    #[diagnostic(code(yul::opt::suffix_exhausted))]
    SuffixExhausted {
        name: Name,
        #[label("declared here")]
        span: Span,
    },
}
