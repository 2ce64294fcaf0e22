#![forbid(unsafe_code)]

mod interpreter;
mod state;
mod word;

pub use interpreter::{ExecError, ExecOutcome, Interpreter, InterpreterTerminated, Termination};
pub use state::{dump, InterpreterState};
pub use word::Word;

use yul_ast::Block;

/// Runs `ast` against `state`. Termination through `stop`, `return`, `revert`,
/// `invalid` or an exhausted budget is an outcome, not an error.
pub fn interpret(ast: &Block, state: &mut InterpreterState) -> Result<ExecOutcome, ExecError> {
    Interpreter::new(state).run(ast)
}

/// Parses and runs `source`, returning the final state.
pub fn interpret_source(source: &str) -> miette::Result<(InterpreterState, ExecOutcome)> {
    let ast = yul_parse::parse_source(source)?;
    let mut state = InterpreterState::new();
    let outcome = interpret(&ast, &mut state)?;
    Ok((state, outcome))
}
