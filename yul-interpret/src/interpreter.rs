#![forbid(unsafe_code)]
#![allow(unused_assignments)]

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, trace};
use yul_ast::{
    Block, Dialect, EvmDialect, Expression, ForLoop, FunctionCall, FunctionDefinition, Literal,
    LiteralKind, Name, Span, Statement, Switch,
};

use crate::state::InterpreterState;
use crate::word::{Word, WORD_BYTES};

const MAX_CALL_DEPTH: usize = 64;

#[derive(Debug, Error, Diagnostic)]
#[error("interpreter error: {message}")]
#[diagnostic(code(yul::interpret))]
pub struct ExecError {
    pub message: String,
    #[label]
    pub span: Span,
}

/// Why a run stopped before the end of the program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    Stop,
    Return,
    Revert,
    Invalid,
    TraceLimit,
    StepLimit,
    MemoryLimit,
    CallDepthLimit,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Termination::Stop => "stop",
            Termination::Return => "return",
            Termination::Revert => "revert",
            Termination::Invalid => "invalid",
            Termination::TraceLimit => "trace size limit reached",
            Termination::StepLimit => "step limit reached",
            Termination::MemoryLimit => "memory limit exceeded",
            Termination::CallDepthLimit => "call depth limit reached",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Error, Diagnostic)]
#[error("interpreter terminated: {reason}")]
#[diagnostic(code(yul::interpret::terminated))]
pub struct InterpreterTerminated {
    pub reason: Termination,
}

#[derive(Debug)]
pub enum ExecOutcome {
    Completed,
    Terminated(InterpreterTerminated),
}

impl ExecOutcome {
    pub fn termination(&self) -> Option<Termination> {
        match self {
            ExecOutcome::Completed => None,
            ExecOutcome::Terminated(t) => Some(t.reason),
        }
    }
}

enum Interrupt {
    Terminated(Termination),
    Error(ExecError),
}

impl From<ExecError> for Interrupt {
    fn from(err: ExecError) -> Self {
        Interrupt::Error(err)
    }
}

type Exec<T> = Result<T, Interrupt>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Default,
    Break,
    Continue,
    Leave,
}

/// Functions declared in one block, chained to the enclosing blocks.
struct FunctionScope<'a> {
    functions: HashMap<Name, &'a FunctionDefinition>,
    parent: Option<Rc<FunctionScope<'a>>>,
}

fn find_function<'a>(
    mut scope: Option<&Rc<FunctionScope<'a>>>,
    name: &Name,
) -> Option<(&'a FunctionDefinition, Rc<FunctionScope<'a>>)> {
    while let Some(current) = scope {
        if let Some(fun) = current.functions.get(name) {
            return Some((*fun, Rc::clone(current)));
        }
        scope = current.parent.as_ref();
    }
    None
}

fn error(message: impl Into<String>, span: Span) -> Interrupt {
    Interrupt::Error(ExecError {
        message: message.into(),
        span,
    })
}

/// Tree-walking EVM-flavoured interpreter recording side effects into an `InterpreterState`.
pub struct Interpreter<'a> {
    state: &'a mut InterpreterState,
    dialect: EvmDialect,
    /// Block scopes of the current function frame, innermost last.
    variables: Vec<HashMap<Name, Word>>,
    functions: Option<Rc<FunctionScope<'a>>>,
    call_depth: usize,
}

impl<'a> Interpreter<'a> {
    pub fn new(state: &'a mut InterpreterState) -> Self {
        Self {
            state,
            dialect: EvmDialect::strict_assembly(),
            variables: Vec::new(),
            functions: None,
            call_depth: 0,
        }
    }

    pub fn run(&mut self, ast: &'a Block) -> Result<ExecOutcome, ExecError> {
        match self.exec_block(ast) {
            Ok(_) => Ok(ExecOutcome::Completed),
            Err(Interrupt::Terminated(reason)) => {
                debug!(%reason, steps = self.state.steps, "interpreter terminated");
                Ok(ExecOutcome::Terminated(InterpreterTerminated { reason }))
            }
            Err(Interrupt::Error(err)) => Err(err),
        }
    }

    fn step(&mut self) -> Exec<()> {
        self.state.steps += 1;
        if self.state.steps > self.state.max_steps {
            return Err(Interrupt::Terminated(Termination::StepLimit));
        }
        Ok(())
    }

    fn log_trace(&mut self, name: &str, args: &[Word]) -> Exec<()> {
        let args: Vec<String> = args.iter().map(Word::to_string).collect();
        self.state
            .trace
            .push(format!("{}({})", name.to_ascii_uppercase(), args.join(", ")));
        if self.state.trace.len() >= self.state.max_trace_size {
            return Err(Interrupt::Terminated(Termination::TraceLimit));
        }
        Ok(())
    }

    fn exec_block(&mut self, block: &'a Block) -> Exec<Flow> {
        self.variables.push(HashMap::new());
        let saved_functions = self.functions.clone();
        let result = self
            .hoist_functions(block)
            .and_then(|()| self.exec_statements(&block.statements));
        self.functions = saved_functions;
        self.variables.pop();
        result
    }

    fn hoist_functions(&mut self, block: &'a Block) -> Exec<()> {
        let mut functions = HashMap::new();
        for stmt in &block.statements {
            if let Statement::FunctionDefinition(fun) = stmt {
                if functions.insert(fun.name.clone(), fun).is_some() {
                    return Err(error(
                        format!("function '{}' is defined twice in the same block", fun.name),
                        fun.span,
                    ));
                }
            }
        }
        if !functions.is_empty() {
            self.functions = Some(Rc::new(FunctionScope {
                functions,
                parent: self.functions.take(),
            }));
        }
        Ok(())
    }

    fn exec_statements(&mut self, statements: &'a [Statement]) -> Exec<Flow> {
        for stmt in statements {
            let flow = self.exec_statement(stmt)?;
            if flow != Flow::Default {
                return Ok(flow);
            }
        }
        Ok(Flow::Default)
    }

    fn exec_statement(&mut self, stmt: &'a Statement) -> Exec<Flow> {
        self.step()?;
        match stmt {
            Statement::ExpressionStatement(s) => {
                let values = self.eval(&s.expression)?;
                if !values.is_empty() {
                    return Err(error(
                        format!("expression statement discards {} value(s)", values.len()),
                        s.span,
                    ));
                }
                Ok(Flow::Default)
            }
            Statement::Assignment(s) => {
                let values = self.eval(&s.value)?;
                if values.len() != s.variable_names.len() {
                    return Err(error(
                        format!(
                            "assignment to {} variable(s) from {} value(s)",
                            s.variable_names.len(),
                            values.len()
                        ),
                        s.span,
                    ));
                }
                for (id, value) in s.variable_names.iter().zip(values) {
                    let slot = self
                        .variables
                        .iter_mut()
                        .rev()
                        .find_map(|scope| scope.get_mut(&id.name))
                        .ok_or_else(|| {
                            error(format!("assignment to undeclared variable '{}'", id.name), id.span)
                        })?;
                    *slot = value;
                }
                Ok(Flow::Default)
            }
            Statement::VariableDeclaration(s) => {
                let values = match &s.value {
                    Some(value) => self.eval(value)?,
                    None => vec![Word::zero(); s.variables.len()],
                };
                if values.len() != s.variables.len() {
                    return Err(error(
                        format!(
                            "declaration of {} variable(s) from {} value(s)",
                            s.variables.len(),
                            values.len()
                        ),
                        s.span,
                    ));
                }
                for (binding, value) in s.variables.iter().zip(values) {
                    self.declare(binding.name.clone(), value);
                }
                Ok(Flow::Default)
            }
            // Hoisted when the enclosing block was entered.
            Statement::FunctionDefinition(_) => Ok(Flow::Default),
            Statement::If(s) => {
                if self.eval_single(&s.condition)?.is_zero() {
                    Ok(Flow::Default)
                } else {
                    self.exec_block(&s.body)
                }
            }
            Statement::Switch(s) => self.exec_switch(s),
            Statement::ForLoop(s) => self.exec_for(s),
            Statement::Break(_) => Ok(Flow::Break),
            Statement::Continue(_) => Ok(Flow::Continue),
            Statement::Leave(_) => Ok(Flow::Leave),
            Statement::Block(b) => self.exec_block(b),
        }
    }

    fn declare(&mut self, name: Name, value: Word) {
        if let Some(scope) = self.variables.last_mut() {
            scope.insert(name, value);
        }
    }

    fn exec_switch(&mut self, stmt: &'a Switch) -> Exec<Flow> {
        let selector = self.eval_single(&stmt.expression)?;
        for case in &stmt.cases {
            let matches = match &case.value {
                Some(value) => literal_value(value)? == selector,
                None => true,
            };
            if matches {
                return self.exec_block(&case.body);
            }
        }
        Ok(Flow::Default)
    }

    fn exec_for(&mut self, stmt: &'a ForLoop) -> Exec<Flow> {
        // Variables of the init block stay visible in condition, body and post.
        self.variables.push(HashMap::new());
        let saved_functions = self.functions.clone();
        let result = self.exec_for_in_scope(stmt);
        self.functions = saved_functions;
        self.variables.pop();
        result
    }

    fn exec_for_in_scope(&mut self, stmt: &'a ForLoop) -> Exec<Flow> {
        self.hoist_functions(&stmt.pre)?;
        let flow = self.exec_statements(&stmt.pre.statements)?;
        if flow != Flow::Default {
            return Ok(flow);
        }

        loop {
            self.step()?;
            if self.eval_single(&stmt.condition)?.is_zero() {
                break;
            }
            match self.exec_block(&stmt.body)? {
                Flow::Break => break,
                Flow::Leave => return Ok(Flow::Leave),
                Flow::Default | Flow::Continue => {}
            }
            if self.exec_block(&stmt.post)? == Flow::Leave {
                return Ok(Flow::Leave);
            }
        }
        Ok(Flow::Default)
    }

    fn eval_single(&mut self, expr: &'a Expression) -> Exec<Word> {
        match <[Word; 1]>::try_from(self.eval(expr)?) {
            Ok([value]) => Ok(value),
            Err(values) => Err(error(
                format!("expected a single value, got {}", values.len()),
                expr.span(),
            )),
        }
    }

    fn eval(&mut self, expr: &'a Expression) -> Exec<Vec<Word>> {
        match expr {
            Expression::Literal(lit) => Ok(vec![literal_value(lit)?]),
            Expression::Identifier(id) => self
                .variables
                .iter()
                .rev()
                .find_map(|scope| scope.get(&id.name))
                .map(|value| vec![value.clone()])
                .ok_or_else(|| error(format!("undeclared variable '{}'", id.name), id.span)),
            Expression::FunctionCall(call) => self.eval_call(call),
        }
    }

    fn eval_call(&mut self, call: &'a FunctionCall) -> Exec<Vec<Word>> {
        // Arguments are evaluated right to left.
        let mut args = Vec::with_capacity(call.arguments.len());
        for arg in call.arguments.iter().rev() {
            args.push(self.eval_single(arg)?);
        }
        args.reverse();

        let name = &call.function_name.name;
        if let Some(builtin) = self.dialect.builtin(name) {
            if builtin.parameters != args.len() {
                return Err(error(
                    format!(
                        "builtin '{name}' expects {} argument(s), got {}",
                        builtin.parameters,
                        args.len()
                    ),
                    call.span,
                ));
            }
            return self.call_builtin(name.as_str(), &args, call.span);
        }

        let Some((fun, scope)) = find_function(self.functions.as_ref(), name) else {
            return Err(error(format!("call to undefined function '{name}'"), call.function_name.span));
        };
        if fun.parameters.len() != args.len() {
            return Err(error(
                format!(
                    "function '{name}' expects {} argument(s), got {}",
                    fun.parameters.len(),
                    args.len()
                ),
                call.span,
            ));
        }
        self.call_function(fun, scope, args)
    }

    fn call_function(
        &mut self,
        fun: &'a FunctionDefinition,
        scope: Rc<FunctionScope<'a>>,
        args: Vec<Word>,
    ) -> Exec<Vec<Word>> {
        self.step()?;
        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(Interrupt::Terminated(Termination::CallDepthLimit));
        }
        trace!(function = %fun.name, depth = self.call_depth, "call");

        let mut frame = HashMap::new();
        for (param, arg) in fun.parameters.iter().zip(args) {
            frame.insert(param.name.clone(), arg);
        }
        for ret in &fun.returns {
            frame.insert(ret.name.clone(), Word::zero());
        }

        let caller_variables = std::mem::replace(&mut self.variables, vec![frame]);
        let caller_functions = std::mem::replace(&mut self.functions, Some(scope));
        self.call_depth += 1;

        let result = self.exec_block(&fun.body);

        self.call_depth -= 1;
        self.functions = caller_functions;
        let callee_variables = std::mem::replace(&mut self.variables, caller_variables);
        result?;

        let frame = callee_variables.into_iter().next().unwrap_or_default();
        Ok(fun
            .returns
            .iter()
            .map(|ret| frame.get(&ret.name).cloned().unwrap_or_default())
            .collect())
    }

    fn call_builtin(&mut self, name: &str, args: &[Word], span: Span) -> Exec<Vec<Word>> {
        let a = move |i: usize| &args[i];
        let value = match name {
            "add" => a(0).add(a(1)),
            "sub" => a(0).sub(a(1)),
            "mul" => a(0).mul(a(1)),
            "div" => a(0).div(a(1)),
            "sdiv" => a(0).sdiv(a(1)),
            "mod" => a(0).rem(a(1)),
            "smod" => a(0).srem(a(1)),
            "exp" => a(0).exp(a(1)),
            "addmod" => a(0).addmod(a(1), a(2)),
            "mulmod" => a(0).mulmod(a(1), a(2)),
            "signextend" => a(0).signextend(a(1)),
            "not" => a(0).not(),
            "lt" => a(0).lt(a(1)),
            "gt" => a(0).gt(a(1)),
            "slt" => a(0).slt(a(1)),
            "sgt" => a(0).sgt(a(1)),
            "eq" => a(0).eq_word(a(1)),
            "iszero" => a(0).iszero(),
            "and" => a(0).and(a(1)),
            "or" => a(0).or(a(1)),
            "xor" => a(0).xor(a(1)),
            "byte" => a(0).byte(a(1)),
            "shl" => a(0).shl(a(1)),
            "shr" => a(0).shr(a(1)),
            "sar" => a(0).sar(a(1)),
            "pop" => return Ok(Vec::new()),
            "mload" => {
                let offset = self.touch_memory(a(0), &Word::from(WORD_BYTES as u64))?;
                Word::from_be_bytes(&self.state.memory[offset..offset + WORD_BYTES])
            }
            "mstore" => {
                let offset = self.touch_memory(a(0), &Word::from(WORD_BYTES as u64))?;
                self.state.memory[offset..offset + WORD_BYTES].copy_from_slice(&a(1).to_be_bytes());
                self.log_trace(name, args)?;
                return Ok(Vec::new());
            }
            "mstore8" => {
                let offset = self.touch_memory(a(0), &Word::one())?;
                self.state.memory[offset] = a(1).to_be_bytes()[WORD_BYTES - 1];
                self.log_trace(name, args)?;
                return Ok(Vec::new());
            }
            "msize" => Word::from(self.state.memory.len() as u64),
            "sload" => self.state.storage.get(a(0)).cloned().unwrap_or_default(),
            "sstore" => {
                self.state.storage.insert(a(0).clone(), a(1).clone());
                self.log_trace(name, args)?;
                return Ok(Vec::new());
            }
            "calldataload" | "calldatasize" => Word::zero(),
            "log0" | "log1" | "log2" => {
                self.touch_memory(a(0), a(1))?;
                self.log_trace(name, args)?;
                return Ok(Vec::new());
            }
            "return" | "revert" => {
                self.touch_memory(a(0), a(1))?;
                self.log_trace(name, args)?;
                let reason = if name == "return" {
                    Termination::Return
                } else {
                    Termination::Revert
                };
                return Err(Interrupt::Terminated(reason));
            }
            "stop" => {
                self.log_trace(name, args)?;
                return Err(Interrupt::Terminated(Termination::Stop));
            }
            "invalid" => {
                self.log_trace(name, args)?;
                return Err(Interrupt::Terminated(Termination::Invalid));
            }
            other => return Err(error(format!("builtin '{other}' is not supported"), span)),
        };
        Ok(vec![value])
    }

    /// Grows memory to cover `offset..offset + size` and returns `offset` as an index.
    fn touch_memory(&mut self, offset: &Word, size: &Word) -> Exec<usize> {
        if size.is_zero() {
            return Ok(0);
        }
        let limit = || Interrupt::Terminated(Termination::MemoryLimit);
        let (Some(offset), Some(size)) = (offset.to_u64(), size.to_u64()) else {
            return Err(limit());
        };
        let end = offset
            .checked_add(size)
            .filter(|end| *end <= self.state.max_memory)
            .ok_or_else(limit)?;
        let end = usize::try_from(end).map_err(|_| limit())?;
        let offset = usize::try_from(offset).map_err(|_| limit())?;

        let rounded = end.div_ceil(WORD_BYTES) * WORD_BYTES;
        if rounded > self.state.memory.len() {
            self.state.memory.resize(rounded, 0);
        }
        Ok(offset)
    }
}

fn literal_value(lit: &Literal) -> Result<Word, ExecError> {
    match lit.kind {
        LiteralKind::Boolean => Ok(Word::from_bool(lit.value == "true")),
        LiteralKind::String => Ok(Word::from_string_literal(&lit.value)),
        LiteralKind::Number => Word::parse_number(&lit.value).ok_or_else(|| ExecError {
            message: format!("number literal '{}' does not fit in 256 bits", lit.value),
            span: lit.span,
        }),
    }
}
