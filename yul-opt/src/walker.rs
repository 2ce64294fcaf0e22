#![forbid(unsafe_code)]

//! Tree traversal for optimiser passes.
//!
//! `AstModifier` walks a tree mutably and may fail with the pass's own error
//! type; `AstWalker` is the read-only counterpart. Every `visit_*` method
//! defaults to the matching `walk_*` function, so a pass overrides only the
//! node kinds it cares about and calls `walk_*` to keep recursing.

use yul_ast::{
    Assignment, Block, Case, Expression, ForLoop, FunctionCall, FunctionDefinition, Identifier,
    If, Statement, Switch, VariableDeclaration,
};

pub trait AstModifier: Sized {
    type Error;

    fn visit_block(&mut self, block: &mut Block) -> Result<(), Self::Error> {
        walk_block(self, block)
    }

    fn visit_statement(&mut self, stmt: &mut Statement) -> Result<(), Self::Error> {
        walk_statement(self, stmt)
    }

    fn visit_function_definition(
        &mut self,
        fun: &mut FunctionDefinition,
    ) -> Result<(), Self::Error> {
        walk_function_definition(self, fun)
    }

    fn visit_variable_declaration(
        &mut self,
        decl: &mut VariableDeclaration,
    ) -> Result<(), Self::Error> {
        walk_variable_declaration(self, decl)
    }

    fn visit_assignment(&mut self, assignment: &mut Assignment) -> Result<(), Self::Error> {
        walk_assignment(self, assignment)
    }

    fn visit_if(&mut self, stmt: &mut If) -> Result<(), Self::Error> {
        walk_if(self, stmt)
    }

    fn visit_switch(&mut self, stmt: &mut Switch) -> Result<(), Self::Error> {
        walk_switch(self, stmt)
    }

    fn visit_for_loop(&mut self, stmt: &mut ForLoop) -> Result<(), Self::Error> {
        walk_for_loop(self, stmt)
    }

    fn visit_expression(&mut self, expr: &mut Expression) -> Result<(), Self::Error> {
        walk_expression(self, expr)
    }

    fn visit_function_call(&mut self, call: &mut FunctionCall) -> Result<(), Self::Error> {
        walk_function_call(self, call)
    }

    /// Variable references: expression uses and assignment targets.
    fn visit_identifier(&mut self, _id: &mut Identifier) -> Result<(), Self::Error> {
        Ok(())
    }
}

pub fn walk_block<M: AstModifier>(m: &mut M, block: &mut Block) -> Result<(), M::Error> {
    for stmt in &mut block.statements {
        m.visit_statement(stmt)?;
    }
    Ok(())
}

pub fn walk_statement<M: AstModifier>(m: &mut M, stmt: &mut Statement) -> Result<(), M::Error> {
    match stmt {
        Statement::ExpressionStatement(s) => m.visit_expression(&mut s.expression),
        Statement::Assignment(s) => m.visit_assignment(s),
        Statement::VariableDeclaration(s) => m.visit_variable_declaration(s),
        Statement::FunctionDefinition(s) => m.visit_function_definition(s),
        Statement::If(s) => m.visit_if(s),
        Statement::Switch(s) => m.visit_switch(s),
        Statement::ForLoop(s) => m.visit_for_loop(s),
        Statement::Break(_) | Statement::Continue(_) | Statement::Leave(_) => Ok(()),
        Statement::Block(b) => m.visit_block(b),
    }
}

/// Parameters and return variables are bindings, not references; only the body is walked.
pub fn walk_function_definition<M: AstModifier>(
    m: &mut M,
    fun: &mut FunctionDefinition,
) -> Result<(), M::Error> {
    m.visit_block(&mut fun.body)
}

pub fn walk_variable_declaration<M: AstModifier>(
    m: &mut M,
    decl: &mut VariableDeclaration,
) -> Result<(), M::Error> {
    match &mut decl.value {
        Some(value) => m.visit_expression(value),
        None => Ok(()),
    }
}

pub fn walk_assignment<M: AstModifier>(
    m: &mut M,
    assignment: &mut Assignment,
) -> Result<(), M::Error> {
    for id in &mut assignment.variable_names {
        m.visit_identifier(id)?;
    }
    m.visit_expression(&mut assignment.value)
}

pub fn walk_if<M: AstModifier>(m: &mut M, stmt: &mut If) -> Result<(), M::Error> {
    m.visit_expression(&mut stmt.condition)?;
    m.visit_block(&mut stmt.body)
}

pub fn walk_switch<M: AstModifier>(m: &mut M, stmt: &mut Switch) -> Result<(), M::Error> {
    m.visit_expression(&mut stmt.expression)?;
    for Case { body, .. } in &mut stmt.cases {
        m.visit_block(body)?;
    }
    Ok(())
}

pub fn walk_for_loop<M: AstModifier>(m: &mut M, stmt: &mut ForLoop) -> Result<(), M::Error> {
    m.visit_block(&mut stmt.pre)?;
    m.visit_expression(&mut stmt.condition)?;
    m.visit_block(&mut stmt.post)?;
    m.visit_block(&mut stmt.body)
}

pub fn walk_expression<M: AstModifier>(m: &mut M, expr: &mut Expression) -> Result<(), M::Error> {
    match expr {
        Expression::Literal(_) => Ok(()),
        Expression::Identifier(id) => m.visit_identifier(id),
        Expression::FunctionCall(call) => m.visit_function_call(call),
    }
}

/// Arguments are visited right to left, in evaluation order. The callee is not a variable.
pub fn walk_function_call<M: AstModifier>(
    m: &mut M,
    call: &mut FunctionCall,
) -> Result<(), M::Error> {
    for arg in call.arguments.iter_mut().rev() {
        m.visit_expression(arg)?;
    }
    Ok(())
}

pub trait AstWalker: Sized {
    fn visit_block(&mut self, block: &Block) {
        for stmt in &block.statements {
            self.visit_statement(stmt);
        }
    }

    fn visit_statement(&mut self, stmt: &Statement) {
        walk_statement_ref(self, stmt);
    }

    fn visit_function_definition(&mut self, fun: &FunctionDefinition) {
        self.visit_block(&fun.body);
    }

    fn visit_variable_declaration(&mut self, decl: &VariableDeclaration) {
        if let Some(value) = &decl.value {
            self.visit_expression(value);
        }
    }

    fn visit_expression(&mut self, expr: &Expression) {
        match expr {
            Expression::Literal(_) => {}
            Expression::Identifier(id) => self.visit_identifier(id),
            Expression::FunctionCall(call) => {
                for arg in call.arguments.iter().rev() {
                    self.visit_expression(arg);
                }
            }
        }
    }

    fn visit_identifier(&mut self, _id: &Identifier) {}
}

pub fn walk_statement_ref<W: AstWalker>(w: &mut W, stmt: &Statement) {
    match stmt {
        Statement::ExpressionStatement(s) => w.visit_expression(&s.expression),
        Statement::Assignment(s) => {
            for id in &s.variable_names {
                w.visit_identifier(id);
            }
            w.visit_expression(&s.value);
        }
        Statement::VariableDeclaration(s) => w.visit_variable_declaration(s),
        Statement::FunctionDefinition(s) => w.visit_function_definition(s),
        Statement::If(s) => {
            w.visit_expression(&s.condition);
            w.visit_block(&s.body);
        }
        Statement::Switch(s) => {
            w.visit_expression(&s.expression);
            for case in &s.cases {
                w.visit_block(&case.body);
            }
        }
        Statement::ForLoop(s) => {
            w.visit_block(&s.pre);
            w.visit_expression(&s.condition);
            w.visit_block(&s.post);
            w.visit_block(&s.body);
        }
        Statement::Break(_) | Statement::Continue(_) | Statement::Leave(_) => {}
        Statement::Block(b) => w.visit_block(b),
    }
}
