#![forbid(unsafe_code)]

use std::mem;

use yul_ast::{
    span_between, Assignment, Block, Break, Case, Continue, Expression, ExpressionStatement,
    ForLoop, FunctionCall, FunctionDefinition, Identifier, If, Leave, Literal, LiteralKind, Name,
    Span, Statement, Switch, TypedName, VariableDeclaration,
};
use yul_lex::{Token, TokenKind};

use crate::error::{describe, ParseError};

pub struct Parser<'a> {
    tokens: &'a [Token],
    idx: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, idx: 0 }
    }

    pub fn parse_program(&mut self) -> Result<Block, ParseError> {
        let block = self.parse_block()?;
        if !self.at(TokenKind::Eof) {
            return Err(ParseError::new(
                "unexpected tokens after the program block",
                self.peek_span().unwrap_or_else(|| span_between(0, 0)),
            ));
        }
        Ok(block)
    }

    pub fn parse_block(&mut self) -> Result<Block, ParseError> {
        let open = self.expect(TokenKind::LBrace)?;
        let mut statements = Vec::new();
        while !self.at(TokenKind::RBrace) {
            if self.at(TokenKind::Eof) {
                return Err(ParseError::new("unterminated block: expected '}'", open.span));
            }
            statements.push(self.parse_stmt()?);
        }
        let close = self.expect(TokenKind::RBrace)?;
        Ok(Block {
            span: join(open.span, close.span),
            statements,
        })
    }

    fn parse_stmt(&mut self) -> Result<Statement, ParseError> {
        match self.peek_kind() {
            Some(TokenKind::LBrace) => Ok(Statement::Block(self.parse_block()?)),
            Some(TokenKind::KwFunction) => {
                Ok(Statement::FunctionDefinition(self.parse_function_definition()?))
            }
            Some(TokenKind::KwLet) => {
                Ok(Statement::VariableDeclaration(self.parse_variable_declaration()?))
            }
            Some(TokenKind::KwIf) => Ok(Statement::If(self.parse_if()?)),
            Some(TokenKind::KwSwitch) => Ok(Statement::Switch(self.parse_switch()?)),
            Some(TokenKind::KwFor) => Ok(Statement::ForLoop(self.parse_for_loop()?)),
            Some(TokenKind::KwBreak) => {
                let tok = self.expect(TokenKind::KwBreak)?;
                Ok(Statement::Break(Break { span: tok.span }))
            }
            Some(TokenKind::KwContinue) => {
                let tok = self.expect(TokenKind::KwContinue)?;
                Ok(Statement::Continue(Continue { span: tok.span }))
            }
            Some(TokenKind::KwLeave) => {
                let tok = self.expect(TokenKind::KwLeave)?;
                Ok(Statement::Leave(Leave { span: tok.span }))
            }
            Some(TokenKind::Ident(_)) => match self.peek_kind_n(1) {
                Some(TokenKind::Comma) | Some(TokenKind::ColonEq) => {
                    Ok(Statement::Assignment(self.parse_assignment()?))
                }
                Some(TokenKind::LParen) => {
                    let call = self.parse_function_call()?;
                    Ok(Statement::ExpressionStatement(ExpressionStatement {
                        span: call.span,
                        expression: Expression::FunctionCall(call),
                    }))
                }
                _ => Err(self.expected_here("an assignment or a function call")),
            },
            _ => Err(self.expected_here("a statement")),
        }
    }

    fn parse_function_definition(&mut self) -> Result<FunctionDefinition, ParseError> {
        let kw = self.expect(TokenKind::KwFunction)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;
        let parameters = if self.at(TokenKind::RParen) {
            Vec::new()
        } else {
            self.parse_typed_name_list()?
        };
        self.expect(TokenKind::RParen)?;
        let returns = if self.at(TokenKind::Arrow) {
            self.next();
            self.parse_typed_name_list()?
        } else {
            Vec::new()
        };
        let body = self.parse_block()?;
        Ok(FunctionDefinition {
            span: join(kw.span, body.span),
            name: name.name,
            parameters,
            returns,
            body,
        })
    }

    fn parse_variable_declaration(&mut self) -> Result<VariableDeclaration, ParseError> {
        let kw = self.expect(TokenKind::KwLet)?;
        let variables = self.parse_typed_name_list()?;
        let mut span = join(kw.span, variables.last().map_or(kw.span, |v| v.span));
        let value = if self.at(TokenKind::ColonEq) {
            self.next();
            let value = self.parse_expr()?;
            span = join(span, value.span());
            Some(value)
        } else {
            None
        };
        Ok(VariableDeclaration {
            span,
            variables,
            value,
        })
    }

    fn parse_assignment(&mut self) -> Result<Assignment, ParseError> {
        let mut variable_names = vec![self.expect_ident()?];
        while self.at(TokenKind::Comma) {
            self.next();
            variable_names.push(self.expect_ident()?);
        }
        self.expect(TokenKind::ColonEq)?;
        let value = self.parse_expr()?;
        Ok(Assignment {
            span: join(variable_names[0].span, value.span()),
            variable_names,
            value,
        })
    }

    fn parse_if(&mut self) -> Result<If, ParseError> {
        let kw = self.expect(TokenKind::KwIf)?;
        let condition = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(If {
            span: join(kw.span, body.span),
            condition,
            body,
        })
    }

    fn parse_switch(&mut self) -> Result<Switch, ParseError> {
        let kw = self.expect(TokenKind::KwSwitch)?;
        let expression = self.parse_expr()?;
        let mut cases = Vec::new();
        while self.at(TokenKind::KwCase) {
            let case_kw = self.expect(TokenKind::KwCase)?;
            let value = self.parse_literal()?;
            let body = self.parse_block()?;
            cases.push(Case {
                span: join(case_kw.span, body.span),
                value: Some(value),
                body,
            });
        }
        if self.at(TokenKind::KwDefault) {
            let default_kw = self.expect(TokenKind::KwDefault)?;
            let body = self.parse_block()?;
            cases.push(Case {
                span: join(default_kw.span, body.span),
                value: None,
                body,
            });
        }
        let Some(last) = cases.last() else {
            return Err(ParseError::new("switch needs at least one 'case' or a 'default'", kw.span));
        };
        if self.at(TokenKind::KwCase) {
            return Err(ParseError::new(
                "'default' must be the last arm of a switch",
                self.peek_span().unwrap_or(last.span),
            ));
        }
        Ok(Switch {
            span: join(kw.span, last.span),
            expression,
            cases,
        })
    }

    fn parse_for_loop(&mut self) -> Result<ForLoop, ParseError> {
        let kw = self.expect(TokenKind::KwFor)?;
        let pre = self.parse_block()?;
        let condition = self.parse_expr()?;
        let post = self.parse_block()?;
        let body = self.parse_block()?;
        Ok(ForLoop {
            span: join(kw.span, body.span),
            pre,
            condition,
            post,
            body,
        })
    }

    fn parse_typed_name_list(&mut self) -> Result<Vec<TypedName>, ParseError> {
        let mut out = vec![self.parse_typed_name()?];
        while self.at(TokenKind::Comma) {
            self.next();
            out.push(self.parse_typed_name()?);
        }
        Ok(out)
    }

    fn parse_typed_name(&mut self) -> Result<TypedName, ParseError> {
        let id = self.expect_ident()?;
        let (span, ty) = match self.parse_type_annotation()? {
            Some(ty) => (join(id.span, ty.span), Some(ty.name)),
            None => (id.span, None),
        };
        Ok(TypedName {
            span,
            name: id.name,
            ty,
        })
    }

    fn parse_type_annotation(&mut self) -> Result<Option<Identifier>, ParseError> {
        if !self.at(TokenKind::Colon) {
            return Ok(None);
        }
        self.next();
        Ok(Some(self.expect_ident()?))
    }

    pub fn parse_expr(&mut self) -> Result<Expression, ParseError> {
        match self.peek_kind() {
            Some(TokenKind::Ident(_)) => {
                if self.peek_kind_n(1).is_some_and(|k| matches!(k, TokenKind::LParen)) {
                    Ok(Expression::FunctionCall(self.parse_function_call()?))
                } else {
                    Ok(Expression::Identifier(self.expect_ident()?))
                }
            }
            Some(
                TokenKind::Number(_) | TokenKind::String(_) | TokenKind::KwTrue | TokenKind::KwFalse,
            ) => Ok(Expression::Literal(self.parse_literal()?)),
            _ => Err(self.expected_here("an expression")),
        }
    }

    pub fn parse_expr_eof(&mut self) -> Result<Expression, ParseError> {
        let expr = self.parse_expr()?;
        if !self.at(TokenKind::Eof) {
            return Err(ParseError::new(
                "unexpected tokens after expression",
                self.peek_span().unwrap_or(expr.span()),
            ));
        }
        Ok(expr)
    }

    fn parse_function_call(&mut self) -> Result<FunctionCall, ParseError> {
        let function_name = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;
        let mut arguments = Vec::new();
        if !self.at(TokenKind::RParen) {
            arguments.push(self.parse_expr()?);
            while self.at(TokenKind::Comma) {
                self.next();
                arguments.push(self.parse_expr()?);
            }
        }
        let close = self.expect(TokenKind::RParen)?;
        Ok(FunctionCall {
            span: join(function_name.span, close.span),
            function_name,
            arguments,
        })
    }

    fn parse_literal(&mut self) -> Result<Literal, ParseError> {
        let tok = self.expect_any()?;
        let (kind, value) = match tok.kind {
            TokenKind::Number(n) => (LiteralKind::Number, n),
            TokenKind::String(s) => (LiteralKind::String, s),
            TokenKind::KwTrue => (LiteralKind::Boolean, "true".to_string()),
            TokenKind::KwFalse => (LiteralKind::Boolean, "false".to_string()),
            _ => {
                return Err(ParseError::new("expected a literal", tok.span));
            }
        };
        if kind == LiteralKind::String && value.len() > 32 {
            return Err(ParseError::new("string literal too long (at most 32 bytes)", tok.span));
        }
        let (span, ty) = match self.parse_type_annotation()? {
            Some(ty) => (join(tok.span, ty.span), Some(ty.name)),
            None => (tok.span, None),
        };
        Ok(Literal {
            span,
            kind,
            value,
            ty,
        })
    }

    fn expect_ident(&mut self) -> Result<Identifier, ParseError> {
        let tok = self.expect_any()?;
        match tok.kind {
            TokenKind::Ident(name) => Ok(Identifier {
                span: tok.span,
                name: Name::from(name),
            }),
            other => Err(ParseError::expected("an identifier", &other, tok.span)),
        }
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token, ParseError> {
        let tok = self.expect_any()?;
        if mem::discriminant(&tok.kind) == mem::discriminant(&expected) {
            Ok(tok)
        } else {
            Err(ParseError::expected(&describe(&expected), &tok.kind, tok.span))
        }
    }

    fn expected_here(&self, what: &str) -> ParseError {
        match self.tokens.get(self.idx) {
            Some(tok) => ParseError::expected(what, &tok.kind, tok.span),
            None => ParseError::new(format!("expected {what}"), span_between(0, 0)),
        }
    }

    fn expect_any(&mut self) -> Result<Token, ParseError> {
        self.next().ok_or_else(|| ParseError::new("unexpected end of input", span_between(0, 0)))
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind()
            .is_some_and(|k| mem::discriminant(k) == mem::discriminant(&kind))
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.idx)?.clone();
        self.idx += 1;
        Some(tok)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.idx).map(|t| &t.kind)
    }

    fn peek_kind_n(&self, n: usize) -> Option<&TokenKind> {
        self.tokens.get(self.idx + n).map(|t| &t.kind)
    }

    fn peek_span(&self) -> Option<Span> {
        self.tokens.get(self.idx).map(|t| t.span)
    }
}

fn join(a: Span, b: Span) -> Span {
    let a0: usize = a.offset();
    let b0: usize = b.offset();
    let b1 = b0 + b.len();
    if b0 >= a0 {
        span_between(a0, b1)
    } else {
        let a1 = a0 + a.len();
        span_between(b0, a1)
    }
}
