#![forbid(unsafe_code)]

use yul_ast::{
    Block, Case, Expression, FunctionCall, Literal, LiteralKind, Statement, TypedName,
};

const INDENT: &str = "    ";

/// Canonical text of a program: one statement per line, blocks indented by four spaces.
pub fn format_block(block: &Block) -> String {
    let mut out = String::new();
    fmt_block(&mut out, 0, block);
    out.push('\n');
    out
}

pub fn format_expr(expr: &Expression) -> String {
    let mut out = String::new();
    fmt_expr(&mut out, expr);
    out
}

fn fmt_block(out: &mut String, indent: usize, block: &Block) {
    if block.statements.is_empty() {
        out.push_str("{ }");
        return;
    }
    out.push_str("{\n");
    for stmt in &block.statements {
        fmt_stmt(out, indent + 1, stmt);
    }
    indent_line(out, indent);
    out.push('}');
}

fn fmt_stmt(out: &mut String, indent: usize, stmt: &Statement) {
    indent_line(out, indent);
    match stmt {
        Statement::ExpressionStatement(s) => fmt_expr(out, &s.expression),
        Statement::Assignment(s) => {
            for (i, id) in s.variable_names.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(id.name.as_str());
            }
            out.push_str(" := ");
            fmt_expr(out, &s.value);
        }
        Statement::VariableDeclaration(s) => {
            out.push_str("let ");
            fmt_typed_names(out, &s.variables);
            if let Some(value) = &s.value {
                out.push_str(" := ");
                fmt_expr(out, value);
            }
        }
        Statement::FunctionDefinition(s) => {
            out.push_str("function ");
            out.push_str(s.name.as_str());
            out.push('(');
            fmt_typed_names(out, &s.parameters);
            out.push(')');
            if !s.returns.is_empty() {
                out.push_str(" -> ");
                fmt_typed_names(out, &s.returns);
            }
            out.push(' ');
            fmt_block(out, indent, &s.body);
        }
        Statement::If(s) => {
            out.push_str("if ");
            fmt_expr(out, &s.condition);
            out.push(' ');
            fmt_block(out, indent, &s.body);
        }
        Statement::Switch(s) => {
            out.push_str("switch ");
            fmt_expr(out, &s.expression);
            for case in &s.cases {
                out.push('\n');
                indent_line(out, indent);
                fmt_case(out, indent, case);
            }
        }
        Statement::ForLoop(s) => {
            out.push_str("for ");
            fmt_block(out, indent, &s.pre);
            out.push(' ');
            fmt_expr(out, &s.condition);
            out.push(' ');
            fmt_block(out, indent, &s.post);
            out.push(' ');
            fmt_block(out, indent, &s.body);
        }
        Statement::Break(_) => out.push_str("break"),
        Statement::Continue(_) => out.push_str("continue"),
        Statement::Leave(_) => out.push_str("leave"),
        Statement::Block(b) => fmt_block(out, indent, b),
    }
    out.push('\n');
}

fn fmt_case(out: &mut String, indent: usize, case: &Case) {
    match &case.value {
        Some(value) => {
            out.push_str("case ");
            fmt_literal(out, value);
        }
        None => out.push_str("default"),
    }
    out.push(' ');
    fmt_block(out, indent, &case.body);
}

fn fmt_typed_names(out: &mut String, names: &[TypedName]) {
    for (i, n) in names.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(n.name.as_str());
        if let Some(ty) = &n.ty {
            out.push(':');
            out.push_str(ty.as_str());
        }
    }
}

fn fmt_expr(out: &mut String, expr: &Expression) {
    match expr {
        Expression::Literal(l) => fmt_literal(out, l),
        Expression::Identifier(id) => out.push_str(id.name.as_str()),
        Expression::FunctionCall(call) => fmt_call(out, call),
    }
}

fn fmt_call(out: &mut String, call: &FunctionCall) {
    out.push_str(call.function_name.name.as_str());
    out.push('(');
    for (i, a) in call.arguments.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        fmt_expr(out, a);
    }
    out.push(')');
}

fn fmt_literal(out: &mut String, lit: &Literal) {
    match lit.kind {
        LiteralKind::Number | LiteralKind::Boolean => out.push_str(&lit.value),
        LiteralKind::String => {
            out.push('"');
            for c in lit.value.chars() {
                match c {
                    '"' => out.push_str("\\\""),
                    '\\' => out.push_str("\\\\"),
                    '\n' => out.push_str("\\n"),
                    '\t' => out.push_str("\\t"),
                    '\r' => out.push_str("\\r"),
                    c if (c as u32) < 0x20 || (0x7f..0x100).contains(&(c as u32)) => {
                        out.push_str(&format!("\\x{:02x}", c as u32));
                    }
                    c => out.push(c),
                }
            }
            out.push('"');
        }
    }
    if let Some(ty) = &lit.ty {
        out.push(':');
        out.push_str(ty.as_str());
    }
}

fn indent_line(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str(INDENT);
    }
}
