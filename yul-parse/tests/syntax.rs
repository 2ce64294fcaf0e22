use yul_ast::{Expression, LiteralKind, Statement};
use yul_parse::{format_block, format_expr, parse_expr, parse_source, Parser};

#[test]
fn declarations_and_assignments_parse() {
    let block = parse_source("{ let x_1 := 5 x_1 := add(x_1, 1) }").expect("parse");
    assert_eq!(block.statements.len(), 2);

    let Statement::VariableDeclaration(decl) = &block.statements[0] else {
        panic!("expected a declaration, got {:?}", block.statements[0]);
    };
    assert_eq!(decl.variables[0].name, "x_1");

    let Statement::Assignment(assign) = &block.statements[1] else {
        panic!("expected an assignment, got {:?}", block.statements[1]);
    };
    assert_eq!(assign.variable_names[0].name, "x_1");
    let Expression::FunctionCall(call) = &assign.value else {
        panic!("expected a call");
    };
    assert_eq!(call.function_name.name, "add");
    assert_eq!(call.arguments.len(), 2);
}

#[test]
fn functions_with_typed_parameters_and_returns_parse() {
    let src = r#"
{
    function f(a:u256, b) -> r, s:bool {
        r := add(a, b)
        leave
    }
}
"#;
    let block = parse_source(src).expect("parse");
    let Statement::FunctionDefinition(f) = &block.statements[0] else {
        panic!("expected a function definition");
    };
    assert_eq!(f.name, "f");
    assert_eq!(f.parameters.len(), 2);
    assert_eq!(f.parameters[0].ty.as_ref().map(|t| t.as_str()), Some("u256"));
    assert_eq!(f.returns.len(), 2);
    assert_eq!(f.body.statements.len(), 2);
}

#[test]
fn control_flow_parses() {
    let src = r#"
{
    for { let i := 0 } lt(i, 10) { i := add(i, 1) } {
        if eq(i, 5) { break }
        if eq(i, 3) { continue }
    }
    switch calldatasize()
    case 0 { sstore(0, 1) }
    case "ab" { }
    default { sstore(0, 2) }
}
"#;
    let block = parse_source(src).expect("parse");
    assert!(matches!(block.statements[0], Statement::ForLoop(_)));
    let Statement::Switch(sw) = &block.statements[1] else {
        panic!("expected a switch");
    };
    assert_eq!(sw.cases.len(), 3);
    assert!(sw.cases[2].value.is_none());
    assert_eq!(
        sw.cases[1].value.as_ref().map(|l| l.kind),
        Some(LiteralKind::String)
    );
}

#[test]
fn switch_without_arms_is_rejected() {
    let err = parse_source("{ switch 1 }").expect_err("expected parse error");
    let msg = err.to_string();
    assert!(msg.contains("at least one"), "unexpected error message: {msg}");
}

#[test]
fn default_must_be_last() {
    let err = parse_source("{ switch 1 default { } case 1 { } }").expect_err("expected parse error");
    let msg = err.to_string();
    assert!(msg.contains("last arm"), "unexpected error message: {msg}");
}

#[test]
fn bare_identifier_statement_is_rejected() {
    let err = parse_source("{ let x := 1 x }").expect_err("expected parse error");
    let msg = err.to_string();
    assert!(
        msg.contains("assignment or a function call"),
        "unexpected error message: {msg}"
    );
}

#[test]
fn trailing_tokens_after_program_are_rejected() {
    parse_source("{ } }").expect_err("expected parse error");
}

#[test]
fn unterminated_block_is_rejected() {
    let err = parse_source("{ let x := 1").expect_err("expected parse error");
    let msg = err.to_string();
    assert!(msg.contains("unterminated block"), "unexpected error message: {msg}");
}

#[test]
fn printer_output_is_canonical() {
    let src = "{ let x_1 := 5 x_1 := add(x_1, 1) function f(a) -> r { r := a } if x_1 { } }";
    let block = parse_source(src).expect("parse");
    let expected = "\
{
    let x_1 := 5
    x_1 := add(x_1, 1)
    function f(a) -> r {
        r := a
    }
    if x_1 { }
}
";
    assert_eq!(format_block(&block), expected);
}

#[test]
fn printed_programs_parse_back_to_the_same_text() {
    let src = r#"
{
    let a:u256, b := f("q\"\n", true)
    switch a
    case 0x01 { a := 2 }
    default { }
    for { } 1 { } { break }
    { leave }
}
"#;
    let once = format_block(&parse_source(src).expect("parse"));
    let twice = format_block(&parse_source(&once).expect("reparse"));
    assert_eq!(once, twice);
}

#[test]
fn expressions_parse_on_their_own() {
    let expr = parse_expr("mstore(0x40, add(x, 1))").expect("parse");
    assert_eq!(format_expr(&expr), "mstore(0x40, add(x, 1))");
    parse_expr("f(1) 2").expect_err("trailing tokens");
}

#[test]
fn errors_name_the_token_that_was_found() {
    let tokens = yul_lex::Lexer::new("{ let 5 := 1 }").lex().expect("lex");
    let err = Parser::new(&tokens).parse_program().expect_err("number is not a name");
    assert_eq!(err.message, "expected an identifier");
    assert_eq!(err.found.as_deref(), Some("found number 5"));

    let tokens = yul_lex::Lexer::new("{ if 1 leave }").lex().expect("lex");
    let err = Parser::new(&tokens).parse_program().expect_err("if needs a block");
    assert_eq!(err.message, "expected '{'");
    assert_eq!(err.found.as_deref(), Some("found 'leave'"));
}
