use yul_interpret::{dump, interpret, interpret_source, ExecOutcome, InterpreterState, Termination, Word};
use yul_parse::parse_source;

fn run(src: &str) -> (InterpreterState, ExecOutcome) {
    interpret_source(src).expect("program runs")
}

fn run_with(src: &str, configure: impl FnOnce(&mut InterpreterState)) -> (InterpreterState, ExecOutcome) {
    let ast = parse_source(src).expect("parse");
    let mut state = InterpreterState::new();
    configure(&mut state);
    let outcome = interpret(&ast, &mut state).expect("program runs");
    (state, outcome)
}

fn slot(state: &InterpreterState, key: u64) -> Word {
    state.storage.get(&Word::from(key)).cloned().unwrap_or_default()
}

#[test]
fn mstore_is_traced_and_dumped() {
    let (state, outcome) = run("{ mstore(0x40, 0x80) }");
    assert!(matches!(outcome, ExecOutcome::Completed));
    assert_eq!(state.trace, ["MSTORE(0x40, 0x80)"]);
    assert_eq!(state.memory.len(), 0x60);

    let zero_row = "0".repeat(64);
    let mut last_row = "0".repeat(62);
    last_row.push_str("80");
    let expected = format!(
        "Trace:\n  MSTORE(0x40, 0x80)\nMemory dump:\n     0: {zero_row}\n    20: {zero_row}\n    40: {last_row}\nStorage dump:\n"
    );
    assert_eq!(dump(&state), expected);
}

#[test]
fn storage_is_dumped_with_padded_keys_and_values() {
    let (state, _) = run("{ sstore(1, 2) sstore(0, sload(1)) }");
    let text = dump(&state);
    let key = format!("{}1", "0".repeat(63));
    let value = format!("{}2", "0".repeat(63));
    assert!(text.contains(&format!("  {key}: {value}\n")), "{text}");
    assert_eq!(slot(&state, 0), Word::from(2));
    assert_eq!(state.trace, ["SSTORE(0x1, 0x2)", "SSTORE(0x0, 0x2)"]);
}

#[test]
fn recursive_functions_compute_values() {
    let src = r#"
{
    function fact(n) -> r {
        r := 1
        if gt(n, 1) { r := mul(n, fact(sub(n, 1))) }
    }
    sstore(0, fact(5))
}
"#;
    let (state, _) = run(src);
    assert_eq!(slot(&state, 0), Word::from(120));
    assert_eq!(state.trace, ["SSTORE(0x0, 0x78)"]);
}

#[test]
fn loops_honour_break_and_continue() {
    let src = r#"
{
    let s := 0
    for { let i := 0 } lt(i, 10) { i := add(i, 1) } {
        if eq(i, 3) { continue }
        if eq(i, 6) { break }
        s := add(s, i)
    }
    sstore(0, s)
}
"#;
    let (state, _) = run(src);
    assert_eq!(slot(&state, 0), Word::from(12));
}

#[test]
fn leave_exits_the_function() {
    let src = r#"
{
    function f() -> r {
        r := 7
        for { } 1 { } { leave }
        r := 8
    }
    sstore(0, f())
}
"#;
    let (state, _) = run(src);
    assert_eq!(slot(&state, 0), Word::from(7));
}

#[test]
fn switch_picks_the_matching_case_or_default() {
    let src = r#"
{
    switch 2
    case 1 { sstore(0, 11) }
    case 2 { sstore(0, 22) }
    default { sstore(0, 99) }
    switch "x"
    case "y" { sstore(1, 1) }
    default { sstore(1, 2) }
}
"#;
    let (state, _) = run(src);
    assert_eq!(slot(&state, 0), Word::from(22));
    assert_eq!(slot(&state, 1), Word::from(2));
}

#[test]
fn multiple_return_values_are_assigned_in_order() {
    let src = r#"
{
    function pair() -> a, b { a := 1 b := 2 }
    let x, y := pair()
    sstore(x, y)
    x, y := pair()
    sstore(y, x)
}
"#;
    let (state, _) = run(src);
    assert_eq!(slot(&state, 1), Word::from(2));
    assert_eq!(slot(&state, 2), Word::from(1));
}

#[test]
fn arguments_are_evaluated_right_to_left() {
    let src = r#"
{
    function w(v) -> r { sstore(v, v) r := v }
    pop(add(w(1), w(2)))
}
"#;
    let (state, _) = run(src);
    assert_eq!(state.trace, ["SSTORE(0x2, 0x2)", "SSTORE(0x1, 0x1)"]);
}

#[test]
fn functions_are_visible_before_their_definition() {
    let src = r#"
{
    sstore(0, later())
    {
        function inner() -> r { r := later() }
        sstore(1, inner())
    }
    function later() -> r { r := 5 }
}
"#;
    let (state, _) = run(src);
    assert_eq!(slot(&state, 0), Word::from(5));
    assert_eq!(slot(&state, 1), Word::from(5));
}

#[test]
fn halting_builtins_terminate_the_run() {
    let (state, outcome) = run("{ mstore(0, 1) return(0, 32) sstore(0, 1) }");
    assert_eq!(outcome.termination(), Some(Termination::Return));
    assert_eq!(state.trace, ["MSTORE(0x0, 0x1)", "RETURN(0x0, 0x20)"]);
    assert!(state.storage.is_empty());

    let (_, outcome) = run("{ revert(0, 0) }");
    assert_eq!(outcome.termination(), Some(Termination::Revert));
    let (state, outcome) = run("{ stop() }");
    assert_eq!(outcome.termination(), Some(Termination::Stop));
    assert_eq!(state.trace, ["STOP()"]);
    let (_, outcome) = run("{ invalid() }");
    assert_eq!(outcome.termination(), Some(Termination::Invalid));
}

#[test]
fn budgets_terminate_runaway_programs() {
    let (_, outcome) = run_with("{ for { } 1 { } { } }", |s| s.max_steps = 1000);
    assert_eq!(outcome.termination(), Some(Termination::StepLimit));

    let (state, outcome) = run_with(
        "{ for { let i := 0 } 1 { i := add(i, 1) } { sstore(i, 1) } }",
        |s| s.max_trace_size = 3,
    );
    assert_eq!(outcome.termination(), Some(Termination::TraceLimit));
    assert_eq!(state.trace.len(), 3);

    let (state, outcome) = run("{ mstore(0x10000, 1) }");
    assert_eq!(outcome.termination(), Some(Termination::MemoryLimit));
    assert!(state.memory.is_empty());

    let (_, outcome) = run("{ function f() { f() } f() }");
    assert_eq!(outcome.termination(), Some(Termination::CallDepthLimit));
}

#[test]
fn environment_builtins_have_fixed_values() {
    let (state, _) = run("{ mstore8(0, 0x1ff) sstore(0, calldataload(0)) sstore(1, calldatasize()) sstore(2, msize()) sstore(3, mload(0)) }");
    assert_eq!(slot(&state, 0), Word::zero());
    assert_eq!(slot(&state, 1), Word::zero());
    assert_eq!(slot(&state, 2), Word::from(32));
    assert_eq!(state.memory[0], 0xff);
    assert_eq!(slot(&state, 3).to_be_bytes()[0], 0xff);
}

#[test]
fn string_literals_are_left_aligned() {
    let (state, _) = run(r#"{ sstore(0, "ab") }"#);
    assert!(slot(&state, 0).to_padded_hex().starts_with("6162000"));
}

#[test]
fn malformed_programs_are_errors() {
    let cases = [
        ("{ let x := y }", "undeclared variable 'y'"),
        ("{ y := 1 }", "undeclared variable 'y'"),
        ("{ pop(f()) }", "undefined function 'f'"),
        ("{ pop(add(1)) }", "expects 2 argument(s)"),
        ("{ add(1, 2) }", "discards 1 value(s)"),
        ("{ let a, b := 1 }", "declaration of 2 variable(s)"),
        ("{ let x := 1 function f() -> r { r := x } pop(f()) }", "undeclared variable 'x'"),
    ];
    for (src, needle) in cases {
        let err = interpret_source(src).expect_err(src);
        let msg = err.to_string();
        assert!(msg.contains(needle), "{src}: unexpected error message: {msg}");
    }
}
