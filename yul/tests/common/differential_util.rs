#![allow(dead_code)]

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use miette::{IntoDiagnostic, Result};
use yul_ast::EvmDialect;
use yul_interpret::{dump, interpret, InterpreterState};
use yul_opt::{clean_names, CleanerSettings};
use yul_parse::{format_block, parse_source};

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub ok: bool,
    pub dump: String,
    pub error: String,
}

pub fn corpus_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("corpus")
}

pub fn find_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for ent in std::fs::read_dir(dir).into_diagnostic()? {
        let ent = ent.into_diagnostic()?;
        let p = ent.path();
        if p.is_dir() {
            continue;
        }
        if p.extension() == Some(OsStr::new("yul")) {
            out.push(p);
        }
    }
    out.sort();
    Ok(out)
}

/// Interprets `src` with default budgets. Parse and execution errors are part of the outcome.
pub fn run_source(src: &str) -> RunOutcome {
    let ast = match parse_source(src) {
        Ok(ast) => ast,
        Err(e) => {
            return RunOutcome {
                ok: false,
                dump: String::new(),
                error: format!("parse failed: {e}"),
            };
        }
    };

    let mut state = InterpreterState::new();
    match interpret(&ast, &mut state) {
        Ok(_) => RunOutcome {
            ok: true,
            dump: dump(&state),
            error: String::new(),
        },
        Err(e) => RunOutcome {
            ok: false,
            dump: dump(&state),
            error: e.to_string(),
        },
    }
}

/// Cleans `src` the way `yul clean` does by default and prints it back.
pub fn clean_source(src: &str) -> Result<String> {
    let mut ast = parse_source(src)?;
    clean_names(&mut ast, &EvmDialect::strict_assembly(), &CleanerSettings::default())?;
    Ok(format_block(&ast))
}

pub fn outcomes_match(a: &RunOutcome, b: &RunOutcome) -> bool {
    a.ok == b.ok && a.dump == b.dump && a.error == b.error
}

/// Original and cleaned outcomes, or `None` when they agree.
pub fn differential_mismatch(src: &str) -> Option<(RunOutcome, RunOutcome, String)> {
    let original = run_source(src);
    let cleaned_src = match clean_source(src) {
        Ok(s) => s,
        Err(e) => {
            let failed = RunOutcome {
                ok: false,
                dump: String::new(),
                error: format!("clean failed: {e}"),
            };
            return Some((original, failed, String::new()));
        }
    };
    let cleaned = run_source(&cleaned_src);
    if outcomes_match(&original, &cleaned) {
        None
    } else {
        Some((original, cleaned, cleaned_src))
    }
}

pub fn minimize_lines<F>(src: &str, mut still_fails: F) -> String
where
    F: FnMut(&str) -> bool,
{
    let mut lines: Vec<String> = src.lines().map(|l| l.to_string()).collect();

    // Greedy line deletion until no single-line delete keeps the failure.
    'outer: loop {
        for i in 0..lines.len() {
            let mut candidate = lines.clone();
            candidate.remove(i);
            let cand_src = candidate.join("\n");
            if cand_src.trim().is_empty() {
                continue;
            }
            if still_fails(&cand_src) {
                lines = candidate;
                continue 'outer;
            }
        }
        break;
    }

    lines.join("\n") + "\n"
}

pub fn report(case_name: &str, original: &RunOutcome, cleaned: &RunOutcome, cleaned_src: &str) -> String {
    let mut details = String::new();
    details.push_str(&format!("case: {case_name}\n\n"));
    details.push_str(&format!(
        "=== original ===\nok: {}\n{}\nerror: {}\n\n",
        original.ok, original.dump, original.error
    ));
    details.push_str(&format!(
        "=== cleaned ===\nok: {}\n{}\nerror: {}\n\n",
        cleaned.ok, cleaned.dump, cleaned.error
    ));
    details.push_str("=== cleaned program ===\n");
    details.push_str(cleaned_src);
    details
}

pub fn failures_root() -> PathBuf {
    PathBuf::from(".yul").join("differential_failures")
}

pub fn fixture_write_dir() -> Option<PathBuf> {
    if std::env::var("YUL_DIFFERENTIAL_WRITE_FIXTURES")
        .ok()
        .as_deref()
        != Some("1")
    {
        return None;
    }

    Some(
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures"),
    )
}

pub fn write_failure_artifacts(case_name: &str, original: &str, minimized: &str, details: &str) -> Result<()> {
    let root = failures_root().join(case_name);
    std::fs::create_dir_all(&root).into_diagnostic()?;

    std::fs::write(root.join("original.yul"), original).into_diagnostic()?;
    std::fs::write(root.join("minimized.yul"), minimized).into_diagnostic()?;
    std::fs::write(root.join("report.txt"), details).into_diagnostic()?;

    if let Some(dir) = fixture_write_dir() {
        std::fs::create_dir_all(&dir).into_diagnostic()?;
        std::fs::write(dir.join(format!("{case_name}.yul")), minimized).into_diagnostic()?;
        std::fs::write(dir.join(format!("{case_name}.txt")), details).into_diagnostic()?;
    }

    Ok(())
}
