use miette::Result;

mod common;
use common::differential_util::{
    clean_source, corpus_dir, differential_mismatch, find_files, minimize_lines, report,
    run_source, write_failure_artifacts,
};

#[test]
fn differential_corpus_matches_after_cleaning() -> Result<()> {
    let files = find_files(&corpus_dir())?;
    if files.is_empty() {
        return Err(miette::miette!("no corpus files found"));
    }

    let mut failures = Vec::new();
    for path in files {
        let case_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("case")
            .to_string();
        let src = std::fs::read_to_string(&path)
            .map_err(|e| miette::miette!("failed to read {}: {e}", path.display()))?;

        let original = run_source(&src);
        if !original.ok {
            return Err(miette::miette!(
                "corpus program {case_name} does not run: {}",
                original.error
            ));
        }

        let Some((original, cleaned, cleaned_src)) = differential_mismatch(&src) else {
            continue;
        };

        let minimized = minimize_lines(&src, |candidate| {
            run_source(candidate).ok && differential_mismatch(candidate).is_some()
        });
        let details = report(&case_name, &original, &cleaned, &cleaned_src);
        write_failure_artifacts(&case_name, &src, &minimized, &details)?;
        failures.push(case_name);
    }

    if !failures.is_empty() {
        return Err(miette::miette!(
            "cleaned programs diverged: {} (see .yul/differential_failures)",
            failures.join(", ")
        ));
    }
    Ok(())
}

#[test]
fn corpus_programs_are_actually_renamed() -> Result<()> {
    let mut changed = 0usize;
    for path in find_files(&corpus_dir())? {
        let src = std::fs::read_to_string(&path)
            .map_err(|e| miette::miette!("failed to read {}: {e}", path.display()))?;
        let cleaned = clean_source(&src)?;
        if cleaned != yul_parse::format_block(&yul_parse::parse_source(&src)?) {
            changed += 1;
        }
        // Cleaning the printed result again is a no-op.
        assert_eq!(clean_source(&cleaned)?, cleaned, "{}", path.display());
    }
    assert!(changed > 0, "no corpus program exercised a rename");
    Ok(())
}
