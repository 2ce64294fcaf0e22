#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use tracing::debug;
use yul_ast::{Block, Dialect, Name};

use crate::error::OptimizerError;
use crate::name_cleaner::NameCleaner;
use crate::name_collector::reserved_program_names;

#[derive(Clone, Debug)]
pub struct CleanerSettings {
    /// Names the cleaner never assigns.
    pub blacklist: BTreeSet<Name>,
    /// Also reserve function names and unsuffixed variable names found in the program.
    pub reserve_program_names: bool,
    pub suffix_limit: u64,
}

impl Default for CleanerSettings {
    fn default() -> Self {
        Self {
            blacklist: BTreeSet::new(),
            reserve_program_names: true,
            suffix_limit: u64::MAX,
        }
    }
}

/// Runs the name cleaner over a disambiguated program.
pub fn clean_names<D: Dialect + ?Sized>(
    ast: &mut Block,
    dialect: &D,
    settings: &CleanerSettings,
) -> Result<(), OptimizerError> {
    let mut blacklist = settings.blacklist.clone();
    if settings.reserve_program_names {
        let program_names = reserved_program_names(ast);
        debug!(count = program_names.len(), "reserving names used by the program");
        blacklist.extend(program_names);
    }

    NameCleaner::new(dialect, blacklist)
        .with_suffix_limit(settings.suffix_limit)
        .run(ast)
}
