#![forbid(unsafe_code)]

//! Restores short names after disambiguation.
//!
//! Within each function, a declared name carrying a mechanical suffix
//! (`x_1`, `x_1_2`, `x__3`) is renamed to its base (`x`) when that is free,
//! otherwise to the first free `x_1`, `x_2`, ... Unsuffixed names are kept.
//! Every use of a renamed variable that follows its declaration in the same
//! function is rewritten to match.
//!
//! Requires disambiguated input. State is reset on entry to every function
//! definition and is not restored when a nested definition ends.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{debug, info_span, trace, warn};
use yul_ast::{Block, Dialect, FunctionDefinition, Identifier, Name, Span, TypedName, VariableDeclaration};

use crate::error::OptimizerError;
use crate::walker::{walk_function_definition, walk_variable_declaration, AstModifier};

pub struct NameCleaner<'a, D: Dialect + ?Sized> {
    dialect: &'a D,
    blacklist: BTreeSet<Name>,

    /// Names no candidate may take in the current scope. Always contains the blacklist.
    reserved: HashSet<Name>,

    /// Original name -> assigned name, for declarations seen so far in the current scope.
    renames: HashMap<Name, Name>,

    suffix_limit: u64,
    function_depth: usize,
}

impl<'a, D: Dialect + ?Sized> NameCleaner<'a, D> {
    pub fn new(dialect: &'a D, blacklist: impl IntoIterator<Item = Name>) -> Self {
        let blacklist: BTreeSet<Name> = blacklist.into_iter().collect();
        Self {
            dialect,
            reserved: blacklist.iter().cloned().collect(),
            blacklist,
            renames: HashMap::new(),
            suffix_limit: u64::MAX,
            function_depth: 0,
        }
    }

    /// Upper bound (exclusive) for numeric suffixes tried before giving up.
    pub fn with_suffix_limit(mut self, limit: u64) -> Self {
        self.suffix_limit = limit;
        self
    }

    /// Clean `ast` in place with a fresh cleaner.
    pub fn clean(
        dialect: &'a D,
        ast: &mut Block,
        blacklist: impl IntoIterator<Item = Name>,
    ) -> Result<(), OptimizerError> {
        Self::new(dialect, blacklist).run(ast)
    }

    /// Rewrites `ast` in place. The scope state is re-seeded from the blacklist first.
    pub fn run(&mut self, ast: &mut Block) -> Result<(), OptimizerError> {
        let _span = info_span!("name_cleaner", dialect = self.dialect.name()).entered();
        self.reset_scope();
        self.function_depth = 0;
        self.visit_block(ast)
    }

    pub fn blacklist(&self) -> &BTreeSet<Name> {
        &self.blacklist
    }

    pub fn reserved(&self) -> &HashSet<Name> {
        &self.reserved
    }

    pub fn renames(&self) -> &HashMap<Name, Name> {
        &self.renames
    }

    fn reset_scope(&mut self) {
        self.reserved = self.blacklist.iter().cloned().collect();
        self.renames.clear();
    }

    fn clean_binding(&mut self, binding: &mut TypedName) -> Result<(), OptimizerError> {
        if let Some(new_name) = self.make_clean_name(&binding.name, binding.span)? {
            binding.name = new_name;
        }
        Ok(())
    }

    /// Picks a clean name for `name` and reserves it; an already clean name reserves itself.
    fn make_clean_name(&mut self, name: &Name, span: Span) -> Result<Option<Name>, OptimizerError> {
        match self.find_clean_name(name, span)? {
            Some(new_name) => {
                debug!(from = %name, to = %new_name, "cleaned declaration");
                self.reserved.insert(new_name.clone());
                self.renames.insert(name.clone(), new_name.clone());
                Ok(Some(new_name))
            }
            None => {
                self.reserved.insert(name.clone());
                Ok(None)
            }
        }
    }

    fn find_clean_name(&self, name: &Name, span: Span) -> Result<Option<Name>, OptimizerError> {
        let Some(base) = strip_suffix(name.as_str()) else {
            return Ok(None);
        };

        let base_name = Name::new(base);
        if !base.is_empty() && !self.dialect.is_builtin(&base_name) && !self.is_reserved(&base_name) {
            return Ok(Some(base_name));
        }

        // Suffixed forms cannot collide with builtins.
        for i in 1..self.suffix_limit {
            let candidate = Name::new(format!("{base}_{i}"));
            if !self.is_reserved(&candidate) {
                return Ok(Some(candidate));
            }
        }

        Err(OptimizerError::SuffixExhausted {
            name: name.clone(),
            span,
        })
    }

    fn newly_assigned_name(&self, name: &Name) -> Option<&Name> {
        self.renames.get(name).filter(|new_name| *new_name != name)
    }

    fn is_reserved(&self, name: &Name) -> bool {
        self.reserved.contains(name)
    }
}

impl<D: Dialect + ?Sized> AstModifier for NameCleaner<'_, D> {
    type Error = OptimizerError;

    fn visit_function_definition(
        &mut self,
        fun: &mut FunctionDefinition,
    ) -> Result<(), OptimizerError> {
        if self.function_depth > 0 {
            warn!(
                function = %fun.name,
                "nested function definition: cleanup state of the enclosing function is discarded"
            );
        }
        trace!(function = %fun.name, "entering function scope");
        self.reset_scope();

        self.function_depth += 1;
        for binding in fun.parameters.iter_mut().chain(fun.returns.iter_mut()) {
            self.clean_binding(binding)?;
        }
        walk_function_definition(self, fun)?;
        self.function_depth -= 1;
        Ok(())
    }

    fn visit_variable_declaration(
        &mut self,
        decl: &mut VariableDeclaration,
    ) -> Result<(), OptimizerError> {
        for binding in &mut decl.variables {
            self.clean_binding(binding)?;
        }
        walk_variable_declaration(self, decl)
    }

    fn visit_identifier(&mut self, id: &mut Identifier) -> Result<(), OptimizerError> {
        if let Some(new_name) = self.newly_assigned_name(&id.name) {
            id.name = new_name.clone();
        }
        Ok(())
    }
}

/// Returns the part of `name` before a trailing run of `_<digits>` groups.
///
/// Matches what a search for `(_+[0-9]+)+$` would find: all trailing groups are
/// consumed and the leading underscores of the first group are not part of the base.
pub fn strip_suffix(name: &str) -> Option<&str> {
    let bytes = name.as_bytes();
    let mut end = bytes.len();
    let mut cut = None;

    loop {
        let digits = bytes[..end].iter().rev().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 {
            break;
        }
        let underscores = bytes[..end - digits]
            .iter()
            .rev()
            .take_while(|b| **b == b'_')
            .count();
        if underscores == 0 {
            break;
        }
        end -= digits + underscores;
        cut = Some(end);
    }

    cut.map(|end| &name[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_single_and_chained_suffixes() {
        assert_eq!(strip_suffix("x_1"), Some("x"));
        assert_eq!(strip_suffix("x_1_2"), Some("x"));
        assert_eq!(strip_suffix("x__12"), Some("x"));
        assert_eq!(strip_suffix("x_1__2_3"), Some("x"));
        assert_eq!(strip_suffix("x_01"), Some("x"));
    }

    #[test]
    fn keeps_inner_underscores_and_digits() {
        assert_eq!(strip_suffix("a_b_1"), Some("a_b"));
        assert_eq!(strip_suffix("ab12_3"), Some("ab12"));
        assert_eq!(strip_suffix("x_1a_2"), Some("x_1a"));
        assert_eq!(strip_suffix("$tmp.v_7"), Some("$tmp.v"));
    }

    #[test]
    fn unsuffixed_names_do_not_match() {
        assert_eq!(strip_suffix("counter"), None);
        assert_eq!(strip_suffix("x1"), None);
        assert_eq!(strip_suffix("x_"), None);
        assert_eq!(strip_suffix("x_a"), None);
        assert_eq!(strip_suffix("_"), None);
        assert_eq!(strip_suffix(""), None);
    }

    #[test]
    fn suffix_only_names_have_an_empty_base() {
        assert_eq!(strip_suffix("_1"), Some(""));
        assert_eq!(strip_suffix("__1_2"), Some(""));
    }
}
