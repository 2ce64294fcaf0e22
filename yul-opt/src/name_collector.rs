#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use yul_ast::{Block, FunctionDefinition, Name, VariableDeclaration};

use crate::name_cleaner::strip_suffix;
use crate::walker::AstWalker;

/// Gathers every function name and every declared variable name in a program.
#[derive(Debug, Default)]
pub struct NameCollector {
    pub function_names: BTreeSet<Name>,
    pub variable_names: BTreeSet<Name>,
}

impl NameCollector {
    pub fn collect(ast: &Block) -> Self {
        let mut collector = Self::default();
        collector.visit_block(ast);
        collector
    }
}

impl AstWalker for NameCollector {
    fn visit_function_definition(&mut self, fun: &FunctionDefinition) {
        self.function_names.insert(fun.name.clone());
        for binding in fun.parameters.iter().chain(&fun.returns) {
            self.variable_names.insert(binding.name.clone());
        }
        self.visit_block(&fun.body);
    }

    fn visit_variable_declaration(&mut self, decl: &VariableDeclaration) {
        for binding in &decl.variables {
            self.variable_names.insert(binding.name.clone());
        }
        if let Some(value) = &decl.value {
            self.visit_expression(value);
        }
    }
}

/// Names a cleaned program must not reuse for a renamed variable.
///
/// Function names share the identifier space with variables, and a variable
/// declared without a suffix keeps its name wherever it appears, so neither may
/// be handed out to some other declaration.
pub fn reserved_program_names(ast: &Block) -> BTreeSet<Name> {
    let NameCollector {
        function_names,
        variable_names,
    } = NameCollector::collect(ast);

    function_names
        .into_iter()
        .chain(
            variable_names
                .into_iter()
                .filter(|name| strip_suffix(name.as_str()).is_none()),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use yul_parse::parse_source;

    #[test]
    fn collects_functions_parameters_and_locals() {
        let ast = parse_source(
            "{ let a_1 := 1 function f(p) -> r { let q := p r := q } { let inner_2 := 0 } }",
        )
        .expect("parse");
        let names = NameCollector::collect(&ast);
        assert_eq!(names.function_names, BTreeSet::from([Name::from("f")]));
        let vars: Vec<&str> = names.variable_names.iter().map(Name::as_str).collect();
        assert_eq!(vars, ["a_1", "inner_2", "p", "q", "r"]);
    }

    #[test]
    fn reserved_names_skip_suffixed_variables() {
        let ast = parse_source("{ let x_1 := 1 let x := 2 function g_1() { let y := 0 } }")
            .expect("parse");
        let reserved: Vec<Name> = reserved_program_names(&ast).into_iter().collect();
        assert_eq!(reserved, [Name::from("g_1"), Name::from("x"), Name::from("y")]);
    }
}
