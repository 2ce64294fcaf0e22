#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::Name;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuiltinFunction {
    pub name: Name,
    pub parameters: usize,
    pub returns: usize,
    /// Writes memory/storage, emits logs or halts.
    pub side_effects: bool,
}

/// The set of identifiers a language dialect reserves for builtins.
pub trait Dialect {
    fn name(&self) -> &str;

    fn builtin(&self, name: &Name) -> Option<&BuiltinFunction>;

    fn is_builtin(&self, name: &Name) -> bool {
        self.builtin(name).is_some()
    }
}

// (name, parameters, returns, side effects)
const EVM_BUILTINS: &[(&str, usize, usize, bool)] = &[
    ("stop", 0, 0, true),
    ("add", 2, 1, false),
    ("sub", 2, 1, false),
    ("mul", 2, 1, false),
    ("div", 2, 1, false),
    ("sdiv", 2, 1, false),
    ("mod", 2, 1, false),
    ("smod", 2, 1, false),
    ("exp", 2, 1, false),
    ("addmod", 3, 1, false),
    ("mulmod", 3, 1, false),
    ("signextend", 2, 1, false),
    ("not", 1, 1, false),
    ("lt", 2, 1, false),
    ("gt", 2, 1, false),
    ("slt", 2, 1, false),
    ("sgt", 2, 1, false),
    ("eq", 2, 1, false),
    ("iszero", 1, 1, false),
    ("and", 2, 1, false),
    ("or", 2, 1, false),
    ("xor", 2, 1, false),
    ("byte", 2, 1, false),
    ("shl", 2, 1, false),
    ("shr", 2, 1, false),
    ("sar", 2, 1, false),
    ("pop", 1, 0, false),
    ("mload", 1, 1, false),
    ("mstore", 2, 0, true),
    ("mstore8", 2, 0, true),
    ("msize", 0, 1, false),
    ("sload", 1, 1, false),
    ("sstore", 2, 0, true),
    ("calldataload", 1, 1, false),
    ("calldatasize", 0, 1, false),
    ("log0", 2, 0, true),
    ("log1", 3, 0, true),
    ("log2", 4, 0, true),
    ("return", 2, 0, true),
    ("revert", 2, 0, true),
    ("invalid", 0, 0, true),
];

/// Strict assembly on the EVM: the opcodes are the builtins.
#[derive(Clone, Debug)]
pub struct EvmDialect {
    builtins: BTreeMap<Name, BuiltinFunction>,
}

impl EvmDialect {
    pub fn strict_assembly() -> Self {
        let builtins = EVM_BUILTINS
            .iter()
            .map(|&(name, parameters, returns, side_effects)| {
                let name = Name::new(name);
                (
                    name.clone(),
                    BuiltinFunction {
                        name,
                        parameters,
                        returns,
                        side_effects,
                    },
                )
            })
            .collect();
        Self { builtins }
    }

    pub fn builtins(&self) -> impl Iterator<Item = &BuiltinFunction> {
        self.builtins.values()
    }
}

impl Default for EvmDialect {
    fn default() -> Self {
        Self::strict_assembly()
    }
}

impl Dialect for EvmDialect {
    fn name(&self) -> &str {
        "evm"
    }

    fn builtin(&self, name: &Name) -> Option<&BuiltinFunction> {
        self.builtins.get(name)
    }
}

/// A dialect without any builtins.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBuiltins;

impl Dialect for NoBuiltins {
    fn name(&self) -> &str {
        "none"
    }

    fn builtin(&self, _name: &Name) -> Option<&BuiltinFunction> {
        None
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DialectKind {
    #[default]
    Evm,
    None,
}

impl DialectKind {
    pub fn instantiate(self) -> Box<dyn Dialect + Send + Sync> {
        match self {
            DialectKind::Evm => Box::new(EvmDialect::strict_assembly()),
            DialectKind::None => Box::new(NoBuiltins),
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialectKind::Evm => f.write_str("evm"),
            DialectKind::None => f.write_str("none"),
        }
    }
}

impl FromStr for DialectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "evm" => Ok(DialectKind::Evm),
            "none" => Ok(DialectKind::None),
            other => Err(format!("unknown dialect '{other}' (expected 'evm' or 'none')")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evm_dialect_knows_opcodes() {
        let evm = EvmDialect::strict_assembly();
        assert!(evm.is_builtin(&Name::new("add")));
        assert!(evm.is_builtin(&Name::new("sstore")));
        assert!(!evm.is_builtin(&Name::new("x")));
        let mstore = evm.builtin(&Name::new("mstore")).expect("mstore");
        assert_eq!((mstore.parameters, mstore.returns), (2, 0));
        assert!(mstore.side_effects);
    }

    #[test]
    fn dialect_kind_parses_case_insensitively() {
        assert_eq!("EVM".parse::<DialectKind>(), Ok(DialectKind::Evm));
        assert_eq!("none".parse::<DialectKind>(), Ok(DialectKind::None));
        assert!("ewasm".parse::<DialectKind>().is_err());
        assert!(!DialectKind::None.instantiate().is_builtin(&Name::new("add")));
    }
}
