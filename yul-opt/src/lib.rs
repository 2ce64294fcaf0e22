#![forbid(unsafe_code)]

pub mod error;
pub mod name_cleaner;
pub mod name_collector;
pub mod suite;
pub mod walker;

pub use error::OptimizerError;
pub use name_cleaner::{strip_suffix, NameCleaner};
pub use name_collector::{reserved_program_names, NameCollector};
pub use suite::{clean_names, CleanerSettings};
pub use walker::{AstModifier, AstWalker};
