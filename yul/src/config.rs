#![forbid(unsafe_code)]

use std::fs;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;
use yul_ast::{DialectKind, Name};
use yul_interpret::InterpreterState;
use yul_opt::CleanerSettings;

pub const CONFIG_FILE_NAME: &str = "yul.toml";

#[derive(Debug, Error, Diagnostic)]
#[error("config error: {message}")]
#[diagnostic(code(yul::config))]
pub struct ConfigError {
    pub message: String,
}

/// Settings after merging `yul.toml` over the defaults.
#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub config_path: Option<PathBuf>,
    pub cleaner: CleanerSettings,
    pub dialect: DialectKind,
    pub max_trace_size: usize,
    pub max_steps: u64,
    pub max_memory: u64,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        let limits = InterpreterState::default();
        Self {
            config_path: None,
            cleaner: CleanerSettings::default(),
            dialect: DialectKind::default(),
            max_trace_size: limits.max_trace_size,
            max_steps: limits.max_steps,
            max_memory: limits.max_memory,
        }
    }
}

impl ResolvedConfig {
    pub fn interpreter_state(&self) -> InterpreterState {
        let mut state = InterpreterState::new();
        state.max_trace_size = self.max_trace_size;
        state.max_steps = self.max_steps;
        state.max_memory = self.max_memory;
        state
    }
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    cleaner: Option<Cleaner>,

    #[serde(default)]
    dialect: Option<Dialect>,

    #[serde(default)]
    interpreter: Option<Interpreter>,
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct Cleaner {
    #[serde(default)]
    blacklist: Vec<String>,

    #[serde(default)]
    reserve_program_names: Option<bool>,

    #[serde(default)]
    suffix_limit: Option<u64>,
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct Dialect {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct Interpreter {
    #[serde(default)]
    max_trace_size: Option<usize>,

    #[serde(default)]
    max_steps: Option<u64>,

    #[serde(default)]
    max_memory: Option<u64>,
}

/// Looks for `yul.toml` in `start` and its ancestors.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut cur = if start.is_file() {
        start.parent()?.to_path_buf()
    } else {
        start.to_path_buf()
    };

    loop {
        let candidate = cur.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !cur.pop() {
            return None;
        }
    }
}

/// Loads `explicit` if given (it must exist), otherwise the nearest `yul.toml` above `start`.
pub fn load_config(explicit: Option<&Path>, start: &Path) -> Result<ResolvedConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match find_config(start) {
            Some(path) => path,
            None => return Ok(ResolvedConfig::default()),
        },
    };

    let raw = fs::read_to_string(&path).map_err(|e| ConfigError {
        message: format!("failed to read {}: {e}", path.display()),
    })?;
    let mut resolved = parse_config(&raw).map_err(|e| ConfigError {
        message: format!("{}: {}", path.display(), e.message),
    })?;
    resolved.config_path = Some(path);
    Ok(resolved)
}

pub fn parse_config(raw: &str) -> Result<ResolvedConfig, ConfigError> {
    let parsed: ConfigFile = toml::from_str(raw).map_err(|e| ConfigError {
        message: format!("failed to parse: {e}"),
    })?;

    let mut out = ResolvedConfig::default();

    if let Some(cleaner) = parsed.cleaner {
        out.cleaner.blacklist = cleaner.blacklist.into_iter().map(Name::from).collect();
        if let Some(reserve) = cleaner.reserve_program_names {
            out.cleaner.reserve_program_names = reserve;
        }
        if let Some(limit) = cleaner.suffix_limit {
            out.cleaner.suffix_limit = limit;
        }
    }

    if let Some(name) = parsed.dialect.and_then(|d| d.name) {
        out.dialect = name
            .parse::<DialectKind>()
            .map_err(|message: String| ConfigError { message })?;
    }

    if let Some(interpreter) = parsed.interpreter {
        if let Some(v) = interpreter.max_trace_size {
            out.max_trace_size = v;
        }
        if let Some(v) = interpreter.max_steps {
            out.max_steps = v;
        }
        if let Some(v) = interpreter.max_memory {
            out.max_memory = v;
        }
    }

    Ok(out)
}
