#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::word::{Word, WORD_BYTES};

/// Observable effects of a run plus the budgets that bound it.
#[derive(Clone, Debug)]
pub struct InterpreterState {
    pub memory: Vec<u8>,
    pub storage: BTreeMap<Word, Word>,
    pub trace: Vec<String>,

    pub max_trace_size: usize,
    pub max_steps: u64,
    /// Highest memory offset (exclusive) a program may touch.
    pub max_memory: u64,

    pub(crate) steps: u64,
}

impl Default for InterpreterState {
    fn default() -> Self {
        Self {
            memory: Vec::new(),
            storage: BTreeMap::new(),
            trace: Vec::new(),
            max_trace_size: 10_000,
            max_steps: 100_000,
            max_memory: 0x10000,
            steps: 0,
        }
    }
}

impl InterpreterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh state with the same budgets.
    pub fn with_limits_of(other: &InterpreterState) -> Self {
        Self {
            max_trace_size: other.max_trace_size,
            max_steps: other.max_steps,
            max_memory: other.max_memory,
            ..Self::default()
        }
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }
}

/// Text form of a finished run: trace, memory rows of 32 bytes, then storage.
pub fn dump(state: &InterpreterState) -> String {
    let mut out = String::new();

    out.push_str("Trace:\n");
    for line in &state.trace {
        let _ = writeln!(out, "  {line}");
    }

    out.push_str("Memory dump:\n");
    for (row, chunk) in state.memory.chunks(WORD_BYTES).enumerate() {
        let _ = writeln!(out, "  {:>4x}: {}", row * WORD_BYTES, hex::encode(chunk));
    }

    out.push_str("Storage dump:\n");
    for (key, value) in &state.storage {
        let _ = writeln!(out, "  {}: {}", key.to_padded_hex(), value.to_padded_hex());
    }

    out
}
