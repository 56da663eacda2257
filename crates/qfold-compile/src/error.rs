//! Error types for the compilation crate.

use std::fmt;

use thiserror::Error;

/// Which argument list of a gate call an arity error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Classical parameters.
    Classical,
    /// Qubit operands.
    Qubit,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgKind::Classical => write!(f, "classical"),
            ArgKind::Qubit => write!(f, "qubit"),
        }
    }
}

/// Errors that can occur during compilation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// A gate's call graph reaches itself.
    #[error("Cyclic gate definition: {}", .cycle.join(" -> "))]
    CyclicGateDefinition {
        /// The gates on the cycle, starting and ending with the same name.
        cycle: Vec<String>,
    },

    /// A call targets a name that is neither a primitive nor a declared gate.
    #[error("Unresolved gate '{name}'")]
    UnresolvedGate { name: String },

    /// Argument count disagrees with the target declaration.
    #[error("Gate '{gate}' expects {expected} {kind} arguments, got {got}")]
    ArityMismatch {
        gate: String,
        kind: ArgKind,
        expected: usize,
        got: usize,
    },

    /// The same gate name is declared twice.
    #[error("Duplicate gate definition: {0}")]
    DuplicateGateDefinition(String),

    /// An ancilla is used without an index or outside its declared size.
    #[error("Invalid reference to ancilla '{name}{}' in gate '{gate}'", format_index(.index))]
    InvalidAncillaReference {
        gate: String,
        name: String,
        index: Option<u32>,
    },

    /// Invalid pass configuration.
    #[error("Invalid pass configuration: {0}")]
    InvalidConfiguration(String),
}

#[allow(clippy::ref_option)]
fn format_index(index: &Option<u32>) -> String {
    match index {
        Some(idx) => format!("[{idx}]"),
        None => String::new(),
    }
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
