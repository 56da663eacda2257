//! Gate inlining with ancilla allocation.
//!
//! [`InlinePass`] removes every user-defined gate abstraction from a program:
//!
//! 1. every gate declaration is canonicalized, in declaration order, so that
//!    its body only calls primitives (callees first, each gate once);
//! 2. every top-level call to a custom gate is replaced in place by a copy of
//!    the callee's canonical body, specialized for the call's arguments;
//! 3. if any expansion needed pool qubits, a single pool register sized to the
//!    largest per-expansion demand is declared at the head of the program.
//!
//! Ancillas declared inside gate bodies are bound at each expansion: clean
//! ancillas from the pool, dirty ones preferably by borrowing a qubit of the
//! surrounding context that the call does not touch. Declarations are kept,
//! so re-running the pass is a no-op.
//!
//! ```rust
//! use qfold_ast::{AncillaDecl, GateDecl, Program, QubitRef, Statement};
//! use qfold_compile::inline;
//!
//! let foo = GateDecl::new(
//!     "foo",
//!     Vec::<String>::new(),
//!     ["q"],
//!     vec![
//!         AncillaDecl::dirty("a", 1).into(),
//!         Statement::call("CX", vec![], vec![QubitRef::register("q"), QubitRef::single("a", 0)]),
//!     ],
//! );
//! let mut program = Program::new(vec![
//!     foo.into(),
//!     Statement::qreg("q", 2),
//!     Statement::call("foo", vec![], vec![QubitRef::single("q", 0)]),
//! ]);
//!
//! inline(&mut program).unwrap();
//! assert_eq!(program.statements.last().unwrap().to_string(), "CX q[0],q[1];");
//! ```

mod ancilla;
mod engine;
mod registry;
mod substitute;


use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use qfold_ast::Program;

pub use ancilla::{AncillaAllocator, AncillaBindings, QubitContext, StepReport};
pub use registry::{GateId, GateRegistry, Resolution, VisitState};
pub use substitute::{specialize, substitute_expression};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::{PrimitiveGates, PropertySet, QELIB1_GATES};
use engine::Inliner;

/// Configuration for [`InlinePass`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InlineConfig {
    /// Preferred name of the pool register. A numbered variant is used when the
    /// program already uses this name.
    pub pool_register: String,
    /// Declared gates to treat as primitives: calls to them are kept.
    pub overrides: BTreeSet<String>,
}

impl Default for InlineConfig {
    fn default() -> Self {
        Self {
            pool_register: "anc".to_string(),
            overrides: BTreeSet::new(),
        }
    }
}

impl InlineConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep calls to the `qelib1.inc` standard gates even when the program
    /// declares them.
    pub fn keep_standard_gates() -> Self {
        Self::default().with_overrides(QELIB1_GATES.iter().copied())
    }

    /// Set the preferred pool register name.
    #[must_use]
    pub fn with_pool_register(mut self, name: impl Into<String>) -> Self {
        self.pool_register = name.into();
        self
    }

    /// Add gates that must not be inlined.
    #[must_use]
    pub fn with_overrides(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.overrides.extend(names.into_iter().map(Into::into));
        self
    }

    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> CompileResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CompileError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the pool register name is a valid identifier.
    pub fn validate(&self) -> CompileResult<()> {
        let mut chars = self.pool_register.chars();
        let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(CompileError::InvalidConfiguration(format!(
                "pool register name '{}' is not an identifier",
                self.pool_register
            )));
        }
        Ok(())
    }
}

/// Summary of an inlining run, stored in the [`PropertySet`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InlineStats {
    /// Gate declarations canonicalized.
    pub gates_canonicalized: usize,
    /// Call expansions performed, nested ones included.
    pub calls_expanded: usize,
    /// Call expansions performed on top-level statements.
    pub top_level_calls_expanded: usize,
    /// Top-level statements after the run.
    pub statements_emitted: usize,
    /// Size of the inserted pool register, zero when none was needed.
    pub pool_size: u32,
    /// Name of the inserted pool register.
    pub pool_register: Option<String>,
}

/// Transformation pass that inlines every custom gate call.
#[derive(Debug, Clone, Default)]
pub struct InlinePass {
    config: InlineConfig,
}

impl InlinePass {
    /// Create the pass with the given configuration.
    pub fn new(config: InlineConfig) -> Self {
        Self { config }
    }

    /// The pass configuration.
    pub fn config(&self) -> &InlineConfig {
        &self.config
    }
}

impl Pass for InlinePass {
    fn name(&self) -> &'static str {
        "inline"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    #[instrument(skip_all, fields(pool = %self.config.pool_register))]
    fn run(&self, program: &mut Program, properties: &mut PropertySet) -> CompileResult<()> {
        self.config.validate()?;
        let default_primitives = PrimitiveGates::default();
        let primitives = properties.primitives.as_ref().unwrap_or(&default_primitives);

        let stats = Inliner::new(&self.config, primitives).run(program)?;
        properties.insert(stats);
        Ok(())
    }
}

/// Inline every custom gate call in `program` with the default configuration.
pub fn inline(program: &mut Program) -> CompileResult<()> {
    InlinePass::default().run(program, &mut PropertySet::new())
}
