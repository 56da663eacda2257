//! Pass manager for orchestrating compilation.

use tracing::{debug, info, instrument};

use qfold_ast::Program;

use crate::error::CompileResult;
use crate::pass::Pass;
use crate::passes::{InlineConfig, InlinePass};
use crate::property::{PrimitiveGates, PropertySet};

/// Manages and executes a sequence of compilation passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given program.
    #[instrument(skip(self, program, properties))]
    pub fn run(&self, program: &mut Program, properties: &mut PropertySet) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on program with {} statements",
            self.passes.len(),
            program.statements.len()
        );

        for pass in &self.passes {
            if pass.should_run(program, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(program, properties)?;
                debug!(
                    "Pass {} completed, statements: {}",
                    pass.name(),
                    program.statements.len()
                );
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!(
            "Pass manager completed, statements: {}",
            program.statements.len()
        );

        Ok(())
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating pass managers with preset configurations.
pub struct PassManagerBuilder {
    /// Configuration for the gate inlining pass.
    inline: Option<InlineConfig>,
    /// Target properties.
    properties: PropertySet,
}

impl PassManagerBuilder {
    /// Create a new builder with default settings: inlining enabled.
    pub fn new() -> Self {
        Self {
            inline: Some(InlineConfig::default()),
            properties: PropertySet::new(),
        }
    }

    /// Configure the gate inlining pass.
    #[must_use]
    pub fn with_inline_config(mut self, config: InlineConfig) -> Self {
        self.inline = Some(config);
        self
    }

    /// Leave custom gate calls in place.
    #[must_use]
    pub fn without_inlining(mut self) -> Self {
        self.inline = None;
        self
    }

    /// Set the target's primitive gate set.
    #[must_use]
    pub fn with_primitives(mut self, primitives: PrimitiveGates) -> Self {
        self.properties.primitives = Some(primitives);
        self
    }

    /// Build the pass manager and return it with the properties.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();

        if let Some(config) = self.inline {
            pm.add_pass(InlinePass::new(config));
        }

        (pm, self.properties)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::InlineStats;
    use qfold_ast::{Expression, GateDecl, QubitRef, Statement};

    fn program_with_custom_call() -> Program {
        Program::new(vec![
            GateDecl::new(
                "foo",
                ["x"],
                ["q"],
                vec![Statement::call(
                    "U",
                    vec![Expression::ident("x"); 3],
                    vec![QubitRef::register("q")],
                )],
            )
            .into(),
            Statement::qreg("q", 1),
            Statement::call("foo", vec![Expression::Int(0)], vec![QubitRef::single("q", 0)]),
        ])
    }

    #[test]
    fn test_empty_pass_manager() {
        let pm = PassManager::new();
        assert!(pm.is_empty());
        assert_eq!(pm.len(), 0);

        let mut program = program_with_custom_call();
        let before = program.clone();
        pm.run(&mut program, &mut PropertySet::new()).unwrap();
        assert_eq!(program, before);
    }

    #[test]
    fn test_pass_manager_builder() {
        let (pm, mut props) = PassManagerBuilder::new()
            .with_primitives(PrimitiveGates::qasm2())
            .build();
        assert_eq!(pm.len(), 1);
        assert!(props.primitives.is_some());

        let mut program = program_with_custom_call();
        pm.run(&mut program, &mut props).unwrap();

        assert_eq!(
            program.statements.last(),
            Some(&Statement::call(
                "U",
                vec![Expression::Int(0); 3],
                vec![QubitRef::single("q", 0)],
            ))
        );
        let stats = props.get::<InlineStats>().unwrap();
        assert_eq!(stats.calls_expanded, 1);
    }

    #[test]
    fn test_builder_without_inlining() {
        let (pm, _) = PassManagerBuilder::new().without_inlining().build();
        assert!(pm.is_empty());
    }
}
