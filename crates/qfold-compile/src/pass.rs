//! Pass trait and types for compilation passes.

use qfold_ast::Program;

use crate::error::CompileResult;
use crate::property::PropertySet;

/// The kind of compilation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Analysis pass that reads but does not modify the program.
    Analysis,
    /// Transformation pass that modifies the program.
    Transformation,
}

/// A compilation pass that operates on a program.
///
/// Each pass performs a specific transformation or analysis; passes communicate
/// through the [`PropertySet`].
pub trait Pass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Get the kind of this pass.
    fn kind(&self) -> PassKind;

    /// Run the pass on the given program.
    ///
    /// For analysis passes, this should not modify the program but may
    /// write to the `PropertySet`.
    fn run(&self, program: &mut Program, properties: &mut PropertySet) -> CompileResult<()>;

    /// Check if this pass should run based on current state.
    fn should_run(&self, _program: &Program, _properties: &PropertySet) -> bool {
        true
    }
}
