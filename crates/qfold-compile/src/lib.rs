//! qfold Compilation Passes
//!
//! This crate provides the pass infrastructure for rewriting gate-level
//! programs, and the gate inlining pass that eliminates user-defined gates.
//!
//! # Overview
//!
//! Inlining substitutes every custom gate call with a copy of the gate's body,
//! specialized for the call's classical and qubit arguments, until only
//! primitive operations remain. Gates may declare local ancilla registers; each
//! expansion binds them either to qubits of the surrounding circuit (dirty
//! ancillas only) or to a shared pool register that grows on demand.
//!
//! # Architecture
//!
//! ```text
//! Program (from the parser)
//!       │
//!       ▼
//! ┌─────────────┐
//! │ PassManager │ ◄── PropertySet (primitive gates, pass results)
//! └─────────────┘
//!       │
//!       └── InlinePass
//!             ├── GateRegistry      resolve targets, call graph, cycle check
//!             ├── specialize        parameter substitution
//!             └── AncillaAllocator  context borrowing, pool high-water mark
//!       │
//!       ▼
//! Program (primitive calls only, for the printer)
//! ```
//!
//! # Example
//!
//! ```rust
//! use qfold_ast::{Expression, GateDecl, Program, QubitRef, Statement};
//! use qfold_compile::{InlineStats, PassManagerBuilder};
//!
//! let foo = GateDecl::new(
//!     "foo",
//!     ["x"],
//!     ["q"],
//!     vec![Statement::call("U", vec![Expression::ident("x"); 3], vec![QubitRef::register("q")])],
//! );
//! let mut program = Program::new(vec![
//!     foo.into(),
//!     Statement::qreg("q", 1),
//!     Statement::call("foo", vec![Expression::Int(0)], vec![QubitRef::single("q", 0)]),
//! ]);
//!
//! let (pm, mut props) = PassManagerBuilder::new().build();
//! pm.run(&mut program, &mut props).unwrap();
//!
//! assert_eq!(program.statements[2].to_string(), "U(0,0,0) q[0];");
//! assert_eq!(props.get::<InlineStats>().unwrap().pool_size, 0);
//! ```
//!
//! # Custom Passes
//!
//! Implement the [`Pass`] trait to create custom passes:
//!
//! ```rust
//! use qfold_ast::Program;
//! use qfold_compile::{CompileResult, Pass, PassKind, PropertySet};
//!
//! struct CountStatements;
//!
//! impl Pass for CountStatements {
//!     fn name(&self) -> &str { "count_statements" }
//!     fn kind(&self) -> PassKind { PassKind::Analysis }
//!
//!     fn run(&self, program: &mut Program, props: &mut PropertySet) -> CompileResult<()> {
//!         props.insert(program.statements.len());
//!         Ok(())
//!     }
//! }
//! ```

pub mod error;
pub mod manager;
pub mod pass;
pub mod property;

// Built-in passes
pub mod passes;

pub use error::{ArgKind, CompileError, CompileResult};
pub use manager::{PassManager, PassManagerBuilder};
pub use pass::{Pass, PassKind};
pub use passes::inline::inline;
pub use passes::{InlineConfig, InlinePass, InlineStats};
pub use property::{PrimitiveGates, PropertySet, QELIB1_GATES};
