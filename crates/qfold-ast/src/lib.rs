//! Program Representation for qfold
//!
//! This crate provides the gate-level program model that the qfold passes
//! rewrite: register and gate declarations, gate calls, local ancilla
//! declarations, and symbolic classical expressions. Programs are built by an
//! external parser and rendered by an external printer; the [`std::fmt::Display`]
//! implementations here produce QASM 2 flavoured text for diagnostics and tests.
//!
//! # Example: Building a Program
//!
//! ```rust
//! use qfold_ast::{Expression, GateDecl, Program, QubitRef, Statement};
//!
//! let foo = GateDecl::new(
//!     "foo",
//!     ["x"],
//!     ["q"],
//!     vec![Statement::call(
//!         "U",
//!         vec![Expression::ident("x"); 3],
//!         vec![QubitRef::register("q")],
//!     )],
//! );
//!
//! let program = Program::new(vec![
//!     foo.into(),
//!     Statement::qreg("q", 1),
//!     Statement::call("foo", vec![Expression::Int(0)], vec![QubitRef::single("q", 0)]),
//! ]);
//!
//! assert_eq!(program.gate_decls().count(), 1);
//! assert!(program.to_string().contains("foo(0) q[0];"));
//! ```

mod ast;
mod display;

pub use ast::{
    AncillaDecl, BinOp, BitRef, Expression, GateCall, GateDecl, OpaqueDecl, Program, QubitRef,
    RegisterDecl, RegisterKind, Statement,
};
