//! QASM 2 flavoured rendering of the program representation.
//!
//! Operands are joined with `,` and gate bodies are indented with a tab, so a
//! rendered program reads like the source it was parsed from.

use std::fmt;

use crate::ast::{
    AncillaDecl, BinOp, BitRef, Expression, GateCall, GateDecl, OpaqueDecl, Program, QubitRef,
    RegisterDecl, RegisterKind, Statement,
};

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "OPENQASM {};", self.version)?;
        writeln!(f)?;
        for stmt in &self.statements {
            writeln!(f, "{stmt}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Include(path) => write!(f, "include \"{path}\";"),
            Statement::RegisterDecl(reg) => write!(f, "{reg}"),
            Statement::GateDecl(decl) => write!(f, "{decl}"),
            Statement::OpaqueDecl(decl) => write!(f, "{decl}"),
            Statement::AncillaDecl(decl) => write!(f, "{decl}"),
            Statement::GateCall(call) => write!(f, "{call}"),
            Statement::Measure { qubit, bit } => write!(f, "measure {qubit} -> {bit};"),
            Statement::Reset { qubit } => write!(f, "reset {qubit};"),
            Statement::Barrier { qubits } => write!(f, "barrier {};", join(qubits)),
        }
    }
}

impl fmt::Display for RegisterDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self.kind {
            RegisterKind::Quantum => "qreg",
            RegisterKind::Classical => "creg",
        };
        write!(f, "{keyword} {}[{}];", self.name, self.size)
    }
}

impl fmt::Display for GateDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gate {}", self.name)?;
        if !self.params.is_empty() {
            write!(f, "({})", self.params.join(","))?;
        }
        writeln!(f, " {} {{", self.qubits.join(","))?;
        for stmt in &self.body {
            writeln!(f, "\t{stmt}")?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for OpaqueDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "opaque {}", self.name)?;
        if !self.params.is_empty() {
            write!(f, "({})", self.params.join(","))?;
        }
        write!(f, " {};", self.qubits.join(","))
    }
}

impl fmt::Display for AncillaDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dirty {
            write!(f, "dirty ")?;
        }
        write!(f, "ancilla {}[{}];", self.name, self.size)
    }
}

impl fmt::Display for GateCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.params.is_empty() {
            write!(f, "({})", join(&self.params))?;
        }
        write!(f, " {};", join(&self.qubits))
    }
}

impl fmt::Display for QubitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(idx) => write!(f, "{}[{idx}]", self.register),
            None => write!(f, "{}", self.register),
        }
    }
}

impl fmt::Display for BitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(idx) => write!(f, "{}[{idx}]", self.register),
            None => write!(f, "{}", self.register),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Int(v) => write!(f, "{v}"),
            Expression::Float(v) => write!(f, "{v}"),
            Expression::Pi => write!(f, "pi"),
            Expression::Identifier(name) => write!(f, "{name}"),
            Expression::Neg(e) => {
                if matches!(**e, Expression::BinOp { .. }) {
                    write!(f, "-({e})")
                } else {
                    write!(f, "-{e}")
                }
            }
            Expression::BinOp { left, op, right } => {
                write_operand(f, left, *op, false)?;
                write!(f, "{}", op.symbol())?;
                write_operand(f, right, *op, true)
            }
            Expression::FnCall { name, args } => write!(f, "{name}({})", join(args)),
            Expression::Paren(e) => write!(f, "({e})"),
        }
    }
}

/// Write a binary operand, parenthesizing it when a substituted subexpression
/// binds looser than its new parent.
fn write_operand(
    f: &mut fmt::Formatter<'_>,
    operand: &Expression,
    parent: BinOp,
    is_right: bool,
) -> fmt::Result {
    let needs_parens = match operand {
        Expression::BinOp { op, .. } => {
            op.precedence() < parent.precedence()
                || (is_right && op.precedence() == parent.precedence() && parent != BinOp::Pow)
                || (!is_right && parent == BinOp::Pow && op.precedence() == parent.precedence())
        }
        _ => false,
    };
    if needs_parens {
        write!(f, "({operand})")
    } else {
        write!(f, "{operand}")
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
