//! Parameter substitution: specializing a gate body for one call site.

use rustc_hash::FxHashMap;

use qfold_ast::{Expression, GateDecl, QubitRef, Statement};

use super::ancilla::AncillaBindings;
use crate::error::{CompileError, CompileResult};

/// Produce a copy of `decl.body` specialized for the given actual arguments.
///
/// Classical formals are replaced by the actual expressions verbatim, qubit
/// formals by the actual qubit references, and ancilla references by their
/// bindings. Ancilla declarations are dropped. All replacements happen in a
/// single traversal, so an actual argument is never rewritten again.
///
/// Argument counts must already have been checked against the declaration.
pub fn specialize(
    decl: &GateDecl,
    params: &[Expression],
    qubits: &[QubitRef],
    ancillas: &AncillaBindings,
) -> CompileResult<Vec<Statement>> {
    let classical: FxHashMap<&str, &Expression> = decl
        .params
        .iter()
        .map(String::as_str)
        .zip(params)
        .collect();
    let quantum: FxHashMap<&str, &QubitRef> = decl
        .qubits
        .iter()
        .map(String::as_str)
        .zip(qubits)
        .collect();

    let mut out = Vec::with_capacity(decl.body.len());
    for stmt in &decl.body {
        if matches!(stmt, Statement::AncillaDecl(_)) {
            continue;
        }

        let mut stmt = stmt.clone();
        if let Statement::GateCall(call) = &mut stmt {
            for param in &mut call.params {
                *param = substitute_expression(param, &classical);
            }
        }
        for qubit in stmt.qubit_refs_mut() {
            *qubit = substitute_qubit(&decl.name, qubit, &quantum, ancillas)?;
        }
        out.push(stmt);
    }

    Ok(out)
}

/// Replace every identifier bound in `bindings`, leaving everything else as is.
pub fn substitute_expression(
    expr: &Expression,
    bindings: &FxHashMap<&str, &Expression>,
) -> Expression {
    match expr {
        Expression::Identifier(name) => bindings
            .get(name.as_str())
            .map_or_else(|| expr.clone(), |&actual| actual.clone()),
        Expression::Int(_) | Expression::Float(_) | Expression::Pi => expr.clone(),
        Expression::Neg(e) => Expression::Neg(Box::new(substitute_expression(e, bindings))),
        Expression::Paren(e) => Expression::Paren(Box::new(substitute_expression(e, bindings))),
        Expression::BinOp { left, op, right } => Expression::BinOp {
            left: Box::new(substitute_expression(left, bindings)),
            op: *op,
            right: Box::new(substitute_expression(right, bindings)),
        },
        Expression::FnCall { name, args } => Expression::FnCall {
            name: name.clone(),
            args: args
                .iter()
                .map(|a| substitute_expression(a, bindings))
                .collect(),
        },
    }
}

fn substitute_qubit(
    gate: &str,
    qubit: &QubitRef,
    formals: &FxHashMap<&str, &QubitRef>,
    ancillas: &AncillaBindings,
) -> CompileResult<QubitRef> {
    if qubit.index.is_none() {
        if let Some(&actual) = formals.get(qubit.register.as_str()) {
            return Ok(actual.clone());
        }
    }

    if ancillas.contains(&qubit.register) {
        return qubit
            .index
            .and_then(|idx| ancillas.get(&qubit.register, idx))
            .cloned()
            .ok_or_else(|| CompileError::InvalidAncillaReference {
                gate: gate.to_string(),
                name: qubit.register.clone(),
                index: qubit.index,
            });
    }

    Ok(qubit.clone())
}
