//! End-to-end inlining scenarios, checked against the printed program.
//!
//! Every test builds a program the way the parser would, runs the inliner
//! through the public API, and compares the result as text.

use qfold_ast::{AncillaDecl, Expression, GateDecl, Program, QubitRef, Statement};
use qfold_compile::{
    ArgKind, CompileError, InlineStats, Pass, PassManagerBuilder, PropertySet, inline,
};

/// Helper: `CX control,target;`
fn cx(control: QubitRef, target: QubitRef) -> Statement {
    Statement::call("CX", vec![], vec![control, target])
}

/// Helper: a gate without classical parameters.
fn gate(name: &str, qubits: &[&str], body: Vec<Statement>) -> Statement {
    GateDecl::new(name, Vec::<String>::new(), qubits.iter().copied(), body).into()
}

/// Helper: `gate foo(x) q { U(x,x,x) q; }`
fn foo() -> Statement {
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
    .into()
}

/// Helper: a gate that applies `CX p,<ancilla>[i]` for every declared ancilla
/// qubit, in declaration order.
fn ancilla_gate(ancillas: Vec<AncillaDecl>) -> Statement {
    let mut body: Vec<Statement> = Vec::new();
    for ancilla in &ancillas {
        for i in 0..ancilla.size {
            body.push(cx(
                QubitRef::register("p"),
                QubitRef::single(ancilla.name.clone(), i),
            ));
        }
    }
    let decls = ancillas.into_iter().map(Statement::AncillaDecl);
    gate("foo", &["p"], decls.chain(body).collect())
}

fn inline_and_print(mut program: Program) -> (String, InlineStats) {
    let (pm, mut props) = PassManagerBuilder::new().build();
    pm.run(&mut program, &mut props).unwrap();
    let stats = props.remove::<InlineStats>().unwrap();
    (program.to_string(), stats)
}

// ============================================================================
// Literal scenarios
// ============================================================================

#[test]
fn test_single_parameterized_gate() {
    let program = Program::new(vec![
        foo(),
        Statement::qreg("q", 1),
        Statement::call("foo", vec![Expression::Int(0)], vec![QubitRef::single("q", 0)]),
    ]);

    let (text, stats) = inline_and_print(program);

    assert_eq!(
        text,
        "OPENQASM 2.0;\n\ngate foo(x) q {\n\tU(x,x,x) q;\n}\nqreg q[1];\nU(0,0,0) q[0];\n"
    );
    assert_eq!(stats.pool_size, 0);
    assert_eq!(stats.pool_register, None);
}

#[test]
fn test_two_level_nesting() {
    let bar = gate(
        "bar",
        &["p"],
        vec![Statement::call(
            "foo",
            vec![Expression::Pi],
            vec![QubitRef::register("p")],
        )],
    );
    let program = Program::new(vec![
        foo(),
        bar,
        Statement::qreg("q", 1),
        Statement::call("bar", vec![], vec![QubitRef::single("q", 0)]),
    ]);

    let (text, stats) = inline_and_print(program);

    assert_eq!(
        text,
        "OPENQASM 2.0;\n\n\
         gate foo(x) q {\n\tU(x,x,x) q;\n}\n\
         gate bar p {\n\tU(pi,pi,pi) p;\n}\n\
         qreg q[1];\n\
         U(pi,pi,pi) q[0];\n"
    );
    assert_eq!(stats.calls_expanded, 2);
    assert_eq!(stats.top_level_calls_expanded, 1);
}

#[test]
fn test_two_clean_ancillas_without_spare_qubits() {
    let program = Program::new(vec![
        ancilla_gate(vec![AncillaDecl::clean("a", 1), AncillaDecl::clean("b", 1)]),
        Statement::qreg("q", 1),
        Statement::call("foo", vec![], vec![QubitRef::single("q", 0)]),
    ]);

    let (text, stats) = inline_and_print(program);

    assert_eq!(
        text,
        "OPENQASM 2.0;\n\n\
         qreg anc[2];\n\
         gate foo p {\n\tancilla a[1];\n\tancilla b[1];\n\tCX p,a[0];\n\tCX p,b[0];\n}\n\
         qreg q[1];\n\
         CX q[0],anc[0];\n\
         CX q[0],anc[1];\n"
    );
    assert_eq!(stats.pool_size, 2);
    assert_eq!(stats.pool_register.as_deref(), Some("anc"));
}

#[test]
fn test_dirty_ancilla_borrows_spare_qubit() {
    let program = Program::new(vec![
        ancilla_gate(vec![AncillaDecl::dirty("a", 1)]),
        Statement::qreg("q", 2),
        Statement::call("foo", vec![], vec![QubitRef::single("q", 0)]),
    ]);

    let (text, stats) = inline_and_print(program);

    assert!(text.ends_with("qreg q[2];\nCX q[0],q[1];\n"));
    assert!(!text.contains("qreg anc"));
    assert_eq!(stats.pool_size, 0);
}

#[test]
fn test_dirty_ancilla_without_spare_qubit_uses_pool() {
    let program = Program::new(vec![
        ancilla_gate(vec![AncillaDecl::dirty("a", 1)]),
        Statement::qreg("q", 1),
        Statement::call("foo", vec![], vec![QubitRef::single("q", 0)]),
    ]);

    let (text, stats) = inline_and_print(program);

    assert!(text.starts_with("OPENQASM 2.0;\n\nqreg anc[1];\ngate foo p {"));
    assert!(text.ends_with("qreg q[1];\nCX q[0],anc[0];\n"));
    assert_eq!(stats.pool_size, 1);
}

#[test]
fn test_dirty_ancilla_spans_registers() {
    let program = Program::new(vec![
        ancilla_gate(vec![AncillaDecl::dirty("a", 2)]),
        Statement::qreg("q", 2),
        Statement::qreg("r", 1),
        Statement::call("foo", vec![], vec![QubitRef::single("q", 0)]),
    ]);

    let (text, stats) = inline_and_print(program);

    assert!(text.ends_with("qreg r[1];\nCX q[0],q[1];\nCX q[0],r[0];\n"));
    assert_eq!(stats.pool_size, 0);
}

#[test]
fn test_mixed_clean_and_dirty_share_pool() {
    let program = Program::new(vec![
        ancilla_gate(vec![AncillaDecl::clean("a", 1), AncillaDecl::dirty("b", 1)]),
        Statement::qreg("q", 1),
        Statement::call("foo", vec![], vec![QubitRef::single("q", 0)]),
    ]);

    let (text, stats) = inline_and_print(program);

    assert!(text.starts_with("OPENQASM 2.0;\n\nqreg anc[2];\n"));
    assert!(text.ends_with("CX q[0],anc[0];\nCX q[0],anc[1];\n"));
    assert_eq!(stats.pool_size, 2);
}

// ============================================================================
// Pool sizing across steps
// ============================================================================

#[test]
fn test_pool_is_largest_single_step_demand() {
    let small = GateDecl::new(
        "small",
        Vec::<String>::new(),
        ["p"],
        vec![
            AncillaDecl::clean("a", 1).into(),
            cx(QubitRef::register("p"), QubitRef::single("a", 0)),
        ],
    );
    let large = GateDecl::new(
        "large",
        Vec::<String>::new(),
        ["p"],
        vec![
            AncillaDecl::clean("a", 3).into(),
            cx(QubitRef::register("p"), QubitRef::single("a", 2)),
        ],
    );
    let program = Program::new(vec![
        small.into(),
        large.into(),
        Statement::qreg("q", 1),
        Statement::call("small", vec![], vec![QubitRef::single("q", 0)]),
        Statement::call("large", vec![], vec![QubitRef::single("q", 0)]),
        Statement::call("small", vec![], vec![QubitRef::single("q", 0)]),
    ]);

    let (text, stats) = inline_and_print(program);

    assert_eq!(stats.pool_size, 3);
    assert!(text.ends_with("CX q[0],anc[0];\nCX q[0],anc[2];\nCX q[0],anc[0];\n"));
}

// ============================================================================
// Error taxonomy
// ============================================================================

#[test]
fn test_cyclic_definition_is_reported() {
    let mut program = Program::new(vec![gate(
        "loop",
        &["q"],
        vec![Statement::call("loop", vec![], vec![QubitRef::register("q")])],
    )]);

    let err = inline(&mut program).unwrap_err();

    assert_eq!(err.to_string(), "Cyclic gate definition: loop -> loop");
}

#[test]
fn test_unresolved_gate_is_reported() {
    let mut program = Program::new(vec![
        Statement::qreg("q", 1),
        Statement::call("mystery", vec![], vec![QubitRef::single("q", 0)]),
    ]);

    let err = inline(&mut program).unwrap_err();

    assert!(matches!(err, CompileError::UnresolvedGate { ref name } if name == "mystery"));
}

#[test]
fn test_arity_mismatch_inside_body_is_reported() {
    let bar = gate(
        "bar",
        &["p", "r"],
        vec![Statement::call(
            "foo",
            vec![Expression::Pi],
            vec![QubitRef::register("p"), QubitRef::register("r")],
        )],
    );
    let mut program = Program::new(vec![foo(), bar]);

    let err = inline(&mut program).unwrap_err();

    assert!(matches!(
        err,
        CompileError::ArityMismatch {
            ref gate,
            kind: ArgKind::Qubit,
            expected: 1,
            got: 2,
        } if gate == "foo"
    ));
    assert_eq!(err.to_string(), "Gate 'foo' expects 1 qubit arguments, got 2");
}

#[test]
fn test_duplicate_definition_is_reported() {
    let mut program = Program::new(vec![foo(), foo()]);

    let err = inline(&mut program).unwrap_err();

    assert!(matches!(err, CompileError::DuplicateGateDefinition(ref name) if name == "foo"));
}

#[test]
fn test_failed_run_keeps_program() {
    let mut program = Program::new(vec![
        ancilla_gate(vec![AncillaDecl::clean("a", 1)]),
        Statement::qreg("q", 1),
        Statement::call("foo", vec![], vec![QubitRef::single("q", 0)]),
        Statement::call("foo", vec![Expression::Pi], vec![QubitRef::single("q", 0)]),
    ]);
    let before = program.clone();

    let (pm, mut props) = PassManagerBuilder::new().build();
    assert!(pm.run(&mut program, &mut props).is_err());

    assert_eq!(program, before);
    assert!(props.get::<InlineStats>().is_none());
}

#[test]
fn test_pass_runs_standalone() {
    let mut program = Program::new(vec![
        foo(),
        Statement::qreg("q", 1),
        Statement::call("foo", vec![Expression::ident("theta")], vec![QubitRef::single("q", 0)]),
    ]);
    let mut props = PropertySet::new();

    qfold_compile::InlinePass::default()
        .run(&mut program, &mut props)
        .unwrap();

    assert_eq!(
        program.statements.last().map(ToString::to_string).as_deref(),
        Some("U(theta,theta,theta) q[0];")
    );
    assert_eq!(props.get::<InlineStats>().map(|s| s.calls_expanded), Some(1));
}
