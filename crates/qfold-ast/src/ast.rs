//! Program representation consumed and produced by the qfold passes.

use serde::{Deserialize, Serialize};

/// A complete gate-level program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// QASM version (e.g., "2.0").
    pub version: String,
    /// Statements in the program, in source order.
    pub statements: Vec<Statement>,
}

impl Program {
    /// Create an `OPENQASM 2.0` program from a statement list.
    pub fn new(statements: Vec<Statement>) -> Self {
        Self {
            version: "2.0".to_string(),
            statements,
        }
    }

    /// Iterate over the gate declarations in declaration order.
    pub fn gate_decls(&self) -> impl Iterator<Item = &GateDecl> + '_ {
        self.statements.iter().filter_map(|stmt| match stmt {
            Statement::GateDecl(decl) => Some(decl),
            _ => None,
        })
    }

    /// Iterate over the quantum registers in declaration order.
    pub fn quantum_registers(&self) -> impl Iterator<Item = &RegisterDecl> + '_ {
        self.statements.iter().filter_map(|stmt| match stmt {
            Statement::RegisterDecl(reg) if reg.kind == RegisterKind::Quantum => Some(reg),
            _ => None,
        })
    }

    /// Look up a register declaration by name.
    pub fn register(&self, name: &str) -> Option<&RegisterDecl> {
        self.statements.iter().find_map(|stmt| match stmt {
            Statement::RegisterDecl(reg) if reg.name == name => Some(reg),
            _ => None,
        })
    }

    /// Number of leading preamble (`include`) statements.
    pub fn preamble_len(&self) -> usize {
        self.statements
            .iter()
            .take_while(|stmt| matches!(stmt, Statement::Include(_)))
            .count()
    }
}

/// A statement in a program or in a gate body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// Include statement: `include "qelib1.inc";`
    Include(String),

    /// Register declaration: `qreg q[n];` or `creg c[n];`
    RegisterDecl(RegisterDecl),

    /// Gate definition.
    GateDecl(GateDecl),

    /// Opaque gate declaration: `opaque name(params) qubits;`
    OpaqueDecl(OpaqueDecl),

    /// Local helper-qubit declaration, only meaningful inside a gate body.
    AncillaDecl(AncillaDecl),

    /// Gate application.
    GateCall(GateCall),

    /// Measurement: `measure q -> c;`
    Measure { qubit: QubitRef, bit: BitRef },

    /// Reset: `reset q;`
    Reset { qubit: QubitRef },

    /// Barrier: `barrier q, r;`
    Barrier { qubits: Vec<QubitRef> },
}

impl Statement {
    /// Declare a quantum register.
    pub fn qreg(name: impl Into<String>, size: u32) -> Self {
        Statement::RegisterDecl(RegisterDecl {
            name: name.into(),
            size,
            kind: RegisterKind::Quantum,
        })
    }

    /// Declare a classical register.
    pub fn creg(name: impl Into<String>, size: u32) -> Self {
        Statement::RegisterDecl(RegisterDecl {
            name: name.into(),
            size,
            kind: RegisterKind::Classical,
        })
    }

    /// Apply a gate.
    pub fn call(
        name: impl Into<String>,
        params: Vec<Expression>,
        qubits: Vec<QubitRef>,
    ) -> Self {
        Statement::GateCall(GateCall::new(name, params, qubits))
    }

    /// Check whether this is a gate application.
    pub fn is_call(&self) -> bool {
        matches!(self, Statement::GateCall(_))
    }

    /// Check whether this statement declares a gate (custom or opaque).
    pub fn is_gate_declaration(&self) -> bool {
        matches!(self, Statement::GateDecl(_) | Statement::OpaqueDecl(_))
    }

    /// Qubit references used by this statement, in operand order.
    ///
    /// Declarations report no references; gate bodies are not descended into.
    pub fn qubit_refs(&self) -> Vec<&QubitRef> {
        match self {
            Statement::GateCall(call) => call.qubits.iter().collect(),
            Statement::Measure { qubit, .. } | Statement::Reset { qubit } => vec![qubit],
            Statement::Barrier { qubits } => qubits.iter().collect(),
            Statement::Include(_)
            | Statement::RegisterDecl(_)
            | Statement::GateDecl(_)
            | Statement::OpaqueDecl(_)
            | Statement::AncillaDecl(_) => Vec::new(),
        }
    }

    /// Mutable access to the qubit references used by this statement.
    pub fn qubit_refs_mut(&mut self) -> Vec<&mut QubitRef> {
        match self {
            Statement::GateCall(call) => call.qubits.iter_mut().collect(),
            Statement::Measure { qubit, .. } | Statement::Reset { qubit } => vec![qubit],
            Statement::Barrier { qubits } => qubits.iter_mut().collect(),
            Statement::Include(_)
            | Statement::RegisterDecl(_)
            | Statement::GateDecl(_)
            | Statement::OpaqueDecl(_)
            | Statement::AncillaDecl(_) => Vec::new(),
        }
    }
}

/// Register kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegisterKind {
    /// `qreg`
    Quantum,
    /// `creg`
    Classical,
}

/// A register declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterDecl {
    pub name: String,
    pub size: u32,
    pub kind: RegisterKind,
}

impl RegisterDecl {
    /// Check whether this is a quantum register.
    pub fn is_quantum(&self) -> bool {
        self.kind == RegisterKind::Quantum
    }
}

/// A user-defined gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateDecl {
    /// Gate name.
    pub name: String,
    /// Classical formal parameters, in order.
    pub params: Vec<String>,
    /// Qubit formal parameters, in order.
    pub qubits: Vec<String>,
    /// Gate body.
    pub body: Vec<Statement>,
}

impl GateDecl {
    /// Create a gate declaration.
    pub fn new(
        name: impl Into<String>,
        params: impl IntoIterator<Item = impl Into<String>>,
        qubits: impl IntoIterator<Item = impl Into<String>>,
        body: Vec<Statement>,
    ) -> Self {
        Self {
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
            qubits: qubits.into_iter().map(Into::into).collect(),
            body,
        }
    }

    /// Ancilla declarations in the body, in declaration order.
    pub fn ancillas(&self) -> impl Iterator<Item = &AncillaDecl> + '_ {
        self.body.iter().filter_map(|stmt| match stmt {
            Statement::AncillaDecl(anc) => Some(anc),
            _ => None,
        })
    }

    /// Gate calls in the body, in order.
    pub fn calls(&self) -> impl Iterator<Item = &GateCall> + '_ {
        self.body.iter().filter_map(|stmt| match stmt {
            Statement::GateCall(call) => Some(call),
            _ => None,
        })
    }
}

impl From<GateDecl> for Statement {
    fn from(decl: GateDecl) -> Self {
        Statement::GateDecl(decl)
    }
}

/// An opaque gate: a primitive whose arity is known but whose body is not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpaqueDecl {
    pub name: String,
    pub params: Vec<String>,
    pub qubits: Vec<String>,
}

/// A helper-qubit declaration inside a gate body: `ancilla a[n];` or
/// `dirty ancilla a[n];`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncillaDecl {
    pub name: String,
    pub size: u32,
    /// Dirty ancillas may be borrowed in any state and must be returned unchanged.
    pub dirty: bool,
}

impl AncillaDecl {
    /// A clean (zero-initialized) ancilla register.
    pub fn clean(name: impl Into<String>, size: u32) -> Self {
        Self {
            name: name.into(),
            size,
            dirty: false,
        }
    }

    /// A dirty ancilla register.
    pub fn dirty(name: impl Into<String>, size: u32) -> Self {
        Self {
            name: name.into(),
            size,
            dirty: true,
        }
    }
}

impl From<AncillaDecl> for Statement {
    fn from(decl: AncillaDecl) -> Self {
        Statement::AncillaDecl(decl)
    }
}

/// A gate call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateCall {
    /// Gate name.
    pub name: String,
    /// Classical arguments (angles, etc.).
    pub params: Vec<Expression>,
    /// Qubits the gate acts on.
    pub qubits: Vec<QubitRef>,
}

impl GateCall {
    /// Create a gate call.
    pub fn new(name: impl Into<String>, params: Vec<Expression>, qubits: Vec<QubitRef>) -> Self {
        Self {
            name: name.into(),
            params,
            qubits,
        }
    }
}

impl From<GateCall> for Statement {
    fn from(call: GateCall) -> Self {
        Statement::GateCall(call)
    }
}

/// Reference to a qubit or a whole quantum register.
///
/// A `None` index refers to every qubit of the register, aligned one-to-one
/// with the other whole-register operands of the same statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QubitRef {
    pub register: String,
    pub index: Option<u32>,
}

impl QubitRef {
    /// Create a reference to a single qubit.
    pub fn single(register: impl Into<String>, index: u32) -> Self {
        Self {
            register: register.into(),
            index: Some(index),
        }
    }

    /// Create a reference to an entire register (or to a gate's qubit formal).
    pub fn register(register: impl Into<String>) -> Self {
        Self {
            register: register.into(),
            index: None,
        }
    }

    /// Check whether `other` is this qubit or covers it as a whole register.
    pub fn is_covered_by(&self, other: &QubitRef) -> bool {
        self.register == other.register && (other.index.is_none() || other.index == self.index)
    }
}

/// Reference to a classical bit or bit register.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitRef {
    pub register: String,
    pub index: Option<u32>,
}

impl BitRef {
    /// Create a reference to a single bit.
    pub fn single(register: impl Into<String>, index: u32) -> Self {
        Self {
            register: register.into(),
            index: Some(index),
        }
    }

    /// Create a reference to an entire register.
    pub fn register(register: impl Into<String>) -> Self {
        Self {
            register: register.into(),
            index: None,
        }
    }
}

/// A classical expression. Kept symbolic; passes never fold it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// Pi constant.
    Pi,
    /// Identifier (a classical formal parameter inside gate bodies).
    Identifier(String),
    /// Negation.
    Neg(Box<Expression>),
    /// Binary operation.
    BinOp {
        left: Box<Expression>,
        op: BinOp,
        right: Box<Expression>,
    },
    /// Unary function call: `sin(x)`, `sqrt(2)`, ...
    FnCall { name: String, args: Vec<Expression> },
    /// Parenthesized expression.
    Paren(Box<Expression>),
}

impl Expression {
    /// Create an identifier expression.
    pub fn ident(name: impl Into<String>) -> Self {
        Expression::Identifier(name.into())
    }

    /// Build `left op right`.
    pub fn binary(left: Expression, op: BinOp, right: Expression) -> Self {
        Expression::BinOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Check whether the expression mentions the given identifier.
    pub fn mentions(&self, name: &str) -> bool {
        match self {
            Expression::Identifier(id) => id == name,
            Expression::Int(_) | Expression::Float(_) | Expression::Pi => false,
            Expression::Neg(e) | Expression::Paren(e) => e.mentions(name),
            Expression::BinOp { left, right, .. } => left.mentions(name) || right.mentions(name),
            Expression::FnCall { args, .. } => args.iter().any(|a| a.mentions(name)),
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOp {
    /// Binding strength, higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Add | BinOp::Sub => 1,
            BinOp::Mul | BinOp::Div => 2,
            BinOp::Pow => 3,
        }
    }

    /// Source symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Pow => "^",
        }
    }
}
