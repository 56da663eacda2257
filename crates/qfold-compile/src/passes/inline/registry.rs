//! Gate registry: call-target resolution, the static call graph, and memoized
//! canonicalization with cycle detection.

use std::collections::BTreeSet;

use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;
use tracing::debug;

use qfold_ast::{GateCall, GateDecl, Program, Statement};

use crate::error::{ArgKind, CompileError, CompileResult};
use crate::property::PrimitiveGates;

/// Index of a declared gate in the registry, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GateId(pub usize);

/// How a call target resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A built-in, opaque or overridden gate; never inlined.
    Primitive {
        /// `(classical, qubit)` parameter counts when the arity is known.
        arity: Option<(usize, usize)>,
    },
    /// A gate declared in the program.
    Declared(GateId),
}

/// Canonicalization progress of one gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitState {
    Unvisited,
    InProgress,
    Done,
}

#[derive(Debug)]
struct GateEntry {
    decl: GateDecl,
    state: VisitState,
    node: NodeIndex,
}

/// Registry of the gate declarations of one program.
#[derive(Debug)]
pub struct GateRegistry {
    entries: Vec<GateEntry>,
    by_name: FxHashMap<String, GateId>,
    opaque: FxHashMap<String, (usize, usize)>,
    primitives: PrimitiveGates,
    overrides: BTreeSet<String>,
    call_graph: DiGraph<GateId, ()>,
    /// Gates currently being canonicalized, outermost first.
    stack: Vec<GateId>,
}

impl GateRegistry {
    /// Collect the declarations of `program` and build the call graph.
    ///
    /// Fails on duplicate declarations, on calls inside gate bodies that do not
    /// resolve, and on argument-count mismatches inside gate bodies.
    pub fn build(
        program: &Program,
        primitives: PrimitiveGates,
        overrides: BTreeSet<String>,
    ) -> CompileResult<Self> {
        let mut registry = Self {
            entries: Vec::new(),
            by_name: FxHashMap::default(),
            opaque: FxHashMap::default(),
            primitives,
            overrides,
            call_graph: DiGraph::new(),
            stack: Vec::new(),
        };

        for stmt in &program.statements {
            match stmt {
                Statement::GateDecl(decl) => {
                    registry.ensure_unique(&decl.name)?;
                    let id = GateId(registry.entries.len());
                    let node = registry.call_graph.add_node(id);
                    registry.by_name.insert(decl.name.clone(), id);
                    registry.entries.push(GateEntry {
                        decl: decl.clone(),
                        state: VisitState::Unvisited,
                        node,
                    });
                }
                Statement::OpaqueDecl(decl) => {
                    registry.ensure_unique(&decl.name)?;
                    registry
                        .opaque
                        .insert(decl.name.clone(), (decl.params.len(), decl.qubits.len()));
                }
                _ => {}
            }
        }

        for idx in 0..registry.entries.len() {
            let caller = registry.entries[idx].node;
            let mut callees = Vec::new();
            for call in registry.entries[idx].decl.calls() {
                if let Resolution::Declared(callee) = registry.check_call(call)? {
                    callees.push(registry.entries[callee.0].node);
                }
            }
            for callee in callees {
                registry.call_graph.update_edge(caller, callee, ());
            }
        }

        debug!(
            "Gate registry: {} declared, {} opaque, {} call edges",
            registry.entries.len(),
            registry.opaque.len(),
            registry.call_graph.edge_count()
        );

        Ok(registry)
    }

    fn ensure_unique(&self, name: &str) -> CompileResult<()> {
        if self.by_name.contains_key(name) || self.opaque.contains_key(name) {
            return Err(CompileError::DuplicateGateDefinition(name.to_string()));
        }
        Ok(())
    }

    /// Resolve a call target name.
    pub fn resolve(&self, name: &str) -> CompileResult<Resolution> {
        if self.overrides.contains(name) {
            let arity = self
                .by_name
                .get(name)
                .map(|id| {
                    let decl = &self.entries[id.0].decl;
                    (decl.params.len(), decl.qubits.len())
                })
                .or_else(|| self.opaque.get(name).copied());
            return Ok(Resolution::Primitive { arity });
        }
        if let Some(&id) = self.by_name.get(name) {
            return Ok(Resolution::Declared(id));
        }
        if let Some(&arity) = self.opaque.get(name) {
            return Ok(Resolution::Primitive { arity: Some(arity) });
        }
        if self.primitives.contains(name) {
            return Ok(Resolution::Primitive { arity: None });
        }
        Err(CompileError::UnresolvedGate {
            name: name.to_string(),
        })
    }

    /// Resolve a call and check its argument counts against the target.
    pub fn check_call(&self, call: &GateCall) -> CompileResult<Resolution> {
        let resolution = self.resolve(&call.name)?;
        let arity = match resolution {
            Resolution::Declared(id) => {
                let decl = &self.entries[id.0].decl;
                Some((decl.params.len(), decl.qubits.len()))
            }
            Resolution::Primitive { arity } => arity,
        };

        if let Some((classical, qubits)) = arity {
            if call.params.len() != classical {
                return Err(CompileError::ArityMismatch {
                    gate: call.name.clone(),
                    kind: ArgKind::Classical,
                    expected: classical,
                    got: call.params.len(),
                });
            }
            if call.qubits.len() != qubits {
                return Err(CompileError::ArityMismatch {
                    gate: call.name.clone(),
                    kind: ArgKind::Qubit,
                    expected: qubits,
                    got: call.qubits.len(),
                });
            }
        }

        Ok(resolution)
    }

    /// Gate ids in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = GateId> + use<> {
        (0..self.entries.len()).map(GateId)
    }

    /// Look up a declared gate by name.
    pub fn id(&self, name: &str) -> Option<GateId> {
        self.by_name.get(name).copied()
    }

    /// The current declaration of a gate; canonical once its state is `Done`.
    pub fn decl(&self, id: GateId) -> &GateDecl {
        &self.entries[id.0].decl
    }

    /// Canonicalization state of a gate.
    pub fn state(&self, id: GateId) -> VisitState {
        self.entries[id.0].state
    }

    /// Number of declared gates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no gates are declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Custom gates called directly from a gate's body.
    pub fn callees(&self, id: GateId) -> Vec<GateId> {
        let mut callees: Vec<GateId> = self
            .call_graph
            .neighbors(self.entries[id.0].node)
            .map(|n| self.call_graph[n])
            .collect();
        callees.sort_unstable();
        callees
    }

    /// Make the body of `id` primitive-only.
    ///
    /// Every custom gate the body calls is canonicalized first; then `expand`
    /// receives the registry and the body, and returns the rewritten body.
    /// Finished gates are skipped, so each gate is expanded at most once.
    /// Reaching a gate that is still in progress is a cycle.
    pub fn canonicalize<F>(&mut self, id: GateId, expand: &mut F) -> CompileResult<()>
    where
        F: FnMut(&Self, GateId, Vec<Statement>) -> CompileResult<Vec<Statement>>,
    {
        match self.entries[id.0].state {
            VisitState::Done => return Ok(()),
            VisitState::InProgress => return Err(self.cycle_error(id)),
            VisitState::Unvisited => {}
        }

        self.entries[id.0].state = VisitState::InProgress;
        self.stack.push(id);

        for callee in self.callees(id) {
            self.canonicalize(callee, expand)?;
        }

        let body = std::mem::take(&mut self.entries[id.0].decl.body);
        let body = expand(self, id, body)?;
        self.entries[id.0].decl.body = body;

        self.stack.pop();
        self.entries[id.0].state = VisitState::Done;
        debug!("Canonicalized gate '{}'", self.entries[id.0].decl.name);

        Ok(())
    }

    fn cycle_error(&self, id: GateId) -> CompileError {
        let start = self.stack.iter().position(|&g| g == id).unwrap_or(0);
        let mut cycle: Vec<String> = self.stack[start..]
            .iter()
            .map(|g| self.entries[g.0].decl.name.clone())
            .collect();
        cycle.push(self.entries[id.0].decl.name.clone());
        CompileError::CyclicGateDefinition { cycle }
    }
}
