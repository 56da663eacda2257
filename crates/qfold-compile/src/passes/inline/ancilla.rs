//! Ancilla resolution against a qubit context and the shared pool register.
//!
//! Every call expansion resolves the callee's ancilla declarations once, in
//! declaration order. Clean ancillas always come from the pool. Dirty ancillas
//! first borrow context qubits that the call does not already use, and fall
//! back to the pool for whatever remains. Pool slots are numbered per step from
//! zero (after any slots the callee body already uses), and the pool register
//! is sized by the largest per-step demand.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use qfold_ast::{AncillaDecl, QubitRef, Statement};

/// One register visible at an expansion site.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ContextEntry {
    /// A program register of the given size.
    Register { name: String, size: u32 },
    /// A qubit formal of the enclosing gate; always a single qubit.
    Formal(String),
}

/// The qubits visible at an expansion site, in scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QubitContext {
    entries: Vec<ContextEntry>,
}

impl QubitContext {
    /// An empty context: dirty ancillas can only come from the pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for a call inside a gate body: the enclosing gate's qubit
    /// formals, each of size one, in parameter order.
    pub fn symbolic(formals: &[String]) -> Self {
        Self {
            entries: formals
                .iter()
                .map(|name| ContextEntry::Formal(name.clone()))
                .collect(),
        }
    }

    /// Append a program register.
    pub fn push_register(&mut self, name: impl Into<String>, size: u32) {
        self.entries.push(ContextEntry::Register {
            name: name.into(),
            size,
        });
    }

    /// Number of qubits in the context.
    pub fn num_qubits(&self) -> u32 {
        self.entries
            .iter()
            .map(|entry| match entry {
                ContextEntry::Register { size, .. } => *size,
                ContextEntry::Formal(_) => 1,
            })
            .sum()
    }

    /// All qubits in scan order: registers in declaration order, each by
    /// increasing index.
    pub fn qubits(&self) -> impl Iterator<Item = QubitRef> + '_ {
        self.entries.iter().flat_map(|entry| {
            let refs: Vec<QubitRef> = match entry {
                ContextEntry::Register { name, size } => {
                    (0..*size).map(|i| QubitRef::single(name.clone(), i)).collect()
                }
                ContextEntry::Formal(name) => vec![QubitRef::register(name.clone())],
            };
            refs
        })
    }
}

/// Qubits bound to each ancilla name for one expansion step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AncillaBindings {
    bindings: FxHashMap<String, Vec<QubitRef>>,
}

impl AncillaBindings {
    /// Check whether `name` is an ancilla of the expanded gate.
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// The qubit bound to `name[index]`, if that slot exists.
    pub fn get(&self, name: &str, index: u32) -> Option<&QubitRef> {
        self.bindings
            .get(name)
            .and_then(|slots| slots.get(index as usize))
    }

    /// Number of bound ancilla registers.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if nothing was bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// What a single resolution step consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Pool slots handed to clean ancillas.
    pub clean: u32,
    /// Context qubits borrowed by dirty ancillas.
    pub borrowed: u32,
    /// Pool slots handed to dirty ancillas that found no free context qubit.
    pub dirty_from_pool: u32,
    /// Pool size this step needs, including slots reserved by the callee body.
    pub demand: u32,
}

/// Resolves ancilla declarations and tracks the pool high-water mark.
#[derive(Debug, Clone)]
pub struct AncillaAllocator {
    pool_register: String,
    high_water: u32,
    steps: usize,
}

impl AncillaAllocator {
    /// Create an allocator drawing from the named pool register.
    pub fn new(pool_register: impl Into<String>) -> Self {
        Self {
            pool_register: pool_register.into(),
            high_water: 0,
            steps: 0,
        }
    }

    /// Name of the pool register.
    pub fn pool_register(&self) -> &str {
        &self.pool_register
    }

    /// Largest per-step pool demand seen so far.
    pub fn pool_size(&self) -> u32 {
        self.high_water
    }

    /// Number of resolution steps performed.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Number of pool slots already referenced by `body`.
    ///
    /// A canonical body can mention pool qubits that were bound when one of its
    /// own nested calls was expanded; those slots stay live for the whole body.
    pub fn reserved_slots(&self, body: &[Statement]) -> u32 {
        body.iter()
            .flat_map(Statement::qubit_refs)
            .filter(|r| r.register == self.pool_register)
            .filter_map(|r| r.index)
            .map(|idx| idx + 1)
            .max()
            .unwrap_or(0)
    }

    /// Resolve `ancillas` for one call expansion.
    ///
    /// `consumed` are the actual qubit arguments of the call; a whole-register
    /// argument consumes every qubit of that register. Fresh pool slots start
    /// at `reserved`.
    pub fn resolve<'a>(
        &mut self,
        ancillas: impl IntoIterator<Item = &'a AncillaDecl>,
        context: &QubitContext,
        consumed: &[QubitRef],
        reserved: u32,
    ) -> (AncillaBindings, StepReport) {
        let mut bindings = AncillaBindings::default();
        let mut report = StepReport::default();
        let mut claimed: FxHashSet<QubitRef> = FxHashSet::default();
        let mut next_slot = reserved;

        for ancilla in ancillas {
            let mut slots = Vec::with_capacity(ancilla.size as usize);

            if ancilla.dirty {
                let free: Vec<QubitRef> = context
                    .qubits()
                    .filter(|q| !consumed.iter().any(|c| q.is_covered_by(c)))
                    .filter(|q| !claimed.contains(q))
                    .take(ancilla.size as usize)
                    .collect();
                for qubit in free {
                    claimed.insert(qubit.clone());
                    slots.push(qubit);
                }
                report.borrowed += u32::try_from(slots.len()).unwrap_or(u32::MAX);
            }

            let missing = ancilla.size - u32::try_from(slots.len()).unwrap_or(ancilla.size);
            for _ in 0..missing {
                slots.push(QubitRef::single(self.pool_register.clone(), next_slot));
                next_slot += 1;
            }
            if ancilla.dirty {
                report.dirty_from_pool += missing;
            } else {
                report.clean += missing;
            }

            trace!(
                "Bound {}ancilla {}[{}] to {:?}",
                if ancilla.dirty { "dirty " } else { "" },
                ancilla.name,
                ancilla.size,
                slots
            );
            bindings.bindings.insert(ancilla.name.clone(), slots);
        }

        report.demand = next_slot;
        self.high_water = self.high_water.max(next_slot);
        self.steps += 1;

        (bindings, report)
    }
}
