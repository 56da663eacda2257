//! The inliner: canonicalize every declaration, flatten top-level calls, then
//! materialize the pool register.

use rustc_hash::FxHashSet;
use tracing::{debug, info};

use qfold_ast::{GateCall, Program, Statement};

use super::InlineConfig;
use super::InlineStats;
use super::ancilla::{AncillaAllocator, QubitContext};
use super::registry::{GateId, GateRegistry, Resolution};
use super::substitute::specialize;
use crate::error::CompileResult;
use crate::property::PrimitiveGates;

/// One run of the inliner over one program.
pub(crate) struct Inliner<'a> {
    config: &'a InlineConfig,
    primitives: &'a PrimitiveGates,
}

impl<'a> Inliner<'a> {
    pub(crate) fn new(config: &'a InlineConfig, primitives: &'a PrimitiveGates) -> Self {
        Self { config, primitives }
    }

    /// Inline every custom gate call in `program`.
    ///
    /// The program is only written once everything has been expanded, so a
    /// failing run leaves it untouched.
    pub(crate) fn run(&self, program: &mut Program) -> CompileResult<InlineStats> {
        let pool_register = pool_register_name(program, &self.config.pool_register);
        let mut registry = GateRegistry::build(
            program,
            self.primitives.clone(),
            self.config.overrides.clone(),
        )?;
        let mut expander = Expander::new(AncillaAllocator::new(pool_register.clone()));

        for id in registry.ids() {
            registry.canonicalize(
                id,
                &mut |reg: &GateRegistry, id: GateId, body: Vec<Statement>| {
                    let context = QubitContext::symbolic(&reg.decl(id).qubits);
                    expander.expand_all(reg, body, &context)
                },
            )?;
        }
        let nested_calls = expander.calls_expanded;

        let mut statements = Vec::with_capacity(program.statements.len());
        let mut context = QubitContext::new();
        for stmt in &program.statements {
            match stmt {
                Statement::GateDecl(decl) => {
                    let canonical = registry
                        .id(&decl.name)
                        .map_or_else(|| decl.clone(), |id| registry.decl(id).clone());
                    statements.push(Statement::GateDecl(canonical));
                }
                Statement::RegisterDecl(reg) => {
                    if reg.is_quantum() {
                        context.push_register(reg.name.clone(), reg.size);
                    }
                    statements.push(stmt.clone());
                }
                Statement::GateCall(call) => {
                    expander.expand_call(&registry, call, &context, &mut statements)?;
                }
                _ => statements.push(stmt.clone()),
            }
        }
        program.statements = statements;

        let pool_size = expander.allocator.pool_size();
        if pool_size > 0 {
            let at = program.preamble_len();
            program
                .statements
                .insert(at, Statement::qreg(pool_register.clone(), pool_size));
        }

        let stats = InlineStats {
            gates_canonicalized: registry.len(),
            calls_expanded: expander.calls_expanded,
            top_level_calls_expanded: expander.calls_expanded - nested_calls,
            statements_emitted: program.statements.len(),
            pool_size,
            pool_register: (pool_size > 0).then_some(pool_register),
        };

        info!(
            "Inlined {} calls ({} at top level), pool size {}",
            stats.calls_expanded, stats.top_level_calls_expanded, stats.pool_size
        );

        Ok(stats)
    }
}

/// Expands calls against canonical callee bodies.
struct Expander {
    allocator: AncillaAllocator,
    calls_expanded: usize,
}

impl Expander {
    fn new(allocator: AncillaAllocator) -> Self {
        Self {
            allocator,
            calls_expanded: 0,
        }
    }

    /// Expand every custom call in `body`, keeping all other statements.
    fn expand_all(
        &mut self,
        registry: &GateRegistry,
        body: Vec<Statement>,
        context: &QubitContext,
    ) -> CompileResult<Vec<Statement>> {
        let mut out = Vec::with_capacity(body.len());
        for stmt in body {
            match stmt {
                Statement::GateCall(call) => self.expand_call(registry, &call, context, &mut out)?,
                other => out.push(other),
            }
        }
        Ok(out)
    }

    /// Replace one call by its specialized callee body, appending to `out`.
    /// Primitive calls are appended unchanged.
    fn expand_call(
        &mut self,
        registry: &GateRegistry,
        call: &GateCall,
        context: &QubitContext,
        out: &mut Vec<Statement>,
    ) -> CompileResult<()> {
        let Resolution::Declared(id) = registry.check_call(call)? else {
            out.push(Statement::GateCall(call.clone()));
            return Ok(());
        };

        let decl = registry.decl(id);
        let reserved = self.allocator.reserved_slots(&decl.body);
        let (bindings, report) =
            self.allocator
                .resolve(decl.ancillas(), context, &call.qubits, reserved);
        let body = specialize(decl, &call.params, &call.qubits, &bindings)?;

        debug!(
            "Expanded '{}' into {} statements (clean {}, borrowed {}, dirty from pool {}, demand {})",
            call,
            body.len(),
            report.clean,
            report.borrowed,
            report.dirty_from_pool,
            report.demand
        );

        self.calls_expanded += 1;
        out.extend(body);
        Ok(())
    }
}

/// Pick the pool register name: the configured one, or the first
/// `name_1`, `name_2`, ... that nothing in the program already uses.
fn pool_register_name(program: &Program, preferred: &str) -> String {
    let mut taken: FxHashSet<&str> = FxHashSet::default();
    collect_names(&program.statements, &mut taken);

    if !taken.contains(preferred) {
        return preferred.to_string();
    }
    let mut suffix = 1_usize;
    loop {
        let candidate = format!("{preferred}_{suffix}");
        if !taken.contains(candidate.as_str()) {
            return candidate;
        }
        suffix += 1;
    }
}

fn collect_names<'p>(statements: &'p [Statement], taken: &mut FxHashSet<&'p str>) {
    for stmt in statements {
        match stmt {
            Statement::RegisterDecl(reg) => {
                taken.insert(&reg.name);
            }
            Statement::GateDecl(decl) => {
                taken.insert(&decl.name);
                taken.extend(decl.params.iter().map(String::as_str));
                taken.extend(decl.qubits.iter().map(String::as_str));
                collect_names(&decl.body, taken);
            }
            Statement::OpaqueDecl(decl) => {
                taken.insert(&decl.name);
            }
            Statement::AncillaDecl(anc) => {
                taken.insert(&anc.name);
            }
            _ => {}
        }
        taken.extend(stmt.qubit_refs().into_iter().map(|r| r.register.as_str()));
    }
}
