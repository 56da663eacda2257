//! `PropertySet` and related types for pass communication.
//!
//! Passes share target information and their results through a
//! [`PropertySet`]: the set of primitive gate names the target understands has
//! a dedicated field, and anything else is stored by type.
//!
//! # Examples
//!
//! ```
//! use qfold_compile::{PrimitiveGates, PropertySet};
//!
//! let props = PropertySet::new().with_primitives(PrimitiveGates::qasm2());
//!
//! let prims = props.primitives.as_ref().unwrap();
//! assert!(prims.contains("CX"));
//! assert!(!prims.contains("h"));
//! ```

use std::any::{Any, TypeId};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Gate names defined by `qelib1.inc`.
pub const QELIB1_GATES: &[&str] = &[
    "u3", "u2", "u1", "cx", "id", "u0", "u", "p", "x", "y", "z", "h", "s", "sdg", "t", "tdg",
    "rx", "ry", "rz", "sx", "sxdg", "cz", "cy", "swap", "ch", "ccx", "cswap", "crx", "cry", "crz",
    "cu1", "cp", "cu3", "csx", "cu", "rxx", "rzz", "rccx", "rc3x", "c3x", "c3sqrtx", "c4x",
];

/// Built-in operations of the target: calls to these are never inlined unless
/// the program declares a gate of the same name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimitiveGates {
    gates: Vec<String>,
}

impl PrimitiveGates {
    /// Create a primitive gate set.
    pub fn new(gates: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            gates: gates.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if a gate is primitive.
    pub fn contains(&self, gate: &str) -> bool {
        self.gates.iter().any(|g| g == gate)
    }

    /// Get the primitive gate names.
    pub fn gates(&self) -> &[String] {
        &self.gates
    }

    /// The two gates built into OpenQASM 2: `U` and `CX`.
    pub fn qasm2() -> Self {
        Self::new(["U", "CX"])
    }

    /// The OpenQASM 2 built-ins plus the `qelib1.inc` standard gates.
    pub fn qelib1() -> Self {
        Self::new(["U", "CX"].iter().chain(QELIB1_GATES).copied())
    }
}

impl Default for PrimitiveGates {
    fn default() -> Self {
        Self::qelib1()
    }
}

/// Properties shared between compilation passes.
///
/// Passes can store arbitrary data using the type-safe [`insert`](Self::insert)
/// and [`get`](Self::get) methods. Each type can have at most one value stored.
#[derive(Debug, Default)]
pub struct PropertySet {
    /// Primitive gate set of the target.
    ///
    /// Passes fall back to [`PrimitiveGates::default`] when unset.
    pub primitives: Option<PrimitiveGates>,

    /// Custom properties storage (type-erased).
    custom: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PropertySet {
    /// Create a new empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the primitive gate set.
    #[must_use]
    pub fn with_primitives(mut self, primitives: PrimitiveGates) -> Self {
        self.primitives = Some(primitives);
        self
    }

    /// Insert a custom property.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.custom.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a custom property.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.custom
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Get a mutable custom property.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.custom
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    /// Remove a custom property.
    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.custom
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|v| *v)
    }
}
