//! Circuit registry: structural deduplication across sampler calls.
//!
//! The registry assigns each unique circuit structure a stable index.
//! Indices are append-only for the lifetime of the owning sampler and
//! never reused or reassigned; jobs hold indices into the registry
//! rather than circuit copies.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use quasar_ir::{Circuit, CircuitSignature};

/// One registered circuit structure.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    /// Stable index of this entry.
    pub index: usize,
    /// The registered circuit, shared read-only after registration.
    pub circuit: Arc<Circuit>,
    /// Declared symbolic parameters, in binding order.
    pub parameters: Vec<String>,
}

/// Deduplicating store of circuit structures.
///
/// Lookup is keyed on [`CircuitSignature`]; the map's hashing acts as a
/// prefilter and signature equality as the strict collision guard, so
/// two distinct structures can never share an index.
#[derive(Debug, Default)]
pub struct CircuitRegistry {
    ids: FxHashMap<CircuitSignature, usize>,
    entries: Vec<RegistryEntry>,
}

impl CircuitRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the index for a precomputed signature.
    pub fn index_of(&self, signature: &CircuitSignature) -> Option<usize> {
        self.ids.get(signature).copied()
    }

    /// Register a circuit, returning its stable index.
    ///
    /// A structural duplicate returns the existing index with no
    /// mutation; a new structure is appended.
    pub fn register(&mut self, circuit: &Circuit) -> usize {
        let signature = CircuitSignature::of(circuit);
        self.register_with_signature(signature, circuit)
    }

    /// Register with a precomputed signature.
    ///
    /// Callers that probed [`CircuitRegistry::index_of`] first use this
    /// to avoid recomputing the signature; the lookup is repeated here
    /// so a concurrent registration between probe and append cannot
    /// produce two indices for one structure.
    pub fn register_with_signature(
        &mut self,
        signature: CircuitSignature,
        circuit: &Circuit,
    ) -> usize {
        if let Some(index) = self.ids.get(&signature) {
            return *index;
        }
        let index = self.entries.len();
        debug!(index, name = circuit.name(), "registering new circuit structure");
        self.ids.insert(signature, index);
        self.entries.push(RegistryEntry {
            index,
            circuit: Arc::new(circuit.clone()),
            parameters: circuit.parameters(),
        });
        index
    }

    /// Get an entry by index.
    pub fn get(&self, index: usize) -> Option<&RegistryEntry> {
        self.entries.get(index)
    }

    /// All entries, in registration order.
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Number of unique circuit structures.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quasar_ir::{ParameterExpression, QubitId};

    #[test]
    fn test_register_dedups() {
        let mut registry = CircuitRegistry::new();
        let bell = Circuit::bell().unwrap();

        let first = registry.register(&bell);
        let second = registry.register(&Circuit::bell().unwrap());

        assert_eq!(first, 0);
        assert_eq!(second, 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_appends_new_structures() {
        let mut registry = CircuitRegistry::new();
        registry.register(&Circuit::bell().unwrap());
        let ghz = registry.register(&Circuit::ghz(3).unwrap());

        assert_eq!(ghz, 1);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(1).unwrap().index, 1);
    }

    #[test]
    fn test_entry_records_declared_parameters() {
        let mut registry = CircuitRegistry::new();
        let mut circuit = Circuit::with_size("var", 1, 1);
        circuit
            .ry(ParameterExpression::symbol("theta"), QubitId(0))
            .unwrap()
            .measure_all()
            .unwrap();

        let index = registry.register(&circuit);
        assert_eq!(registry.get(index).unwrap().parameters, vec!["theta"]);
    }

    #[test]
    fn test_indices_stable_across_interleaved_registration() {
        let mut registry = CircuitRegistry::new();
        let bell = Circuit::bell().unwrap();
        let ghz = Circuit::ghz(4).unwrap();

        assert_eq!(registry.register(&bell), 0);
        assert_eq!(registry.register(&ghz), 1);
        assert_eq!(registry.register(&bell), 0);
        assert_eq!(registry.register(&ghz), 1);
        assert_eq!(registry.len(), 2);
    }
}
