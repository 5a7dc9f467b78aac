//! Transpilation stage: lowering registry circuits to a backend target.
//!
//! The stage is amortized: it only ever lowers the registry suffix that
//! has not been transpiled yet, and appends the results. An existing
//! prefix is never re-transpiled. On any lowering failure the whole
//! extension is abandoned and the transpiled set keeps its previous
//! length — partial results are never cached.
//!
//! This module fixes the caching contract, not a transpilation
//! algorithm: lowering here is a basis translation of a few common
//! gates plus a pass-through for everything the target supports
//! natively. Backends with richer compilation needs do it behind
//! their own `run` implementation.

use std::sync::Arc;

use serde_json::Map;
use tracing::{debug, instrument};

use quasar_hal::Target;
use quasar_ir::{Circuit, Gate, Instruction, InstructionKind, QubitId};

use crate::error::SamplerError;
use crate::registry::RegistryEntry;

/// Incremental circuit-lowering stage.
#[derive(Debug, Clone)]
pub struct TranspilationStage {
    /// Bypass lowering entirely and use registry circuits verbatim.
    ///
    /// Trust boundary: with the skip enabled, callers are responsible
    /// for submitting circuits that are already backend-compatible; the
    /// stage does not validate them.
    skip: bool,
    /// Backend-specific transpiler options, recorded but not interpreted.
    options: Map<String, serde_json::Value>,
}

impl TranspilationStage {
    /// Create a stage that lowers circuits to the target.
    pub fn new() -> Self {
        Self {
            skip: false,
            options: Map::new(),
        }
    }

    /// Create a stage that bypasses lowering.
    pub fn skipping() -> Self {
        Self {
            skip: true,
            options: Map::new(),
        }
    }

    /// Attach backend-specific transpiler options.
    pub fn with_options(mut self, options: Map<String, serde_json::Value>) -> Self {
        self.options = options;
        self
    }

    /// Whether lowering is bypassed.
    pub fn is_skipped(&self) -> bool {
        self.skip
    }

    /// Recorded transpiler options.
    pub fn options(&self) -> &Map<String, serde_json::Value> {
        &self.options
    }

    /// Extend `transpiled` to cover every registry entry.
    ///
    /// Only `entries[transpiled.len()..]` is lowered. The extension is
    /// all-or-nothing: an error leaves `transpiled` untouched.
    #[instrument(skip(self, entries, transpiled, target), fields(backend = %target.name))]
    pub fn ensure_transpiled(
        &self,
        entries: &[RegistryEntry],
        transpiled: &mut Vec<Arc<Circuit>>,
        target: &Target,
    ) -> Result<(), SamplerError> {
        let start = transpiled.len();
        if start >= entries.len() {
            return Ok(());
        }
        debug!(
            pending = entries.len() - start,
            cached = start,
            "extending transpiled set"
        );

        let mut extension = Vec::with_capacity(entries.len() - start);
        for entry in &entries[start..] {
            if self.skip {
                extension.push(Arc::clone(&entry.circuit));
            } else {
                extension.push(Arc::new(lower(&entry.circuit, target)?));
            }
        }
        transpiled.extend(extension);
        Ok(())
    }
}

impl Default for TranspilationStage {
    fn default() -> Self {
        Self::new()
    }
}

/// Lower one circuit into the target's instruction set.
fn lower(circuit: &Circuit, target: &Target) -> Result<Circuit, SamplerError> {
    if circuit.num_qubits() as u32 > target.num_qubits {
        return Err(SamplerError::Transpilation(format!(
            "circuit '{}' uses {} qubits but target '{}' has {}",
            circuit.name(),
            circuit.num_qubits(),
            target.name,
            target.num_qubits
        )));
    }

    let mut lowered = Vec::with_capacity(circuit.instructions().len());
    for inst in circuit.instructions() {
        match &inst.kind {
            InstructionKind::Gate(gate) => {
                for out in lower_gate(gate, &inst.qubits, target)? {
                    lowered.push(out);
                }
            }
            // Measure, reset and barrier are not part of the gate set.
            _ => lowered.push(inst.clone()),
        }
    }
    Ok(circuit.with_instructions(lowered))
}

/// Translate a single gate, one level deep.
fn lower_gate(
    gate: &Gate,
    qubits: &[QubitId],
    target: &Target,
) -> Result<Vec<Instruction>, SamplerError> {
    // Instructions assembled outside the builder API can carry the
    // wrong operand count; reject them instead of indexing blindly.
    if qubits.len() as u32 != gate.num_qubits() {
        return Err(SamplerError::InvalidArgument(format!(
            "gate '{}' expects {} operands, got {}",
            gate.name(),
            gate.num_qubits(),
            qubits.len()
        )));
    }
    if target.supports(gate.name()) {
        return Ok(vec![Instruction::gate(gate.clone(), qubits.iter().copied())]);
    }

    let rewritten: Vec<(Gate, Vec<QubitId>)> = match gate {
        Gate::CZ => {
            let (c, t) = (qubits[0], qubits[1]);
            vec![
                (Gate::H, vec![t]),
                (Gate::CX, vec![c, t]),
                (Gate::H, vec![t]),
            ]
        }
        Gate::CY => {
            let (c, t) = (qubits[0], qubits[1]);
            vec![
                (Gate::Sdg, vec![t]),
                (Gate::CX, vec![c, t]),
                (Gate::S, vec![t]),
            ]
        }
        Gate::CH => {
            let (c, t) = (qubits[0], qubits[1]);
            vec![
                (Gate::S, vec![t]),
                (Gate::H, vec![t]),
                (Gate::T, vec![t]),
                (Gate::CX, vec![c, t]),
                (Gate::Tdg, vec![t]),
                (Gate::H, vec![t]),
                (Gate::Sdg, vec![t]),
            ]
        }
        Gate::Swap => {
            let (a, b) = (qubits[0], qubits[1]);
            vec![
                (Gate::CX, vec![a, b]),
                (Gate::CX, vec![b, a]),
                (Gate::CX, vec![a, b]),
            ]
        }
        other => {
            return Err(SamplerError::Transpilation(format!(
                "gate '{}' is not supported by target '{}'",
                other.name(),
                target.name
            )));
        }
    };

    let mut out = Vec::with_capacity(rewritten.len());
    for (g, qs) in rewritten {
        if !target.supports(g.name()) {
            return Err(SamplerError::Transpilation(format!(
                "gate '{}' lowers via '{}', which target '{}' does not support",
                gate.name(),
                g.name(),
                target.name
            )));
        }
        out.push(Instruction::gate(g, qs));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CircuitRegistry;

    fn entries_for(circuits: &[Circuit]) -> Vec<RegistryEntry> {
        let mut registry = CircuitRegistry::new();
        for c in circuits {
            registry.register(c);
        }
        registry.entries().to_vec()
    }

    #[test]
    fn test_passthrough_on_universal_target() {
        let target = Target::simulator(4);
        let entries = entries_for(&[Circuit::bell().unwrap()]);
        let mut transpiled = Vec::new();

        TranspilationStage::new()
            .ensure_transpiled(&entries, &mut transpiled, &target)
            .unwrap();

        assert_eq!(transpiled.len(), 1);
        assert_eq!(
            transpiled[0].instructions().len(),
            entries[0].circuit.instructions().len()
        );
    }

    #[test]
    fn test_only_suffix_is_lowered() {
        let target = Target::simulator(4);
        let stage = TranspilationStage::new();

        let mut entries = entries_for(&[Circuit::bell().unwrap()]);
        let mut transpiled = Vec::new();
        stage
            .ensure_transpiled(&entries, &mut transpiled, &target)
            .unwrap();
        let cached = Arc::clone(&transpiled[0]);

        entries.extend(entries_for(&[Circuit::ghz(3).unwrap()]).into_iter().map(
            |mut e| {
                e.index = 1;
                e
            },
        ));
        stage
            .ensure_transpiled(&entries, &mut transpiled, &target)
            .unwrap();

        assert_eq!(transpiled.len(), 2);
        // The prefix entry is the same allocation, not a re-lowered copy.
        assert!(Arc::ptr_eq(&cached, &transpiled[0]));
    }

    #[test]
    fn test_cz_lowered_to_cx_basis() {
        let target = Target::new("hw", 2, ["h", "cx"], 8192);
        let mut circuit = Circuit::with_size("czc", 2, 0);
        circuit.cz(QubitId(0), QubitId(1)).unwrap();

        let entries = entries_for(&[circuit]);
        let mut transpiled = Vec::new();
        TranspilationStage::new()
            .ensure_transpiled(&entries, &mut transpiled, &target)
            .unwrap();

        let names: Vec<_> = transpiled[0]
            .instructions()
            .iter()
            .map(Instruction::name)
            .collect();
        assert_eq!(names, vec!["h", "cx", "h"]);
    }

    #[test]
    fn test_failure_leaves_set_unchanged() {
        let stage = TranspilationStage::new();
        let target = Target::new("hw", 2, ["h", "cx"], 8192);

        let mut entries = entries_for(&[Circuit::bell().unwrap()]);
        let mut transpiled = Vec::new();
        stage
            .ensure_transpiled(&entries, &mut transpiled, &target)
            .unwrap();

        // Second entry needs the T gate, which the target lacks.
        let mut bad = Circuit::with_size("bad", 1, 0);
        bad.t(QubitId(0)).unwrap();
        entries.extend(entries_for(&[bad]).into_iter().map(|mut e| {
            e.index = 1;
            e
        }));

        let err = stage
            .ensure_transpiled(&entries, &mut transpiled, &target)
            .unwrap_err();
        assert!(matches!(err, SamplerError::Transpilation(_)));
        // Last known-good length retained.
        assert_eq!(transpiled.len(), 1);
    }

    #[test]
    fn test_malformed_operand_count_rejected() {
        // `with_instructions` bypasses the builder's arity checks; a
        // two-qubit gate arriving with one operand must error, not panic.
        let target = Target::new("hw", 2, ["h", "cx"], 8192);
        let base = Circuit::with_size("mal", 2, 0);
        let circuit = base.with_instructions(vec![Instruction::gate(Gate::CZ, [QubitId(0)])]);

        let entries = entries_for(&[circuit]);
        let mut transpiled = Vec::new();
        let err = TranspilationStage::new()
            .ensure_transpiled(&entries, &mut transpiled, &target)
            .unwrap_err();
        assert!(matches!(err, SamplerError::InvalidArgument(_)));
        assert!(transpiled.is_empty());
    }

    #[test]
    fn test_oversized_circuit_rejected() {
        let target = Target::new("hw", 2, ["h", "cx"], 8192);
        let entries = entries_for(&[Circuit::ghz(3).unwrap()]);
        let mut transpiled = Vec::new();

        let err = TranspilationStage::new()
            .ensure_transpiled(&entries, &mut transpiled, &target)
            .unwrap_err();
        assert!(matches!(err, SamplerError::Transpilation(_)));
    }

    #[test]
    fn test_skip_uses_registry_circuits_verbatim() {
        // Target lacks every gate the circuit uses; the skip trusts the
        // caller and hands the circuit through anyway.
        let target = Target::new("hw", 2, ["rx"], 8192);
        let entries = entries_for(&[Circuit::bell().unwrap()]);
        let mut transpiled = Vec::new();

        TranspilationStage::skipping()
            .ensure_transpiled(&entries, &mut transpiled, &target)
            .unwrap();

        assert!(Arc::ptr_eq(&transpiled[0], &entries[0].circuit));
    }
}
