//! Structural circuit signatures for deduplication.
//!
//! A [`CircuitSignature`] is the key the sampler's registry deduplicates
//! on. It captures register layout, the instruction sequence with operand
//! ids, and the *structure* of every parameter expression: symbol names
//! are part of the signature, concrete constants are not. Two circuits
//! that differ only in bound rotation angles therefore share a signature,
//! while circuits declaring different symbols do not.
//!
//! Equality is full structural equality, not a hash digest. A map keyed
//! on the signature gets hashing as a prefilter and `Eq` as the collision
//! guard, so two distinct structures can never be conflated.

use serde::{Deserialize, Serialize};

use crate::circuit::Circuit;
use crate::instruction::InstructionKind;

/// A structural key derived from a circuit's registers and instructions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CircuitSignature {
    /// Number of qubits.
    num_qubits: u32,
    /// Number of classical bits.
    num_clbits: u32,
    /// Register membership of each qubit, `name[index]` or `-`.
    qubit_layout: Vec<String>,
    /// Register membership of each classical bit, `name[index]` or `-`.
    clbit_layout: Vec<String>,
    /// One normalized line per instruction.
    ops: Vec<String>,
}

impl CircuitSignature {
    /// Compute the signature of a circuit.
    pub fn of(circuit: &Circuit) -> Self {
        let qubit_layout = circuit
            .qubits()
            .iter()
            .map(|q| match &q.slot {
                Some(slot) => slot.to_string(),
                None => "-".to_string(),
            })
            .collect();
        let clbit_layout = circuit
            .clbits()
            .iter()
            .map(|c| match &c.slot {
                Some(slot) => slot.to_string(),
                None => "-".to_string(),
            })
            .collect();

        let ops = circuit
            .instructions()
            .iter()
            .map(|inst| {
                let mut line = String::new();
                match &inst.kind {
                    InstructionKind::Gate(gate) => {
                        line.push_str(gate.name());
                        let params = gate.parameters();
                        if !params.is_empty() {
                            line.push('(');
                            for (i, p) in params.iter().enumerate() {
                                if i > 0 {
                                    line.push(',');
                                }
                                line.push_str(&p.structural_repr());
                            }
                            line.push(')');
                        }
                    }
                    other => line.push_str(match other {
                        InstructionKind::Measure => "measure",
                        InstructionKind::Reset => "reset",
                        InstructionKind::Barrier => "barrier",
                        InstructionKind::Gate(_) => unreachable!(),
                    }),
                }
                for q in &inst.qubits {
                    line.push_str(&format!(" q{}", q.0));
                }
                for c in &inst.clbits {
                    line.push_str(&format!(" c{}", c.0));
                }
                line
            })
            .collect();

        Self {
            num_qubits: circuit.num_qubits() as u32,
            num_clbits: circuit.num_clbits() as u32,
            qubit_layout,
            clbit_layout,
            ops,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::ParameterExpression;
    use crate::qubit::QubitId;

    #[test]
    fn test_identical_structure_same_signature() {
        let a = Circuit::bell().unwrap();
        let b = Circuit::bell().unwrap();
        assert_eq!(CircuitSignature::of(&a), CircuitSignature::of(&b));
    }

    #[test]
    fn test_different_gates_different_signature() {
        let bell = Circuit::bell().unwrap();
        let mut other = Circuit::with_size("bell", 2, 2);
        other.h(QubitId(0)).unwrap();
        other.cz(QubitId(0), QubitId(1)).unwrap();
        assert_ne!(CircuitSignature::of(&bell), CircuitSignature::of(&other));
    }

    #[test]
    fn test_bound_constants_share_signature() {
        let mut a = Circuit::with_size("rot", 1, 0);
        a.ry(0.25, QubitId(0)).unwrap();
        let mut b = Circuit::with_size("rot", 1, 0);
        b.ry(1.75, QubitId(0)).unwrap();
        assert_eq!(CircuitSignature::of(&a), CircuitSignature::of(&b));
    }

    #[test]
    fn test_symbol_identity_part_of_signature() {
        let mut a = Circuit::with_size("rot", 1, 0);
        a.ry(ParameterExpression::symbol("theta"), QubitId(0))
            .unwrap();
        let mut b = Circuit::with_size("rot", 1, 0);
        b.ry(ParameterExpression::symbol("phi"), QubitId(0)).unwrap();
        assert_ne!(CircuitSignature::of(&a), CircuitSignature::of(&b));
    }

    #[test]
    fn test_register_layout_part_of_signature() {
        let mut a = Circuit::new("r");
        a.add_qreg("q", 2);
        let mut b = Circuit::new("r");
        b.add_qreg("anc", 2);
        assert_ne!(CircuitSignature::of(&a), CircuitSignature::of(&b));
    }

    #[test]
    fn test_symbolic_vs_bound_differ() {
        // A circuit with a live symbol is structurally distinct from the
        // same gate sequence with the angle already bound.
        let mut sym = Circuit::with_size("rot", 1, 0);
        sym.ry(ParameterExpression::symbol("theta"), QubitId(0))
            .unwrap();
        let mut bound = Circuit::with_size("rot", 1, 0);
        bound.ry(0.5, QubitId(0)).unwrap();
        assert_ne!(CircuitSignature::of(&sym), CircuitSignature::of(&bound));
    }
}
