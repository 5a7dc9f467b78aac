//! Circuit metadata headers for result decoding.
//!
//! A [`CircuitHeader`] captures the register layout a result-decoding
//! layer needs to map flat bitstrings back onto named registers. It is a
//! pure projection of the circuit structure; the sampler core itself
//! never consumes it.

use serde::{Deserialize, Serialize};

use quasar_ir::Circuit;

/// Register layout and identity metadata for one circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitHeader {
    /// `(register, index)` label for each classical bit, in bit order.
    pub clbit_labels: Vec<(String, u32)>,
    /// `(register, index)` label for each qubit, in qubit order.
    pub qubit_labels: Vec<(String, u32)>,
    /// `(register, size)` for each classical register.
    pub creg_sizes: Vec<(String, u32)>,
    /// `(register, size)` for each quantum register.
    pub qreg_sizes: Vec<(String, u32)>,
    /// Number of qubits.
    pub n_qubits: u32,
    /// Number of classical memory slots.
    pub memory_slots: u32,
    /// Circuit name.
    pub name: String,
    /// Global phase, in radians.
    pub global_phase: f64,
}

/// Build the decoding header for a circuit.
///
/// Bits without register membership are grouped under the default
/// register names `q` and `c`.
pub fn build_header(circuit: &Circuit) -> CircuitHeader {
    let mut qubit_labels = Vec::with_capacity(circuit.num_qubits());
    let mut qreg_sizes: Vec<(String, u32)> = Vec::new();
    for qubit in circuit.qubits() {
        let (reg, idx) = match qubit.slot() {
            Some((reg, idx)) => (reg.to_string(), idx),
            None => ("q".to_string(), qubit.id.0),
        };
        qubit_labels.push((reg.clone(), idx));
        match qreg_sizes.iter_mut().find(|(name, _)| *name == reg) {
            Some((_, size)) => *size += 1,
            None => qreg_sizes.push((reg, 1)),
        }
    }

    let mut clbit_labels = Vec::with_capacity(circuit.num_clbits());
    let mut creg_sizes: Vec<(String, u32)> = Vec::new();
    for clbit in circuit.clbits() {
        let (reg, idx) = match clbit.slot() {
            Some((reg, idx)) => (reg.to_string(), idx),
            None => ("c".to_string(), clbit.id.0),
        };
        clbit_labels.push((reg.clone(), idx));
        match creg_sizes.iter_mut().find(|(name, _)| *name == reg) {
            Some((_, size)) => *size += 1,
            None => creg_sizes.push((reg, 1)),
        }
    }

    CircuitHeader {
        clbit_labels,
        qubit_labels,
        creg_sizes,
        qreg_sizes,
        n_qubits: circuit.num_qubits() as u32,
        memory_slots: circuit.num_clbits() as u32,
        name: circuit.name().to_string(),
        global_phase: circuit.global_phase(),
    }
}
