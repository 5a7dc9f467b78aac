//! Backend target descriptors.
//!
//! A [`Target`] describes what a backend can execute: qubit count, the
//! supported gate names (OpenQASM 3 naming), and shot limits. The
//! transpilation stage consults it to decide which gates pass through
//! and which need lowering.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Instruction-set descriptor for a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    /// Name of the backend this target describes.
    pub name: String,
    /// Number of qubits available.
    pub num_qubits: u32,
    /// Supported gate names (OpenQASM 3 naming convention).
    gates: FxHashSet<String>,
    /// Maximum number of shots per run.
    pub max_shots: u32,
}

impl Target {
    /// Create a target from an explicit gate list.
    pub fn new(
        name: impl Into<String>,
        num_qubits: u32,
        gates: impl IntoIterator<Item = impl Into<String>>,
        max_shots: u32,
    ) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            gates: gates.into_iter().map(Into::into).collect(),
            max_shots,
        }
    }

    /// Target for a universal simulator: every standard gate supported.
    pub fn simulator(num_qubits: u32) -> Self {
        Self::new(
            "simulator",
            num_qubits,
            [
                "id", "x", "y", "z", "h", "s", "sdg", "t", "tdg", "rx", "ry", "rz", "p", "u",
                "cx", "cy", "cz", "ch", "swap", "crz", "cp", "ccx",
            ],
            1 << 24,
        )
    }

    /// Check whether a gate name is supported.
    pub fn supports(&self, gate_name: &str) -> bool {
        self.gates.contains(gate_name)
    }

    /// Iterate over the supported gate names.
    pub fn gate_names(&self) -> impl Iterator<Item = &str> {
        self.gates.iter().map(String::as_str)
    }
}
