//! Error types for the IR crate.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit not found in circuit.
    #[error("Qubit {qubit:?} not found in circuit")]
    QubitNotFound {
        /// The qubit that was not found.
        qubit: QubitId,
    },

    /// Classical bit not found in circuit.
    #[error("Classical bit {clbit:?} not found in circuit")]
    ClbitNotFound {
        /// The classical bit that was not found.
        clbit: ClbitId,
    },

    /// Gate requires a different number of qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: u32,
        /// Actual number of qubits provided.
        got: u32,
    },

    /// Duplicate qubit in a multi-qubit operation.
    #[error("Duplicate qubit {qubit:?} in operation")]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
    },

    /// Parameter value count does not match the declared parameters.
    #[error("Circuit declares {expected} parameters but {got} values were supplied")]
    ParameterCountMismatch {
        /// Number of declared parameters.
        expected: usize,
        /// Number of supplied values.
        got: usize,
    },

    /// Parameter is unbound after binding.
    #[error("Parameter '{0}' is unbound")]
    UnboundParameter(String),
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
