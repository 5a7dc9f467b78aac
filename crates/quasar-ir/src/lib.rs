//! Quasar Circuit Intermediate Representation
//!
//! This crate provides the core data structures for describing quantum
//! circuits submitted to the sampling pipeline: qubits and classical bits
//! with register membership, gates, instructions, symbolic parameter
//! expressions, and the structural [`CircuitSignature`] used to deduplicate
//! circuits across sampler calls.
//!
//! # Overview
//!
//! Circuits are stored as an ordered instruction list. The high-level
//! [`Circuit`] API provides a builder pattern for constructing circuits and
//! a pure [`Circuit::bind_values`] operation for substituting concrete
//! values into symbolic parameters.
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use quasar_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell_state", 2, 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! ```
//!
//! # Example: Parameterized Circuit
//!
//! ```rust
//! use quasar_ir::{Circuit, ParameterExpression, QubitId};
//! use std::f64::consts::PI;
//!
//! let mut circuit = Circuit::with_size("variational", 1, 1);
//! circuit.ry(ParameterExpression::symbol("theta"), QubitId(0)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! assert_eq!(circuit.parameters(), vec!["theta"]);
//!
//! // Binding is pure: the original circuit is untouched.
//! let bound = circuit.bind_values(&[PI / 4.0]).unwrap();
//! assert!(bound.parameters().is_empty());
//! ```

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod parameter;
pub mod qubit;
pub mod signature;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::Gate;
pub use instruction::{Instruction, InstructionKind};
pub use parameter::ParameterExpression;
pub use qubit::{Clbit, ClbitId, Qubit, QubitId, RegisterSlot};
pub use signature::CircuitSignature;
