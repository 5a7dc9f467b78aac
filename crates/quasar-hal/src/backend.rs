//! Backend trait and run options.
//!
//! The [`Backend`] trait is the capability contract every execution
//! engine implements to plug into the sampler:
//!
//! ```text
//!   target() ──→ assign_parameters() ──→ run() ──→ ResultHandle::result()
//!   (sync, &ref)     (sync, pure)        (async)        (async)
//! ```
//!
//! ## Design principles
//!
//! - **Async-native**: execution methods are async; introspection is not.
//! - **Thread-safe**: `Send + Sync` bound enables shared ownership.
//! - **Infallible introspection**: `target()` is synchronous and
//!   infallible — a backend that cannot report its instruction set
//!   without I/O is not correctly initialized.
//! - **Atomic execution**: `run()` takes one batch; the sampler treats
//!   the call as an opaque blocking boundary with no cancellation
//!   contract for in-flight work.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use quasar_ir::Circuit;

use crate::error::HalResult;
use crate::result::Counts;
use crate::target::Target;

/// Options for one execution batch.
///
/// `extra` is passed through to the backend verbatim; timeouts and other
/// backend-specific knobs live there and are never interpreted by the
/// sampler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOptions {
    /// Number of shots per circuit.
    pub shots: u32,
    /// Backend-specific options, passed through opaquely.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RunOptions {
    /// Create run options with the given shot count.
    pub fn with_shots(shots: u32) -> Self {
        Self {
            shots,
            extra: serde_json::Map::new(),
        }
    }

    /// Add a backend-specific option.
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::with_shots(1024)
    }
}

/// Handle to an in-flight batch execution.
///
/// `result()` blocks (asynchronously) until the batch finishes and yields
/// one [`Counts`] per submitted circuit, preserving submission order.
#[async_trait]
pub trait ResultHandle: Send {
    /// Wait for the batch and return per-circuit outcome counts.
    async fn result(self: Box<Self>) -> HalResult<Vec<Counts>>;
}

/// Trait for circuit-execution backends.
///
/// # Contract
///
/// - `target()` MUST be synchronous and infallible; targets MUST be
///   cached at construction time.
/// - `assign_parameters()` MUST be pure: the input circuit is never
///   mutated, a new bound instance is produced. The default matches
///   values positionally against the circuit's declared parameters.
/// - `run()` MUST return one `Counts` entry per submitted circuit, in
///   submission order, when the handle resolves.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Get the instruction-set descriptor of this backend.
    fn target(&self) -> &Target;

    /// Bind concrete values to a circuit's declared parameters.
    ///
    /// Backends with a native binding mechanism may override this; the
    /// default binds positionally via [`Circuit::bind_values`].
    fn assign_parameters(&self, circuit: &Circuit, values: &[f64]) -> HalResult<Circuit> {
        Ok(circuit.bind_values(values)?)
    }

    /// Execute a batch of bound circuits.
    async fn run(
        &self,
        circuits: Vec<Circuit>,
        options: &RunOptions,
    ) -> HalResult<Box<dyn ResultHandle>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use quasar_ir::{ParameterExpression, QubitId};

    struct EchoBackend {
        target: Target,
    }

    struct EchoHandle {
        counts: Vec<Counts>,
    }

    #[async_trait]
    impl ResultHandle for EchoHandle {
        async fn result(self: Box<Self>) -> HalResult<Vec<Counts>> {
            Ok(self.counts)
        }
    }

    #[async_trait]
    impl Backend for EchoBackend {
        fn name(&self) -> &str {
            "echo"
        }

        fn target(&self) -> &Target {
            &self.target
        }

        async fn run(
            &self,
            circuits: Vec<Circuit>,
            options: &RunOptions,
        ) -> HalResult<Box<dyn ResultHandle>> {
            let counts = circuits
                .iter()
                .map(|c| {
                    let mut counts = Counts::new();
                    counts.insert("0".repeat(c.num_qubits().max(1)), u64::from(options.shots));
                    counts
                })
                .collect();
            Ok(Box::new(EchoHandle { counts }) as Box<dyn ResultHandle>)
        }
    }

    #[tokio::test]
    async fn test_run_yields_one_counts_per_circuit() {
        let backend = EchoBackend {
            target: Target::simulator(4),
        };
        let batch = vec![Circuit::bell().unwrap(), Circuit::ghz(3).unwrap()];

        let handle = backend.run(batch, &RunOptions::with_shots(100)).await.unwrap();
        let counts = handle.result().await.unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].total_shots(), 100);
    }

    #[test]
    fn test_default_assign_parameters_is_pure() {
        let backend = EchoBackend {
            target: Target::simulator(4),
        };
        let mut circuit = Circuit::with_size("var", 1, 1);
        circuit
            .ry(ParameterExpression::symbol("theta"), QubitId(0))
            .unwrap()
            .measure_all()
            .unwrap();

        let bound = backend.assign_parameters(&circuit, &[0.5]).unwrap();
        assert!(bound.parameters().is_empty());
        assert_eq!(circuit.parameters(), vec!["theta"]);

        // Wrong value count is rejected.
        assert!(backend.assign_parameters(&circuit, &[]).is_err());
    }

    #[test]
    fn test_run_options_default() {
        let options = RunOptions::default();
        assert_eq!(options.shots, 1024);
        assert!(options.extra.is_empty());
    }

    #[test]
    fn test_run_options_extra_passthrough() {
        let options = RunOptions::with_shots(2048)
            .with_extra("timeout_ms", serde_json::json!(30_000));
        assert_eq!(options.shots, 2048);
        assert_eq!(options.extra["timeout_ms"], serde_json::json!(30_000));
    }
}
