//! The sampler: registry, transpilation cache and job submission.
//!
//! A [`Sampler`] owns one backend and amortizes preparation work across
//! its lifetime. Submitting a batch registers each circuit structure
//! (deduplicated), validates parameter shapes eagerly, and spawns the
//! execution as an asynchronous [`SamplerJob`]. Transpilation happens
//! inside the job, suffix-only, against the shared cache.
//!
//! Pipeline per submission:
//!
//! ```text
//!   register ─→ validate ─→ [job: transpile suffix ─→ bind ─→
//!       bound pass ─→ backend.run ─→ postprocess]
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde_json::Map;
use tracing::{debug, instrument};

use quasar_hal::{Backend, RunOptions};
use quasar_ir::{Circuit, CircuitSignature};

use crate::error::SamplerError;
use crate::job::{JobPayload, SamplerJob};
use crate::pass::BoundPass;
use crate::postprocess::{self, SamplerRunResult};
use crate::registry::CircuitRegistry;
use crate::transpile::TranspilationStage;

/// Builder for [`Sampler`].
///
/// A backend is mandatory; everything else has a default.
pub struct SamplerBuilder {
    backend: Option<Arc<dyn Backend>>,
    bound_pass: Option<Arc<dyn BoundPass>>,
    skip_transpilation: bool,
    transpile_options: Map<String, serde_json::Value>,
    default_options: RunOptions,
}

impl SamplerBuilder {
    /// Create a builder with no backend configured.
    pub fn new() -> Self {
        Self {
            backend: None,
            bound_pass: None,
            skip_transpilation: false,
            transpile_options: Map::new(),
            default_options: RunOptions::default(),
        }
    }

    /// Set the execution backend.
    pub fn backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Install a pass that runs on bound circuits before dispatch.
    pub fn bound_pass(mut self, pass: Arc<dyn BoundPass>) -> Self {
        self.bound_pass = Some(pass);
        self
    }

    /// Bypass transpilation and hand registered circuits to the backend
    /// verbatim. The caller is trusted to submit compatible circuits.
    pub fn skip_transpilation(mut self, skip: bool) -> Self {
        self.skip_transpilation = skip;
        self
    }

    /// Backend-specific transpiler options, recorded on the stage.
    pub fn transpile_options(mut self, options: Map<String, serde_json::Value>) -> Self {
        self.transpile_options = options;
        self
    }

    /// Default run options for submissions that pass `None`.
    pub fn default_options(mut self, options: RunOptions) -> Self {
        self.default_options = options;
        self
    }

    /// Build the sampler.
    ///
    /// Fails with [`SamplerError::MissingBackend`] if no backend was set.
    pub fn build(self) -> Result<Sampler, SamplerError> {
        let backend = self.backend.ok_or(SamplerError::MissingBackend)?;
        let stage = if self.skip_transpilation {
            TranspilationStage::skipping()
        } else {
            TranspilationStage::new()
        }
        .with_options(self.transpile_options);

        Ok(Sampler {
            core: Arc::new(SamplerCore {
                backend,
                registry: RwLock::new(CircuitRegistry::new()),
                transpiled: Mutex::new(Vec::new()),
                stage,
                bound_pass: self.bound_pass,
                default_options: self.default_options,
            }),
        })
    }
}

impl Default for SamplerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Sampling primitive over one backend.
///
/// Cheap to clone; clones share the registry and transpilation cache.
#[derive(Clone)]
pub struct Sampler {
    core: Arc<SamplerCore>,
}

impl fmt::Debug for Sampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sampler")
            .field("backend", &self.core.backend.name())
            .field("registry_len", &self.registry_len())
            .field("transpiled_len", &self.transpiled_len())
            .finish_non_exhaustive()
    }
}

struct SamplerCore {
    backend: Arc<dyn Backend>,
    registry: RwLock<CircuitRegistry>,
    transpiled: Mutex<Vec<Arc<Circuit>>>,
    stage: TranspilationStage,
    bound_pass: Option<Arc<dyn BoundPass>>,
    default_options: RunOptions,
}

impl Sampler {
    /// Start building a sampler.
    pub fn builder() -> SamplerBuilder {
        SamplerBuilder::new()
    }

    /// Name of the configured backend.
    pub fn backend_name(&self) -> &str {
        self.core.backend.name()
    }

    /// Number of unique circuit structures registered so far.
    pub fn registry_len(&self) -> usize {
        self.core
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Backend-specific transpiler options recorded at construction.
    pub fn transpile_options(&self) -> &serde_json::Map<String, serde_json::Value> {
        self.core.stage.options()
    }

    /// Number of registry entries with a cached transpilation.
    pub fn transpiled_len(&self) -> usize {
        self.core
            .transpiled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Submit a batch of circuits with per-circuit parameter values.
    ///
    /// Registration and shape validation happen here, synchronously;
    /// transpilation, binding and execution run on the returned job.
    /// Malformed requests fail fast with
    /// [`SamplerError::InvalidArgument`] before any job is spawned.
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(skip_all, fields(backend = self.core.backend.name(), circuits = circuits.len()))]
    pub fn run(
        &self,
        circuits: &[Circuit],
        parameter_values: &[Vec<f64>],
        options: Option<RunOptions>,
    ) -> Result<SamplerJob, SamplerError> {
        if circuits.len() != parameter_values.len() {
            return Err(SamplerError::InvalidArgument(format!(
                "got {} circuits but {} parameter-value sequences",
                circuits.len(),
                parameter_values.len()
            )));
        }

        let indices = self.register_all(circuits);

        // Arity check against the declared parameters, before spawning.
        {
            let registry = self
                .core
                .registry
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            for (pos, (&index, values)) in indices.iter().zip(parameter_values).enumerate() {
                let declared = registry
                    .get(index)
                    .map(|entry| entry.parameters.len())
                    .unwrap_or(0);
                if declared != values.len() {
                    return Err(SamplerError::InvalidArgument(format!(
                        "circuit {pos} declares {declared} parameters but {} values were given",
                        values.len()
                    )));
                }
            }
        }

        let payload = JobPayload {
            indices,
            parameter_values: parameter_values.to_vec(),
            options: options.unwrap_or_else(|| self.core.default_options.clone()),
        };
        debug!(indices = ?payload.indices, shots = payload.options.shots, "submitting job");

        let core = Arc::clone(&self.core);
        Ok(SamplerJob::spawn(async move { core.execute(payload).await }))
    }

    /// Register every circuit, returning registry indices in input order.
    fn register_all(&self, circuits: &[Circuit]) -> Vec<usize> {
        let mut indices = Vec::with_capacity(circuits.len());
        for circuit in circuits {
            let signature = CircuitSignature::of(circuit);
            // Fast path under the read lock; the write path re-probes so
            // a racing registration cannot mint two indices.
            let probed = self
                .core
                .registry
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .index_of(&signature);
            let index = match probed {
                Some(index) => index,
                None => self
                    .core
                    .registry
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .register_with_signature(signature, circuit),
            };
            indices.push(index);
        }
        indices
    }
}

impl SamplerCore {
    async fn execute(self: Arc<Self>, payload: JobPayload) -> Result<SamplerRunResult, SamplerError> {
        let started = std::time::Instant::now();
        let circuits = self.transpiled_for(&payload.indices)?;

        let mut bound = Vec::with_capacity(circuits.len());
        for (circuit, values) in circuits.iter().zip(&payload.parameter_values) {
            let bound_circuit = self
                .backend
                .assign_parameters(circuit, values)
                .map_err(|err| SamplerError::InvalidArgument(err.to_string()))?;
            bound.push(bound_circuit);
        }

        if let Some(pass) = &self.bound_pass {
            let expected = bound.len();
            bound = pass.run(bound)?.into_batch();
            if bound.len() != expected {
                return Err(SamplerError::InvalidArgument(format!(
                    "bound pass '{}' returned {} circuits for a batch of {expected}",
                    pass.name(),
                    bound.len()
                )));
            }
        }

        let handle = self
            .backend
            .run(bound, &payload.options)
            .await
            .map_err(|err| SamplerError::Execution(err.to_string()))?;
        let counts = handle
            .result()
            .await
            .map_err(|err| SamplerError::Execution(err.to_string()))?;

        if counts.len() != payload.indices.len() {
            return Err(SamplerError::Execution(format!(
                "backend '{}' returned {} count sets for {} circuits",
                self.backend.name(),
                counts.len(),
                payload.indices.len()
            )));
        }

        let mut result = postprocess::process(counts)?;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1e3;
        for entry in &mut result.metadata {
            entry.insert("execution_time_ms".to_string(), serde_json::json!(elapsed_ms));
        }
        Ok(result)
    }

    /// Resolve payload indices to transpiled circuits, extending the
    /// cache first. Both locks are sync and released before any await.
    fn transpiled_for(&self, indices: &[usize]) -> Result<Vec<Arc<Circuit>>, SamplerError> {
        let registry = self
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut transpiled = self
            .transpiled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        self.stage
            .ensure_transpiled(registry.entries(), &mut transpiled, self.backend.target())?;

        indices
            .iter()
            .map(|&index| {
                transpiled.get(index).cloned().ok_or_else(|| {
                    SamplerError::InvalidArgument(format!("unknown registry index {index}"))
                })
            })
            .collect()
    }
}
