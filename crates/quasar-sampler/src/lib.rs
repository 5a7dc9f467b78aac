//! Quasar Sampler
//!
//! An asynchronous sampling primitive: submit quantum circuits with
//! parameter values, get back quasi-probability distributions estimated
//! from measurement-outcome counts.
//!
//! The sampler amortizes preparation across its lifetime:
//!
//! - [`CircuitRegistry`] deduplicates circuit structures, so a circuit
//!   submitted a thousand times with different parameters is stored and
//!   transpiled once.
//! - [`TranspilationStage`] lowers only the registry suffix that has not
//!   been transpiled yet.
//! - [`SamplerJob`] is the async handle for one submission; `result()`
//!   blocks until completion and is idempotent.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use quasar_ir::Circuit;
//! use quasar_sampler::Sampler;
//!
//! # async fn example(backend: Arc<dyn quasar_hal::Backend>) -> Result<(), Box<dyn std::error::Error>> {
//! let sampler = Sampler::builder().backend(backend).build()?;
//! let job = sampler.run(&[Circuit::bell()?], &[vec![]], None)?;
//! let result = job.result().await?;
//! println!("p(00) = {}", result.quasi_dists[0].probability("00"));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod job;
pub mod pass;
pub mod postprocess;
pub mod registry;
pub mod sampler;
pub mod transpile;

pub use error::SamplerError;
pub use job::{JobId, JobPayload, JobStatus, SamplerJob};
pub use pass::{BoundPass, PassOutput};
pub use postprocess::{QuasiDistribution, SamplerRunResult};
pub use registry::{CircuitRegistry, RegistryEntry};
pub use sampler::{Sampler, SamplerBuilder};
pub use transpile::TranspilationStage;
