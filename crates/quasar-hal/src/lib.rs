//! Quasar Hardware Abstraction Layer
//!
//! This crate defines the capability contract between the sampling
//! pipeline and circuit-execution backends. A backend is anything that
//! can execute a batch of bound circuits and report measurement-outcome
//! counts: a local simulator, a cloud service, an HPC allocation.
//!
//! # Overview
//!
//! - The [`Backend`] trait: three operations — [`Backend::target`]
//!   (instruction-set introspection), [`Backend::assign_parameters`]
//!   (injectable parameter binding), and [`Backend::run`] (batch
//!   execution returning a [`ResultHandle`]).
//! - [`Target`]: what the backend can execute — qubit count, gate names,
//!   shot limits. Consumed by the sampler's transpilation stage.
//! - [`Counts`]: per-circuit measurement-outcome frequencies.
//! - [`CircuitHeader`] / [`build_header`]: register-layout metadata for
//!   result-decoding layers outside the sampler core.
//!
//! # Implementing a Backend
//!
//! ```ignore
//! use async_trait::async_trait;
//! use quasar_hal::{Backend, Counts, HalResult, ResultHandle, RunOptions, Target};
//! use quasar_ir::Circuit;
//!
//! struct MyBackend {
//!     target: Target,
//! }
//!
//! #[async_trait]
//! impl Backend for MyBackend {
//!     fn name(&self) -> &str { "my_backend" }
//!
//!     // Sync, infallible — cached at construction.
//!     fn target(&self) -> &Target { &self.target }
//!
//!     async fn run(
//!         &self,
//!         circuits: Vec<Circuit>,
//!         options: &RunOptions,
//!     ) -> HalResult<Box<dyn ResultHandle>> {
//!         // Dispatch the batch and return a handle.
//!         # todo!()
//!     }
//! }
//! ```

pub mod backend;
pub mod error;
pub mod header;
pub mod result;
pub mod target;

pub use backend::{Backend, ResultHandle, RunOptions};
pub use error::{HalError, HalResult};
pub use header::{build_header, CircuitHeader};
pub use result::Counts;
pub use target::Target;
