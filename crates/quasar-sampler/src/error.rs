//! Error types for the sampler crate.
//!
//! `SamplerError` is `Clone`: a job caches its outcome and every
//! `result()` call returns the same stored error without re-executing.

use thiserror::Error;

/// Errors that can occur in the sampling pipeline.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum SamplerError {
    /// No backend was supplied at construction.
    #[error("Sampler requires a backend")]
    MissingBackend,

    /// Malformed batch or parameter-value mismatch.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The backend rejected a circuit during lowering.
    ///
    /// The transpiled set is left at its last known-good length; nothing
    /// from the failed extension is cached.
    #[error("Transpilation failed: {0}")]
    Transpilation(String),

    /// The backend's run or result call failed.
    ///
    /// Stored on the job and surfaced verbatim at `result()`.
    #[error("Execution failed: {0}")]
    Execution(String),

    /// A circuit produced zero total shots.
    ///
    /// Raised instead of emitting NaN statistics.
    #[error("Circuit {index} produced zero total shots")]
    DegenerateDistribution {
        /// Position of the circuit within the request.
        index: usize,
    },
}
