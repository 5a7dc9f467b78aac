//! Post-processing: raw counts into quasi-probability distributions.
//!
//! Each circuit's outcome counts are normalized into probabilities and
//! annotated with a conservative, distribution-free upper bound on the
//! statistical error of a proportion estimator: `sqrt(1/shots)`. The
//! bound characterizes the sampling noise of the whole distribution, so
//! it is the same value for every outcome.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Map;

use quasar_hal::Counts;

use crate::error::SamplerError;

/// An empirically estimated probability distribution over outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuasiDistribution {
    /// Probability per outcome bitstring, summing to 1.
    pub probabilities: FxHashMap<String, f64>,
    /// Number of shots the distribution was estimated from.
    pub shots: u64,
    /// Conservative upper bound on the estimator's standard deviation.
    pub stddev_upper_bound: f64,
}

impl QuasiDistribution {
    /// Probability of an outcome, 0.0 if never observed.
    pub fn probability(&self, bitstring: &str) -> f64 {
        self.probabilities.get(bitstring).copied().unwrap_or(0.0)
    }
}

/// Result of one sampling request.
///
/// Both sequences have one entry per *requested* circuit, in request
/// order — repeated requests of the same structure still yield one
/// entry each.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerRunResult {
    /// One distribution per requested circuit.
    pub quasi_dists: Vec<QuasiDistribution>,
    /// One metadata map per requested circuit; always carries `shots`.
    pub metadata: Vec<Map<String, serde_json::Value>>,
}

/// Convert per-circuit outcome counts into a [`SamplerRunResult`].
///
/// Fails with [`SamplerError::DegenerateDistribution`] if any circuit
/// has zero total shots — NaN statistics are never emitted.
pub fn process(counts: Vec<Counts>) -> Result<SamplerRunResult, SamplerError> {
    let mut quasi_dists = Vec::with_capacity(counts.len());
    let mut metadata = Vec::with_capacity(counts.len());

    for (index, circuit_counts) in counts.into_iter().enumerate() {
        let shots = circuit_counts.total_shots();
        if shots == 0 {
            return Err(SamplerError::DegenerateDistribution { index });
        }
        quasi_dists.push(QuasiDistribution {
            probabilities: circuit_counts.probabilities(),
            shots,
            stddev_upper_bound: (1.0 / shots as f64).sqrt(),
        });

        let mut entry = Map::new();
        entry.insert("shots".to_string(), serde_json::json!(shots));
        metadata.push(entry);
    }

    Ok(SamplerRunResult {
        quasi_dists,
        metadata,
    })
}
