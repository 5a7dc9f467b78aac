//! Post-bind transformation passes.
//!
//! A [`BoundPass`] runs after parameter binding and before backend
//! dispatch. It is an injectable strategy: the default sampler applies
//! no pass, and a pass that returns a single circuit is normalized into
//! a one-element batch.

use quasar_ir::Circuit;

use crate::error::SamplerError;

/// Output of a bound pass: a full batch, or a single circuit that the
/// sampler normalizes into a one-element batch.
#[derive(Debug)]
pub enum PassOutput {
    /// One circuit, normalized to a one-element batch.
    Single(Circuit),
    /// A full batch.
    Batch(Vec<Circuit>),
}

impl PassOutput {
    /// Normalize into a batch.
    pub fn into_batch(self) -> Vec<Circuit> {
        match self {
            PassOutput::Single(circuit) => vec![circuit],
            PassOutput::Batch(circuits) => circuits,
        }
    }
}

impl From<Circuit> for PassOutput {
    fn from(circuit: Circuit) -> Self {
        PassOutput::Single(circuit)
    }
}

impl From<Vec<Circuit>> for PassOutput {
    fn from(circuits: Vec<Circuit>) -> Self {
        PassOutput::Batch(circuits)
    }
}

/// A transformation applied to bound circuits before execution.
pub trait BoundPass: Send + Sync {
    /// Name of the pass, for diagnostics.
    fn name(&self) -> &str {
        "bound_pass"
    }

    /// Transform a batch of bound circuits.
    fn run(&self, circuits: Vec<Circuit>) -> Result<PassOutput, SamplerError>;
}

impl<F> BoundPass for F
where
    F: Fn(Vec<Circuit>) -> Result<PassOutput, SamplerError> + Send + Sync,
{
    fn run(&self, circuits: Vec<Circuit>) -> Result<PassOutput, SamplerError> {
        self(circuits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_output_normalized() {
        let out = PassOutput::from(Circuit::bell().unwrap());
        assert_eq!(out.into_batch().len(), 1);
    }

    #[test]
    fn test_closure_is_a_pass() {
        let pass = |circuits: Vec<Circuit>| Ok(PassOutput::Batch(circuits));
        let batch = vec![Circuit::bell().unwrap(), Circuit::ghz(3).unwrap()];
        let out = pass.run(batch).unwrap().into_batch();
        assert_eq!(out.len(), 2);
    }
}
