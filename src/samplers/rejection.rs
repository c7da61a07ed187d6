//! Defines a `RejectionSampler` - independent ancestral sampling with an
//! evidence-consistency filter.
//!
//! Each sample is a full ancestral pass over the network. Because
//! evidence nodes are never resampled (their fixed value is used
//! verbatim), every draw is evidence-consistent by construction and the
//! rejection step discards nothing; the filter is the generalization
//! point for partial-evidence consistency checks. Brute-force, and not
//! recommended for large networks with many states.

use crate::network::Network;
use crate::util::Result;
use super::{ancestral_pass, Sampler};

use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;


pub struct RejectionSampler {

    /// The sampler's own generator, threaded through every draw.
    rng: StdRng,

}


impl RejectionSampler {

    /// Construct a sampler seeded from system entropy.
    pub fn new() -> Self {
        RejectionSampler { rng: StdRng::from_entropy() }
    }


    /// Construct a deterministically seeded sampler, for reproducible
    /// runs and tests.
    pub fn with_seed(seed: u64) -> Self {
        RejectionSampler { rng: StdRng::seed_from_u64(seed) }
    }


    /// Draw `cycles` samples and discard any whose evidence entries do
    /// not match the fixed evidence values. The returned vector holds the
    /// surviving samples only.
    pub fn accumulate_and_discard_samples(
        &mut self,
        net: &Network,
        cycles: usize,
    ) -> Result<Vec<Vec<usize>>> {
        // evidence_nodes only returns nodes with a value set, so the
        // unwrap cannot fail
        let evidence: Vec<(usize, usize)> = net
            .evidence_nodes()
            .into_iter()
            .map(|id| (id, net[id].evidence().unwrap()))
            .collect();

        let mut kept = Vec::with_capacity(cycles);
        for _ in 0..cycles {
            let sample = ancestral_pass(net, &mut self.rng)?;
            if evidence.iter().all(|&(id, value)| sample[id] == value) {
                kept.push(sample);
            }
        }

        debug!("rejection: kept {} of {} samples", kept.len(), cycles);
        Ok(kept)
    }

}


impl Default for RejectionSampler {

    fn default() -> Self {
        RejectionSampler::new()
    }

}


impl Sampler for RejectionSampler {

    fn sample(&mut self, net: &Network) -> Result<Vec<usize>> {
        ancestral_pass(net, &mut self.rng)
    }

    fn accumulate_samples(&mut self, net: &Network, cycles: usize) -> Result<Vec<Vec<usize>>> {
        let mut samples = Vec::with_capacity(cycles);
        for _ in 0..cycles {
            samples.push(ancestral_pass(net, &mut self.rng)?);
        }

        Ok(samples)
    }

}
