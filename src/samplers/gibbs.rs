//! Defines a `GibbsSampler` - single-site Markov-chain sampling.
//!
//! The chain is seeded with one ancestral pass and then advanced one
//! variable at a time: each step picks a latent node uniformly at random,
//! redraws it from its CPT keyed on its parents' current states, and
//! emits the whole assignment. Every step is emitted; burn-in is the
//! caller's concern.
//!
//! # Deviation from a full Gibbs update
//! The single-site update conditions only on the node's own CPT given its
//! parents. It does NOT incorporate the likelihood contributions of the
//! node's children, so in networks with convergent multi-parent structure
//! this is not the true full-conditional Gibbs update. The behavior is
//! preserved as-is from the reference design rather than silently
//! corrected.

use crate::network::Network;
use crate::util::Result;
use super::{ancestral_pass, Sampler};

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};


pub struct GibbsSampler {

    /// The sampler's own generator, threaded through every draw.
    rng: StdRng,

}


impl GibbsSampler {

    /// Construct a sampler seeded from system entropy.
    pub fn new() -> Self {
        GibbsSampler { rng: StdRng::from_entropy() }
    }


    /// Construct a deterministically seeded sampler, for reproducible
    /// runs and tests.
    pub fn with_seed(seed: u64) -> Self {
        GibbsSampler { rng: StdRng::seed_from_u64(seed) }
    }

}


impl Default for GibbsSampler {

    fn default() -> Self {
        GibbsSampler::new()
    }

}


impl Sampler for GibbsSampler {

    /// One full ancestral pass. Used to seed the chain; identical to the
    /// rejection sampler's draw.
    fn sample(&mut self, net: &Network) -> Result<Vec<usize>> {
        ancestral_pass(net, &mut self.rng)
    }

    /// Advance the chain for `cycles` steps, emitting every step.
    ///
    /// The first sample is a full ancestral pass; each of the remaining
    /// `cycles - 1` steps resamples one latent node from its CPT given
    /// its parents' current states. A network with only evidence nodes
    /// short-circuits: the chain repeats the fixed assignment.
    fn accumulate_samples(&mut self, net: &Network, cycles: usize) -> Result<Vec<Vec<usize>>> {
        if cycles == 0 {
            return Ok(Vec::new());
        }

        let mut chain = ancestral_pass(net, &mut self.rng)?;
        let mut samples = Vec::with_capacity(cycles);
        samples.push(chain.clone());

        if net.num_nodes() == 0 {
            return Ok(samples);
        }

        let latent = net.not_evidence_nodes();
        if latent.is_empty() {
            for _ in 1..cycles {
                samples.push(chain.clone());
            }
            return Ok(samples);
        }

        for _ in 1..cycles {
            let id = latent[self.rng.gen_range(0..latent.len())];

            let key: Vec<usize> = net.in_edges(id)?.iter().map(|&p| chain[p]).collect();
            chain[id] = net[id].cpt.sample(&key, &mut self.rng)?;

            samples.push(chain.clone());
        }

        debug!("gibbs: emitted {} chain steps", samples.len());
        Ok(samples)
    }

}
