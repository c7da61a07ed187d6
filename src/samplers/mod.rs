//! Defines the `Sampler` trait - an object that draws full-network
//! assignments from a `Network` and aggregates them into empirical
//! distributions.

use crate::network::Network;
use crate::table::{JointTable, MarginalTable};
use crate::util::Result;

use rand::Rng;

pub mod gibbs;
pub mod rejection;

pub use self::gibbs::GibbsSampler;
pub use self::rejection::RejectionSampler;


pub trait Sampler {

    /// Draw one full assignment from the network, one entry per node in
    /// id order. Evidence nodes take their fixed value.
    fn sample(&mut self, net: &Network) -> Result<Vec<usize>>;

    /// Draw `cycles` assignments. How the assignments relate to each
    /// other (independent draws vs. steps of a Markov chain) is up to the
    /// implementation.
    fn accumulate_samples(&mut self, net: &Network, cycles: usize) -> Result<Vec<Vec<usize>>>;

    /// Accumulate `cycles` samples into a normalized empirical joint
    /// distribution over all nodes.
    fn joint_table(&mut self, net: &Network, cycles: usize) -> Result<JointTable> {
        let mut joint = JointTable::new(&net.total_states());

        for sample in self.accumulate_samples(net, cycles)? {
            joint.add_to_probability(&sample, 1.0)?;
        }

        joint.normalize();
        Ok(joint)
    }

    /// Accumulate `cycles` samples into per-node normalized marginal
    /// distributions.
    fn marginal_table(&mut self, net: &Network, cycles: usize) -> Result<MarginalTable> {
        let mut marginals = MarginalTable::new(&net.total_states());

        for sample in self.accumulate_samples(net, cycles)? {
            for (node, &state) in sample.iter().enumerate() {
                marginals.add_to_probability(node, state, 1.0)?;
            }
        }

        marginals.normalize();
        Ok(marginals)
    }

}


/// One ancestral pass: visit nodes in topological order and draw each
/// node's state from its CPT keyed on the already-sampled parent states.
/// Nodes flagged as evidence take their fixed value verbatim.
///
/// # Panics
/// Panics if the network contains a cycle: visiting a node before its
/// parents is a broken programming contract, not a recoverable runtime
/// condition.
fn ancestral_pass<R: Rng>(net: &Network, rng: &mut R) -> Result<Vec<usize>> {
    let order = net.topological_order();
    assert!(
        order.len() == net.num_nodes(),
        "topological order violated: the network contains a cycle"
    );

    let mut sample = vec![0; net.num_nodes()];
    let mut assigned = vec![false; net.num_nodes()];

    for id in order {
        let key: Vec<usize> = net
            .in_edges(id)?
            .iter()
            .map(|&parent| {
                assert!(assigned[parent], "topological order violated at node {}", id);
                sample[parent]
            })
            .collect();

        sample[id] = match net[id].evidence() {
            Some(value) => value,
            None => net[id].cpt.sample(&key, rng)?,
        };
        assigned[id] = true;
    }

    Ok(sample)
}


#[cfg(test)]
mod tests {

    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn ancestral_pass_assigns_every_node() {
        let mut net = Network::new(3, 2);
        net.add_edge(0, 1).unwrap();
        net.add_edge(1, 2).unwrap();

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let sample = ancestral_pass(&net, &mut rng).unwrap();
            assert_eq!(3, sample.len());
            assert!(sample.iter().all(|&s| s < 2));
        }
    }

    #[test]
    #[should_panic(expected = "topological order violated")]
    fn ancestral_pass_panics_on_cycle() {
        let mut net = Network::new(2, 2);
        net.add_edge(0, 1).unwrap();
        net.add_edge(1, 0).unwrap();

        let mut rng = StdRng::seed_from_u64(3);
        let _ = ancestral_pass(&net, &mut rng);
    }

}
