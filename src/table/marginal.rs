//! Defines a `MarginalTable` - per-node marginal distributions.
//!
//! One probability vector per network node, filled by samplers counting
//! how often each node landed in each state.

use crate::util::{BayouError, Result};


#[derive(Clone, Debug)]
pub struct MarginalTable {

    /// One probability vector per node, indexed by node id.
    rows: Vec<Vec<f64>>,

}


impl MarginalTable {

    /// Construct a table with one zeroed row per node, sized by the node
    /// state counts. Counts below 2 are clamped up to 2.
    pub fn new(states: &[usize]) -> Self {
        let rows = states.iter().map(|&k| vec![0.0; k.max(2)]).collect();
        MarginalTable { rows }
    }


    pub fn num_nodes(&self) -> usize {
        self.rows.len()
    }


    /// Retrieve the marginal probability of one node state.
    pub fn probability(&self, node: usize, state: usize) -> Result<f64> {
        self.rows
            .get(node)
            .and_then(|row| row.get(state))
            .copied()
            .ok_or(BayouError::InvalidIndex)
    }


    /// Retrieve a node's whole marginal vector.
    pub fn probabilities(&self, node: usize) -> Result<&[f64]> {
        self.rows
            .get(node)
            .map(|row| row.as_slice())
            .ok_or(BayouError::InvalidIndex)
    }


    /// Overwrite a node's marginal vector. The vector length must match
    /// the node's state count.
    pub fn set_probabilities(&mut self, node: usize, values: &[f64]) -> Result<()> {
        let row = self.rows.get_mut(node).ok_or(BayouError::SchemaMismatch)?;
        if values.len() != row.len() {
            return Err(BayouError::SchemaMismatch);
        }

        row.copy_from_slice(values);
        Ok(())
    }


    /// Accumulate `delta` into one cell.
    pub fn add_to_probability(&mut self, node: usize, state: usize, delta: f64) -> Result<()> {
        self.rows
            .get_mut(node)
            .and_then(|row| row.get_mut(state))
            .map(|cell| *cell += delta)
            .ok_or(BayouError::InvalidIndex)
    }


    /// Normalize each node's vector independently. All-zero vectors are
    /// left all-zero.
    pub fn normalize(&mut self) {
        for row in self.rows.iter_mut() {
            let total: f64 = row.iter().sum();
            if total != 0.0 {
                for cell in row.iter_mut() {
                    *cell /= total;
                }
            }
        }
    }


    /// Set every entry to `value`.
    pub fn reset(&mut self, value: f64) {
        for row in self.rows.iter_mut() {
            for cell in row.iter_mut() {
                *cell = value;
            }
        }
    }

}
