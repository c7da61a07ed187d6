//! Defines a `Node` - a discrete random variable inside a `Network`.
//!
//! A node owns its state count, an optional observed evidence value and
//! its Conditional Probability Table. Nodes are owned exclusively by the
//! `Network` and addressed by dense 0-based ids.

use crate::table::ConditionalTable;
use crate::util::{BayouError, Result};


#[derive(Clone, Debug)]
pub struct Node {

    /// The number of states of the variable. Always >= 2.
    states: usize,

    /// The observed value of the variable, or `None` if it is latent.
    /// Invariant: `evidence < states` when set.
    evidence: Option<usize>,

    /// An optional human-readable label.
    label: String,

    /// The distribution of this node's states conditioned on its parents.
    pub cpt: ConditionalTable,

}


impl Node {

    /// Construct a latent node with the given state count (clamped up to
    /// 2) and a parentless uniform CPT.
    pub fn new(states: usize) -> Self {
        let states = states.max(2);

        Node {
            states,
            evidence: None,
            label: String::new(),
            cpt: ConditionalTable::new(states),
        }
    }


    /// The number of states of the variable.
    pub fn states(&self) -> usize {
        self.states
    }


    /// Fix the node to an observed value.
    ///
    /// # Errors
    /// `BayouError::InvalidIndex` if `value` is not one of the node's
    /// states.
    pub fn set_evidence(&mut self, value: usize) -> Result<()> {
        if value >= self.states {
            return Err(BayouError::InvalidIndex);
        }

        self.evidence = Some(value);
        Ok(())
    }


    /// Return the node to latent.
    pub fn clear_evidence(&mut self) {
        self.evidence = None;
    }


    pub fn evidence(&self) -> Option<usize> {
        self.evidence
    }


    pub fn is_evidence(&self) -> bool {
        self.evidence.is_some()
    }


    pub fn label(&self) -> &str {
        &self.label
    }


    pub fn set_label(&mut self, label: &str) {
        self.label = String::from(label);
    }

}
