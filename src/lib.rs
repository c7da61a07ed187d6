//! bayou - discrete Bayesian networks with sampling-based inference.
//!
//! A `Network` is a directed graph of discrete random variables, each
//! with a `ConditionalTable` giving its distribution over every
//! combination of parent states. Two samplers approximate marginal and
//! joint distributions under observed evidence: `RejectionSampler`
//! (independent ancestral draws) and `GibbsSampler` (a single-site
//! Markov chain).

pub mod network;
pub mod node;
pub mod samplers;
pub mod table;
pub mod util;

pub use crate::network::Network;
pub use crate::node::Node;
pub use crate::samplers::{GibbsSampler, RejectionSampler, Sampler};
pub use crate::table::{ConditionalTable, JointTable, MarginalTable};
pub use crate::util::{BayouError, Result};
