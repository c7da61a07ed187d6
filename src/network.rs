//! Defines a `Network` - a directed graph of discrete random variables.
//!
//! The network owns every `Node` and the directed edges between them, and
//! provides the structural algorithms the samplers build on: topological
//! ordering, breadth- and depth-first traversal, and classification
//! (tree / multiply-connected, root and leaf detection).
//!
//! Traversals colour nodes White (unvisited), Gray (frontier) and Black
//! (done) in a vector local to each call, so independent traversals never
//! interfere and there is no reset step between them.

use crate::node::Node;
use crate::util::{BayouError, Result};

use bidir_map::BidirMap;
use indexmap::IndexSet;
use log::debug;

use std::collections::VecDeque;
use std::ops::{Index, IndexMut};


/// Traversal marker, local to each graph search.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Colour {
    White,
    Gray,
    Black,
}


pub struct Network {

    /// All nodes, indexed by dense 0-based id. The count is fixed at
    /// construction and ids are never reused.
    nodes: Vec<Node>,

    /// Outgoing edges per node. Insertion-ordered.
    out_edges: Vec<IndexSet<usize>>,

    /// Incoming edges per node. Insertion order defines the order of the
    /// parent dimensions in the node's CPT.
    in_edges: Vec<IndexSet<usize>>,

    /// Two-way id <-> label lookup for nodes that have been labelled.
    labels: BidirMap<usize, String>,

}


impl Network {

    /// Construct a network of `num_nodes` unconnected nodes, each with the
    /// same number of states.
    pub fn new(num_nodes: usize, states: usize) -> Self {
        Network::from_states(&vec![states; num_nodes])
    }


    /// Construct a network with one node per entry of `states`, each with
    /// its own state count (clamped up to 2).
    pub fn from_states(states: &[usize]) -> Self {
        let nodes = states.iter().map(|&k| Node::new(k)).collect();

        Network {
            nodes,
            out_edges: vec![IndexSet::new(); states.len()],
            in_edges: vec![IndexSet::new(); states.len()],
            labels: BidirMap::new(),
        }
    }


    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }


    pub fn num_edges(&self) -> usize {
        self.out_edges.iter().map(|set| set.len()).sum()
    }


    pub fn node(&self, id: usize) -> Option<&Node> {
        self.nodes.get(id)
    }


    pub fn node_mut(&mut self, id: usize) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }


    /// The state count of every node, in id order.
    pub fn total_states(&self) -> Vec<usize> {
        self.nodes.iter().map(|n| n.states()).collect()
    }


    /// Ids of the nodes currently flagged as evidence.
    pub fn evidence_nodes(&self) -> Vec<usize> {
        (0..self.num_nodes()).filter(|&id| self.nodes[id].is_evidence()).collect()
    }


    /// Ids of the latent (non-evidence) nodes.
    pub fn not_evidence_nodes(&self) -> Vec<usize> {
        (0..self.num_nodes()).filter(|&id| !self.nodes[id].is_evidence()).collect()
    }


    ///////////////////////////////////////////////////////////////////////
    // Edges

    /// Add a directed edge `from -> to`.
    ///
    /// On success the child node's CPT gains a parent dimension (a full
    /// uniform rebuild: prior rows are discarded). Self-loops and edges
    /// that already exist are a no-op and return `Ok(false)`.
    ///
    /// Cycles are *not* detected here. A caller who introduces a cycle
    /// breaks the `topological_order` contract.
    ///
    /// # Errors
    /// `BayouError::InvalidIndex` if either id is out of range.
    pub fn add_edge(&mut self, from: usize, to: usize) -> Result<bool> {
        if from >= self.num_nodes() || to >= self.num_nodes() {
            return Err(BayouError::InvalidIndex);
        }

        if from == to || self.out_edges[from].contains(&to) {
            return Ok(false);
        }

        self.out_edges[from].insert(to);
        self.in_edges[to].insert(from);

        let parent_states = self.nodes[from].states();
        self.nodes[to].cpt.add_parent(parent_states);

        debug!("added edge {} -> {}", from, to);
        Ok(true)
    }


    /// Remove the directed edge `from -> to`.
    ///
    /// On success the child node's CPT drops the corresponding parent
    /// dimension (a full uniform rebuild). Returns `Ok(false)` if the edge
    /// does not exist.
    ///
    /// # Errors
    /// `BayouError::InvalidIndex` if either id is out of range.
    pub fn remove_edge(&mut self, from: usize, to: usize) -> Result<bool> {
        if from >= self.num_nodes() || to >= self.num_nodes() {
            return Err(BayouError::InvalidIndex);
        }

        let position = match self.in_edges[to].get_index_of(&from) {
            Some(p) => p,
            None => return Ok(false),
        };

        // shift-remove keeps the surviving parents in insertion order,
        // matching the CPT dimension order after the rebuild
        self.out_edges[from].shift_remove(&to);
        self.in_edges[to].shift_remove(&from);
        self.nodes[to].cpt.remove_parent(position)?;

        debug!("removed edge {} -> {}", from, to);
        Ok(true)
    }


    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.out_edges.get(from).map_or(false, |set| set.contains(&to))
    }


    /// The children of `id`, in edge-insertion order.
    pub fn out_edges(&self, id: usize) -> Result<Vec<usize>> {
        self.out_edges
            .get(id)
            .map(|set| set.iter().copied().collect())
            .ok_or(BayouError::InvalidIndex)
    }


    /// The parents of `id`, in edge-insertion order. This order is the
    /// order of the parent dimensions in the node's CPT.
    pub fn in_edges(&self, id: usize) -> Result<Vec<usize>> {
        self.in_edges
            .get(id)
            .map(|set| set.iter().copied().collect())
            .ok_or(BayouError::InvalidIndex)
    }


    ///////////////////////////////////////////////////////////////////////
    // Structure

    /// `true` if `id` has no incoming edges. Panics on out-of-range ids,
    /// like slice indexing.
    pub fn is_root(&self, id: usize) -> bool {
        self.in_edges[id].is_empty()
    }


    /// `true` if `id` has no outgoing edges. Panics on out-of-range ids,
    /// like slice indexing.
    pub fn is_leaf(&self, id: usize) -> bool {
        self.out_edges[id].is_empty()
    }


    /// Ids of the nodes with no incoming edges.
    pub fn roots(&self) -> Vec<usize> {
        (0..self.num_nodes()).filter(|&id| self.is_root(id)).collect()
    }


    /// Ids of the nodes with no outgoing edges.
    pub fn leaves(&self) -> Vec<usize> {
        (0..self.num_nodes()).filter(|&id| self.is_leaf(id)).collect()
    }


    /// A topological order of the nodes (Kahn's algorithm).
    ///
    /// # Precondition
    /// The graph must be acyclic. Cycles are not detected: on a cyclic
    /// graph the returned order is partial and meaningless.
    pub fn topological_order(&self) -> Vec<usize> {
        let mut in_degree: Vec<usize> = self.in_edges.iter().map(|set| set.len()).collect();

        let mut queue: VecDeque<usize> = (0..self.num_nodes())
            .filter(|&id| in_degree[id] == 0)
            .collect();

        let mut order = Vec::with_capacity(self.num_nodes());
        while let Some(id) = queue.pop_front() {
            order.push(id);
            for &child in self.out_edges[id].iter() {
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    queue.push_back(child);
                }
            }
        }

        order
    }


    /// Breadth-first traversal over out-edges from `start`. Returns the
    /// visited ids in visit order.
    ///
    /// # Errors
    /// `BayouError::InvalidIndex` if `start` is out of range.
    pub fn breadth_first(&self, start: usize) -> Result<Vec<usize>> {
        if start >= self.num_nodes() {
            return Err(BayouError::InvalidIndex);
        }

        let mut colours = vec![Colour::White; self.num_nodes()];
        let mut queue = VecDeque::new();
        let mut visited = Vec::new();

        colours[start] = Colour::Gray;
        queue.push_back(start);

        while let Some(id) = queue.pop_front() {
            visited.push(id);
            for &child in self.out_edges[id].iter() {
                if colours[child] == Colour::White {
                    colours[child] = Colour::Gray;
                    queue.push_back(child);
                }
            }
            colours[id] = Colour::Black;
        }

        Ok(visited)
    }


    /// Depth-first traversal over out-edges from `start`. Returns the
    /// visited ids in discovery (preorder) order.
    ///
    /// # Errors
    /// `BayouError::InvalidIndex` if `start` is out of range.
    pub fn depth_first(&self, start: usize) -> Result<Vec<usize>> {
        if start >= self.num_nodes() {
            return Err(BayouError::InvalidIndex);
        }

        let mut colours = vec![Colour::White; self.num_nodes()];
        let mut stack = vec![start];
        let mut visited = Vec::new();

        while let Some(id) = stack.pop() {
            if colours[id] != Colour::White {
                continue;
            }
            colours[id] = Colour::Black;
            visited.push(id);

            // push in reverse so the first out-edge is explored first
            for &child in self.out_edges[id].iter().rev() {
                if colours[child] == Colour::White {
                    stack.push(child);
                }
            }
        }

        Ok(visited)
    }


    /// `true` iff every non-root node has exactly one incoming edge and
    /// the underlying undirected graph is connected. An empty network is
    /// a tree.
    pub fn is_tree(&self) -> bool {
        if self.num_nodes() == 0 {
            return true;
        }

        if self.in_edges.iter().any(|set| set.len() > 1) {
            return false;
        }

        // undirected connectivity from node 0
        let mut colours = vec![Colour::White; self.num_nodes()];
        let mut queue = VecDeque::new();
        colours[0] = Colour::Gray;
        queue.push_back(0);
        let mut seen = 0;

        while let Some(id) = queue.pop_front() {
            seen += 1;
            let neighbours = self.out_edges[id].iter().chain(self.in_edges[id].iter());
            for &next in neighbours {
                if colours[next] == Colour::White {
                    colours[next] = Colour::Gray;
                    queue.push_back(next);
                }
            }
            colours[id] = Colour::Black;
        }

        seen == self.num_nodes()
    }


    /// `true` iff some node is reachable from another by more than one
    /// directed path.
    ///
    /// Detected by depth-first search from every node: on an acyclic
    /// graph, an edge that leads to an already-coloured node is a second
    /// distinct path from the start node. Multiply-connected structure
    /// means simple upstream/downstream reasoning may be unsound.
    pub fn is_multi_connected(&self) -> bool {
        for start in 0..self.num_nodes() {
            let mut colours = vec![Colour::White; self.num_nodes()];
            let mut stack = vec![start];
            colours[start] = Colour::Black;

            while let Some(id) = stack.pop() {
                for &child in self.out_edges[id].iter() {
                    if colours[child] == Colour::White {
                        colours[child] = Colour::Black;
                        stack.push(child);
                    } else {
                        return true;
                    }
                }
            }
        }

        false
    }


    ///////////////////////////////////////////////////////////////////////
    // Probabilities

    /// The probability of node `id` taking its value in `assignment`,
    /// given its parents' values in `assignment`: the node's CPT entry
    /// under the full-network assignment.
    ///
    /// # Errors
    /// * `BayouError::InvalidIndex` if `id` is out of range
    /// * `BayouError::SchemaMismatch` if `assignment` does not assign
    ///   every node
    pub fn node_probability(&self, id: usize, assignment: &[usize]) -> Result<f64> {
        if id >= self.num_nodes() {
            return Err(BayouError::InvalidIndex);
        }
        if assignment.len() != self.num_nodes() {
            return Err(BayouError::SchemaMismatch);
        }

        let key: Vec<usize> = self.in_edges[id].iter().map(|&p| assignment[p]).collect();
        self.nodes[id].cpt.probability(assignment[id], &key)
    }


    ///////////////////////////////////////////////////////////////////////
    // Labels

    /// Attach a label to a node, replacing any previous label.
    ///
    /// # Errors
    /// `BayouError::InvalidIndex` if `id` is out of range.
    pub fn set_label(&mut self, id: usize, label: &str) -> Result<()> {
        let node = self.nodes.get_mut(id).ok_or(BayouError::InvalidIndex)?;
        node.set_label(label);

        self.labels.remove_by_first(&id);
        self.labels.insert(id, String::from(label));
        Ok(())
    }


    pub fn label(&self, id: usize) -> Option<&str> {
        self.labels.get_by_first(&id).map(|s| s.as_str())
    }


    /// Look up a node id by its label.
    pub fn node_by_label(&self, label: &str) -> Option<usize> {
        self.labels.get_by_second(&String::from(label)).copied()
    }

}


impl Index<usize> for Network {

    type Output = Node;

    fn index(&self, id: usize) -> &Node {
        &self.nodes[id]
    }

}


impl IndexMut<usize> for Network {

    fn index_mut(&mut self, id: usize) -> &mut Node {
        &mut self.nodes[id]
    }

}


#[cfg(test)]
mod tests {

    use super::*;

    /// A -> B, A -> C, B -> D, C -> D
    fn diamond() -> Network {
        let mut net = Network::new(4, 2);
        net.add_edge(0, 1).unwrap();
        net.add_edge(0, 2).unwrap();
        net.add_edge(1, 3).unwrap();
        net.add_edge(2, 3).unwrap();
        net
    }

    #[test]
    fn edges_are_mutual_inverses() {
        let mut net = Network::new(3, 2);
        assert!(net.add_edge(0, 1).unwrap());
        assert!(net.add_edge(0, 2).unwrap());

        assert!(net.has_edge(0, 1));
        assert!(!net.has_edge(1, 0));
        assert_eq!(vec![1, 2], net.out_edges(0).unwrap());
        assert_eq!(vec![0], net.in_edges(1).unwrap());
        assert_eq!(vec![0], net.in_edges(2).unwrap());
        assert_eq!(2, net.num_edges());
    }

    #[test]
    fn duplicate_and_self_edges_are_noops() {
        let mut net = Network::new(2, 2);
        assert!(net.add_edge(0, 1).unwrap());
        assert!(!net.add_edge(0, 1).unwrap());
        assert!(!net.add_edge(0, 0).unwrap());
        assert_eq!(1, net.num_edges());

        assert_eq!(Err(BayouError::InvalidIndex), net.add_edge(0, 5));
    }

    #[test]
    fn add_edge_rebuilds_child_cpt() {
        let mut net = Network::from_states(&[3, 2]);
        net.add_edge(0, 1).unwrap();

        // B is conditioned on A: one row per A state
        assert_eq!(3, net[1].cpt.row_count());
        assert_eq!(&[3], net[1].cpt.parent_state_counts());

        // and A keeps its single parentless row
        assert_eq!(1, net[0].cpt.row_count());
    }

    #[test]
    fn remove_edge_drops_parent_dimension() {
        let mut net = Network::from_states(&[3, 4, 2]);
        net.add_edge(0, 2).unwrap();
        net.add_edge(1, 2).unwrap();
        assert_eq!(&[3, 4], net[2].cpt.parent_state_counts());

        assert!(net.remove_edge(0, 2).unwrap());
        assert_eq!(&[4], net[2].cpt.parent_state_counts());
        assert_eq!(vec![1], net.in_edges(2).unwrap());

        assert!(!net.remove_edge(0, 2).unwrap());
    }

    #[test]
    fn topological_order_respects_edges() {
        let net = diamond();
        let order = net.topological_order();

        assert_eq!(4, order.len());
        let position = |id: usize| order.iter().position(|&n| n == id).unwrap();

        for (u, v) in [(0, 1), (0, 2), (1, 3), (2, 3)].iter() {
            assert!(position(*u) < position(*v));
        }
    }

    #[test]
    fn traversals() {
        let net = diamond();

        let bfs = net.breadth_first(0).unwrap();
        assert_eq!(vec![0, 1, 2, 3], bfs);

        let dfs = net.depth_first(0).unwrap();
        assert_eq!(vec![0, 1, 3, 2], dfs);

        // traversal from a leaf sees only itself
        assert_eq!(vec![3], net.breadth_first(3).unwrap());

        assert_eq!(Err(BayouError::InvalidIndex), net.breadth_first(9));
        assert_eq!(Err(BayouError::InvalidIndex), net.depth_first(9));
    }

    #[test]
    fn isolated_node_is_root_and_leaf() {
        let net = Network::new(1, 2);
        assert!(net.is_root(0));
        assert!(net.is_leaf(0));
        assert_eq!(vec![0], net.roots());
        assert_eq!(vec![0], net.leaves());
        assert!(net.is_tree());
        assert!(!net.is_multi_connected());
    }

    #[test]
    fn diamond_is_multi_connected() {
        let net = diamond();
        assert!(net.is_multi_connected());
        assert!(!net.is_tree());
        assert_eq!(vec![0], net.roots());
        assert_eq!(vec![3], net.leaves());
    }

    #[test]
    fn chain_is_tree() {
        let mut net = Network::new(3, 2);
        net.add_edge(0, 1).unwrap();
        net.add_edge(1, 2).unwrap();

        assert!(net.is_tree());
        assert!(!net.is_multi_connected());
    }

    #[test]
    fn disconnected_graph_is_not_tree() {
        let mut net = Network::new(4, 2);
        net.add_edge(0, 1).unwrap();
        net.add_edge(2, 3).unwrap();

        assert!(!net.is_tree());
    }

    #[test]
    fn node_probability_uses_parent_key() {
        let mut net = Network::new(2, 2);
        net.add_edge(0, 1).unwrap();
        net[1].cpt.set_probabilities(&[0], &[0.9, 0.1]).unwrap();
        net[1].cpt.set_probabilities(&[1], &[0.3, 0.7]).unwrap();

        assert!((0.1 - net.node_probability(1, &[0, 1]).unwrap()).abs() < 1e-9);
        assert!((0.7 - net.node_probability(1, &[1, 1]).unwrap()).abs() < 1e-9);
        assert!((0.5 - net.node_probability(0, &[0, 1]).unwrap()).abs() < 1e-9);

        assert_eq!(Err(BayouError::SchemaMismatch), net.node_probability(1, &[0]));
        assert_eq!(Err(BayouError::InvalidIndex), net.node_probability(5, &[0, 1]));
    }

    #[test]
    fn labels_two_way() {
        let mut net = Network::new(2, 2);
        net.set_label(0, "Rain").unwrap();
        net.set_label(1, "Sprinkler").unwrap();

        assert_eq!(Some("Rain"), net.label(0));
        assert_eq!(Some(1), net.node_by_label("Sprinkler"));
        assert_eq!(None, net.node_by_label("Cloudy"));

        // relabelling replaces the old entry
        net.set_label(0, "Storm").unwrap();
        assert_eq!(Some("Storm"), net.label(0));
        assert_eq!(None, net.node_by_label("Rain"));

        assert_eq!(Err(BayouError::InvalidIndex), net.set_label(7, "X"));
    }

    #[test]
    fn evidence_bookkeeping() {
        let mut net = Network::new(3, 2);
        net[1].set_evidence(1).unwrap();

        assert_eq!(vec![1], net.evidence_nodes());
        assert_eq!(vec![0, 2], net.not_evidence_nodes());
        assert_eq!(vec![2, 2, 2], net.total_states());
    }

}
