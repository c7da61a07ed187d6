//! Defines a `ConditionalTable` - the Conditional Probability Table (CPT)
//! of a single node.
//!
//! Each row holds the distribution of the node's own states for one
//! combination of parent states. Rows are stored in a flat `Array2`, one
//! row per parent-state combination in odometer order, so the full
//! Cartesian-product schema exists by construction.

use crate::table;
use crate::util::{BayouError, Result};

use ndarray::{Array2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;


#[derive(Clone, Debug)]
pub struct ConditionalTable {

    /// Number of states of the node owning this table. Always >= 2.
    states: usize,

    /// Number of states of each parent, in the order parents were added.
    parent_states: Vec<usize>,

    /// One row per parent-state combination, one column per node state.
    table: Array2<f64>,

}


impl ConditionalTable {

    /// Construct a table for a parentless node: a single row holding the
    /// uniform distribution over the node's states.
    ///
    /// State counts below 2 are clamped up to 2.
    pub fn new(states: usize) -> Self {
        ConditionalTable::with_parents(states, &[])
    }


    /// Construct a table for a node with the given parent state counts.
    /// Every row starts as the uniform distribution `1/states`.
    ///
    /// State counts below 2 (the node's and each parent's) are clamped up
    /// to 2.
    pub fn with_parents(states: usize, parent_states: &[usize]) -> Self {
        let states = states.max(2);
        let parent_states: Vec<usize> = parent_states.iter().map(|&k| k.max(2)).collect();

        let rows = table::row_count(&parent_states);
        let table = Array2::from_elem((rows, states), 1.0 / (states as f64));

        ConditionalTable { states, parent_states, table }
    }


    /// The number of states of the owning node (= number of columns).
    pub fn column_count(&self) -> usize {
        self.states
    }


    /// The number of rows: the size of the parent-state Cartesian product.
    pub fn row_count(&self) -> usize {
        self.table.nrows()
    }


    /// The per-parent state counts, in parent order.
    pub fn parent_state_counts(&self) -> &[usize] {
        &self.parent_states
    }


    /// Resolve a parent key to its row index.
    fn row_index(&self, key: &[usize]) -> Result<usize> {
        table::flat_index(&self.parent_states, key).ok_or(BayouError::InvalidIndex)
    }


    /// Retrieve the probability of one node state given a parent key.
    ///
    /// # Errors
    /// `BayouError::InvalidIndex` if the key is not a schema row or the
    /// state is out of range.
    pub fn probability(&self, state: usize, key: &[usize]) -> Result<f64> {
        if state >= self.states {
            return Err(BayouError::InvalidIndex);
        }

        let row = self.row_index(key)?;
        Ok(self.table[[row, state]])
    }


    /// Retrieve the whole probability vector for a parent key.
    pub fn probabilities(&self, key: &[usize]) -> Result<Vec<f64>> {
        let row = self.row_index(key)?;
        Ok(self.table.row(row).to_vec())
    }


    /// Overwrite the probability vector of an existing row.
    ///
    /// The schema is fixed at construction: no implicit row creation. The
    /// table is left unchanged on failure.
    ///
    /// # Errors
    /// `BayouError::SchemaMismatch` if the key is not a schema row or the
    /// value vector's length differs from the node's state count.
    pub fn set_probabilities(&mut self, key: &[usize], values: &[f64]) -> Result<()> {
        if values.len() != self.states {
            return Err(BayouError::SchemaMismatch);
        }

        let row = self.row_index(key).map_err(|_| BayouError::SchemaMismatch)?;
        for (state, &v) in values.iter().enumerate() {
            self.table[[row, state]] = v;
        }

        Ok(())
    }


    /// Accumulate `delta` into a single cell. Used by inference loops that
    /// build up empirical counts.
    pub fn add_to_probability(&mut self, state: usize, key: &[usize], delta: f64) -> Result<()> {
        if state >= self.states {
            return Err(BayouError::InvalidIndex);
        }

        let row = self.row_index(key)?;
        self.table[[row, state]] += delta;
        Ok(())
    }


    /// Normalize every row independently so its entries sum to 1.
    ///
    /// Rows whose sum is exactly 0 are left all-zero: a zero row signals
    /// "never observed" and is propagated, not reinterpreted as uniform.
    pub fn normalize(&mut self) {
        for mut row in self.table.axis_iter_mut(Axis(0)) {
            let total: f64 = row.sum();
            if total != 0.0 {
                row.mapv_inplace(|v| v / total);
            }
        }
    }


    /// Replace every row with independent uniform(0,1) draws, normalized
    /// to sum to 1. Produces a non-degenerate random CPT.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        let shape = (self.table.nrows(), self.states);
        self.table = Array2::random_using(shape, Uniform::new(0.0, 1.0), rng);
        self.normalize();
    }


    /// Set every entry of the table to `value`.
    pub fn reset(&mut self, value: f64) {
        self.table.fill(value);
    }


    /// Draw one node state from the row's distribution, proportionally to
    /// the row's current values.
    ///
    /// # Errors
    /// * `BayouError::InvalidIndex` if the key is not a schema row
    /// * `BayouError::DegenerateDistribution` if the row is all-zero (or
    ///   otherwise not a valid set of weights)
    pub fn sample<R: Rng>(&self, key: &[usize], rng: &mut R) -> Result<usize> {
        let row = self.row_index(key)?;
        let weights = self.table.row(row);

        let dist = WeightedIndex::new(weights.iter())
            .map_err(|_| BayouError::DegenerateDistribution)?;

        Ok(dist.sample(rng))
    }


    /// Append a new parent dimension and regenerate the table.
    ///
    /// The state space changes shape, so all rows are discarded and
    /// rebuilt uniform. Expensive; intended for model construction time,
    /// not inference time.
    pub fn add_parent(&mut self, states: usize) {
        self.parent_states.push(states.max(2));
        self.rebuild();
    }


    /// Remove the parent dimension at `position` and regenerate the table.
    ///
    /// # Errors
    /// `BayouError::InvalidIndex` if `position` is out of range.
    pub fn remove_parent(&mut self, position: usize) -> Result<()> {
        if position >= self.parent_states.len() {
            return Err(BayouError::InvalidIndex);
        }

        self.parent_states.remove(position);
        self.rebuild();
        Ok(())
    }


    fn rebuild(&mut self) {
        let rows = table::row_count(&self.parent_states);
        self.table = Array2::from_elem((rows, self.states), 1.0 / (self.states as f64));
    }


    /// Return one row of the table: its parent key and its probabilities.
    ///
    /// # Errors
    /// `BayouError::InvalidIndex` if `index` is out of range.
    pub fn row(&self, index: usize) -> Result<(Vec<usize>, Vec<f64>)> {
        if index >= self.row_count() {
            return Err(BayouError::InvalidIndex);
        }

        let key = table::key_at(&self.parent_states, index);
        Ok((key, self.table.row(index).to_vec()))
    }


    /// Return the parent key of the row at `index`.
    pub fn parent_key(&self, index: usize) -> Result<Vec<usize>> {
        if index >= self.row_count() {
            return Err(BayouError::InvalidIndex);
        }

        Ok(table::key_at(&self.parent_states, index))
    }


    /// Find the rows in which the parent at `parent_index` holds
    /// `parent_state`. Returns the row indices in table order.
    ///
    /// # Errors
    /// `BayouError::InvalidIndex` if the table has no parents or
    /// `parent_index` is out of range.
    pub fn find_parent_state(&self, parent_index: usize, parent_state: usize) -> Result<Vec<usize>> {
        if self.parent_states.is_empty() || parent_index >= self.parent_states.len() {
            return Err(BayouError::InvalidIndex);
        }

        let rows = table::keys(&self.parent_states)
            .enumerate()
            .filter(|(_, key)| key[parent_index] == parent_state)
            .map(|(row, _)| row)
            .collect();

        Ok(rows)
    }

}


#[cfg(test)]
mod tests {

    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn parentless_uniform() {
        let cpt = ConditionalTable::new(4);
        assert_eq!(1, cpt.row_count());
        assert_eq!(4, cpt.column_count());

        for state in 0..4 {
            assert!((0.25 - cpt.probability(state, &[]).unwrap()).abs() < TOLERANCE);
        }
    }

    #[test]
    fn state_count_clamped() {
        let cpt = ConditionalTable::new(0);
        assert_eq!(2, cpt.column_count());

        let cpt = ConditionalTable::with_parents(2, &[1, 3]);
        assert_eq!(&[2, 3], cpt.parent_state_counts());
        assert_eq!(6, cpt.row_count());
    }

    #[test]
    fn schema_is_cartesian_product() {
        let cpt = ConditionalTable::with_parents(2, &[2, 3]);
        assert_eq!(6, cpt.row_count());

        let expected = vec![
            vec![0, 0], vec![0, 1], vec![0, 2],
            vec![1, 0], vec![1, 1], vec![1, 2],
        ];
        for (i, key) in expected.iter().enumerate() {
            assert_eq!(*key, cpt.parent_key(i).unwrap());
        }
    }

    #[test]
    fn set_and_get() {
        let mut cpt = ConditionalTable::with_parents(2, &[2]);
        cpt.set_probabilities(&[1], &[0.2, 0.8]).unwrap();

        assert!((0.2 - cpt.probability(0, &[1]).unwrap()).abs() < TOLERANCE);
        assert!((0.8 - cpt.probability(1, &[1]).unwrap()).abs() < TOLERANCE);

        // untouched row keeps the uniform init
        assert!((0.5 - cpt.probability(0, &[0]).unwrap()).abs() < TOLERANCE);
    }

    #[test]
    fn set_rejects_bad_schema() {
        let mut cpt = ConditionalTable::with_parents(2, &[2]);

        // key not in the schema
        let res = cpt.set_probabilities(&[2], &[0.5, 0.5]);
        assert_eq!(Err(BayouError::SchemaMismatch), res);

        // wrong arity
        let res = cpt.set_probabilities(&[0, 0], &[0.5, 0.5]);
        assert_eq!(Err(BayouError::SchemaMismatch), res);

        // wrong vector length
        let res = cpt.set_probabilities(&[0], &[0.5, 0.3, 0.2]);
        assert_eq!(Err(BayouError::SchemaMismatch), res);

        // failed writes leave the table unchanged
        assert!((0.5 - cpt.probability(0, &[0]).unwrap()).abs() < TOLERANCE);
    }

    #[test]
    fn lookup_errors() {
        let cpt = ConditionalTable::with_parents(2, &[2]);
        assert_eq!(Err(BayouError::InvalidIndex), cpt.probability(2, &[0]));
        assert_eq!(Err(BayouError::InvalidIndex), cpt.probability(0, &[5]));
        assert_eq!(Err(BayouError::InvalidIndex), cpt.probabilities(&[0, 0]));
        assert_eq!(Err(BayouError::InvalidIndex), cpt.row(2));
    }

    #[test]
    fn normalize_rows() {
        let mut cpt = ConditionalTable::with_parents(2, &[2]);
        cpt.reset(0.0);
        cpt.add_to_probability(0, &[0], 3.0).unwrap();
        cpt.add_to_probability(1, &[0], 1.0).unwrap();

        cpt.normalize();

        assert!((0.75 - cpt.probability(0, &[0]).unwrap()).abs() < TOLERANCE);
        assert!((0.25 - cpt.probability(1, &[0]).unwrap()).abs() < TOLERANCE);

        // the never-populated row stays all-zero
        assert_eq!(0.0, cpt.probability(0, &[1]).unwrap());
        assert_eq!(0.0, cpt.probability(1, &[1]).unwrap());
    }

    #[test]
    fn normalize_idempotent() {
        let mut cpt = ConditionalTable::with_parents(3, &[2]);
        let mut rng = StdRng::seed_from_u64(7);
        cpt.randomize(&mut rng);

        let before = cpt.probabilities(&[0]).unwrap();
        cpt.normalize();
        let after = cpt.probabilities(&[0]).unwrap();

        for (b, a) in before.iter().zip(after.iter()) {
            assert!((b - a).abs() < TOLERANCE);
        }
    }

    #[test]
    fn randomize_rows_sum_to_one() {
        let mut cpt = ConditionalTable::with_parents(3, &[2, 2]);
        let mut rng = StdRng::seed_from_u64(42);
        cpt.randomize(&mut rng);

        for row in 0..cpt.row_count() {
            let (_, values) = cpt.row(row).unwrap();
            let total: f64 = values.iter().sum();
            assert!((1.0 - total).abs() < TOLERANCE);
        }
    }

    #[test]
    fn sample_respects_weights() {
        let mut cpt = ConditionalTable::with_parents(2, &[2]);
        cpt.set_probabilities(&[0], &[0.0, 1.0]).unwrap();
        cpt.set_probabilities(&[1], &[1.0, 0.0]).unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            assert_eq!(1, cpt.sample(&[0], &mut rng).unwrap());
            assert_eq!(0, cpt.sample(&[1], &mut rng).unwrap());
        }
    }

    #[test]
    fn sample_degenerate_row() {
        let mut cpt = ConditionalTable::new(2);
        cpt.reset(0.0);

        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(Err(BayouError::DegenerateDistribution), cpt.sample(&[], &mut rng));
    }

    #[test]
    fn add_parent_rebuilds() {
        let mut cpt = ConditionalTable::new(2);
        cpt.set_probabilities(&[], &[0.9, 0.1]).unwrap();

        cpt.add_parent(3);

        assert_eq!(3, cpt.row_count());
        assert_eq!(&[3], cpt.parent_state_counts());
        // prior values are discarded, rows are uniform again
        assert!((0.5 - cpt.probability(0, &[0]).unwrap()).abs() < TOLERANCE);
    }

    #[test]
    fn remove_parent_rebuilds() {
        let mut cpt = ConditionalTable::with_parents(2, &[2, 3]);
        cpt.remove_parent(1).unwrap();

        assert_eq!(&[2], cpt.parent_state_counts());
        assert_eq!(2, cpt.row_count());

        assert_eq!(Err(BayouError::InvalidIndex), cpt.remove_parent(4));
    }

    #[test]
    fn find_parent_state_rows() {
        let cpt = ConditionalTable::with_parents(2, &[2, 3]);

        // keys: [0,0] [0,1] [0,2] [1,0] [1,1] [1,2]
        assert_eq!(vec![0, 1, 2], cpt.find_parent_state(0, 0).unwrap());
        assert_eq!(vec![3, 4, 5], cpt.find_parent_state(0, 1).unwrap());
        assert_eq!(vec![1, 4], cpt.find_parent_state(1, 1).unwrap());

        assert_eq!(Err(BayouError::InvalidIndex), cpt.find_parent_state(2, 0));

        let parentless = ConditionalTable::new(2);
        assert_eq!(Err(BayouError::InvalidIndex), parentless.find_parent_state(0, 0));
    }

}
