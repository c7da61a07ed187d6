//! Defines a `JointTable` - a Joint Probability Table (JPT) over a full
//! network assignment.
//!
//! Unlike a CPT there is no parent/self distinction: every variable is
//! symmetric and each row holds a single scalar mass. Samplers build an
//! empirical joint distribution by accumulating counts and normalizing.

use crate::table;
use crate::util::{BayouError, Result};

use ndarray::Array1;
use rand::Rng;


#[derive(Clone, Debug)]
pub struct JointTable {

    /// Number of states of each variable, in network node-id order.
    states: Vec<usize>,

    /// One mass value per full assignment, mixed-radix row order.
    mass: Array1<f64>,

}


impl JointTable {

    /// Construct a table over variables with the given state counts.
    /// Every row starts at 0 and is filled by accumulation.
    ///
    /// State counts below 2 are clamped up to 2. Zero variables yields a
    /// single row keyed by the empty assignment.
    pub fn new(states: &[usize]) -> Self {
        let states: Vec<usize> = states.iter().map(|&k| k.max(2)).collect();
        let mass = Array1::zeros(table::row_count(&states));

        JointTable { states, mass }
    }


    pub fn row_count(&self) -> usize {
        self.mass.len()
    }


    pub fn variable_state_counts(&self) -> &[usize] {
        &self.states
    }


    fn row_index(&self, key: &[usize]) -> Result<usize> {
        table::flat_index(&self.states, key).ok_or(BayouError::InvalidIndex)
    }


    /// Retrieve the mass of one full assignment.
    pub fn probability(&self, key: &[usize]) -> Result<f64> {
        let row = self.row_index(key)?;
        Ok(self.mass[row])
    }


    /// Overwrite the mass of an existing row. The schema is fixed at
    /// construction; unknown keys are rejected.
    pub fn set_probability(&mut self, key: &[usize], probability: f64) -> Result<()> {
        let row = self.row_index(key).map_err(|_| BayouError::SchemaMismatch)?;
        self.mass[row] = probability;
        Ok(())
    }


    /// Accumulate `delta` into one row.
    pub fn add_to_probability(&mut self, key: &[usize], delta: f64) -> Result<()> {
        let row = self.row_index(key)?;
        self.mass[row] += delta;
        Ok(())
    }


    /// The marginal probability of one variable taking one state: the sum
    /// of the mass of every row whose `variable`-th entry equals `state`.
    /// Brute-force, linear in the number of rows.
    ///
    /// # Errors
    /// `BayouError::InvalidIndex` if `variable` or `state` is out of range.
    pub fn marginal(&self, variable: usize, state: usize) -> Result<f64> {
        if variable >= self.states.len() || state >= self.states[variable] {
            return Err(BayouError::InvalidIndex);
        }

        let total = table::keys(&self.states)
            .enumerate()
            .filter(|(_, key)| key[variable] == state)
            .map(|(row, _)| self.mass[row])
            .sum();

        Ok(total)
    }


    /// Normalize the whole table so the total mass is 1.
    ///
    /// A table whose total is exactly 0 is left unchanged.
    pub fn normalize(&mut self) {
        let total: f64 = self.mass.sum();
        if total != 0.0 {
            self.mass.mapv_inplace(|v| v / total);
        }
    }


    /// Replace every row with an independent uniform(0,1) draw, then
    /// normalize the table.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        self.mass.mapv_inplace(|_| rng.gen_range(0.0..1.0));
        self.normalize();
    }


    /// Set every row to `value`.
    pub fn reset(&mut self, value: f64) {
        self.mass.fill(value);
    }


    /// Append a new variable dimension and regenerate the table, zeroed.
    pub fn add_variable(&mut self, states: usize) {
        self.states.push(states.max(2));
        self.mass = Array1::zeros(table::row_count(&self.states));
    }


    /// Return the assignment key of the row at `index`.
    pub fn key_at(&self, index: usize) -> Result<Vec<usize>> {
        if index >= self.row_count() {
            return Err(BayouError::InvalidIndex);
        }

        Ok(table::key_at(&self.states, index))
    }

}
