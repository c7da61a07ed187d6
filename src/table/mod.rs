//! Defines the probability table types used throughout the library.
//!
//! A `ConditionalTable` holds a node's distribution conditioned on every
//! combination of its parents' states; a `JointTable` holds a single mass
//! value for every full-network assignment. Both lay their rows out in a
//! flat, contiguous array indexed by the mixed-radix encoding of the row
//! key, so every row of the declared Cartesian product exists by
//! construction and lookups never hash.

use itertools::Itertools;

pub mod conditional;
pub mod joint;
pub mod marginal;

pub use self::conditional::ConditionalTable;
pub use self::joint::JointTable;
pub use self::marginal::MarginalTable;


/// The number of rows spanned by the given per-dimension cardinalities.
/// An empty dimension list yields exactly one row (the empty key).
pub fn row_count(dims: &[usize]) -> usize {
    dims.iter().product()
}


/// Encode a row key as its flat mixed-radix index, with the last dimension
/// advancing fastest (odometer order).
///
/// # Returns
/// `None` if the key's arity does not match `dims` or any digit is out of
/// range for its dimension.
pub fn flat_index(dims: &[usize], key: &[usize]) -> Option<usize> {
    if key.len() != dims.len() {
        return None;
    }

    let mut index = 0;
    for (&digit, &radix) in key.iter().zip(dims.iter()) {
        if digit >= radix {
            return None;
        }
        index = index * radix + digit;
    }

    Some(index)
}


/// Decode a flat row index back into its key. Inverse of `flat_index`.
///
/// # Panics
/// Panics if `index` is outside `0..row_count(dims)`.
pub fn key_at(dims: &[usize], index: usize) -> Vec<usize> {
    assert!(index < row_count(dims), "row index {} out of range", index);

    let mut key = vec![0; dims.len()];
    let mut rest = index;
    for (pos, &radix) in dims.iter().enumerate().rev() {
        key[pos] = rest % radix;
        rest /= radix;
    }

    key
}


/// Iterate over every row key of the Cartesian product of `dims` in
/// odometer order: the last dimension advances fastest, identical to
/// counting in mixed radix. Empty `dims` yields exactly the empty key.
pub fn keys(dims: &[usize]) -> Box<dyn Iterator<Item = Vec<usize>>> {
    if dims.is_empty() {
        Box::new(std::iter::once(Vec::new()))
    } else {
        Box::new(dims.to_vec().into_iter().map(|k| 0..k).multi_cartesian_product())
    }
}
