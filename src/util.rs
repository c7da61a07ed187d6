//! Defines the `Error` type for the bayou library

use std::error::Error;
use std::fmt;
use std::result;

pub type Result<T> = result::Result<T, BayouError>;

#[derive(Clone, Debug, PartialEq)]
pub enum BayouError {

    /// A row, variable or state index outside its valid domain
    InvalidIndex,

    /// An attempt to write a row key that is not part of a table's declared
    /// Cartesian-product schema, or a value vector of the wrong length
    SchemaMismatch,

    /// An attempt to draw a sample from an all-zero probability row
    DegenerateDistribution,

    /// A general error with the given description
    General(String),

}

impl BayouError {

    fn describe(&self) -> &str {
        match self {
            BayouError::InvalidIndex => "Index outside its valid domain",
            BayouError::SchemaMismatch => "Row key or value vector does not match the table schema",
            BayouError::DegenerateDistribution => "Cannot sample from an all-zero probability row",
            BayouError::General(ref err) => err.as_str(),
        }
    }

}

impl Error for BayouError {}

impl fmt::Display for BayouError {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.describe())
    }

}
