mod error;
mod problem;

pub use error::DenseError;
pub use problem::{Constraint, LpProblem, Objective};
