use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DenseError {
    #[error("invalid bounds for variable {name}: [{lower}, {upper}]")]
    InvalidVariableBounds { name: String, lower: f64, upper: f64 },
    #[error("invalid coefficient: {coefficient}")]
    InvalidCoefficient { coefficient: f64 },
    #[error("unknown variable column {0}")]
    UnknownVariable(usize),
}
