use thiserror::Error;

/// Errors raised by the indexed parameter accessors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParamError {
    /// The parameter index is not smaller than the parameter count.
    #[error("parameter index {index} is out of range, the model has {count} parameters")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of parameters of the model.
        count: usize,
    },
}

/// Errors that can occur during optimization.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OptimizerError {
    /// Parameter access failed
    #[error("Parameter access failed: {0}")]
    Param(#[from] ParamError),

    /// The step schedule does not fit the model
    #[error("Invalid step schedule: {0}")]
    InvalidSchedule(String),
}
