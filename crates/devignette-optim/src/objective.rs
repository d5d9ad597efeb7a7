use crate::error::ParamError;

/// A model that can be scored against some data.
///
/// Lower scores are better.
pub trait Objective<D: ?Sized> {
    /// Score the model with its current parameters.
    fn evaluate(&self, data: &D) -> f32;

    /// Check whether the current parameters describe an admissible model.
    ///
    /// Trials with invalid parameters are discarded without being evaluated.
    fn is_valid(&self) -> bool;
}

/// Flat, indexed access to the parameters of a model.
pub trait Parameterized {
    /// Number of parameters of the model.
    fn num_params(&self) -> usize;

    /// Get the parameter at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::IndexOutOfRange`] if `index >= num_params()`.
    fn param(&self, index: usize) -> Result<f32, ParamError>;

    /// Set the parameter at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::IndexOutOfRange`] if `index >= num_params()`.
    fn set_param(&mut self, index: usize, value: f32) -> Result<(), ParamError>;
}
