use crate::error::OptimizerError;

/// Per-parameter step sizes driving the hill climbing search.
///
/// Parameter `i` is first perturbed by `initial_step[i]`. Every time a sweep over the
/// active parameters brings no improvement the step is multiplied by
/// `step_reduction[i]`, until it falls below `final_step[i]`.
///
/// Only the parameters in `start_index..=end_index` are optimized; the others keep
/// their initial value.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSchedule {
    /// Step each parameter starts with.
    pub initial_step: Vec<f32>,
    /// Factor in `(0, 1)` applied to a step when a sweep stagnates.
    pub step_reduction: Vec<f32>,
    /// Precision at which a parameter is considered converged.
    pub final_step: Vec<f32>,
    /// First optimized parameter.
    pub start_index: usize,
    /// Last optimized parameter, inclusive.
    pub end_index: usize,
}

impl StepSchedule {
    /// Create a schedule optimizing every parameter.
    ///
    /// # Example
    ///
    /// ```
    /// use devignette_optim::StepSchedule;
    ///
    /// let schedule = StepSchedule::new(vec![1.0, 2.0], vec![0.5, 0.5], vec![0.1, 0.1]);
    /// assert_eq!(schedule.start_index, 0);
    /// assert_eq!(schedule.end_index, 1);
    /// assert!(schedule.validate(2).is_ok());
    /// ```
    pub fn new(initial_step: Vec<f32>, step_reduction: Vec<f32>, final_step: Vec<f32>) -> Self {
        let end_index = initial_step.len().saturating_sub(1);
        Self {
            initial_step,
            step_reduction,
            final_step,
            start_index: 0,
            end_index,
        }
    }

    /// Restrict the optimization to the parameters `start_index..=end_index`.
    pub fn with_window(mut self, start_index: usize, end_index: usize) -> Self {
        self.start_index = start_index;
        self.end_index = end_index;
        self
    }

    /// Number of parameters covered by the schedule.
    pub fn num_params(&self) -> usize {
        self.initial_step.len()
    }

    /// Check that the schedule can drive a model with `num_params` parameters to
    /// convergence.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizerError::InvalidSchedule`] if the step vectors do not match the
    /// parameter count, if the optimized window is empty or out of range, or if a
    /// step, reduction or final step would prevent the search from terminating.
    pub fn validate(&self, num_params: usize) -> Result<(), OptimizerError> {
        if self.initial_step.len() != num_params
            || self.step_reduction.len() != num_params
            || self.final_step.len() != num_params
        {
            return Err(OptimizerError::InvalidSchedule(format!(
                "expected {} steps per schedule, got {}/{}/{}",
                num_params,
                self.initial_step.len(),
                self.step_reduction.len(),
                self.final_step.len()
            )));
        }

        if self.start_index > self.end_index || self.end_index >= num_params {
            return Err(OptimizerError::InvalidSchedule(format!(
                "parameter window {}..={} is not within 0..{}",
                self.start_index, self.end_index, num_params
            )));
        }

        for i in 0..num_params {
            let (initial, reduction, last) = (
                self.initial_step[i],
                self.step_reduction[i],
                self.final_step[i],
            );

            if !(initial.is_finite() && initial > 0.0) {
                return Err(OptimizerError::InvalidSchedule(format!(
                    "initial step of parameter {i} must be positive, got {initial}"
                )));
            }
            if !(reduction > 0.0 && reduction < 1.0) {
                return Err(OptimizerError::InvalidSchedule(format!(
                    "step reduction of parameter {i} must be in (0, 1), got {reduction}"
                )));
            }
            if !(last.is_finite() && last > 0.0) {
                return Err(OptimizerError::InvalidSchedule(format!(
                    "final step of parameter {i} must be positive, got {last}"
                )));
            }
        }

        Ok(())
    }
}
