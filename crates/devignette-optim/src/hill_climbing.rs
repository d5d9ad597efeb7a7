//! Coordinate-wise hill climbing, flattened into a resumable state machine.
//!
//! The search is made of three nested loops:
//!
//! 1. the active window `start_index..=max_index` grows one parameter at a time, so a
//!    low order fit settles before higher order terms are released;
//! 2. for a given window, sweeps are repeated and the steps shrink whenever a full
//!    sweep brings no improvement, until every active step falls below its final step;
//! 3. a sweep tries `-step` and `+step` on each active parameter in turn.
//!
//! Instead of running the loops to completion, [`HillClimbing::step`] performs a
//! single trial (at most one evaluation) and keeps the loop cursors in the struct.

use std::ops::RangeInclusive;

use log::{debug, trace};

use crate::error::OptimizerError;
use crate::objective::{Objective, Parameterized};
use crate::schedule::StepSchedule;

/// Direction of a trial move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Decrease,
    Increase,
}

impl Direction {
    fn sign(self) -> f32 {
        match self {
            Direction::Decrease => -1.0,
            Direction::Increase => 1.0,
        }
    }
}

/// Identifier of a (parameter, direction) trial; opposite moves have opposite ids.
fn trial_id(index: usize, direction: Direction) -> isize {
    let id = index as isize + 1;
    match direction {
        Direction::Decrease => -id,
        Direction::Increase => id,
    }
}

/// Best move found during the current sweep, committed when the sweep ends.
#[derive(Debug, Clone, Copy)]
struct PendingUpdate {
    index: usize,
    value: f32,
    trial: isize,
}

/// Summary of a finished search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerResult {
    /// Lowest score found.
    pub best_score: f32,
    /// Number of calls to [`HillClimbing::step`] until convergence.
    pub num_steps: usize,
    /// Number of trial evaluations.
    pub num_evaluations: usize,
}

/// Resumable hill climbing minimizer.
///
/// # Example
///
/// ```
/// use devignette_optim::{HillClimbing, Objective, ParamError, Parameterized, StepSchedule};
///
/// struct Parabola(f32);
///
/// impl Objective<f32> for Parabola {
///     fn evaluate(&self, target: &f32) -> f32 {
///         (self.0 - target).powi(2)
///     }
///
///     fn is_valid(&self) -> bool {
///         true
///     }
/// }
///
/// impl Parameterized for Parabola {
///     fn num_params(&self) -> usize {
///         1
///     }
///
///     fn param(&self, index: usize) -> Result<f32, ParamError> {
///         match index {
///             0 => Ok(self.0),
///             _ => Err(ParamError::IndexOutOfRange { index, count: 1 }),
///         }
///     }
///
///     fn set_param(&mut self, index: usize, value: f32) -> Result<(), ParamError> {
///         match index {
///             0 => Ok(self.0 = value),
///             _ => Err(ParamError::IndexOutOfRange { index, count: 1 }),
///         }
///     }
/// }
///
/// let schedule = StepSchedule::new(vec![1.0], vec![0.5], vec![0.25]);
/// let mut optimizer = HillClimbing::new(schedule, Parabola(0.0), &2.0).unwrap();
///
/// while !optimizer.step(&2.0).unwrap() {}
///
/// assert_eq!(optimizer.model().0, 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct HillClimbing<M> {
    schedule: StepSchedule,
    model: M,

    step: Vec<f32>,
    max_index: usize,
    current_index: usize,
    direction: Direction,
    best_score: f32,
    pending: Option<PendingUpdate>,
    last_accepted: Option<isize>,
    done: bool,

    num_steps: usize,
    num_evaluations: usize,
}

impl<M: Parameterized> HillClimbing<M> {
    /// Create the optimizer and score the starting model.
    ///
    /// # Arguments
    ///
    /// * `schedule` - The step sizes and the window of parameters to optimize.
    /// * `model` - The starting model.
    /// * `data` - The data the model is scored against.
    ///
    /// # Errors
    ///
    /// Returns an error if the schedule does not fit the model.
    pub fn new<D>(schedule: StepSchedule, model: M, data: &D) -> Result<Self, OptimizerError>
    where
        D: ?Sized,
        M: Objective<D>,
    {
        schedule.validate(model.num_params())?;

        let mut optimizer = Self {
            step: schedule.initial_step.clone(),
            max_index: schedule.start_index,
            current_index: schedule.start_index,
            schedule,
            model,
            direction: Direction::Decrease,
            best_score: f32::INFINITY,
            pending: None,
            last_accepted: None,
            done: false,
            num_steps: 0,
            num_evaluations: 0,
        };
        optimizer.reset(data);

        Ok(optimizer)
    }

    /// Restart the search from `model`, keeping the schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if the schedule does not fit the model.
    pub fn initialize<D>(&mut self, model: M, data: &D) -> Result<(), OptimizerError>
    where
        D: ?Sized,
        M: Objective<D>,
    {
        self.schedule.validate(model.num_params())?;
        self.model = model;
        self.reset(data);
        Ok(())
    }

    fn reset<D>(&mut self, data: &D)
    where
        D: ?Sized,
        M: Objective<D>,
    {
        self.step.clone_from(&self.schedule.initial_step);
        self.max_index = self.schedule.start_index;
        self.current_index = self.schedule.start_index;
        self.direction = Direction::Decrease;
        self.best_score = self.model.evaluate(data);
        self.pending = None;
        self.last_accepted = None;
        self.done = false;
        self.num_steps = 0;
        self.num_evaluations = 0;
    }

    /// Perform one unit of work: a single trial move of a single parameter.
    ///
    /// When the trial completes a sweep, the best move of the sweep is committed to
    /// the model, or the steps shrink if there was none.
    ///
    /// # Returns
    ///
    /// `true` once the search has converged. Further calls do nothing and keep
    /// returning `true`.
    ///
    /// # Errors
    ///
    /// Returns an error if the model rejects a parameter index.
    pub fn step<D>(&mut self, data: &D) -> Result<bool, OptimizerError>
    where
        D: ?Sized,
        M: Objective<D>,
    {
        if self.done {
            return Ok(true);
        }
        self.num_steps += 1;

        self.trial(data)?;

        if self.direction == Direction::Decrease {
            self.direction = Direction::Increase;
            return Ok(false);
        }
        self.direction = Direction::Decrease;

        self.current_index += 1;
        if self.current_index <= self.max_index {
            return Ok(false);
        }

        // the sweep over the active window is complete
        self.current_index = self.schedule.start_index;

        if let Some(update) = self.pending.take() {
            trace!(
                "accepting parameter {} = {} (score {})",
                update.index,
                update.value,
                self.best_score
            );
            self.model.set_param(update.index, update.value)?;
            self.last_accepted = Some(update.trial);
            return Ok(false);
        }
        self.last_accepted = None;

        if self.shrink_steps() {
            return Ok(false);
        }

        let window = self.active_window();
        self.step[window.clone()].copy_from_slice(&self.schedule.initial_step[window]);

        if self.max_index < self.schedule.end_index {
            self.max_index += 1;
            debug!(
                "active window expanded to {:?}, best score {}",
                self.active_window(),
                self.best_score
            );
            return Ok(false);
        }

        self.done = true;
        debug!(
            "converged after {} steps and {} evaluations, best score {}",
            self.num_steps, self.num_evaluations, self.best_score
        );

        Ok(true)
    }

    /// Run [`HillClimbing::step`] until convergence.
    ///
    /// # Errors
    ///
    /// Returns an error if the model rejects a parameter index.
    pub fn minimize<D>(&mut self, data: &D) -> Result<OptimizerResult, OptimizerError>
    where
        D: ?Sized,
        M: Objective<D>,
    {
        while !self.step(data)? {}
        Ok(self.result())
    }

    fn trial<D>(&mut self, data: &D) -> Result<(), OptimizerError>
    where
        D: ?Sized,
        M: Objective<D>,
    {
        let index = self.current_index;
        let trial = trial_id(index, self.direction);

        // moving back from the last accepted move restores a model already scored
        if self.last_accepted == Some(-trial) {
            trace!("skipping trial {trial}");
            return Ok(());
        }

        let old = self.model.param(index)?;
        let candidate = old + self.direction.sign() * self.step[index];
        self.model.set_param(index, candidate)?;

        if self.model.is_valid() {
            let score = self.model.evaluate(data);
            self.num_evaluations += 1;

            if score < self.best_score {
                trace!("trial {trial}: parameter {index} = {candidate} improves to {score}");
                self.best_score = score;
                self.pending = Some(PendingUpdate {
                    index,
                    value: candidate,
                    trial,
                });
            }
        }

        self.model.set_param(index, old)?;

        Ok(())
    }

    /// Shrink the steps still above their final value; returns whether any is left.
    fn shrink_steps(&mut self) -> bool {
        let mut refining = false;
        for i in self.active_window() {
            if self.step[i] >= self.schedule.final_step[i] {
                self.step[i] *= self.schedule.step_reduction[i];
            }
            refining |= self.step[i] >= self.schedule.final_step[i];
        }

        debug!(
            "no improvement in window {:?}, steps reduced to {:?}",
            self.active_window(),
            &self.step[self.active_window()]
        );

        refining
    }

    /// Get the current model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Consume the optimizer and return the model.
    pub fn into_model(self) -> M {
        self.model
    }

    /// Returns true once the search has converged.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Lowest score found so far.
    ///
    /// It can be lower than the score of [`HillClimbing::model`] while an improvement
    /// waits for the end of its sweep to be committed.
    pub fn best_score(&self) -> f32 {
        self.best_score
    }

    /// Current step of every parameter.
    pub fn steps(&self) -> &[f32] {
        &self.step
    }

    /// The schedule driving the search.
    pub fn schedule(&self) -> &StepSchedule {
        &self.schedule
    }

    /// Parameters currently being optimized.
    pub fn active_window(&self) -> RangeInclusive<usize> {
        self.schedule.start_index..=self.max_index
    }

    /// Number of calls to [`HillClimbing::step`] that performed work.
    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    /// Number of trial evaluations since initialization.
    pub fn num_evaluations(&self) -> usize {
        self.num_evaluations
    }

    /// Summary of the search so far.
    pub fn result(&self) -> OptimizerResult {
        OptimizerResult {
            best_score: self.best_score,
            num_steps: self.num_steps,
            num_evaluations: self.num_evaluations,
        }
    }
}
