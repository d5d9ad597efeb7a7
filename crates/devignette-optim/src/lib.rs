#![deny(missing_docs)]
//! Resumable hill-climbing search for small indexed parameter models.
//!
//! The optimizer advances by one bounded step per call so the search can be
//! interleaved with other work, e.g. grabbing the next frame of a video.

/// Error types for the optimizer.
pub mod error;

/// coordinate-wise hill climbing with incremental parameter windows.
pub mod hill_climbing;

/// Traits implemented by the models being optimized.
pub mod objective;

/// per-parameter step size schedules.
pub mod schedule;

pub use crate::error::{OptimizerError, ParamError};
pub use crate::hill_climbing::{HillClimbing, OptimizerResult};
pub use crate::objective::{Objective, Parameterized};
pub use crate::schedule::StepSchedule;
