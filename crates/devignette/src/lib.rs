#![deny(missing_docs)]
//! Vignetting correction by minimization of the log-intensity entropy.
//!
//! [`Devignetting`] fits a radial gain to an image with a resumable hill climbing
//! search. For a single image, [`Devignetting::run`] (or [`devignette`]) corrects it
//! in one go. For a video stream, [`Devignetting::step`] advances the search by a
//! bounded amount of work per frame and corrects every frame with the best model
//! found so far.

mod devignetting;

/// Error types for the corrector.
pub mod error;

pub use crate::devignetting::{devignette, schedule_for_image, Devignetting, DevignettingConfig};
pub use crate::error::DevignettingError;

#[doc(inline)]
pub use devignette_image as image;

#[doc(inline)]
pub use devignette_imgproc as imgproc;

#[doc(inline)]
pub use devignette_optim as optim;
