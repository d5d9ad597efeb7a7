#![deny(missing_docs)]
//! Image types for in-place pixel correction

/// image representation with an explicit row stride.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{Bgr8Image, Image, ImageSize};
