#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color to luminance conversion module.
pub mod color;

/// log-intensity histogram and entropy module.
pub mod histogram;

/// radial vignetting gain model.
pub mod vignetting;
