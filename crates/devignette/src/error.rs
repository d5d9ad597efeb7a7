use devignette_image::ImageError;
use devignette_optim::OptimizerError;

/// Errors that can occur while correcting vignetting.
#[derive(Debug, thiserror::Error)]
pub enum DevignettingError {
    /// Error related to the image.
    #[error(transparent)]
    ImageError(#[from] ImageError),

    /// Error raised by the optimizer.
    #[error(transparent)]
    OptimizerError(#[from] OptimizerError),
}
