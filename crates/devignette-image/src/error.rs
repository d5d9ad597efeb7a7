/// An error type for the image module.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// Error when the image has no pixels.
    #[error("Image size ({0}x{1}) must be non-zero")]
    EmptyImage(usize, usize),

    /// Error when two images are expected to have the same size.
    #[error("Image size mismatch ({0}x{1}) vs ({2}x{3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when the row stride cannot hold a full row of pixels.
    #[error("Row stride ({0}) is smaller than the row length ({1})")]
    InvalidStride(usize, usize),

    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when a pixel coordinate is outside of the image.
    #[error("Pixel (x: {0}, y: {1}, channel: {2}) is out of bounds")]
    PixelOutOfBounds(usize, usize, usize),
}
