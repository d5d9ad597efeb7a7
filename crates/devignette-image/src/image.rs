use crate::error::ImageError;

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use devignette_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// An 8-bit, 3-channel image with the channels stored in B, G, R order.
pub type Bgr8Image = Image<u8, 3>;

/// Represents an image with interleaved pixel data.
///
/// Rows are stored one after another, each row starting `stride` elements after the
/// previous one. The stride may be larger than `width * CHANNELS`, in which case the
/// trailing elements of every row are padding and are never read or written by the
/// pixel accessors.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T, const CHANNELS: usize> {
    size: ImageSize,
    stride: usize,
    data: Vec<T>,
}

impl<T, const CHANNELS: usize> Image<T, CHANNELS>
where
    T: Copy,
{
    /// Create a new tightly packed image from pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `data` - The pixel data of the image.
    ///
    /// # Errors
    ///
    /// If the image is empty or the length of the pixel data does not match the image
    /// size, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use devignette_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 3>::new(
    ///    ImageSize {
    ///       width: 10,
    ///       height: 20,
    ///    },
    ///    vec![0u8; 10 * 20 * 3],
    /// ).unwrap();
    ///
    /// assert_eq!(image.width(), 10);
    /// assert_eq!(image.height(), 20);
    /// assert_eq!(image.stride(), 30);
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        let expected = size.width * size.height * CHANNELS;
        if data.len() != expected {
            return Err(ImageError::InvalidChannelShape(data.len(), expected));
        }

        Self::with_stride(size, size.width * CHANNELS, data)
    }

    /// Create a new image whose rows are `stride` elements apart.
    ///
    /// The buffer must hold `stride * (height - 1) + width * CHANNELS` elements at
    /// least, so the padding after the last row may be omitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the image is empty, if the stride is shorter than a row
    /// or if the buffer is too small.
    pub fn with_stride(size: ImageSize, stride: usize, data: Vec<T>) -> Result<Self, ImageError> {
        if size.width == 0 || size.height == 0 {
            return Err(ImageError::EmptyImage(size.width, size.height));
        }

        let row_len = size.width * CHANNELS;
        if stride < row_len {
            return Err(ImageError::InvalidStride(stride, row_len));
        }

        let required = stride * (size.height - 1) + row_len;
        if data.len() < required {
            return Err(ImageError::InvalidChannelShape(data.len(), required));
        }

        Ok(Self { size, stride, data })
    }

    /// Create a new image with the given size where every element is set to `val`.
    ///
    /// # Examples
    ///
    /// ```
    /// use devignette_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 3>::from_size_val(
    ///   ImageSize {
    ///     width: 10,
    ///     height: 20,
    ///   }, 0u8).unwrap();
    ///
    /// assert_eq!(image.num_channels(), 3);
    /// ```
    pub fn from_size_val(size: ImageSize, val: T) -> Result<Self, ImageError> {
        Self::new(size, vec![val; size.width * size.height * CHANNELS])
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the number of channels in the image.
    pub fn num_channels(&self) -> usize {
        CHANNELS
    }

    /// Get the distance, in elements, between the starts of two consecutive rows.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Get the raw buffer, padding included.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Iterate over the rows of the image, skipping the row padding.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        let row_len = self.size.width * CHANNELS;
        self.data
            .chunks(self.stride)
            .take(self.size.height)
            .map(move |row| &row[..row_len])
    }

    /// Iterate mutably over the rows of the image, skipping the row padding.
    pub fn iter_rows_mut(&mut self) -> impl Iterator<Item = &mut [T]> + '_ {
        let row_len = self.size.width * CHANNELS;
        self.data
            .chunks_mut(self.stride)
            .take(self.size.height)
            .map(move |row| &mut row[..row_len])
    }

    fn offset(&self, x: usize, y: usize, ch: usize) -> Result<usize, ImageError> {
        if x >= self.size.width || y >= self.size.height || ch >= CHANNELS {
            return Err(ImageError::PixelOutOfBounds(x, y, ch));
        }
        Ok(y * self.stride + x * CHANNELS + ch)
    }

    /// Get the value of a pixel channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinates are outside of the image.
    pub fn get_pixel(&self, x: usize, y: usize, ch: usize) -> Result<T, ImageError> {
        let idx = self.offset(x, y, ch)?;
        Ok(self.data[idx])
    }

    /// Set the value of a pixel channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinates are outside of the image.
    pub fn set_pixel(&mut self, x: usize, y: usize, ch: usize, val: T) -> Result<(), ImageError> {
        let idx = self.offset(x, y, ch)?;
        self.data[idx] = val;
        Ok(())
    }
}
