//! Radial polynomial model of the vignetting correction.
//!
//! The correction multiplies every pixel by
//!
//! ```text
//! g(r) = 1 + a * r^2 + b * r^4 + c * r^6
//! ```
//!
//! where `r` is the distance to the (optionally shifted) image center, normalized so
//! that the image corners are at `r = 1`. The parameters are estimated by minimizing
//! the entropy of the log-luminance histogram of the corrected image.
//!
//! See T. Rohlfing, "Single-Image Vignetting Correction by Constrained Minimization
//! of log-Intensity Entropy".

use devignette_image::{Image, ImageSize};
use devignette_optim::{Objective, ParamError, Parameterized};

use crate::color::luminance_bgr;
use crate::histogram::LogHistogram;

/// Vignetting correction gain, `1 + a * r^2 + b * r^4 + c * r^6`.
///
/// The parameters are exposed to the optimizer in the order `a, b, c, delta_x,
/// delta_y`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RadialGain {
    /// Coefficient of `r^2`.
    pub a: f32,
    /// Coefficient of `r^4`.
    pub b: f32,
    /// Coefficient of `r^6`.
    pub c: f32,
    /// Horizontal offset of the vignetting center from the image center, in pixels.
    pub delta_x: f32,
    /// Vertical offset of the vignetting center from the image center, in pixels.
    pub delta_y: f32,
}

impl RadialGain {
    /// Number of optimizable parameters.
    pub const PARAMETER_COUNT: usize = 5;

    /// The identity correction.
    pub const EMPTY: RadialGain = RadialGain {
        a: 0.0,
        b: 0.0,
        c: 0.0,
        delta_x: 0.0,
        delta_y: 0.0,
    };

    /// Largest gain an admissible model may apply, reached at the image corners.
    pub const MAX_BRIGHTNESS_MULTIPLICATION: f32 = 3.0;

    /// Create a gain centered on the image.
    pub fn new(a: f32, b: f32, c: f32) -> Self {
        Self {
            a,
            b,
            c,
            ..Self::EMPTY
        }
    }

    /// Shift the vignetting center by `(delta_x, delta_y)` pixels.
    pub fn with_offset(self, delta_x: f32, delta_y: f32) -> Self {
        Self {
            delta_x,
            delta_y,
            ..self
        }
    }

    /// Evaluate the gain polynomial at the normalized squared radius `r2`.
    #[inline]
    pub fn gain(&self, r2: f32) -> f32 {
        1.0 + r2 * (self.a + r2 * (self.b + r2 * self.c))
    }

    /// Center of the vignetting for an image of the given size.
    pub fn center(&self, size: ImageSize) -> (f32, f32) {
        (
            (size.width / 2) as f32 + self.delta_x,
            (size.height / 2) as f32 + self.delta_y,
        )
    }

    /// Gain applied to the pixel `(x, y)` of an image of the given size.
    pub fn gain_at(&self, x: usize, y: usize, size: ImageSize) -> f32 {
        let grid = RadialGrid::new(self, size);
        self.gain(grid.r2(x as f32, grid.dy2(y as f32)))
    }

    /// Check that the gain is admissible.
    ///
    /// The gain must not exceed [`RadialGain::MAX_BRIGHTNESS_MULTIPLICATION`] at the
    /// corners and must be monotonically non-decreasing in `r^2` on `[0, 1]`, i.e. the
    /// derivative `a + 2bt + 3ct^2` must stay non-negative for `t` in `[0, 1]`.
    pub fn is_valid(&self) -> bool {
        let (a, b, c) = (self.a, self.b, self.c);

        // the radius is at most 1
        if 1.0 + a + b + c > Self::MAX_BRIGHTNESS_MULTIPLICATION {
            return false;
        }

        if c == 0.0 {
            return a >= 0.0 && a + 2.0 * b >= 0.0;
        }

        let d = 4.0 * b * b - 12.0 * a * c;
        if d < 0.0 {
            // no real root: the derivative has the sign of c everywhere
            return c > 0.0;
        }

        let sqrt_d = d.sqrt();
        let q0 = (-2.0 * b - sqrt_d) / (6.0 * c);
        let q1 = (-2.0 * b + sqrt_d) / (6.0 * c);
        let (lo, hi) = if q0 <= q1 { (q0, q1) } else { (q1, q0) };

        if c < 0.0 {
            // positive between the roots only
            lo <= 0.0 && hi >= 1.0
        } else {
            // positive outside of the roots only
            hi <= 0.0 || lo >= 1.0
        }
    }

    /// Correct the image in place.
    ///
    /// Every channel is multiplied by the gain of its pixel and saturated to
    /// `[0, 255]`. The row padding is left untouched.
    ///
    /// # Example
    ///
    /// ```
    /// use devignette_image::{Image, ImageSize};
    /// use devignette_imgproc::vignetting::RadialGain;
    ///
    /// let size = ImageSize { width: 4, height: 4 };
    /// let mut image = Image::<u8, 3>::from_size_val(size, 100).unwrap();
    ///
    /// RadialGain::new(1.0, 0.0, 0.0).apply(&mut image);
    ///
    /// assert_eq!(image.get_pixel(2, 2, 0).unwrap(), 100);
    /// assert_eq!(image.get_pixel(0, 0, 0).unwrap(), 200);
    /// ```
    pub fn apply(&self, image: &mut Image<u8, 3>) {
        let grid = RadialGrid::new(self, image.size());

        for (y, row) in image.iter_rows_mut().enumerate() {
            let dy2 = grid.dy2(y as f32);
            for (x, pixel) in row.chunks_exact_mut(3).enumerate() {
                let gain = self.gain(grid.r2(x as f32, dy2));
                for ch in pixel.iter_mut() {
                    *ch = (*ch as f32 * gain).clamp(0.0, 255.0) as u8;
                }
            }
        }
    }

    /// Score the correction of an image: the entropy of the log-luminance histogram
    /// of the corrected image. Lower is better.
    ///
    /// The image is not modified.
    pub fn evaluate(&self, image: &Image<u8, 3>) -> f32 {
        let grid = RadialGrid::new(self, image.size());
        let mut histogram = LogHistogram::new(Self::MAX_BRIGHTNESS_MULTIPLICATION);

        for (y, row) in image.iter_rows().enumerate() {
            let dy2 = grid.dy2(y as f32);
            for (x, pixel) in row.chunks_exact(3).enumerate() {
                let gain = self.gain(grid.r2(x as f32, dy2));
                // truncates, negative values saturate to zero
                let corrected = (gain * luminance_bgr(pixel)) as u32;
                histogram.add(corrected);
            }
        }

        histogram.entropy()
    }
}

/// Precomputed geometry to evaluate normalized squared radii over an image.
struct RadialGrid {
    cx: f32,
    cy: f32,
    inv_norm: f32,
}

impl RadialGrid {
    fn new(gain: &RadialGain, size: ImageSize) -> Self {
        let (cx, cy) = gain.center(size);
        // a center at the origin would leave nothing to normalize with
        let norm = (cx * cx + cy * cy).max(1.0);
        Self {
            cx,
            cy,
            inv_norm: 1.0 / norm,
        }
    }

    #[inline]
    fn dy2(&self, y: f32) -> f32 {
        (y - self.cy) * (y - self.cy)
    }

    #[inline]
    fn r2(&self, x: f32, dy2: f32) -> f32 {
        ((x - self.cx) * (x - self.cx) + dy2) * self.inv_norm
    }
}

impl Objective<Image<u8, 3>> for RadialGain {
    fn evaluate(&self, image: &Image<u8, 3>) -> f32 {
        RadialGain::evaluate(self, image)
    }

    fn is_valid(&self) -> bool {
        RadialGain::is_valid(self)
    }
}

impl Parameterized for RadialGain {
    fn num_params(&self) -> usize {
        Self::PARAMETER_COUNT
    }

    fn param(&self, index: usize) -> Result<f32, ParamError> {
        match index {
            0 => Ok(self.a),
            1 => Ok(self.b),
            2 => Ok(self.c),
            3 => Ok(self.delta_x),
            4 => Ok(self.delta_y),
            _ => Err(ParamError::IndexOutOfRange {
                index,
                count: Self::PARAMETER_COUNT,
            }),
        }
    }

    fn set_param(&mut self, index: usize, value: f32) -> Result<(), ParamError> {
        let param = match index {
            0 => &mut self.a,
            1 => &mut self.b,
            2 => &mut self.c,
            3 => &mut self.delta_x,
            4 => &mut self.delta_y,
            _ => {
                return Err(ParamError::IndexOutOfRange {
                    index,
                    count: Self::PARAMETER_COUNT,
                })
            }
        };
        *param = value;
        Ok(())
    }
}
