use devignette_image::{Bgr8Image, ImageError, ImageSize};
use devignette_imgproc::vignetting::RadialGain;
use devignette_optim::{HillClimbing, StepSchedule};

use crate::error::DevignettingError;

/// Configuration of the vignetting correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevignettingConfig {
    /// Estimate the vignetting center as well as the gain polynomial.
    ///
    /// Disabling it keeps the center in the middle of the image and converges in
    /// significantly fewer steps, which suits live video.
    pub optimize_center: bool,
}

impl Default for DevignettingConfig {
    fn default() -> Self {
        Self {
            optimize_center: true,
        }
    }
}

/// Step schedule used to fit a [`RadialGain`] to an image of the given size.
///
/// The polynomial coefficients start with a step of 5 and are refined down to 1/256,
/// the center offsets start with a quarter of the image size and are refined down to
/// one pixel. When `optimize_center` is false the offsets are left out of the search.
pub fn schedule_for_image(size: ImageSize, optimize_center: bool) -> StepSchedule {
    let initial_step = vec![
        5.0,
        5.0,
        5.0,
        (size.width / 4).max(1) as f32,
        (size.height / 4).max(1) as f32,
    ];
    let step_reduction = vec![0.5; RadialGain::PARAMETER_COUNT];
    let final_step = vec![1.0 / 256.0, 1.0 / 256.0, 1.0 / 256.0, 1.0, 1.0];

    let mut end_index = RadialGain::PARAMETER_COUNT - 1;
    if !optimize_center {
        // delta_x, delta_y
        end_index -= 2;
    }

    StepSchedule::new(initial_step, step_reduction, final_step).with_window(0, end_index)
}

/// Incremental vignetting correction.
///
/// The corrector is bound to the size of the image it was created with; every frame
/// passed to it afterwards must have the same size.
///
/// # Example
///
/// ```
/// use devignette::{Devignetting, DevignettingConfig};
/// use devignette::image::{Image, ImageSize};
///
/// let size = ImageSize { width: 32, height: 24 };
/// let frame = Image::<u8, 3>::from_size_val(size, 90).unwrap();
///
/// let mut devignetting = Devignetting::new(&frame, DevignettingConfig::default()).unwrap();
///
/// // correct every incoming frame while the estimation progresses
/// let mut done = false;
/// while !done {
///     let mut corrected = frame.clone();
///     done = devignetting.step(&mut corrected).unwrap();
/// }
///
/// assert!(devignetting.is_done());
/// ```
#[derive(Debug, Clone)]
pub struct Devignetting {
    optimizer: HillClimbing<RadialGain>,
    size: ImageSize,
}

impl Devignetting {
    /// Create the corrector and score the uncorrected image.
    ///
    /// # Arguments
    ///
    /// * `image` - The first image or frame to correct.
    /// * `config` - The correction configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the optimizer cannot be set up for the image.
    pub fn new(image: &Bgr8Image, config: DevignettingConfig) -> Result<Self, DevignettingError> {
        let size = image.size();
        let schedule = schedule_for_image(size, config.optimize_center);
        let optimizer = HillClimbing::new(schedule, RadialGain::EMPTY, image)?;

        log::debug!(
            "devignetting {} (optimize center: {}), initial entropy {}",
            size,
            config.optimize_center,
            optimizer.best_score()
        );

        Ok(Self { optimizer, size })
    }

    /// Create the corrector, choosing whether the vignetting center is estimated.
    ///
    /// # Errors
    ///
    /// Returns an error if the optimizer cannot be set up for the image.
    pub fn with_center_optimization(
        image: &Bgr8Image,
        optimize_center: bool,
    ) -> Result<Self, DevignettingError> {
        Self::new(image, DevignettingConfig { optimize_center })
    }

    fn check_size(&self, image: &Bgr8Image) -> Result<(), DevignettingError> {
        if image.size() != self.size {
            return Err(ImageError::InvalidImageSize(
                self.size.width,
                self.size.height,
                image.width(),
                image.height(),
            )
            .into());
        }
        Ok(())
    }

    /// Advance the estimation by one step on `image`, then correct `image` in place
    /// with the best model found so far.
    ///
    /// The image is expected to be uncorrected: pass each new frame, or a fresh copy
    /// of the original image, on every call.
    ///
    /// # Returns
    ///
    /// `true` once the estimation has converged. The frame is corrected either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the image size differs from the one the corrector was
    /// created with.
    pub fn step(&mut self, image: &mut Bgr8Image) -> Result<bool, DevignettingError> {
        self.check_size(image)?;

        let done = self.optimizer.step(&*image)?;
        self.optimizer.model().apply(image);

        Ok(done)
    }

    /// Run the estimation to convergence on `image`, then correct it in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the image size differs from the one the corrector was
    /// created with.
    pub fn run(&mut self, image: &mut Bgr8Image) -> Result<(), DevignettingError> {
        self.check_size(image)?;

        let result = self.optimizer.minimize(&*image)?;
        log::debug!(
            "devignetting converged in {} steps ({} evaluations), entropy {}, {:?}",
            result.num_steps,
            result.num_evaluations,
            result.best_score,
            self.model()
        );

        self.optimizer.model().apply(image);

        Ok(())
    }

    /// Correct `image` in place with the current model, without advancing the
    /// estimation. Use it to correct the rest of a video once converged.
    ///
    /// # Errors
    ///
    /// Returns an error if the image size differs from the one the corrector was
    /// created with.
    pub fn apply(&self, image: &mut Bgr8Image) -> Result<(), DevignettingError> {
        self.check_size(image)?;
        self.optimizer.model().apply(image);
        Ok(())
    }

    /// The best gain model found so far.
    pub fn model(&self) -> &RadialGain {
        self.optimizer.model()
    }

    /// Returns true once the estimation has converged.
    pub fn is_done(&self) -> bool {
        self.optimizer.is_done()
    }

    /// Lowest entropy found so far.
    pub fn best_score(&self) -> f32 {
        self.optimizer.best_score()
    }

    /// Number of estimation steps performed.
    pub fn num_steps(&self) -> usize {
        self.optimizer.num_steps()
    }

    /// The underlying optimizer.
    pub fn optimizer(&self) -> &HillClimbing<RadialGain> {
        &self.optimizer
    }
}

/// Estimate and correct the vignetting of a single image in place.
///
/// # Arguments
///
/// * `image` - The image to correct.
/// * `optimize_center` - Estimate the vignetting center as well. Disable it for a
///   much faster correction.
///
/// # Returns
///
/// The estimated gain model.
///
/// # Errors
///
/// Returns an error if the optimizer cannot be set up for the image.
pub fn devignette(
    image: &mut Bgr8Image,
    optimize_center: bool,
) -> Result<RadialGain, DevignettingError> {
    let mut devignetting = Devignetting::with_center_optimization(image, optimize_center)?;
    devignetting.run(image)?;
    Ok(*devignetting.model())
}

#[cfg(test)]
mod tests {
    use devignette_image::{Bgr8Image, ImageSize};

    use super::{schedule_for_image, Devignetting, DevignettingConfig};
    use crate::DevignettingError;

    #[test]
    fn test_default_config() {
        assert!(DevignettingConfig::default().optimize_center);
    }

    #[test]
    fn test_schedule_for_image() {
        let size = ImageSize {
            width: 640,
            height: 480,
        };

        let schedule = schedule_for_image(size, true);
        assert_eq!(schedule.initial_step, vec![5.0, 5.0, 5.0, 160.0, 120.0]);
        assert_eq!(schedule.step_reduction, vec![0.5; 5]);
        assert_eq!(schedule.final_step[0], 1.0 / 256.0);
        assert_eq!(schedule.final_step[4], 1.0);
        assert_eq!((schedule.start_index, schedule.end_index), (0, 4));
        assert!(schedule.validate(5).is_ok());

        let schedule = schedule_for_image(size, false);
        assert_eq!((schedule.start_index, schedule.end_index), (0, 2));
    }

    #[test]
    fn test_schedule_for_tiny_image() {
        let size = ImageSize {
            width: 3,
            height: 1,
        };
        let schedule = schedule_for_image(size, true);
        assert_eq!(&schedule.initial_step[3..], &[1.0, 1.0]);
        assert!(schedule.validate(5).is_ok());
    }

    #[test]
    fn test_corrector_schedule() -> Result<(), DevignettingError> {
        let size = ImageSize {
            width: 40,
            height: 30,
        };
        let frame = Bgr8Image::from_size_val(size, 60)?;

        let devignetting = Devignetting::with_center_optimization(&frame, false)?;
        let schedule = devignetting.optimizer().schedule();

        assert_eq!(schedule, &schedule_for_image(size, false));
        assert_eq!(schedule.initial_step[3..], [10.0, 7.0]);
        assert_eq!(devignetting.optimizer().steps(), &schedule.initial_step[..]);
        Ok(())
    }
}
