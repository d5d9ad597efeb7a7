use approx::assert_abs_diff_eq;
use devignette::image::{Bgr8Image, ImageError, ImageSize};
use devignette::imgproc::vignetting::RadialGain;
use devignette::{devignette, Devignetting, DevignettingConfig, DevignettingError};

const SIZE: ImageSize = ImageSize {
    width: 48,
    height: 36,
};

/// Darken `pattern` towards the corners by the inverse of `truth`, as a lens with that
/// vignetting would record it.
fn vignetted(
    truth: &RadialGain,
    pattern: impl Fn(usize, usize) -> f32,
) -> Result<Bgr8Image, ImageError> {
    let mut image = Bgr8Image::from_size_val(SIZE, 0)?;
    for y in 0..SIZE.height {
        for x in 0..SIZE.width {
            let v = (pattern(x, y) / truth.gain_at(x, y, SIZE)) as u8;
            for ch in 0..3 {
                image.set_pixel(x, y, ch, v)?;
            }
        }
    }
    Ok(image)
}

/// Gray checkerboard with 4 pixel squares, vignetted by `truth`.
fn vignetted_checkerboard(truth: &RadialGain) -> Result<Bgr8Image, ImageError> {
    vignetted(truth, |x, y| if (x / 4 + y / 4) % 2 == 0 { 100.0 } else { 160.0 })
}

#[test]
fn flat_image_is_left_unchanged() -> Result<(), DevignettingError> {
    let original = Bgr8Image::from_size_val(SIZE, 128)?;
    let mut image = original.clone();

    let mut devignetting = Devignetting::new(&image, DevignettingConfig::default())?;
    devignetting.run(&mut image)?;

    assert!(devignetting.is_done());
    assert_eq!(devignetting.best_score(), 0.0);
    assert_eq!(*devignetting.model(), RadialGain::EMPTY);
    assert_eq!(image.as_slice(), original.as_slice());

    Ok(())
}

#[test]
fn recovers_vignetting() -> Result<(), DevignettingError> {
    let truth = RadialGain::new(0.3, 0.1, 0.0);
    let mut image = vignetted_checkerboard(&truth)?;
    let initial_entropy = RadialGain::EMPTY.evaluate(&image);

    let model = devignette(&mut image, false)?;

    assert!(model.is_valid());
    assert_eq!((model.delta_x, model.delta_y), (0.0, 0.0));
    for t in [0.25, 0.5, 1.0] {
        assert_abs_diff_eq!(model.gain(t), truth.gain(t), epsilon = 0.1);
    }
    // the quartic term is absorbed by a steeper quadratic one
    assert_abs_diff_eq!(model.a, 0.4004, epsilon = 1.0 / 64.0);
    assert_abs_diff_eq!(model.b, 0.0, epsilon = 1.0 / 64.0);
    assert_abs_diff_eq!(model.c, 0.0, epsilon = 1.0 / 64.0);

    // the corrected image has a lower entropy than the vignetted one
    assert!(RadialGain::EMPTY.evaluate(&image) < initial_entropy);

    Ok(())
}

#[test]
fn flat_gray_round_trip() -> Result<(), DevignettingError> {
    let truth = RadialGain::new(0.3, 0.1, 0.0);
    let frame = vignetted(&truth, |_, _| 128.0)?;

    let mut image = frame.clone();
    let mut devignetting = Devignetting::with_center_optimization(&image, false)?;
    let initial_entropy = devignetting.best_score();
    devignetting.run(&mut image)?;

    let model = *devignetting.model();
    assert!(model.is_valid());
    assert_eq!((model.delta_x, model.delta_y), (0.0, 0.0));

    // every corrected luminance falls in a single histogram bin
    assert!(initial_entropy > 2.0);
    assert_eq!(devignetting.best_score(), 0.0);
    assert!(RadialGain::EMPTY.evaluate(&image) < initial_entropy);

    // the 8-bit rounding of the vignetted image spreads the exact inverse over two
    // bins, so the search settles on a steeper single-term gain instead
    assert!(truth.evaluate(&frame) > devignetting.best_score());
    assert_abs_diff_eq!(model.a, 0.46875, epsilon = 1.0 / 64.0);
    assert_abs_diff_eq!(model.b, 0.0, epsilon = 1.0 / 64.0);
    assert_abs_diff_eq!(model.c, 0.0, epsilon = 1.0 / 64.0);
    for t in [0.25, 0.5, 1.0] {
        assert_abs_diff_eq!(model.gain(t), truth.gain(t), epsilon = 0.1);
    }

    Ok(())
}

#[test]
fn stepwise_entropy_never_increases() -> Result<(), DevignettingError> {
    let truth = RadialGain::new(0.3, 0.1, 0.0);
    let frame = vignetted_checkerboard(&truth)?;

    let mut devignetting = Devignetting::new(&frame, DevignettingConfig::default())?;
    let initial_score = devignetting.best_score();

    let mut scores = vec![initial_score];
    let mut done = false;
    while !done {
        let mut corrected = frame.clone();
        done = devignetting.step(&mut corrected)?;
        scores.push(devignetting.best_score());
        assert!(devignetting.num_steps() < 2000, "no convergence");
    }

    assert!(scores.windows(2).all(|w| w[1] <= w[0]));
    assert!(devignetting.best_score() < initial_score);

    // once converged, stepping does nothing
    let steps = devignetting.num_steps();
    let mut corrected = frame.clone();
    assert!(devignetting.step(&mut corrected)?);
    assert_eq!(devignetting.num_steps(), steps);

    Ok(())
}

#[test]
fn step_corrects_the_frame() -> Result<(), DevignettingError> {
    let truth = RadialGain::new(0.3, 0.1, 0.0);
    let frame = vignetted_checkerboard(&truth)?;

    let mut devignetting = Devignetting::new(&frame, DevignettingConfig::default())?;

    let mut done = false;
    while !done {
        let mut corrected = frame.clone();
        done = devignetting.step(&mut corrected)?;

        let mut expected = frame.clone();
        devignetting.model().apply(&mut expected);
        assert_eq!(corrected.as_slice(), expected.as_slice());
    }

    // the converged model is not the identity, so the corners got brighter
    assert!(devignetting.model().gain(1.0) > 1.0);
    let mut corrected = frame.clone();
    devignetting.apply(&mut corrected)?;
    assert!(corrected.get_pixel(0, 0, 0)? > frame.get_pixel(0, 0, 0)?);

    Ok(())
}

#[test]
fn fixed_center_converges_faster() -> Result<(), DevignettingError> {
    let truth = RadialGain::new(0.3, 0.1, 0.0);
    let frame = vignetted_checkerboard(&truth)?;

    let mut with_center = Devignetting::with_center_optimization(&frame, true)?;
    with_center.run(&mut frame.clone())?;

    let mut fixed_center = Devignetting::with_center_optimization(&frame, false)?;
    fixed_center.run(&mut frame.clone())?;

    assert!(fixed_center.num_steps() < with_center.num_steps());
    assert_eq!(fixed_center.optimizer().active_window(), 0..=2);
    assert_eq!(with_center.optimizer().active_window(), 0..=4);

    Ok(())
}

#[test]
fn devignette_matches_run() -> Result<(), DevignettingError> {
    let truth = RadialGain::new(0.3, 0.1, 0.0);
    let frame = vignetted_checkerboard(&truth)?;

    let mut image = frame.clone();
    let model = devignette(&mut image, false)?;

    let mut other = frame.clone();
    let mut devignetting = Devignetting::with_center_optimization(&frame, false)?;
    devignetting.run(&mut other)?;

    assert_eq!(model, *devignetting.model());
    assert_eq!(image.as_slice(), other.as_slice());

    Ok(())
}

#[test]
fn frame_size_mismatch() -> Result<(), DevignettingError> {
    let frame = Bgr8Image::from_size_val(SIZE, 80)?;
    let mut devignetting = Devignetting::new(&frame, DevignettingConfig::default())?;

    let mut smaller = Bgr8Image::from_size_val(
        ImageSize {
            width: 24,
            height: 36,
        },
        80,
    )?;

    let res = devignetting.step(&mut smaller);
    assert!(matches!(
        res,
        Err(DevignettingError::ImageError(ImageError::InvalidImageSize(
            48, 36, 24, 36
        )))
    ));
    assert!(devignetting.apply(&mut smaller).is_err());
    assert!(devignetting.run(&mut smaller).is_err());

    // nothing was done
    assert_eq!(devignetting.num_steps(), 0);
    assert_eq!(smaller.get_pixel(0, 0, 0)?, 80);

    Ok(())
}
