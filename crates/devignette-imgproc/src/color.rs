/// Define the RGB weights for the luminance computation (ITU-R BT.709).
const RW: f32 = 0.2126;
const GW: f32 = 0.7152;
const BW: f32 = 0.0722;

/// Compute the luminance of a BGR pixel using the formula:
///
/// Y = 0.2126 * R + 0.7152 * G + 0.0722 * B
///
/// # Arguments
///
/// * `pixel` - The pixel channels in B, G, R order.
///
/// Precondition: the pixel must have at least 3 channels.
///
/// # Example
///
/// ```
/// use devignette_imgproc::color::luminance_bgr;
///
/// assert_eq!(luminance_bgr(&[0, 0, 0]), 0.0);
/// assert!((luminance_bgr(&[0, 0, 100]) - 21.26).abs() < 1e-4);
/// ```
#[inline]
pub fn luminance_bgr(pixel: &[u8]) -> f32 {
    let b = pixel[0] as f32;
    let g = pixel[1] as f32;
    let r = pixel[2] as f32;
    RW * r + GW * g + BW * b
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    #[test]
    fn test_luminance_bgr() {
        assert_relative_eq!(super::luminance_bgr(&[255, 255, 255]), 255.0, epsilon = 1e-3);
        assert_relative_eq!(super::luminance_bgr(&[0, 100, 0]), 71.52, epsilon = 1e-4);
        assert_relative_eq!(super::luminance_bgr(&[100, 0, 0]), 7.22, epsilon = 1e-4);
    }
}
