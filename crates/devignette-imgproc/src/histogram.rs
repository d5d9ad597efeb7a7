/// Number of bins of a [`LogHistogram`].
pub const NUM_BINS: usize = 256;

const LOG2_NUM_BINS: f32 = 8.0;

/// Histogram of log intensities.
///
/// An intensity `v` falls in bin `scale * log2(v + 1)`, where the scale is chosen so
/// that `255 * max_gain` still lands inside the histogram. Log bins make the entropy
/// of a vignetted image independent of the overall exposure.
///
/// # Example
///
/// ```
/// use devignette_imgproc::histogram::LogHistogram;
///
/// let mut hist = LogHistogram::new(3.0);
/// hist.add(0);
/// hist.add(255);
///
/// assert_eq!(hist.bin_index(255), 88);
/// assert_eq!(hist.total(), 2);
/// assert_eq!(hist.entropy(), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct LogHistogram {
    bins: [u32; NUM_BINS],
    scale: f32,
}

impl LogHistogram {
    /// Create an empty histogram for intensities up to `255 * max_gain`.
    pub fn new(max_gain: f32) -> Self {
        let scale = ((NUM_BINS - 1) as f32 / LOG2_NUM_BINS / max_gain + 1.0).trunc();
        Self {
            bins: [0; NUM_BINS],
            scale,
        }
    }

    /// Bin of the given intensity.
    ///
    /// Intensities above `255 * max_gain` are clamped into the last bin.
    #[inline]
    pub fn bin_index(&self, intensity: u32) -> usize {
        let idx = (self.scale * ((intensity as f32) + 1.0).log2()) as usize;
        idx.min(NUM_BINS - 1)
    }

    /// Count one more sample of the given intensity.
    #[inline]
    pub fn add(&mut self, intensity: u32) {
        let idx = self.bin_index(intensity);
        self.bins[idx] += 1;
    }

    /// The bin counts.
    pub fn bins(&self) -> &[u32] {
        &self.bins
    }

    /// Number of samples in the histogram.
    pub fn total(&self) -> u64 {
        self.bins.iter().map(|&c| c as u64).sum()
    }

    /// Shannon entropy of the histogram, in bits.
    pub fn entropy(&self) -> f32 {
        compute_entropy(&self.bins)
    }
}

/// Compute the Shannon entropy, in bits, of a histogram.
///
/// Empty bins do not contribute. An empty histogram has zero entropy.
///
/// # Arguments
///
/// * `hist` - The bin counts.
///
/// # Example
///
/// ```
/// use devignette_imgproc::histogram::compute_entropy;
///
/// assert_eq!(compute_entropy(&[4, 0, 0]), 0.0);
/// assert_eq!(compute_entropy(&[2, 2, 2, 2]), 2.0);
/// ```
pub fn compute_entropy(hist: &[u32]) -> f32 {
    let total: u64 = hist.iter().map(|&c| c as u64).sum();
    if total == 0 {
        return 0.0;
    }

    let total = total as f32;
    let entropy: f32 = hist
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f32 / total;
            p * p.log2()
        })
        .sum();

    // single bin histograms give +0.0
    0.0 - entropy
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{compute_entropy, LogHistogram, NUM_BINS};

    #[test]
    fn test_bin_index() {
        let hist = LogHistogram::new(3.0);
        assert_eq!(hist.bin_index(0), 0);
        assert_eq!(hist.bin_index(1), 11);
        assert_eq!(hist.bin_index(255), 88);
        // largest intensity reachable with a gain of 3
        assert_eq!(hist.bin_index(765), 105);
    }

    #[test]
    fn test_bin_index_clamped() {
        let hist = LogHistogram::new(0.1);
        assert_eq!(hist.bin_index(255), NUM_BINS - 1);
        assert_eq!(hist.bin_index(u32::MAX), NUM_BINS - 1);
    }

    #[test]
    fn test_entropy() {
        assert_eq!(compute_entropy(&[]), 0.0);
        assert_eq!(compute_entropy(&[0, 0]), 0.0);
        assert_eq!(compute_entropy(&[7, 0, 0]), 0.0);
        assert_relative_eq!(compute_entropy(&[1, 1]), 1.0);
        assert_relative_eq!(compute_entropy(&[1, 3]), 0.811_278, epsilon = 1e-5);
    }

    #[test]
    fn test_entropy_zero_is_positive() {
        let entropy = compute_entropy(&[0, 12, 0]);
        assert_eq!(entropy, 0.0);
        assert!(entropy.is_sign_positive());
        assert_eq!(format!("{entropy}"), "0");
    }

    #[test]
    fn test_histogram_add() {
        let mut hist = LogHistogram::new(3.0);
        for v in [0, 1, 1, 255] {
            hist.add(v);
        }
        assert_eq!(hist.total(), 4);
        assert_eq!(hist.bins()[11], 2);
        assert_relative_eq!(hist.entropy(), 1.5);
    }
}
