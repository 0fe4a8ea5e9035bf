//! Frame preprocessing: raw RGB frames to motion-difference feature vectors.
//!
//! A single frame cannot tell the policy which way the ball is moving, so the feature vector
//! is built from the difference between two consecutive frames:
//!
//! 1. **Difference** - `current - previous` per pixel and channel (all zeros for the first frame)
//! 2. **Crop** - drop `crop_top` rows (score area) and `crop_bottom` rows (bottom wall)
//! 3. **Gray** - average the three color channels
//! 4. **Downsample** - keep every `stride`-th row and column
//! 5. **Flatten** - row-major into a column vector
//!
//! The difference is taken in floating point, so a pixel getting darker yields a negative
//! feature instead of wrapping around.

use ndarray::Array1;
use pgpong_engine::Frame;

#[expect(clippy::cast_precision_loss)]
const CHANNELS: f64 = Frame::CHANNELS as f64;

/// A `D`-length input vector for the policy network.
pub type FeatureVector = Array1<f64>;

/// Geometry of the preprocessing pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessConfig {
    /// Rows removed from the top of the frame.
    pub crop_top: usize,
    /// Rows removed from the bottom of the frame.
    pub crop_bottom: usize,
    /// Keep every `stride`-th row and column of the cropped frame.
    pub stride: usize,
}

impl Default for PreprocessConfig {
    /// Settings for 210×160 frames, producing `80 × 80 = 6400` features.
    fn default() -> Self {
        Self {
            crop_top: 34,
            crop_bottom: 16,
            stride: 2,
        }
    }
}

impl PreprocessConfig {
    /// Returns the feature vector length `D` for frames of the given size.
    ///
    /// # Example
    ///
    /// ```
    /// use pgpong_policy::preprocess::PreprocessConfig;
    ///
    /// assert_eq!(PreprocessConfig::default().feature_len(210, 160), 6400);
    /// ```
    #[must_use]
    pub fn feature_len(&self, height: usize, width: usize) -> usize {
        let rows = height.saturating_sub(self.crop_top + self.crop_bottom);
        rows.div_ceil(self.stride) * width.div_ceil(self.stride)
    }

    /// Encodes `current` relative to `previous` as a feature vector.
    ///
    /// # Panics
    ///
    /// Panics if the two frames have different sizes or the crop removes the whole frame.
    #[must_use]
    pub fn encode(&self, current: &Frame, previous: Option<&Frame>) -> FeatureVector {
        let (height, width) = (current.height(), current.width());
        assert!(
            self.crop_top + self.crop_bottom < height,
            "crop removes the whole {height}-row frame"
        );
        assert!(self.stride > 0, "stride must be positive");

        let Some(previous) = previous else {
            return FeatureVector::zeros(self.feature_len(height, width));
        };
        assert_eq!(
            (previous.height(), previous.width()),
            (height, width),
            "consecutive frames must have the same size"
        );

        let rows = (self.crop_top..height - self.crop_bottom).step_by(self.stride);
        let features = rows
            .flat_map(|row| (0..width).step_by(self.stride).map(move |col| (row, col)))
            .map(|(row, col)| {
                let now = current.pixel(row, col);
                let before = previous.pixel(row, col);
                let diff: f64 = (0..Frame::CHANNELS)
                    .map(|ch| f64::from(now[ch]) - f64::from(before[ch]))
                    .sum();
                diff / CHANNELS
            })
            .collect::<Vec<_>>();
        FeatureVector::from_vec(features)
    }
}
