use thiserror::Error;

/// Precondition violations detected by the fallible metric entry points.
///
/// Undefined metrics (no valid pixels, no edges) are never errors; they are
/// reported as `NaN` values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    /// Flattened ground truth and prediction have different lengths.
    #[error("length mismatch: ground truth has {ground_truth} values, prediction has {prediction}")]
    LengthMismatch {
        /// Length of the ground-truth vector.
        ground_truth: usize,
        /// Length of the prediction vector.
        prediction: usize,
    },

    /// Two grids that must be aligned pixel by pixel have different shapes.
    #[error("shape mismatch for {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Which input disagreed.
        what: &'static str,
        /// `(width, height)` of the reference input.
        expected: (usize, usize),
        /// `(width, height)` of the offending input.
        actual: (usize, usize),
    },

    /// The directed-error threshold must be finite, at least one as a ratio
    /// factor and positive as a plane distance.
    #[error("invalid directed-error threshold {value}")]
    InvalidThreshold {
        /// The rejected factor.
        value: f32,
    },
}

/// A specialized `Result` type for metric computations.
pub type MetricResult<T> = Result<T, MetricError>;

pub(crate) fn check_lengths(ground_truth: &[f32], prediction: &[f32]) -> MetricResult<()> {
    if ground_truth.len() == prediction.len() {
        Ok(())
    } else {
        Err(MetricError::LengthMismatch {
            ground_truth: ground_truth.len(),
            prediction: prediction.len(),
        })
    }
}
