//! Global depth error statistics.
//!
//! The classic scale-aware error suite of monocular depth estimation,
//! computed over the pixels where ground truth is available:
//!
//! | name      | definition                                   | better |
//! |-----------|----------------------------------------------|--------|
//! | `abs_rel` | `mean(|gt - pred| / gt)`                     | lower  |
//! | `sq_rel`  | `mean((gt - pred)^2 / gt)`                   | lower  |
//! | `rms`     | `sqrt(mean((gt - pred)^2))`                  | lower  |
//! | `log10`   | `mean(|log10 gt - log10 pred|)`              | lower  |
//! | `thr1..3` | fraction with `max(gt/pred, pred/gt) < 1.25^k` | higher |
//!
//! Predictions must be strictly positive wherever ground truth is valid
//! (see [`clamp_prediction`]); the log and ratio terms are undefined
//! otherwise.

use serde::{Deserialize, Serialize};

use crate::error::{check_lengths, MetricResult};

/// Base of the delta accuracy thresholds.
pub const DELTA_BASE: f64 = 1.25;

/// Floor the evaluation driver clamps predictions to.
pub const PREDICTION_FLOOR: f32 = 1e-9;

/// Global error statistics of one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalErrors {
    pub abs_rel: f64,
    pub sq_rel: f64,
    pub rms: f64,
    pub log10: f64,
    pub thr1: f64,
    pub thr2: f64,
    pub thr3: f64,
    /// `sqrt(mean((ln gt - ln pred)^2))`, reported alongside the main suite.
    pub rms_log: f64,
}

impl GlobalErrors {
    /// All statistics undefined.
    pub const fn nan() -> Self {
        Self {
            abs_rel: f64::NAN,
            sq_rel: f64::NAN,
            rms: f64::NAN,
            log10: f64::NAN,
            thr1: f64::NAN,
            thr2: f64::NAN,
            thr3: f64::NAN,
            rms_log: f64::NAN,
        }
    }
}

/// Raises every prediction to at least [`PREDICTION_FLOOR`].
pub fn clamp_prediction(prediction: &[f32]) -> Vec<f32> {
    prediction.iter().map(|&p| p.max(PREDICTION_FLOOR)).collect()
}

/// Computes [`GlobalErrors`] over positions where `ground_truth > 0`.
///
/// Returns all-`NaN` statistics when no position is valid.
///
/// # Panics
///
/// Panics if the two slices differ in length.
pub fn compute_global_errors(ground_truth: &[f32], prediction: &[f32]) -> GlobalErrors {
    match try_compute_global_errors(ground_truth, prediction) {
        Ok(errors) => errors,
        Err(err) => panic!("compute_global_errors: {err}"),
    }
}

/// Fallible variant of [`compute_global_errors`].
pub fn try_compute_global_errors(
    ground_truth: &[f32],
    prediction: &[f32],
) -> MetricResult<GlobalErrors> {
    check_lengths(ground_truth, prediction)?;

    let thresholds = [DELTA_BASE, DELTA_BASE.powi(2), DELTA_BASE.powi(3)];

    let mut count = 0usize;
    let mut abs_rel = 0.0;
    let mut sq_rel = 0.0;
    let mut squared = 0.0;
    let mut log10 = 0.0;
    let mut log_squared = 0.0;
    let mut within = [0usize; 3];

    for (&gt, &pred) in ground_truth.iter().zip(prediction) {
        if gt <= 0.0 {
            continue;
        }
        let gt = f64::from(gt);
        let pred = f64::from(pred);
        let diff = gt - pred;

        count += 1;
        abs_rel += diff.abs() / gt;
        sq_rel += diff * diff / gt;
        squared += diff * diff;
        log10 += (gt.log10() - pred.log10()).abs();
        let ln_diff = gt.ln() - pred.ln();
        log_squared += ln_diff * ln_diff;

        let ratio = (gt / pred).max(pred / gt);
        for (hits, &threshold) in within.iter_mut().zip(&thresholds) {
            if ratio < threshold {
                *hits += 1;
            }
        }
    }

    if count == 0 {
        log::debug!("global errors undefined: no valid ground-truth pixels");
        return Ok(GlobalErrors::nan());
    }

    let n = count as f64;
    Ok(GlobalErrors {
        abs_rel: abs_rel / n,
        sq_rel: sq_rel / n,
        rms: (squared / n).sqrt(),
        log10: log10 / n,
        thr1: within[0] as f64 / n,
        thr2: within[1] as f64 / n,
        thr3: within[2] as f64 / n,
        rms_log: (log_squared / n).sqrt(),
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::*;

    use super::*;
    use crate::error::MetricError;

    #[test]
    fn perfect_prediction_has_zero_error() {
        let gt = [2.0, 4.0, 0.5, 7.25];
        let errors = compute_global_errors(&gt, &gt);

        assert_eq!(errors.abs_rel, 0.0);
        assert_eq!(errors.sq_rel, 0.0);
        assert_eq!(errors.rms, 0.0);
        assert_eq!(errors.log10, 0.0);
        assert_eq!(errors.rms_log, 0.0);
        assert_eq!(errors.thr1, 1.0);
        assert_eq!(errors.thr2, 1.0);
        assert_eq!(errors.thr3, 1.0);
    }

    #[test]
    fn all_zero_ground_truth_is_undefined() {
        let errors = compute_global_errors(&[0.0; 5], &[1.0, 2.0, 3.0, 4.0, 5.0]);
        for value in [
            errors.abs_rel,
            errors.sq_rel,
            errors.rms,
            errors.log10,
            errors.thr1,
            errors.thr2,
            errors.thr3,
        ] {
            assert!(value.is_nan());
        }
    }

    #[test]
    fn empty_input_is_undefined() {
        assert!(compute_global_errors(&[], &[]).rms.is_nan());
    }

    #[test]
    fn masked_pixels_are_ignored() {
        let gt = [2.0, 0.0, 4.0, 0.0];
        let pred = [2.0, PREDICTION_FLOOR, 4.0, 123.0];
        let errors = compute_global_errors(&gt, &pred);
        assert_eq!(errors.rms, 0.0);
        assert_eq!(errors.thr1, 1.0);
    }

    #[test]
    fn swapped_pair_matches_hand_computation() {
        let errors = compute_global_errors(&[2.0, 4.0], &[4.0, 2.0]);

        // |2-4|/2 = 1, |4-2|/4 = 0.5
        assert_relative_eq!(errors.abs_rel, 0.75);
        // 4/2 = 2, 4/4 = 1
        assert_relative_eq!(errors.sq_rel, 1.5);
        assert_relative_eq!(errors.rms, 2.0);
        assert_relative_eq!(errors.log10, 2.0f64.log10(), epsilon = 1e-12);
        assert_relative_eq!(errors.rms_log, 2.0f64.ln(), epsilon = 1e-12);
        // ratio 2 for both, above 1.25^3 = 1.953125
        assert_eq!(errors.thr1, 0.0);
        assert_eq!(errors.thr2, 0.0);
        assert_eq!(errors.thr3, 0.0);
    }

    #[test]
    fn delta_thresholds_split_by_ratio() {
        // ratios 1.2, 1.5, 1.9, 2.5
        let errors = compute_global_errors(&[1.0, 1.0, 1.0, 1.0], &[1.2, 1.5, 1.9, 2.5]);
        assert_relative_eq!(errors.thr1, 0.25);
        assert_relative_eq!(errors.thr2, 0.5);
        assert_relative_eq!(errors.thr3, 0.75);
    }

    #[rstest]
    #[case(&[1.0, 2.0, 3.0, 4.0, 5.0], &[1.1, 2.7, 1.0, 9.0, 5.0])]
    #[case(&[10.0, 0.0, 0.3, 2.2], &[1.0, 5.0, 0.35, 2.0])]
    #[case(&[0.5; 4], &[0.6, 0.8, 1.2, 3.0])]
    fn delta_accuracies_are_monotonic(#[case] gt: &[f32], #[case] pred: &[f32]) {
        let errors = compute_global_errors(gt, pred);
        assert!(errors.thr1 <= errors.thr2);
        assert!(errors.thr2 <= errors.thr3);
        assert!((0.0..=1.0).contains(&errors.thr1));
        assert!((0.0..=1.0).contains(&errors.thr3));
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let gt = [1.3, 0.0, 2.9, 8.1, 4.4];
        let pred = [1.0, 3.0, 3.3, 7.0, 4.5];
        let a = compute_global_errors(&gt, &pred);
        let b = compute_global_errors(&gt, &pred);
        assert_eq!(a.abs_rel.to_bits(), b.abs_rel.to_bits());
        assert_eq!(a.rms.to_bits(), b.rms.to_bits());
        assert_eq!(a.log10.to_bits(), b.log10.to_bits());
    }

    #[test]
    fn length_mismatch_is_rejected() {
        assert_eq!(
            try_compute_global_errors(&[1.0, 2.0], &[1.0]),
            Err(MetricError::LengthMismatch {
                ground_truth: 2,
                prediction: 1
            })
        );
    }

    #[test]
    #[should_panic(expected = "length mismatch")]
    fn length_mismatch_panics() {
        let _ = compute_global_errors(&[1.0, 2.0], &[1.0]);
    }

    #[test]
    fn clamp_prediction_raises_to_floor() {
        assert_eq!(
            clamp_prediction(&[-1.0, 0.0, 2.0]),
            vec![PREDICTION_FLOOR, PREDICTION_FLOOR, 2.0]
        );
    }
}
