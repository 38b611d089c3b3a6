//! Directed depth error (DDE).
//!
//! Classifies every valid pixel by how its prediction relates to the ground
//! truth and reports the fraction of each class:
//!
//! - `dde_0`: no large error,
//! - `dde_m`: prediction too near (under-estimate),
//! - `dde_p`: prediction too far (over-estimate).
//!
//! The default [`DirectedErrorMode::Ratio`] compares `pred / gt` against a
//! factor `t`. [`DirectedErrorMode::DepthPlane`] instead asks whether
//! prediction and ground truth fall on the same side of a fronto-parallel
//! plane at `t` metres, which is the definition used by the iBims-1
//! benchmark.

use burn::config::Config;
use serde::{Deserialize, Serialize};

use crate::error::{check_lengths, MetricError, MetricResult};

/// How a valid pixel is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DirectedErrorMode {
    /// `r = pred / gt`; `r > t` is too far, `r < 1/t` too near.
    #[default]
    Ratio,
    /// Pixels in front of (`<= t`) or behind (`> t`) a plane at `t` metres.
    DepthPlane,
}

/// Configuration for the directed depth error.
#[derive(Config, Debug)]
pub struct DirectedErrorConfig {
    /// Ratio factor (or plane distance in metres for `DepthPlane`).
    #[config(default = 3.0)]
    pub threshold: f32,
    #[config(default = "DirectedErrorMode::Ratio")]
    pub mode: DirectedErrorMode,
}

/// Class fractions of one sample; each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectedErrors {
    pub dde_0: f64,
    pub dde_m: f64,
    pub dde_p: f64,
}

impl DirectedErrors {
    pub const fn nan() -> Self {
        Self {
            dde_0: f64::NAN,
            dde_m: f64::NAN,
            dde_p: f64::NAN,
        }
    }
}

/// Ratio-based directed error with factor `threshold` (typically 3.0).
///
/// # Panics
///
/// Panics on mismatched lengths or a factor that is not finite and `>= 1`.
pub fn compute_directed_error(
    ground_truth: &[f32],
    prediction: &[f32],
    threshold: f32,
) -> DirectedErrors {
    let config = DirectedErrorConfig::new().with_threshold(threshold);
    match try_compute_directed_error(ground_truth, prediction, &config) {
        Ok(errors) => errors,
        Err(err) => panic!("compute_directed_error: {err}"),
    }
}

/// Fallible directed error for either [`DirectedErrorMode`].
pub fn try_compute_directed_error(
    ground_truth: &[f32],
    prediction: &[f32],
    config: &DirectedErrorConfig,
) -> MetricResult<DirectedErrors> {
    check_lengths(ground_truth, prediction)?;
    let t = config.threshold;
    let plausible = match config.mode {
        DirectedErrorMode::Ratio => t.is_finite() && t >= 1.0,
        DirectedErrorMode::DepthPlane => t.is_finite() && t > 0.0,
    };
    if !plausible {
        return Err(MetricError::InvalidThreshold { value: t });
    }

    let mut counts = [0usize; 3];
    for (&gt, &pred) in ground_truth.iter().zip(prediction) {
        if gt <= 0.0 {
            continue;
        }
        counts[classify(gt, pred, t, config.mode) as usize] += 1;
    }

    let total: usize = counts.iter().sum();
    if total == 0 {
        return Ok(DirectedErrors::nan());
    }
    let n = total as f64;
    Ok(DirectedErrors {
        dde_0: counts[Class::Correct as usize] as f64 / n,
        dde_m: counts[Class::TooNear as usize] as f64 / n,
        dde_p: counts[Class::TooFar as usize] as f64 / n,
    })
}

#[derive(Clone, Copy)]
enum Class {
    Correct = 0,
    TooNear = 1,
    TooFar = 2,
}

fn classify(gt: f32, pred: f32, t: f32, mode: DirectedErrorMode) -> Class {
    match mode {
        DirectedErrorMode::Ratio => {
            let ratio = f64::from(pred) / f64::from(gt);
            let t = f64::from(t);
            if ratio > t {
                Class::TooFar
            } else if ratio < 1.0 / t {
                Class::TooNear
            } else {
                Class::Correct
            }
        }
        DirectedErrorMode::DepthPlane => match (gt <= t, pred <= t) {
            (false, true) => Class::TooNear,
            (true, false) => Class::TooFar,
            _ => Class::Correct,
        },
    }
}
