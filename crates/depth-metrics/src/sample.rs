//! One-call evaluation of a single sample.
//!
//! Mirrors what an evaluation loop does before calling the three metric
//! components: clamp the prediction to a positive floor, zero it wherever the
//! ground truth has no measurement, flatten both maps, then run the global,
//! boundary and directed metrics.

use burn::config::Config;
use depth_util::{DepthMap, EdgeMap};
use derive_new::new;

use crate::{
    aggregate::{MetricGroup, SampleMetrics},
    boundary::{try_compute_boundary_error, BoundaryErrorConfig},
    directed::{try_compute_directed_error, DirectedErrorConfig, DirectedErrors},
    error::{MetricError, MetricResult},
    global::{try_compute_global_errors, GlobalErrors, PREDICTION_FLOOR},
};

/// Maps of one sample; all three must share a shape.
#[derive(new, Debug, Clone)]
pub struct SampleInput {
    /// Metric depth, `0.0` = no measurement.
    pub ground_truth: DepthMap,
    /// Predicted metric depth.
    pub prediction: DepthMap,
    /// Externally supplied depth-discontinuity map.
    pub reference_edges: EdgeMap,
}

/// Configuration for [`evaluate_sample`].
#[derive(Config, Debug)]
pub struct SampleEvaluationConfig {
    /// Predictions are raised to at least this value before evaluation.
    #[config(default = "PREDICTION_FLOOR")]
    pub prediction_floor: f32,
    #[config(default = "BoundaryErrorConfig::new()")]
    pub boundary: BoundaryErrorConfig,
    #[config(default = "DirectedErrorConfig::new()")]
    pub directed: DirectedErrorConfig,
}

/// Result of [`evaluate_sample`].
#[derive(Debug, Clone)]
pub struct SampleEvaluation {
    pub metrics: SampleMetrics,
    /// Edges extracted from the masked prediction.
    pub predicted_edges: EdgeMap,
}

/// Runs all three metric components on one sample.
pub fn evaluate_sample(
    input: &SampleInput,
    config: &SampleEvaluationConfig,
) -> MetricResult<SampleEvaluation> {
    let (metrics, predicted_edges) = evaluate_groups(input, config, |_| true)?;
    Ok(SampleEvaluation {
        metrics,
        predicted_edges: predicted_edges.unwrap_or_else(|| {
            EdgeMap::empty(input.ground_truth.width(), input.ground_truth.height())
        }),
    })
}

/// Runs only the components accepted by `selected`; the other metrics stay `NaN`.
///
/// The predicted edge map is returned when the boundary component ran.
pub(crate) fn evaluate_groups(
    input: &SampleInput,
    config: &SampleEvaluationConfig,
    selected: impl Fn(MetricGroup) -> bool,
) -> MetricResult<(SampleMetrics, Option<EdgeMap>)> {
    let gt = &input.ground_truth;
    for (what, actual) in [
        ("prediction", input.prediction.shape()),
        ("reference edges", input.reference_edges.shape()),
    ] {
        if actual != gt.shape() {
            return Err(MetricError::ShapeMismatch {
                what,
                expected: gt.shape(),
                actual,
            });
        }
    }

    let prediction = input
        .prediction
        .clamped_min(config.prediction_floor)
        .masked_by(gt);

    let global = if selected(MetricGroup::Global) {
        try_compute_global_errors(gt.as_slice(), prediction.as_slice())?
    } else {
        GlobalErrors::nan()
    };
    let boundary = if selected(MetricGroup::Boundary) {
        Some(try_compute_boundary_error(
            &input.reference_edges,
            &prediction,
            &config.boundary,
        )?)
    } else {
        None
    };
    let directed = if selected(MetricGroup::Directed) {
        try_compute_directed_error(gt.as_slice(), prediction.as_slice(), &config.directed)?
    } else {
        DirectedErrors::nan()
    };

    let (dbe_acc, dbe_com) = boundary
        .as_ref()
        .map_or((f64::NAN, f64::NAN), |b| (b.dbe_acc, b.dbe_com));
    let metrics = SampleMetrics::from_components(&global, dbe_acc, dbe_com, &directed);
    Ok((metrics, boundary.map(|b| b.predicted_edges)))
}
