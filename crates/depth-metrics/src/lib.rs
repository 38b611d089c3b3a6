//! # Depth Metrics
//!
//! Evaluation metrics for dense monocular depth estimation, computed on the
//! host over flat `f32` slices and row-major grids.
//!
//! ## Implemented Metrics
//!
//! - [`compute_global_errors`]: `abs_rel`, `sq_rel`, `rms`, `log10` and the
//!   `1.25^k` delta accuracies
//! - [`compute_boundary_error`]: depth boundary accuracy (`dbe_acc`) and
//!   completeness (`dbe_com`) against a reference edge map
//! - [`compute_directed_error`]: fractions of too-near (`dde_m`), too-far
//!   (`dde_p`) and acceptable (`dde_0`) pixels
//!
//! Undefined values (no valid pixels, no edges) are reported as `NaN` and
//! skipped by [`nan_mean`] and [`MetricTable::mean`].
//!
//! ## Usage
//!
//! ```rust
//! use depth_metrics::{evaluate_sample, SampleEvaluationConfig, SampleInput};
//! use depth_util::{DepthMap, EdgeMap};
//!
//! let gt = DepthMap::filled(8, 8, 2.0);
//! let pred = DepthMap::filled(8, 8, 2.5);
//! let input = SampleInput::new(gt, pred, EdgeMap::empty(8, 8));
//!
//! let result = evaluate_sample(&input, &SampleEvaluationConfig::new()).unwrap();
//! assert!((result.metrics.abs_rel - 0.25).abs() < 1e-6);
//! ```
//!
//! ## Burn integration
//!
//! [`DepthMetric`] implements Burn's `Metric` and `Numeric` traits over
//! [`DepthMetricInput`] batches of `[batch, 1, height, width]` tensors.

pub mod aggregate;
pub mod boundary;
pub mod directed;
pub mod error;
pub mod global;
pub mod input;
pub mod metric;
pub mod sample;

pub use aggregate::{
    nan_mean, MetricGroup, MetricName, MetricTable, MetricVector, NanMeanState, SampleMetrics,
};
pub use boundary::{
    boundary_error_from_edges, compute_boundary_error, try_compute_boundary_error,
    BoundaryErrorConfig, BoundaryErrors,
};
pub use depth_util::extract_depth_edges;
pub use directed::{
    compute_directed_error, try_compute_directed_error, DirectedErrorConfig, DirectedErrorMode,
    DirectedErrors,
};
pub use error::{MetricError, MetricResult};
pub use global::{
    clamp_prediction, compute_global_errors, try_compute_global_errors, GlobalErrors,
    PREDICTION_FLOOR,
};
pub use input::DepthMetricInput;
pub use metric::{DepthMetric, DepthMetricConfig};
pub use sample::{evaluate_sample, SampleEvaluation, SampleEvaluationConfig, SampleInput};
