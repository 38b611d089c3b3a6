//! Depth boundary error (DBE).
//!
//! Measures how well depth discontinuities of the prediction line up with a
//! reference edge map:
//!
//! 1. predicted edges are extracted from the predicted depth map
//!    ([`depth_util::extract_depth_edges`]);
//! 2. exact Euclidean distance transforms give, for every pixel, the distance
//!    to the nearest reference edge (`D_ref`) and to the nearest predicted
//!    edge (`D_pred`);
//! 3. `dbe_acc` is the mean of `D_ref` over predicted-edge pixels and
//!    `dbe_com` the mean of `D_pred` over reference-edge pixels, both with
//!    distances clamped to `max_distance` pixels.
//!
//! With no predicted edges `dbe_acc` is `NaN` while `dbe_com` equals the cap;
//! with no reference edges `dbe_com` is `NaN`.

use burn::config::Config;
use depth_util::{extract_depth_edges, truncated_distance_transform, DepthMap, EdgeMap};

use crate::error::{MetricError, MetricResult};

/// Configuration for the depth boundary error.
#[derive(Config, Debug)]
pub struct BoundaryErrorConfig {
    /// Normalised Sobel magnitude above which a pixel is a predicted edge.
    #[config(default = 0.1)]
    pub edge_threshold: f32,
    /// Distances are clamped to this many pixels in both directions.
    #[config(default = 10.0)]
    pub max_distance: f32,
    /// Thin predicted edges with non-maximum suppression.
    #[config(default = false)]
    pub thin_edges: bool,
}

/// Boundary errors of one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryErrors {
    /// Accuracy: mean distance from predicted edges to the reference.
    pub dbe_acc: f64,
    /// Completeness: mean distance from reference edges to the prediction.
    pub dbe_com: f64,
    /// Edge map extracted from the prediction.
    pub predicted_edges: EdgeMap,
}

/// Extracts edges from `predicted_depth` and scores them against `reference`.
///
/// # Panics
///
/// Panics if the two maps differ in shape.
pub fn compute_boundary_error(
    reference: &EdgeMap,
    predicted_depth: &DepthMap,
    config: &BoundaryErrorConfig,
) -> BoundaryErrors {
    match try_compute_boundary_error(reference, predicted_depth, config) {
        Ok(errors) => errors,
        Err(err) => panic!("compute_boundary_error: {err}"),
    }
}

/// Fallible variant of [`compute_boundary_error`].
pub fn try_compute_boundary_error(
    reference: &EdgeMap,
    predicted_depth: &DepthMap,
    config: &BoundaryErrorConfig,
) -> MetricResult<BoundaryErrors> {
    if !reference.same_shape(predicted_depth) {
        return Err(MetricError::ShapeMismatch {
            what: "predicted depth",
            expected: reference.shape(),
            actual: predicted_depth.shape(),
        });
    }

    let predicted_edges =
        extract_depth_edges(predicted_depth, config.edge_threshold, config.thin_edges);
    let (dbe_acc, dbe_com) = edge_distances(reference, &predicted_edges, config.max_distance);

    Ok(BoundaryErrors {
        dbe_acc,
        dbe_com,
        predicted_edges,
    })
}

/// Scores an already extracted predicted edge map; returns `(dbe_acc, dbe_com)`.
///
/// # Panics
///
/// Panics if the two maps differ in shape.
pub fn boundary_error_from_edges(
    reference: &EdgeMap,
    predicted_edges: &EdgeMap,
    max_distance: f32,
) -> (f64, f64) {
    assert!(
        reference.same_shape(predicted_edges),
        "boundary_error_from_edges: reference shape {:?} does not match predicted shape {:?}",
        reference.shape(),
        predicted_edges.shape()
    );
    edge_distances(reference, predicted_edges, max_distance)
}

fn edge_distances(reference: &EdgeMap, predicted: &EdgeMap, max_distance: f32) -> (f64, f64) {
    let to_reference = truncated_distance_transform(reference, max_distance);
    let to_predicted = truncated_distance_transform(predicted, max_distance);

    let accuracy = mean_over(predicted, to_reference.as_slice());
    let completeness = mean_over(reference, to_predicted.as_slice());

    log::debug!(
        "boundary error: {} predicted / {} reference edge pixels, acc {accuracy:.3}, com {completeness:.3}",
        predicted.count(),
        reference.count()
    );
    (accuracy, completeness)
}

/// Mean of `values` at the `true` cells of `mask`; `NaN` if there are none.
fn mean_over(mask: &EdgeMap, values: &[f32]) -> f64 {
    let (sum, count) = mask
        .as_slice()
        .iter()
        .zip(values)
        .filter(|(&on, _)| on)
        .fold((0.0f64, 0usize), |(sum, count), (_, &v)| {
            (sum + f64::from(v), count + 1)
        });
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use depth_util::Grid;

    use super::*;

    fn single_edge(width: usize, height: usize, x: usize, y: usize) -> EdgeMap {
        let mut edges = EdgeMap::empty(width, height);
        edges.set(x, y, true);
        edges
    }

    /// Vertical depth step between columns `split - 1` and `split`.
    fn step_depth(width: usize, height: usize, split: usize) -> DepthMap {
        Grid::from_fn(width, height, |x, _| if x < split { 1.0 } else { 4.0 })
    }

    fn column(width: usize, height: usize, col: usize) -> EdgeMap {
        Grid::from_fn(width, height, |x, _| x == col)
    }

    #[test]
    fn coincident_edges_have_zero_error() {
        let reference = single_edge(9, 9, 4, 4);
        let predicted = single_edge(9, 9, 4, 4);
        let (acc, com) = boundary_error_from_edges(&reference, &predicted, 10.0);
        assert_eq!(acc, 0.0);
        assert_eq!(com, 0.0);
    }

    #[test]
    fn offset_edges_measure_distance() {
        let reference = single_edge(9, 9, 1, 1);
        let predicted = single_edge(9, 9, 4, 5);
        let (acc, com) = boundary_error_from_edges(&reference, &predicted, 10.0);
        assert_relative_eq!(acc, 5.0, epsilon = 1e-6);
        assert_relative_eq!(com, 5.0, epsilon = 1e-6);
    }

    #[test]
    fn distances_are_capped() {
        let reference = single_edge(40, 1, 0, 0);
        let predicted = single_edge(40, 1, 30, 0);
        let (acc, com) = boundary_error_from_edges(&reference, &predicted, 10.0);
        assert_eq!(acc, 10.0);
        assert_eq!(com, 10.0);
    }

    #[test]
    fn accuracy_and_completeness_are_directed() {
        // Reference has two edge pixels, prediction hits only one of them.
        let mut reference = single_edge(20, 1, 2, 0);
        reference.set(8, 0, true);
        let predicted = single_edge(20, 1, 2, 0);
        let (acc, com) = boundary_error_from_edges(&reference, &predicted, 10.0);
        assert_eq!(acc, 0.0);
        assert_relative_eq!(com, 3.0);
    }

    #[test]
    fn flat_prediction_has_undefined_accuracy() {
        let reference = column(12, 8, 5);
        let flat = DepthMap::filled(12, 8, 2.0);
        let errors = compute_boundary_error(&reference, &flat, &BoundaryErrorConfig::new());

        assert_eq!(errors.predicted_edges.count(), 0);
        assert!(errors.dbe_acc.is_nan());
        assert_eq!(errors.dbe_com, 10.0);
    }

    #[test]
    fn flat_reference_has_undefined_completeness() {
        let reference = EdgeMap::empty(12, 8);
        let depth = step_depth(12, 8, 6);
        let errors = compute_boundary_error(&reference, &depth, &BoundaryErrorConfig::new());

        assert!(errors.dbe_com.is_nan());
        assert_eq!(errors.dbe_acc, 10.0);
    }

    #[test]
    fn aligned_step_scores_well() {
        // Sobel marks columns 5 and 6 around the step; reference sits on 5.
        let reference = column(12, 8, 5);
        let depth = step_depth(12, 8, 6);
        let errors = compute_boundary_error(&reference, &depth, &BoundaryErrorConfig::new());

        assert_relative_eq!(errors.dbe_acc, 0.5, epsilon = 1e-6);
        assert_eq!(errors.dbe_com, 0.0);
    }

    #[test]
    fn thinning_removes_the_double_edge() {
        let reference = column(12, 8, 5);
        let depth = step_depth(12, 8, 6);
        let config = BoundaryErrorConfig::new().with_thin_edges(true);
        let errors = compute_boundary_error(&reference, &depth, &config);

        // Border rows are dropped by non-maximum suppression, so the two
        // reference pixels in rows 0 and 7 sit one pixel from the nearest edge.
        assert_eq!(errors.predicted_edges.count(), 6);
        assert_eq!(errors.dbe_acc, 0.0);
        assert_relative_eq!(errors.dbe_com, 0.25, epsilon = 1e-6);
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let reference = EdgeMap::empty(4, 4);
        let depth = DepthMap::zeros(5, 4);
        assert_eq!(
            try_compute_boundary_error(&reference, &depth, &BoundaryErrorConfig::new()),
            Err(MetricError::ShapeMismatch {
                what: "predicted depth",
                expected: (4, 4),
                actual: (5, 4),
            })
        );
    }

    #[test]
    #[should_panic(expected = "does not match")]
    fn edge_shape_mismatch_panics() {
        let _ = boundary_error_from_edges(&EdgeMap::empty(3, 3), &EdgeMap::empty(3, 4), 10.0);
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let reference = column(10, 6, 3);
        let depth = step_depth(10, 6, 5);
        let config = BoundaryErrorConfig::new();
        let a = compute_boundary_error(&reference, &depth, &config);
        let b = compute_boundary_error(&reference, &depth, &config);
        assert_eq!(a.dbe_acc.to_bits(), b.dbe_acc.to_bits());
        assert_eq!(a.dbe_com.to_bits(), b.dbe_com.to_bits());
        assert_eq!(a.predicted_edges, b.predicted_edges);
    }
}
