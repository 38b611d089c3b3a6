//! Tensor inputs for the Burn metric adapters.

use burn::{prelude::*, tensor::backend::Backend};
use derive_new::new;

/// One batch of depth predictions with their references.
#[derive(new, Debug, Clone)]
pub struct DepthMetricInput<B: Backend> {
    /// Ground-truth depth with shape `[batch_size, 1, height, width]`; `0` = no measurement.
    pub ground_truth: Tensor<B, 4>,
    /// Predicted depth with shape `[batch_size, 1, height, width]`.
    pub prediction: Tensor<B, 4>,
    /// Reference edge masks with shape `[batch_size, 1, height, width]`; values above 0.5 are edges.
    pub reference_edges: Tensor<B, 4>,
}
