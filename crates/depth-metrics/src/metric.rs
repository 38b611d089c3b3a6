//! Burn `Metric` adapter for the depth metric suite.
//!
//! A [`DepthMetric`] tracks one [`MetricName`] across the batches of an
//! evaluation loop. Tensors are copied to the host and evaluated per item
//! with the same code path as [`evaluate_sample`](crate::evaluate_sample);
//! only the component that produces the tracked metric is run. Items whose
//! metric is undefined are skipped by the running mean instead of turning it
//! into `NaN`.

use core::marker::PhantomData;

use burn::{
    prelude::*,
    tensor::backend::Backend,
    train::metric::{Metric, MetricEntry, MetricMetadata, Numeric},
};
use depth_util::{DepthMap, EdgeMap};

use crate::{
    aggregate::{MetricName, NanMeanState},
    input::DepthMetricInput,
    sample::{evaluate_groups, SampleEvaluationConfig, SampleInput},
};

/// Configuration for [`DepthMetric`].
#[derive(Config, Debug)]
pub struct DepthMetricConfig {
    /// Metric reported by this instance.
    #[config(default = "MetricName::AbsRel")]
    pub metric: MetricName,
    #[config(default = "SampleEvaluationConfig::new()")]
    pub evaluation: SampleEvaluationConfig,
}

impl DepthMetricConfig {
    pub fn init<B: Backend>(&self) -> DepthMetric<B> {
        DepthMetric {
            state: NanMeanState::default(),
            metric: self.metric,
            evaluation: self.evaluation.clone(),
            _b: PhantomData,
        }
    }
}

/// NaN-skipping running mean of one depth metric.
#[derive(Clone)]
pub struct DepthMetric<B: Backend> {
    state: NanMeanState,
    metric: MetricName,
    evaluation: SampleEvaluationConfig,
    _b: PhantomData<B>,
}

impl<B: Backend> DepthMetric<B> {
    /// Tracks `metric` with default evaluation settings.
    pub fn new(metric: MetricName) -> Self {
        DepthMetricConfig::new().with_metric(metric).init()
    }

    pub const fn metric(&self) -> MetricName {
        self.metric
    }

    /// Evaluates every item of the batch and folds it into the running mean.
    ///
    /// Returns the NaN-skipping mean over this batch.
    pub fn accumulate(&mut self, item: &DepthMetricInput<B>) -> f64 {
        let samples = match batch_samples(item) {
            Ok(samples) => samples,
            Err(err) => {
                log::warn!("{}: skipping batch: {err}", self.metric);
                return f64::NAN;
            }
        };

        let group = self.metric.group();
        let mut batch = NanMeanState::default();
        for (index, sample) in samples.iter().enumerate() {
            match evaluate_groups(sample, &self.evaluation, |g| g == group) {
                Ok((metrics, _)) => {
                    let value = metrics.get(self.metric);
                    batch.update(value);
                    self.state.update(value);
                }
                Err(err) => log::warn!("{}: skipping batch item {index}: {err}", self.metric),
            }
        }
        batch.value()
    }
}

/// Why a batch could not be split into samples.
#[derive(Debug, thiserror::Error)]
enum BatchError {
    #[error(transparent)]
    Tensor(#[from] depth_util::GridError),
    #[error(
        "batch sizes differ: ground truth {ground_truth}, prediction {prediction}, edges {reference_edges}"
    )]
    SizeMismatch {
        ground_truth: usize,
        prediction: usize,
        reference_edges: usize,
    },
}

fn batch_samples<B: Backend>(
    item: &DepthMetricInput<B>,
) -> Result<Vec<SampleInput>, BatchError> {
    let ground_truth = DepthMap::batch_from_tensor(item.ground_truth.clone())?;
    let prediction = DepthMap::batch_from_tensor(item.prediction.clone())?;
    let reference_edges = EdgeMap::batch_from_tensor(item.reference_edges.clone())?;

    if ground_truth.len() != prediction.len() || ground_truth.len() != reference_edges.len() {
        return Err(BatchError::SizeMismatch {
            ground_truth: ground_truth.len(),
            prediction: prediction.len(),
            reference_edges: reference_edges.len(),
        });
    }

    Ok(ground_truth
        .into_iter()
        .zip(prediction)
        .zip(reference_edges)
        .map(|((gt, pred), edges)| SampleInput::new(gt, pred, edges))
        .collect())
}

impl<B: Backend> Metric for DepthMetric<B> {
    type Input = DepthMetricInput<B>;

    fn name(&self) -> String {
        self.metric.as_str().to_owned()
    }

    fn update(&mut self, item: &Self::Input, _metadata: &MetricMetadata) -> MetricEntry {
        let batch = self.accumulate(item);
        let running = self.state.value();
        MetricEntry::new(
            self.name(),
            format!("{running:.5} (batch {batch:.5})"),
            running.to_string(),
        )
    }

    fn clear(&mut self) {
        self.state.reset();
    }
}

impl<B: Backend> Numeric for DepthMetric<B> {
    fn value(&self) -> f64 {
        self.state.value()
    }
}
