//! Dataset-level evaluation loop.

use std::{
    fs,
    path::{Path, PathBuf},
};

use depth_metrics::{
    evaluate_sample, MetricTable, SampleEvaluation, SampleInput, SampleMetrics,
};
use depth_util::GridImage;
use rayon::prelude::*;

use crate::{
    config::EvaluationConfig,
    dataset::{EvaluationDataset, SamplePaths},
    error::{EvalError, EvalResult},
};

/// Why one sample could not be evaluated.
#[derive(Debug, thiserror::Error)]
enum SampleFailure {
    #[error(transparent)]
    Load(#[from] depth_util::GridError),
    #[error(transparent)]
    Metric(#[from] depth_metrics::MetricError),
}

/// Per-sample metrics of a finished run.
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    /// Label of the run, used in the summary file name.
    pub mode: String,
    /// Sample names in table order.
    pub names: Vec<String>,
    /// One column per metric, one row per sample.
    pub table: MetricTable,
    /// Indices of samples that could not be evaluated.
    pub failed: Vec<usize>,
}

impl EvaluationReport {
    /// NaN-skipping mean of every metric.
    pub fn mean(&self) -> SampleMetrics {
        self.table.mean()
    }
}

/// Evaluates every sample of a dataset.
#[derive(Debug, Clone)]
pub struct Evaluator {
    config: EvaluationConfig,
}

impl Evaluator {
    pub const fn new(config: EvaluationConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Runs all samples.
    ///
    /// Per-sample images go to `output_dir` when `save_edges` or
    /// `save_depth_maps` is set.
    pub fn run(
        &self,
        dataset: &EvaluationDataset,
        output_dir: Option<&Path>,
    ) -> EvalResult<EvaluationReport> {
        let dump_dir = match output_dir {
            Some(dir) if self.config.save_edges || self.config.save_depth_maps => {
                fs::create_dir_all(dir).map_err(|source| EvalError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?;
                Some(dir)
            }
            _ => None,
        };

        let samples = dataset.samples();
        let evaluate = |(index, paths): (usize, &SamplePaths)| {
            self.evaluate_one(index, paths, dump_dir)
        };

        let jobs = self.config.jobs.max(1);
        let results: Vec<EvalResult<Option<SampleMetrics>>> = if jobs > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .map_err(|source| EvalError::ThreadPoolFailed { jobs, source })?;
            pool.install(|| samples.par_iter().enumerate().map(evaluate).collect())
        } else {
            samples.iter().enumerate().map(evaluate).collect()
        };

        let mut table = MetricTable::new(samples.len());
        let mut failed = Vec::new();
        for (index, result) in results.into_iter().enumerate() {
            match result? {
                Some(metrics) => table.record(index, &metrics),
                None => {
                    table.record(index, &SampleMetrics::nan());
                    failed.push(index);
                }
            }
        }

        if !failed.is_empty() {
            log::warn!(
                "{} of {} samples could not be evaluated",
                failed.len(),
                samples.len()
            );
        }

        Ok(EvaluationReport {
            mode: self.config.mode.clone(),
            names: samples.iter().map(|s| s.name.clone()).collect(),
            table,
            failed,
        })
    }

    /// `Ok(None)` marks a sample that failed to load or evaluate; only
    /// output errors abort the run.
    fn evaluate_one(
        &self,
        index: usize,
        paths: &SamplePaths,
        dump_dir: Option<&Path>,
    ) -> EvalResult<Option<SampleMetrics>> {
        let (input, evaluation) = match self.load_and_evaluate(paths) {
            Ok(loaded) => loaded,
            Err(err) => {
                log::warn!("sample {index} ({}): {err}", paths.name);
                return Ok(None);
            }
        };

        let m = &evaluation.metrics;
        log::debug!(
            "sample {index} ({}): abs_rel {:.4} rms {:.4} dbe_acc {:.3} dbe_com {:.3} dde_0 {:.4}",
            paths.name,
            m.abs_rel,
            m.rms,
            m.dbe_acc,
            m.dbe_com,
            m.dde_0
        );

        if let Some(dir) = dump_dir {
            if self.config.save_edges {
                GridImage::save_edges(&evaluation.predicted_edges, edge_dump_path(dir, index))
                    .map_err(|source| EvalError::DumpWriteFailed { source })?;
            }
            if self.config.save_depth_maps {
                self.save_depth_maps(dir, index, &input)?;
            }
        }
        Ok(Some(evaluation.metrics))
    }

    fn load_and_evaluate(
        &self,
        paths: &SamplePaths,
    ) -> Result<(SampleInput, SampleEvaluation), SampleFailure> {
        let scale = self.config.depth_scale;
        let input = SampleInput::new(
            GridImage::load_depth(&paths.ground_truth, scale)?,
            GridImage::load_depth(&paths.prediction, scale)?,
            GridImage::load_edges(&paths.reference_edges)?,
        );
        let evaluation = evaluate_sample(&input, &self.config.metrics)?;
        Ok((input, evaluation))
    }

    /// Writes the ground truth and the prediction as scored: floored and
    /// zeroed where the ground truth has no measurement.
    fn save_depth_maps(&self, dir: &Path, index: usize, input: &SampleInput) -> EvalResult<()> {
        let scale = self.config.depth_scale;
        let gt = &input.ground_truth;
        let refined = input
            .prediction
            .clamped_min(self.config.metrics.prediction_floor)
            .masked_by(gt);
        let (gt_path, refined_path) = depth_dump_paths(dir, index);
        GridImage::save_depth(gt, gt_path, scale)
            .and_then(|()| GridImage::save_depth(&refined, refined_path, scale))
            .map_err(|source| EvalError::DumpWriteFailed { source })
    }
}

/// `<dir>/NNNN_edges.png` for sample `index`.
pub fn edge_dump_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("{index:04}_edges.png"))
}

/// `(<dir>/NNNN_gt.png, <dir>/NNNN_refine.png)` for sample `index`.
pub fn depth_dump_paths(dir: &Path, index: usize) -> (PathBuf, PathBuf) {
    (
        dir.join(format!("{index:04}_gt.png")),
        dir.join(format!("{index:04}_refine.png")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_dump_names_are_zero_padded() {
        assert_eq!(
            edge_dump_path(Path::new("out"), 7),
            Path::new("out").join("0007_edges.png")
        );
        assert_eq!(
            edge_dump_path(Path::new("out"), 12345),
            Path::new("out").join("12345_edges.png")
        );
        let (gt, refined) = depth_dump_paths(Path::new("out"), 3);
        assert_eq!(gt, Path::new("out").join("0003_gt.png"));
        assert_eq!(refined, Path::new("out").join("0003_refine.png"));
    }

    #[test]
    fn unreadable_samples_are_recorded_as_undefined() {
        let dataset = EvaluationDataset::from_samples(vec![SamplePaths {
            name: "ghost".to_owned(),
            ground_truth: PathBuf::from("/nonexistent/gt.png"),
            prediction: PathBuf::from("/nonexistent/pred.png"),
            reference_edges: PathBuf::from("/nonexistent/edges.png"),
        }]);

        let report = Evaluator::new(EvaluationConfig::default())
            .run(&dataset, None)
            .unwrap();
        assert_eq!(report.failed, vec![0]);
        assert_eq!(report.names, vec!["ghost".to_owned()]);
        assert!(report.mean().abs_rel.is_nan());
    }
}
