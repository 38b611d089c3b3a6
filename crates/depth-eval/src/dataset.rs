//! Discovery of evaluation samples on disk.
//!
//! Every image in the ground-truth directory is paired, by file stem, with a
//! prediction and a reference edge map living in their own directories:
//!
//! ```text
//! gt/0001.png      pred/0001<prediction_suffix>.png   edges/0001<edge_suffix>.png
//! ```
//!
//! Ground-truth files without a full triple are skipped with a warning.
//! Samples are ordered by ground-truth file name, which fixes the sample
//! index used in the report and in edge dump file names.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{EvalError, EvalResult};

/// File extensions recognised as depth or edge images.
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["png", "PNG"];

/// Paths of one evaluation sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePaths {
    /// Ground-truth file stem.
    pub name: String,
    pub ground_truth: PathBuf,
    pub prediction: PathBuf,
    pub reference_edges: PathBuf,
}

/// Ordered list of samples found on disk.
#[derive(Debug, Clone, Default)]
pub struct EvaluationDataset {
    samples: Vec<SamplePaths>,
}

impl EvaluationDataset {
    /// Pairs ground truth with predictions and edges without suffixes.
    pub fn discover<P: AsRef<Path>>(gt_dir: P, pred_dir: P, edge_dir: P) -> EvalResult<Self> {
        Self::discover_with_suffixes(gt_dir, pred_dir, edge_dir, "", "")
    }

    /// Pairs ground truth with `<stem><prediction_suffix>` predictions and
    /// `<stem><edge_suffix>` edge maps.
    pub fn discover_with_suffixes<P: AsRef<Path>>(
        gt_dir: P,
        pred_dir: P,
        edge_dir: P,
        prediction_suffix: &str,
        edge_suffix: &str,
    ) -> EvalResult<Self> {
        let gt_dir = gt_dir.as_ref();
        let pred_dir = pred_dir.as_ref();
        let edge_dir = edge_dir.as_ref();
        for dir in [gt_dir, pred_dir, edge_dir] {
            if !dir.is_dir() {
                return Err(EvalError::DirectoryNotFound {
                    path: dir.to_path_buf(),
                });
            }
        }

        let mut samples = Vec::new();
        let walker = WalkDir::new(gt_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(|source| EvalError::DirectoryReadFailed {
                path: gt_dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || !has_supported_extension(path) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                log::warn!("skipping file with a non UTF-8 name: {}", path.display());
                continue;
            };

            let prediction = find_image(pred_dir, &format!("{stem}{prediction_suffix}"));
            let reference_edges = find_image(edge_dir, &format!("{stem}{edge_suffix}"));
            match (prediction, reference_edges) {
                (Some(prediction), Some(reference_edges)) => samples.push(SamplePaths {
                    name: stem.to_owned(),
                    ground_truth: path.to_path_buf(),
                    prediction,
                    reference_edges,
                }),
                (None, _) => log::warn!("no prediction found for {}", path.display()),
                (_, None) => log::warn!("no reference edges found for {}", path.display()),
            }
        }

        if samples.is_empty() {
            return Err(EvalError::NoSamples {
                path: gt_dir.to_path_buf(),
            });
        }
        log::info!("found {} samples in {}", samples.len(), gt_dir.display());
        Ok(Self { samples })
    }

    pub fn from_samples(samples: Vec<SamplePaths>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[SamplePaths] {
        &self.samples
    }

    pub fn get(&self, index: usize) -> Option<&SamplePaths> {
        self.samples.get(index)
    }
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}

fn find_image(dir: &Path, stem: &str) -> Option<PathBuf> {
    SUPPORTED_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|candidate| candidate.is_file())
}
