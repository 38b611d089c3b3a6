//! Configuration of an evaluation run.
//!
//! The configuration is a JSON document; top-level fields may be omitted and
//! fall back to [`EvaluationConfig::default`]. Command line flags override
//! values loaded from a file.

use std::{fs, path::Path};

use depth_metrics::SampleEvaluationConfig;
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};

/// Configuration for a dataset evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Metres per raw pixel value of ground-truth and prediction images.
    pub depth_scale: f32,
    /// Label used in the summary file name (`testing_<mode>.txt`).
    pub mode: String,
    /// Worker threads; `1` evaluates sequentially.
    pub jobs: usize,
    /// Whether to write `NNNN_edges.png` for every sample.
    pub save_edges: bool,
    /// Whether to write `NNNN_gt.png` and `NNNN_refine.png` for every sample.
    pub save_depth_maps: bool,
    /// Appended to the ground-truth stem to find the prediction file.
    pub prediction_suffix: String,
    /// Appended to the ground-truth stem to find the reference edge file.
    pub edge_suffix: String,
    /// Metric parameters.
    pub metrics: SampleEvaluationConfig,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            depth_scale: 1e-3,
            mode: "pred".to_owned(),
            jobs: 1,
            save_edges: false,
            save_depth_maps: false,
            prediction_suffix: String::new(),
            edge_suffix: String::new(),
            metrics: SampleEvaluationConfig::new(),
        }
    }
}

impl EvaluationConfig {
    /// Reads a configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> EvalResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| EvalError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| EvalError::ConfigParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes the configuration as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> EvalResult<()> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self).map_err(|source| {
            EvalError::SerializeFailed {
                what: "configuration",
                source,
            }
        })?;
        fs::write(path, text).map_err(|source| EvalError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use depth_metrics::DirectedErrorMode;

    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config: EvaluationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.mode, "pred");
        assert_eq!(config.jobs, 1);
        assert!(!config.save_depth_maps);
        assert_eq!(config.metrics.directed.threshold, 3.0);
        assert_eq!(config.metrics.boundary.max_distance, 10.0);
    }

    #[test]
    fn metric_settings_are_read_from_json() {
        let mut value = serde_json::to_value(EvaluationConfig::default()).unwrap();
        value["depth_scale"] = serde_json::json!(0.5);
        value["metrics"]["directed"]["threshold"] = serde_json::json!(2.0);
        value["metrics"]["directed"]["mode"] = "DepthPlane".into();

        let config: EvaluationConfig = serde_json::from_value(value).unwrap();
        assert_eq!(config.depth_scale, 0.5);
        assert_eq!(config.metrics.directed.threshold, 2.0);
        assert_eq!(config.metrics.directed.mode, DirectedErrorMode::DepthPlane);
        assert_eq!(config.metrics.boundary.edge_threshold, 0.1);
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = std::env::temp_dir().join(format!("depth-eval-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("evaluation.json");

        let mut config = EvaluationConfig::default();
        config.jobs = 4;
        config.edge_suffix = "_edges".to_owned();
        config.save_depth_maps = true;
        config.save(&path).unwrap();

        let loaded = EvaluationConfig::load(&path).unwrap();
        assert_eq!(loaded.jobs, 4);
        assert_eq!(loaded.edge_suffix, "_edges");
        assert!(loaded.save_depth_maps);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn malformed_config_is_reported() {
        let dir = std::env::temp_dir().join(format!("depth-eval-badcfg-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            EvaluationConfig::load(&path),
            Err(EvalError::ConfigParseFailed { .. })
        ));
        fs::remove_dir_all(&dir).ok();
    }
}
