//! Error types for dataset discovery, configuration and report writing.

use std::path::PathBuf;

use depth_util::GridError;
use thiserror::Error;

/// Errors that abort an evaluation run.
///
/// A single sample that fails to load is not one of them; it is logged and
/// recorded with undefined metrics.
#[derive(Debug, Error)]
pub enum EvalError {
    /// An input directory does not exist.
    #[error("Directory not found: {path}")]
    DirectoryNotFound {
        /// The missing directory.
        path: PathBuf,
    },

    /// Walking an input directory failed.
    #[error("Failed to read directory: {path}")]
    DirectoryReadFailed {
        /// The directory being walked.
        path: PathBuf,
        /// The underlying walk error.
        #[source]
        source: walkdir::Error,
    },

    /// No ground-truth file had both a prediction and a reference edge map.
    #[error("No complete ground truth/prediction/edge triples found in: {path}")]
    NoSamples {
        /// The ground-truth directory.
        path: PathBuf,
    },

    /// A configuration or report file could not be read or written.
    #[error("I/O error on {path}")]
    Io {
        /// The file involved.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid JSON for [`EvaluationConfig`](crate::EvaluationConfig).
    #[error("Failed to parse config file: {path}")]
    ConfigParseFailed {
        /// The configuration file.
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serialising a configuration or report failed.
    #[error("Failed to serialize {what}")]
    SerializeFailed {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Writing a per-sample edge or depth image failed.
    #[error("Failed to write sample image")]
    DumpWriteFailed {
        #[source]
        source: GridError,
    },

    /// The worker pool for parallel evaluation could not be created.
    #[error("Failed to build a pool of {jobs} worker threads")]
    ThreadPoolFailed {
        jobs: usize,
        #[source]
        source: rayon::ThreadPoolBuildError,
    },
}

/// A specialized `Result` type for evaluation runs.
pub type EvalResult<T> = Result<T, EvalError>;
