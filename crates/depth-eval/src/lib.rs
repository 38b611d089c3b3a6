//! # Depth Evaluation Driver
//!
//! Evaluates a directory of predicted depth maps against ground truth and
//! reference edge maps, and writes the dataset summary.
//!
//! ## Usage
//!
//! ```bash
//! # Evaluate predictions
//! cargo run --bin depth-eval -- evaluate --gt-dir gt/ --pred-dir pred/ --edge-dir edges/ --output results/
//!
//! # Evaluate in parallel and keep the predicted edge maps
//! cargo run --bin depth-eval -- evaluate --gt-dir gt/ --pred-dir pred/ --edge-dir edges/ --jobs 8 --save-edges
//!
//! # Also keep the scored ground truth and prediction as 16-bit PNGs
//! cargo run --bin depth-eval -- evaluate --gt-dir gt/ --pred-dir pred/ --edge-dir edges/ --save-depth-maps
//!
//! # Write the default configuration
//! cargo run --bin depth-eval -- config --output evaluation.json
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluator;
pub mod report;

pub use config::EvaluationConfig;
pub use dataset::{EvaluationDataset, SamplePaths};
pub use error::{EvalError, EvalResult};
pub use evaluator::{depth_dump_paths, edge_dump_path, EvaluationReport, Evaluator};
pub use report::{format_summary, summary_path, write_report};
