//! Depth Evaluation CLI
//!
//! Scores predicted depth maps against ground truth with the global, depth
//! boundary and directed depth error metrics.
//!
//! ## Usage
//!
//! ```bash
//! # Evaluate a prediction directory
//! depth-eval evaluate --gt-dir gt/ --pred-dir pred/ --edge-dir edges/ --output results/
//!
//! # Override settings from a config file
//! depth-eval evaluate --gt-dir gt/ --pred-dir pred/ --edge-dir edges/ --config evaluation.json --jobs 4
//!
//! # Write the default configuration
//! depth-eval config --output evaluation.json
//! ```

use std::{path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use depth_eval::{format_summary, write_report, EvaluationConfig, EvaluationDataset, Evaluator};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate predictions against ground truth
    Evaluate(EvaluateArgs),
    /// Write the default configuration as JSON
    Config {
        /// Output file
        #[arg(short, long, default_value = "evaluation.json")]
        output: PathBuf,
    },
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Directory of ground-truth depth images
    #[arg(long)]
    gt_dir: PathBuf,

    /// Directory of predicted depth images
    #[arg(long)]
    pred_dir: PathBuf,

    /// Directory of reference edge maps
    #[arg(long)]
    edge_dir: PathBuf,

    /// Output directory for the summary and per-sample results
    #[arg(short, long, default_value = "results")]
    output: PathBuf,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of worker threads
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Save the predicted edge map of every sample
    #[arg(long)]
    save_edges: bool,

    /// Save the ground truth and masked prediction of every sample
    #[arg(long)]
    save_depth_maps: bool,

    /// Metres per raw pixel value
    #[arg(long)]
    depth_scale: Option<f32>,

    /// Label for the summary file (testing_<mode>.txt)
    #[arg(long)]
    mode: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Evaluate(args) => evaluate(args),
        Command::Config { output } => {
            EvaluationConfig::default()
                .save(&output)
                .with_context(|| format!("Failed to write config file: {}", output.display()))?;
            println!("Default configuration written to {}", output.display());
            Ok(())
        }
    }
}

fn evaluate(args: EvaluateArgs) -> Result<()> {
    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        EvaluationConfig::load(config_path)
            .with_context(|| format!("Failed to load config file: {}", config_path.display()))?
    } else {
        EvaluationConfig::default()
    };

    // Apply command line overrides
    if let Some(jobs) = args.jobs {
        config.jobs = jobs;
    }
    if let Some(depth_scale) = args.depth_scale {
        config.depth_scale = depth_scale;
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    config.save_edges |= args.save_edges;
    config.save_depth_maps |= args.save_depth_maps;

    if !(config.depth_scale.is_finite() && config.depth_scale > 0.0) {
        anyhow::bail!("Depth scale must be positive, got {}", config.depth_scale);
    }

    let dataset = EvaluationDataset::discover_with_suffixes(
        &args.gt_dir,
        &args.pred_dir,
        &args.edge_dir,
        &config.prediction_suffix,
        &config.edge_suffix,
    )
    .with_context(|| format!("Failed to collect samples from {}", args.gt_dir.display()))?;
    println!(
        "Evaluating {} samples with {} worker(s)",
        dataset.len(),
        config.jobs.max(1)
    );

    let start = Instant::now();
    let evaluator = Evaluator::new(config);
    let report = evaluator
        .run(&dataset, Some(args.output.as_path()))
        .context("Evaluation failed")?;
    let (summary_path, records_path) =
        write_report(&report, &args.output).context("Failed to write results")?;

    print!("{}", format_summary(&report.mean()));
    if !report.failed.is_empty() {
        println!(
            "{} of {} samples failed and were excluded",
            report.failed.len(),
            dataset.len()
        );
    }
    println!(
        "Finished in {:.2?}; summary at {}, per-sample metrics at {}",
        start.elapsed(),
        summary_path.display(),
        records_path.display()
    );
    Ok(())
}
