use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use tsad_eval::{
    anomaly_segments, compute_binary_metrics, to_binary, BinaryMetrics, QuantileThreshold,
};
use tsad_io::{
    prepare_method_ready, write_json, ColumnReader, DataLayout, DatasetName, DatasetWriter,
    ExportConfig, MetricsLog, MetricsRow, RawSeriesReader, UcrMetadata, Variant,
};
use tsad_prep::{clean, CleanReport, LabelMode, Series, WindowConfig};

#[derive(Parser)]
#[command(name = "tsad")]
#[command(about = "Cleaning, scaling, windowing, and scoring for univariate anomaly detection")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for train-window subsampling
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel dataset processing (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Root directory for prepared datasets
    #[arg(long, default_value = "data", global = true)]
    data_dir: PathBuf,

    /// Root directory for evaluation results
    #[arg(long, default_value = "results", global = true)]
    results_dir: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Sanitize raw UCR series and write cleaned.csv + metadata.json
    Clean {
        /// Raw UCR files named ID_UCR_Anomaly_Name_TrainEnd_AnomStart_AnomEnd.txt
        #[arg(long, num_args = 1.., required = true)]
        raw: Vec<PathBuf>,
    },

    /// Clean, split, scale, and window raw UCR series into method-ready files
    Prepare {
        /// Raw UCR files named ID_UCR_Anomaly_Name_TrainEnd_AnomStart_AnomEnd.txt
        #[arg(long, num_args = 1.., required = true)]
        raw: Vec<PathBuf>,

        /// Window length in samples
        #[arg(long, default_value_t = 128)]
        window_size: usize,

        /// Offset between consecutive window starts
        #[arg(long, default_value_t = 4)]
        stride: usize,

        /// Window label rule: "any" or "majority"
        #[arg(long, default_value = "any")]
        label_mode: String,

        /// Cap on train windows kept per dataset (0 keeps every window)
        #[arg(long, default_value_t = 20_000)]
        max_train_windows: usize,

        /// Exported variants: raw, z, robust
        #[arg(long, value_delimiter = ',', default_value = "raw,z,robust")]
        variants: Vec<String>,
    },

    /// Score predicted labels (or thresholded scores) against ground truth
    Evaluate {
        /// CSV holding ground-truth point labels
        #[arg(long)]
        truth: PathBuf,

        /// Column of the truth CSV (defaults to the first)
        #[arg(long)]
        truth_column: Option<String>,

        /// CSV holding predicted labels, or scores when --quantile is set
        #[arg(long)]
        pred: PathBuf,

        /// Column of the prediction CSV (defaults to the first)
        #[arg(long)]
        pred_column: Option<String>,

        /// Threshold scores at this quantile of --train-scores
        #[arg(long, requires = "train_scores")]
        quantile: Option<f64>,

        /// CSV of scores on normal training data, used to fit the threshold
        #[arg(long, requires = "quantile")]
        train_scores: Option<PathBuf>,

        /// Detector name (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        method: String,

        /// Dataset name (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        dataset: String,

        /// Metrics CSV to append to (defaults to <results-dir>/<method>/metrics.csv)
        #[arg(long)]
        results: Option<PathBuf>,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct CleanOutput {
    dataset: String,
    length: usize,
    train_end: usize,
    anomaly_start: usize,
    anomaly_end: usize,
    cleaning: CleanReport,
}

#[derive(Serialize)]
struct PrepareOutput {
    dataset: String,
    length: usize,
    train_len: usize,
    test_len: usize,
    n_train_windows: usize,
    n_test_windows: usize,
    n_test_anomalous_windows: usize,
    cleaning: CleanReport,
}

#[derive(Serialize)]
struct EvaluateOutput {
    method: String,
    dataset: String,
    threshold: Option<f64>,
    n_predicted_segments: usize,
    metrics: BinaryMetrics,
}

/// A raw file after reading, boundary parsing, and cleaning.
struct CleanedInput {
    dataset: DatasetName,
    metadata: UcrMetadata,
    series: Series,
    labels: Vec<u8>,
    report: CleanReport,
}

fn load_and_clean(path: &Path) -> Result<CleanedInput> {
    let dataset = DatasetName::from_path(path)?;
    let metadata = UcrMetadata::from_path(path)?;
    let raw = RawSeriesReader::new(path)
        .read()
        .with_context(|| format!("failed to read {}", path.display()))?;
    let (series, report) =
        clean(&raw).with_context(|| format!("failed to clean {}", path.display()))?;
    if metadata.anomaly_end > series.len() {
        warn!(
            dataset = %dataset,
            anomaly_end = metadata.anomaly_end,
            len = series.len(),
            "anomaly interval extends past the series, clipping"
        );
    }
    let labels = metadata.point_labels(series.len());
    Ok(CleanedInput {
        dataset,
        metadata,
        series,
        labels,
        report,
    })
}

fn run_clean(layout: &DataLayout, path: &Path) -> Result<CleanOutput> {
    let input = load_and_clean(path)?;
    DatasetWriter::new(layout, input.dataset.clone()).write_cleaned(
        &input.series,
        &input.labels,
        &input.metadata,
        &input.report,
    )?;
    Ok(CleanOutput {
        dataset: input.dataset.to_string(),
        length: input.series.len(),
        train_end: input.metadata.train_end,
        anomaly_start: input.metadata.anomaly_start,
        anomaly_end: input.metadata.anomaly_end,
        cleaning: input.report,
    })
}

fn run_prepare(
    layout: &DataLayout,
    path: &Path,
    window: &WindowConfig,
    export: &ExportConfig,
) -> Result<PrepareOutput> {
    let input = load_and_clean(path)?;
    let writer = DatasetWriter::new(layout, input.dataset.clone());
    writer.write_cleaned(&input.series, &input.labels, &input.metadata, &input.report)?;

    let bundle = prepare_method_ready(
        &input.series,
        &input.labels,
        input.metadata.train_end,
        window,
        export,
    )
    .with_context(|| format!("failed to prepare {}", input.dataset))?;
    writer.write_method_ready(&bundle)?;

    let summary = bundle.summary();
    Ok(PrepareOutput {
        dataset: input.dataset.to_string(),
        length: input.series.len(),
        train_len: summary.train_len,
        test_len: summary.test_len,
        n_train_windows: summary.n_train_windows,
        n_test_windows: summary.n_test_windows,
        n_test_anomalous_windows: summary.n_test_anomalous_windows,
        cleaning: input.report,
    })
}

fn read_column(path: &Path, column: Option<String>) -> Result<Vec<f64>> {
    let reader = match column {
        Some(name) => ColumnReader::new(path).with_column(name),
        None => ColumnReader::new(path),
    };
    reader
        .read()
        .with_context(|| format!("failed to read {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to encode summary")?;
    println!("{json}");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    let layout = DataLayout::new(&cli.data_dir, &cli.results_dir);

    match cli.command {
        Command::Clean { raw } => {
            let outputs = raw
                .par_iter()
                .map(|path| run_clean(&layout, path))
                .collect::<Result<Vec<_>>>()?;
            info!(n_datasets = outputs.len(), "cleaning complete");
            print_json(&outputs)?;
        }

        Command::Prepare {
            raw,
            window_size,
            stride,
            label_mode,
            max_train_windows,
            variants,
        } => {
            let mode: LabelMode = label_mode.parse()?;
            let window = WindowConfig::new(window_size, stride)?.with_mode(mode);
            let variants = variants
                .iter()
                .map(|v| v.trim().parse::<Variant>())
                .collect::<Result<Vec<_>, _>>()?;
            let export = ExportConfig::new()
                .with_variants(&variants)
                .with_max_train_windows((max_train_windows > 0).then_some(max_train_windows))
                .with_seed(cli.seed);

            let outputs = raw
                .par_iter()
                .map(|path| run_prepare(&layout, path, &window, &export))
                .collect::<Result<Vec<_>>>()?;
            info!(n_datasets = outputs.len(), "preparation complete");
            print_json(&outputs)?;
        }

        Command::Evaluate {
            truth,
            truth_column,
            pred,
            pred_column,
            quantile,
            train_scores,
            method,
            dataset,
            results,
        } => {
            let method_name = DatasetName::new(method.clone())?;
            let dataset_name = DatasetName::new(dataset.clone())?;

            let y_true = read_column(&truth, truth_column)?;
            let pred_values = read_column(&pred, pred_column)?;

            // predictions are coerced only over the prefix aligned with the truth
            let (metrics, y_pred, threshold) = match (quantile, train_scores) {
                (Some(q), Some(train_path)) => {
                    let calibration = read_column(&train_path, None)?;
                    let threshold = QuantileThreshold::fit(&calibration, q)
                        .context("failed to fit score threshold")?;
                    info!(quantile = q, threshold = threshold.threshold, "threshold fitted");
                    let labels = threshold.apply(&pred_values);
                    let metrics =
                        compute_binary_metrics(&y_true, &labels).context("scoring failed")?;
                    (metrics, labels, Some(threshold.threshold))
                }
                _ => {
                    let metrics = compute_binary_metrics(&y_true, &pred_values)
                        .context("predictions are not binary labels")?;
                    let labels = to_binary(&pred_values[..metrics.eval_len])?;
                    (metrics, labels, None)
                }
            };

            let log_path = results.unwrap_or_else(|| {
                layout
                    .results_dir(&method_name, None)
                    .join("metrics.csv")
            });
            MetricsLog::new(&log_path).append(&MetricsRow::new(&method, &dataset, &metrics))?;
            write_json(
                &layout
                    .results_dir(&method_name, Some(&dataset_name))
                    .join("metrics.json"),
                &metrics,
            )?;
            info!(path = %log_path.display(), f1 = metrics.f1, "metrics recorded");

            print_json(&EvaluateOutput {
                method,
                dataset,
                threshold,
                n_predicted_segments: anomaly_segments(&y_pred[..metrics.eval_len]).len(),
                metrics,
            })?;
        }
    }

    Ok(())
}
