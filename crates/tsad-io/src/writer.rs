//! CSV and JSON writers for cleaned datasets, method-ready bundles, and metrics.

use std::fmt::Display;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use tsad_eval::BinaryMetrics;
use tsad_prep::{CleanReport, Series};

use crate::domain::{DatasetName, UcrMetadata};
use crate::layout::DataLayout;
use crate::pipeline::MethodReady;
use crate::reader::CleanedRow;
use crate::IoError;

/// Writes the artifacts of one dataset under a [`DataLayout`].
///
/// ```text
/// <dataset>/cleaned/cleaned.csv
/// <dataset>/cleaned/metadata.json
/// <dataset>/method_ready/{train,test}_<variant>.csv
/// <dataset>/method_ready/{train,test}_win_starts.csv
/// <dataset>/method_ready/{train,test}_win_labels.csv
/// <dataset>/method_ready/method_ready_metadata.json
/// ```
pub struct DatasetWriter {
    layout: DataLayout,
    dataset: DatasetName,
}

#[derive(Serialize)]
struct CleanedMetadata<'a> {
    dataset: &'a str,
    #[serde(flatten)]
    ucr: &'a UcrMetadata,
    length: usize,
    n_anomalous_points: usize,
    cleaning: &'a CleanReport,
}

impl DatasetWriter {
    pub fn new(layout: &DataLayout, dataset: DatasetName) -> Self {
        Self {
            layout: layout.clone(),
            dataset,
        }
    }

    /// Dataset this writer targets.
    pub fn dataset(&self) -> &DatasetName {
        &self.dataset
    }

    /// Write `cleaned.csv` (`value,is_anomaly`) and `metadata.json`.
    /// Returns the `cleaned` directory.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::LengthMismatch`] | `labels.len() != series.len()` |
    /// | [`IoError::OutputDirCreate`] | Directory cannot be created |
    /// | [`IoError::CsvWrite`] / [`IoError::WriteFile`] | A file cannot be written |
    #[instrument(skip_all, fields(dataset = %self.dataset, len = series.len()))]
    pub fn write_cleaned(
        &self,
        series: &Series,
        labels: &[u8],
        metadata: &UcrMetadata,
        report: &CleanReport,
    ) -> Result<PathBuf, IoError> {
        if labels.len() != series.len() {
            return Err(IoError::LengthMismatch {
                series_len: series.len(),
                labels_len: labels.len(),
            });
        }
        let dir = DataLayout::ensure(self.layout.cleaned_dir(&self.dataset))?;

        let csv_path = dir.join("cleaned.csv");
        let mut wtr = csv::Writer::from_path(&csv_path).map_err(|e| IoError::CsvWrite {
            path: csv_path.clone(),
            source: e,
        })?;
        for (&value, &is_anomaly) in series.as_slice().iter().zip(labels) {
            wtr.serialize(CleanedRow { value, is_anomaly })
                .map_err(|e| IoError::CsvWrite {
                    path: csv_path.clone(),
                    source: e,
                })?;
        }
        wtr.flush().map_err(|e| IoError::WriteFile {
            path: csv_path.clone(),
            source: e,
        })?;

        let meta = CleanedMetadata {
            dataset: self.dataset.as_str(),
            ucr: metadata,
            length: series.len(),
            n_anomalous_points: labels.iter().filter(|&&l| l != 0).count(),
            cleaning: report,
        };
        write_json(&dir.join("metadata.json"), &meta)?;

        info!(dir = %dir.display(), "cleaned dataset written");
        Ok(dir)
    }

    /// Write every file of a method-ready bundle. Returns the `method_ready`
    /// directory.
    ///
    /// Per-variant files hold the full scaled segment; window contents are
    /// recovered from the segment and the `*_win_starts.csv` offsets.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::OutputDirCreate`] | Directory cannot be created |
    /// | [`IoError::CsvWrite`] / [`IoError::WriteFile`] | A file cannot be written |
    #[instrument(skip_all, fields(dataset = %self.dataset, n_variants = bundle.variants.len()))]
    pub fn write_method_ready(&self, bundle: &MethodReady) -> Result<PathBuf, IoError> {
        let dir = DataLayout::ensure(self.layout.method_ready_dir(&self.dataset))?;

        for split in &bundle.variants {
            let name = split.variant.name();
            write_column(
                &dir.join(format!("train_{name}.csv")),
                "value",
                split.train.as_slice(),
            )?;
            write_column(
                &dir.join(format!("test_{name}.csv")),
                "value",
                split.test.as_slice(),
            )?;
            debug!(variant = name, "variant written");
        }
        write_column(
            &dir.join("train_win_starts.csv"),
            "start",
            &bundle.train_win_starts,
        )?;
        write_column(
            &dir.join("test_win_starts.csv"),
            "start",
            &bundle.test_win_starts,
        )?;
        write_column(
            &dir.join("train_win_labels.csv"),
            "label",
            &bundle.train_win_labels,
        )?;
        write_column(
            &dir.join("test_win_labels.csv"),
            "label",
            &bundle.test_win_labels,
        )?;
        write_json(&dir.join("method_ready_metadata.json"), &bundle.summary())?;

        info!(dir = %dir.display(), "method-ready bundle written");
        Ok(dir)
    }
}

/// Write a single-column CSV with a header.
fn write_column<T: Display>(path: &Path, header: &str, values: &[T]) -> Result<(), IoError> {
    let csv_err = |e: csv::Error| IoError::CsvWrite {
        path: path.to_path_buf(),
        source: e,
    };
    let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
    wtr.write_record([header]).map_err(csv_err)?;
    for v in values {
        wtr.write_record([v.to_string()]).map_err(csv_err)?;
    }
    wtr.flush().map_err(|e| IoError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Serialize `value` as pretty JSON to `path`, creating parent directories.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::OutputDirCreate`] | Parent directory cannot be created |
/// | [`IoError::Json`] | Serialization fails |
/// | [`IoError::WriteFile`] | File cannot be written |
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), IoError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        DataLayout::ensure(parent.to_path_buf())?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|e| IoError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    fs::write(path, json).map_err(|e| IoError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })
}

/// One line of a metrics log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRow {
    pub method: String,
    pub dataset: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub accuracy: f64,
    pub tn: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
    pub tp: usize,
    pub eval_len: usize,
}

impl MetricsRow {
    /// Tag `metrics` with the detector and dataset they belong to.
    pub fn new(method: &str, dataset: &str, metrics: &BinaryMetrics) -> Self {
        Self {
            method: method.to_string(),
            dataset: dataset.to_string(),
            precision: metrics.precision,
            recall: metrics.recall,
            f1: metrics.f1,
            accuracy: metrics.accuracy,
            tn: metrics.tn,
            fp: metrics.fp,
            fn_: metrics.fn_,
            tp: metrics.tp,
            eval_len: metrics.eval_len,
        }
    }
}

/// Append-only CSV of [`MetricsRow`]s, one per evaluated run.
///
/// The header is written only when the file is created (or is empty), so
/// repeated runs accumulate rows under a single header.
pub struct MetricsLog {
    path: PathBuf,
}

impl MetricsLog {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row, creating the file and its parent directories if needed.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::OutputDirCreate`] | Parent directory cannot be created |
    /// | [`IoError::WriteFile`] | File cannot be opened or flushed |
    /// | [`IoError::CsvWrite`] | Record cannot be encoded |
    #[instrument(skip_all, fields(path = %self.path.display(), method = %row.method, dataset = %row.dataset))]
    pub fn append(&self, row: &MetricsRow) -> Result<(), IoError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            DataLayout::ensure(parent.to_path_buf())?;
        }
        let write_header = fs::metadata(&self.path).map_or(true, |m| m.len() == 0);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| IoError::WriteFile {
                path: self.path.clone(),
                source: e,
            })?;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        wtr.serialize(row).map_err(|e| IoError::CsvWrite {
            path: self.path.clone(),
            source: e,
        })?;
        wtr.flush().map_err(|e| IoError::WriteFile {
            path: self.path.clone(),
            source: e,
        })?;

        debug!(write_header, "metrics row appended");
        Ok(())
    }

    /// Read every row back.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
    /// | [`IoError::CsvParse`] | Malformed record |
    pub fn read_all(&self) -> Result<Vec<MetricsRow>, IoError> {
        let file = fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;
        csv::Reader::from_reader(file)
            .deserialize()
            .map(|r| {
                r.map_err(|e| IoError::CsvParse {
                    path: self.path.clone(),
                    source: e,
                })
            })
            .collect()
    }
}
