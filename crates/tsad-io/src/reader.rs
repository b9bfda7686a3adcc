//! Readers for raw UCR series files, cleaned datasets, and label/score columns.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use tsad_prep::Series;

use crate::IoError;

/// Reads a raw single-channel series from a text file.
///
/// Values may be separated by newlines, spaces, tabs, or commas, with any
/// number per line. `NaN`, `inf`, and `-inf` tokens are kept so the
/// sanitizer can count and repair them.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::Parse`] | A token is not a number |
/// | [`IoError::EmptyDataset`] | The file holds no values |
pub struct RawSeriesReader {
    path: PathBuf,
}

impl RawSeriesReader {
    /// Create a new reader for the given file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read every numeric token in file order.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Vec<f64>, IoError> {
        let content = fs::read_to_string(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        let mut values = Vec::new();
        for (line_index, line) in content.lines().enumerate() {
            let tokens = line
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|t| !t.is_empty());
            for raw in tokens {
                let value: f64 = raw.parse().map_err(|_| IoError::Parse {
                    path: self.path.clone(),
                    line: line_index + 1,
                    raw: raw.to_string(),
                })?;
                values.push(value);
            }
        }

        if values.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }
        info!(n_values = values.len(), "raw series loaded");
        Ok(values)
    }
}

/// One row of `cleaned.csv`.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CleanedRow {
    pub(crate) value: f64,
    pub(crate) is_anomaly: u8,
}

/// A cleaned series with its point labels.
#[derive(Debug)]
pub struct CleanedDataset {
    /// Sanitized values.
    pub series: Series,
    /// Point labels, same length as `series`.
    pub labels: Vec<u8>,
}

/// Reads a `cleaned.csv` file (`value,is_anomaly`) written by
/// [`DatasetWriter::write_cleaned`](crate::DatasetWriter::write_cleaned).
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed record or missing column |
/// | [`IoError::DataQuality`] | A value is not finite |
pub struct CleanedReader {
    path: PathBuf,
}

impl CleanedReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the file.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<CleanedDataset, IoError> {
        let file = fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;
        let mut rdr = csv::Reader::from_reader(file);

        let mut values = Vec::new();
        let mut labels = Vec::new();
        for result in rdr.deserialize::<CleanedRow>() {
            let row = result.map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                source: e,
            })?;
            values.push(row.value);
            labels.push(row.is_anomaly);
        }

        let series = Series::new(values)?;
        info!(n_values = series.len(), "cleaned dataset loaded");
        Ok(CleanedDataset { series, labels })
    }
}

/// Reads one numeric column from a CSV file with a header row.
///
/// Used for ground-truth labels, predicted labels, and detector scores.
/// Defaults to the first column; [`with_column`](Self::with_column) selects
/// by header name.
pub struct ColumnReader {
    path: PathBuf,
    column: Option<String>,
}

impl ColumnReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            column: None,
        }
    }

    /// Select a column by header name.
    #[must_use]
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Read the selected column as floating-point values.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
    /// | [`IoError::CsvParse`] | Malformed record |
    /// | [`IoError::MissingColumn`] | Named column absent, or the file has no columns |
    /// | [`IoError::Parse`] | A cell is not a number |
    #[instrument(skip(self), fields(path = %self.path.display(), column = ?self.column))]
    pub fn read(&self) -> Result<Vec<f64>, IoError> {
        let file = fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;
        let mut rdr = csv::Reader::from_reader(file);
        let csv_err = |e: csv::Error| IoError::CsvParse {
            path: self.path.clone(),
            source: e,
        };

        let header = rdr.headers().map_err(csv_err)?;
        let index = match &self.column {
            Some(name) => header.iter().position(|h| h == name),
            None => (!header.is_empty()).then_some(0),
        }
        .ok_or_else(|| IoError::MissingColumn {
            path: self.path.clone(),
            column: self.column.clone().unwrap_or_default(),
        })?;
        debug!(index, "column resolved");

        let mut values = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(csv_err)?;
            let raw = record.get(index).unwrap_or("").trim();
            let value: f64 = raw.parse().map_err(|_| IoError::Parse {
                path: self.path.clone(),
                // header is line 1
                line: row_index + 2,
                raw: raw.to_string(),
            })?;
            values.push(value);
        }
        info!(n_values = values.len(), "column loaded");
        Ok(values)
    }
}
