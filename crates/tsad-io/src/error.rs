//! I/O error types for tsad-io.

use std::path::PathBuf;

use tsad_prep::{ConfigError, DataQualityError, ScalerError};

/// Errors from file parsing, dataset preparation, and result serialization.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a token in a raw series file is not a number.
    #[error("cannot parse \"{raw}\" as a number in {path} at line {line}")]
    Parse {
        /// Path to the file.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// The offending token.
        raw: String,
    },

    /// Returned when a file holds no data values.
    #[error("empty dataset (no values) in {path}")]
    EmptyDataset {
        /// Path to the file.
        path: PathBuf,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when a requested CSV column is absent.
    #[error("column \"{column}\" not found in {path}")]
    MissingColumn {
        /// Path to the CSV file.
        path: PathBuf,
        /// The missing column name.
        column: String,
    },

    /// Returned when a UCR file name does not end in `_<train_end>_<start>_<end>`.
    #[error("cannot parse UCR boundaries from file name \"{name}\"")]
    InvalidFilename {
        /// The rejected file name.
        name: String,
    },

    /// Returned when the parsed anomaly interval ends before it starts.
    #[error("anomaly interval in \"{name}\" ends at {end} before it starts at {start}")]
    InvalidBoundaries {
        /// The file name the boundaries came from.
        name: String,
        /// Parsed anomaly start.
        start: usize,
        /// Parsed anomaly end.
        end: usize,
    },

    /// Returned when a dataset name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid dataset name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidDatasetName {
        /// The invalid name.
        name: String,
    },

    /// Returned when an export variant name is not recognized.
    #[error("unknown export variant \"{name}\" (expected raw, z, or robust)")]
    UnknownVariant {
        /// The unrecognized name.
        name: String,
    },

    /// Returned when a series and its point labels differ in length.
    #[error("series has {series_len} values but {labels_len} labels")]
    LengthMismatch {
        /// Number of series values.
        series_len: usize,
        /// Number of point labels.
        labels_len: usize,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a CSV record cannot be written.
    #[error("cannot write CSV record to {path}")]
    CsvWrite {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when a JSON artifact cannot be encoded.
    #[error("cannot encode JSON for {path}")]
    Json {
        /// Path the artifact was destined for.
        path: PathBuf,
        /// Underlying serde_json error.
        source: serde_json::Error,
    },

    /// Wraps a sanitation or series validation failure.
    #[error(transparent)]
    DataQuality(#[from] DataQualityError),

    /// Wraps a scaler failure.
    #[error(transparent)]
    Scaler(#[from] ScalerError),

    /// Wraps an invalid windowing configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
