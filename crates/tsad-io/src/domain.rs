//! Domain types for tsad-io.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tsad_prep::ScalerKind;

use crate::IoError;

/// A validated dataset name used for directory naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetName(String);

impl DatasetName {
    /// Parse and validate a dataset name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidDatasetName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidDatasetName { name });
        }
        Ok(Self(name))
    }

    /// Derive a name from a file's stem, e.g. `001_UCR_Anomaly_gait_10_20_30`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidDatasetName`] if the stem is missing or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(stem)
    }

    /// Return the dataset name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split boundaries encoded in a UCR anomaly archive file name.
///
/// File names follow `ID_UCR_Anomaly_Name_TrainEnd_AnomStart_AnomEnd.txt`;
/// only the last three underscore-separated fields are interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UcrMetadata {
    /// File name the metadata was parsed from.
    pub source_file: String,
    /// Index where the test segment begins.
    pub train_end: usize,
    /// First anomalous index.
    pub anomaly_start: usize,
    /// One past the last anomalous index.
    pub anomaly_end: usize,
}

impl UcrMetadata {
    /// Parse the boundaries from the final component of `path`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::InvalidFilename`] | Fewer than three trailing integer fields |
    /// | [`IoError::InvalidBoundaries`] | `anomaly_end < anomaly_start` |
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        let source_file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let invalid = || IoError::InvalidFilename {
            name: source_file.clone(),
        };

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(invalid)?;
        let mut fields = stem.rsplit('_').map(str::parse::<usize>);
        let mut next = || fields.next().and_then(Result::ok).ok_or_else(invalid);
        let anomaly_end = next()?;
        let anomaly_start = next()?;
        let train_end = next()?;

        if anomaly_end < anomaly_start {
            return Err(IoError::InvalidBoundaries {
                name: source_file,
                start: anomaly_start,
                end: anomaly_end,
            });
        }
        Ok(Self {
            source_file,
            train_end,
            anomaly_start,
            anomaly_end,
        })
    }

    /// Point labels for a series of length `len`: 1 on
    /// `[anomaly_start, anomaly_end)`, clipped to the series, else 0.
    #[must_use]
    pub fn point_labels(&self, len: usize) -> Vec<u8> {
        let start = self.anomaly_start.min(len);
        let end = self.anomaly_end.min(len);
        let mut labels = vec![0u8; len];
        labels[start..end].fill(1);
        labels
    }
}

/// Which representation of the cleaned series is exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Cleaned values, unscaled.
    Raw,
    /// Standard-scaled (mean/std fitted on train).
    Z,
    /// Robust-scaled (median/IQR fitted on train).
    Robust,
}

impl Variant {
    /// All variants in export order.
    pub const ALL: [Variant; 3] = [Variant::Raw, Variant::Z, Variant::Robust];

    /// Lowercase name used in file names.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Z => "z",
            Self::Robust => "robust",
        }
    }

    /// Scaler fitted for this variant, or `None` for raw values.
    #[must_use]
    pub fn scaler_kind(self) -> Option<ScalerKind> {
        match self {
            Self::Raw => None,
            Self::Z => Some(ScalerKind::Standard),
            Self::Robust => Some(ScalerKind::Robust),
        }
    }
}

impl FromStr for Variant {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(Self::Raw),
            "z" => Ok(Self::Z),
            "robust" => Ok(Self::Robust),
            other => Err(IoError::UnknownVariant {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
