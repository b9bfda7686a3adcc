//! On-disk directory layout for prepared datasets and results.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::DatasetName;
use crate::IoError;

/// Resolves where each artifact lives:
///
/// ```text
/// <data_root>/<dataset>/cleaned/
/// <data_root>/<dataset>/method_ready/
/// <results_root>/<method>/[<dataset>/]
/// ```
///
/// Path getters are pure; [`ensure`](Self::ensure) creates a directory on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    data_root: PathBuf,
    results_root: PathBuf,
}

impl DataLayout {
    /// Create a layout rooted at `data_root` and `results_root`.
    pub fn new(data_root: &Path, results_root: &Path) -> Self {
        Self {
            data_root: data_root.to_path_buf(),
            results_root: results_root.to_path_buf(),
        }
    }

    /// Root directory for prepared datasets.
    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Root directory for detector results.
    pub fn results_root(&self) -> &Path {
        &self.results_root
    }

    pub fn dataset_dir(&self, dataset: &DatasetName) -> PathBuf {
        self.data_root.join(dataset.as_str())
    }

    pub fn cleaned_dir(&self, dataset: &DatasetName) -> PathBuf {
        self.dataset_dir(dataset).join("cleaned")
    }

    pub fn method_ready_dir(&self, dataset: &DatasetName) -> PathBuf {
        self.dataset_dir(dataset).join("method_ready")
    }

    /// `<results_root>/<method>` or `<results_root>/<method>/<dataset>`.
    ///
    /// Method names follow the same character rules as dataset names.
    pub fn results_dir(&self, method: &DatasetName, dataset: Option<&DatasetName>) -> PathBuf {
        let base = self.results_root.join(method.as_str());
        match dataset {
            Some(d) => base.join(d.as_str()),
            None => base,
        }
    }

    /// Create `dir` and its parents if missing, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    pub fn ensure(dir: PathBuf) -> Result<PathBuf, IoError> {
        fs::create_dir_all(&dir).map_err(|e| IoError::OutputDirCreate {
            path: dir.clone(),
            source: e,
        })?;
        debug!(dir = %dir.display(), "directory ready");
        Ok(dir)
    }
}
