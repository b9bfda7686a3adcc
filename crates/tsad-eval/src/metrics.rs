//! Precision, recall, F1, and accuracy for binary anomaly labels.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::confusion::{confusion_counts, ConfusionCounts};
use crate::error::EvalError;

/// Binary classification metrics with the counts they were derived from.
///
/// Serialized field names (`precision, recall, f1, accuracy, tn, fp, fn,
/// tp, eval_len`) are stable and used as CSV/JSON column names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinaryMetrics {
    /// TP / (TP + FP); 0.0 when nothing was predicted positive.
    pub precision: f64,
    /// TP / (TP + FN); 0.0 when there are no positives.
    pub recall: f64,
    /// Harmonic mean of precision and recall; 0.0 when both are zero.
    pub f1: f64,
    /// (TP + TN) / eval_len; 0.0 when eval_len is zero.
    pub accuracy: f64,
    /// True negatives.
    pub tn: usize,
    /// False positives.
    pub fp: usize,
    /// False negatives.
    #[serde(rename = "fn")]
    pub fn_: usize,
    /// True positives.
    pub tp: usize,
    /// Length both sequences were aligned to.
    pub eval_len: usize,
}

impl BinaryMetrics {
    /// Derive metrics from confusion counts.
    #[must_use]
    pub fn from_counts(counts: &ConfusionCounts) -> Self {
        Self {
            precision: counts.precision(),
            recall: counts.recall(),
            f1: counts.f1(),
            accuracy: counts.accuracy(),
            tn: counts.tn,
            fp: counts.fp,
            fn_: counts.fn_,
            tp: counts.tp,
            eval_len: counts.total(),
        }
    }

    /// Return the underlying confusion counts.
    #[must_use]
    pub fn counts(&self) -> ConfusionCounts {
        ConfusionCounts {
            tn: self.tn,
            fp: self.fp,
            fn_: self.fn_,
            tp: self.tp,
        }
    }
}

/// Align, coerce, and score `y_pred` against `y_true`.
///
/// Empty denominators resolve to 0.0 rather than an error.
///
/// # Errors
///
/// Returns [`EvalError::NonBinaryLabel`] if an aligned value does not
/// truncate to 0 or 1.
#[instrument(skip_all)]
pub fn compute_binary_metrics<T, P>(y_true: &[T], y_pred: &[P]) -> Result<BinaryMetrics, EvalError>
where
    T: Copy + Into<f64>,
    P: Copy + Into<f64>,
{
    let counts = confusion_counts(y_true, y_pred)?;
    let metrics = BinaryMetrics::from_counts(&counts);
    info!(
        precision = metrics.precision,
        recall = metrics.recall,
        f1 = metrics.f1,
        eval_len = metrics.eval_len,
        "binary metrics computed"
    );
    Ok(metrics)
}
