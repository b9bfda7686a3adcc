//! Two-by-two confusion counts for binary anomaly labels.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::align::align_pair;
use crate::binary::coerce;
use crate::error::EvalError;

/// True-negative, false-positive, false-negative, and true-positive tallies.
///
/// The four counts always sum to the aligned evaluation length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfusionCounts {
    /// Truth 0, prediction 0.
    pub tn: usize,
    /// Truth 0, prediction 1.
    pub fp: usize,
    /// Truth 1, prediction 0.
    #[serde(rename = "fn")]
    pub fn_: usize,
    /// Truth 1, prediction 1.
    pub tp: usize,
}

impl ConfusionCounts {
    /// Tally already-coerced labels of equal length.
    pub(crate) fn tally(y_true: &[u8], y_pred: &[u8]) -> Self {
        let mut counts = Self::default();
        for (&t, &p) in y_true.iter().zip(y_pred) {
            match (t, p) {
                (0, 0) => counts.tn += 1,
                (0, _) => counts.fp += 1,
                (_, 0) => counts.fn_ += 1,
                _ => counts.tp += 1,
            }
        }
        counts
    }

    /// Number of compared positions.
    #[must_use]
    pub fn total(&self) -> usize {
        self.tn + self.fp + self.fn_ + self.tp
    }

    /// TP / (TP + FP), or 0.0 when nothing was predicted positive.
    #[must_use]
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    /// TP / (TP + FN), or 0.0 when there are no true positives to find.
    #[must_use]
    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// Harmonic mean of precision and recall, or 0.0 if both are zero.
    #[must_use]
    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    /// (TP + TN) / total, or 0.0 for an empty comparison.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}

impl fmt::Display for ConfusionCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>8} {:>8} {:>8}", "", "pred_0", "pred_1")?;
        writeln!(f, "{:>8} {:>8} {:>8}", "true_0", self.tn, self.fp)?;
        writeln!(f, "{:>8} {:>8} {:>8}", "true_1", self.fn_, self.tp)
    }
}

/// Align `y_true` and `y_pred` to the shorter length, coerce both to 0/1,
/// and count agreements and disagreements.
///
/// # Errors
///
/// Returns [`EvalError::NonBinaryLabel`] if an aligned value does not
/// truncate to 0 or 1.
#[instrument(skip_all, fields(n_true = y_true.len(), n_pred = y_pred.len()))]
pub fn confusion_counts<T, P>(y_true: &[T], y_pred: &[P]) -> Result<ConfusionCounts, EvalError>
where
    T: Copy + Into<f64>,
    P: Copy + Into<f64>,
{
    let (y_true, y_pred) = align_pair(y_true, y_pred);
    let truth = coerce(y_true, "y_true")?;
    let pred = coerce(y_pred, "y_pred")?;
    let counts = ConfusionCounts::tally(&truth, &pred);
    debug!(
        tn = counts.tn,
        fp = counts.fp,
        fn_ = counts.fn_,
        tp = counts.tp,
        "confusion counts"
    );
    Ok(counts)
}
