//! Score-to-label thresholding at a quantile of calibration scores.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use tsad_prep::stats;

use crate::error::EvalError;

/// A decision threshold placed at a quantile of calibration scores
/// (typically the scores a detector assigns to training data).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantileThreshold {
    /// Quantile in `[0, 1]` the threshold was taken at.
    pub quantile: f64,
    /// Scores strictly above this value are flagged.
    pub threshold: f64,
}

impl QuantileThreshold {
    /// Place the threshold at quantile `q` of `scores`, using linear
    /// interpolation between order statistics.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EvalError::InvalidQuantile`] | `q` is outside `[0, 1]` or NaN |
    /// | [`EvalError::EmptyScores`] | `scores` is empty |
    /// | [`EvalError::NonFiniteScore`] | A score is NaN or infinite |
    #[instrument(skip(scores), fields(n = scores.len()))]
    pub fn fit(scores: &[f64], q: f64) -> Result<Self, EvalError> {
        if !(0.0..=1.0).contains(&q) {
            return Err(EvalError::InvalidQuantile { q });
        }
        if let Some(index) = scores.iter().position(|s| !s.is_finite()) {
            return Err(EvalError::NonFiniteScore { index });
        }
        let threshold = stats::quantile(scores, q).ok_or(EvalError::EmptyScores)?;
        debug!(threshold, "threshold fitted");
        Ok(Self {
            quantile: q,
            threshold,
        })
    }

    /// Flag each score above the threshold with 1, else 0.
    #[must_use]
    pub fn apply(&self, scores: &[f64]) -> Vec<u8> {
        scores
            .iter()
            .map(|&s| u8::from(s > self.threshold))
            .collect()
    }
}
