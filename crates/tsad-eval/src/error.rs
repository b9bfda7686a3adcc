//! Error types for label coercion and score thresholding.

/// Errors from binary evaluation and score thresholding.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// Returned when a label does not truncate to 0 or 1.
    #[error("{sequence} value {value} at index {index} is not a binary label")]
    NonBinaryLabel {
        /// Which input held the value (`y_true`, `y_pred`, or `labels`).
        sequence: &'static str,
        /// Position of the offending value after alignment.
        index: usize,
        /// The raw value.
        value: f64,
    },

    /// Returned when a threshold quantile lies outside `[0, 1]`.
    #[error("quantile must be in [0, 1], got {q}")]
    InvalidQuantile {
        /// The rejected quantile.
        q: f64,
    },

    /// Returned when a threshold is fitted on zero scores.
    #[error("cannot fit a threshold on an empty score sequence")]
    EmptyScores,

    /// Returned when a calibration score is NaN or infinite.
    #[error("calibration score at index {index} is not finite")]
    NonFiniteScore {
        /// Position of the first non-finite score.
        index: usize,
    },
}
