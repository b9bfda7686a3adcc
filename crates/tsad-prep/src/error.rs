//! Error types for sanitation, scaling, and window construction.

/// Errors raised when a series cannot be repaired or is not finite.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataQualityError {
    /// Returned when a non-empty input contains no finite value to anchor interpolation.
    #[error("series of length {len} has no finite value to interpolate from")]
    NoValidValues {
        /// Length of the rejected input.
        len: usize,
    },

    /// Returned when a [`Series`](crate::Series) is built from data containing NaN or infinity.
    #[error("series contains non-finite value at index {index}")]
    NonFiniteValue {
        /// Position of the first non-finite value found.
        index: usize,
    },
}

/// Errors from fitting or applying a [`Scaler`](crate::Scaler).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScalerError {
    /// Returned when `transform` is called before `fit`.
    #[error("{kind} scaler must be fitted before transform")]
    NotFitted {
        /// Name of the scaler variant.
        kind: &'static str,
    },

    /// Returned when `fit` receives an empty series.
    #[error("cannot fit {kind} scaler on an empty series")]
    EmptyFitInput {
        /// Name of the scaler variant.
        kind: &'static str,
    },

    /// Returned when the fitted location or spread is not representable,
    /// e.g. an interquartile range wider than `f64::MAX`.
    #[error("{kind} scaler statistics overflow on this input")]
    NonFiniteStatistic {
        /// Name of the scaler variant.
        kind: &'static str,
    },

    /// Returned when scaling overflows to a non-finite value.
    #[error("scaled value at index {index} is not finite")]
    NonFiniteOutput {
        /// Position of the first overflowing value.
        index: usize,
    },
}

/// Errors from invalid windowing configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Returned when the window size is zero.
    #[error("window_size must be at least 1, got {window_size}")]
    InvalidWindowSize {
        /// The invalid window size provided.
        window_size: usize,
    },

    /// Returned when the stride is zero.
    #[error("stride must be at least 1, got {stride}")]
    InvalidStride {
        /// The invalid stride provided.
        stride: usize,
    },

    /// Returned when a label aggregation mode name is not recognized.
    #[error("unknown window label mode \"{mode}\" (expected any or majority)")]
    UnknownLabelMode {
        /// The unrecognized mode name.
        mode: String,
    },
}
