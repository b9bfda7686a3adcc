//! Standard and robust scaling with statistics frozen at fit time.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::ScalerError;
use crate::series::Series;
use crate::stats;

/// Which location/scale statistics a [`Scaler`] estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalerKind {
    /// Mean and population standard deviation (z-score).
    Standard,
    /// Median and interquartile range (Q75 - Q25).
    Robust,
}

impl ScalerKind {
    /// Short lowercase name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Robust => "robust",
        }
    }

    fn estimate(self, values: &[f64]) -> Option<ScalerState> {
        let (location, spread) = match self {
            Self::Standard => (stats::mean(values)?, stats::population_std(values)?),
            Self::Robust => {
                let [q25, q50, q75] = stats::quantiles(values, [0.25, 0.5, 0.75])?;
                (q50, q75 - q25)
            }
        };
        let scale = if spread == 0.0 { 1.0 } else { spread };
        Some(ScalerState { location, scale })
    }
}

impl fmt::Display for ScalerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Location and scale captured by [`Scaler::fit`]. `scale` is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalerState {
    /// Centering value subtracted from every sample.
    pub location: f64,
    /// Spread every centered sample is divided by.
    pub scale: f64,
}

impl ScalerState {
    /// Apply `(x - location) / scale` element-wise.
    ///
    /// # Errors
    ///
    /// Returns [`ScalerError::NonFiniteOutput`] if a scaled value overflows.
    pub fn apply(&self, series: &Series) -> Result<Series, ScalerError> {
        let scaled: Vec<f64> = series
            .as_slice()
            .iter()
            .map(|&x| (x - self.location) / self.scale)
            .collect();
        if let Some(index) = scaled.iter().position(|v| !v.is_finite()) {
            return Err(ScalerError::NonFiniteOutput { index });
        }
        Ok(Series::new_unchecked(scaled))
    }
}

/// Two-phase scaler: statistics are estimated once by [`fit`](Self::fit) on
/// the training segment, then reused unchanged by every
/// [`transform`](Self::transform) call, whichever segment is passed.
///
/// # Example
///
/// ```
/// use tsad_prep::{Scaler, Series};
///
/// let train = Series::new(vec![1.0, 2.0, 3.0]).unwrap();
/// let test = Series::new(vec![4.0, 5.0]).unwrap();
///
/// let mut scaler = Scaler::standard();
/// scaler.fit(&train).unwrap();
/// let scaled_test = scaler.transform(&test).unwrap();
/// assert_eq!(scaled_test.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Scaler {
    kind: ScalerKind,
    state: Option<ScalerState>,
}

impl Scaler {
    /// Create an unfitted scaler of the given kind.
    #[must_use]
    pub fn new(kind: ScalerKind) -> Self {
        Self { kind, state: None }
    }

    /// Create an unfitted mean/std scaler.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(ScalerKind::Standard)
    }

    /// Create an unfitted median/IQR scaler.
    #[must_use]
    pub fn robust() -> Self {
        Self::new(ScalerKind::Robust)
    }

    /// Return the scaler kind.
    #[must_use]
    pub fn kind(&self) -> ScalerKind {
        self.kind
    }

    /// Return the fitted statistics, if any.
    #[must_use]
    pub fn state(&self) -> Option<ScalerState> {
        self.state
    }

    /// Estimate location and scale from `train`, replacing any previous fit.
    ///
    /// A zero spread (constant input) is stored as a scale of 1.0.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ScalerError::EmptyFitInput`] | `train` is empty |
    /// | [`ScalerError::NonFiniteStatistic`] | Location or spread overflows; the previous fit is kept |
    #[instrument(skip_all, fields(kind = %self.kind, n = train.len()))]
    pub fn fit(&mut self, train: &Series) -> Result<ScalerState, ScalerError> {
        let state = self
            .kind
            .estimate(train.as_slice())
            .ok_or(ScalerError::EmptyFitInput {
                kind: self.kind.name(),
            })?;
        if !state.location.is_finite() || !state.scale.is_finite() {
            return Err(ScalerError::NonFiniteStatistic {
                kind: self.kind.name(),
            });
        }
        debug!(location = state.location, scale = state.scale, "scaler fitted");
        self.state = Some(state);
        Ok(state)
    }

    /// Scale `series` with the statistics captured at fit time.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ScalerError::NotFitted`] | [`fit`](Self::fit) has not been called |
    /// | [`ScalerError::NonFiniteOutput`] | A scaled value overflows |
    pub fn transform(&self, series: &Series) -> Result<Series, ScalerError> {
        let state = self.state.ok_or(ScalerError::NotFitted {
            kind: self.kind.name(),
        })?;
        state.apply(series)
    }

    /// Fit on `series`, then transform the same series.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`fit`](Self::fit) and [`transform`](Self::transform).
    pub fn fit_transform(&mut self, series: &Series) -> Result<Series, ScalerError> {
        self.fit(series)?;
        self.transform(series)
    }
}
