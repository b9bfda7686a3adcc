//! Finite univariate series with a train/test split helper.

use std::ops::Index;

use crate::error::DataQualityError;

/// Owned series of finite values. May be empty.
///
/// Produced by [`clean`](crate::clean) and by scaler transforms; every
/// downstream statistic can rely on the absence of NaN and infinity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series(Vec<f64>);

impl Series {
    /// Create a new series, validating that all values are finite.
    ///
    /// # Errors
    ///
    /// Returns [`DataQualityError::NonFiniteValue`] if any value is NaN or infinite.
    pub fn new(values: Vec<f64>) -> Result<Self, DataQualityError> {
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(DataQualityError::NonFiniteValue { index });
        }
        Ok(Self(values))
    }

    /// Wrap values already known to be finite.
    pub(crate) fn new_unchecked(values: Vec<f64>) -> Self {
        debug_assert!(values.iter().all(|v| v.is_finite()));
        Self(values)
    }

    /// Return the underlying slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Return the number of time steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the series has no time steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume and return the inner vector.
    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }

    /// Split into `(train, test)` at `train_end`, clamped to the series length.
    ///
    /// `train` holds indices `[0, train_end)` and `test` holds the rest.
    #[must_use]
    pub fn split_at(&self, train_end: usize) -> (Series, Series) {
        let cut = train_end.min(self.0.len());
        let (train, test) = self.0.split_at(cut);
        (Self(train.to_vec()), Self(test.to_vec()))
    }
}

impl Index<usize> for Series {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl AsRef<[f64]> for Series {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for Series {
    type Error = DataQualityError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}
