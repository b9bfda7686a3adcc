//! Sliding-window extraction and point-to-window label aggregation.

use std::fmt;
use std::str::FromStr;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::ConfigError;

/// How point labels inside a window are reduced to one window label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelMode {
    /// Anomalous if any point in the window is anomalous.
    #[default]
    Any,
    /// Anomalous if strictly more than half the points are anomalous.
    /// Exactly half is not anomalous.
    Majority,
}

impl LabelMode {
    /// Lowercase name as accepted by [`FromStr`].
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Majority => "majority",
        }
    }

    fn reduce(self, window: &[u8]) -> u8 {
        let anomalous = window.iter().filter(|&&l| l != 0).count();
        let flagged = match self {
            Self::Any => anomalous > 0,
            Self::Majority => anomalous as f64 / window.len() as f64 > 0.5,
        };
        u8::from(flagged)
    }
}

impl FromStr for LabelMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(Self::Any),
            "majority" => Ok(Self::Majority),
            other => Err(ConfigError::UnknownLabelMode {
                mode: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for LabelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Window geometry and label policy shared by [`create_windows`] and
/// [`create_window_labels`].
///
/// Passing the same config to both calls keeps window `i` and label `i`
/// in correspondence; nothing checks this across calls.
///
/// # Defaults
///
/// | Parameter | Default |
/// |-----------|---------|
/// | `mode`    | `Any`   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowConfig {
    window_size: usize,
    stride: usize,
    mode: LabelMode,
}

impl WindowConfig {
    /// Create a config with the given window size and stride.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ConfigError::InvalidWindowSize`] | `window_size` is zero |
    /// | [`ConfigError::InvalidStride`] | `stride` is zero |
    pub fn new(window_size: usize, stride: usize) -> Result<Self, ConfigError> {
        if window_size == 0 {
            return Err(ConfigError::InvalidWindowSize { window_size });
        }
        if stride == 0 {
            return Err(ConfigError::InvalidStride { stride });
        }
        Ok(Self {
            window_size,
            stride,
            mode: LabelMode::Any,
        })
    }

    /// Set the label aggregation mode.
    #[must_use]
    pub fn with_mode(mut self, mode: LabelMode) -> Self {
        self.mode = mode;
        self
    }

    /// Return the window length.
    #[must_use]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Return the step between consecutive window starts.
    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Return the label aggregation mode.
    #[must_use]
    pub fn mode(&self) -> LabelMode {
        self.mode
    }

    /// Number of windows a sequence of length `len` yields.
    #[must_use]
    pub fn n_windows(&self, len: usize) -> usize {
        if len < self.window_size {
            0
        } else {
            (len - self.window_size) / self.stride + 1
        }
    }

    fn starts(&self, len: usize) -> impl Iterator<Item = usize> {
        let stride = self.stride;
        (0..self.n_windows(len)).map(move |i| i * stride)
    }
}

/// Fixed-length windows stored row-major, with their start offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct Windows {
    window_size: usize,
    data: Vec<f64>,
    starts: Vec<usize>,
}

impl Windows {
    /// Return the number of windows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    /// Return true if no window fits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Return the window length (row width).
    #[must_use]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Start offset of each window in the source sequence.
    #[must_use]
    pub fn starts(&self) -> &[usize] {
        &self.starts
    }

    /// Return window `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    #[must_use]
    pub fn window(&self, i: usize) -> &[f64] {
        let from = i * self.window_size;
        &self.data[from..from + self.window_size]
    }

    /// Iterate over windows in start order.
    pub fn iter(&self) -> std::slice::ChunksExact<'_, f64> {
        self.data.chunks_exact(self.window_size)
    }

    /// Row-major backing storage: `len() * window_size()` values.
    #[must_use]
    pub fn as_flat(&self) -> &[f64] {
        &self.data
    }

    /// Keep only the windows at `indices`, in the given order, with their
    /// original start offsets.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds.
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> Windows {
        let mut data = Vec::with_capacity(indices.len() * self.window_size);
        let mut starts = Vec::with_capacity(indices.len());
        for &i in indices {
            data.extend_from_slice(self.window(i));
            starts.push(self.starts[i]);
        }
        Windows {
            window_size: self.window_size,
            data,
            starts,
        }
    }
}

/// Extract every window of `config.window_size()` values starting at
/// `0, stride, 2 * stride, ...` that fits entirely inside `values`.
///
/// A sequence shorter than the window yields an empty set.
#[instrument(skip_all, fields(len = values.len(), window_size = config.window_size, stride = config.stride))]
pub fn create_windows(values: &[f64], config: &WindowConfig) -> Windows {
    let w = config.window_size;
    let starts: Vec<usize> = config.starts(values.len()).collect();
    let mut data = Vec::with_capacity(starts.len() * w);
    for &s in &starts {
        data.extend_from_slice(&values[s..s + w]);
    }
    debug!(n_windows = starts.len(), "windows created");
    Windows {
        window_size: w,
        data,
        starts,
    }
}

/// Window the point labels exactly like [`create_windows`] and reduce each
/// window to a single 0/1 label by `config.mode()`.
///
/// Any non-zero point label counts as anomalous.
#[instrument(skip_all, fields(len = labels.len(), mode = %config.mode))]
pub fn create_window_labels(labels: &[u8], config: &WindowConfig) -> Vec<u8> {
    let w = config.window_size;
    config
        .starts(labels.len())
        .map(|s| config.mode.reduce(&labels[s..s + w]))
        .collect()
}

/// Choose at most `max` of `n` indices uniformly without replacement,
/// returned in ascending order. Deterministic for a fixed `seed`.
///
/// When `n <= max` every index is returned.
#[must_use]
pub fn subsample_indices(n: usize, max: usize, seed: u64) -> Vec<usize> {
    if n <= max {
        return (0..n).collect();
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut picked = rand::seq::index::sample(&mut rng, n, max).into_vec();
    picked.sort_unstable();
    debug!(n, kept = picked.len(), seed, "subsampled windows");
    picked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(w: usize, s: usize) -> WindowConfig {
        WindowConfig::new(w, s).unwrap()
    }

    #[test]
    fn rejects_zero_window_and_stride() {
        assert_eq!(
            WindowConfig::new(0, 1),
            Err(ConfigError::InvalidWindowSize { window_size: 0 })
        );
        assert_eq!(
            WindowConfig::new(4, 0),
            Err(ConfigError::InvalidStride { stride: 0 })
        );
    }

    #[test]
    fn unknown_mode_is_config_error() {
        let err = "mean".parse::<LabelMode>().unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownLabelMode {
                mode: "mean".into()
            }
        );
        assert_eq!("majority".parse::<LabelMode>(), Ok(LabelMode::Majority));
    }

    #[test]
    fn windows_and_starts() {
        let values: Vec<f64> = (0..7).map(f64::from).collect();
        let windows = create_windows(&values, &config(3, 2));
        assert_eq!(windows.len(), 3);
        assert_eq!(windows.starts(), &[0, 2, 4]);
        assert_eq!(windows.window(0), &[0.0, 1.0, 2.0]);
        assert_eq!(windows.window(2), &[4.0, 5.0, 6.0]);
        assert_eq!(windows.as_flat().len(), 9);
    }

    #[test]
    fn trailing_partial_window_dropped() {
        let values = [1.0; 8];
        let windows = create_windows(&values, &config(3, 3));
        // starts 0 and 3 fit, start 6 would need index 8
        assert_eq!(windows.starts(), &[0, 3]);
    }

    #[test]
    fn short_series_yields_no_windows() {
        let windows = create_windows(&[1.0, 2.0], &config(3, 1));
        assert!(windows.is_empty());
        assert_eq!(windows.window_size(), 3);
        assert_eq!(windows.iter().count(), 0);
        assert!(create_window_labels(&[1, 1], &config(3, 1)).is_empty());
    }

    #[test]
    fn exact_fit_yields_one_window() {
        let windows = create_windows(&[1.0, 2.0, 3.0], &config(3, 5));
        assert_eq!(windows.len(), 1);
    }

    #[test]
    fn any_mode_labels() {
        let labels = create_window_labels(&[0, 0, 1, 0], &config(2, 1));
        assert_eq!(labels, vec![0, 1, 1]);
    }

    #[test]
    fn majority_mode_is_strict() {
        let cfg = config(4, 1).with_mode(LabelMode::Majority);
        // windows: [0,1,1,0] half -> 0, [1,1,0,1] three quarters -> 1
        let labels = create_window_labels(&[0, 1, 1, 0, 1], &cfg);
        assert_eq!(labels, vec![0, 1]);
    }

    #[test]
    fn labels_match_window_count() {
        let cfg = config(5, 3);
        let values = vec![0.0; 20];
        let labels = vec![0u8; 20];
        assert_eq!(
            create_windows(&values, &cfg).len(),
            create_window_labels(&labels, &cfg).len()
        );
        assert_eq!(cfg.n_windows(20), 6);
    }

    #[test]
    fn select_keeps_original_starts() {
        let values: Vec<f64> = (0..10).map(f64::from).collect();
        let windows = create_windows(&values, &config(2, 2));
        let picked = windows.select(&[1, 3]);
        assert_eq!(picked.starts(), &[2, 6]);
        assert_eq!(picked.window(1), &[6.0, 7.0]);
    }

    #[test]
    fn subsample_is_deterministic_and_sorted() {
        let a = subsample_indices(1000, 50, 42);
        let b = subsample_indices(1000, 50, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 50);
        assert!(a.windows(2).all(|p| p[0] < p[1]));
        assert!(a.iter().all(|&i| i < 1000));
    }

    #[test]
    fn subsample_below_cap_keeps_everything() {
        assert_eq!(subsample_indices(3, 10, 7), vec![0, 1, 2]);
    }
}
