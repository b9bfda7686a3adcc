//! Train/test split, train-only scaling, and windowing for one dataset.

use serde::Serialize;
use tracing::{debug, info, instrument};
use tsad_prep::{
    create_window_labels, create_windows, subsample_indices, Scaler, ScalerState, Series,
    WindowConfig, Windows,
};

use crate::domain::Variant;
use crate::IoError;

/// Export options for [`prepare_method_ready`].
///
/// # Defaults
///
/// | Parameter           | Default              |
/// |---------------------|----------------------|
/// | `variants`          | `raw`, `z`, `robust` |
/// | `max_train_windows` | `Some(20_000)`       |
/// | `seed`              | 42                   |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    pub(crate) variants: Vec<Variant>,
    pub(crate) max_train_windows: Option<usize>,
    pub(crate) seed: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            variants: Variant::ALL.to_vec(),
            max_train_windows: Some(20_000),
            seed: 42,
        }
    }
}

impl ExportConfig {
    /// Create a config with the defaults above.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the exported variants. Duplicates are dropped, first occurrence wins.
    #[must_use]
    pub fn with_variants(mut self, variants: &[Variant]) -> Self {
        self.variants.clear();
        for &v in variants {
            if !self.variants.contains(&v) {
                self.variants.push(v);
            }
        }
        self
    }

    /// Cap the number of train windows; `None` keeps all of them.
    #[must_use]
    pub fn with_max_train_windows(mut self, max: Option<usize>) -> Self {
        self.max_train_windows = max;
        self
    }

    /// Set the subsampling seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the exported variants.
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Return the train window cap.
    pub fn max_train_windows(&self) -> Option<usize> {
        self.max_train_windows
    }

    /// Return the subsampling seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// One exported representation of the train and test segments.
#[derive(Debug, Clone)]
pub struct VariantSplit {
    /// Which representation this is.
    pub variant: Variant,
    /// Train segment, scaled if the variant has a scaler.
    pub train: Series,
    /// Test segment, scaled with the train-fitted state.
    pub test: Series,
    /// Fitted state, `None` for [`Variant::Raw`].
    pub state: Option<ScalerState>,
}

/// Everything a detector needs for one dataset.
///
/// Every variant shares the same window starts and labels, so those are
/// stored once. Dense window matrices are not kept; build them with
/// [`train_windows`](Self::train_windows) and
/// [`test_windows`](Self::test_windows) when a detector needs them.
#[derive(Debug, Clone)]
pub struct MethodReady {
    /// Window configuration used for both segments.
    pub window: WindowConfig,
    /// Effective split index (clamped to the series length), equal to the
    /// train segment length.
    pub train_end: usize,
    /// Test segment length.
    pub test_len: usize,
    /// Per-variant segments and windows, in export order.
    pub variants: Vec<VariantSplit>,
    /// Start offsets of the kept train windows, relative to the train segment.
    pub train_win_starts: Vec<usize>,
    /// Start offsets of the test windows, relative to the test segment.
    pub test_win_starts: Vec<usize>,
    /// One label per kept train window.
    pub train_win_labels: Vec<u8>,
    /// One label per test window.
    pub test_win_labels: Vec<u8>,
    /// Number of train windows before subsampling.
    pub n_train_windows_total: usize,
}

impl MethodReady {
    /// Kept train windows of `split`, in the order of `train_win_starts`.
    #[must_use]
    pub fn train_windows(&self, split: &VariantSplit) -> Windows {
        let stride = self.window.stride();
        let indices: Vec<usize> = self.train_win_starts.iter().map(|s| s / stride).collect();
        create_windows(split.train.as_slice(), &self.window).select(&indices)
    }

    /// All test windows of `split`.
    #[must_use]
    pub fn test_windows(&self, split: &VariantSplit) -> Windows {
        create_windows(split.test.as_slice(), &self.window)
    }

    /// Summary record written as `method_ready_metadata.json`.
    #[must_use]
    pub fn summary(&self) -> MethodReadySummary {
        MethodReadySummary {
            window: self.window,
            train_end: self.train_end,
            train_len: self.train_end,
            test_len: self.test_len,
            n_train_windows: self.train_win_starts.len(),
            n_train_windows_total: self.n_train_windows_total,
            n_test_windows: self.test_win_starts.len(),
            n_test_anomalous_windows: self.test_win_labels.iter().filter(|&&l| l == 1).count(),
            variants: self
                .variants
                .iter()
                .map(|v| VariantSummary {
                    name: v.variant,
                    state: v.state,
                })
                .collect(),
        }
    }
}

/// Serializable overview of a [`MethodReady`] bundle.
#[derive(Debug, Clone, Serialize)]
pub struct MethodReadySummary {
    /// Window configuration.
    pub window: WindowConfig,
    /// Effective split index.
    pub train_end: usize,
    /// Train segment length.
    pub train_len: usize,
    /// Test segment length.
    pub test_len: usize,
    /// Kept train windows.
    pub n_train_windows: usize,
    /// Train windows before subsampling.
    pub n_train_windows_total: usize,
    /// Test windows.
    pub n_test_windows: usize,
    /// Test windows labelled anomalous.
    pub n_test_anomalous_windows: usize,
    /// Exported variants with their fitted scaler states.
    pub variants: Vec<VariantSummary>,
}

/// Variant name and scaler state in a [`MethodReadySummary`].
#[derive(Debug, Clone, Serialize)]
pub struct VariantSummary {
    /// Variant name.
    pub name: Variant,
    /// Train-fitted scaler state, absent for raw values.
    pub state: Option<ScalerState>,
}

/// Split a cleaned series at `train_end`, scale each variant with
/// statistics from the train segment only, and window both segments.
///
/// `train_end` is clamped to the series length. Train windows are
/// subsampled to `export.max_train_windows()` with the same indices for
/// every variant, so window labels and starts stay aligned across variants.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::LengthMismatch`] | `labels.len() != series.len()` |
/// | [`IoError::Scaler`] | A scaled variant is requested and the train segment is empty, or scaling overflows |
#[instrument(skip_all, fields(len = series.len(), train_end, window_size = window.window_size()))]
pub fn prepare_method_ready(
    series: &Series,
    labels: &[u8],
    train_end: usize,
    window: &WindowConfig,
    export: &ExportConfig,
) -> Result<MethodReady, IoError> {
    if labels.len() != series.len() {
        return Err(IoError::LengthMismatch {
            series_len: series.len(),
            labels_len: labels.len(),
        });
    }

    let (train, test) = series.split_at(train_end);
    let (train_labels, test_labels) = labels.split_at(train.len());

    let n_train_windows_total = window.n_windows(train.len());
    let keep = export
        .max_train_windows
        .map(|max| subsample_indices(n_train_windows_total, max, export.seed))
        .filter(|idx| idx.len() < n_train_windows_total);

    let all_train_labels = create_window_labels(train_labels, window);
    let train_win_labels = match &keep {
        Some(idx) => idx.iter().map(|&i| all_train_labels[i]).collect(),
        None => all_train_labels,
    };
    let test_win_labels = create_window_labels(test_labels, window);

    let mut variants = Vec::with_capacity(export.variants.len());
    for &variant in &export.variants {
        let (state, train_v, test_v) = match variant.scaler_kind() {
            None => (None, train.clone(), test.clone()),
            Some(kind) => {
                let mut scaler = Scaler::new(kind);
                let state = scaler.fit(&train)?;
                (
                    Some(state),
                    scaler.transform(&train)?,
                    scaler.transform(&test)?,
                )
            }
        };

        debug!(%variant, "variant prepared");

        variants.push(VariantSplit {
            variant,
            train: train_v,
            test: test_v,
            state,
        });
    }

    let train_win_starts = match &keep {
        Some(idx) => idx.iter().map(|&i| i * window.stride()).collect(),
        None => (0..n_train_windows_total)
            .map(|i| i * window.stride())
            .collect(),
    };
    let test_win_starts: Vec<usize> = (0..window.n_windows(test.len()))
        .map(|i| i * window.stride())
        .collect();

    info!(
        train_len = train.len(),
        test_len = test.len(),
        n_train_windows = train_win_labels.len(),
        n_train_windows_total,
        n_test_windows = test_win_labels.len(),
        "method-ready bundle prepared"
    );

    Ok(MethodReady {
        window: *window,
        train_end: train.len(),
        test_len: test.len(),
        variants,
        train_win_starts,
        test_win_starts,
        train_win_labels,
        test_win_labels,
        n_train_windows_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsad_prep::LabelMode;

    fn ramp(n: usize) -> Series {
        Series::new((0..n).map(|i| i as f64).collect()).unwrap()
    }

    #[test]
    fn defaults() {
        let cfg = ExportConfig::new();
        assert_eq!(cfg.variants(), &Variant::ALL);
        assert_eq!(cfg.max_train_windows(), Some(20_000));
        assert_eq!(cfg.seed(), 42);
    }

    #[test]
    fn with_variants_drops_duplicates() {
        let cfg = ExportConfig::new().with_variants(&[Variant::Z, Variant::Raw, Variant::Z]);
        assert_eq!(cfg.variants(), &[Variant::Z, Variant::Raw]);
    }

    #[test]
    fn length_mismatch_rejected() {
        let window = WindowConfig::new(2, 1).unwrap();
        let err = prepare_method_ready(&ramp(4), &[0, 0, 0], 2, &window, &ExportConfig::new())
            .unwrap_err();
        assert!(matches!(
            err,
            IoError::LengthMismatch {
                series_len: 4,
                labels_len: 3
            }
        ));
    }

    #[test]
    fn scalers_fit_on_train_only() {
        let series = ramp(10);
        let labels = vec![0u8; 10];
        let window = WindowConfig::new(2, 1).unwrap();
        let mr = prepare_method_ready(&series, &labels, 5, &window, &ExportConfig::new()).unwrap();

        let z = &mr.variants[1];
        assert_eq!(z.variant, Variant::Z);
        // train is 0..5: mean 2, population std sqrt(2)
        let state = z.state.unwrap();
        assert!((state.location - 2.0).abs() < 1e-12);
        assert!((state.scale - 2f64.sqrt()).abs() < 1e-12);
        assert!((z.test.as_slice()[0] - 3.0 / 2f64.sqrt()).abs() < 1e-12);

        let robust = &mr.variants[2];
        // train quartiles 1, 2, 3
        assert_eq!(robust.state.unwrap().location, 2.0);
        assert_eq!(robust.state.unwrap().scale, 2.0);

        assert!(mr.variants[0].state.is_none());
        assert_eq!(mr.variants[0].test.as_slice(), &[5.0, 6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn window_labels_follow_each_segment() {
        let series = ramp(12);
        let mut labels = vec![0u8; 12];
        labels[9] = 1;
        let window = WindowConfig::new(3, 3).unwrap().with_mode(LabelMode::Any);
        let mr = prepare_method_ready(&series, &labels, 6, &window, &ExportConfig::new()).unwrap();

        assert_eq!(mr.train_win_starts, vec![0, 3]);
        assert_eq!(mr.train_win_labels, vec![0, 0]);
        assert_eq!(mr.test_win_starts, vec![0, 3]);
        // test segment labels are [0, 0, 0, 1, 0, 0]
        assert_eq!(mr.test_win_labels, vec![0, 1]);
        assert_eq!(mr.test_windows(&mr.variants[0]).window(1), &[9.0, 10.0, 11.0]);
    }

    #[test]
    fn train_subsampling_is_shared_across_variants() {
        let series = ramp(200);
        let labels = vec![0u8; 200];
        let window = WindowConfig::new(4, 1).unwrap();
        let export = ExportConfig::new().with_max_train_windows(Some(10)).with_seed(7);
        let mr = prepare_method_ready(&series, &labels, 150, &window, &export).unwrap();

        assert_eq!(mr.n_train_windows_total, 147);
        assert_eq!(mr.train_win_starts.len(), 10);
        assert_eq!(mr.train_win_labels.len(), 10);
        for v in &mr.variants {
            assert_eq!(mr.train_windows(v).starts(), mr.train_win_starts.as_slice());
        }
        // raw windows begin at their start offset on a ramp
        let raw = mr.train_windows(&mr.variants[0]);
        assert_eq!(raw.len(), 10);
        for (i, &s) in mr.train_win_starts.iter().enumerate() {
            assert_eq!(raw.window(i)[0], s as f64);
        }
    }

    #[test]
    fn train_end_clamped() {
        let window = WindowConfig::new(2, 1).unwrap();
        let export = ExportConfig::new().with_variants(&[Variant::Raw]);
        let mr = prepare_method_ready(&ramp(5), &[0; 5], 99, &window, &export).unwrap();
        assert_eq!(mr.train_end, 5);
        assert!(mr.variants[0].test.is_empty());
        assert!(mr.test_win_labels.is_empty());
    }

    #[test]
    fn empty_train_fails_for_scaled_variants() {
        let window = WindowConfig::new(2, 1).unwrap();
        let err = prepare_method_ready(&ramp(5), &[0; 5], 0, &window, &ExportConfig::new())
            .unwrap_err();
        assert!(matches!(err, IoError::Scaler(_)));
    }
}
