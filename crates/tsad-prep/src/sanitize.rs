//! Repair of infinite and missing values by linear interpolation.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::DataQualityError;
use crate::series::Series;

/// Summary of the repairs made by [`clean`].
///
/// Field names are stable and are written as-is to dataset metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CleanReport {
    /// Length of the input.
    pub initial_len: usize,
    /// Missing values filled, counted after infinities were turned into NaN.
    pub nan_count: usize,
    /// Positive or negative infinities replaced.
    pub inf_count: usize,
    /// True if any value was rewritten.
    pub was_modified: bool,
}

/// Replace infinities and fill NaN gaps in a raw series.
///
/// Infinities are first rewritten to NaN. Every NaN is then filled by linear
/// interpolation between its nearest finite neighbours; runs at the start or
/// end of the series take the value of the nearest finite sample.
///
/// An empty input yields an empty series and a zero report.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DataQualityError::NoValidValues`] | Input is non-empty and contains no finite value |
#[instrument(skip_all, fields(len = values.len()))]
pub fn clean(values: &[f64]) -> Result<(Series, CleanReport), DataQualityError> {
    let mut data = values.to_vec();
    let mut report = CleanReport {
        initial_len: data.len(),
        ..CleanReport::default()
    };

    for v in data.iter_mut().filter(|v| v.is_infinite()) {
        *v = f64::NAN;
        report.inf_count += 1;
    }

    report.nan_count = data.iter().filter(|v| v.is_nan()).count();
    if report.nan_count == 0 {
        return Ok((Series::new_unchecked(data), report));
    }
    report.was_modified = true;

    if report.nan_count == data.len() {
        return Err(DataQualityError::NoValidValues { len: data.len() });
    }

    fill_gaps(&mut data);

    warn!(
        inf_count = report.inf_count,
        nan_count = report.nan_count,
        "repaired non-finite values"
    );
    Ok((Series::new_unchecked(data), report))
}

/// Fill NaN runs in place. Requires at least one finite value.
fn fill_gaps(data: &mut [f64]) {
    let mut prev: Option<usize> = None;
    let mut i = 0;
    while i < data.len() {
        if !data[i].is_nan() {
            prev = Some(i);
            i += 1;
            continue;
        }

        let run_start = i;
        while i < data.len() && data[i].is_nan() {
            i += 1;
        }
        let next = (i < data.len()).then_some(i);

        match (prev, next) {
            (Some(p), Some(q)) => {
                let (left, right) = (data[p], data[q]);
                let span = (q - p) as f64;
                for (k, slot) in data[run_start..q].iter_mut().enumerate() {
                    let t = (run_start + k - p) as f64 / span;
                    // Convex combination avoids overflow for large opposite-signed anchors.
                    *slot = left * (1.0 - t) + right * t;
                }
            }
            (Some(p), None) => {
                let fill = data[p];
                data[run_start..].fill(fill);
            }
            (None, Some(q)) => {
                let fill = data[q];
                data[run_start..q].fill(fill);
            }
            (None, None) => unreachable!("caller guarantees a finite anchor"),
        }
        debug!(start = run_start, end = i, "filled gap");
    }
}
