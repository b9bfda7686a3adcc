//! Location and spread statistics over finite samples.

/// Arithmetic mean. Returns `None` for an empty slice.
///
/// Samples are divided by their largest magnitude before summing, so the
/// result is finite for any finite input.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    let (peak, unit_mean) = unit_mean(values)?;
    Some(peak * unit_mean)
}

/// Population standard deviation (divides by n, not n-1).
///
/// Computed on samples divided by their largest magnitude and rescaled, so
/// neither the deviations nor their squares overflow.
#[must_use]
pub fn population_std(values: &[f64]) -> Option<f64> {
    let (peak, mu) = unit_mean(values)?;
    if peak == 0.0 {
        return Some(0.0);
    }
    let variance = values
        .iter()
        .map(|&x| (x / peak - mu).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    Some(peak * variance.sqrt())
}

/// Largest magnitude and the mean of `values / peak` (0 when every value is 0).
fn unit_mean(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let peak = values.iter().fold(0.0_f64, |m, &x| m.max(x.abs()));
    if peak == 0.0 {
        return Some((0.0, 0.0));
    }
    let sum: f64 = values.iter().map(|&x| x / peak).sum();
    Some((peak, sum / values.len() as f64))
}

/// Quantile `q` in `[0, 1]` with linear interpolation between order statistics.
///
/// The quantile sits at fractional rank `q * (n - 1)` of the sorted sample,
/// so `q = 0.5` is the usual median and `q = 0.25`/`0.75` are the inclusive
/// quartiles. Returns `None` for an empty slice.
#[must_use]
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    quantile_sorted(&sorted, q)
}

/// Several quantiles from a single sort.
#[must_use]
pub fn quantiles<const N: usize>(values: &[f64], qs: [f64; N]) -> Option<[f64; N]> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mut out = [0.0; N];
    for (slot, q) in out.iter_mut().zip(qs) {
        *slot = quantile_sorted(&sorted, q)?;
    }
    Some(out)
}

fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let rank = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    if lower == upper {
        Some(sorted[lower])
    } else {
        // convex form: the difference of two extreme samples may overflow
        Some(sorted[lower] * (1.0 - frac) + sorted[upper] * frac)
    }
}

/// Median: the 0.5 quantile.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_inputs_have_no_statistics() {
        assert_eq!(mean(&[]), None);
        assert_eq!(population_std(&[]), None);
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantiles(&[], [0.25, 0.75]), None);
    }

    #[test]
    fn population_std_known_value() {
        // mean 5, squared deviations sum to 32 over 8 samples
        let std = population_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((std - 2.0).abs() < 1e-12);
    }

    #[test]
    fn moments_of_huge_values_stay_finite() {
        assert_eq!(mean(&[f64::MAX; 3]), Some(f64::MAX));
        assert_eq!(population_std(&[f64::MAX; 3]), Some(0.0));
        assert_eq!(mean(&[0.0, 1e200]), Some(5e199));
        assert_eq!(population_std(&[0.0, 1e200]), Some(5e199));
        assert_eq!(mean(&[-f64::MAX, f64::MAX]), Some(0.0));
        assert_eq!(population_std(&[-f64::MAX, f64::MAX]), Some(f64::MAX));
    }

    #[test]
    fn all_zero_moments() {
        assert_eq!(mean(&[0.0, 0.0]), Some(0.0));
        assert_eq!(population_std(&[0.0, 0.0]), Some(0.0));
    }

    #[test]
    fn quantile_between_extremes_does_not_overflow() {
        assert_eq!(quantile(&[-f64::MAX, f64::MAX], 0.5), Some(0.0));
    }

    #[test]
    fn median_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn quartiles_interpolate_linearly() {
        // ranks 0.75 and 2.25 over [1, 2, 3, 4]
        let [q25, q75] = quantiles(&[4.0, 2.0, 1.0, 3.0], [0.25, 0.75]).unwrap();
        assert!((q25 - 1.75).abs() < 1e-12);
        assert!((q75 - 3.25).abs() < 1e-12);
    }

    #[test]
    fn quantile_extremes_are_min_and_max() {
        let data = [5.0, -1.0, 3.0];
        assert_eq!(quantile(&data, 0.0), Some(-1.0));
        assert_eq!(quantile(&data, 1.0), Some(5.0));
    }

    #[test]
    fn single_sample_quantile() {
        assert_eq!(quantile(&[42.0], 0.9), Some(42.0));
    }
}
