//! Contiguous anomalous intervals in a label sequence.

use std::ops::Range;

/// Half-open ranges where `labels` is non-zero, in order.
///
/// ```
/// use tsad_eval::anomaly_segments;
///
/// assert_eq!(anomaly_segments(&[0, 1, 1, 0, 1]), vec![1..3, 4..5]);
/// ```
#[must_use]
pub fn anomaly_segments(labels: &[u8]) -> Vec<Range<usize>> {
    let mut segments = Vec::new();
    let mut open: Option<usize> = None;
    for (i, &label) in labels.iter().enumerate() {
        match (label != 0, open) {
            (true, None) => open = Some(i),
            (false, Some(start)) => {
                segments.push(start..i);
                open = None;
            }
            _ => {}
        }
    }
    if let Some(start) = open {
        segments.push(start..labels.len());
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_anomalies() {
        assert!(anomaly_segments(&[0, 0, 0]).is_empty());
        assert!(anomaly_segments(&[]).is_empty());
    }

    #[test]
    fn run_touching_both_edges() {
        assert_eq!(anomaly_segments(&[1, 1, 1]), vec![0..3]);
    }

    #[test]
    fn several_runs() {
        assert_eq!(
            anomaly_segments(&[1, 0, 0, 1, 1, 0, 1]),
            vec![0..1, 3..5, 6..7]
        );
    }
}
