//! Truncation of ragged sequences to a common length.

/// Truncate every present sequence to the shortest present length.
///
/// Each sequence keeps its leading prefix; `None` entries pass through as
/// `None`. If every entry is `None` the input is returned unchanged.
///
/// ```
/// use tsad_eval::align_lengths;
///
/// let truth = [0, 1, 1, 0, 1];
/// let pred = [0, 1, 0];
/// let aligned = align_lengths(&[Some(&truth[..]), None, Some(&pred[..])]);
/// assert_eq!(aligned, vec![Some(&truth[..3]), None, Some(&pred[..])]);
/// ```
#[must_use]
pub fn align_lengths<'a, T>(sequences: &[Option<&'a [T]>]) -> Vec<Option<&'a [T]>> {
    let Some(min_len) = sequences.iter().flatten().map(|s| s.len()).min() else {
        return sequences.to_vec();
    };
    sequences
        .iter()
        .copied()
        .map(|s| s.map(|s| &s[..min_len]))
        .collect()
}

/// Truncate two sequences of possibly different element types to the
/// shorter length.
#[must_use]
pub fn align_pair<'a, 'b, A, B>(a: &'a [A], b: &'b [B]) -> (&'a [A], &'b [B]) {
    let n = a.len().min(b.len());
    (&a[..n], &b[..n])
}
