//! Coercion of numeric labels to 0/1.

use crate::error::EvalError;

/// Truncate each value toward zero and require the result to be 0 or 1.
///
/// Fractional values are accepted (`0.7` becomes 0, `1.9` becomes 1);
/// anything that truncates outside `{0, 1}`, and any non-finite value, is
/// rejected so that every element lands in exactly one confusion quadrant.
///
/// # Errors
///
/// Returns [`EvalError::NonBinaryLabel`] for the first out-of-domain value.
pub fn to_binary<T: Copy + Into<f64>>(values: &[T]) -> Result<Vec<u8>, EvalError> {
    coerce(values, "labels")
}

pub(crate) fn coerce<T: Copy + Into<f64>>(
    values: &[T],
    sequence: &'static str,
) -> Result<Vec<u8>, EvalError> {
    values
        .iter()
        .enumerate()
        .map(|(index, &raw)| {
            let value: f64 = raw.into();
            match value.trunc() {
                t if t == 0.0 => Ok(0),
                t if t == 1.0 => Ok(1),
                _ => Err(EvalError::NonBinaryLabel {
                    sequence,
                    index,
                    value,
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_pass_through() {
        assert_eq!(to_binary(&[0u8, 1, 1, 0]).unwrap(), vec![0, 1, 1, 0]);
        assert_eq!(to_binary(&[1i32, 0]).unwrap(), vec![1, 0]);
    }

    #[test]
    fn fractions_truncate() {
        assert_eq!(to_binary(&[0.7f64, 1.9, -0.4, 0.0]).unwrap(), vec![0, 1, 0, 0]);
    }

    #[test]
    fn out_of_domain_rejected() {
        let err = to_binary(&[0i32, 1, 2]).unwrap_err();
        assert_eq!(
            err,
            EvalError::NonBinaryLabel {
                sequence: "labels",
                index: 2,
                value: 2.0,
            }
        );
        assert!(to_binary(&[-1i32]).is_err());
    }

    #[test]
    fn non_finite_rejected() {
        assert!(matches!(
            to_binary(&[f64::NAN]),
            Err(EvalError::NonBinaryLabel { index: 0, .. })
        ));
        assert!(to_binary(&[f64::INFINITY]).is_err());
    }
}
