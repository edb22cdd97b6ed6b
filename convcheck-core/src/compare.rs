//! Tolerance comparison between the reference and the program's output.
//!
//! Independent convolution implementations disagree in the last bits (single
//! versus double precision accumulation, different summation order), so two
//! matrices are equal when their largest absolute element-wise difference is
//! strictly below [`TOLERANCE`]. Comparison never fails loudly: mismatched
//! shapes and non-finite differences are verdicts, not errors.

use crate::matrix::Matrix;

/// Largest absolute element-wise difference still treated as equal (exclusive).
pub const TOLERANCE: f64 = 1e-3;

/// Returns the largest absolute element-wise difference between `expected`
/// and `actual`.
///
/// Returns `None` when the shapes differ or any difference is not finite,
/// both of which can never satisfy the tolerance.
///
/// # Examples
/// ```
/// use convcheck_core::{Matrix, compare::max_abs_difference};
///
/// let expected = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]])?;
/// let actual = Matrix::from_rows(vec![vec![1.0, 2.5], vec![3.0, 3.0]])?;
/// assert_eq!(max_abs_difference(&expected, &actual), Some(1.0));
/// assert_eq!(max_abs_difference(&expected, &Matrix::ones(3)?), None);
/// # Ok::<(), convcheck_core::MatrixError>(())
/// ```
#[must_use]
pub fn max_abs_difference(expected: &Matrix, actual: &Matrix) -> Option<f64> {
    if expected.size() != actual.size() {
        return None;
    }
    expected
        .as_slice()
        .iter()
        .zip(actual.as_slice())
        .map(|(left, right)| (left - right).abs())
        .try_fold(0.0_f64, |max, difference| {
            difference.is_finite().then_some(max.max(difference))
        })
}

/// Returns `true` iff `actual` matches `expected` within [`TOLERANCE`].
///
/// # Examples
/// ```
/// use convcheck_core::{Matrix, compare::matches_within_tolerance};
///
/// let expected = Matrix::filled(2, 9.0)?;
/// assert!(matches_within_tolerance(&expected, &Matrix::filled(2, 9.0005)?));
/// assert!(!matches_within_tolerance(&expected, &Matrix::filled(2, 9.01)?));
/// # Ok::<(), convcheck_core::MatrixError>(())
/// ```
#[must_use]
pub fn matches_within_tolerance(expected: &Matrix, actual: &Matrix) -> bool {
    max_abs_difference(expected, actual).is_some_and(|difference| difference < TOLERANCE)
}
