//! Reference two-dimensional convolution.
//!
//! The expected result of a test case is the "same-size" convolution: the full
//! zero-padded linear convolution of signal `a` (`n × n`) with kernel `b`
//! (`m × m`) is `(n + m - 1)` wide, and the harness keeps the `n × n` window
//! starting at row and column `m / 2` (rounded down). The program under test
//! must align its output the same way; any disagreement here shows up as a
//! mismatch indistinguishable from a genuine bug.

use tracing::instrument;

use crate::matrix::Matrix;

/// Computes the full zero-padded linear convolution of `a` with `b`.
///
/// The result is `(n + m - 1) × (n + m - 1)`; element `(i, j)` is the sum of
/// `a[p][q] * b[i - p][j - q]` over every index pair where both operands are
/// defined.
///
/// # Examples
/// ```
/// use convcheck_core::{Matrix, reference::full_convolution};
///
/// let a = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]])?;
/// let b = Matrix::from_rows(vec![vec![0.0, 1.0], vec![1.0, 0.0]])?;
/// let full = full_convolution(&a, &b);
/// assert_eq!(full.size(), 3);
/// assert_eq!(full.as_slice(), &[0.0, 1.0, 2.0, 1.0, 5.0, 4.0, 3.0, 4.0, 0.0]);
/// # Ok::<(), convcheck_core::MatrixError>(())
/// ```
#[must_use]
pub fn full_convolution(a: &Matrix, b: &Matrix) -> Matrix {
    let m = b.size();
    let size = a.size() + m - 1;
    let mut values = vec![0.0_f64; size * size];

    for (i, signal_row) in a.rows().enumerate() {
        for (p, kernel_row) in b.rows().enumerate() {
            let Some(target_row) = values.chunks_exact_mut(size).nth(i + p) else {
                continue;
            };
            for (j, &signal) in signal_row.iter().enumerate() {
                let Some(window) = target_row.get_mut(j..j + m) else {
                    continue;
                };
                for (cell, &weight) in window.iter_mut().zip(kernel_row) {
                    *cell += signal * weight;
                }
            }
        }
    }

    Matrix::from_parts(size, values)
}

/// Computes the centred `n × n` window of the full convolution of `a` with
/// `b`.
///
/// # Examples
/// ```
/// use convcheck_core::{Matrix, reference::same_convolution};
///
/// let expected = same_convolution(&Matrix::ones(5)?, &Matrix::ones(3)?);
/// assert_eq!(expected.get(0, 0), Some(4.0));
/// assert_eq!(expected.get(0, 2), Some(6.0));
/// assert_eq!(expected.get(2, 2), Some(9.0));
/// # Ok::<(), convcheck_core::MatrixError>(())
/// ```
#[must_use]
#[instrument(
    name = "reference.same_convolution",
    level = "debug",
    skip_all,
    fields(n = a.size(), m = b.size()),
)]
pub fn same_convolution(a: &Matrix, b: &Matrix) -> Matrix {
    let full = full_convolution(a, b);
    centred_window(&full, b.size() / 2, a.size())
}

fn centred_window(full: &Matrix, offset: usize, size: usize) -> Matrix {
    let values = full
        .rows()
        .skip(offset)
        .take(size)
        .flat_map(|row| row.iter().skip(offset).take(size).copied())
        .collect();
    Matrix::from_parts(size, values)
}
