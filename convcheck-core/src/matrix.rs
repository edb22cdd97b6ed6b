//! Square row-major matrices exchanged with the program under test.
//!
//! Every matrix handled by the harness is square: the input signal is `n × n`,
//! the kernel is `m × m` and the program answers with a `k × k` grid. The type
//! enforces that invariant at construction so downstream code can index rows
//! without re-validating shapes.

use std::slice::ChunksExact;

use thiserror::Error;

/// Errors raised while constructing a [`Matrix`].
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum MatrixError {
    /// Matrices must have at least one row and one column.
    #[error("matrix side length must be at least 1")]
    ZeroSize,
    /// A row did not have as many values as there are rows.
    #[error("row {row} has {actual} values but the matrix is {expected}x{expected}")]
    NotSquare {
        /// Zero-based index of the offending row.
        row: usize,
        /// Side length implied by the number of rows.
        expected: usize,
        /// Number of values found in the row.
        actual: usize,
    },
    /// A flat buffer did not hold `size * size` values.
    #[error("a {size}x{size} matrix needs {expected} values but {actual} were supplied")]
    LengthMismatch {
        /// Requested side length.
        size: usize,
        /// Number of values the side length requires.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },
    /// The requested side length does not fit in memory arithmetic.
    #[error("a {size}x{size} matrix exceeds addressable capacity")]
    CapacityOverflow {
        /// Requested side length.
        size: usize,
    },
}

/// Square grid of `f64` values stored in row-major order.
///
/// # Examples
/// ```
/// use convcheck_core::Matrix;
///
/// let matrix = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]])?;
/// assert_eq!(matrix.size(), 2);
/// assert_eq!(matrix.get(1, 0), Some(3.0));
/// # Ok::<(), convcheck_core::MatrixError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    size: usize,
    values: Vec<f64>,
}

impl Matrix {
    /// Builds a `size × size` matrix with every element set to `value`.
    ///
    /// # Errors
    /// Returns [`MatrixError::ZeroSize`] when `size` is zero and
    /// [`MatrixError::CapacityOverflow`] when `size * size` overflows.
    pub fn filled(size: usize, value: f64) -> Result<Self, MatrixError> {
        let len = element_count(size)?;
        Ok(Self {
            size,
            values: vec![value; len],
        })
    }

    /// Builds a `size × size` matrix of ones.
    ///
    /// # Errors
    /// Same conditions as [`Self::filled`].
    pub fn ones(size: usize) -> Result<Self, MatrixError> {
        Self::filled(size, 1.0)
    }

    /// Builds a `size × size` matrix of zeros.
    ///
    /// # Errors
    /// Same conditions as [`Self::filled`].
    pub fn zeros(size: usize) -> Result<Self, MatrixError> {
        Self::filled(size, 0.0)
    }

    /// Builds a matrix from a flat row-major buffer.
    ///
    /// # Errors
    /// Returns [`MatrixError::LengthMismatch`] when `values` does not hold
    /// exactly `size * size` elements, plus the conditions of [`Self::filled`].
    ///
    /// # Examples
    /// ```
    /// use convcheck_core::{Matrix, MatrixError};
    ///
    /// let err = Matrix::from_row_major(2, vec![1.0; 3]).unwrap_err();
    /// assert!(matches!(err, MatrixError::LengthMismatch { expected: 4, actual: 3, .. }));
    /// ```
    pub fn from_row_major(size: usize, values: Vec<f64>) -> Result<Self, MatrixError> {
        let expected = element_count(size)?;
        if values.len() != expected {
            return Err(MatrixError::LengthMismatch {
                size,
                expected,
                actual: values.len(),
            });
        }
        Ok(Self { size, values })
    }

    /// Builds a matrix from explicit rows. The number of rows fixes the side
    /// length and every row must match it.
    ///
    /// # Errors
    /// Returns [`MatrixError::ZeroSize`] for an empty row list and
    /// [`MatrixError::NotSquare`] for the first row of the wrong length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, MatrixError> {
        let size = rows.len();
        let mut values = Vec::with_capacity(element_count(size)?);
        for (row, cells) in rows.into_iter().enumerate() {
            if cells.len() != size {
                return Err(MatrixError::NotSquare {
                    row,
                    expected: size,
                    actual: cells.len(),
                });
            }
            values.extend(cells);
        }
        Ok(Self { size, values })
    }

    /// Wraps a buffer whose length the caller has already checked.
    pub(crate) fn from_parts(size: usize, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), size * size);
        Self { size, values }
    }

    /// Side length of the matrix.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns the element at (`row`, `column`), or `None` when out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        if row >= self.size || column >= self.size {
            return None;
        }
        self.values.get(row * self.size + column).copied()
    }

    /// Iterates over the rows in order.
    pub fn rows(&self) -> ChunksExact<'_, f64> {
        self.values.chunks_exact(self.size)
    }

    /// Row-major view of every element.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

pub(crate) fn element_count(size: usize) -> Result<usize, MatrixError> {
    if size == 0 {
        return Err(MatrixError::ZeroSize);
    }
    size.checked_mul(size)
        .ok_or(MatrixError::CapacityOverflow { size })
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(8)]
    fn filled_produces_square_grid(#[case] size: usize) {
        let matrix = Matrix::filled(size, 2.5).expect("size is positive");
        assert_eq!(matrix.size(), size);
        assert_eq!(matrix.rows().len(), size);
        assert!(matrix.rows().all(|row| row.len() == size));
        assert!(matrix.as_slice().iter().all(|&value| value == 2.5));
    }

    #[test]
    fn zero_size_is_rejected() {
        assert_eq!(Matrix::ones(0), Err(MatrixError::ZeroSize));
        assert_eq!(Matrix::from_rows(Vec::new()), Err(MatrixError::ZeroSize));
    }

    #[test]
    fn overflowing_size_is_rejected() {
        let err = Matrix::zeros(usize::MAX).expect_err("size overflows");
        assert_eq!(err, MatrixError::CapacityOverflow { size: usize::MAX });
    }

    #[test]
    fn from_rows_reports_first_ragged_row() {
        let err = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).expect_err("row 1 is short");
        assert_eq!(
            err,
            MatrixError::NotSquare {
                row: 1,
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn get_is_bounds_checked() {
        let matrix =
            Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).expect("rows are square");
        assert_eq!(matrix.get(0, 1), Some(2.0));
        assert_eq!(matrix.get(2, 0), None);
        assert_eq!(matrix.get(0, 2), None);
    }
}
