//! Plain-text protocol shared with the convolution program.
//!
//! The input file starts with a header line `"<n> <m>"`, followed by the `n`
//! rows of the signal and the `m` rows of the kernel, one row per line with
//! values separated by single spaces. No blank line follows the last kernel
//! row.
//!
//! The output file carries no header: it holds `k` lines of `k` values and
//! the side length is inferred from the line count. Values on both sides are
//! read at double precision; rounding in the program is left to the
//! comparison tolerance.

use std::io::{self, Write};

use crate::error::{FormatError, Operand};
use crate::matrix::{Matrix, element_count};

/// Upper bound on values reserved before any are parsed.
const PREALLOCATION_LIMIT: usize = 1 << 20;

/// Renders the input protocol for signal `a` and kernel `b`.
///
/// # Examples
/// ```
/// use convcheck_core::{Matrix, codec::encode_input};
///
/// let a = Matrix::ones(2)?;
/// let b = Matrix::filled(1, 0.5)?;
/// assert_eq!(encode_input(&a, &b), "2 1\n1 1\n1 1\n0.5");
/// # Ok::<(), convcheck_core::MatrixError>(())
/// ```
#[must_use]
pub fn encode_input(a: &Matrix, b: &Matrix) -> String {
    format!(
        "{} {}\n{}\n{}",
        a.size(),
        b.size(),
        render_matrix(a),
        render_matrix(b)
    )
}

/// Streams the input protocol for signal `a` and kernel `b` into `writer`.
///
/// Produces exactly the text of [`encode_input`] without building it in
/// memory first; the 1024-wide cases are several megabytes.
///
/// # Errors
/// Returns any error raised by `writer`.
pub fn write_input<W: Write>(mut writer: W, a: &Matrix, b: &Matrix) -> io::Result<()> {
    writeln!(writer, "{} {}", a.size(), b.size())?;
    write_rows(&mut writer, a)?;
    writeln!(writer)?;
    write_rows(&mut writer, b)
}

/// Renders `matrix` as newline-separated rows of space-separated values, with
/// no trailing newline.
///
/// # Examples
/// ```
/// use convcheck_core::{Matrix, codec::render_matrix};
///
/// let matrix = Matrix::from_rows(vec![vec![1.0, 2.5], vec![-3.0, 4.0]])?;
/// assert_eq!(render_matrix(&matrix), "1 2.5\n-3 4");
/// # Ok::<(), convcheck_core::MatrixError>(())
/// ```
#[must_use]
pub fn render_matrix(matrix: &Matrix) -> String {
    let mut buffer = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_rows(&mut buffer, matrix);
    String::from_utf8_lossy(&buffer).into_owned()
}

fn write_rows<W: Write>(writer: &mut W, matrix: &Matrix) -> io::Result<()> {
    for (index, row) in matrix.rows().enumerate() {
        if index > 0 {
            writeln!(writer)?;
        }
        let mut cells = row.iter();
        if let Some(first) = cells.next() {
            write!(writer, "{first}")?;
        }
        for cell in cells {
            write!(writer, " {cell}")?;
        }
    }
    Ok(())
}

/// Parses the program's output into a `k × k` matrix, `k` being the number of
/// lines. Trailing blank lines are ignored.
///
/// # Errors
/// Returns [`FormatError::Empty`] when there are no lines,
/// [`FormatError::RaggedRow`] when a line does not hold `k` values, and
/// [`FormatError::InvalidToken`] or [`FormatError::NonFinite`] for tokens that
/// are not finite numbers.
///
/// # Examples
/// ```
/// use convcheck_core::codec::decode_output;
///
/// let matrix = decode_output("4 6 \n6 9 \n")?;
/// assert_eq!(matrix.size(), 2);
/// assert_eq!(matrix.get(1, 1), Some(9.0));
/// # Ok::<(), convcheck_core::FormatError>(())
/// ```
pub fn decode_output(text: &str) -> Result<Matrix, FormatError> {
    let lines: Vec<&str> = text.trim_end().lines().collect();
    let size = lines.len();
    if size == 0 {
        return Err(FormatError::Empty);
    }

    let mut values = Vec::with_capacity(size.saturating_mul(size).min(PREALLOCATION_LIMIT));
    for (index, line) in lines.iter().enumerate() {
        let row_start = values.len();
        for token in tokens_of_line(index, line) {
            values.push(token.parse_double()?);
        }
        let actual = values.len() - row_start;
        if actual != size {
            return Err(FormatError::RaggedRow {
                line: index + 1,
                expected: size,
                actual,
            });
        }
    }
    Ok(Matrix::from_parts(size, values))
}

/// Parses the input protocol back into its signal and kernel.
///
/// This is the program's side of the contract: like a stream extractor it
/// only cares about the order of whitespace-separated tokens, not about line
/// breaks.
///
/// # Errors
/// Returns [`FormatError::InvalidHeader`] when the two sizes are missing or
/// not unsigned integers, [`FormatError::Matrix`] when a size is zero,
/// [`FormatError::MissingValues`] when the text ends early,
/// [`FormatError::TrailingContent`] when tokens follow the kernel, and the
/// token errors of [`decode_output`].
///
/// # Examples
/// ```
/// use convcheck_core::codec::decode_input;
///
/// let (a, b) = decode_input("2 1\n1 2\n3 4\n5")?;
/// assert_eq!(a.get(1, 0), Some(3.0));
/// assert_eq!(b.get(0, 0), Some(5.0));
/// # Ok::<(), convcheck_core::FormatError>(())
/// ```
pub fn decode_input(text: &str) -> Result<(Matrix, Matrix), FormatError> {
    let mut tokens = text
        .lines()
        .enumerate()
        .flat_map(|(index, line)| tokens_of_line(index, line));

    let n = read_size(tokens.next())?;
    let m = read_size(tokens.next())?;
    let a = read_operand(&mut tokens, Operand::Signal, n)?;
    let b = read_operand(&mut tokens, Operand::Kernel, m)?;

    let count = tokens.count();
    if count > 0 {
        return Err(FormatError::TrailingContent { count });
    }
    Ok((a, b))
}

fn read_size(token: Option<Token<'_>>) -> Result<usize, FormatError> {
    let Some(token) = token else {
        return Err(FormatError::InvalidHeader {
            found: String::new(),
        });
    };
    token
        .text
        .parse::<usize>()
        .map_err(|_| FormatError::InvalidHeader {
            found: token.text.to_owned(),
        })
}

fn read_operand<'a>(
    tokens: &mut impl Iterator<Item = Token<'a>>,
    operand: Operand,
    size: usize,
) -> Result<Matrix, FormatError> {
    let expected = element_count(size)?;
    let mut values = Vec::with_capacity(expected.min(PREALLOCATION_LIMIT));
    for token in tokens.by_ref().take(expected) {
        values.push(token.parse_double()?);
    }
    if values.len() != expected {
        return Err(FormatError::MissingValues {
            operand,
            expected,
            actual: values.len(),
        });
    }
    Ok(Matrix::from_parts(size, values))
}

/// A whitespace-separated token with its one-based position.
#[derive(Clone, Copy, Debug)]
struct Token<'a> {
    line: usize,
    column: usize,
    text: &'a str,
}

impl Token<'_> {
    fn parse_double(self) -> Result<f64, FormatError> {
        let value = self.text.parse::<f64>().map_err(|_| self.invalid())?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(self.non_finite())
        }
    }

    fn invalid(self) -> FormatError {
        FormatError::InvalidToken {
            line: self.line,
            column: self.column,
            token: self.text.to_owned(),
        }
    }

    fn non_finite(self) -> FormatError {
        FormatError::NonFinite {
            line: self.line,
            column: self.column,
            token: self.text.to_owned(),
        }
    }
}

fn tokens_of_line(index: usize, line: &str) -> impl Iterator<Item = Token<'_>> {
    line.split_whitespace()
        .enumerate()
        .map(move |(column, text)| Token {
            line: index + 1,
            column: column + 1,
            text,
        })
}
