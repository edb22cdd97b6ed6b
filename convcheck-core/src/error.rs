//! Error types for the convcheck harness.
//!
//! [`FormatError`] describes malformed protocol text. [`HarnessError`] wraps
//! every failure the harness can meet while driving one test case and carries
//! a stable [`HarnessErrorCode`] for reporting.

use std::{fmt, io, path::PathBuf};

use thiserror::Error;

use crate::matrix::MatrixError;

/// Identifies which operand of the convolution a value belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operand {
    /// The `n × n` input matrix.
    Signal,
    /// The `m × m` kernel matrix.
    Kernel,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signal => f.write_str("signal"),
            Self::Kernel => f.write_str("kernel"),
        }
    }
}

/// Malformed matrix text.
///
/// Line and column numbers are one-based so they match what an editor shows.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FormatError {
    /// The text held no rows at all.
    #[error("matrix text contains no rows")]
    Empty,
    /// A row of the output did not have one value per line of the output.
    #[error("line {line} has {actual} values but a {expected}x{expected} matrix needs {expected}")]
    RaggedRow {
        /// Offending line.
        line: usize,
        /// Values required per row, equal to the number of lines.
        expected: usize,
        /// Values found on the line.
        actual: usize,
    },
    /// A token could not be parsed as a number.
    #[error("token `{token}` at line {line}, column {column} is not a number")]
    InvalidToken {
        /// Line holding the token.
        line: usize,
        /// Position of the token within its line.
        column: usize,
        /// Raw token text.
        token: String,
    },
    /// A token parsed to NaN or an infinity.
    #[error("token `{token}` at line {line}, column {column} is not finite")]
    NonFinite {
        /// Line holding the token.
        line: usize,
        /// Position of the token within its line.
        column: usize,
        /// Raw token text.
        token: String,
    },
    /// The input header did not start with two sizes.
    #[error("header must start with two sizes `n m`, found `{found}`")]
    InvalidHeader {
        /// Token found where a size was expected, empty when the text ended.
        found: String,
    },
    /// The input ended before an operand was complete.
    #[error("{operand} matrix needs {expected} values but only {actual} were present")]
    MissingValues {
        /// Operand being read when the text ran out.
        operand: Operand,
        /// Values the header announced.
        expected: usize,
        /// Values actually present.
        actual: usize,
    },
    /// Extra tokens followed the kernel matrix.
    #[error("{count} unexpected tokens follow the kernel matrix")]
    TrailingContent {
        /// Number of surplus tokens.
        count: usize,
    },
    /// The announced sizes do not describe a valid matrix.
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

/// Filesystem action that failed, used to label [`HarnessError::Filesystem`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FsOperation {
    /// Removing a stale file before a test.
    Remove,
    /// Creating or writing the input file.
    Write,
    /// Reading the output file.
    Read,
}

impl fmt::Display for FsOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remove => f.write_str("remove"),
            Self::Write => f.write_str("write"),
            Self::Read => f.write_str("read"),
        }
    }
}

/// Failure raised while running a test case.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A protocol file contained malformed text.
    #[error("`{path}` is malformed: {source}")]
    Format {
        /// File that failed to parse.
        path: PathBuf,
        /// Parse failure.
        #[source]
        source: FormatError,
    },
    /// The program did not leave an output file behind.
    #[error("`{path}` does not exist after the program ran")]
    MissingResource {
        /// Path where the output was expected.
        path: PathBuf,
    },
    /// An unexpected filesystem failure.
    #[error("failed to {operation} `{path}`: {source}")]
    Filesystem {
        /// Action that failed.
        operation: FsOperation,
        /// File the action targeted.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The program could not be started.
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        /// Resolved path of the program.
        program: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// A test case generator could not build its matrices.
    #[error("test case generator failed: {0}")]
    InvalidCase(#[from] MatrixError),
}

/// Stable machine-readable codes for [`HarnessError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum HarnessErrorCode {
    /// Malformed protocol text.
    Format,
    /// Output file missing after invocation.
    MissingResource,
    /// Unexpected filesystem failure.
    Filesystem,
    /// Program launch failure.
    Launch,
    /// Generator failure.
    InvalidCase,
}

impl HarnessErrorCode {
    /// Return the stable machine-readable representation of this error code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Format => "FORMAT",
            Self::MissingResource => "MISSING_RESOURCE",
            Self::Filesystem => "FILESYSTEM",
            Self::Launch => "LAUNCH",
            Self::InvalidCase => "INVALID_CASE",
        }
    }
}

impl fmt::Display for HarnessErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl HarnessError {
    /// Retrieve the stable [`HarnessErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> HarnessErrorCode {
        match self {
            Self::Format { .. } => HarnessErrorCode::Format,
            Self::MissingResource { .. } => HarnessErrorCode::MissingResource,
            Self::Filesystem { .. } => HarnessErrorCode::Filesystem,
            Self::Launch { .. } => HarnessErrorCode::Launch,
            Self::InvalidCase(_) => HarnessErrorCode::InvalidCase,
        }
    }
}

/// Convenient alias for harness operations.
pub type Result<T> = core::result::Result<T, HarnessError>;
