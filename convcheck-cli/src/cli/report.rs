//! Plain-text report written to standard output.

use std::io::{self, Write};

use convcheck_core::codec::render_matrix;
use convcheck_core::{CaseOutcome, TestRegistry, Verdict};

/// Reminder printed before the first case.
pub const TIP: &str = "tip: Please, run this tests in the same folder as executable is";

/// Detail line for cases that failed before a comparison was possible.
pub const UNEXPECTED_ERROR: &str = "Unexpected error during the execution.";

/// Writes the tip line followed by a blank line.
///
/// # Errors
/// Propagates failures from `writer`.
pub fn render_tip(mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "{TIP}")?;
    writeln!(writer)
}

/// Writes the status line of `outcome` and, on failure, its detail.
///
/// A mismatch prints both matrices; an error prints a fixed line, with the
/// cause left to the logs.
///
/// # Errors
/// Propagates failures from `writer`.
pub fn render_outcome(outcome: &CaseOutcome, mut writer: impl Write) -> io::Result<()> {
    match &outcome.verdict {
        Verdict::Ok => writeln!(writer, "{}: OK", outcome.name),
        Verdict::Mismatch {
            expected, actual, ..
        } => {
            writeln!(writer, "{}: Fail", outcome.name)?;
            writeln!(
                writer,
                "expected: {}\n actual: {}",
                render_matrix(expected),
                render_matrix(actual)
            )
        }
        Verdict::Error(_) => {
            writeln!(writer, "{}: Fail", outcome.name)?;
            writeln!(writer, "{UNEXPECTED_ERROR}")
        }
    }
}

/// Writes one registered case name per line.
///
/// # Errors
/// Propagates failures from `writer`.
pub fn render_case_names(registry: &TestRegistry, mut writer: impl Write) -> io::Result<()> {
    for name in registry.names() {
        writeln!(writer, "{name}")?;
    }
    Ok(())
}
