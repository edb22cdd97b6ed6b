//! Command-line interface for the convolution checker.
//!
//! `run` (the default) executes every registered test case against the
//! program under test and prints a report; `list` prints the case names.

mod commands;
mod report;

pub use commands::{
    Cli, CliError, Command, ExecutionSummary, RunCommand, SuiteSummary, run_cli, run_suite,
};
pub use report::{TIP, UNEXPECTED_ERROR, render_case_names, render_outcome, render_tip};

#[cfg(test)]
mod test_helpers;
#[cfg(test)]
mod tests;
