//! Command implementations and argument parsing for the convcheck CLI.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use convcheck_core::{
    CaseRunner, ConvolutionProgram, DEFAULT_INPUT, DEFAULT_OUTPUT, DEFAULT_PROGRAM,
    ExternalProgram, HarnessError, TestCase, TestRegistry, Verdict, Workspace,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

use super::report::{render_case_names, render_outcome, render_tip};

const DEFAULT_WORKDIR: &str = ".";

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "convcheck",
    about = "Check an external 2D convolution program against a reference implementation."
)]
pub struct Cli {
    /// Command to execute; `run` with default options when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the registered test cases against the program.
    Run(RunCommand),
    /// Print the registered test case names in execution order.
    List,
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone, PartialEq, Eq)]
pub struct RunCommand {
    /// Program under test, resolved against the working directory.
    #[arg(long, default_value = DEFAULT_PROGRAM)]
    pub program: PathBuf,

    /// Directory the program runs in and where the protocol files live.
    #[arg(long, default_value = DEFAULT_WORKDIR)]
    pub workdir: PathBuf,

    /// Name of the input file handed to the program.
    #[arg(long, default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Name of the output file the program writes.
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Only run test cases whose name contains this text.
    #[arg(long)]
    pub filter: Option<String>,
}

impl Default for RunCommand {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            workdir: PathBuf::from(DEFAULT_WORKDIR),
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            filter: None,
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Writing the report failed.
    #[error("failed to write report: {source}")]
    Io {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A fatal harness failure aborted the run.
    #[error(transparent)]
    Harness(#[from] HarnessError),
    /// The filter excluded every registered test case.
    #[error("no registered test case matches `{filter}`")]
    NoMatchingCases {
        /// Filter supplied on the command line.
        filter: String,
    },
}

impl From<io::Error> for CliError {
    fn from(source: io::Error) -> Self {
        Self::Io { source }
    }
}

/// Verdict counts for one run of the suite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuiteSummary {
    /// Cases whose output matched the reference.
    pub passed: usize,
    /// Cases whose output differed from the reference.
    pub mismatched: usize,
    /// Cases that failed before a comparison was possible.
    pub errored: usize,
}

impl SuiteSummary {
    fn record(&mut self, verdict: &Verdict) {
        match verdict {
            Verdict::Ok => self.passed += 1,
            Verdict::Mismatch { .. } => self.mismatched += 1,
            Verdict::Error(_) => self.errored += 1,
        }
    }

    /// Number of cases run.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.passed + self.mismatched + self.errored
    }

    /// `true` when no case failed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.mismatched == 0 && self.errored == 0
    }
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionSummary {
    /// `list` printed this many names.
    Listed {
        /// Number of registered cases.
        cases: usize,
    },
    /// `run` finished with these counts.
    Suite(SuiteSummary),
}

impl ExecutionSummary {
    /// `true` unless a test case failed.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        match self {
            Self::Listed { .. } => true,
            Self::Suite(summary) => summary.all_passed(),
        }
    }
}

/// Executes the CLI command represented by `cli` against `registry`,
/// streaming the report to `writer`.
///
/// # Errors
/// Returns [`CliError`] when the report cannot be written, a filter matches
/// nothing, or stale protocol files cannot be removed.
///
/// # Examples
/// ```
/// # use convcheck_cli::cli::{Cli, Command, ExecutionSummary, run_cli};
/// # use convcheck_core::TestRegistry;
/// let cli = Cli { command: Some(Command::List) };
/// let mut buffer = Vec::new();
/// let summary = run_cli(cli, &TestRegistry::builtin(), &mut buffer)?;
/// assert_eq!(summary, ExecutionSummary::Listed { cases: 6 });
/// assert!(String::from_utf8_lossy(&buffer).starts_with("test_5x3\n"));
/// # Ok::<(), convcheck_cli::cli::CliError>(())
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip_all,
    fields(command = field::Empty),
)]
pub fn run_cli(
    cli: Cli,
    registry: &TestRegistry,
    mut writer: impl Write,
) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Some(Command::List) => {
            Span::current().record("command", field::display("list"));
            render_case_names(registry, &mut writer)?;
            Ok(ExecutionSummary::Listed {
                cases: registry.len(),
            })
        }
        Some(Command::Run(run)) => {
            Span::current().record("command", field::display("run"));
            run_command(&run, registry, writer).map(ExecutionSummary::Suite)
        }
        None => {
            Span::current().record("command", field::display("run"));
            run_command(&RunCommand::default(), registry, writer).map(ExecutionSummary::Suite)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip_all,
    fields(program = %command.program.display(), workdir = %command.workdir.display()),
)]
pub(super) fn run_command(
    command: &RunCommand,
    registry: &TestRegistry,
    mut writer: impl Write,
) -> Result<SuiteSummary, CliError> {
    let workspace = Workspace::with_file_names(&command.workdir, &command.input, &command.output);
    let program = ExternalProgram::new(&command.program);
    let runner = CaseRunner::new(&workspace, &program);

    render_tip(&mut writer)?;
    writer.flush()?;
    run_suite(registry, &runner, command.filter.as_deref(), writer)
}

/// Runs every case of `registry` selected by `filter` in registration order,
/// writing each outcome followed by a blank line.
///
/// # Errors
/// Returns [`CliError::NoMatchingCases`] when `filter` excludes every case,
/// [`CliError::Harness`] when stale protocol files cannot be removed before
/// a case, and [`CliError::Io`] when the report cannot be written.
#[instrument(
    name = "cli.suite",
    err,
    skip_all,
    fields(cases = field::Empty, filter = field::Empty),
)]
pub fn run_suite<P>(
    registry: &TestRegistry,
    runner: &CaseRunner<'_, P>,
    filter: Option<&str>,
    mut writer: impl Write,
) -> Result<SuiteSummary, CliError>
where
    P: ConvolutionProgram + ?Sized,
{
    let selected: Vec<&TestCase> = registry
        .iter()
        .filter(|case| filter.is_none_or(|needle| case.name().contains(needle)))
        .collect();
    let span = Span::current();
    span.record("cases", selected.len());
    if let Some(needle) = filter {
        span.record("filter", needle);
        if selected.is_empty() {
            return Err(CliError::NoMatchingCases {
                filter: needle.to_owned(),
            });
        }
    }

    let mut summary = SuiteSummary::default();
    for case in selected {
        let outcome = runner.run(case)?;
        render_outcome(&outcome, &mut writer)?;
        writeln!(writer)?;
        writer.flush()?;
        summary.record(&outcome.verdict);
    }

    info!(
        passed = summary.passed,
        mismatched = summary.mismatched,
        errored = summary.errored,
        "suite completed"
    );
    Ok(summary)
}
