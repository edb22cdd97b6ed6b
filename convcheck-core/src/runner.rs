//! Runs one test case against the program under test.
//!
//! Each case walks `Clean → Written → Invoked → Read → Verified`. Cleaning
//! failures are fatal to the whole run and surface as `Err`; every later
//! failure is folded into a [`Verdict::Error`] so the remaining cases still
//! run.

use std::fmt;

use tracing::{Span, field, info, instrument, warn};

use crate::compare::{matches_within_tolerance, max_abs_difference};
use crate::error::{HarnessError, HarnessErrorCode, Result};
use crate::matrix::Matrix;
use crate::program::{ConvolutionProgram, Invocation};
use crate::reference::same_convolution;
use crate::registry::TestCase;
use crate::workspace::Workspace;

/// States of a single test case run.
///
/// Only `Written`, `Invoked` and `Read` ever appear in a [`CaseFailure`]:
/// a cleaning failure aborts the run instead, and verification cannot fail.
/// `Clean` and `Verified` label the ends of the walk in logs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stage {
    /// Stale files removed.
    Clean,
    /// Input file written.
    Written,
    /// Program ran to completion.
    Invoked,
    /// Output file decoded.
    Read,
    /// Output compared against the reference.
    Verified,
}

impl Stage {
    /// Lower-case label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Written => "written",
            Self::Invoked => "invoked",
            Self::Read => "read",
            Self::Verified => "verified",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a case ended in [`Verdict::Error`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseFailure {
    /// Stage the case failed to reach: `Written`, `Invoked` or `Read`.
    pub stage: Stage,
    /// Stable classification of the failure.
    pub code: HarnessErrorCode,
    /// Rendered error message.
    pub message: String,
}

impl CaseFailure {
    fn new(stage: Stage, error: &HarnessError) -> Self {
        Self {
            stage,
            code: error.code(),
            message: error.to_string(),
        }
    }
}

/// Outcome of one test case.
#[derive(Clone, Debug, PartialEq)]
pub enum Verdict {
    /// The program's output matched the reference.
    Ok,
    /// The program produced a matrix that differs from the reference.
    Mismatch {
        /// Reference result.
        expected: Matrix,
        /// Matrix decoded from the output file.
        actual: Matrix,
        /// Largest element-wise difference, absent when the shapes differ or a
        /// difference is not finite.
        max_difference: Option<f64>,
    },
    /// Writing, running or reading failed.
    Error(CaseFailure),
}

impl Verdict {
    /// `true` for [`Verdict::Ok`].
    #[must_use]
    pub const fn passed(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Short label used in logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Mismatch { .. } => "mismatch",
            Self::Error(_) => "error",
        }
    }
}

/// Named [`Verdict`] plus how the program exited, when it ran.
#[derive(Clone, Debug, PartialEq)]
pub struct CaseOutcome {
    /// Name of the case.
    pub name: String,
    /// Result of the comparison.
    pub verdict: Verdict,
    /// Exit of the program; `None` when it never ran.
    pub invocation: Option<Invocation>,
}

/// Drives test cases through a [`Workspace`] and a [`ConvolutionProgram`].
///
/// # Examples
/// ```no_run
/// use convcheck_core::{CaseRunner, ExternalProgram, TestRegistry, Workspace};
///
/// let workspace = Workspace::new(".");
/// let program = ExternalProgram::default();
/// let runner = CaseRunner::new(&workspace, &program);
/// for case in &TestRegistry::builtin() {
///     let outcome = runner.run(case)?;
///     println!("{}: {}", outcome.name, outcome.verdict.label());
/// }
/// # Ok::<(), convcheck_core::HarnessError>(())
/// ```
#[derive(Debug)]
pub struct CaseRunner<'a, P: ?Sized> {
    workspace: &'a Workspace,
    program: &'a P,
}

impl<'a, P> CaseRunner<'a, P>
where
    P: ConvolutionProgram + ?Sized,
{
    /// Creates a runner over `workspace` and `program`.
    pub const fn new(workspace: &'a Workspace, program: &'a P) -> Self {
        Self { workspace, program }
    }

    /// Runs `case` once.
    ///
    /// # Errors
    /// Returns [`HarnessError::Filesystem`] when stale files cannot be
    /// removed. Every later failure is reported through
    /// [`Verdict::Error`].
    #[instrument(
        name = "runner.case",
        err,
        skip_all,
        fields(case = case.name(), program = self.program.name(), verdict = field::Empty),
    )]
    pub fn run(&self, case: &TestCase) -> Result<CaseOutcome> {
        self.workspace.clean()?;

        let mut invocation = None;
        let verdict = match self.execute(case, &mut invocation) {
            Ok(verdict) => verdict,
            Err((stage, error)) => {
                warn!(stage = %stage, code = %error.code(), error = %error, "test case failed");
                Verdict::Error(CaseFailure::new(stage, &error))
            }
        };

        Span::current().record("verdict", verdict.label());
        info!(verdict = verdict.label(), "test case finished");
        Ok(CaseOutcome {
            name: case.name().to_owned(),
            verdict,
            invocation,
        })
    }

    fn execute(
        &self,
        case: &TestCase,
        invocation: &mut Option<Invocation>,
    ) -> core::result::Result<Verdict, (Stage, HarnessError)> {
        let (a, b) = case
            .generate()
            .map_err(|error| (Stage::Written, HarnessError::from(error)))?;
        let expected = same_convolution(&a, &b);

        self.workspace
            .write_input(&a, &b)
            .map_err(|error| (Stage::Written, error))?;
        *invocation = Some(
            self.program
                .invoke(self.workspace)
                .map_err(|error| (Stage::Invoked, error))?,
        );
        let actual = self
            .workspace
            .read_output()
            .map_err(|error| (Stage::Read, error))?;

        Ok(verify(expected, actual))
    }
}

#[instrument(name = "runner.verify", level = "debug", skip_all, fields(size = expected.size()))]
fn verify(expected: Matrix, actual: Matrix) -> Verdict {
    if matches_within_tolerance(&expected, &actual) {
        return Verdict::Ok;
    }
    let max_difference = max_abs_difference(&expected, &actual);
    Verdict::Mismatch {
        expected,
        actual,
        max_difference,
    }
}
