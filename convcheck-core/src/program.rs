//! The convolution program under test.

use std::path::{self, Path, PathBuf};
use std::process::{Command, ExitStatus};

use tracing::{instrument, warn};

use crate::error::{HarnessError, Result};
use crate::workspace::Workspace;

/// Default location of the program, relative to the workspace.
pub const DEFAULT_PROGRAM: &str = "./convolution";

/// Something that reads the workspace input file and writes its output file.
///
/// The harness only ever learns what the program did through the output
/// file; the [`Invocation`] is kept for diagnostics.
pub trait ConvolutionProgram {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    /// Runs the program to completion against `workspace`.
    ///
    /// # Errors
    /// Returns [`HarnessError::Launch`] when the program cannot be started.
    fn invoke(&self, workspace: &Workspace) -> Result<Invocation>;
}

/// How a program run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Invocation {
    success: bool,
    code: Option<i32>,
}

impl Invocation {
    /// A run that exited with status zero.
    #[must_use]
    pub const fn succeeded() -> Self {
        Self {
            success: true,
            code: Some(0),
        }
    }

    /// A run that exited with a non-zero `code`, or was killed when `code` is
    /// `None`.
    #[must_use]
    pub const fn failed(code: Option<i32>) -> Self {
        Self {
            success: false,
            code,
        }
    }

    /// `true` when the program exited with status zero.
    #[must_use]
    pub const fn success(self) -> bool {
        self.success
    }

    /// Exit code, absent when the program was terminated by a signal.
    #[must_use]
    pub const fn code(self) -> Option<i32> {
        self.code
    }
}

impl From<ExitStatus> for Invocation {
    fn from(status: ExitStatus) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
        }
    }
}

/// A standalone executable, run with no arguments and inherited stdio from
/// inside the workspace directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalProgram {
    path: PathBuf,
    name: String,
}

impl ExternalProgram {
    /// Wraps the executable at `path`.
    ///
    /// Paths with more than one component (such as `./convolution`) are
    /// resolved against the workspace directory; bare names are looked up on
    /// `PATH`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }

    /// Path as configured.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn resolve(&self, workspace: &Workspace) -> Result<PathBuf> {
        if self.path.components().count() <= 1 && self.path.is_relative() {
            return Ok(self.path.clone());
        }
        let joined = workspace.root().join(&self.path);
        path::absolute(&joined).map_err(|source| HarnessError::Launch {
            program: joined,
            source,
        })
    }
}

impl Default for ExternalProgram {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl ConvolutionProgram for ExternalProgram {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "program.invoke",
        err,
        skip_all,
        fields(program = %self.name, workdir = %workspace.root().display()),
    )]
    fn invoke(&self, workspace: &Workspace) -> Result<Invocation> {
        let program = self.resolve(workspace)?;
        let status = Command::new(&program)
            .current_dir(workspace.root())
            .status()
            .map_err(|source| HarnessError::Launch { program, source })?;
        let invocation = Invocation::from(status);
        if !invocation.success() {
            // The verdict depends on the output file alone.
            warn!(
                program = %self.name,
                code = ?invocation.code(),
                "program exited unsuccessfully"
            );
        }
        Ok(invocation)
    }
}
