//! Program doubles and fixtures shared across CLI tests.

use std::fs;
use std::io;

use convcheck_core::codec::{decode_input, render_matrix};
use convcheck_core::reference::same_convolution;
use convcheck_core::registry::sqr_ones;
use convcheck_core::{
    CaseRunner, ConvolutionProgram, HarnessError, Invocation, Result, TestRegistry, Workspace,
};
use tempfile::TempDir;

use super::{CliError, SuiteSummary, run_suite};

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

/// Solves the input in-process and writes the result scaled by `scale`.
pub(super) struct OracleProgram {
    pub(super) scale: f64,
}

impl OracleProgram {
    pub(super) const fn exact() -> Self {
        Self { scale: 1.0 }
    }
}

impl ConvolutionProgram for OracleProgram {
    fn name(&self) -> &str {
        "oracle"
    }

    fn invoke(&self, workspace: &Workspace) -> Result<Invocation> {
        let text = fs::read_to_string(workspace.input_path()).map_err(launch_error)?;
        let Ok((a, b)) = decode_input(&text) else {
            return Ok(Invocation::failed(Some(1)));
        };
        let scaled = same_convolution(&a, &b)
            .rows()
            .map(|row| {
                row.iter()
                    .map(|value| format!("{} ", value * self.scale))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n");
        fs::write(workspace.output_path(), scaled).map_err(launch_error)?;
        Ok(Invocation::succeeded())
    }
}

/// Never starts.
pub(super) struct MissingProgram;

impl ConvolutionProgram for MissingProgram {
    fn name(&self) -> &str {
        "missing"
    }

    fn invoke(&self, _workspace: &Workspace) -> Result<Invocation> {
        Err(launch_error(io::Error::from(io::ErrorKind::NotFound)))
    }
}

fn launch_error(source: io::Error) -> HarnessError {
    HarnessError::Launch {
        program: "double".into(),
        source,
    }
}

/// Registry of all-ones cases named `test_{n}x{m}`.
pub(super) fn ones_registry(sizes: &[(usize, usize)]) -> TestRegistry {
    sizes.iter().fold(TestRegistry::new(), |registry, &(n, m)| {
        registry.with_case(format!("test_{n}x{m}"), move || {
            Ok((sqr_ones(n)?, sqr_ones(m)?))
        })
    })
}

/// Expected output of the all-ones `n`x`m` case, as the report renders it.
pub(super) fn rendered_ones_result(n: usize, m: usize) -> String {
    let a = sqr_ones(n).expect("size is positive");
    let b = sqr_ones(m).expect("size is positive");
    render_matrix(&same_convolution(&a, &b))
}

/// Runs `registry` against `program` in `dir`, returning the summary and
/// the report text.
pub(super) fn run_suite_capturing<P>(
    dir: &TempDir,
    registry: &TestRegistry,
    program: &P,
    filter: Option<&str>,
) -> (std::result::Result<SuiteSummary, CliError>, String)
where
    P: ConvolutionProgram,
{
    let workspace = Workspace::new(dir.path());
    let runner = CaseRunner::new(&workspace, program);
    let mut buffer = Vec::new();
    let result = run_suite(registry, &runner, filter, &mut buffer);
    (result, String::from_utf8_lossy(&buffer).into_owned())
}
