//! Entry point for `convcheck`.
//!
//! Runs the built-in test cases against the convolution program, prints the
//! report to stdout and exits non-zero when any case failed or the run
//! could not complete.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use convcheck_cli::{
    cli::{Cli, CliError, run_cli},
    logging::{self, LoggingError},
};
use convcheck_core::TestRegistry;
use tracing::{error, field};

fn try_main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let registry = TestRegistry::builtin();
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    let summary = run_cli(cli, &registry, &mut writer).context("failed to execute command")?;
    writer.flush().context("failed to flush output")?;
    Ok(if summary.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    match try_main() {
        Ok(code) => code,
        Err(err) => {
            let code = err
                .downcast_ref::<CliError>()
                .and_then(|cli_error| match cli_error {
                    CliError::Harness(harness) => Some(harness.code()),
                    _ => None,
                })
                .map(field::display);
            error!(error = %err, code, "command execution failed");
            ExitCode::FAILURE
        }
    }
}

#[expect(
    clippy::print_stderr,
    reason = "Emit one-off diagnostic before tracing is initialized"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialize logging: {err}");
}
