//! Correctness harness for an external two-dimensional convolution program.
//!
//! The harness writes a signal and a kernel to a text file, runs the program,
//! reads back its output and compares it with a reference "same-size"
//! convolution computed here. The pieces are usable on their own:
//!
//! - [`codec`] renders and parses the shared text protocol,
//! - [`reference`] computes the expected result,
//! - [`compare`] applies the fixed tolerance,
//! - [`CaseRunner`] drives one [`TestCase`] through a [`Workspace`].

pub mod codec;
pub mod compare;
mod error;
mod matrix;
mod program;
pub mod reference;
pub mod registry;
mod runner;
mod workspace;

#[cfg(test)]
mod test_utils;

pub use crate::{
    error::{FormatError, FsOperation, HarnessError, HarnessErrorCode, Operand, Result},
    matrix::{Matrix, MatrixError},
    program::{ConvolutionProgram, DEFAULT_PROGRAM, ExternalProgram, Invocation},
    registry::{MatrixPair, TestCase, TestRegistry},
    runner::{CaseFailure, CaseOutcome, CaseRunner, Stage, Verdict},
    workspace::{DEFAULT_INPUT, DEFAULT_OUTPUT, Workspace, remove_if_present},
};
