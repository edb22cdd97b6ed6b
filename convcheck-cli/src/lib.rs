//! Support library for the convcheck binary.
//!
//! Exposes the CLI and logging setup so doctests and integration tests can
//! drive a run without spawning the binary.

pub mod cli;
pub mod logging;
