//! Support library for the topospine CLI binary.
//!
//! Exposes the command and logging modules so doctests and tests can drive
//! the pipeline without spawning a subprocess.

pub mod cli;
pub mod logging;
