//! Command-line interface for the topospine pipeline.
//!
//! The `run` command loads a point file or a regular grid of values, runs
//! the pipeline with the requested neighbourhood and simplification, and
//! renders either a text summary or a JSON landscape document.

mod commands;

pub use commands::{
    Cli, CliError, Command, ExecutionSummary, GridArgs, MetricArg, OutputFormat, PointsArgs,
    PolarityArg, RunCommand, RunSource, StencilArg, render, render_json, render_summary, run_cli,
};

#[cfg(test)]
mod tests;
