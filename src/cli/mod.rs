//! Command-line interface for lesson_forge.
//!
//! Provides the `generate` command, which runs the generate/review pipeline
//! for one grade and topic.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli, Commands, GenerateArgs};
