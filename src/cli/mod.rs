//! Command-line interface for kgvqa-forge.

pub mod commands;

pub use commands::{parse_cli, run_with_cli, Cli, Commands};
